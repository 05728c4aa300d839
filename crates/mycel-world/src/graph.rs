//! The room graph: rooms as nodes, undirected connections as edges.
//!
//! [`RoomGraph`] interns room names into dense [`RoomId`] indices and stores
//! one adjacency list per room. Construction is strict (duplicates, dangling
//! names, and self-loops are errors); queries are infallible and tolerate
//! out-of-range ids by treating them as isolated, unnamed rooms.
//!
//! The graph is assumed static for the process lifetime: the host builds it
//! once, then shares it immutably (typically behind an `Arc`).

use std::collections::{BTreeMap, VecDeque};

use mycel_types::RoomId;

use crate::error::GraphError;

/// Empty neighbor list returned for out-of-range room ids.
const NO_NEIGHBORS: &[RoomId] = &[];

/// The static adjacency table between rooms.
///
/// Provides the neighbor lists consumed by the diffusion engine, name/id
/// translation for the configuration and persistence boundaries, and a
/// connectivity diagnostic for startup logging.
#[derive(Debug, Clone, Default)]
pub struct RoomGraph {
    /// Room names in id order. The index of a name is its [`RoomId`].
    names: Vec<String>,
    /// Reverse lookup from room name to id.
    index: BTreeMap<String, RoomId>,
    /// Adjacency lists, indexed by [`RoomId`]. Kept sorted and deduplicated.
    adjacency: Vec<Vec<RoomId>>,
}

impl RoomGraph {
    /// Create an empty graph.
    pub const fn new() -> Self {
        Self {
            names: Vec::new(),
            index: BTreeMap::new(),
            adjacency: Vec::new(),
        }
    }

    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Add a room and return its interned id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateRoom`] if a room with the same name
    /// was already added.
    pub fn add_room(&mut self, name: &str) -> Result<RoomId, GraphError> {
        if self.index.contains_key(name) {
            return Err(GraphError::DuplicateRoom(name.to_owned()));
        }
        let raw = u32::try_from(self.names.len())
            .map_err(|_err| GraphError::DuplicateRoom(name.to_owned()))?;
        let id = RoomId::from_index(raw);
        self.names.push(name.to_owned());
        self.index.insert(name.to_owned(), id);
        self.adjacency.push(Vec::new());
        Ok(id)
    }

    /// Connect two rooms with an undirected edge.
    ///
    /// Connecting the same pair twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownRoom`] if either name was never added,
    /// or [`GraphError::SelfLoop`] if both ends are the same room.
    pub fn connect(&mut self, a: &str, b: &str) -> Result<(), GraphError> {
        if a == b {
            return Err(GraphError::SelfLoop(a.to_owned()));
        }
        let id_a = self
            .room_id(a)
            .ok_or_else(|| GraphError::UnknownRoom(a.to_owned()))?;
        let id_b = self
            .room_id(b)
            .ok_or_else(|| GraphError::UnknownRoom(b.to_owned()))?;

        Self::insert_sorted(&mut self.adjacency, id_a, id_b);
        Self::insert_sorted(&mut self.adjacency, id_b, id_a);
        Ok(())
    }

    /// Insert `neighbor` into `room`'s adjacency list, keeping it sorted
    /// and deduplicated.
    fn insert_sorted(adjacency: &mut [Vec<RoomId>], room: RoomId, neighbor: RoomId) {
        if let Some(list) = adjacency.get_mut(room.as_usize())
            && let Err(position) = list.binary_search(&neighbor)
        {
            list.insert(position, neighbor);
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Return the number of rooms in the graph.
    pub fn room_count(&self) -> usize {
        self.names.len()
    }

    /// Whether the graph has no rooms.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over all room ids in index order.
    pub fn rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        (0..self.names.len()).map(|raw| {
            // Room count is bounded by the u32 check in `add_room`.
            #[allow(clippy::cast_possible_truncation)]
            let id = RoomId::from_index(raw as u32);
            id
        })
    }

    /// Look up a room id by name.
    pub fn room_id(&self, name: &str) -> Option<RoomId> {
        self.index.get(name).copied()
    }

    /// Look up a room name by id. `None` for out-of-range ids.
    pub fn room_name(&self, room: RoomId) -> Option<&str> {
        self.names.get(room.as_usize()).map(String::as_str)
    }

    /// Whether the id refers to a room in this graph.
    pub fn contains(&self, room: RoomId) -> bool {
        room.as_usize() < self.names.len()
    }

    /// Return the rooms directly connected to `room`.
    ///
    /// Out-of-range ids have no neighbors.
    pub fn neighbors(&self, room: RoomId) -> &[RoomId] {
        self.adjacency
            .get(room.as_usize())
            .map_or(NO_NEIGHBORS, Vec::as_slice)
    }

    /// Return the number of connections at `room`.
    pub fn degree(&self, room: RoomId) -> usize {
        self.neighbors(room).len()
    }

    /// Check whether every room is reachable from every other room.
    ///
    /// Returns `true` for the empty graph. Used as a startup diagnostic;
    /// the engine itself works on disconnected graphs.
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.rooms().next() else {
            return true;
        };

        let mut visited = vec![false; self.names.len()];
        let mut queue = VecDeque::new();
        if let Some(slot) = visited.get_mut(start.as_usize()) {
            *slot = true;
        }
        queue.push_back(start);

        let mut reached: usize = 0;
        while let Some(current) = queue.pop_front() {
            reached = reached.saturating_add(1);
            for &neighbor in self.neighbors(current) {
                if let Some(slot) = visited.get_mut(neighbor.as_usize())
                    && !*slot
                {
                    *slot = true;
                    queue.push_back(neighbor);
                }
            }
        }

        reached == self.names.len()
    }
}
