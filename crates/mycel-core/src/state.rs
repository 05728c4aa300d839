//! In-memory network state: the four persisted maps, id-indexed.
//!
//! [`NetworkState`] owns nutrients, ripeness, and last-visit as dense
//! vectors indexed by [`RoomId`], and trail strength as a map keyed by
//! canonical [`EdgeKey`]. The mutators enforce the engine's invariants at
//! the lowest level: nutrients never go negative, ripeness never decreases
//! and never exceeds 1, trail strength stays inside `[0, 1)`.
//!
//! Translation to and from the persisted, room-name-keyed [`Snapshot`] also
//! lives here: loading seeds zero defaults for rooms the snapshot does not
//! mention and drops entries naming rooms the graph no longer has.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use mycel_types::{EdgeKey, RoomId, Snapshot, edge_key_string, split_edge_key};
use mycel_world::RoomGraph;

/// The mutable scalar state of the whole network.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkState {
    /// Nutrient level per room, `>= 0`.
    nutrients: Vec<f64>,
    /// Ripeness per room, monotone in `[0, 1]`.
    ripeness: Vec<f64>,
    /// Last visit timestamp per room. Informational only.
    last_visit: Vec<Option<DateTime<Utc>>>,
    /// Trail strength per edge, in `[0, 1)`. Entries below the prune floor
    /// are removed during decay.
    trails: BTreeMap<EdgeKey, f64>,
}

impl NetworkState {
    /// Create an all-zero state for `room_count` rooms.
    pub fn new(room_count: usize) -> Self {
        Self {
            nutrients: vec![0.0; room_count],
            ripeness: vec![0.0; room_count],
            last_visit: vec![None; room_count],
            trails: BTreeMap::new(),
        }
    }

    /// Return the number of rooms this state is sized for.
    pub fn room_count(&self) -> usize {
        self.nutrients.len()
    }

    // -------------------------------------------------------------------
    // Nutrients
    // -------------------------------------------------------------------

    /// Return the nutrient level of a room. Unknown rooms read as 0.
    pub fn nutrients(&self, room: RoomId) -> f64 {
        self.nutrients.get(room.as_usize()).copied().unwrap_or(0.0)
    }

    /// Add `delta` (which may be negative) to a room's nutrients, clamped
    /// so the level never goes below zero. Unknown rooms are ignored.
    pub fn add_nutrients(&mut self, room: RoomId, delta: f64) {
        if let Some(level) = self.nutrients.get_mut(room.as_usize()) {
            *level = (*level + delta).max(0.0);
        }
    }

    /// Return the total nutrient mass across all rooms.
    pub fn total_nutrients(&self) -> f64 {
        self.nutrients.iter().sum()
    }

    // -------------------------------------------------------------------
    // Ripeness
    // -------------------------------------------------------------------

    /// Return the ripeness of a room. Unknown rooms read as 0.
    pub fn ripeness(&self, room: RoomId) -> f64 {
        self.ripeness.get(room.as_usize()).copied().unwrap_or(0.0)
    }

    /// Raise a room's ripeness by `gain`, clamped to 1. Negative gains are
    /// ignored: ripeness is monotone for the lifetime of the simulation.
    pub fn raise_ripeness(&mut self, room: RoomId, gain: f64) {
        if gain <= 0.0 {
            return;
        }
        if let Some(level) = self.ripeness.get_mut(room.as_usize()) {
            *level = (*level + gain).min(1.0);
        }
    }

    /// Return all ripeness levels in room-id order.
    pub fn ripeness_levels(&self) -> &[f64] {
        &self.ripeness
    }

    /// Return the arithmetic mean of ripeness over all rooms, 0 if there
    /// are none.
    pub fn mean_ripeness(&self) -> f64 {
        if self.ripeness.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.ripeness.iter().sum();
        // Room counts are tens, far inside f64's exact integer range.
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / self.ripeness.len() as f64;
        mean
    }

    // -------------------------------------------------------------------
    // Trails
    // -------------------------------------------------------------------

    /// Return the trail strength between two rooms, 0 if the edge has no
    /// entry. Symmetric in its arguments by construction of [`EdgeKey`].
    pub fn trail_strength(&self, a: RoomId, b: RoomId) -> f64 {
        self.trails
            .get(&EdgeKey::new(a, b))
            .copied()
            .unwrap_or(0.0)
    }

    /// Reinforce the trail between two rooms.
    ///
    /// The boost is applied against the remaining headroom
    /// (`s += boost * (1 - s)`), so repeated traversals strictly approach
    /// but never reach 1.0. A boost between a room and itself is ignored.
    pub fn boost_trail(&mut self, a: RoomId, b: RoomId, boost: f64) {
        if a == b || boost <= 0.0 {
            return;
        }
        let strength = self.trails.entry(EdgeKey::new(a, b)).or_insert(0.0);
        *strength += boost * (1.0 - *strength);
    }

    /// Apply one tick of geometric decay to every trail and prune entries
    /// below `floor`. Returns the number of pruned entries.
    pub fn decay_trails(&mut self, factor: f64, floor: f64) -> usize {
        let before = self.trails.len();
        for strength in self.trails.values_mut() {
            *strength *= factor;
        }
        self.trails.retain(|_, strength| *strength >= floor);
        before.saturating_sub(self.trails.len())
    }

    /// Return the number of live trail entries.
    pub fn trail_count(&self) -> usize {
        self.trails.len()
    }

    // -------------------------------------------------------------------
    // Last visit
    // -------------------------------------------------------------------

    /// Return the last time a room was entered, if ever.
    pub fn last_visit(&self, room: RoomId) -> Option<DateTime<Utc>> {
        self.last_visit.get(room.as_usize()).copied().flatten()
    }

    /// Record a visit to a room. Unknown rooms are ignored.
    pub fn mark_visit(&mut self, room: RoomId, when: DateTime<Utc>) {
        if let Some(slot) = self.last_visit.get_mut(room.as_usize()) {
            *slot = Some(when);
        }
    }

    // -------------------------------------------------------------------
    // Snapshot translation
    // -------------------------------------------------------------------

    /// Build state from a persisted snapshot against the current graph.
    ///
    /// Every graph room absent from the snapshot seeds to zero. Snapshot
    /// entries naming rooms the graph no longer has are dropped, as are
    /// trail keys with either end unknown. Non-finite or out-of-range
    /// values are sanitized so a hand-edited or truncated blob can never
    /// violate the state invariants.
    pub fn from_snapshot(snapshot: &Snapshot, graph: &RoomGraph) -> Self {
        let mut state = Self::new(graph.room_count());

        for (name, &value) in &snapshot.nutrients {
            let Some(room) = graph.room_id(name) else {
                tracing::debug!(room = %name, "Dropping nutrient entry for unknown room");
                continue;
            };
            if value.is_finite() && value > 0.0 {
                state.add_nutrients(room, value);
            }
        }

        for (name, &value) in &snapshot.ripeness {
            let Some(room) = graph.room_id(name) else {
                tracing::debug!(room = %name, "Dropping ripeness entry for unknown room");
                continue;
            };
            if value.is_finite() && value > 0.0 {
                state.raise_ripeness(room, value.min(1.0));
            }
        }

        for (key, &value) in &snapshot.trails {
            let Some((a, b)) = split_edge_key(key) else {
                tracing::debug!(key = %key, "Dropping malformed trail key");
                continue;
            };
            let (Some(room_a), Some(room_b)) = (graph.room_id(a), graph.room_id(b)) else {
                tracing::debug!(key = %key, "Dropping trail entry for unknown room");
                continue;
            };
            if value.is_finite() && value > 0.0 && value < 1.0 && room_a != room_b {
                state.trails.insert(EdgeKey::new(room_a, room_b), value);
            }
        }

        for (name, &when) in &snapshot.last_visit {
            if let Some(room) = graph.room_id(name) {
                state.mark_visit(room, when);
            }
        }

        state
    }

    /// Render the state as a persisted snapshot, keyed by room name.
    pub fn to_snapshot(&self, graph: &RoomGraph) -> Snapshot {
        let mut snapshot = Snapshot::default();

        for room in graph.rooms() {
            let Some(name) = graph.room_name(room) else {
                continue;
            };
            snapshot
                .nutrients
                .insert(name.to_owned(), self.nutrients(room));
            snapshot
                .ripeness
                .insert(name.to_owned(), self.ripeness(room));
            if let Some(when) = self.last_visit(room) {
                snapshot.last_visit.insert(name.to_owned(), when);
            }
        }

        for (key, &strength) in &self.trails {
            let (Some(a), Some(b)) = (graph.room_name(key.lo()), graph.room_name(key.hi()))
            else {
                continue;
            };
            snapshot.trails.insert(edge_key_string(a, b), strength);
        }

        snapshot
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn make_graph() -> RoomGraph {
        let mut graph = RoomGraph::new();
        let _ = graph.add_room("atrium").unwrap();
        let _ = graph.add_room("cellar").unwrap();
        let _ = graph.add_room("archive").unwrap();
        graph.connect("atrium", "cellar").unwrap();
        graph.connect("cellar", "archive").unwrap();
        graph
    }

    fn room(graph: &RoomGraph, name: &str) -> RoomId {
        graph.room_id(name).unwrap()
    }

    #[test]
    fn fresh_state_is_all_zero() {
        let state = NetworkState::new(3);
        assert_eq!(state.nutrients(RoomId::from_index(0)), 0.0);
        assert_eq!(state.ripeness(RoomId::from_index(2)), 0.0);
        assert_eq!(state.total_nutrients(), 0.0);
        assert_eq!(state.trail_count(), 0);
    }

    #[test]
    fn nutrients_never_go_negative() {
        let mut state = NetworkState::new(1);
        let room = RoomId::from_index(0);
        state.add_nutrients(room, 2.0);
        state.add_nutrients(room, -5.0);
        assert_eq!(state.nutrients(room), 0.0);
    }

    #[test]
    fn unknown_room_reads_as_zero_and_ignores_writes() {
        let mut state = NetworkState::new(1);
        let stale = RoomId::from_index(42);
        state.add_nutrients(stale, 3.0);
        state.raise_ripeness(stale, 0.5);
        assert_eq!(state.nutrients(stale), 0.0);
        assert_eq!(state.ripeness(stale), 0.0);
        assert_eq!(state.last_visit(stale), None);
    }

    #[test]
    fn ripeness_is_monotone_and_capped() {
        let mut state = NetworkState::new(1);
        let room = RoomId::from_index(0);
        state.raise_ripeness(room, 0.7);
        state.raise_ripeness(room, -0.5);
        assert_eq!(state.ripeness(room), 0.7);
        state.raise_ripeness(room, 0.7);
        assert_eq!(state.ripeness(room), 1.0);
    }

    #[test]
    fn trail_strength_is_symmetric() {
        let mut state = NetworkState::new(2);
        let a = RoomId::from_index(0);
        let b = RoomId::from_index(1);
        state.boost_trail(a, b, 0.15);
        assert_eq!(state.trail_strength(a, b), state.trail_strength(b, a));
        assert!(state.trail_strength(a, b) > 0.0);
    }

    #[test]
    fn trail_boost_strictly_approaches_one() {
        let mut state = NetworkState::new(2);
        let a = RoomId::from_index(0);
        let b = RoomId::from_index(1);
        let mut previous = 0.0;
        for _ in 0..100 {
            state.boost_trail(a, b, 0.15);
            let strength = state.trail_strength(a, b);
            assert!(strength > previous);
            assert!(strength < 1.0);
            previous = strength;
        }
    }

    #[test]
    fn self_trail_is_ignored() {
        let mut state = NetworkState::new(1);
        let a = RoomId::from_index(0);
        state.boost_trail(a, a, 0.15);
        assert_eq!(state.trail_count(), 0);
    }

    #[test]
    fn trail_decay_prunes_below_floor() {
        let mut state = NetworkState::new(3);
        let a = RoomId::from_index(0);
        let b = RoomId::from_index(1);
        let c = RoomId::from_index(2);
        state.boost_trail(a, b, 0.8);
        state.boost_trail(b, c, 0.05);

        // 0.05 * 0.2 falls under a floor of 0.02; 0.8 * 0.2 survives.
        let pruned = state.decay_trails(0.2, 0.02);
        assert_eq!(pruned, 1);
        assert_eq!(state.trail_count(), 1);
        assert_eq!(state.trail_strength(b, c), 0.0);
    }

    #[test]
    fn mean_ripeness_over_empty_state_is_zero() {
        assert_eq!(NetworkState::new(0).mean_ripeness(), 0.0);
    }

    #[test]
    fn mean_ripeness_averages_rooms() {
        let mut state = NetworkState::new(2);
        state.raise_ripeness(RoomId::from_index(0), 1.0);
        assert_eq!(state.mean_ripeness(), 0.5);
    }

    #[test]
    fn snapshot_roundtrip_preserves_state() {
        let graph = make_graph();
        let mut state = NetworkState::new(graph.room_count());
        let atrium = room(&graph, "atrium");
        let cellar = room(&graph, "cellar");
        state.add_nutrients(atrium, 4.25);
        state.raise_ripeness(atrium, 0.5);
        state.boost_trail(atrium, cellar, 0.15);
        state.mark_visit(atrium, Utc::now());

        let snapshot = state.to_snapshot(&graph);
        let restored = NetworkState::from_snapshot(&snapshot, &graph);
        assert_eq!(state, restored);
    }

    #[test]
    fn from_snapshot_seeds_missing_rooms_to_zero() {
        let graph = make_graph();
        let mut snapshot = Snapshot::default();
        snapshot.nutrients.insert(String::from("atrium"), 2.0);

        let state = NetworkState::from_snapshot(&snapshot, &graph);
        assert_eq!(state.nutrients(room(&graph, "atrium")), 2.0);
        assert_eq!(state.nutrients(room(&graph, "cellar")), 0.0);
        assert_eq!(state.ripeness(room(&graph, "atrium")), 0.0);
    }

    #[test]
    fn from_snapshot_drops_stale_rooms_and_edges() {
        let graph = make_graph();
        let mut snapshot = Snapshot::default();
        snapshot.nutrients.insert(String::from("demolished"), 7.0);
        snapshot
            .trails
            .insert(edge_key_string("atrium", "demolished"), 0.5);
        snapshot.trails.insert(String::from("garbage-key"), 0.5);

        let state = NetworkState::from_snapshot(&snapshot, &graph);
        assert_eq!(state.total_nutrients(), 0.0);
        assert_eq!(state.trail_count(), 0);
    }

    #[test]
    fn from_snapshot_sanitizes_out_of_range_values() {
        let graph = make_graph();
        let mut snapshot = Snapshot::default();
        snapshot.nutrients.insert(String::from("atrium"), f64::NAN);
        snapshot.nutrients.insert(String::from("cellar"), -3.0);
        snapshot.ripeness.insert(String::from("atrium"), 2.5);
        snapshot
            .trails
            .insert(edge_key_string("atrium", "cellar"), 1.0);

        let state = NetworkState::from_snapshot(&snapshot, &graph);
        assert_eq!(state.nutrients(room(&graph, "atrium")), 0.0);
        assert_eq!(state.nutrients(room(&graph, "cellar")), 0.0);
        assert_eq!(state.ripeness(room(&graph, "atrium")), 1.0);
        assert_eq!(state.trail_count(), 0);
    }
}
