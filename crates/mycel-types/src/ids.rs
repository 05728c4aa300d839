//! Typed identifiers for rooms and trail edges.
//!
//! Rooms are identified by a compact index into the fixed room table owned
//! by the graph, not by their display name. Names appear only at the
//! configuration and persistence boundaries; everything inside the engine's
//! hot loops works with [`RoomId`] and [`EdgeKey`] to avoid repeated string
//! hashing and ambiguous edge-key concatenation.

use serde::{Deserialize, Serialize};

/// Index of a room in the fixed room table.
///
/// A `RoomId` is only meaningful relative to the graph that interned it.
/// Out-of-range indices are tolerated everywhere in the engine and read as
/// zero-state rooms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RoomId(u32);

impl RoomId {
    /// Create a room id from a raw table index.
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// Return the raw table index.
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Return the index widened for slice access.
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for RoomId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "room#{}", self.0)
    }
}

impl From<u32> for RoomId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl From<RoomId> for u32 {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

/// Canonical key for the undirected edge between two rooms.
///
/// The constructor orders the endpoints so that `(a, b)` and `(b, a)`
/// produce the same key, which is what makes trail strength symmetric by
/// construction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EdgeKey {
    /// The lower-indexed endpoint.
    lo: RoomId,
    /// The higher-indexed endpoint.
    hi: RoomId,
}

impl EdgeKey {
    /// Create the canonical key for the edge between `a` and `b`.
    pub fn new(a: RoomId, b: RoomId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// Return the lower-indexed endpoint.
    pub const fn lo(self) -> RoomId {
        self.lo
    }

    /// Return the higher-indexed endpoint.
    pub const fn hi(self) -> RoomId {
        self.hi
    }

    /// Whether this edge has `room` as one of its endpoints.
    pub fn touches(self, room: RoomId) -> bool {
        self.lo == room || self.hi == room
    }
}

impl core::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}--{}", self.lo, self.hi)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn edge_key_is_order_independent() {
        let a = RoomId::from_index(3);
        let b = RoomId::from_index(7);
        assert_eq!(EdgeKey::new(a, b), EdgeKey::new(b, a));
    }

    #[test]
    fn edge_key_orders_endpoints() {
        let a = RoomId::from_index(9);
        let b = RoomId::from_index(2);
        let key = EdgeKey::new(a, b);
        assert_eq!(key.lo(), b);
        assert_eq!(key.hi(), a);
    }

    #[test]
    fn edge_key_touches_endpoints_only() {
        let key = EdgeKey::new(RoomId::from_index(1), RoomId::from_index(4));
        assert!(key.touches(RoomId::from_index(1)));
        assert!(key.touches(RoomId::from_index(4)));
        assert!(!key.touches(RoomId::from_index(2)));
    }

    #[test]
    fn self_edge_is_representable() {
        // The graph never produces self-edges, but the key type itself
        // does not forbid them.
        let a = RoomId::from_index(5);
        let key = EdgeKey::new(a, a);
        assert_eq!(key.lo(), key.hi());
    }

    #[test]
    fn room_id_roundtrip_serde() {
        let original = RoomId::from_index(11);
        let json = serde_json::to_string(&original).unwrap();
        let restored: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }
}
