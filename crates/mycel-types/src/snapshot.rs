//! The serializable persistence aggregate.
//!
//! A [`Snapshot`] is the sole unit of persistence: four parallel maps keyed
//! by room name (nutrients, ripeness, last visit) and by canonical edge-key
//! string (trail strength). Room *names* rather than [`RoomId`] indices are
//! used at this boundary so that a snapshot survives process restarts and
//! changes to the room table -- entries naming rooms that no longer exist
//! are simply dropped at load time.
//!
//! The milestone-hit record is deliberately absent: it is re-derived from
//! ripeness at load time.
//!
//! [`RoomId`]: crate::ids::RoomId

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Separator in the canonical edge-key string form.
const EDGE_KEY_SEPARATOR: &str = "->";

/// The persisted state of the whole network.
///
/// All maps are keyed by stable room names. Trail entries use the canonical
/// `min(a,b) + "->" + max(a,b)` string form produced by [`edge_key_string`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// Nutrient level per room, `>= 0`.
    #[serde(default)]
    pub nutrients: BTreeMap<String, f64>,

    /// Ripeness per room, in `[0, 1]`.
    #[serde(default)]
    pub ripeness: BTreeMap<String, f64>,

    /// Trail strength per canonical edge key, in `[0, 1)`.
    #[serde(default)]
    pub trails: BTreeMap<String, f64>,

    /// Last visit timestamp per room. Informational only.
    #[serde(default)]
    pub last_visit: BTreeMap<String, DateTime<Utc>>,
}

impl Snapshot {
    /// Whether the snapshot carries no state at all.
    pub fn is_empty(&self) -> bool {
        self.nutrients.is_empty()
            && self.ripeness.is_empty()
            && self.trails.is_empty()
            && self.last_visit.is_empty()
    }
}

/// Build the canonical edge-key string for the trail between two rooms.
///
/// The endpoints are ordered lexicographically by name, so `(a, b)` and
/// `(b, a)` produce the same key.
pub fn edge_key_string(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}{EDGE_KEY_SEPARATOR}{b}")
    } else {
        format!("{b}{EDGE_KEY_SEPARATOR}{a}")
    }
}

/// Split a canonical edge-key string back into its two room names.
///
/// Returns `None` if the key does not contain the separator or either side
/// is empty. Keys whose room names themselves contain the separator are not
/// supported and split at the first occurrence.
pub fn split_edge_key(key: &str) -> Option<(&str, &str)> {
    let (a, b) = key.split_once(EDGE_KEY_SEPARATOR)?;
    if a.is_empty() || b.is_empty() {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn edge_key_string_is_order_independent() {
        assert_eq!(edge_key_string("atrium", "cellar"), "atrium->cellar");
        assert_eq!(edge_key_string("cellar", "atrium"), "atrium->cellar");
    }

    #[test]
    fn split_edge_key_roundtrip() {
        let key = edge_key_string("archive", "threshold");
        assert_eq!(split_edge_key(&key), Some(("archive", "threshold")));
    }

    #[test]
    fn split_edge_key_rejects_malformed() {
        assert_eq!(split_edge_key("no-separator"), None);
        assert_eq!(split_edge_key("->cellar"), None);
        assert_eq!(split_edge_key("atrium->"), None);
    }

    #[test]
    fn empty_snapshot_reports_empty() {
        assert!(Snapshot::default().is_empty());
    }

    #[test]
    fn populated_snapshot_reports_nonempty() {
        let mut snapshot = Snapshot::default();
        snapshot.nutrients.insert(String::from("atrium"), 1.5);
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn snapshot_roundtrip_serde() {
        let mut snapshot = Snapshot::default();
        snapshot.nutrients.insert(String::from("atrium"), 3.25);
        snapshot.ripeness.insert(String::from("atrium"), 0.5);
        snapshot
            .trails
            .insert(edge_key_string("atrium", "cellar"), 0.125);
        snapshot
            .last_visit
            .insert(String::from("atrium"), Utc::now());

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, restored);
    }

    #[test]
    fn snapshot_tolerates_missing_fields() {
        // Older or partial blobs deserialize with empty defaults.
        let restored: Snapshot = serde_json::from_str("{}").unwrap();
        assert!(restored.is_empty());
    }
}
