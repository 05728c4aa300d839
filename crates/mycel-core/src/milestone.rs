//! The derived milestone-hit record.
//!
//! Each room fires a one-time cascade when its ripeness first reaches each
//! of four fixed fractions. Which fractions have already fired is NOT
//! persisted: it is re-derived from ripeness at load time, as a deliberate
//! design choice that keeps the persisted schema to the four scalar maps.
//!
//! This derivation assumes two things, both guaranteed elsewhere:
//!
//! 1. Ripeness never decreases ([`NetworkState::raise_ripeness`] ignores
//!    negative gains). If ripeness could ever dip below a fraction and
//!    recover, the derived record would re-fire that milestone.
//! 2. Persisted ripeness survives a save/load round trip with enough
//!    precision that `>= fraction` comparisons are stable. JSON via
//!    `serde_json` round-trips finite `f64` values exactly, so this holds.
//!
//! [`NetworkState::raise_ripeness`]: crate::state::NetworkState::raise_ripeness

use mycel_types::RoomId;

/// The four ripeness fractions that trigger a cascade, in ascending order.
pub const RIPENESS_MILESTONES: [f64; 4] = [0.25, 0.50, 0.75, 1.00];

/// Tracks which milestone fractions each room has already fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneTracker {
    /// One flag per room per fraction, indexed `[room][fraction]`.
    hit: Vec<[bool; RIPENESS_MILESTONES.len()]>,
}

impl MilestoneTracker {
    /// Create a tracker with no milestones fired, for `room_count` rooms.
    pub fn new(room_count: usize) -> Self {
        Self {
            hit: vec![[false; RIPENESS_MILESTONES.len()]; room_count],
        }
    }

    /// Re-derive the already-fired set from current ripeness levels.
    ///
    /// A fraction counts as fired iff the room's ripeness has already
    /// reached it. Called once at load time, before the first tick.
    pub fn derive(ripeness: &[f64]) -> Self {
        let hit = ripeness
            .iter()
            .map(|&level| {
                let mut flags = [false; RIPENESS_MILESTONES.len()];
                for (flag, &fraction) in flags.iter_mut().zip(RIPENESS_MILESTONES.iter()) {
                    *flag = level >= fraction;
                }
                flags
            })
            .collect();
        Self { hit }
    }

    /// Return the fractions `ripeness` reaches for the first time, marking
    /// them fired. Unknown rooms fire nothing.
    ///
    /// A single large ripeness step can cross several fractions at once;
    /// each is returned (and fired) exactly once for the lifetime of the
    /// simulation.
    pub fn newly_reached(&mut self, room: RoomId, ripeness: f64) -> Vec<f64> {
        let Some(flags) = self.hit.get_mut(room.as_usize()) else {
            return Vec::new();
        };
        let mut crossed = Vec::new();
        for (flag, &fraction) in flags.iter_mut().zip(RIPENESS_MILESTONES.iter()) {
            if !*flag && ripeness >= fraction {
                *flag = true;
                crossed.push(fraction);
            }
        }
        crossed
    }

    /// Whether the given fraction index has fired for a room. Test hook.
    pub fn is_hit(&self, room: RoomId, fraction_index: usize) -> bool {
        self.hit
            .get(room.as_usize())
            .and_then(|flags| flags.get(fraction_index))
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tracker_has_nothing_fired() {
        let tracker = MilestoneTracker::new(2);
        let room = RoomId::from_index(0);
        for index in 0..RIPENESS_MILESTONES.len() {
            assert!(!tracker.is_hit(room, index));
        }
    }

    #[test]
    fn derive_marks_reached_fractions() {
        let tracker = MilestoneTracker::derive(&[0.6, 0.0, 1.0]);
        let first = RoomId::from_index(0);
        assert!(tracker.is_hit(first, 0));
        assert!(tracker.is_hit(first, 1));
        assert!(!tracker.is_hit(first, 2));

        let second = RoomId::from_index(1);
        assert!(!tracker.is_hit(second, 0));

        let third = RoomId::from_index(2);
        assert!(tracker.is_hit(third, 3));
    }

    #[test]
    fn crossing_fires_exactly_once() {
        let mut tracker = MilestoneTracker::new(1);
        let room = RoomId::from_index(0);

        assert_eq!(tracker.newly_reached(room, 0.3), vec![0.25]);
        // Still above the fraction on later ticks: nothing new fires.
        assert_eq!(tracker.newly_reached(room, 0.4), Vec::<f64>::new());
    }

    #[test]
    fn large_step_crosses_several_fractions() {
        let mut tracker = MilestoneTracker::new(1);
        let room = RoomId::from_index(0);
        assert_eq!(tracker.newly_reached(room, 0.8), vec![0.25, 0.50, 0.75]);
        assert_eq!(tracker.newly_reached(room, 1.0), vec![1.00]);
    }

    #[test]
    fn derive_then_advance_does_not_refire() {
        // A loaded room at 0.5 must not re-fire 0.25 or 0.5.
        let mut tracker = MilestoneTracker::derive(&[0.5]);
        let room = RoomId::from_index(0);
        assert_eq!(tracker.newly_reached(room, 0.76), vec![0.75]);
    }

    #[test]
    fn unknown_room_fires_nothing() {
        let mut tracker = MilestoneTracker::new(1);
        assert!(tracker.newly_reached(RoomId::from_index(9), 1.0).is_empty());
    }
}
