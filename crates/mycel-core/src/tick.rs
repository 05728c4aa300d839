//! The five-phase diffusion and ripening step.
//!
//! One tick runs through these phases, in order:
//!
//! 1. **Generation** -- the occupied room accrues nutrients from presence.
//! 2. **Propagation** -- nutrients flow to neighbors, weighted by trail
//!    strength. Deltas are computed for the whole graph first and applied
//!    afterwards, so the result is independent of room iteration order and
//!    a source's loss is exactly what its neighbors receive.
//! 3. **Trail decay** -- every trail fades geometrically; negligible
//!    entries are pruned.
//! 4. **Ripening** -- rooms holding nutrients above the threshold accrue
//!    ripeness, monotonically, clamped to 1.
//! 5. **Milestone cascade** -- fractions crossed for the first time inject
//!    nutrients into direct neighbors. The injection lands after the
//!    propagation and ripening passes, so it is visible only to the *next*
//!    tick: a cascade advances exactly one graph-hop per tick, which bounds
//!    it.
//!
//! The tick step never fails. Stale room ids read as zero-state rooms and
//! absorb no writes.

use mycel_types::RoomId;
use mycel_world::RoomGraph;
use tracing::debug;

use crate::config::TuningConfig;
use crate::milestone::MilestoneTracker;
use crate::state::NetworkState;

/// Baseline share of the even split an untraveled edge carries.
const BASE_CONDUCTANCE: f64 = 0.3;

/// Additional share granted by a fully-reinforced trail.
const TRAIL_CONDUCTANCE: f64 = 0.7;

/// Nutrient scaling of the ripening rate.
const RIPENING_NUTRIENT_FACTOR: f64 = 0.02;

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Elapsed real seconds this tick integrated over.
    pub dt: f64,
    /// The room that was occupied during this tick, if any.
    pub active: Option<RoomId>,
    /// Milestones fired this tick: `(room, fraction)` pairs.
    pub milestones: Vec<(RoomId, f64)>,
    /// Number of trail entries pruned by decay.
    pub trails_pruned: usize,
    /// Total nutrient mass across all rooms at end of tick.
    pub total_nutrients: f64,
}

/// Execute one tick of the diffusion and ripening engine.
///
/// `dt` is the elapsed real time in seconds since the previous tick;
/// non-finite or negative values are treated as zero. `active` is the
/// currently occupied room, or `None` before the experience has entered
/// one (no generation happens then).
pub fn run_tick(
    state: &mut NetworkState,
    milestones: &mut MilestoneTracker,
    graph: &RoomGraph,
    tuning: &TuningConfig,
    tick: u64,
    dt: f64,
    active: Option<RoomId>,
) -> TickSummary {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    // --- Phase 1: Generation ---
    if let Some(active_room) = active {
        state.add_nutrients(active_room, tuning.gen_rate * dt);
    }

    // --- Phase 2: Propagation ---
    propagate(state, graph, tuning, dt);

    // --- Phase 3: Trail decay ---
    let trails_pruned = state.decay_trails(tuning.trail_decay, tuning.trail_floor);

    // --- Phase 4: Ripening ---
    let mut fired: Vec<(RoomId, f64)> = Vec::new();
    for room in graph.rooms() {
        let level = state.nutrients(room);
        if level <= tuning.ripeness_threshold {
            continue;
        }
        if state.ripeness(room) >= 1.0 {
            continue;
        }
        let gain = tuning.base_gain * dt * (1.0 + level * RIPENING_NUTRIENT_FACTOR);
        state.raise_ripeness(room, gain);
        for fraction in milestones.newly_reached(room, state.ripeness(room)) {
            fired.push((room, fraction));
        }
    }

    // --- Phase 5: Milestone cascade ---
    // Injections land after the ripening pass so they feed the next tick,
    // never this one.
    for &(room, fraction) in &fired {
        let burst = tuning.ethylene_burst * fraction;
        for &neighbor in graph.neighbors(room) {
            state.add_nutrients(neighbor, burst);
        }
        let name = graph.room_name(room).unwrap_or("?");
        tracing::info!(
            tick,
            room = %name,
            fraction,
            burst,
            "Ripeness milestone reached, bursting neighbors"
        );
    }

    let summary = TickSummary {
        tick,
        dt,
        active,
        milestones: fired,
        trails_pruned,
        total_nutrients: state.total_nutrients(),
    };
    debug!(
        tick,
        dt,
        total_nutrients = summary.total_nutrients,
        trails_pruned = summary.trails_pruned,
        "Tick complete"
    );
    summary
}

/// The propagation pass: trail-weighted nutrient flow along the graph.
///
/// Deltas are accumulated for every room and applied in one batch, clamped
/// so no room goes negative.
fn propagate(state: &mut NetworkState, graph: &RoomGraph, tuning: &TuningConfig, dt: f64) {
    let mut deltas = vec![0.0_f64; graph.room_count()];

    for room in graph.rooms() {
        let level = state.nutrients(room);
        if level <= tuning.nutrient_floor {
            continue;
        }
        let neighbors = graph.neighbors(room);
        if neighbors.is_empty() {
            continue;
        }
        let outflow = level * tuning.decay * dt * 0.5;
        if outflow < tuning.nutrient_floor {
            continue;
        }

        // Neighbor counts are tiny; the cast is exact.
        #[allow(clippy::cast_precision_loss)]
        let even_share = outflow / neighbors.len() as f64;

        let mut sent = 0.0;
        for &neighbor in neighbors {
            let conductance =
                BASE_CONDUCTANCE + TRAIL_CONDUCTANCE * state.trail_strength(room, neighbor);
            let amount = even_share * conductance;
            if let Some(slot) = deltas.get_mut(neighbor.as_usize()) {
                *slot += amount;
                sent += amount;
            }
        }
        if let Some(slot) = deltas.get_mut(room.as_usize()) {
            *slot -= sent;
        }
    }

    for (room, &delta) in graph.rooms().zip(deltas.iter()) {
        if delta != 0.0 {
            state.add_nutrients(room, delta);
        }
    }
}
