//! The engine object: lifecycle, navigation events, and the query facade.
//!
//! [`NetworkEngine`] is explicitly constructed and explicitly owned by the
//! host -- there is no implicit module-level instance. All mutable state
//! (scalar maps, milestone record, tick counter, active room) lives behind
//! a single mutex that is held for the full duration of a tick, an enter
//! event, or a query. That serialization is load-bearing: milestone
//! idempotency and the propagation delta pass both assume a tick runs to
//! completion before the next event is observed.
//!
//! Snapshots are rendered under the lock but written to disk outside it, so
//! persistence I/O never extends the critical section.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use mycel_store::SnapshotStore;
use mycel_types::{RoomId, Snapshot};
use mycel_world::RoomGraph;

use crate::clock::TickClock;
use crate::config::TuningConfig;
use crate::milestone::MilestoneTracker;
use crate::state::NetworkState;
use crate::tick::{TickSummary, run_tick};

/// The mutable state guarded by the engine's lock.
#[derive(Debug)]
struct EngineInner {
    /// The four scalar maps.
    state: NetworkState,
    /// Which milestone fractions have fired, per room.
    milestones: MilestoneTracker,
    /// Tick counter.
    clock: TickClock,
    /// The room the experience currently occupies.
    active: Option<RoomId>,
}

/// The network simulation engine.
///
/// Construct one with [`Self::new`], call [`Self::start`] to load the
/// persisted snapshot, then let the runner drive [`Self::advance`] while
/// the navigation layer feeds [`Self::on_enter`]. Queries are valid at any
/// point in the lifecycle and never fail.
#[derive(Debug)]
pub struct NetworkEngine {
    /// The static room graph. Shared, read-only.
    graph: Arc<RoomGraph>,
    /// Tuning constants, fixed at construction.
    tuning: TuningConfig,
    /// Optional persistence backing. `None` disables saves entirely.
    store: Option<SnapshotStore>,
    /// All mutable state, behind the single serialization lock.
    inner: Mutex<EngineInner>,
}

impl NetworkEngine {
    /// Create an engine over `graph` with the given tuning.
    ///
    /// The engine starts empty; call [`Self::start`] to restore persisted
    /// state. Passing `None` for `store` runs the simulation without any
    /// persistence (useful for tests and previews).
    pub fn new(
        graph: Arc<RoomGraph>,
        tuning: TuningConfig,
        store: Option<SnapshotStore>,
    ) -> Self {
        let room_count = graph.room_count();
        Self {
            graph,
            tuning,
            store,
            inner: Mutex::new(EngineInner {
                state: NetworkState::new(room_count),
                milestones: MilestoneTracker::new(room_count),
                clock: TickClock::new(),
                active: None,
            }),
        }
    }

    /// Acquire the state lock, recovering the guard if a caller panicked.
    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Load the persisted snapshot, seed defaults for every graph room,
    /// and re-derive the milestone record from loaded ripeness.
    ///
    /// Never fails: a missing or corrupt snapshot degrades to an empty
    /// one. Calling `start` again resets the engine to the persisted
    /// state, including the tick counter and active room.
    pub fn start(&self) {
        let snapshot = self
            .store
            .as_ref()
            .map_or_else(Snapshot::default, SnapshotStore::load_or_default);
        let state = NetworkState::from_snapshot(&snapshot, &self.graph);
        let milestones = MilestoneTracker::derive(state.ripeness_levels());

        let mut inner = self.lock();
        inner.state = state;
        inner.milestones = milestones;
        inner.clock = TickClock::new();
        inner.active = None;
        drop(inner);

        tracing::info!(
            rooms = self.graph.room_count(),
            restored = !snapshot.is_empty(),
            "Network engine started"
        );
    }

    /// Render the current state as a persistable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().state.to_snapshot(&self.graph)
    }

    /// Persist the current state, best-effort. A no-op without a store.
    pub fn save(&self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let snapshot = self.lock().state.to_snapshot(&self.graph);
        store.save_best_effort(&snapshot);
    }

    // -------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------

    /// Run one tick of the diffusion and ripening step.
    ///
    /// `dt` is the elapsed real time in seconds since the previous tick.
    /// Never fails; a saturated tick counter is logged and the counter
    /// stays at its maximum.
    pub fn advance(&self, dt: f64) -> TickSummary {
        let mut guard = self.lock();
        let tick = match guard.clock.advance() {
            Ok(tick) => tick,
            Err(err) => {
                tracing::warn!(error = %err, "Tick counter saturated");
                guard.clock.tick()
            }
        };
        let active = guard.active;
        let inner = &mut *guard;
        run_tick(
            &mut inner.state,
            &mut inner.milestones,
            &self.graph,
            &self.tuning,
            tick,
            dt,
            active,
        )
    }

    // -------------------------------------------------------------------
    // Navigation events
    // -------------------------------------------------------------------

    /// Handle a room transition from the navigation layer.
    ///
    /// Reinforces the trail between the previous and the new room, stamps
    /// the room's last-visit time, makes the room the active one for
    /// subsequent ticks, and requests an immediate best-effort save.
    /// Unknown room names are ignored with a warning.
    pub fn on_enter(&self, room: &str) {
        self.enter_at(room, Utc::now());
    }

    /// [`Self::on_enter`] with an explicit timestamp.
    fn enter_at(&self, room: &str, when: DateTime<Utc>) {
        let Some(id) = self.graph.room_id(room) else {
            tracing::warn!(room = %room, "Ignoring enter event for unknown room");
            return;
        };

        let snapshot = {
            let mut inner = self.lock();
            if let Some(previous) = inner.active
                && previous != id
            {
                inner
                    .state
                    .boost_trail(previous, id, self.tuning.trail_boost);
            }
            inner.state.mark_visit(id, when);
            inner.active = Some(id);
            self.store
                .is_some()
                .then(|| inner.state.to_snapshot(&self.graph))
        };

        if let (Some(store), Some(snapshot)) = (self.store.as_ref(), snapshot.as_ref()) {
            store.save_best_effort(snapshot);
        }
        tracing::debug!(room = %room, "Entered room");
    }

    // -------------------------------------------------------------------
    // Query facade
    // -------------------------------------------------------------------

    /// Ripeness of a room, in `[0, 1]`. Unknown rooms read as 0.
    pub fn ripeness(&self, room: &str) -> f64 {
        self.graph
            .room_id(room)
            .map_or(0.0, |id| self.lock().state.ripeness(id))
    }

    /// Nutrient level of a room, `>= 0`. Unknown rooms read as 0.
    pub fn nutrients(&self, room: &str) -> f64 {
        self.graph
            .room_id(room)
            .map_or(0.0, |id| self.lock().state.nutrients(id))
    }

    /// Trail strength between two rooms, in `[0, 1)`. Symmetric in its
    /// arguments; unknown rooms read as 0.
    pub fn trail_strength(&self, a: &str, b: &str) -> f64 {
        match (self.graph.room_id(a), self.graph.room_id(b)) {
            (Some(id_a), Some(id_b)) => self.lock().state.trail_strength(id_a, id_b),
            _ => 0.0,
        }
    }

    /// Mean ripeness over all known rooms; 0 when there are none.
    pub fn system_ripeness(&self) -> f64 {
        self.lock().state.mean_ripeness()
    }

    /// The current tick number.
    pub fn tick(&self) -> u64 {
        self.lock().clock.tick()
    }

    /// The room graph this engine runs over.
    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }
}
