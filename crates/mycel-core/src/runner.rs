//! The fixed-period simulation loop.
//!
//! [`run_network`] drives a [`NetworkEngine`] at the configured tick
//! interval, measuring real elapsed time between ticks and handing it to
//! the engine as `dt`. The same clock independently drives opportunistic
//! persistence: every `save_interval_ticks` the current snapshot is written
//! best-effort, and a final save happens on exit.
//!
//! Stopping is cooperative and trivial: [`NetworkHandle::stop`] raises a
//! flag, the loop notices it before the next tick, saves, and returns.
//! There is no in-flight work to cancel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::engine::NetworkEngine;

/// Why the simulation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// The configured tick bound was reached.
    MaxTicksReached,
    /// A stop was requested through the handle.
    StopRequested,
}

/// Result of a simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// The reason the loop ended.
    pub end_reason: RunEndReason,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Shared stop flag for a running simulation loop.
#[derive(Debug, Clone, Default)]
pub struct NetworkHandle {
    /// Set once; the loop exits before its next tick.
    stop: Arc<AtomicBool>,
}

impl NetworkHandle {
    /// Create a handle with no stop requested.
    pub fn new() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request the loop to stop before its next tick.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Drive the engine at a fixed period until stopped or bounded.
///
/// `runtime.max_ticks == 0` runs until [`NetworkHandle::stop`] is called.
/// Every tick's `dt` is the measured elapsed time since the previous tick,
/// so a delayed wakeup integrates correctly instead of losing time.
pub async fn run_network(
    engine: &NetworkEngine,
    runtime: &RuntimeConfig,
    handle: &NetworkHandle,
) -> RunSummary {
    let mut total_ticks: u64 = 0;
    let mut last_tick = Instant::now();

    info!(
        tick_interval_ms = runtime.tick_interval_ms,
        save_interval_ticks = runtime.save_interval_ticks,
        max_ticks = runtime.max_ticks,
        "Simulation loop starting"
    );

    loop {
        // --- Check stop request (before tick) ---
        if handle.is_stop_requested() {
            info!(total_ticks, "Stop requested");
            engine.save();
            return RunSummary {
                end_reason: RunEndReason::StopRequested,
                total_ticks,
            };
        }

        // --- Execute tick ---
        let dt = last_tick.elapsed().as_secs_f64();
        last_tick = Instant::now();
        let summary = engine.advance(dt);
        total_ticks = total_ticks.saturating_add(1);
        debug!(
            tick = summary.tick,
            total_nutrients = summary.total_nutrients,
            "Tick executed"
        );

        // --- Opportunistic persistence ---
        if runtime.save_interval_ticks > 0
            && total_ticks.checked_rem(runtime.save_interval_ticks) == Some(0)
        {
            engine.save();
        }

        // --- Check tick limit (after tick) ---
        if runtime.max_ticks > 0 && total_ticks >= runtime.max_ticks {
            info!(total_ticks, max_ticks = runtime.max_ticks, "Tick limit reached");
            engine.save();
            return RunSummary {
                end_reason: RunEndReason::MaxTicksReached,
                total_ticks,
            };
        }

        // --- Sleep for tick interval ---
        if runtime.tick_interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(runtime.tick_interval_ms))
                .await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use crate::config::TuningConfig;
    use mycel_world::RoomGraph;

    use super::*;

    fn make_engine() -> NetworkEngine {
        let mut graph = RoomGraph::new();
        let _ = graph.add_room("atrium").unwrap();
        let _ = graph.add_room("cellar").unwrap();
        graph.connect("atrium", "cellar").unwrap();
        let engine = NetworkEngine::new(Arc::new(graph), TuningConfig::default(), None);
        engine.start();
        engine
    }

    fn fast_runtime(max_ticks: u64) -> RuntimeConfig {
        RuntimeConfig {
            tick_interval_ms: 0,
            save_interval_ticks: 0,
            max_ticks,
            ..RuntimeConfig::default()
        }
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let engine = make_engine();
        let handle = NetworkHandle::new();

        let summary = run_network(&engine, &fast_runtime(5), &handle).await;
        assert_eq!(summary.end_reason, RunEndReason::MaxTicksReached);
        assert_eq!(summary.total_ticks, 5);
        assert_eq!(engine.tick(), 5);
    }

    #[tokio::test]
    async fn stop_before_first_tick() {
        let engine = make_engine();
        let handle = NetworkHandle::new();
        handle.stop();

        let summary = run_network(&engine, &fast_runtime(0), &handle).await;
        assert_eq!(summary.end_reason, RunEndReason::StopRequested);
        assert_eq!(summary.total_ticks, 0);
        assert_eq!(engine.tick(), 0);
    }

    #[tokio::test]
    async fn cloned_handles_share_the_stop_flag() {
        let handle = NetworkHandle::new();
        let remote = handle.clone();
        remote.stop();
        assert!(handle.is_stop_requested());
    }

    #[tokio::test]
    async fn engine_keeps_state_across_bounded_runs() {
        let engine = make_engine();
        engine.on_enter("atrium");
        let handle = NetworkHandle::new();

        let _ = run_network(&engine, &fast_runtime(10), &handle).await;
        // Presence in the atrium generated nutrients during the run.
        assert!(engine.nutrients("atrium") > 0.0);
    }
}
