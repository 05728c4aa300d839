//! Engine binary for the Mycel network simulation.
//!
//! This is the headless entry point that wires the engine together for
//! soak runs and for hosting the simulation behind the exploration
//! experience. It loads configuration, builds the room graph, restores the
//! persisted snapshot, enters the configured start room, and runs the
//! clock until ctrl-c (or the configured tick bound).
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `mycel-config.yaml` (or the path given as
//!    the first argument)
//! 3. Build the room graph and log a connectivity diagnostic
//! 4. Construct the snapshot store and the engine
//! 5. Start the engine (load snapshot, seed defaults, derive milestones)
//! 6. Enter the configured start room
//! 7. Run the simulation loop; ctrl-c requests a clean stop
//! 8. Log the result

mod error;

use std::path::Path;
use std::sync::Arc;

use mycel_core::{EngineConfig, NetworkEngine, NetworkHandle, run_network};
use mycel_store::SnapshotStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration path when no argument is given.
const DEFAULT_CONFIG_PATH: &str = "mycel-config.yaml";

/// Application entry point for the network engine.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the room list is
/// inconsistent; everything after startup degrades gracefully instead of
/// failing.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("mycel-engine starting");

    // 2. Load configuration.
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH));
    let config = EngineConfig::from_file(Path::new(&config_path)).map_err(EngineError::from)?;
    info!(
        world_name = config.world.name,
        config_path = %config_path,
        room_count = config.world.rooms.len(),
        tick_interval_ms = config.runtime.tick_interval_ms,
        "Configuration loaded"
    );

    // 3. Build the room graph.
    let graph = Arc::new(config.world.build_graph().map_err(EngineError::from)?);
    if !graph.is_connected() {
        warn!("Room graph is not fully connected; isolated rooms will never ripen from diffusion");
    }
    info!(rooms = graph.room_count(), "Room graph built");

    // 4. Construct the snapshot store and the engine.
    let store = SnapshotStore::new(&config.runtime.snapshot_path);
    info!(snapshot_path = %store.path().display(), "Snapshot store ready");
    let engine = NetworkEngine::new(Arc::clone(&graph), config.tuning.clone(), Some(store));

    // 5. Start the engine.
    engine.start();

    // 6. Enter the configured start room.
    if let Some(start_room) = config.world.start_room.as_deref() {
        if graph.room_id(start_room).is_none() {
            return Err(Box::new(EngineError::UnknownStartRoom {
                name: start_room.to_owned(),
            }) as Box<dyn std::error::Error>);
        }
        engine.on_enter(start_room);
        info!(room = %start_room, "Entered start room");
    } else {
        info!("No start room configured; waiting for enter events");
    }

    // 7. Run the simulation loop with ctrl-c as the stop signal.
    let handle = NetworkHandle::new();
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-c received, stopping after the current tick");
                handle.stop();
            }
        });
    }

    let summary = run_network(&engine, &config.runtime, &handle).await;

    // 8. Log the result.
    info!(
        reason = ?summary.end_reason,
        total_ticks = summary.total_ticks,
        system_ripeness = engine.system_ripeness(),
        "Simulation ended"
    );

    Ok(())
}
