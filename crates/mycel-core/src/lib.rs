//! Diffusion and ripening engine for the Mycel network simulation.
//!
//! This crate owns the per-tick update rule that makes the room network feel
//! alive: nutrient generation at the occupied room, trail-weighted diffusion
//! along the graph, trail decay, ripeness accrual, and the one-hop-per-tick
//! milestone cascade. It also owns the engine object that serializes ticks,
//! navigation events, and queries behind a single lock, and the async runner
//! that drives the engine at a fixed period.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter with checked advance.
//! - [`config`] -- Configuration loading from `mycel-config.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- [`NetworkEngine`]: lifecycle, navigation events, and the
//!   query facade.
//! - [`milestone`] -- The derived milestone-hit record.
//! - [`runner`] -- The fixed-period simulation loop.
//! - [`state`] -- [`NetworkState`]: the four persisted maps in their
//!   in-memory, id-indexed form.
//! - [`tick`] -- The five-phase diffusion and ripening step.
//!
//! [`NetworkEngine`]: engine::NetworkEngine
//! [`NetworkState`]: state::NetworkState

pub mod clock;
pub mod config;
pub mod engine;
pub mod milestone;
pub mod runner;
pub mod state;
pub mod tick;

// Re-export primary types at crate root.
pub use clock::{ClockError, TickClock};
pub use config::{ConfigError, EngineConfig, RoomSection, RuntimeConfig, TuningConfig, WorldSection};
pub use engine::NetworkEngine;
pub use milestone::{MilestoneTracker, RIPENESS_MILESTONES};
pub use runner::{NetworkHandle, RunEndReason, RunSummary, run_network};
pub use state::NetworkState;
pub use tick::{TickSummary, run_tick};
