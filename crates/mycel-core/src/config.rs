//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `mycel-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file. All
//! tuning fields default to the engine's canonical constants, so an empty
//! document is a complete configuration for an empty world.

use std::path::Path;

use serde::Deserialize;

use mycel_world::{GraphError, RoomGraph};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `mycel-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// World-level settings (name, rooms, start room).
    #[serde(default)]
    pub world: WorldSection,

    /// Diffusion and ripening tuning constants.
    #[serde(default)]
    pub tuning: TuningConfig,

    /// Clock and persistence settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `MYCEL_SNAPSHOT_PATH` overrides `runtime.snapshot_path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.runtime.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.runtime.apply_env_overrides();
        Ok(config)
    }
}

/// World-level configuration: the static room table and adjacency.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldSection {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Room the experience begins in; entered once at startup.
    #[serde(default)]
    pub start_room: Option<String>,

    /// The rooms and their neighbor lists.
    #[serde(default)]
    pub rooms: Vec<RoomSection>,
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            start_room: None,
            rooms: Vec::new(),
        }
    }
}

impl WorldSection {
    /// Build the static room graph from the configured room list.
    ///
    /// Neighbor references to rooms that are not in the list, and
    /// self-references, are skipped with a warning rather than propagated:
    /// a dangling edge in the config must not prevent the experience from
    /// starting.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateRoom`] if the same room name appears
    /// twice in the list.
    pub fn build_graph(&self) -> Result<RoomGraph, GraphError> {
        let mut graph = RoomGraph::new();
        for room in &self.rooms {
            let _ = graph.add_room(&room.name)?;
        }
        for room in &self.rooms {
            for neighbor in &room.neighbors {
                if neighbor == &room.name {
                    tracing::warn!(room = %room.name, "Skipping self-referencing neighbor");
                    continue;
                }
                if graph.room_id(neighbor).is_none() {
                    tracing::warn!(
                        room = %room.name,
                        neighbor = %neighbor,
                        "Skipping neighbor reference to unknown room"
                    );
                    continue;
                }
                graph.connect(&room.name, neighbor)?;
            }
        }
        Ok(graph)
    }
}

/// One room entry in the world section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomSection {
    /// Stable room name, unique within the world.
    pub name: String,

    /// Names of directly-connected rooms. Connections are undirected, so a
    /// neighbor listed on either side is enough.
    #[serde(default)]
    pub neighbors: Vec<String>,
}

/// Diffusion and ripening tuning constants.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TuningConfig {
    /// Nutrients generated per second at the occupied room.
    #[serde(default = "default_gen_rate")]
    pub gen_rate: f64,

    /// Per-second outflow fraction driving propagation.
    #[serde(default = "default_decay")]
    pub decay: f64,

    /// Nutrient level a room must exceed before it starts ripening.
    #[serde(default = "default_ripeness_threshold")]
    pub ripeness_threshold: f64,

    /// Base ripeness gain per second once above the threshold.
    #[serde(default = "default_base_gain")]
    pub base_gain: f64,

    /// Nutrient injection scale for milestone cascades.
    #[serde(default = "default_ethylene_burst")]
    pub ethylene_burst: f64,

    /// Trail boost factor applied to the remaining headroom on traversal.
    #[serde(default = "default_trail_boost")]
    pub trail_boost: f64,

    /// Geometric trail decay factor per tick.
    #[serde(default = "default_trail_decay")]
    pub trail_decay: f64,

    /// Trail strength below which entries are pruned.
    #[serde(default = "default_trail_floor")]
    pub trail_floor: f64,

    /// Nutrient level treated as negligible by the propagation pass.
    #[serde(default = "default_nutrient_floor")]
    pub nutrient_floor: f64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            gen_rate: default_gen_rate(),
            decay: default_decay(),
            ripeness_threshold: default_ripeness_threshold(),
            base_gain: default_base_gain(),
            ethylene_burst: default_ethylene_burst(),
            trail_boost: default_trail_boost(),
            trail_decay: default_trail_decay(),
            trail_floor: default_trail_floor(),
            nutrient_floor: default_nutrient_floor(),
        }
    }
}

/// Clock and persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuntimeConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Save the snapshot every this many ticks. 0 disables periodic saves;
    /// navigation events still save immediately.
    #[serde(default = "default_save_interval_ticks")]
    pub save_interval_ticks: u64,

    /// Path of the snapshot blob.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Stop after this many ticks. 0 means run until stopped.
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            save_interval_ticks: default_save_interval_ticks(),
            snapshot_path: default_snapshot_path(),
            max_ticks: 0,
        }
    }
}

impl RuntimeConfig {
    /// Apply environment-variable overrides.
    ///
    /// `MYCEL_SNAPSHOT_PATH` overrides `snapshot_path`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("MYCEL_SNAPSHOT_PATH")
            && !path.is_empty()
        {
            self.snapshot_path = path;
        }
    }
}

fn default_world_name() -> String {
    String::from("mycel")
}

const fn default_gen_rate() -> f64 {
    0.12
}

const fn default_decay() -> f64 {
    0.25
}

const fn default_ripeness_threshold() -> f64 {
    8.0
}

const fn default_base_gain() -> f64 {
    0.003
}

const fn default_ethylene_burst() -> f64 {
    2.0
}

const fn default_trail_boost() -> f64 {
    0.15
}

const fn default_trail_decay() -> f64 {
    0.997
}

const fn default_trail_floor() -> f64 {
    0.01
}

const fn default_nutrient_floor() -> f64 {
    1e-4
}

const fn default_tick_interval_ms() -> u64 {
    600
}

const fn default_save_interval_ticks() -> u64 {
    20
}

fn default_snapshot_path() -> String {
    String::from("mycel-snapshot.json")
}
