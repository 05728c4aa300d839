//! Error types for the engine binary.

/// Errors that can occur while wiring up and starting the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded or parsed.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: mycel_core::ConfigError,
    },

    /// The configured room list could not be turned into a graph.
    #[error("graph error: {source}")]
    Graph {
        /// The underlying graph error.
        #[from]
        source: mycel_world::GraphError,
    },

    /// The configured start room is not in the room list.
    #[error("start room is not a configured room: {name}")]
    UnknownStartRoom {
        /// The offending room name.
        name: String,
    },
}
