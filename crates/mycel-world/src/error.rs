//! Error types for the `mycel-world` crate.
//!
//! All fallible operations here are construction-time: once a graph is
//! built, every query on it is infallible.

/// Errors that can occur while building a room graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A room with this name was already added.
    #[error("duplicate room: {0}")]
    DuplicateRoom(String),

    /// A connection referenced a room name that was never added.
    #[error("unknown room: {0}")]
    UnknownRoom(String),

    /// A connection had the same room at both ends.
    #[error("room cannot connect to itself: {0}")]
    SelfLoop(String),
}
