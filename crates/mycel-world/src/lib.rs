//! Room graph for the Mycel network simulation.
//!
//! This crate models the static adjacency between rooms: which room connects
//! to which. The graph is built once by the host (duplicate and dangling
//! references are construction-time errors) and is read-only for the
//! engine's lifetime -- the engine only ever asks for neighbor lists and
//! name/id translations.
//!
//! # Modules
//!
//! - [`error`] -- Error types for graph construction.
//! - [`graph`] -- [`RoomGraph`]: interned room names, adjacency lists,
//!   neighbor queries, and connectivity diagnostics.
//!
//! [`RoomGraph`]: graph::RoomGraph

pub mod error;
pub mod graph;

// Re-export primary types at crate root.
pub use error::GraphError;
pub use graph::RoomGraph;
