//! Snapshot persistence for the Mycel network simulation.
//!
//! Persistence here is a non-fatal optimization, not a correctness
//! requirement: the network state is fully regenerable from continued
//! activity. Loads that fail for any reason degrade to an empty snapshot;
//! writes are best-effort and their failures are logged and absorbed.
//!
//! # Modules
//!
//! - [`error`] -- Store-level error types (internal; callers in the engine
//!   discard them).
//! - [`snapshot_store`] -- [`SnapshotStore`]: a file-backed JSON store.
//!
//! [`SnapshotStore`]: snapshot_store::SnapshotStore

pub mod error;
pub mod snapshot_store;

// Re-export primary types at crate root.
pub use error::StoreError;
pub use snapshot_store::SnapshotStore;
