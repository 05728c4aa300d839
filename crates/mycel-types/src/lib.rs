//! Shared type definitions for the Mycel network simulation.
//!
//! This crate is the single source of truth for the types that cross the
//! engine's boundaries. The persisted [`Snapshot`] flows downstream to
//! `TypeScript` via `ts-rs` for the visualization layer.
//!
//! # Modules
//!
//! - [`ids`] -- Typed room identifiers and canonical edge keys
//! - [`snapshot`] -- The serializable persistence aggregate
//!
//! [`Snapshot`]: snapshot::Snapshot

pub mod ids;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use ids::{EdgeKey, RoomId};
pub use snapshot::{Snapshot, edge_key_string, split_edge_key};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        let _ = crate::snapshot::Snapshot::export_all();
    }
}
