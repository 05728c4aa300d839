//! Error types for the `mycel-store` crate.
//!
//! These errors never propagate past the engine boundary: the engine treats
//! every store failure as a recoverable, logged event.

/// Errors that can occur while reading or writing the snapshot blob.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to read or write the snapshot file.
    #[error("snapshot file I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to serialize or deserialize the snapshot.
    #[error("snapshot serialization failed: {source}")]
    Serde {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
