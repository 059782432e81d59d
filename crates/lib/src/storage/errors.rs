//! Error types for the durable storage layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing durable storage.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O failed.
    #[error("Storage I/O failed for {path}")]
    FileIo {
        /// The file being read or written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed for key '{key}'")]
    DeserializationFailed {
        /// The key or file whose contents could not be decoded
        key: String,
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// A persisted record was written by an incompatible format version.
    #[error("Unsupported format version {found} for '{key}' (expected {expected})")]
    UnsupportedVersion {
        /// The key or file carrying the record
        key: String,
        /// The version found on disk
        found: u8,
        /// The version this build understands
        expected: u8,
    },

    /// The store cannot currently serve requests.
    #[error("Storage unavailable: {reason}")]
    Unavailable {
        /// Description of why the store is unavailable
        reason: String,
    },
}

impl StoreError {
    /// Check if this error came from the filesystem.
    pub fn is_io_error(&self) -> bool {
        matches!(self, StoreError::FileIo { .. })
    }

    /// Check if this error means stored data could not be understood.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            StoreError::DeserializationFailed { .. } | StoreError::UnsupportedVersion { .. }
        )
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
