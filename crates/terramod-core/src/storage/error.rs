//! Error types for remote store operations.

use thiserror::Error;

/// Result type for remote store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while talking to a remote store.
///
/// A definitive "object not found" is never an error: [`exists`] reports it
/// as `Ok(false)`. Everything else surfaces here.
///
/// [`exists`]: super::RemoteStore::exists
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be constructed (credentials, region, runtime).
    #[error("cannot configure store {location}: {message}")]
    Configuration {
        /// Store location, e.g. `s3://bucket`.
        location: String,
        /// Backend message.
        message: String,
    },

    /// The backend answered with an error other than "not found".
    #[error("remote store error for {location}/{key}: {message}")]
    Backend {
        /// Store location, e.g. `s3://bucket`.
        location: String,
        /// Object key.
        key: String,
        /// Backend message.
        message: String,
    },

    /// The local file to upload could not be read.
    #[error("cannot read {path} for upload: {source}")]
    Read {
        /// Local file path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl StorageError {
    /// Returns the object key this error is about, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Backend { key, .. } => Some(key),
            _ => None,
        }
    }
}
