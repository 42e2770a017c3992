//! Remote object storage used to publish module archives.
//!
//! The packaging core only needs two things from a store: whether an object
//! already exists under a key, and a way to upload a file. Both live behind
//! the [`RemoteStore`] trait so publishing can be exercised against an
//! in-memory store.

mod error;
mod object_store_backend;

pub use error::StorageError;
pub use error::StorageResult;
pub use object_store_backend::ObjectStoreRemote;

use crate::PackageError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A remote object store bound to one bucket or container.
pub trait RemoteStore {
    /// Human-readable location of the store, e.g. `s3://modules`.
    fn location(&self) -> &str;

    /// Reports whether an object exists under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error for any backend failure other than a definitive
    /// "not found", which is `Ok(false)`.
    fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Uploads the file at `source` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the upload fails.
    fn upload(&self, key: &str, source: &Path) -> StorageResult<()>;
}

/// Storage backends accepted for publishing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// Amazon S3 and S3-compatible stores.
    #[default]
    S3,
}

impl StorageBackend {
    /// Backend name as used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::S3 => "s3",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s3" => Ok(Self::S3),
            other => Err(PackageError::UnsupportedStorage {
                backend: other.to_string(),
            }),
        }
    }
}

/// Remote settings for publishing, validated before any I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageTarget {
    /// Selected backend.
    pub backend: StorageBackend,
    /// Bucket the archive is published to.
    pub bucket: String,
}

impl StorageTarget {
    /// Validates a backend name and bucket.
    ///
    /// # Examples
    ///
    /// ```
    /// use terramod_core::storage::StorageTarget;
    ///
    /// let target = StorageTarget::parse("s3", Some("modules"))?;
    /// assert_eq!(target.bucket, "modules");
    /// assert!(StorageTarget::parse("s3", None).is_err());
    /// assert!(StorageTarget::parse("gcs", Some("modules")).is_err());
    /// # Ok::<(), terramod_core::PackageError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::UnsupportedStorage`] for an unknown backend and
    /// [`PackageError::MissingBucket`] if S3 is selected without a bucket.
    pub fn parse(backend: &str, bucket: Option<&str>) -> Result<Self, PackageError> {
        let backend: StorageBackend = backend.parse()?;
        match backend {
            StorageBackend::S3 => {
                let bucket = bucket
                    .filter(|b| !b.is_empty())
                    .ok_or(PackageError::MissingBucket)?;
                Ok(Self {
                    backend,
                    bucket: bucket.to_string(),
                })
            }
        }
    }
}

/// Builds the remote key `<prefix>/<archive_name>`.
///
/// Leading and trailing slashes of the prefix are dropped; an empty prefix
/// yields the bare archive name.
///
/// # Examples
///
/// ```
/// use terramod_core::storage::remote_key;
///
/// assert_eq!(remote_key("modules/", "vpc-1.0.0.zip"), "modules/vpc-1.0.0.zip");
/// assert_eq!(remote_key("", "vpc-1.0.0.zip"), "vpc-1.0.0.zip");
/// ```
#[must_use]
pub fn remote_key(prefix: &str, archive_name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        archive_name.to_string()
    } else {
        format!("{prefix}/{archive_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_key() {
        assert_eq!(remote_key("", "a-1.zip"), "a-1.zip");
        assert_eq!(remote_key("/", "a-1.zip"), "a-1.zip");
        assert_eq!(remote_key("terraform", "a-1.zip"), "terraform/a-1.zip");
        assert_eq!(remote_key("/terraform/modules/", "a-1.zip"), "terraform/modules/a-1.zip");
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!("s3".parse::<StorageBackend>().unwrap_or_default(), StorageBackend::S3);
        let err = "azure".parse::<StorageBackend>();
        assert!(matches!(err, Err(PackageError::UnsupportedStorage { backend }) if backend == "azure"));
        assert_eq!(StorageBackend::S3.to_string(), "s3");
    }

    #[test]
    fn test_storage_target_requires_bucket() {
        assert!(matches!(
            StorageTarget::parse("s3", None),
            Err(PackageError::MissingBucket)
        ));
        assert!(matches!(
            StorageTarget::parse("s3", Some("")),
            Err(PackageError::MissingBucket)
        ));
    }

    #[test]
    fn test_storage_target_backend_checked_first() {
        assert!(matches!(
            StorageTarget::parse("gcs", None),
            Err(PackageError::UnsupportedStorage { .. })
        ));
    }
}
