//! Error types for module packaging and publishing.

use crate::storage::StorageError;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PackageError`.
pub type Result<T> = std::result::Result<T, PackageError>;

/// Broad class of a [`PackageError`].
///
/// Every class is fatal for a packaging run; the class only decides how the
/// failure is reported and which exit code the CLI uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing configuration, detected before any I/O.
    Configuration,
    /// A path did not satisfy the precondition of an operation.
    Precondition,
    /// Reading or writing the filesystem failed.
    Io,
    /// The remote store answered with something other than "not found".
    Remote,
}

/// Errors that can occur while packaging or publishing a module.
#[derive(Error, Debug)]
pub enum PackageError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A module file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    ReadFile {
        /// The file being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A directory could not be listed or one of its entries inspected.
    #[error("cannot list {}: {source}", path.display())]
    ListDir {
        /// The directory or entry being listed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The archive could not be created or written.
    #[error("cannot write archive {}: {source}", path.display())]
    CreateArchive {
        /// The archive being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The `.checksum` file could not be written.
    #[error("cannot write checksum file {}: {source}", path.display())]
    WriteChecksum {
        /// The checksum file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Module directory does not exist.
    #[error("{} directory does not exist", path.display())]
    ModuleNotFound {
        /// The missing module directory.
        path: PathBuf,
    },

    /// Module path exists but is not a directory.
    #[error("{} is not a directory", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// Archive source is not a directory.
    ///
    /// The message is kept verbatim for compatibility with existing tooling
    /// that matches on it.
    #[error("Input path should be a directory")]
    InvalidSource {
        /// The offending source path.
        path: PathBuf,
    },

    /// A module path has no usable base name (e.g. `/`).
    #[error("cannot determine module name from {}", path.display())]
    InvalidModulePath {
        /// The offending path.
        path: PathBuf,
    },

    /// A subdirectory was found at the top level of a module while
    /// computing the module checksum.
    #[error(
        "cannot checksum nested directory {}: only top-level files are hashed",
        path.display()
    )]
    NestedDirectory {
        /// The nested directory.
        path: PathBuf,
    },

    /// The version file could not be read.
    #[error("cannot read version file {}: {source}", path.display())]
    VersionFile {
        /// Path of the version file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The module version is empty.
    #[error("module version must not be empty")]
    EmptyVersion,

    /// The module version cannot be used as part of a file name or key.
    #[error("invalid module version {version:?}: path separators and NUL are not allowed")]
    InvalidVersion {
        /// The rejected version.
        version: String,
    },

    /// A string is not a valid checksum.
    #[error("invalid checksum: {value:?}")]
    InvalidChecksum {
        /// The rejected value.
        value: String,
    },

    /// Requested storage backend is not supported.
    #[error("Only S3 storage is currently supported (got {backend:?})")]
    UnsupportedStorage {
        /// The requested backend name.
        backend: String,
    },

    /// S3 storage was selected without a bucket.
    #[error("S3 Bucket is mandatory")]
    MissingBucket,

    /// Publishing was requested without a module directory.
    #[error("Module folder is mandatory")]
    MissingModule,

    /// Remote store operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PackageError {
    /// Returns the class of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use terramod_core::ErrorKind;
    /// use terramod_core::PackageError;
    ///
    /// assert_eq!(PackageError::MissingBucket.kind(), ErrorKind::Configuration);
    /// assert_eq!(PackageError::EmptyVersion.kind(), ErrorKind::Configuration);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedStorage { .. }
            | Self::MissingBucket
            | Self::MissingModule
            | Self::EmptyVersion
            | Self::InvalidVersion { .. }
            | Self::InvalidChecksum { .. } => ErrorKind::Configuration,
            Self::ModuleNotFound { .. }
            | Self::NotADirectory { .. }
            | Self::InvalidSource { .. }
            | Self::InvalidModulePath { .. }
            | Self::NestedDirectory { .. } => ErrorKind::Precondition,
            Self::Io(_)
            | Self::ReadFile { .. }
            | Self::ListDir { .. }
            | Self::CreateArchive { .. }
            | Self::WriteChecksum { .. }
            | Self::VersionFile { .. } => ErrorKind::Io,
            Self::Storage(_) => ErrorKind::Remote,
        }
    }

    /// Suggested process exit code for the CLI.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Configuration => 2,
            ErrorKind::Precondition => 3,
            ErrorKind::Io => 4,
            ErrorKind::Remote => 5,
        }
    }

    /// Returns the filesystem path this error is about, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::ModuleNotFound { path }
            | Self::NotADirectory { path }
            | Self::InvalidSource { path }
            | Self::InvalidModulePath { path }
            | Self::NestedDirectory { path }
            | Self::ReadFile { path, .. }
            | Self::ListDir { path, .. }
            | Self::CreateArchive { path, .. }
            | Self::WriteChecksum { path, .. }
            | Self::VersionFile { path, .. } => Some(path),
            _ => None,
        }
    }

    pub(crate) fn read_file(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::ReadFile {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn list_dir(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::ListDir {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn create_archive(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::CreateArchive {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write_checksum(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::WriteChecksum {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_source_message_is_stable() {
        let err = PackageError::InvalidSource {
            path: PathBuf::from("module/main.tf"),
        };
        assert_eq!(err.to_string(), "Input path should be a directory");
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn test_module_not_found_message() {
        let err = PackageError::ModuleNotFound {
            path: PathBuf::from("missing_module"),
        };
        assert_eq!(err.to_string(), "missing_module directory does not exist");
        assert_eq!(err.path(), Some(Path::new("missing_module")));
    }

    #[test]
    fn test_not_a_directory_message() {
        let err = PackageError::NotADirectory {
            path: PathBuf::from("main.tf"),
        };
        assert_eq!(err.to_string(), "main.tf is not a directory");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PackageError = io_err.into();
        assert!(matches!(err, PackageError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_io_step_errors_name_the_path() {
        let not_found = || std::io::Error::new(std::io::ErrorKind::NotFound, "No such file");
        let cases = [
            (
                PackageError::read_file(Path::new("m/a.tf"))(not_found()),
                "cannot read m/a.tf: No such file",
            ),
            (
                PackageError::list_dir(Path::new("m"))(not_found()),
                "cannot list m: No such file",
            ),
            (
                PackageError::create_archive(Path::new("dist/m-1.zip"))(not_found()),
                "cannot write archive dist/m-1.zip: No such file",
            ),
            (
                PackageError::write_checksum(Path::new("m/.checksum"))(not_found()),
                "cannot write checksum file m/.checksum: No such file",
            ),
        ];
        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
            assert_eq!(err.kind(), ErrorKind::Io);
            assert_eq!(err.exit_code(), 4);
            assert!(err.path().is_some());
        }
    }

    #[test]
    fn test_invalid_version_is_configuration() {
        let err = PackageError::InvalidVersion {
            version: "../1.0".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("\"../1.0\""));
    }

    #[test]
    fn test_configuration_messages() {
        assert_eq!(PackageError::MissingBucket.to_string(), "S3 Bucket is mandatory");
        assert_eq!(PackageError::MissingModule.to_string(), "Module folder is mandatory");
        assert_eq!(PackageError::MissingModule.kind(), ErrorKind::Configuration);

        let err = PackageError::UnsupportedStorage {
            backend: "gcs".into(),
        };
        assert!(err.to_string().contains("Only S3 storage is currently supported"));
        assert!(err.to_string().contains("gcs"));
    }

    #[test]
    fn test_storage_error_is_remote() {
        let err: PackageError = StorageError::Backend {
            location: "s3://bucket".into(),
            key: "modules/a-1.zip".into(),
            message: "access denied".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_exit_codes_are_distinct_per_kind() {
        let codes = [
            PackageError::MissingBucket.exit_code(),
            PackageError::NestedDirectory {
                path: PathBuf::from("m/sub"),
            }
            .exit_code(),
            PackageError::Io(std::io::Error::other("boom")).exit_code(),
            PackageError::Storage(StorageError::Backend {
                location: "memory".into(),
                key: "k".into(),
                message: "boom".into(),
            })
            .exit_code(),
        ];
        assert_eq!(codes, [2, 3, 4, 5]);
        assert!(codes.iter().all(|c| *c != 0));
    }
}
