//! Error conversion utilities for CLI.
//!
//! Converts terramod-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance. The original
//! `PackageError` stays reachable through `downcast_ref` so the exit code
//! can be derived from it.

use std::process::ExitCode;
use terramod_core::PackageError;
use terramod_core::storage::StorageError;

/// Exit code for failures that did not come from the packaging core.
const GENERIC_FAILURE: u8 = 1;

fn hint(err: &PackageError) -> Option<&'static str> {
    match err {
        PackageError::ModuleNotFound { .. } | PackageError::NotADirectory { .. } => {
            Some("Pass the path of the module directory, not one of its files.")
        }
        PackageError::NestedDirectory { .. } => {
            Some("Use --skip-nested-dirs to leave subdirectories out of the module checksum.")
        }
        PackageError::VersionFile { .. } => {
            Some("Publishing reads the version from VERSION.txt inside the module directory.")
        }
        PackageError::EmptyVersion => Some("Pass a non-empty version, e.g. --version 1.0.0."),
        PackageError::InvalidVersion { .. } => {
            Some("The version is part of the archive name; it must not contain / or \\.")
        }
        PackageError::CreateArchive { .. } => {
            Some("The output directory must exist and be writable.")
        }
        PackageError::UnsupportedStorage { .. } => Some("Use --storage s3."),
        PackageError::MissingBucket => Some("Use --s3-bucket to select the target bucket."),
        PackageError::MissingModule => Some("Use --module to select the module directory."),
        PackageError::Storage(StorageError::Configuration { .. }) => {
            Some("Check the AWS_* environment variables (region, credentials, endpoint).")
        }
        PackageError::Storage(StorageError::Backend { .. }) => Some(
            "The store could not confirm whether the archive exists; nothing was uploaded.",
        ),
        _ => None,
    }
}

/// Converts `PackageError` to user-friendly anyhow error with context
pub fn convert_package_error(err: PackageError) -> anyhow::Error {
    let message = hint(&err).map_or_else(|| err.to_string(), |h| format!("{err}\nHINT: {h}"));
    anyhow::Error::new(err).context(message)
}

/// Adds CLI context to a core result
pub fn add_package_context<T>(result: Result<T, PackageError>) -> anyhow::Result<T> {
    result.map_err(convert_package_error)
}

/// Maps an error to the process exit code.
pub fn exit_code(err: &anyhow::Error) -> ExitCode {
    let code = err
        .downcast_ref::<PackageError>()
        .map_or(GENERIC_FAILURE, PackageError::exit_code);
    ExitCode::from(code)
}
