//! Package a module and upload it unless an identical key already exists.

use crate::Result;
use crate::config::PublishConfig;
use crate::package::package_with_progress;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;
use crate::report::PublishOutcome;
use crate::report::PublishReport;
use crate::storage::RemoteStore;
use crate::storage::remote_key;
use crate::version::read_version;

/// Publishes a module to `store`.
///
/// The version is read from the module's `VERSION.txt`. The module is
/// packaged into the configured temp directory, then uploaded under
/// `<prefix>/<module>-<version>.zip` only if no object exists there yet.
///
/// # Examples
///
/// ```no_run
/// use terramod_core::PublishConfig;
/// use terramod_core::publish;
/// use terramod_core::storage::ObjectStoreRemote;
///
/// let store = ObjectStoreRemote::s3("my-modules")?;
/// let config = PublishConfig::new("modules/network").with_prefix("terraform");
/// let report = publish(&config, &store)?;
/// println!("{:?} {}", report.outcome, report.key);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns version file errors, any packaging error, and storage errors. A
/// failed existence check is an error; it never results in an upload.
pub fn publish(config: &PublishConfig, store: &dyn RemoteStore) -> Result<PublishReport> {
    publish_with_progress(config, store, &mut NoopProgress)
}

/// Same as [`publish`], reporting archive progress to `progress`.
///
/// # Errors
///
/// See [`publish`].
pub fn publish_with_progress(
    config: &PublishConfig,
    store: &dyn RemoteStore,
    progress: &mut dyn ProgressCallback,
) -> Result<PublishReport> {
    let version = read_version(&config.module_dir)?;
    let package = package_with_progress(&config.package_config(version), progress)?;
    let key = remote_key(&config.prefix, &package.archive_name);

    let outcome = if store.exists(&key)? {
        tracing::info!(location = store.location(), %key, "archive already published, skipping upload");
        PublishOutcome::AlreadyPresent
    } else {
        store.upload(&key, &package.archive_path)?;
        PublishOutcome::Uploaded
    };

    Ok(PublishReport {
        package,
        location: store.location().to_string(),
        key,
        outcome,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::PackageError;
    use crate::storage::StorageError;
    use crate::storage::StorageResult;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Records calls and answers `exists` from a fixed response.
    struct FakeStore {
        exists: StorageResult<bool>,
        uploads: RefCell<Vec<String>>,
    }

    impl FakeStore {
        fn answering(exists: StorageResult<bool>) -> Self {
            Self {
                exists,
                uploads: RefCell::new(Vec::new()),
            }
        }
    }

    impl RemoteStore for FakeStore {
        fn location(&self) -> &str {
            "fake://bucket"
        }

        fn exists(&self, key: &str) -> StorageResult<bool> {
            match &self.exists {
                Ok(value) => Ok(*value),
                Err(_) => Err(StorageError::Backend {
                    location: "fake://bucket".into(),
                    key: key.into(),
                    message: "Forbidden".into(),
                }),
            }
        }

        fn upload(&self, key: &str, source: &Path) -> StorageResult<()> {
            assert!(source.exists());
            self.uploads.borrow_mut().push(key.to_string());
            Ok(())
        }
    }

    fn versioned_module(temp: &TempDir) -> std::path::PathBuf {
        let dir = temp.path().join("sample_module");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("main.tf"), "output \"id\" { value = 1 }\n").unwrap();
        fs::write(dir.join("VERSION.txt"), "0.0.1\n").unwrap();
        dir
    }

    fn config(temp: &TempDir, module: &Path) -> PublishConfig {
        let build = temp.path().join("build");
        fs::create_dir_all(&build).unwrap();
        PublishConfig::new(module)
            .with_temp_dir(build)
            .with_prefix("terraform/modules")
    }

    #[test]
    fn test_publish_uploads_when_absent() {
        let temp = TempDir::new().unwrap();
        let module = versioned_module(&temp);
        let store = FakeStore::answering(Ok(false));

        let report = publish(&config(&temp, &module), &store).unwrap();

        assert_eq!(report.outcome, PublishOutcome::Uploaded);
        assert_eq!(report.key, "terraform/modules/sample_module-0.0.1.zip");
        assert_eq!(report.location, "fake://bucket");
        assert_eq!(
            store.uploads.borrow().as_slice(),
            ["terraform/modules/sample_module-0.0.1.zip"]
        );
    }

    #[test]
    fn test_publish_skips_when_present() {
        let temp = TempDir::new().unwrap();
        let module = versioned_module(&temp);
        let store = FakeStore::answering(Ok(true));

        let report = publish(&config(&temp, &module), &store).unwrap();

        assert_eq!(report.outcome, PublishOutcome::AlreadyPresent);
        assert!(store.uploads.borrow().is_empty());
        // The archive is still built locally
        assert!(report.package.archive_path.exists());
    }

    #[test]
    fn test_publish_existence_error_does_not_upload() {
        let temp = TempDir::new().unwrap();
        let module = versioned_module(&temp);
        let store = FakeStore::answering(Err(StorageError::Configuration {
            location: String::new(),
            message: String::new(),
        }));

        let err = publish(&config(&temp, &module), &store).unwrap_err();
        assert!(matches!(err, PackageError::Storage(StorageError::Backend { .. })));
        assert!(store.uploads.borrow().is_empty());
    }

    #[test]
    fn test_publish_requires_version_file() {
        let temp = TempDir::new().unwrap();
        let module = versioned_module(&temp);
        fs::remove_file(module.join("VERSION.txt")).unwrap();
        let store = FakeStore::answering(Ok(false));

        let err = publish(&config(&temp, &module), &store).unwrap_err();
        assert!(matches!(err, PackageError::VersionFile { .. }));
    }
}
