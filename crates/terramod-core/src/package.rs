//! Packaging orchestration: validate, checksum, archive.

use crate::PackageError;
use crate::Result;
use crate::archive::create_module_archive_with_progress;
use crate::archive::walker::base_name;
use crate::config::PackageConfig;
use crate::module_checksum::write_module_checksum_excluding;
use crate::report::NoopProgress;
use crate::report::PackageReport;
use crate::report::ProgressCallback;
use crate::version::validate_version;
use std::fs;
use std::io;
use std::path::Path;

/// Packages a module directory into `<output_dir>/<module>-<version>.zip`.
///
/// Steps run strictly in order:
/// 1. the version, module directory and output directory are validated
/// 2. the module checksum is computed and written to `.checksum`
/// 3. the archive is written, including the fresh `.checksum`
///
/// The checksum and the archive agree on membership: every top-level file
/// that is hashed is archived, and an archive written inside the module is
/// part of neither.
///
/// There is no rollback: a failure after step 2 leaves the new `.checksum`
/// in the module directory. A partially written archive is removed.
///
/// # Examples
///
/// ```no_run
/// use terramod_core::PackageConfig;
/// use terramod_core::package;
///
/// let config = PackageConfig::new("modules/network", "1.0.0").with_output_dir("dist");
/// let report = package(&config)?;
/// println!("{} ({})", report.archive_path.display(), report.checksum);
/// # Ok::<(), terramod_core::PackageError>(())
/// ```
///
/// # Errors
///
/// Returns [`PackageError::ModuleNotFound`] or [`PackageError::NotADirectory`]
/// if validation fails, [`PackageError::EmptyVersion`] or
/// [`PackageError::InvalidVersion`] for an unusable version,
/// [`PackageError::CreateArchive`] if the output directory is missing, and
/// checksum or archive errors from the later steps.
pub fn package(config: &PackageConfig) -> Result<PackageReport> {
    package_with_progress(config, &mut NoopProgress)
}

/// Same as [`package`], reporting archive progress to `progress`.
///
/// # Errors
///
/// See [`package`].
pub fn package_with_progress(
    config: &PackageConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<PackageReport> {
    validate_version(&config.version)?;
    validate_module_dir(&config.module_dir)?;
    let module_name = base_name(&config.module_dir)?;
    tracing::debug!(
        module = %config.module_dir.display(),
        version = %config.version,
        "packaging module"
    );

    let archive_name = archive_name(&module_name, &config.version);
    let archive_path = config.output_dir.join(&archive_name);

    let checksum =
        write_module_checksum_excluding(&config.module_dir, config.nested_dirs, &archive_path)?;

    let archive = create_module_archive_with_progress(
        &config.module_dir,
        &archive_path,
        &config.archive,
        progress,
    )?;

    tracing::info!(
        archive = %archive_path.display(),
        %checksum,
        files = archive.files_added,
        "module packaged"
    );

    Ok(PackageReport {
        module_name,
        version: config.version.clone(),
        archive_name,
        archive_path,
        checksum,
        archive,
    })
}

/// Checks that `path` exists and is a directory.
///
/// # Errors
///
/// Returns [`PackageError::ModuleNotFound`] if the path does not exist,
/// [`PackageError::NotADirectory`] if it is not a directory, and
/// [`PackageError::ListDir`] for any other metadata failure.
pub fn validate_module_dir(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(PackageError::NotADirectory {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PackageError::ModuleNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(PackageError::list_dir(path)(e)),
    }
}

/// Returns the archive file name for a module release.
///
/// # Examples
///
/// ```
/// use terramod_core::archive_name;
///
/// assert_eq!(archive_name("sample_module", "0.0.1"), "sample_module-0.0.1.zip");
/// ```
#[must_use]
pub fn archive_name(module_name: &str, version: &str) -> String {
    format!("{module_name}-{version}.zip")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::checksum::Checksum;
    use crate::module_checksum::CHECKSUM_FILE_NAME;
    use crate::module_checksum::NestedDirPolicy;
    use crate::module_checksum::module_checksum;
    use tempfile::TempDir;

    fn sample_module(temp: &TempDir) -> std::path::PathBuf {
        let dir = temp.path().join("sample_module");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("main.tf"), "variable \"name\" {\n  type = string\n}\n").unwrap();
        dir
    }

    #[test]
    fn test_package_writes_archive_and_checksum() {
        let temp = TempDir::new().unwrap();
        let module = sample_module(&temp);
        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();

        let expected = module_checksum(&module, NestedDirPolicy::Reject).unwrap();
        let report = package(&PackageConfig::new(&module, "0.0.1").with_output_dir(&out)).unwrap();

        assert_eq!(report.archive_name, "sample_module-0.0.1.zip");
        assert_eq!(report.archive_path, out.join("sample_module-0.0.1.zip"));
        assert_eq!(report.module_name, "sample_module");
        assert_eq!(report.checksum, expected);
        assert!(report.archive_path.exists());
        assert_eq!(
            fs::read_to_string(module.join(CHECKSUM_FILE_NAME)).unwrap(),
            expected.as_str()
        );
        // main.tf and .checksum
        assert_eq!(report.archive.files_added, 2);
    }

    #[test]
    fn test_package_missing_module() {
        let temp = TempDir::new().unwrap();
        let result = package(&PackageConfig::new(temp.path().join("absent"), "1.0.0"));
        assert!(matches!(result, Err(PackageError::ModuleNotFound { .. })));
    }

    #[test]
    fn test_package_module_is_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("main.tf");
        fs::write(&file, "x").unwrap();

        let result = package(&PackageConfig::new(&file, "1.0.0"));
        assert!(matches!(result, Err(PackageError::NotADirectory { .. })));
    }

    #[test]
    fn test_package_empty_version_rejected_before_side_effects() {
        let temp = TempDir::new().unwrap();
        let module = sample_module(&temp);

        let result = package(&PackageConfig::new(&module, "").with_output_dir(temp.path()));
        assert!(matches!(result, Err(PackageError::EmptyVersion)));
        assert!(!module.join(CHECKSUM_FILE_NAME).exists());
    }

    #[test]
    fn test_package_checksum_failure_writes_no_archive() {
        let temp = TempDir::new().unwrap();
        let module = sample_module(&temp);
        fs::create_dir(module.join("nested")).unwrap();

        let result = package(&PackageConfig::new(&module, "1.0.0").with_output_dir(temp.path()));
        assert!(matches!(result, Err(PackageError::NestedDirectory { .. })));
        assert!(!temp.path().join("sample_module-1.0.0.zip").exists());
    }

    #[test]
    fn test_package_missing_output_dir() {
        let temp = TempDir::new().unwrap();
        let module = sample_module(&temp);

        let dist = temp.path().join("dist");
        let config = PackageConfig::new(&module, "1.0.0").with_output_dir(&dist);

        let err = package(&config).unwrap_err();
        assert!(matches!(err, PackageError::CreateArchive { .. }));
        assert_eq!(err.path(), Some(dist.join("sample_module-1.0.0.zip").as_path()));
        // Detected before the module is touched
        assert!(!module.join(CHECKSUM_FILE_NAME).exists());
    }

    #[test]
    fn test_package_version_with_separator_rejected() {
        let temp = TempDir::new().unwrap();
        let module = sample_module(&temp);
        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();

        for version in ["../escape", "1.0/beta", "1.0\\beta"] {
            let result = package(&PackageConfig::new(&module, version).with_output_dir(&out));
            assert!(
                matches!(result, Err(PackageError::InvalidVersion { .. })),
                "{version:?} accepted"
            );
        }
        assert!(!module.join(CHECKSUM_FILE_NAME).exists());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_package_checksum_matches_archived_files() {
        let temp = TempDir::new().unwrap();
        let module = sample_module(&temp);
        fs::write(module.join("outputs.tf"), "output \"id\" {}\n").unwrap();
        // A build left in the module by an earlier run of the same version
        fs::write(module.join("sample_module-1.0.0.zip"), "previous build").unwrap();
        #[cfg(unix)]
        {
            fs::write(temp.path().join("shared.tf"), "locals {}\n").unwrap();
            std::os::unix::fs::symlink(temp.path().join("shared.tf"), module.join("shared.tf"))
                .unwrap();
        }

        let report =
            package(&PackageConfig::new(&module, "1.0.0").with_output_dir(&module)).unwrap();

        assert_eq!(report.checksum, checksum_of_archived_files(&report.archive_path));
    }

    /// Folds the digests of the archived top-level files, leaving out the
    /// `.checksum` that was written after hashing.
    fn checksum_of_archived_files(archive: &std::path::Path) -> Checksum {
        use std::io::Read as _;

        let mut zip = zip::ZipArchive::new(fs::File::open(archive).unwrap()).unwrap();
        let mut names: Vec<String> = zip
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .filter(|name| name.matches('/').count() == 1)
            .filter(|name| !name.ends_with(&format!("/{CHECKSUM_FILE_NAME}")))
            .map(str::to_string)
            .collect();
        names.sort();

        let mut folded = String::new();
        for name in names {
            let mut content = Vec::new();
            zip.by_name(&name).unwrap().read_to_end(&mut content).unwrap();
            folded.push_str(Checksum::of_bytes(&content).as_str());
        }
        Checksum::of_bytes(folded)
    }

    #[test]
    fn test_archive_name() {
        assert_eq!(archive_name("vpc", "1.2.3"), "vpc-1.2.3.zip");
        assert_eq!(archive_name("vpc", "successful-checksum"), "vpc-successful-checksum.zip");
    }
}
