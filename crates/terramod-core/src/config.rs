//! Per-invocation configuration for packaging and publishing.

use crate::module_checksum::NestedDirPolicy;
use std::path::PathBuf;

/// Default deflate compression level.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// Options controlling how the module archive is written.
///
/// # Examples
///
/// ```
/// use terramod_core::ArchiveOptions;
///
/// let options = ArchiveOptions::default().with_compression_level(9);
/// assert_eq!(options.compression_level, 9);
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Deflate compression level (1-9).
    ///
    /// Default: 6. Values outside the range are clamped.
    pub compression_level: u8,

    /// Store unix permission bits on file entries.
    ///
    /// Default: `true`.
    pub preserve_permissions: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            preserve_permissions: true,
        }
    }
}

impl ArchiveOptions {
    /// Sets the compression level, clamped to 1-9.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level.clamp(1, 9);
        self
    }

    /// Sets whether unix permission bits are stored.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }
}

/// Configuration for one packaging run.
///
/// # Examples
///
/// ```
/// use terramod_core::PackageConfig;
///
/// let config = PackageConfig::new("modules/network", "1.2.0").with_output_dir("dist");
/// assert_eq!(config.output_dir.to_str(), Some("dist"));
/// ```
#[derive(Debug, Clone)]
pub struct PackageConfig {
    /// Module directory to package.
    pub module_dir: PathBuf,

    /// Version string used in the archive name.
    pub version: String,

    /// Directory the archive is written to.
    ///
    /// Default: the current directory (`.`).
    pub output_dir: PathBuf,

    /// Archive writer options.
    pub archive: ArchiveOptions,

    /// Treatment of top-level subdirectories in the checksum.
    pub nested_dirs: NestedDirPolicy,
}

impl PackageConfig {
    /// Creates a configuration with default output directory and options.
    #[must_use]
    pub fn new(module_dir: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            module_dir: module_dir.into(),
            version: version.into(),
            output_dir: PathBuf::from("."),
            archive: ArchiveOptions::default(),
            nested_dirs: NestedDirPolicy::default(),
        }
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Sets the archive options.
    #[must_use]
    pub fn with_archive_options(mut self, archive: ArchiveOptions) -> Self {
        self.archive = archive;
        self
    }

    /// Sets the nested directory policy.
    #[must_use]
    pub fn with_nested_dirs(mut self, policy: NestedDirPolicy) -> Self {
        self.nested_dirs = policy;
        self
    }
}

/// Configuration for one publish run.
///
/// The version is read from the module's `VERSION.txt`.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Module directory to package and publish.
    pub module_dir: PathBuf,

    /// Directory the archive is built in before upload.
    ///
    /// Default: the system temporary directory.
    pub temp_dir: PathBuf,

    /// Key prefix in the remote store.
    pub prefix: String,

    /// Archive writer options.
    pub archive: ArchiveOptions,

    /// Treatment of top-level subdirectories in the checksum.
    pub nested_dirs: NestedDirPolicy,
}

impl PublishConfig {
    /// Creates a configuration with an empty prefix and the system temp dir.
    #[must_use]
    pub fn new(module_dir: impl Into<PathBuf>) -> Self {
        Self {
            module_dir: module_dir.into(),
            temp_dir: std::env::temp_dir(),
            prefix: String::new(),
            archive: ArchiveOptions::default(),
            nested_dirs: NestedDirPolicy::default(),
        }
    }

    /// Sets the build directory.
    #[must_use]
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Sets the remote key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the archive options.
    #[must_use]
    pub fn with_archive_options(mut self, archive: ArchiveOptions) -> Self {
        self.archive = archive;
        self
    }

    /// Sets the nested directory policy.
    #[must_use]
    pub fn with_nested_dirs(mut self, policy: NestedDirPolicy) -> Self {
        self.nested_dirs = policy;
        self
    }

    /// Builds the packaging configuration for a given version.
    #[must_use]
    pub fn package_config(&self, version: impl Into<String>) -> PackageConfig {
        PackageConfig::new(self.module_dir.clone(), version)
            .with_output_dir(self.temp_dir.clone())
            .with_archive_options(self.archive.clone())
            .with_nested_dirs(self.nested_dirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_config_defaults() {
        let config = PackageConfig::new("sample_module", "0.0.1");
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.archive.compression_level, DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(config.nested_dirs, NestedDirPolicy::Reject);
    }

    #[test]
    fn test_compression_level_clamped() {
        assert_eq!(ArchiveOptions::default().with_compression_level(0).compression_level, 1);
        assert_eq!(ArchiveOptions::default().with_compression_level(42).compression_level, 9);
    }

    #[test]
    fn test_publish_config_to_package_config() {
        let config = PublishConfig::new("modules/vpc")
            .with_temp_dir("/var/tmp/build")
            .with_prefix("terraform/modules")
            .with_nested_dirs(NestedDirPolicy::Skip);

        let package = config.package_config("2.0.0");
        assert_eq!(package.module_dir, PathBuf::from("modules/vpc"));
        assert_eq!(package.output_dir, PathBuf::from("/var/tmp/build"));
        assert_eq!(package.version, "2.0.0");
        assert_eq!(package.nested_dirs, NestedDirPolicy::Skip);
    }
}
