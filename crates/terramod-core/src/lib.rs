//! Checksummed, reproducible packaging of infrastructure-as-code modules.
//!
//! `terramod-core` turns a module directory into a versioned ZIP archive:
//!
//! 1. the module directory is validated
//! 2. a module checksum over its top-level files is written to `.checksum`
//! 3. the directory tree, including `.checksum`, is archived as
//!    `<module>-<version>.zip` with every entry rooted at the module name
//!
//! Publishing adds an existence check against a remote store so an archive
//! that is already there is not uploaded again.
//!
//! # Examples
//!
//! ```no_run
//! use terramod_core::PackageConfig;
//! use terramod_core::package;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PackageConfig::new("modules/network", "1.0.0").with_output_dir("dist");
//! let report = package(&config)?;
//! println!("{} ({})", report.archive_path.display(), report.checksum);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod checksum;
pub mod config;
pub mod error;
pub mod module_checksum;
pub mod package;
pub mod publish;
pub mod report;
pub mod storage;
pub mod version;

// Re-export main API types
pub use archive::create_module_archive;
pub use archive::create_module_archive_with_progress;
pub use checksum::Checksum;
pub use checksum::bytes_checksum;
pub use checksum::file_checksum;
pub use config::ArchiveOptions;
pub use config::PackageConfig;
pub use config::PublishConfig;
pub use error::ErrorKind;
pub use error::PackageError;
pub use error::Result;
pub use module_checksum::CHECKSUM_FILE_NAME;
pub use module_checksum::NestedDirPolicy;
pub use module_checksum::module_checksum;
pub use module_checksum::write_module_checksum;
pub use module_checksum::write_module_checksum_excluding;
pub use package::archive_name;
pub use package::package;
pub use package::package_with_progress;
pub use publish::publish;
pub use publish::publish_with_progress;
pub use report::ArchiveReport;
pub use report::NoopProgress;
pub use report::PackageReport;
pub use report::ProgressCallback;
pub use report::PublishOutcome;
pub use report::PublishReport;
pub use version::VERSION_FILE_NAME;
pub use version::read_version;
