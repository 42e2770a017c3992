//! Reports returned by packaging operations and the progress callback trait.

use crate::checksum::Checksum;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

/// Statistics about one archive creation.
///
/// # Examples
///
/// ```
/// use terramod_core::ArchiveReport;
///
/// let mut report = ArchiveReport::default();
/// report.bytes_written = 1000;
/// report.bytes_compressed = 250;
/// assert_eq!(report.compression_ratio(), 4.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveReport {
    /// Number of files added to the archive.
    pub files_added: usize,

    /// Number of directory entries added, including the root directory.
    pub directories_added: usize,

    /// Number of filesystem entries that were not archived (symlinks that do
    /// not resolve to a regular file, and special files).
    pub entries_skipped: usize,

    /// Total uncompressed bytes streamed into the archive.
    pub bytes_written: u64,

    /// Size of the finished archive file in bytes.
    pub bytes_compressed: u64,

    /// Duration of the archive creation.
    pub duration: Duration,

    /// Warnings generated while archiving.
    pub warnings: Vec<String>,
}

impl ArchiveReport {
    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either size is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }
}

/// Result of packaging one module.
#[derive(Debug, Clone)]
pub struct PackageReport {
    /// Module name (base name of the module directory).
    pub module_name: String,

    /// Version the archive was built for.
    pub version: String,

    /// File name of the archive, `<module>-<version>.zip`.
    pub archive_name: String,

    /// Full path of the written archive.
    pub archive_path: PathBuf,

    /// Module checksum written to `.checksum` before archiving.
    pub checksum: Checksum,

    /// Archive creation statistics.
    pub archive: ArchiveReport,
}

/// What publishing decided to do with the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The archive was absent remotely and has been uploaded.
    Uploaded,
    /// An object already existed under the key; nothing was uploaded.
    AlreadyPresent,
}

/// Result of publishing one module.
#[derive(Debug, Clone)]
pub struct PublishReport {
    /// The packaging step's report.
    pub package: PackageReport,

    /// Store the archive was checked against, e.g. `s3://bucket`.
    pub location: String,

    /// Remote object key.
    pub key: String,

    /// Upload decision.
    pub outcome: PublishOutcome,
}

/// Callback trait for archive creation progress.
///
/// # Examples
///
/// ```
/// use terramod_core::ProgressCallback;
/// use std::path::Path;
///
/// struct Counter(usize);
///
/// impl ProgressCallback for Counter {
///     fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///     fn on_entry_complete(&mut self, _path: &Path) {
///         self.0 += 1;
///     }
///     fn on_complete(&mut self) {}
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called when starting to process an entry.
    ///
    /// # Arguments
    ///
    /// * `path` - Archive path of the entry
    /// * `total` - Total number of entries to write
    /// * `current` - Current entry number (1-indexed)
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called for each chunk of file data streamed into the archive.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called when an entry has been written.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once when the archive is finished.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
