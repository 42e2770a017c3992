//! ZIP archive creation for module directories.
//!
//! Every entry is rooted under the source directory's base name. Directories
//! are written as stored entries with a trailing `/`; files are deflated and
//! streamed from disk. Entry timestamps are the zip crate's fixed default, so
//! archiving an unchanged tree yields a byte-identical file.

use crate::PackageError;
use crate::Result;
use crate::archive::walker::EntryType;
use crate::archive::walker::WalkEntry;
use crate::archive::walker::base_name;
use crate::archive::walker::collect_entries;
use crate::archive::walker::is_destination;
use crate::archive::walker::resolve_destination;
use crate::config::ArchiveOptions;
use crate::report::ArchiveReport;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;
use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Archives `source` into a ZIP file at `dest`.
///
/// # Examples
///
/// ```no_run
/// use terramod_core::ArchiveOptions;
/// use terramod_core::create_module_archive;
/// use std::path::Path;
///
/// let report = create_module_archive(
///     Path::new("modules/network"),
///     Path::new("network-1.0.0.zip"),
///     &ArchiveOptions::default(),
/// )?;
/// println!("Added {} files", report.files_added);
/// # Ok::<(), terramod_core::PackageError>(())
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - `source` does not exist ([`PackageError::ListDir`] with `NotFound`)
/// - `source` is not a directory ([`PackageError::InvalidSource`])
/// - a module file cannot be read ([`PackageError::ReadFile`])
/// - the archive cannot be created or written ([`PackageError::CreateArchive`])
///
/// On failure after the destination was created, the partial archive is
/// removed.
///
/// Links to regular files are archived with the target's contents under the
/// link's name. Links to directories, dangling links and special files are
/// skipped with a warning in the report.
pub fn create_module_archive(
    source: &Path,
    dest: &Path,
    options: &ArchiveOptions,
) -> Result<ArchiveReport> {
    create_module_archive_with_progress(source, dest, options, &mut NoopProgress)
}

/// Archives `source` into a ZIP file at `dest`, reporting progress.
///
/// # Errors
///
/// Same as [`create_module_archive`].
pub fn create_module_archive_with_progress(
    source: &Path,
    dest: &Path,
    options: &ArchiveOptions,
    progress: &mut dyn ProgressCallback,
) -> Result<ArchiveReport> {
    let metadata = fs::metadata(source).map_err(PackageError::list_dir(source))?;
    if !metadata.is_dir() {
        return Err(PackageError::InvalidSource {
            path: source.to_path_buf(),
        });
    }
    let root_name = base_name(source)?;

    let dest_abs = resolve_destination(dest)?;
    let entries: Vec<WalkEntry> = collect_entries(source, &root_name)?
        .into_iter()
        .filter(|entry| {
            !(entry.entry_type == EntryType::File && is_destination(&entry.path, &dest_abs))
        })
        .collect();

    let file = File::create(dest).map_err(PackageError::create_archive(dest))?;
    let start = std::time::Instant::now();
    let result = write_entries(file, dest, &entries, options, progress);

    match result {
        Ok(mut report) => {
            report.bytes_compressed = fs::metadata(dest)
                .map_err(PackageError::create_archive(dest))?
                .len();
            report.duration = start.elapsed();
            progress.on_complete();
            tracing::debug!(
                archive = %dest.display(),
                files = report.files_added,
                directories = report.directories_added,
                "archive written"
            );
            Ok(report)
        }
        Err(e) => {
            remove_partial_archive(dest);
            Err(e)
        }
    }
}

fn remove_partial_archive(dest: &Path) {
    if let Err(e) = fs::remove_file(dest) {
        tracing::warn!(
            archive = %dest.display(),
            error = %e,
            "failed to remove partial archive"
        );
    } else {
        tracing::debug!(archive = %dest.display(), "removed partial archive");
    }
}

fn zip_error(dest: &Path, context: &str, err: &ZipError) -> PackageError {
    PackageError::CreateArchive {
        path: dest.to_path_buf(),
        source: std::io::Error::other(format!("{context}: {err}")),
    }
}

fn write_entries<W: Write + Seek>(
    writer: W,
    dest: &Path,
    entries: &[WalkEntry],
    options: &ArchiveOptions,
    progress: &mut dyn ProgressCallback,
) -> Result<ArchiveReport> {
    let mut zip = ZipWriter::new(writer);
    let mut report = ArchiveReport::default();

    let file_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(i64::from(options.compression_level)));
    let dir_options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let total = entries.len();
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];

    for (idx, entry) in entries.iter().enumerate() {
        progress.on_entry_start(&entry.archive_path, total, idx + 1);

        match entry.entry_type {
            EntryType::Directory => {
                let dir_name = format!("{}/", normalize_zip_path(&entry.archive_path)?);
                zip.add_directory(dir_name, dir_options)
                    .map_err(|e| zip_error(dest, "failed to add directory", &e))?;
                report.directories_added += 1;
            }
            EntryType::File => {
                add_file(
                    &mut zip,
                    dest,
                    entry,
                    file_options,
                    options,
                    &mut report,
                    progress,
                    &mut buffer,
                )?;
            }
            EntryType::Symlink => {
                report.entries_skipped += 1;
                report.add_warning(format!("Skipped symlink: {}", entry.path.display()));
                tracing::warn!(path = %entry.path.display(), "skipping symlink");
            }
            EntryType::Special => {
                report.entries_skipped += 1;
                report.add_warning(format!("Skipped special file: {}", entry.path.display()));
                tracing::warn!(path = %entry.path.display(), "skipping special file");
            }
        }

        progress.on_entry_complete(&entry.archive_path);
    }

    zip.finish()
        .map_err(|e| zip_error(dest, "failed to finish ZIP archive", &e))?;

    Ok(report)
}

#[allow(clippy::too_many_arguments)]
fn add_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    dest: &Path,
    entry: &WalkEntry,
    file_options: SimpleFileOptions,
    options: &ArchiveOptions,
    report: &mut ArchiveReport,
    progress: &mut dyn ProgressCallback,
    buffer: &mut [u8],
) -> Result<()> {
    // Opening follows a link, so the target's bytes land under the link's name
    let mut file = File::open(&entry.path).map_err(PackageError::read_file(&entry.path))?;

    let file_options = if options.preserve_permissions {
        with_permissions(file_options, &file).map_err(PackageError::read_file(&entry.path))?
    } else {
        file_options
    };

    let archive_name = normalize_zip_path(&entry.archive_path)?;
    zip.start_file(archive_name, file_options)
        .map_err(|e| zip_error(dest, "failed to start file in ZIP", &e))?;

    loop {
        let bytes_read = file
            .read(buffer)
            .map_err(PackageError::read_file(&entry.path))?;
        if bytes_read == 0 {
            break;
        }
        zip.write_all(&buffer[..bytes_read])
            .map_err(PackageError::create_archive(dest))?;
        report.bytes_written += bytes_read as u64;
        progress.on_bytes_written(bytes_read as u64);
    }

    report.files_added += 1;
    Ok(())
}

#[cfg(unix)]
fn with_permissions(
    options: SimpleFileOptions,
    file: &File,
) -> std::io::Result<SimpleFileOptions> {
    use std::os::unix::fs::PermissionsExt;
    let mode = file.metadata()?.permissions().mode();
    Ok(options.unix_permissions(mode))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn with_permissions(
    options: SimpleFileOptions,
    _file: &File,
) -> std::io::Result<SimpleFileOptions> {
    Ok(options)
}

/// Converts a path to ZIP form (UTF-8, forward slashes).
fn normalize_zip_path(path: &Path) -> Result<String> {
    let path_str = path.to_str().ok_or_else(|| {
        PackageError::Io(std::io::Error::other(format!(
            "path is not valid UTF-8: {}",
            path.display()
        )))
    })?;

    #[cfg(windows)]
    let normalized = path_str.replace('\\', "/");

    #[cfg(not(windows))]
    let normalized = path_str.to_string();

    Ok(normalized)
}
