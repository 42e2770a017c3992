//! Deterministic module directory traversal.
//!
//! Entries are yielded depth-first, parents before children, siblings in
//! file-name order, so a fixed tree always produces the same entry sequence.

use crate::PackageError;
use crate::Result;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Walks a module directory, rooting archive paths at a base name.
///
/// # Examples
///
/// ```no_run
/// use terramod_core::archive::walker::ModuleWalker;
/// use std::path::Path;
///
/// let walker = ModuleWalker::new(Path::new("modules/network"), "network");
/// for entry in walker.walk() {
///     let entry = entry?;
///     println!("{}", entry.archive_path.display());
/// }
/// # Ok::<(), terramod_core::PackageError>(())
/// ```
pub struct ModuleWalker<'a> {
    root: &'a Path,
    base_name: &'a str,
}

impl<'a> ModuleWalker<'a> {
    /// Creates a walker for `root` whose archive paths start with `base_name`.
    #[must_use]
    pub fn new(root: &'a Path, base_name: &'a str) -> Self {
        Self { root, base_name }
    }

    /// Returns an iterator over the entries of the tree, root included.
    ///
    /// Symbolic links are never descended into. A link that resolves to a
    /// regular file is reported as [`EntryType::File`] with the target's
    /// size; see [`classify`] for the other cases.
    ///
    /// # Errors
    ///
    /// Entries may error if a directory cannot be listed or metadata cannot
    /// be read.
    pub fn walk(&self) -> impl Iterator<Item = Result<WalkEntry>> + '_ {
        WalkDir::new(self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .map(move |entry| {
                let entry = entry.map_err(|e| {
                    let path = e.path().unwrap_or(self.root).to_path_buf();
                    let message = format!("walkdir error: {e}");
                    PackageError::ListDir {
                        path,
                        source: e
                            .into_io_error()
                            .unwrap_or_else(|| std::io::Error::other(message)),
                    }
                })?;
                self.build_entry(&entry)
            })
    }

    fn build_entry(&self, entry: &walkdir::DirEntry) -> Result<WalkEntry> {
        let path = entry.path().to_path_buf();
        let entry_type = classify(&path, entry.file_type());

        let size = if entry_type == EntryType::File {
            fs::metadata(&path)
                .map_err(PackageError::read_file(&path))?
                .len()
        } else {
            0
        };

        let archive_path = archive_path(&path, self.root, self.base_name)?;

        Ok(WalkEntry {
            path,
            archive_path,
            entry_type,
            size,
        })
    }
}

/// Classifies a directory entry from its unfollowed file type.
///
/// Symbolic links are resolved once: a link to a regular file is a
/// [`EntryType::File`]; a link to a directory or a dangling link stays
/// [`EntryType::Symlink`]. FIFOs, sockets and device nodes are
/// [`EntryType::Special`]. Module checksums and archives both use this
/// classification, so they always agree on which files a module contains.
#[must_use]
pub fn classify(path: &Path, file_type: fs::FileType) -> EntryType {
    if file_type.is_dir() {
        EntryType::Directory
    } else if file_type.is_file() {
        EntryType::File
    } else if file_type.is_symlink() {
        match fs::metadata(path) {
            Ok(target) if target.is_file() => EntryType::File,
            _ => EntryType::Symlink,
        }
    } else {
        EntryType::Special
    }
}

/// Returns the base name of a directory path.
///
/// Paths without a final component, such as `.` or `..`, are resolved
/// through the filesystem first.
///
/// # Errors
///
/// Returns [`PackageError::InvalidModulePath`] if no UTF-8 base name exists
/// (e.g. `/`), or [`PackageError::ListDir`] if the path cannot be resolved.
pub fn base_name(path: &Path) -> Result<String> {
    let name = match path.file_name() {
        Some(name) => name.to_os_string(),
        None => fs::canonicalize(path)
            .map_err(PackageError::list_dir(path))?
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .ok_or_else(|| PackageError::InvalidModulePath {
                path: path.to_path_buf(),
            })?,
    };
    name.into_string()
        .map_err(|_| PackageError::InvalidModulePath {
            path: path.to_path_buf(),
        })
}

/// Computes `<base_name>/<path relative to root>`.
///
/// The root itself maps to `base_name`.
///
/// # Errors
///
/// Returns an I/O error if `path` is not under `root`.
pub fn archive_path(path: &Path, root: &Path, base_name: &str) -> Result<PathBuf> {
    let relative = path.strip_prefix(root).map_err(|_| {
        PackageError::Io(std::io::Error::other(format!(
            "path {} is not under root directory {}",
            path.display(),
            root.display()
        )))
    })?;

    if relative.as_os_str().is_empty() {
        Ok(PathBuf::from(base_name))
    } else {
        Ok(Path::new(base_name).join(relative))
    }
}

/// A filesystem entry with its computed archive path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Full filesystem path to the entry.
    pub path: PathBuf,

    /// Path inside the archive, rooted at the module base name.
    pub archive_path: PathBuf,

    /// Kind of entry.
    pub entry_type: EntryType,

    /// Size in bytes (0 for everything but files).
    pub size: u64,
}

/// Type of directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Regular file, or a symlink to one.
    File,
    /// Directory.
    Directory,
    /// Symbolic link to a directory, or a dangling link. Skipped.
    Symlink,
    /// FIFO, socket or device node. Skipped.
    Special,
}

impl EntryType {
    /// Whether entries of this type are part of a module.
    #[must_use]
    pub const fn is_skipped(self) -> bool {
        matches!(self, Self::Symlink | Self::Special)
    }
}

/// Resolves an archive path against its canonical parent directory.
///
/// # Errors
///
/// Returns [`PackageError::CreateArchive`] if the parent directory does not
/// exist or `dest` has no file name.
pub(crate) fn resolve_destination(dest: &Path) -> Result<PathBuf> {
    let file_name = dest.file_name().ok_or_else(|| PackageError::CreateArchive {
        path: dest.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "missing file name"),
    })?;
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let parent = fs::canonicalize(parent).map_err(PackageError::create_archive(dest))?;
    Ok(parent.join(file_name))
}

/// Whether `path` names the resolved archive `dest_abs`.
///
/// An archive written inside its own module is neither hashed nor archived.
pub(crate) fn is_destination(path: &Path, dest_abs: &Path) -> bool {
    path.file_name() == dest_abs.file_name()
        && path
            .parent()
            .and_then(|p| fs::canonicalize(p).ok())
            .as_deref()
            == dest_abs.parent()
}

/// Collects all entries under `root` in walk order.
///
/// # Errors
///
/// Returns the first traversal error encountered.
pub fn collect_entries(root: &Path, base_name: &str) -> Result<Vec<WalkEntry>> {
    ModuleWalker::new(root, base_name).walk().collect()
}
