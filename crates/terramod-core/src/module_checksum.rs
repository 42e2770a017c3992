//! Module-level checksum computed from the top-level files of a module.
//!
//! The module checksum is the digest of the concatenated hex checksums of
//! every file directly inside the module directory. Entries are folded in
//! file-name order so the result does not depend on the order in which the
//! platform happens to list a directory.

use crate::PackageError;
use crate::Result;
use crate::archive::walker::EntryType;
use crate::archive::walker::classify;
use crate::archive::walker::is_destination;
use crate::archive::walker::resolve_destination;
use crate::checksum::Checksum;
use crate::checksum::file_checksum;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Name of the metadata file the module checksum is persisted to.
pub const CHECKSUM_FILE_NAME: &str = ".checksum";

/// How subdirectories found at the top level of a module are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NestedDirPolicy {
    /// Fail with [`PackageError::NestedDirectory`].
    #[default]
    Reject,
    /// Leave subdirectories out of the checksum. They are still archived.
    Skip,
}

/// Lists the entries that contribute to the module checksum, sorted by name.
///
/// Membership follows [`classify`], the rule the archiver uses: regular
/// files and links to them are hashed, skipped entry types are left out, and
/// `exclude` (a resolved archive path) is never an input.
fn checksum_inputs(
    dir: &Path,
    policy: NestedDirPolicy,
    exclude: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .and_then(|listing| listing.collect::<std::io::Result<Vec<_>>>())
        .map_err(PackageError::list_dir(dir))?;
    entries.sort_by_key(fs::DirEntry::file_name);

    let mut inputs = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(PackageError::list_dir(&path))?;
        match classify(&path, file_type) {
            EntryType::File => {
                if exclude.is_some_and(|archive| is_destination(&path, archive)) {
                    tracing::debug!(path = %path.display(), "leaving output archive out of checksum");
                    continue;
                }
                inputs.push(path);
            }
            EntryType::Directory => match policy {
                NestedDirPolicy::Reject => return Err(PackageError::NestedDirectory { path }),
                NestedDirPolicy::Skip => {
                    tracing::debug!(path = %path.display(), "skipping nested directory in checksum");
                }
            },
            EntryType::Symlink | EntryType::Special => {
                tracing::debug!(path = %path.display(), "skipping non-regular entry in checksum");
            }
        }
    }
    Ok(inputs)
}

fn fold_checksums(inputs: &[PathBuf]) -> Result<Checksum> {
    let mut accumulator = String::new();
    for path in inputs {
        let checksum = file_checksum(path)?;
        tracing::trace!(path = %path.display(), %checksum, "hashed module entry");
        accumulator.push_str(checksum.as_str());
    }
    Ok(Checksum::of_bytes(accumulator.as_bytes()))
}

/// Computes the module checksum of `dir` without modifying it.
///
/// If a `.checksum` file from a previous run is present it is hashed like
/// any other file, so the value differs from the one computed before that
/// file existed.
///
/// # Examples
///
/// ```no_run
/// use terramod_core::NestedDirPolicy;
/// use terramod_core::module_checksum;
/// use std::path::Path;
///
/// let checksum = module_checksum(Path::new("modules/network"), NestedDirPolicy::Skip)?;
/// println!("{checksum}");
/// # Ok::<(), terramod_core::PackageError>(())
/// ```
///
/// # Errors
///
/// Returns [`PackageError::ListDir`] if the directory cannot be listed,
/// [`PackageError::ReadFile`] if an entry cannot be read, and
/// [`PackageError::NestedDirectory`] for a subdirectory under
/// [`NestedDirPolicy::Reject`].
pub fn module_checksum(dir: &Path, policy: NestedDirPolicy) -> Result<Checksum> {
    fold_checksums(&checksum_inputs(dir, policy, None)?)
}

/// Computes the module checksum and writes it to `dir/.checksum`.
///
/// The file holds the bare hex digest without a trailing newline and is
/// replaced if it already exists. On unix it is readable and writable by the
/// owner only.
///
/// # Errors
///
/// Returns an error if the checksum cannot be computed, or
/// [`PackageError::WriteChecksum`] if the file cannot be written. A failed
/// run may leave a previously written `.checksum` in place.
pub fn write_module_checksum(dir: &Path, policy: NestedDirPolicy) -> Result<Checksum> {
    persist(dir, fold_checksums(&checksum_inputs(dir, policy, None)?)?)
}

/// Same as [`write_module_checksum`], leaving the archive at `archive` out
/// of the checksum when it lies inside `dir`.
///
/// # Errors
///
/// Returns [`PackageError::CreateArchive`] if the archive's parent directory
/// does not exist, and the errors of [`write_module_checksum`].
pub fn write_module_checksum_excluding(
    dir: &Path,
    policy: NestedDirPolicy,
    archive: &Path,
) -> Result<Checksum> {
    let archive = resolve_destination(archive)?;
    persist(
        dir,
        fold_checksums(&checksum_inputs(dir, policy, Some(&archive))?)?,
    )
}

fn persist(dir: &Path, checksum: Checksum) -> Result<Checksum> {
    let target = dir.join(CHECKSUM_FILE_NAME);
    fs::write(&target, checksum.as_str()).map_err(PackageError::write_checksum(&target))?;
    restrict_permissions(&target).map_err(PackageError::write_checksum(&target))?;
    tracing::debug!(path = %target.display(), %checksum, "wrote module checksum");
    Ok(checksum)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
