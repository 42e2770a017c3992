//! Module version file handling.

use crate::PackageError;
use crate::Result;
use std::fs;
use std::path::Path;

/// Name of the version descriptor inside a module directory.
pub const VERSION_FILE_NAME: &str = "VERSION.txt";

/// Reads the module version from `module_dir/VERSION.txt`.
///
/// A single trailing newline (`\n` or `\r\n`) is stripped; any other
/// whitespace is kept as written.
///
/// # Examples
///
/// ```no_run
/// use terramod_core::read_version;
/// use std::path::Path;
///
/// let version = read_version(Path::new("modules/network"))?;
/// println!("publishing {version}");
/// # Ok::<(), terramod_core::PackageError>(())
/// ```
///
/// # Errors
///
/// Returns [`PackageError::VersionFile`] if the file cannot be read and
/// [`PackageError::EmptyVersion`] if it holds no version.
pub fn read_version(module_dir: &Path) -> Result<String> {
    let path = module_dir.join(VERSION_FILE_NAME);
    let content = fs::read_to_string(&path).map_err(|source| PackageError::VersionFile {
        path: path.clone(),
        source,
    })?;

    let version = content
        .strip_suffix('\n')
        .map_or(content.as_str(), |s| s.strip_suffix('\r').unwrap_or(s));
    validate_version(version)?;
    Ok(version.to_string())
}

/// Checks that a version string is usable in an archive name.
///
/// The version becomes part of a file name and of a remote key, so it must
/// stay a single path component.
///
/// # Examples
///
/// ```
/// use terramod_core::version::validate_version;
///
/// assert!(validate_version("1.0.0-rc.1").is_ok());
/// assert!(validate_version("../1.0.0").is_err());
/// ```
///
/// # Errors
///
/// Returns [`PackageError::EmptyVersion`] for an empty string and
/// [`PackageError::InvalidVersion`] if it contains `/`, `\` or NUL.
pub fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() {
        return Err(PackageError::EmptyVersion);
    }
    if version.contains(['/', '\\', '\0']) {
        return Err(PackageError::InvalidVersion {
            version: version.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn module_with_version(content: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(VERSION_FILE_NAME), content).unwrap();
        temp
    }

    #[test]
    fn test_read_version_strips_trailing_newline() {
        let temp = module_with_version("0.0.1\n");
        assert_eq!(read_version(temp.path()).unwrap(), "0.0.1");
    }

    #[test]
    fn test_read_version_without_newline() {
        let temp = module_with_version("1.4.0");
        assert_eq!(read_version(temp.path()).unwrap(), "1.4.0");
    }

    #[test]
    fn test_read_version_strips_crlf() {
        let temp = module_with_version("2.0.0\r\n");
        assert_eq!(read_version(temp.path()).unwrap(), "2.0.0");
    }

    #[test]
    fn test_read_version_strips_only_one_newline() {
        let temp = module_with_version("3.1.0\n\n");
        assert_eq!(read_version(temp.path()).unwrap(), "3.1.0\n");
    }

    #[test]
    fn test_read_version_empty() {
        let temp = module_with_version("\n");
        assert!(matches!(
            read_version(temp.path()),
            Err(PackageError::EmptyVersion)
        ));
    }

    #[test]
    fn test_validate_version_rejects_path_separators() {
        for version in ["../1.0.0", "1.0/../../x", "1.0\\beta", "1.0\0"] {
            assert!(
                matches!(
                    validate_version(version),
                    Err(PackageError::InvalidVersion { .. })
                ),
                "{version:?} accepted"
            );
        }
        assert!(validate_version("1.0.0").is_ok());
        assert!(validate_version("1.0.0..2").is_ok());
        assert!(validate_version("successful-checksum").is_ok());
    }

    #[test]
    fn test_read_version_with_separator() {
        let temp = module_with_version("../../etc\n");
        assert!(matches!(
            read_version(temp.path()),
            Err(PackageError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_read_version_missing_file() {
        let temp = TempDir::new().unwrap();
        match read_version(temp.path()) {
            Err(PackageError::VersionFile { path, source }) => {
                assert!(path.ends_with(VERSION_FILE_NAME));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected VersionFile error, got {other:?}"),
        }
    }
}
