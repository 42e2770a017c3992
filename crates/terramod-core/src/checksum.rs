//! Content digests for files and byte strings.
//!
//! Digests are MD5 rendered as 32 lowercase hex characters. MD5 is used for
//! change detection and compatibility with previously published modules, not
//! for integrity against an adversary.

use crate::PackageError;
use crate::Result;
use md5::Digest;
use md5::Md5;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;

/// Length of a rendered checksum in hex characters.
pub const CHECKSUM_HEX_LEN: usize = 32;

/// A 128-bit content digest rendered as lowercase hex.
///
/// # Examples
///
/// ```
/// use terramod_core::Checksum;
///
/// let checksum = Checksum::of_bytes(b"hello");
/// assert_eq!(checksum.as_str(), "5d41402abc4b2a76b9719d911017c592");
///
/// let parsed: Checksum = "5d41402abc4b2a76b9719d911017c592".parse()?;
/// assert_eq!(parsed, checksum);
/// # Ok::<(), terramod_core::PackageError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    /// Computes the checksum of an in-memory byte string.
    #[must_use]
    pub fn of_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self(format!("{:x}", Md5::digest(bytes.as_ref())))
    }

    /// Returns the hex representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the checksum and returns the hex string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Checksum {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Checksum {
    type Error = PackageError;

    fn try_from(value: String) -> Result<Self> {
        let valid = value.len() == CHECKSUM_HEX_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if valid {
            Ok(Self(value))
        } else {
            Err(PackageError::InvalidChecksum { value })
        }
    }
}

impl FromStr for Checksum {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s.to_string())
    }
}

/// Computes the checksum of a file's contents.
///
/// The file is streamed through the hasher, so arbitrarily large files are
/// hashed in constant memory.
///
/// # Errors
///
/// Returns [`PackageError::ReadFile`] naming `path` if the file cannot be
/// opened or read. Opening a directory succeeds on some platforms but
/// reading it fails, so directories are reported the same way.
pub fn file_checksum(path: &Path) -> Result<Checksum> {
    let mut file = File::open(path).map_err(PackageError::read_file(path))?;
    let mut hasher = Md5::new();
    io::copy(&mut file, &mut hasher).map_err(PackageError::read_file(path))?;
    Ok(Checksum(format!("{:x}", hasher.finalize())))
}

/// Computes the checksum of an in-memory byte string.
#[must_use]
pub fn bytes_checksum(bytes: &[u8]) -> Checksum {
    Checksum::of_bytes(bytes)
}
