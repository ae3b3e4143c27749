/*!
 * VFS Open Flags and Mode
 * Flags and modes for file opening operations
 */

use serde::{Deserialize, Serialize};

use super::permissions::Permissions;

/// File open flags
///
/// The syscall surface hands us a raw POSIX flag word; `from_posix` is the
/// only place that word is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", default)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub truncate: bool,
    pub create: bool,
    pub create_new: bool,
}

impl OpenFlags {
    /// Read-only flags
    #[inline]
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Default::default()
        }
    }

    /// Write-only flags
    #[inline]
    #[must_use]
    pub fn write_only() -> Self {
        Self {
            write: true,
            ..Default::default()
        }
    }

    /// Read-write flags
    #[inline]
    #[must_use]
    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            ..Default::default()
        }
    }

    /// Check if any write operation is possible
    #[inline]
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.write || self.append
    }

    /// Check if this open will create a missing file
    #[inline]
    #[must_use]
    pub const fn will_create(&self) -> bool {
        self.create || self.create_new
    }

    /// Decode a POSIX flag word (O_RDONLY = 0, O_WRONLY = 1, O_RDWR = 2,
    /// plus O_CREAT / O_EXCL / O_TRUNC / O_APPEND)
    pub fn from_posix(flags: u32) -> Self {
        let (read, write) = match flags & 0o3 {
            0 => (true, false),
            1 => (false, true),
            _ => (true, true),
        };

        Self {
            read,
            write,
            append: flags & 0o2000 != 0,
            truncate: flags & 0o1000 != 0,
            create: flags & 0o100 != 0,
            create_new: flags & 0o200 != 0,
        }
    }
}

/// Creation mode for newly created files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenMode {
    pub permissions: Permissions,
}

impl OpenMode {
    /// Mode with the given permission bits
    #[inline]
    #[must_use]
    pub const fn new(mode: u32) -> Self {
        Self {
            permissions: Permissions::new(mode),
        }
    }
}

impl Default for OpenMode {
    fn default() -> Self {
        Self {
            permissions: Permissions::readwrite(),
        }
    }
}
