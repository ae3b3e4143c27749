/*!
 * VFS Metadata
 * File metadata including timestamps and permissions
 */

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::file_type::FileType;
use super::permissions::Permissions;

/// File metadata
///
/// Timestamps serialize as whole seconds since the UNIX epoch; the stat
/// output record carries nothing finer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Metadata {
    pub file_type: FileType,
    pub size: u64,
    pub permissions: Permissions,
    #[serde(with = "system_time_secs")]
    pub modified: SystemTime,
    #[serde(with = "system_time_secs")]
    pub created: SystemTime,
}

impl Metadata {
    /// Check if this is a directory
    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }

    /// Check if this is a regular file
    #[inline]
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.file_type, FileType::File)
    }

    /// POSIX `st_mode` word: format bits or'd with the permission mode
    #[inline]
    #[must_use]
    pub fn mode_word(&self) -> u32 {
        self.file_type.mode_bits() | self.permissions.mode
    }

    /// Modification time as whole seconds since the UNIX epoch
    #[must_use]
    pub fn mtime_secs(&self) -> i32 {
        self.modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i32)
            .unwrap_or(0)
    }
}

mod system_time_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
        let secs = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        serializer.serialize_u64(secs)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}
