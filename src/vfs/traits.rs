/*!
 * VFS Traits
 * Core filesystem abstraction traits
 */

use std::io::{Read, Seek, Write};
use std::path::Path;

use super::types::*;

/// Virtual filesystem backend
///
/// The syscall layer consumes this contract through the mount root; it
/// needs path-based open and stat plus the handful of whole-file operations
/// the boot sequence uses to seed fixed paths.
pub trait FileSystem: Send + Sync {
    /// Read entire file contents
    fn read(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Write entire file contents (create or overwrite)
    fn write(&self, path: &Path, data: &[u8]) -> VfsResult<()>;

    /// Append data to file
    fn append(&self, path: &Path, data: &[u8]) -> VfsResult<()>;

    /// Create empty file
    fn create(&self, path: &Path) -> VfsResult<()>;

    /// Delete file
    fn delete(&self, path: &Path) -> VfsResult<()>;

    /// Check if file/directory exists
    fn exists(&self, path: &Path) -> bool;

    /// Get file metadata
    fn metadata(&self, path: &Path) -> VfsResult<Metadata>;

    /// Create directory (including parents)
    fn create_dir(&self, path: &Path) -> VfsResult<()>;

    /// Truncate file to specified size
    fn truncate(&self, path: &Path, size: u64) -> VfsResult<()>;

    /// Open file with specified flags and mode
    fn open(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Box<dyn OpenFile>>;

    /// Get filesystem name/type
    fn name(&self) -> &str;

    /// Check if filesystem is read-only
    fn readonly(&self) -> bool {
        false
    }
}

/// Open file handle
///
/// Positioned read/write over one open file. Implementations sync back to
/// their backend on `sync` and on drop.
pub trait OpenFile: Read + Write + Seek + Send + Sync {
    /// Sync file data to storage
    fn sync(&mut self) -> VfsResult<()>;

    /// Get file metadata
    fn metadata(&self) -> VfsResult<Metadata>;

    /// Set file length
    fn set_len(&mut self, size: u64) -> VfsResult<()>;
}
