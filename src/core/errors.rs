/*!
 * Errno Codes
 * POSIX error numbers and the negated-word encoding used at the syscall boundary
 */

use thiserror::Error;

use crate::vfs::types::VfsError;

/// Syscall-level result carrying an errno on failure
///
/// # Must Use
/// Dropped errnos silently lose the failure the caller trapped for
#[must_use = "syscall results carry errnos that must reach the caller"]
pub type SysResult<T> = Result<T, Errno>;

/// POSIX error numbers (x86-32 values)
///
/// The trapped caller sees these as negative return words; `encode` applies
/// the negation exactly once, at the dispatcher boundary.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Errno {
    #[error("operation not permitted")]
    EPERM = 1,
    #[error("no such file or directory")]
    ENOENT = 2,
    #[error("I/O error")]
    EIO = 5,
    #[error("bad file descriptor")]
    EBADF = 9,
    #[error("permission denied")]
    EACCES = 13,
    #[error("file exists")]
    EEXIST = 17,
    #[error("not a directory")]
    ENOTDIR = 20,
    #[error("is a directory")]
    EISDIR = 21,
    #[error("invalid argument")]
    EINVAL = 22,
    #[error("no space left on device")]
    ENOSPC = 28,
    #[error("read-only file system")]
    EROFS = 30,
    #[error("function not implemented")]
    ENOSYS = 38,
}

impl Errno {
    /// Raw errno value
    #[inline]
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Encode as the negative return word delivered to the trapped caller
    #[inline]
    #[must_use]
    pub const fn encode(self) -> isize {
        -(self as i32 as isize)
    }
}

/// Project backend filesystem errors into errno space.
///
/// Not-found keeps its identity; anything the caller cannot act on
/// degrades to the opaque I/O class.
impl From<VfsError> for Errno {
    fn from(err: VfsError) -> Self {
        match err {
            VfsError::NotFound(_) => Errno::ENOENT,
            VfsError::AlreadyExists(_) => Errno::EEXIST,
            VfsError::PermissionDenied(_) => Errno::EACCES,
            VfsError::NotADirectory(_) => Errno::ENOTDIR,
            VfsError::IsADirectory(_) => Errno::EISDIR,
            VfsError::InvalidPath(_) | VfsError::InvalidArgument(_) => Errno::EINVAL,
            VfsError::OutOfSpace => Errno::ENOSPC,
            VfsError::ReadOnly => Errno::EROFS,
            VfsError::IoError(_) | VfsError::NotSupported(_) => Errno::EIO,
        }
    }
}

impl From<std::io::Error> for Errno {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::NotFound => Errno::ENOENT,
            ErrorKind::PermissionDenied => Errno::EACCES,
            ErrorKind::AlreadyExists => Errno::EEXIST,
            ErrorKind::InvalidInput => Errno::EINVAL,
            _ => Errno::EIO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_encoding() {
        assert_eq!(Errno::ENOENT.code(), 2);
        assert_eq!(Errno::ENOENT.encode(), -2);
        assert_eq!(Errno::EBADF.encode(), -9);
        assert_eq!(Errno::ENOSYS.encode(), -38);
    }

    #[test]
    fn test_vfs_error_projection() {
        assert_eq!(
            Errno::from(VfsError::NotFound("missing".to_string())),
            Errno::ENOENT
        );
        assert_eq!(Errno::from(VfsError::ReadOnly), Errno::EROFS);
        assert_eq!(
            Errno::from(VfsError::IoError("backend fault".to_string())),
            Errno::EIO
        );
    }

    #[test]
    fn test_errno_display() {
        assert_eq!(Errno::EBADF.to_string(), "bad file descriptor");
    }
}
