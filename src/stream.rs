/*!
 * Stream Model
 * Byte streams bound to file descriptors, with optional capabilities
 */

use std::io::{Read, Write};

use log::debug;

use crate::core::{Errno, SysResult};
use crate::vfs::traits::OpenFile;
use crate::vfs::types::Metadata;

/// Stat capability of a stream
///
/// Resolved through `Stream::as_stat`; streams without it make fstat fail
/// with `EINVAL`.
pub trait StatStream {
    fn stat(&self) -> SysResult<Metadata>;
}

/// Ioctl capability of a stream
///
/// Op and argument are forwarded verbatim; the return value is opaque to
/// the dispatcher.
pub trait IoctlStream {
    fn ioctl(&mut self, op: usize, arg: usize) -> SysResult<usize>;
}

/// An open byte stream owned by a descriptor table entry.
///
/// Every stream can be asked to read, write, and close; the wrong-direction
/// halves answer with `EINVAL` (no reader wired) or `EROFS` (no writer
/// wired). Stat and ioctl are optional capabilities resolved by query.
pub trait Stream: Send {
    fn read(&mut self, buf: &mut [u8]) -> SysResult<usize>;

    fn write(&mut self, buf: &[u8]) -> SysResult<usize>;

    fn close(&mut self) -> SysResult<()>;

    fn as_stat(&self) -> Option<&dyn StatStream> {
        None
    }

    fn as_ioctl(&mut self) -> Option<&mut dyn IoctlStream> {
        None
    }
}

/// Placeholder stream with neither half wired.
///
/// Bound to descriptor 3 at boot where the event-poll descriptor lives;
/// close reports `EINVAL` because there is nothing to close.
pub struct NullStream;

impl Stream for NullStream {
    fn read(&mut self, _buf: &mut [u8]) -> SysResult<usize> {
        Err(Errno::EINVAL)
    }

    fn write(&mut self, _buf: &[u8]) -> SysResult<usize> {
        Err(Errno::EROFS)
    }

    fn close(&mut self) -> SysResult<()> {
        Err(Errno::EINVAL)
    }
}

/// Adapter binding a VFS open-file handle to the stream contract.
///
/// Carries the stat capability (backed by the handle's metadata); ioctl is
/// not a file thing and stays unsupported.
pub struct FileStream {
    file: Box<dyn OpenFile>,
}

impl FileStream {
    pub fn new(file: Box<dyn OpenFile>) -> Self {
        Self { file }
    }
}

impl Stream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> SysResult<usize> {
        // End-of-stream surfaces as Ok(0), never as an error
        self.file.read(buf).map_err(Errno::from)
    }

    fn write(&mut self, buf: &[u8]) -> SysResult<usize> {
        self.file.write(buf).map_err(Errno::from)
    }

    fn close(&mut self) -> SysResult<()> {
        debug!("closing file stream");
        self.file.sync().map_err(Errno::from)
    }

    fn as_stat(&self) -> Option<&dyn StatStream> {
        Some(self)
    }
}

impl StatStream for FileStream {
    fn stat(&self) -> SysResult<Metadata> {
        self.file.metadata().map_err(Errno::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::traits::FileSystem;
    use crate::vfs::types::{OpenFlags, OpenMode};
    use crate::vfs::MemFS;
    use std::path::Path;

    #[test]
    fn test_null_stream_directions() {
        let mut stream = NullStream;
        let mut buf = [0u8; 4];
        assert_eq!(stream.read(&mut buf), Err(Errno::EINVAL));
        assert_eq!(stream.write(b"x"), Err(Errno::EROFS));
        assert_eq!(stream.close(), Err(Errno::EINVAL));
        assert!(stream.as_stat().is_none());
        assert!(stream.as_ioctl().is_none());
    }

    fn open_stream(fs: &MemFS, path: &str, flags: OpenFlags) -> FileStream {
        FileStream::new(fs.open(Path::new(path), flags, OpenMode::default()).unwrap())
    }

    #[test]
    fn test_file_stream_read_to_eof() {
        let fs = MemFS::new();
        fs.write(Path::new("/f"), b"abc").unwrap();

        let mut stream = open_stream(&fs, "/f", OpenFlags::read_only());
        let mut buf = [0u8; 8];
        assert_eq!(stream.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
        // Exhausted stream reads as zero bytes
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_file_stream_wrong_direction() {
        let fs = MemFS::new();
        fs.write(Path::new("/f"), b"abc").unwrap();

        let mut stream = open_stream(&fs, "/f", OpenFlags::read_only());
        assert_eq!(stream.write(b"nope"), Err(Errno::EACCES));
    }

    #[test]
    fn test_file_stream_stat_capability() {
        let fs = MemFS::new();
        fs.write(Path::new("/f"), b"12345").unwrap();

        let stream = open_stream(&fs, "/f", OpenFlags::read_only());
        let stat = stream.as_stat().expect("file streams carry stat");
        let meta = stat.stat().unwrap();
        assert_eq!(meta.size, 5);
        assert!(meta.is_file());
    }

    #[test]
    fn test_file_stream_no_ioctl() {
        let fs = MemFS::new();
        fs.write(Path::new("/f"), b"x").unwrap();

        let mut stream = open_stream(&fs, "/f", OpenFlags::read_only());
        assert!(stream.as_ioctl().is_none());
    }

    #[test]
    fn test_file_stream_close_syncs() {
        let fs = MemFS::new();
        fs.write(Path::new("/f"), b"").unwrap();

        let mut stream = open_stream(&fs, "/f", OpenFlags::write_only());
        stream.write(b"written").unwrap();
        stream.close().unwrap();

        assert_eq!(fs.read(Path::new("/f")).unwrap(), b"written");
    }
}
