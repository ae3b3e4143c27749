/*!
 * Filesystem Facade
 * The dispatcher's view of the mount root
 *
 * Translates between the syscall world (raw flag words, errno results,
 * streams) and the VFS world (typed flags, VfsError, open-file handles).
 */

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use super::memory::MemFS;
use super::mount::MountManager;
use super::traits::FileSystem;
use super::types::{Metadata, OpenFlags, OpenMode, VfsResult};
use crate::core::{Errno, SysResult};
use crate::stream::{FileStream, Stream};

/// Facade over the process-wide mount root.
///
/// Constructed once at boot with an in-memory filesystem at `/`; additional
/// backends register through `mount`.
pub struct FsFacade {
    root: MountManager,
}

impl FsFacade {
    /// Create the mount root with a fresh in-memory filesystem at `/`
    pub fn new() -> Self {
        let root = MountManager::new();
        root.mount("/", Arc::new(MemFS::new()))
            .expect("mount root filesystem");
        Self { root }
    }

    /// Open a path with a POSIX flag word and creation mode.
    ///
    /// The returned stream exclusively owns the open file; missing paths
    /// come back as `ENOENT`, other backend failures as their errno
    /// projection.
    pub fn open(&self, path: &str, flags: u32, mode: u32) -> SysResult<Box<dyn Stream>> {
        let open_flags = OpenFlags::from_posix(flags);
        debug!("facade: open {} flags={:?}", path, open_flags);

        let file = self
            .root
            .open(Path::new(path), open_flags, OpenMode::new(mode))
            .map_err(Errno::from)?;
        Ok(Box::new(FileStream::new(file)))
    }

    /// Stat a path without opening it
    pub fn stat_path(&self, path: &str) -> SysResult<Metadata> {
        debug!("facade: stat {}", path);
        self.root.metadata(Path::new(path)).map_err(Errno::from)
    }

    /// Register a backend filesystem at a path prefix
    pub fn mount<P: Into<std::path::PathBuf>>(
        &self,
        target: P,
        backend: Arc<dyn FileSystem>,
    ) -> VfsResult<()> {
        let target = target.into();
        info!("mounting {} at {}", backend.name(), target.display());
        self.root.mount(target, backend)
    }

    /// Direct access to the mount root
    pub fn root(&self) -> &MountManager {
        &self.root
    }

    /// Seed the synthetic `/etc` area the runtime expects to find
    pub fn seed_etc(&self) -> VfsResult<()> {
        self.root.create_dir(Path::new("/etc"))?;
        self.root
            .write(Path::new("/etc/hostname"), b"mono.local\n")?;
        self.root.write(
            Path::new("/etc/hosts"),
            b"127.0.0.1\tlocalhost\n127.0.0.1\tmono.local\n",
        )?;
        self.root
            .write(Path::new("/etc/resolv.conf"), b"nameserver 127.0.0.1\n")?;
        Ok(())
    }
}

impl Default for FsFacade {
    fn default() -> Self {
        Self::new()
    }
}
