/*!
 * Mount Manager
 * Manages filesystem mount points and routing
 */

use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::traits::{FileSystem, OpenFile};
use super::types::*;

/// Internal mount entry
struct MountEntry {
    fs: Arc<dyn FileSystem>,
    readonly: bool,
}

/// Mount manager for filesystem routing
///
/// Resolves paths against the longest matching mount prefix. Registration
/// is idempotency-agnostic: mounting over an existing prefix is rejected,
/// anything else is the backend's concern.
pub struct MountManager {
    mounts: Arc<DashMap<PathBuf, MountEntry, RandomState>>,
    mount_order: Arc<RwLock<Vec<PathBuf>>>, // Longest paths first for proper resolution
}

impl MountManager {
    /// Create new mount manager
    pub fn new() -> Self {
        Self {
            mounts: Arc::new(DashMap::with_hasher(RandomState::new())),
            mount_order: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Mount a filesystem at specified path
    pub fn mount<P: Into<PathBuf>>(&self, mount_path: P, fs: Arc<dyn FileSystem>) -> VfsResult<()> {
        self.mount_with_options(mount_path, fs, false)
    }

    /// Mount a filesystem at specified path with readonly option
    pub fn mount_with_options<P: Into<PathBuf>>(
        &self,
        mount_path: P,
        fs: Arc<dyn FileSystem>,
        readonly: bool,
    ) -> VfsResult<()> {
        let mount_path = self.normalize_path(&mount_path.into());

        if self.mounts.contains_key(&mount_path) {
            return Err(VfsError::AlreadyExists(format!(
                "mount point already exists: {}",
                mount_path.display()
            )));
        }

        self.mounts
            .insert(mount_path.clone(), MountEntry { fs, readonly });

        let mut order = self.mount_order.write();
        order.push(mount_path);
        order.sort_by(|a, b| b.as_os_str().len().cmp(&a.as_os_str().len()));

        Ok(())
    }

    /// Unmount filesystem at specified path
    pub fn unmount<P: AsRef<Path>>(&self, mount_path: P) -> VfsResult<()> {
        let mount_path = self.normalize_path(mount_path.as_ref());

        if self.mounts.remove(&mount_path).is_none() {
            return Err(VfsError::NotFound(format!(
                "mount point not found: {}",
                mount_path.display()
            )));
        }

        let mut order = self.mount_order.write();
        order.retain(|p| p != &mount_path);

        Ok(())
    }

    /// Resolve path to (filesystem, relative_path, readonly)
    fn resolve(&self, path: &Path) -> VfsResult<(Arc<dyn FileSystem>, PathBuf, bool)> {
        let path = self.normalize_path(path);
        let order = self.mount_order.read();

        for mount_path in order.iter() {
            if path.starts_with(mount_path) {
                let entry = self.mounts.get(mount_path).ok_or_else(|| {
                    VfsError::NotFound(format!(
                        "mount point was removed concurrently: {}",
                        mount_path.display()
                    ))
                })?;

                let fs = entry.fs.clone();
                let readonly = entry.readonly;
                let rel_path = if path == *mount_path {
                    PathBuf::from("/")
                } else {
                    path.strip_prefix(mount_path)
                        .map(|p| PathBuf::from("/").join(p))
                        .unwrap_or_else(|_| PathBuf::from("/"))
                };
                return Ok((fs, rel_path, readonly));
            }
        }

        Err(VfsError::NotFound(format!(
            "no filesystem mounted for path: {}",
            path.display()
        )))
    }

    fn check_readonly(&self, readonly: bool) -> VfsResult<()> {
        if readonly {
            Err(VfsError::ReadOnly)
        } else {
            Ok(())
        }
    }

    /// Normalize path (make absolute)
    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            PathBuf::from("/").join(path)
        }
    }

    /// List all mount points
    pub fn list_mounts(&self) -> Vec<(PathBuf, String)> {
        self.mounts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().fs.name().to_string()))
            .collect()
    }

    /// Check if path is a mount point
    pub fn is_mounted<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = self.normalize_path(path.as_ref());
        self.mounts.contains_key(&path)
    }
}

impl Default for MountManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MountManager {
    fn clone(&self) -> Self {
        Self {
            mounts: Arc::clone(&self.mounts),
            mount_order: Arc::clone(&self.mount_order),
        }
    }
}

// Implement FileSystem for MountManager to act as unified interface
impl FileSystem for MountManager {
    fn read(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let (fs, rel_path, _) = self.resolve(path)?;
        fs.read(&rel_path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> VfsResult<()> {
        let (fs, rel_path, readonly) = self.resolve(path)?;
        self.check_readonly(readonly)?;
        fs.write(&rel_path, data)
    }

    fn append(&self, path: &Path, data: &[u8]) -> VfsResult<()> {
        let (fs, rel_path, readonly) = self.resolve(path)?;
        self.check_readonly(readonly)?;
        fs.append(&rel_path, data)
    }

    fn create(&self, path: &Path) -> VfsResult<()> {
        let (fs, rel_path, readonly) = self.resolve(path)?;
        self.check_readonly(readonly)?;
        fs.create(&rel_path)
    }

    fn delete(&self, path: &Path) -> VfsResult<()> {
        let (fs, rel_path, readonly) = self.resolve(path)?;
        self.check_readonly(readonly)?;
        fs.delete(&rel_path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path)
            .map(|(fs, rel_path, _)| fs.exists(&rel_path))
            .unwrap_or(false)
    }

    fn metadata(&self, path: &Path) -> VfsResult<Metadata> {
        let (fs, rel_path, _) = self.resolve(path)?;
        fs.metadata(&rel_path)
    }

    fn create_dir(&self, path: &Path) -> VfsResult<()> {
        let (fs, rel_path, readonly) = self.resolve(path)?;
        self.check_readonly(readonly)?;
        fs.create_dir(&rel_path)
    }

    fn truncate(&self, path: &Path, size: u64) -> VfsResult<()> {
        let (fs, rel_path, readonly) = self.resolve(path)?;
        self.check_readonly(readonly)?;
        fs.truncate(&rel_path, size)
    }

    fn open(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Box<dyn OpenFile>> {
        let (fs, rel_path, readonly) = self.resolve(path)?;
        if flags.is_writable() || flags.truncate || flags.will_create() {
            self.check_readonly(readonly)?;
        }
        fs.open(&rel_path, flags, mode)
    }

    fn name(&self) -> &str {
        "mount"
    }
}
