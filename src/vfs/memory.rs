/*!
 * In-Memory Filesystem Backend
 * Volatile filesystem backing the unikernel's root mount
 */

use ahash::RandomState;
use dashmap::DashMap;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use super::traits::{FileSystem, OpenFile};
use super::types::*;

/// In-memory filesystem node
#[derive(Debug, Clone)]
enum Node {
    File {
        data: Vec<u8>,
        permissions: Permissions,
        modified: SystemTime,
        created: SystemTime,
    },
    Directory {
        children: HashMap<String, PathBuf>,
        permissions: Permissions,
        created: SystemTime,
    },
}

impl Node {
    fn is_dir(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }

    fn metadata(&self) -> Metadata {
        match self {
            Node::File {
                data,
                permissions,
                modified,
                created,
            } => Metadata {
                file_type: FileType::File,
                size: data.len() as u64,
                permissions: *permissions,
                modified: *modified,
                created: *created,
            },
            Node::Directory {
                permissions,
                created,
                ..
            } => Metadata {
                file_type: FileType::Directory,
                size: 0,
                permissions: *permissions,
                modified: *created,
                created: *created,
            },
        }
    }
}

/// In-memory filesystem implementation
#[derive(Debug, Clone)]
pub struct MemFS {
    nodes: Arc<DashMap<PathBuf, Node, RandomState>>,
    max_size: Option<usize>,
    current_size: Arc<AtomicUsize>,
}

impl MemFS {
    /// Create new in-memory filesystem
    pub fn new() -> Self {
        let nodes = DashMap::with_hasher(RandomState::new());
        nodes.insert(
            PathBuf::from("/"),
            Node::Directory {
                children: HashMap::new(),
                permissions: Permissions::executable(),
                created: SystemTime::now(),
            },
        );

        Self {
            nodes: Arc::new(nodes),
            max_size: None,
            current_size: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create with size limit
    pub fn with_capacity(max_size: usize) -> Self {
        let mut fs = Self::new();
        fs.max_size = Some(max_size);
        fs
    }

    /// Normalize path (make absolute and clean)
    fn normalize(&self, path: &Path) -> PathBuf {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new("/").join(path)
        };
        PathBuf::from(path_clean::clean(&path))
    }

    fn check_space(&self, additional: usize) -> VfsResult<()> {
        if let Some(max) = self.max_size {
            if self.current_size.load(Ordering::SeqCst) + additional > max {
                return Err(VfsError::OutOfSpace);
            }
        }
        self.current_size.fetch_add(additional, Ordering::SeqCst);
        Ok(())
    }

    fn shrink_space(&self, amount: usize) {
        self.current_size.fetch_sub(amount, Ordering::SeqCst);
    }

    fn file_name(&self, path: &Path) -> VfsResult<String> {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| VfsError::InvalidPath(format!("invalid path: {}", path.display())))
    }

    /// Parent must already exist and be a directory
    fn ensure_parent(&self, path: &Path) -> VfsResult<()> {
        if let Some(parent) = path.parent() {
            match self.nodes.get(parent) {
                Some(node) if node.is_dir() => Ok(()),
                Some(_) => Err(VfsError::NotADirectory(parent.display().to_string())),
                None => Err(VfsError::NotFound(format!(
                    "parent directory not found: {}",
                    parent.display()
                ))),
            }
        } else {
            Ok(())
        }
    }

    fn link_child(&self, path: &Path) -> VfsResult<()> {
        let parent = match path.parent() {
            Some(p) => p.to_path_buf(),
            None => return Ok(()),
        };
        let name = self.file_name(path)?;
        match self.nodes.get_mut(&parent) {
            Some(mut node) => match &mut *node {
                Node::Directory { children, .. } => {
                    children.insert(name, path.to_path_buf());
                    Ok(())
                }
                _ => Err(VfsError::NotADirectory(parent.display().to_string())),
            },
            None => Err(VfsError::NotADirectory(parent.display().to_string())),
        }
    }

    fn unlink_child(&self, path: &Path) {
        if let (Some(parent), Ok(name)) = (path.parent(), self.file_name(path)) {
            if let Some(mut node) = self.nodes.get_mut(parent) {
                if let Node::Directory { children, .. } = &mut *node {
                    children.remove(&name);
                }
            }
        }
    }
}

impl Default for MemFS {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemFS {
    fn read(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let path = self.normalize(path);
        match self.nodes.get(&path).map(|n| n.clone()) {
            Some(Node::File { data, .. }) => Ok(data),
            Some(Node::Directory { .. }) => Err(VfsError::IsADirectory(path.display().to_string())),
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    fn write(&self, path: &Path, data: &[u8]) -> VfsResult<()> {
        let path = self.normalize(path);
        self.ensure_parent(&path)?;

        let old_size = match self.nodes.get(&path) {
            Some(node) => match &*node {
                Node::File {
                    data: old,
                    permissions,
                    ..
                } => {
                    if permissions.is_readonly() {
                        return Err(VfsError::PermissionDenied(format!(
                            "file is readonly: {}",
                            path.display()
                        )));
                    }
                    old.len()
                }
                Node::Directory { .. } => {
                    return Err(VfsError::IsADirectory(path.display().to_string()))
                }
            },
            None => 0,
        };

        if data.len() > old_size {
            self.check_space(data.len() - old_size)?;
        } else {
            self.shrink_space(old_size - data.len());
        }

        if !self.nodes.contains_key(&path) {
            if let Err(e) = self.link_child(&path) {
                self.shrink_space(data.len());
                return Err(e);
            }
        }

        let now = SystemTime::now();
        let created = self
            .nodes
            .get(&path)
            .map(|n| n.metadata().created)
            .unwrap_or(now);
        self.nodes.insert(
            path,
            Node::File {
                data: data.to_vec(),
                permissions: Permissions::readwrite(),
                modified: now,
                created,
            },
        );
        Ok(())
    }

    fn append(&self, path: &Path, data: &[u8]) -> VfsResult<()> {
        let path = self.normalize(path);
        self.check_space(data.len())?;

        match self.nodes.get_mut(&path) {
            Some(mut entry) => match &mut *entry {
                Node::File {
                    data: file_data,
                    permissions,
                    modified,
                    ..
                } => {
                    if permissions.is_readonly() {
                        self.shrink_space(data.len());
                        return Err(VfsError::PermissionDenied(format!(
                            "file is readonly: {}",
                            path.display()
                        )));
                    }
                    file_data.extend_from_slice(data);
                    *modified = SystemTime::now();
                    Ok(())
                }
                Node::Directory { .. } => {
                    self.shrink_space(data.len());
                    Err(VfsError::IsADirectory(path.display().to_string()))
                }
            },
            None => {
                self.shrink_space(data.len());
                self.write(&path, data)
            }
        }
    }

    fn create(&self, path: &Path) -> VfsResult<()> {
        self.write(path, &[])
    }

    fn delete(&self, path: &Path) -> VfsResult<()> {
        let path = self.normalize(path);
        match self.nodes.get(&path).map(|n| n.clone()) {
            Some(Node::File { data, .. }) => {
                self.nodes.remove(&path);
                self.unlink_child(&path);
                self.shrink_space(data.len());
                Ok(())
            }
            Some(Node::Directory { .. }) => Err(VfsError::IsADirectory(path.display().to_string())),
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.nodes.contains_key(&self.normalize(path))
    }

    fn metadata(&self, path: &Path) -> VfsResult<Metadata> {
        let path = self.normalize(path);
        self.nodes
            .get(&path)
            .map(|n| n.metadata())
            .ok_or_else(|| VfsError::NotFound(path.display().to_string()))
    }

    fn create_dir(&self, path: &Path) -> VfsResult<()> {
        let path = self.normalize(path);

        // Walk down from the root creating missing components
        let mut current = PathBuf::from("/");
        for component in path.components().skip(1) {
            current.push(component);
            match self.nodes.get(&current).map(|n| n.is_dir()) {
                Some(true) => continue,
                Some(false) => {
                    return Err(VfsError::AlreadyExists(current.display().to_string()))
                }
                None => {
                    self.nodes.insert(
                        current.clone(),
                        Node::Directory {
                            children: HashMap::new(),
                            permissions: Permissions::executable(),
                            created: SystemTime::now(),
                        },
                    );
                    self.link_child(&current)?;
                }
            }
        }
        Ok(())
    }

    fn truncate(&self, path: &Path, size: u64) -> VfsResult<()> {
        let path = self.normalize(path);
        let new_size = size as usize;

        let old_size = match self.nodes.get(&path).map(|n| n.clone()) {
            Some(Node::File { data, .. }) => data.len(),
            Some(Node::Directory { .. }) => {
                return Err(VfsError::IsADirectory(path.display().to_string()))
            }
            None => return Err(VfsError::NotFound(path.display().to_string())),
        };

        if new_size > old_size {
            self.check_space(new_size - old_size)?;
        } else {
            self.shrink_space(old_size - new_size);
        }

        if let Some(mut entry) = self.nodes.get_mut(&path) {
            if let Node::File { data, modified, .. } = &mut *entry {
                data.resize(new_size, 0);
                *modified = SystemTime::now();
            }
        }
        Ok(())
    }

    fn open(&self, path: &Path, flags: OpenFlags, _mode: OpenMode) -> VfsResult<Box<dyn OpenFile>> {
        let path = self.normalize(path);

        match self.nodes.get(&path).map(|n| n.clone()) {
            Some(Node::Directory { .. }) => {
                return Err(VfsError::IsADirectory(path.display().to_string()))
            }
            Some(Node::File { .. }) if flags.create_new => {
                return Err(VfsError::AlreadyExists(path.display().to_string()))
            }
            Some(Node::File { .. }) => {}
            None => {
                if !flags.will_create() {
                    return Err(VfsError::NotFound(path.display().to_string()));
                }
                self.write(&path, &[])?;
            }
        }

        let data = if flags.truncate {
            self.truncate(&path, 0)?;
            Vec::new()
        } else {
            self.read(&path)?
        };

        let mut cursor = Cursor::new(data);
        if flags.append {
            cursor.seek(SeekFrom::End(0)).map_err(|e| {
                VfsError::IoError(format!("seek failed: {}", e))
            })?;
        }

        Ok(Box::new(MemFile {
            fs: self.clone(),
            path,
            cursor,
            flags,
        }))
    }

    fn name(&self) -> &str {
        "memfs"
    }
}

/// In-memory file handle
struct MemFile {
    fs: MemFS,
    path: PathBuf,
    cursor: Cursor<Vec<u8>>,
    flags: OpenFlags,
}

impl Read for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if !self.flags.read {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "file not opened for reading",
            ));
        }
        self.cursor.read(buf)
    }
}

impl Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if !self.flags.is_writable() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "file not opened for writing",
            ));
        }
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Seek for MemFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl OpenFile for MemFile {
    fn sync(&mut self) -> VfsResult<()> {
        if self.flags.is_writable() {
            let data = self.cursor.get_ref().clone();
            self.fs.write(&self.path, &data)?;
        }
        Ok(())
    }

    fn metadata(&self) -> VfsResult<Metadata> {
        self.fs.metadata(&self.path)
    }

    fn set_len(&mut self, size: u64) -> VfsResult<()> {
        self.cursor.get_mut().resize(size as usize, 0);
        Ok(())
    }
}

impl Drop for MemFile {
    fn drop(&mut self) {
        let _ = self.sync();
    }
}
