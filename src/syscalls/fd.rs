/*!
 * Descriptor Table
 * Maps small integer handles to owned streams
 */

use log::debug;
use parking_lot::RwLock;

use crate::core::{Errno, SysResult};
use crate::stream::Stream;

/// Handle value marking a released entry
const HANDLE_NONE: i32 = -1;

/// One descriptor table entry.
///
/// Exclusively owns its stream while `in_use`; a released entry keeps its
/// position (the table never shrinks) and becomes eligible for reuse.
pub struct Inode {
    handle: i32,
    stream: Option<Box<dyn Stream>>,
    in_use: bool,
}

impl Inode {
    fn vacant() -> Self {
        Self {
            handle: HANDLE_NONE,
            stream: None,
            in_use: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> i32 {
        self.handle
    }

    /// Borrow the bound stream; `EBADF` when nothing is bound
    pub fn stream_mut(&mut self) -> SysResult<&mut dyn Stream> {
        match self.stream.as_mut() {
            Some(stream) => Ok(&mut **stream),
            None => Err(Errno::EBADF),
        }
    }

    /// Drop stream ownership and mark the slot free.
    ///
    /// The stream is dropped before the handle can ever be reassigned.
    pub fn release(&mut self) {
        self.in_use = false;
        self.stream = None;
        self.handle = HANDLE_NONE;
    }
}

/// The process-wide descriptor table.
///
/// An owned service constructed at boot; the lock enforces the
/// single-mutator discipline the cooperative scheduling model otherwise
/// merely assumes.
pub struct FdTable {
    entries: RwLock<Vec<Inode>>,
}

impl FdTable {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Allocate a handle: first free ascending index, else append.
    ///
    /// The found-check keys on the candidate handle value, so a free slot 0
    /// scans the same as "nothing free" and the table appends instead.
    /// Slot 0 is only ever handed out by the very first allocation after
    /// boot; callers must not rely on it becoming reusable.
    pub fn allocate(&self) -> usize {
        let mut entries = self.entries.write();

        let mut fd = 0;
        for (idx, entry) in entries.iter().enumerate() {
            if !entry.in_use {
                fd = idx;
                break;
            }
        }
        if fd == 0 {
            fd = entries.len();
            entries.push(Inode::vacant());
        }

        let entry = &mut entries[fd];
        entry.in_use = true;
        entry.handle = fd as i32;
        debug!("fd table: allocated handle {}", fd);
        fd
    }

    /// Attach an owned stream to a freshly allocated entry
    pub fn bind_stream(&self, fd: usize, stream: Box<dyn Stream>) -> SysResult<()> {
        let mut entries = self.entries.write();
        let entry = entries.get_mut(fd).ok_or(Errno::EBADF)?;
        if !entry.in_use {
            return Err(Errno::EBADF);
        }
        entry.stream = Some(stream);
        Ok(())
    }

    /// Allocate and bind in one step
    pub fn allocate_with(&self, stream: Box<dyn Stream>) -> usize {
        let fd = self.allocate();
        // The entry was just allocated; binding cannot miss
        let _ = self.bind_stream(fd, stream);
        fd
    }

    /// Look up a live entry and run `f` with exclusive access to it.
    ///
    /// Out-of-range and released handles fail with `EBADF` before `f` runs.
    pub fn with_entry<R>(&self, fd: usize, f: impl FnOnce(&mut Inode) -> R) -> SysResult<R> {
        let mut entries = self.entries.write();
        let entry = entries.get_mut(fd).ok_or(Errno::EBADF)?;
        if !entry.in_use {
            return Err(Errno::EBADF);
        }
        Ok(f(entry))
    }

    /// Release a handle directly (handlers normally release through
    /// `with_entry` so close errors can be surfaced alongside)
    pub fn release(&self, fd: usize) -> SysResult<()> {
        self.with_entry(fd, |entry| entry.release())
    }

    /// Check liveness without touching the entry
    #[must_use]
    pub fn is_open(&self, fd: usize) -> bool {
        self.entries
            .read()
            .get(fd)
            .map(|e| e.in_use)
            .unwrap_or(false)
    }

    /// Current table length (live and released slots)
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for FdTable {
    fn default() -> Self {
        Self::new()
    }
}
