/*!
 * Syscall Dispatcher
 * Opcode routing, owned subsystems, and the boot sequence
 */

use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use log::warn;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::fd::FdTable;
use super::numbers::*;
use super::request::SyscallRequest;
use crate::console::{Console, ConsoleReader, ConsoleWriter};
use crate::core::Errno;
use crate::stream::NullStream;
use crate::vfs::FsFacade;

/// Handler signature: runs synchronously to completion and fires the
/// request's completion signal exactly once before returning
type Handler = fn(&SyscallDispatcher, &mut SyscallRequest);

/// The syscall dispatcher.
///
/// Owns every subsystem a handler touches: the descriptor table, the
/// filesystem facade, the console device, and the random generator. One
/// request is dispatched at a time (the trap layer delivers them serially);
/// the internal locks exist so a multi-threaded embedding cannot break the
/// single-mutator invariants.
pub struct SyscallDispatcher {
    handlers: HashMap<u32, Handler, RandomState>,
    pub(super) fds: FdTable,
    pub(super) vfs: FsFacade,
    console: Arc<Console>,
    pub(super) rng: Mutex<StdRng>,
}

impl SyscallDispatcher {
    /// Boot with a console writing to the host stdout
    pub fn boot() -> Self {
        Self::boot_with_console(Console::new())
    }

    /// Boot against a caller-supplied console (test harnesses use a
    /// capturing one).
    ///
    /// Binds descriptors 0-3, registers every opcode handler, and seeds
    /// the synthetic `/etc` area on the freshly mounted root.
    pub fn boot_with_console(console: Arc<Console>) -> Self {
        let mut dispatcher = Self {
            handlers: HashMap::with_hasher(RandomState::new()),
            fds: FdTable::new(),
            vfs: FsFacade::new(),
            console,
            rng: Mutex::new(StdRng::from_entropy()),
        };

        dispatcher.bind_standard_descriptors();
        dispatcher.register_handlers();
        dispatcher
            .vfs
            .seed_etc()
            .expect("seed /etc on the root filesystem");

        info!("file I/O layer ready: {} opcodes registered", dispatcher.handlers.len());
        dispatcher
    }

    /// Descriptors 0-3: stdin, stdout, stderr, event-poll placeholder
    fn bind_standard_descriptors(&self) {
        let stdin = self
            .fds
            .allocate_with(Box::new(ConsoleReader(self.console.clone())));
        let stdout = self
            .fds
            .allocate_with(Box::new(ConsoleWriter(self.console.clone())));
        let stderr = self
            .fds
            .allocate_with(Box::new(ConsoleWriter(self.console.clone())));
        let epoll = self.fds.allocate_with(Box::new(NullStream));

        debug_assert_eq!((stdin, stdout, stderr, epoll), (0, 1, 2, 3));
        info!("console bound to descriptors 0-2, placeholder at 3");
    }

    fn register_handlers(&mut self) {
        for opcode in [
            SYS_OPENAT,
            SYS_READ,
            SYS_WRITE,
            SYS_CLOSE,
            SYS_FSTAT64,
            SYS_IOCTL,
        ] {
            self.register(opcode, Self::fs_call);
        }
        self.register(SYS_FCNTL, Self::fcntl_call);
        self.register(SYS_FCNTL64, Self::fcntl_call);
        self.register(SYS_FSTATAT64, Self::path_stat_call);
        self.register(SYS_UNAME, Self::uname_call);
        self.register(SYS_GETRANDOM, Self::random_call);
    }

    /// Register a handler for an opcode; later registrations win
    pub fn register(&mut self, opcode: u32, handler: Handler) {
        self.handlers.insert(opcode, handler);
    }

    /// Route a trapped request to its handler and run it to completion.
    ///
    /// Unknown opcodes complete with `ENOSYS`. The request is completed
    /// exactly once by the time this returns.
    pub fn dispatch(&self, req: &mut SyscallRequest) {
        req.route();
        match self.handlers.get(&req.opcode).copied() {
            Some(handler) => {
                req.execute();
                handler(self, req);
                debug_assert!(req.is_completed(), "handler returned without completing");
            }
            None => {
                warn!("unhandled syscall opcode {}", req.opcode);
                req.complete_err(Errno::ENOSYS);
            }
        }
    }

    /// The descriptor table
    pub fn fd_table(&self) -> &FdTable {
        &self.fds
    }

    /// The filesystem facade
    pub fn vfs(&self) -> &FsFacade {
        &self.vfs
    }

    /// The console device
    pub fn console(&self) -> &Arc<Console> {
        &self.console
    }
}
