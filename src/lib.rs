/*!
 * MonoOS Kernel Library
 * File I/O layer of a single-address-space unikernel
 *
 * Turns trapped syscall requests (open/read/write/close/stat/ioctl/uname/
 * random/fcntl) into operations against the in-kernel virtual filesystem,
 * owning the descriptor table and the bridge from raw user addresses to
 * typed buffers along the way.
 */

pub mod console;
pub mod core;
pub mod memory;
pub mod stream;
pub mod syscalls;
pub mod vfs;

// Re-exports
pub use self::console::Console;
pub use self::core::{Errno, SysResult};
pub use self::stream::{FileStream, IoctlStream, NullStream, StatStream, Stream};
pub use self::syscalls::{
    FdTable, RawStat, RequestState, SyscallDispatcher, SyscallRequest, Utsname, Winsize,
};
pub use self::vfs::{FileSystem, FsFacade, MemFS, MountManager};

/// Initialize structured tracing for the kernel binary.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
