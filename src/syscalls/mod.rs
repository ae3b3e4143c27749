/*!
 * Syscalls Module
 * Dispatch, descriptor table, and the trapped-request ABI
 */

pub mod abi;
pub mod dispatcher;
pub mod fd;
mod handlers;
pub mod numbers;
pub mod request;

// Re-export public API
pub use abi::{RawStat, Utsname, Winsize};
pub use dispatcher::SyscallDispatcher;
pub use fd::{FdTable, Inode};
pub use request::{RequestState, SyscallRequest, MAX_ARGS};
