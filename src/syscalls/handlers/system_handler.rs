/*!
 * System Syscall Handlers
 * fcntl/uname/getrandom
 */

use log::debug;
use rand::RngCore;

use crate::memory::bridge;
use crate::syscalls::abi::Utsname;
use crate::syscalls::dispatcher::SyscallDispatcher;
use crate::syscalls::request::SyscallRequest;

impl SyscallDispatcher {
    /// fcntl/fcntl64: descriptor flags are not modeled, always succeeds
    pub(in crate::syscalls) fn fcntl_call(&self, req: &mut SyscallRequest) {
        debug!("fcntl fd={} cmd={}: no-op", req.arg(0), req.arg(1));
        req.complete_ok(0);
    }

    /// uname: writes the static system identity at arg[0]
    pub(in crate::syscalls) fn uname_call(&self, req: &mut SyscallRequest) {
        let record = unsafe { bridge::user_mut::<Utsname>(req.arg(0)) };
        record.fill_identity();
        req.complete_ok(0);
    }

    /// getrandom: fills arg[1] bytes at arg[0] from the process-wide
    /// generator. The request is always fully satisfied in one call;
    /// there is no partial/retry contract.
    pub(in crate::syscalls) fn random_call(&self, req: &mut SyscallRequest) {
        let (addr, len) = (req.arg(0), req.arg(1));
        let buf = unsafe { bridge::user_slice_mut(addr, len) };
        self.rng.lock().fill_bytes(buf);
        req.complete_ok(len);
    }
}
