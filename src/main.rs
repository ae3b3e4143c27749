/*!
 * MonoOS Kernel - Main Entry Point
 *
 * Boots the file I/O layer and drives a short self-check sequence of
 * dispatched syscalls, the same path a trapped caller would take.
 */

use std::error::Error;

use tracing::info;

use mono_os_kernel::syscalls::numbers::*;
use mono_os_kernel::{init_tracing, SyscallDispatcher, SyscallRequest, Utsname};

fn dispatch(kernel: &SyscallDispatcher, opcode: u32, args: [usize; 6]) -> isize {
    let mut req = SyscallRequest::new(opcode, args);
    kernel.dispatch(&mut req);
    req.ret()
}

fn check(name: &str, ret: isize) -> Result<isize, Box<dyn Error>> {
    if ret < 0 {
        return Err(format!("{} failed with errno {}", name, -ret).into());
    }
    Ok(ret)
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    info!("MonoOS kernel starting...");
    let kernel = SyscallDispatcher::boot();

    // System identity
    let mut uts = Utsname::default();
    check(
        "uname",
        dispatch(&kernel, SYS_UNAME, [&mut uts as *mut Utsname as usize, 0, 0, 0, 0, 0]),
    )?;
    let sysname_len = uts.sysname.iter().position(|&b| b == 0).unwrap_or(0);
    info!(
        sysname = %String::from_utf8_lossy(&uts.sysname[..sysname_len]),
        "uname self-check passed"
    );

    // Console write through descriptor 1
    let banner = b"monoos: file I/O layer online\n";
    check(
        "write(stdout)",
        dispatch(
            &kernel,
            SYS_WRITE,
            [1, banner.as_ptr() as usize, banner.len(), 0, 0, 0],
        ),
    )?;

    // Round-trip a file through the syscall surface:
    // open(O_WRONLY | O_CREAT), write, close
    let path = b"/etc/motd\0";
    let fd = check(
        "openat(create)",
        dispatch(
            &kernel,
            SYS_OPENAT,
            [0, path.as_ptr() as usize, 0o101, 0o644, 0, 0],
        ),
    )? as usize;

    let motd = b"welcome to monoos\n";
    check(
        "write(motd)",
        dispatch(
            &kernel,
            SYS_WRITE,
            [fd, motd.as_ptr() as usize, motd.len(), 0, 0, 0],
        ),
    )?;
    check("close(motd)", dispatch(&kernel, SYS_CLOSE, [fd, 0, 0, 0, 0, 0]))?;

    // open(O_RDONLY), read back, close
    let fd = check(
        "openat(read)",
        dispatch(&kernel, SYS_OPENAT, [0, path.as_ptr() as usize, 0, 0, 0, 0]),
    )? as usize;

    let mut buf = [0u8; 64];
    let n = check(
        "read(motd)",
        dispatch(
            &kernel,
            SYS_READ,
            [fd, buf.as_mut_ptr() as usize, buf.len(), 0, 0, 0],
        ),
    )? as usize;
    check("close", dispatch(&kernel, SYS_CLOSE, [fd, 0, 0, 0, 0, 0]))?;

    info!(
        bytes = n,
        contents = %String::from_utf8_lossy(&buf[..n]).trim_end(),
        "file round-trip passed"
    );

    info!("self-check complete, kernel idle");
    Ok(())
}
