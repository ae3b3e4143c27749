/*!
 * End-to-End Dispatch Tests
 * Trapped-request scenarios through the booted file I/O layer
 */

use std::sync::Arc;

use pretty_assertions::assert_eq;

use mono_os_kernel::syscalls::numbers::*;
use mono_os_kernel::{Console, Errno, RawStat, SyscallDispatcher, SyscallRequest, Utsname, Winsize};

fn boot() -> (SyscallDispatcher, Arc<Console>) {
    let console = Console::captured();
    (
        SyscallDispatcher::boot_with_console(console.clone()),
        console,
    )
}

fn sys(kernel: &SyscallDispatcher, opcode: u32, args: [usize; 6]) -> isize {
    let mut req = SyscallRequest::new(opcode, args);
    kernel.dispatch(&mut req);
    assert!(req.is_completed());
    req.ret()
}

fn open(kernel: &SyscallDispatcher, path: &[u8], flags: usize, mode: usize) -> isize {
    assert_eq!(path.last(), Some(&0), "path must be NUL-terminated");
    sys(
        kernel,
        SYS_OPENAT,
        [0, path.as_ptr() as usize, flags, mode, 0, 0],
    )
}

#[test]
fn test_write_to_stdout() {
    let (kernel, console) = boot();

    let payload = b"hi";
    let ret = sys(
        &kernel,
        SYS_WRITE,
        [1, payload.as_ptr() as usize, payload.len(), 0, 0, 0],
    );

    assert_eq!(ret, 2);
    assert_eq!(console.take_output(), b"hi");
}

#[test]
fn test_read_stdin_at_end_of_input_returns_zero() {
    let (kernel, _console) = boot();

    let mut buf = [0u8; 16];
    let ret = sys(
        &kernel,
        SYS_READ,
        [0, buf.as_mut_ptr() as usize, buf.len(), 0, 0, 0],
    );

    // End-of-input is a successful zero-byte read, never an error
    assert_eq!(ret, 0);
}

#[test]
fn test_read_stdin_with_pending_input() {
    let (kernel, console) = boot();
    console.feed_input(b"typed");

    let mut buf = [0u8; 16];
    let ret = sys(
        &kernel,
        SYS_READ,
        [0, buf.as_mut_ptr() as usize, buf.len(), 0, 0, 0],
    );

    assert_eq!(ret, 5);
    assert_eq!(&buf[..5], b"typed");
}

#[test]
fn test_open_missing_path_allocates_no_descriptor() {
    let (kernel, _console) = boot();
    let before = kernel.fd_table().len();

    let ret = open(&kernel, b"/missing\0", 0, 0);

    assert_eq!(ret, Errno::ENOENT.encode());
    assert_eq!(kernel.fd_table().len(), before);
}

#[test]
fn test_file_round_trip() {
    let (kernel, _console) = boot();

    // O_WRONLY | O_CREAT
    let fd = open(&kernel, b"/data.txt\0", 0o101, 0o644);
    assert_eq!(fd, 4, "first file descriptor after the standard four");

    let payload = b"payload bytes";
    let ret = sys(
        &kernel,
        SYS_WRITE,
        [fd as usize, payload.as_ptr() as usize, payload.len(), 0, 0, 0],
    );
    assert_eq!(ret as usize, payload.len());
    assert_eq!(sys(&kernel, SYS_CLOSE, [fd as usize, 0, 0, 0, 0, 0]), 0);

    // Read it back through a fresh descriptor
    let fd = open(&kernel, b"/data.txt\0", 0, 0) as usize;
    let mut buf = [0u8; 32];
    let n = sys(
        &kernel,
        SYS_READ,
        [fd, buf.as_mut_ptr() as usize, buf.len(), 0, 0, 0],
    );
    assert_eq!(n as usize, payload.len());
    assert_eq!(&buf[..payload.len()], payload);

    // Exhausted stream reads as zero
    let n = sys(
        &kernel,
        SYS_READ,
        [fd, buf.as_mut_ptr() as usize, buf.len(), 0, 0, 0],
    );
    assert_eq!(n, 0);

    assert_eq!(sys(&kernel, SYS_CLOSE, [fd, 0, 0, 0, 0, 0]), 0);
}

#[test]
fn test_descriptor_reuse_through_syscalls() {
    let (kernel, _console) = boot();

    let fd_a = open(&kernel, b"/a\0", 0o101, 0o644);
    let fd_b = open(&kernel, b"/b\0", 0o101, 0o644);
    let fd_c = open(&kernel, b"/c\0", 0o101, 0o644);
    assert_eq!((fd_a, fd_b, fd_c), (4, 5, 6));

    assert_eq!(sys(&kernel, SYS_CLOSE, [fd_b as usize, 0, 0, 0, 0, 0]), 0);

    // First free ascending index is handed out again
    let fd_d = open(&kernel, b"/d\0", 0o101, 0o644);
    assert_eq!(fd_d, 5);
}

#[test]
fn test_fstat_fills_metadata() {
    let (kernel, _console) = boot();

    let fd = open(&kernel, b"/stat-me\0", 0o101, 0o644) as usize;
    let payload = b"123456789";
    sys(
        &kernel,
        SYS_WRITE,
        [fd, payload.as_ptr() as usize, payload.len(), 0, 0, 0],
    );
    sys(&kernel, SYS_CLOSE, [fd, 0, 0, 0, 0, 0]);

    let fd = open(&kernel, b"/stat-me\0", 0, 0) as usize;
    let mut stat = RawStat::default();
    let ret = sys(
        &kernel,
        SYS_FSTAT64,
        [fd, &mut stat as *mut RawStat as usize, 0, 0, 0, 0],
    );

    assert_eq!(ret, 0);
    assert_eq!(stat.st_size, 9);
    assert_eq!(stat.st_mode & 0o170000, 0o100000, "regular file format bits");
    assert!(stat.st_mtime > 0);
}

#[test]
fn test_fstat_without_capability_leaves_output_untouched() {
    let (kernel, _console) = boot();

    // Descriptor 3 is the placeholder stream: no stat capability
    let mut stat = RawStat {
        st_mode: 0xdead,
        st_size: -77,
        st_mtime: 41,
        ..Default::default()
    };
    let ret = sys(
        &kernel,
        SYS_FSTAT64,
        [3, &mut stat as *mut RawStat as usize, 0, 0, 0, 0],
    );

    assert_eq!(ret, Errno::EINVAL.encode());
    assert_eq!(stat.st_mode, 0xdead);
    assert_eq!(stat.st_size, -77);
    assert_eq!(stat.st_mtime, 41);
}

#[test]
fn test_fstatat_by_path() {
    let (kernel, _console) = boot();

    let path = b"/etc/hostname\0";
    let mut stat = RawStat::default();
    let ret = sys(
        &kernel,
        SYS_FSTATAT64,
        [0, path.as_ptr() as usize, &mut stat as *mut RawStat as usize, 0, 0, 0],
    );

    assert_eq!(ret, 0);
    assert!(stat.st_size > 0);

    // Missing paths map to ENOENT, same as open
    let missing = b"/missing\0";
    let ret = sys(
        &kernel,
        SYS_FSTATAT64,
        [0, missing.as_ptr() as usize, &mut stat as *mut RawStat as usize, 0, 0, 0],
    );
    assert_eq!(ret, Errno::ENOENT.encode());
}

#[test]
fn test_ioctl_capability_rules() {
    let (kernel, _console) = boot();

    // The console supports the winsize ioctl
    let mut ws = Winsize::default();
    let ret = sys(
        &kernel,
        SYS_IOCTL,
        [0, 0x5413, &mut ws as *mut Winsize as usize, 0, 0, 0],
    );
    assert_eq!(ret, 0);
    assert_eq!((ws.ws_row, ws.ws_col), (25, 80));

    // File streams carry no ioctl capability
    let fd = open(&kernel, b"/plain\0", 0o101, 0o644) as usize;
    let ret = sys(&kernel, SYS_IOCTL, [fd, 0x5413, 0, 0, 0, 0]);
    assert_eq!(ret, Errno::EINVAL.encode());
}

#[test]
fn test_close_releases_despite_stream_error() {
    let (kernel, _console) = boot();

    // The placeholder stream's close reports EINVAL
    let ret = sys(&kernel, SYS_CLOSE, [3, 0, 0, 0, 0, 0]);
    assert_eq!(ret, Errno::EINVAL.encode());

    // The descriptor is gone regardless
    assert!(!kernel.fd_table().is_open(3));
    let mut buf = [0u8; 1];
    let ret = sys(
        &kernel,
        SYS_READ,
        [3, buf.as_mut_ptr() as usize, 1, 0, 0, 0],
    );
    assert_eq!(ret, Errno::EBADF.encode());
}

#[test]
fn test_bad_descriptor_short_circuits() {
    let (kernel, _console) = boot();

    let mut buf = [0u8; 4];
    for opcode in [SYS_READ, SYS_WRITE, SYS_CLOSE, SYS_FSTAT64, SYS_IOCTL] {
        let ret = sys(
            &kernel,
            opcode,
            [99, buf.as_mut_ptr() as usize, buf.len(), 0, 0, 0],
        );
        assert_eq!(ret, Errno::EBADF.encode(), "opcode {}", opcode);
    }
}

#[test]
fn test_wrong_direction_console_halves() {
    let (kernel, _console) = boot();

    // stdin has no writer
    let payload = b"x";
    let ret = sys(
        &kernel,
        SYS_WRITE,
        [0, payload.as_ptr() as usize, 1, 0, 0, 0],
    );
    assert_eq!(ret, Errno::EROFS.encode());

    // stdout has no reader
    let mut buf = [0u8; 1];
    let ret = sys(
        &kernel,
        SYS_READ,
        [1, buf.as_mut_ptr() as usize, 1, 0, 0, 0],
    );
    assert_eq!(ret, Errno::EINVAL.encode());
}

#[test]
fn test_fcntl_is_a_successful_noop() {
    let (kernel, _console) = boot();
    assert_eq!(sys(&kernel, SYS_FCNTL, [1, 1, 0, 0, 0, 0]), 0);
    assert_eq!(sys(&kernel, SYS_FCNTL64, [99, 3, 0, 0, 0, 0]), 0);
}

#[test]
fn test_uname_identity() {
    let (kernel, _console) = boot();

    let mut uts = Utsname::default();
    let ret = sys(
        &kernel,
        SYS_UNAME,
        [&mut uts as *mut Utsname as usize, 0, 0, 0, 0, 0],
    );
    assert_eq!(ret, 0);

    let field = |buf: &[u8]| {
        let end = buf.iter().position(|&b| b == 0).unwrap();
        String::from_utf8_lossy(&buf[..end]).into_owned()
    };
    assert_eq!(field(&uts.sysname), "monoos");
    assert_eq!(field(&uts.machine), "x86_64");
    assert_eq!(field(&uts.domainname), "localdomain");
}

#[test]
fn test_getrandom_fills_exact_length() {
    let (kernel, _console) = boot();

    let mut first = [0u8; 64];
    let ret = sys(
        &kernel,
        SYS_GETRANDOM,
        [first.as_mut_ptr() as usize, first.len(), 0, 0, 0, 0],
    );
    assert_eq!(ret as usize, first.len());

    let mut second = [0u8; 64];
    let ret = sys(
        &kernel,
        SYS_GETRANDOM,
        [second.as_mut_ptr() as usize, second.len(), 0, 0, 0, 0],
    );
    assert_eq!(ret as usize, second.len());

    // 64 zero bytes (or two identical draws) from a healthy generator is
    // a ~2^-512 event; treat it as failure
    assert_ne!(first, [0u8; 64]);
    assert_ne!(first, second);
}

#[test]
fn test_unknown_opcode_returns_enosys() {
    let (kernel, _console) = boot();
    assert_eq!(sys(&kernel, 4242, [0; 6]), Errno::ENOSYS.encode());
}
