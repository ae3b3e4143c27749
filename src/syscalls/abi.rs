/*!
 * Syscall ABI Records
 * Fixed-layout output structures written into caller-supplied memory
 */

use crate::vfs::types::Metadata;

/// Stat output record, written at the address the caller supplies.
///
/// Conventional x86-32 `stat64` field order; the kernel fills mode,
/// modification seconds, and size, leaving the rest as the caller
/// provided it.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct RawStat {
    pub st_dev: u64,
    pub st_ino: u64,
    pub st_mode: u32,
    pub st_nlink: u32,
    pub st_uid: u32,
    pub st_gid: u32,
    pub st_rdev: u64,
    pub st_size: i64,
    pub st_blksize: i32,
    pub st_blocks: i64,
    pub st_atime: i32,
    pub st_atime_nsec: i32,
    pub st_mtime: i32,
    pub st_mtime_nsec: i32,
    pub st_ctime: i32,
    pub st_ctime_nsec: i32,
}

impl RawStat {
    /// Fill the fields this kernel reports
    pub fn fill(&mut self, meta: &Metadata) {
        self.st_mode = meta.mode_word();
        self.st_mtime = meta.mtime_secs();
        self.st_size = meta.size as i64;
    }
}

/// Field width of every `Utsname` member, NUL terminator included
pub const UTS_FIELD_LEN: usize = 65;

/// Uname output record: six NUL-padded text fields in Linux order
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Utsname {
    pub sysname: [u8; UTS_FIELD_LEN],
    pub nodename: [u8; UTS_FIELD_LEN],
    pub release: [u8; UTS_FIELD_LEN],
    pub version: [u8; UTS_FIELD_LEN],
    pub machine: [u8; UTS_FIELD_LEN],
    pub domainname: [u8; UTS_FIELD_LEN],
}

impl Utsname {
    /// Fill with the static system identity.
    ///
    /// Nothing here is queried from the environment; the unikernel is its
    /// own machine description.
    pub fn fill_identity(&mut self) {
        copy_field(&mut self.sysname, "monoos");
        copy_field(&mut self.nodename, "mono.local");
        copy_field(&mut self.release, env!("CARGO_PKG_VERSION"));
        copy_field(&mut self.version, "monoos unikernel");
        copy_field(&mut self.machine, "x86_64");
        copy_field(&mut self.domainname, "localdomain");
    }
}

impl Default for Utsname {
    fn default() -> Self {
        Self {
            sysname: [0; UTS_FIELD_LEN],
            nodename: [0; UTS_FIELD_LEN],
            release: [0; UTS_FIELD_LEN],
            version: [0; UTS_FIELD_LEN],
            machine: [0; UTS_FIELD_LEN],
            domainname: [0; UTS_FIELD_LEN],
        }
    }
}

/// NUL-pad `src` into a fixed uname field, truncating to keep the
/// terminator
fn copy_field(dst: &mut [u8; UTS_FIELD_LEN], src: &str) {
    dst.fill(0);
    let n = src.len().min(UTS_FIELD_LEN - 1);
    dst[..n].copy_from_slice(&src.as_bytes()[..n]);
}

/// Terminal window size, filled by the console's TIOCGWINSZ ioctl
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Winsize {
    pub ws_row: u16,
    pub ws_col: u16,
    pub ws_xpixel: u16,
    pub ws_ypixel: u16,
}
