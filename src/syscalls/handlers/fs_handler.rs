/*!
 * File System Syscall Handlers
 * open/read/write/close/fstat/ioctl/fstatat against the descriptor table
 */

use log::debug;

use crate::core::{Errno, SysResult};
use crate::memory::bridge;
use crate::syscalls::abi::RawStat;
use crate::syscalls::dispatcher::SyscallDispatcher;
use crate::syscalls::fd::Inode;
use crate::syscalls::numbers::*;
use crate::syscalls::request::SyscallRequest;

impl SyscallDispatcher {
    /// Shared handler for the descriptor-based file syscalls.
    ///
    /// Open is special-cased first: it consumes no descriptor and encodes
    /// its result inline. Everything else resolves the descriptor from
    /// arg[0] and short-circuits with `EBADF` before any handler-specific
    /// logic runs; the success-or-errno encoding is applied centrally once
    /// after the handler body.
    pub(in crate::syscalls) fn fs_call(&self, req: &mut SyscallRequest) {
        if req.opcode == SYS_OPENAT {
            let result = self.sys_open(req);
            req.complete_result(result);
            return;
        }

        let fd = req.arg(0);
        let result = self.fds.with_entry(fd, |inode| match req.opcode {
            SYS_READ => self.sys_read(inode, req.arg(1), req.arg(2)),
            SYS_WRITE => self.sys_write(inode, req.arg(1), req.arg(2)),
            SYS_CLOSE => self.sys_close(inode),
            SYS_FSTAT64 => self.sys_fstat(inode, req.arg(1)),
            SYS_IOCTL => self.sys_ioctl(inode, req.arg(1), req.arg(2)),
            _ => Err(Errno::ENOSYS),
        });

        req.complete_result(result.and_then(|inner| inner));
    }

    /// openat: arg[0] dir-fd is ignored, the path is taken as given.
    ///
    /// The descriptor is allocated only after the filesystem open succeeds,
    /// so a failed open leaves the table untouched.
    fn sys_open(&self, req: &mut SyscallRequest) -> SysResult<usize> {
        let path = unsafe { bridge::user_cstr(req.arg(1)) };
        let flags = req.arg(2) as u32;
        let mode = req.arg(3) as u32;

        let stream = self.vfs.open(&path, flags, mode)?;
        let fd = self.fds.allocate_with(stream);
        debug!("open {} -> fd {}", path, fd);
        Ok(fd)
    }

    fn sys_read(&self, inode: &mut Inode, addr: usize, len: usize) -> SysResult<usize> {
        let buf = unsafe { bridge::user_slice_mut(addr, len) };
        inode.stream_mut()?.read(buf)
    }

    fn sys_write(&self, inode: &mut Inode, addr: usize, len: usize) -> SysResult<usize> {
        let buf = unsafe { bridge::user_slice(addr, len) };
        inode.stream_mut()?.write(buf)
    }

    /// The descriptor is released whether or not the stream's close
    /// succeeds; a close error is still reported to the caller.
    fn sys_close(&self, inode: &mut Inode) -> SysResult<usize> {
        let result = match inode.stream_mut() {
            Ok(stream) => stream.close(),
            Err(errno) => Err(errno),
        };
        inode.release();
        result.map(|_| 0)
    }

    /// fstat requires the stream's stat capability; the output record is
    /// only written once a metadata snapshot is in hand.
    fn sys_fstat(&self, inode: &mut Inode, stat_addr: usize) -> SysResult<usize> {
        let stream = inode.stream_mut()?;
        let stat = stream.as_stat().ok_or(Errno::EINVAL)?;
        let meta = stat.stat()?;

        let out = unsafe { bridge::user_mut::<RawStat>(stat_addr) };
        out.fill(&meta);
        Ok(0)
    }

    fn sys_ioctl(&self, inode: &mut Inode, op: usize, arg: usize) -> SysResult<usize> {
        let ioctl = inode.stream_mut()?.as_ioctl().ok_or(Errno::EINVAL)?;
        ioctl.ioctl(op, arg)
    }

    /// fstatat: stat by path, same output record as fstat
    pub(in crate::syscalls) fn path_stat_call(&self, req: &mut SyscallRequest) {
        let result = self.sys_fstatat(req);
        req.complete_result(result);
    }

    fn sys_fstatat(&self, req: &mut SyscallRequest) -> SysResult<usize> {
        let path = unsafe { bridge::user_cstr(req.arg(1)) };
        let meta = self.vfs.stat_path(&path)?;

        let out = unsafe { bridge::user_mut::<RawStat>(req.arg(2)) };
        out.fill(&meta);
        Ok(0)
    }
}
