/*!
 * Console Device
 * In-kernel terminal endpoint behind descriptors 0-2
 *
 * Input arrives from the trap layer into a buffered queue; output goes to
 * the host stdout, or to a capture buffer under test. The device itself is
 * direction-less; the descriptor table binds its read and write halves as
 * separate streams.
 */

use std::collections::VecDeque;
use std::io::Write as _;
use std::sync::Arc;

use log::warn;
use parking_lot::Mutex;

use crate::core::{Errno, SysResult};
use crate::memory::bridge;
use crate::stream::{IoctlStream, Stream};
use crate::syscalls::abi::Winsize;

// Terminal ioctl subset the console answers
const TCGETS: usize = 0x5401;
const TCSETS: usize = 0x5402;
const TIOCGWINSZ: usize = 0x5413;

const CONSOLE_ROWS: u16 = 25;
const CONSOLE_COLS: u16 = 80;

enum Sink {
    Stdout,
    Capture(Vec<u8>),
}

/// Console device state
pub struct Console {
    input: Mutex<VecDeque<u8>>,
    sink: Mutex<Sink>,
}

impl Console {
    /// Console writing through to the host stdout
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            input: Mutex::new(VecDeque::new()),
            sink: Mutex::new(Sink::Stdout),
        })
    }

    /// Console capturing output in memory (test harnesses)
    pub fn captured() -> Arc<Self> {
        Arc::new(Self {
            input: Mutex::new(VecDeque::new()),
            sink: Mutex::new(Sink::Capture(Vec::new())),
        })
    }

    /// Queue bytes as pending console input
    pub fn feed_input(&self, bytes: &[u8]) {
        self.input.lock().extend(bytes);
    }

    /// Drain captured output; empty for a stdout-backed console
    pub fn take_output(&self) -> Vec<u8> {
        match &mut *self.sink.lock() {
            Sink::Capture(buf) => std::mem::take(buf),
            Sink::Stdout => Vec::new(),
        }
    }

    /// Read available input; zero bytes when the queue is drained
    fn read_bytes(&self, buf: &mut [u8]) -> usize {
        let mut input = self.input.lock();
        let n = buf.len().min(input.len());
        for slot in buf.iter_mut().take(n) {
            *slot = input.pop_front().unwrap_or(0);
        }
        n
    }

    fn write_bytes(&self, buf: &[u8]) -> SysResult<usize> {
        match &mut *self.sink.lock() {
            Sink::Stdout => {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                lock.write_all(buf).map_err(Errno::from)?;
                lock.flush().map_err(Errno::from)?;
            }
            Sink::Capture(out) => out.extend_from_slice(buf),
        }
        Ok(buf.len())
    }

    fn ioctl(&self, op: usize, arg: usize) -> SysResult<usize> {
        match op {
            // Termios get/set accepted and ignored; the console has no
            // line discipline to configure
            TCGETS | TCSETS => Ok(0),
            TIOCGWINSZ => {
                let ws = unsafe { bridge::user_mut::<Winsize>(arg) };
                ws.ws_row = CONSOLE_ROWS;
                ws.ws_col = CONSOLE_COLS;
                ws.ws_xpixel = 0;
                ws.ws_ypixel = 0;
                Ok(0)
            }
            _ => {
                warn!("console: unsupported ioctl op 0x{:x}", op);
                Err(Errno::EINVAL)
            }
        }
    }
}

/// Read half of the console (descriptor 0)
pub struct ConsoleReader(pub Arc<Console>);

impl Stream for ConsoleReader {
    fn read(&mut self, buf: &mut [u8]) -> SysResult<usize> {
        Ok(self.0.read_bytes(buf))
    }

    fn write(&mut self, _buf: &[u8]) -> SysResult<usize> {
        Err(Errno::EROFS)
    }

    fn close(&mut self) -> SysResult<()> {
        // The console outlives every descriptor bound to it
        Err(Errno::EINVAL)
    }

    fn as_ioctl(&mut self) -> Option<&mut dyn IoctlStream> {
        Some(self)
    }
}

impl IoctlStream for ConsoleReader {
    fn ioctl(&mut self, op: usize, arg: usize) -> SysResult<usize> {
        self.0.ioctl(op, arg)
    }
}

/// Write half of the console (descriptors 1 and 2)
pub struct ConsoleWriter(pub Arc<Console>);

impl Stream for ConsoleWriter {
    fn read(&mut self, _buf: &mut [u8]) -> SysResult<usize> {
        Err(Errno::EINVAL)
    }

    fn write(&mut self, buf: &[u8]) -> SysResult<usize> {
        self.0.write_bytes(buf)
    }

    fn close(&mut self) -> SysResult<()> {
        Err(Errno::EINVAL)
    }

    fn as_ioctl(&mut self) -> Option<&mut dyn IoctlStream> {
        Some(self)
    }
}

impl IoctlStream for ConsoleWriter {
    fn ioctl(&mut self, op: usize, arg: usize) -> SysResult<usize> {
        self.0.ioctl(op, arg)
    }
}
