//! Shared fixtures for unit tests.

use std::ffi::CStr;
use std::fs::{File, OpenOptions};
use std::io::{Read, Result as IoResult};
use std::os::fd::{AsRawFd, FromRawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::net::UnixStream;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::Canvas;
use crate::err::{ErrorKind, Result};

static LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that activate the process-wide terminal.
pub(crate) fn exclusive() -> MutexGuard<'static, ()> {
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Create a connected pair of sockets, reader first.
pub(crate) fn pipe_pair() -> (UnixStream, UnixStream) {
    UnixStream::pair().expect("socket pair")
}

/// A pseudo-terminal with a fixed window size.
///
/// The terminal end is what a device under test owns, whereas the controller
/// end observes everything written to the terminal.
pub(crate) struct Pty {
    controller: File,
    terminal: Option<File>,
}

impl Pty {
    pub fn open(columns: u16, rows: u16) -> IoResult<Self> {
        // SAFETY: posix_openpt has no memory-safety preconditions.
        let handle = unsafe { libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY) };
        if handle < 0 {
            return Err(std::io::Error::last_os_error());
        }
        // SAFETY: handle is a freshly opened descriptor owned by nobody else.
        let controller = unsafe { File::from_raw_fd(handle) };

        // SAFETY: controller is a valid pseudo-terminal controller.
        if unsafe { libc::grantpt(handle) } != 0 {
            return Err(std::io::Error::last_os_error());
        }
        // SAFETY: controller is a valid pseudo-terminal controller.
        if unsafe { libc::unlockpt(handle) } != 0 {
            return Err(std::io::Error::last_os_error());
        }

        resize(handle, columns, rows)?;

        let mut name = [0 as libc::c_char; 128];
        // SAFETY: name is valid for writes of its length.
        let status = unsafe { libc::ptsname_r(handle, name.as_mut_ptr(), name.len()) };
        if status != 0 {
            return Err(std::io::Error::from_raw_os_error(status));
        }
        // SAFETY: ptsname_r wrote a nul-terminated path.
        let path = unsafe { CStr::from_ptr(name.as_ptr()) };
        let path = path.to_str().map_err(|_| std::io::Error::other("pty path"))?;

        let terminal = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)?;

        Ok(Self {
            controller,
            terminal: Some(terminal),
        })
    }

    /// Change the window size.
    pub fn resize(&self, columns: u16, rows: u16) -> IoResult<()> {
        resize(self.controller.as_raw_fd(), columns, rows)
    }

    /// Take the terminal end.
    pub fn take_terminal(&mut self) -> File {
        self.terminal.take().expect("terminal end is taken only once")
    }

    /// Read everything written to the terminal so far.
    ///
    /// This method stops once no more output arrives within 100ms.
    pub fn read_all(&mut self) -> String {
        let mut bytes = Vec::new();
        let mut buffer = [0_u8; 1024];

        loop {
            match crate::sys::poll([self.controller.as_raw_fd()], 100) {
                Ok([true]) => {}
                _ => break,
            }
            match self.controller.read(&mut buffer) {
                // Linux reports EIO once the terminal end is closed.
                Ok(0) | Err(_) => break,
                Ok(n) => bytes.extend_from_slice(&buffer[..n]),
            }
        }

        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn resize(handle: libc::c_int, columns: u16, rows: u16) -> IoResult<()> {
    let size = libc::winsize {
        ws_row: rows,
        ws_col: columns,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    // SAFETY: size is a valid winsize record.
    if unsafe { libc::ioctl(handle, libc::TIOCSWINSZ, std::ptr::from_ref(&size)) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

// ------------------------------------------------------------------------------------------------

/// A canvas that records a grid of cells.
///
/// Each put overwrites the cells starting at the given position. Characters
/// beyond the last column are dropped. Optionally, the canvas fails once a
/// given number of puts succeeded.
#[derive(Debug)]
pub(crate) struct Recorder {
    columns: usize,
    rows: usize,
    cells: Vec<Vec<char>>,
    puts: usize,
    limit: Option<usize>,
}

impl Recorder {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![vec!['?'; columns]; rows],
            puts: 0,
            limit: None,
        }
    }

    /// Fail every put after the first `limit` ones.
    pub fn failing_after(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Get the number of successful puts.
    pub fn puts(&self) -> usize {
        self.puts
    }

    /// Get the recorded rows.
    pub fn lines(&self) -> Vec<String> {
        self.cells.iter().map(|row| row.iter().collect()).collect()
    }
}

impl Canvas for Recorder {
    fn columns(&self) -> usize {
        self.columns
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn put(&mut self, x: usize, y: usize, text: &[u8]) -> Result<()> {
        if self.limit.is_some_and(|limit| limit <= self.puts) {
            return Err(ErrorKind::Io.into());
        }
        if x == 0 || y == 0 || x > self.columns || y > self.rows {
            return Err(ErrorKind::OutOfRange.into());
        }

        let row = &mut self.cells[y - 1];
        for (index, c) in String::from_utf8_lossy(text).chars().enumerate() {
            if let Some(cell) = row.get_mut(x - 1 + index) {
                *cell = c;
            }
        }

        self.puts += 1;
        Ok(())
    }
}
