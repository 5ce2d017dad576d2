use std::ffi::c_void;
use std::io::{Read, Result, Write};
use std::ptr::{from_mut, from_ref};

use super::RawHandle;
use crate::opt::Mode;

// ----------------------------------------------------------------------------------------------------------

/// Trait to turn a C status code into a Rust result.
///
/// A status of `-1` becomes the thread's last OS error, every other status is
/// passed through unchanged.
trait Checked: Sized {
    fn checked(self) -> Result<Self>;
}

macro_rules! checked {
    ($($source:ty),+) => {
        $(
            impl Checked for $source {
                #[inline]
                fn checked(self) -> Result<Self> {
                    if self == -1 {
                        Err(std::io::Error::last_os_error())
                    } else {
                        Ok(self)
                    }
                }
            }
        )+
    };
}

checked!(i32, isize);

// ----------------------------------------------------------------------------------------------------------

/// Determine whether the handle refers to an open file descriptor.
pub(crate) fn check_handle(handle: RawHandle) -> Result<()> {
    // SAFETY: F_GETFD only inspects the process's descriptor table.
    unsafe { libc::fcntl(handle, libc::F_GETFD) }.checked()?;
    Ok(())
}

/// Determine whether the handle refers to a terminal.
pub(crate) fn is_terminal(handle: RawHandle) -> bool {
    // SAFETY: isatty only inspects the descriptor.
    unsafe { libc::isatty(handle) == 1 }
}

/// Query the terminal's size as a `(columns, rows)` pair.
pub(crate) fn window_size(handle: RawHandle) -> Result<(u16, u16)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ writes one winsize record into valid memory.
    unsafe { libc::ioctl(handle, libc::TIOCGWINSZ, from_mut(&mut size)) }.checked()?;
    Ok((size.ws_col, size.ws_row))
}

/// Wait for any of the handles to become readable.
///
/// A negative timeout waits indefinitely and negative handles are ignored.
/// The result flags each handle that is readable or hung up, since reading from
/// a hung up handle reports end of input instead of blocking. An interrupted
/// wait surfaces as [`ErrorKind::Interrupted`](std::io::ErrorKind::Interrupted)
/// and a handle that is not an open descriptor as `EBADF`.
pub(crate) fn poll<const N: usize>(handles: [RawHandle; N], timeout: i32) -> Result<[bool; N]> {
    let mut records = handles.map(|fd| libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    });

    // SAFETY: records is a live array of exactly N pollfd entries.
    unsafe { libc::poll(records.as_mut_ptr(), N as libc::nfds_t, timeout) }.checked()?;

    if records.iter().any(|record| record.revents & libc::POLLNVAL != 0) {
        return Err(std::io::Error::from_raw_os_error(libc::EBADF));
    }

    let ready = libc::POLLIN | libc::POLLHUP | libc::POLLERR;
    Ok(records.map(|record| record.revents & ready != 0))
}

// ----------------------------------------------------------------------------------------------------------

/// A terminal configuration.
pub(crate) struct Config {
    state: libc::termios,
}

impl Config {
    /// Read the configuration.
    pub fn read(handle: RawHandle) -> Result<Self> {
        let mut state = std::mem::MaybeUninit::uninit();
        // SAFETY: tcgetattr fully initializes the termios record on success.
        unsafe { libc::tcgetattr(handle, state.as_mut_ptr()) }.checked()?;
        Ok(Self {
            // SAFETY: the call above succeeded.
            state: unsafe { state.assume_init() },
        })
    }

    /// Derive the configuration for the given mode.
    pub fn apply(&self, mode: Mode) -> Self {
        let mut state = self.state;

        match mode {
            Mode::Rare => {
                state.c_lflag &= !(libc::ECHO | libc::ICANON);
            }
            Mode::Raw => {
                // SAFETY: cfmakeraw only updates the flags of a valid record.
                unsafe { libc::cfmakeraw(from_mut(&mut state)) };
            }
        }

        // Reads only ever happen after poll() reported data, so each read
        // returns as soon as one byte is available.
        state.c_cc[libc::VMIN] = 1;
        state.c_cc[libc::VTIME] = 0;
        Self { state }
    }

    /// Write the configuration, effective immediately.
    pub fn write(&self, handle: RawHandle) -> Result<()> {
        // SAFETY: state is a valid termios record.
        unsafe { libc::tcsetattr(handle, libc::TCSANOW, from_ref(&self.state)) }.checked()?;
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        struct Flags(Vec<&'static str>);

        impl std::fmt::Debug for Flags {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_list().entries(self.0.iter()).finish()
            }
        }

        let mut flags = Vec::new();
        for (name, value) in [("ICRNL", libc::ICRNL), ("IXON", libc::IXON)] {
            if self.state.c_iflag & value != 0 {
                flags.push(name);
            }
        }
        if self.state.c_oflag & libc::OPOST != 0 {
            flags.push("OPOST");
        }
        for (name, value) in [
            ("ECHO", libc::ECHO),
            ("ICANON", libc::ICANON),
            ("IEXTEN", libc::IEXTEN),
            ("ISIG", libc::ISIG),
        ] {
            if self.state.c_lflag & value != 0 {
                flags.push(name);
            }
        }

        f.debug_struct("Termios")
            .field("flags", &Flags(flags))
            .field("vmin", &self.state.c_cc[libc::VMIN])
            .field("vtime", &self.state.c_cc[libc::VTIME])
            .finish()
    }
}

// ----------------------------------------------------------------------------------------------------------

/// Raw unbuffered input from a file descriptor.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RawInput {
    handle: RawHandle,
}

impl RawInput {
    pub fn new(handle: RawHandle) -> Self {
        Self { handle }
    }

    #[inline]
    pub fn handle(&self) -> RawHandle {
        self.handle
    }
}

impl Read for RawInput {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        // SAFETY: buf is valid for writes of buf.len() bytes.
        let count = unsafe {
            libc::read(
                self.handle,
                buf.as_mut_ptr().cast::<c_void>(),
                buf.len() as libc::size_t,
            )
        }
        .checked()?;
        Ok(count as usize)
    }
}

// ----------------------------------------------------------------------------------------------------------

/// Raw unbuffered output to a file descriptor.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RawOutput {
    handle: RawHandle,
}

impl RawOutput {
    pub fn new(handle: RawHandle) -> Self {
        Self { handle }
    }
}

impl Write for RawOutput {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        // SAFETY: buf is valid for reads of buf.len() bytes.
        let count = unsafe {
            libc::write(
                self.handle,
                buf.as_ptr().cast::<c_void>(),
                buf.len() as libc::size_t,
            )
        }
        .checked()?;
        Ok(count as usize)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
