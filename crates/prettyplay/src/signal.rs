use std::ffi::c_int;
use std::io::{ErrorKind as IoErrorKind, Read};
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;
use std::ptr::from_ref;

use signal_hook::consts::FORBIDDEN;
use signal_hook::low_level;
use signal_hook::SigId;

use crate::err::{ErrorKind, Result};
use crate::sys::RawHandle;

/// A self-pipe turning signals into readable bytes.
///
/// Each registered signal's handler writes the signal number as a single byte
/// into one end of a socket pair. The other end joins key input in the
/// multiplexed wait of [`Input::read`](crate::Input::read), so that signals
/// neither race the blocking wait nor get lost while no read is in progress.
/// Dropping the pipe unregisters the handlers before closing the sockets.
pub(crate) struct SignalPipe {
    ids: Vec<SigId>,
    reader: UnixStream,
    writer: UnixStream,
}

impl SignalPipe {
    /// Create a new signal pipe for the given signals.
    ///
    /// This function returns `None` for an empty list of signals.
    pub fn new(signals: &[c_int]) -> Result<Option<Self>> {
        if signals.is_empty() {
            return Ok(None);
        }

        for signal in signals {
            if FORBIDDEN.contains(signal) || !(1..=255).contains(signal) {
                return Err(ErrorKind::InvalidArgument.into());
            }
        }

        let (reader, writer) = UnixStream::pair()?;
        writer.set_nonblocking(true)?;

        let mut this = Self {
            ids: Vec::with_capacity(signals.len()),
            reader,
            writer,
        };

        let handle = this.writer.as_raw_fd();
        for &signal in signals {
            let byte = signal as u8;
            let action = move || {
                // SAFETY: send(2) is async-signal-safe and the byte lives in the
                // closure. A full pipe already guarantees a wakeup, so failures
                // are ignored.
                unsafe {
                    libc::send(handle, from_ref(&byte).cast(), 1, libc::MSG_DONTWAIT);
                }
            };

            // SAFETY: the action performs a single async-signal-safe call and
            // neither allocates nor locks. On failure, drop unregisters the
            // handlers installed so far.
            let id = unsafe { low_level::register(signal, action) }?;
            this.ids.push(id);
        }

        tracing::debug!(?signals, "signal pipe registered");
        Ok(Some(this))
    }

    /// Get the handle to poll for pending signals.
    pub fn handle(&self) -> RawHandle {
        self.reader.as_raw_fd()
    }

    /// Read the number of the next pending signal.
    ///
    /// Call this method only after polling reported the handle as readable.
    pub fn read(&mut self) -> std::io::Result<c_int> {
        let mut buffer = [0_u8; 1];
        loop {
            match self.reader.read(&mut buffer) {
                Ok(0) => return Err(IoErrorKind::UnexpectedEof.into()),
                Ok(_) => return Ok(buffer[0] as c_int),
                Err(error) if error.kind() == IoErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }
        }
    }
}

impl std::fmt::Debug for SignalPipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalPipe")
            .field("handlers", &self.ids.len())
            .field("reader", &self.reader.as_raw_fd())
            .field("writer", &self.writer.as_raw_fd())
            .finish()
    }
}

impl Drop for SignalPipe {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            low_level::unregister(id);
        }
    }
}
