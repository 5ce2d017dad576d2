use std::io::{ErrorKind as IoErrorKind, Read};
use std::os::fd::{AsFd, AsRawFd};

use crate::err::Result;
use crate::event::{Event, Key};
use crate::opt::Options;
use crate::signal::SignalPipe;
use crate::sys::{check_handle, poll, RawInput};

/// Determine how many more bytes belong to the key press starting with the
/// given byte.
fn continuation_length(lead: u8) -> usize {
    if lead == 0x1b {
        // ESC may start a short escape sequence such as an arrow key.
        3
    } else if lead >> 3 == 0b1_1110 {
        3
    } else if lead >> 4 == 0b1110 {
        2
    } else if lead >> 5 == 0b110 {
        1
    } else {
        0
    }
}

/// Read from the raw input, retrying interrupted reads.
fn read_dogged(input: &mut RawInput, buf: &mut [u8]) -> std::io::Result<usize> {
    loop {
        match input.read(buf) {
            Ok(n) => return Ok(n),
            Err(ref e) if e.kind() == IoErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// The input side of a terminal.
///
/// An input device resolves each read into exactly one [`Event`], waiting for
/// at most a given timeout. It reads directly from the stream's file
/// descriptor, bypassing any buffering the stream itself performs. Hence the
/// stream should not be read by other means while owned by the device.
///
/// Unless disabled via [`Options::signals`], an input device also turns
/// signals into events. By default, that is `SIGWINCH`, which indicates a
/// change of the window size.
///
/// Input devices leave the terminal configuration alone; that is the
/// [`Output`](crate::Output) device's job.
pub struct Input<R: AsFd> {
    stream: R,
    raw: RawInput,
    signals: Option<SignalPipe>,
}

impl<R: AsFd> Input<R> {
    /// Create a new input device with the default options.
    pub fn new(stream: R) -> Result<Self> {
        Self::with_options(stream, &Options::default())
    }

    /// Create a new input device with the given options.
    pub fn with_options(stream: R, options: &Options) -> Result<Self> {
        let handle = stream.as_fd().as_raw_fd();
        check_handle(handle)?;
        let signals = SignalPipe::new(options.signals())?;

        Ok(Self {
            stream,
            raw: RawInput::new(handle),
            signals,
        })
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.stream
    }

    /// Read the next event.
    ///
    /// This method waits for at most `timeout` milliseconds. A negative timeout
    /// waits indefinitely, whereas a zero timeout does not wait at all. If no
    /// input arrives in time, this method returns [`Event::Tick`]. A wait
    /// interrupted by a signal is restarted with the original timeout.
    ///
    /// Pending signals take priority over pending key presses. A key press
    /// whose first byte announces more bytes, i.e., an escape or a UTF-8 lead
    /// byte, only includes the additional bytes if they are already available.
    /// This method never blocks waiting for stragglers.
    pub fn read(&mut self, timeout: i32) -> Event {
        let event = self.read_event(timeout).unwrap_or_else(|error| Event::from_io(&error));
        tracing::trace!(?event, timeout, "input event");
        event
    }

    fn read_event(&mut self, timeout: i32) -> std::io::Result<Event> {
        let signal_handle = self.signals.as_ref().map_or(-1, SignalPipe::handle);

        let [key_ready, signal_ready] = loop {
            match poll([self.raw.handle(), signal_handle], timeout) {
                Ok(ready) => break ready,
                Err(error) if error.kind() == IoErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }
        };

        if signal_ready {
            if let Some(signals) = self.signals.as_mut() {
                return Ok(Event::Signal(signals.read()?));
            }
        }

        if !key_ready {
            return Ok(Event::Tick);
        }

        let mut buffer = [0_u8; 4];
        if read_dogged(&mut self.raw, &mut buffer[..1])? == 0 {
            return Err(std::io::Error::from_raw_os_error(libc::EPIPE));
        }

        let more = continuation_length(buffer[0]);
        if more > 0 {
            let [pending] = poll([self.raw.handle()], 0)?;
            if pending {
                read_dogged(&mut self.raw, &mut buffer[1..=more])?;
            }
        }

        Ok(Event::Key(Key::from_bytes(&buffer)))
    }

    /// Release the input device's signal handlers.
    ///
    /// This method is idempotent. After it has been invoked, the input device
    /// no longer reports signals.
    pub fn free(&mut self) {
        if self.signals.take().is_some() {
            tracing::debug!("input signals released");
        }
    }
}

impl<R: AsFd> std::fmt::Debug for Input<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Input")
            .field("handle", &self.raw.handle())
            .field("signals", &self.signals)
            .finish()
    }
}
