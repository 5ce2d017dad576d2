use std::fmt;
use std::io::{BufWriter, Write};
use std::os::fd::{AsFd, AsRawFd};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::Canvas;
use crate::cmd::{DynMoveTo, EnterAlternateScreen, EraseScreen, ExitAlternateScreen, HideCursor, ShowCursor};
use crate::err::{Error, ErrorKind, Result};
use crate::fuse;
use crate::opt::{Mode, Options};
use crate::sys::{is_terminal, window_size, Config, RawHandle, RawOutput};

/// The flag marking the terminal as controlled by an output device.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// A claim on the process-wide terminal.
///
/// Raw mode and the alternate screen are properties of the terminal, not of any
/// one file descriptor. Two output devices restoring the terminal at teardown
/// would race each other, so at most one claim exists at a time.
#[derive(Debug)]
struct Claim;

impl Claim {
    fn acquire() -> Result<Self> {
        ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Claim)
            .map_err(|_| ErrorKind::AlreadyActive.into())
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::Release);
    }
}

/// The output side of a terminal.
///
/// An output device takes over the terminal: It turns off echo and the line
/// editor, switches to the alternate screen, hides the cursor, and clears the
/// screen. [`Output::free`] undoes all of that and so does dropping the device.
/// Since terminal state is process-wide, only one output device may be active
/// at any time. Creating a second one fails with
/// [`ErrorKind::AlreadyActive`].
///
/// All writes are buffered until [`Output::sync`]. They bypass any buffering
/// the stream itself performs, which is flushed once upon creation.
///
/// The terminal size is determined once upon creation and then cached. Only
/// [`Output::refresh_size`] updates it, which [`Io`](crate::Io) invokes upon
/// receiving `SIGWINCH`.
pub struct Output<W: Write + AsFd> {
    stream: W,
    handle: RawHandle,
    writer: BufWriter<RawOutput>,
    config: Option<Config>,
    active: bool,
    debugging: bool,
    newline: &'static str,
    columns: usize,
    rows: usize,
    claim: Option<Claim>,
}

impl<W: Write + AsFd> Output<W> {
    /// Create a new output device with the default options.
    pub fn new(stream: W) -> Result<Self> {
        Self::with_options(stream, &Options::default())
    }

    /// Create a new output device with the given options.
    ///
    /// If any step of taking over the terminal fails, this method undoes the
    /// steps completed so far, exactly like [`Output::free`].
    pub fn with_options(stream: W, options: &Options) -> Result<Self> {
        let claim = Claim::acquire()?;
        let handle = stream.as_fd().as_raw_fd();

        let mut this = Self {
            stream,
            handle,
            writer: BufWriter::with_capacity(options.write_buffer_size(), RawOutput::new(handle)),
            config: None,
            active: false,
            debugging: false,
            // Rare mode keeps output processing, which turns \n into \r\n.
            newline: match options.mode() {
                Mode::Rare => "\n",
                Mode::Raw => "\r\n",
            },
            columns: 0,
            rows: 0,
            claim: Some(claim),
        };

        if !is_terminal(handle) {
            return Err(ErrorKind::NotATerminal.into());
        }

        // Drain pending output so it isn't subject to our changes.
        this.stream.flush()?;
        this.refresh_size()?;

        // End of read-only actions. Drop undoes everything after this point.
        let config = Config::read(handle)?;
        config.apply(options.mode()).write(handle)?;
        tracing::debug!(?config, mode = ?options.mode(), "terminal configured");
        this.config = Some(config);
        this.active = true;

        write!(this.writer, "{}", fuse!(EnterAlternateScreen, HideCursor))?;
        this.clear()?;
        this.sync()?;

        tracing::debug!(columns = this.columns, rows = this.rows, "terminal output activated");
        Ok(this)
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.stream
    }

    /// Get the number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Get the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Query the terminal for its current size and update the cached values.
    pub fn refresh_size(&mut self) -> Result<()> {
        let (columns, rows) = window_size(self.handle)?;
        self.columns = columns as usize;
        self.rows = rows as usize;
        tracing::debug!(columns, rows, "terminal size");
        Ok(())
    }

    fn ensure_resumed(&self) -> Result<()> {
        if self.debugging {
            Err(ErrorKind::Suspended.into())
        } else {
            Ok(())
        }
    }

    /// Write the bytes verbatim, starting at the given 1-based column and row.
    ///
    /// This method fails with [`ErrorKind::OutOfRange`] if the column or row
    /// lies beyond the terminal size. It does not check whether the text fits
    /// into the remaining columns. The terminal wraps or truncates long text.
    pub fn put(&mut self, x: usize, y: usize, text: &[u8]) -> Result<()> {
        self.ensure_resumed()?;
        if x > self.columns || y > self.rows {
            return Err(ErrorKind::OutOfRange.into());
        }

        // The size came from u16 fields, so the checks above bound x and y.
        write!(self.writer, "{}", DynMoveTo(y as u16, x as u16)).map_err(unwritable)?;
        self.writer.write_all(text).map_err(unwritable)
    }

    /// Write the string verbatim, starting at the given 1-based column and row.
    pub fn puts(&mut self, x: usize, y: usize, text: &str) -> Result<()> {
        self.put(x, y, text.as_bytes())
    }

    /// Flush all buffered output to the terminal.
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush().map_err(unwritable)
    }

    /// Clear the screen.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_resumed()?;
        write!(self.writer, "{}", EraseScreen).map_err(unwritable)
    }

    /// Suspend the output device to print a debugging message.
    ///
    /// This method exits the alternate screen, shows the cursor, and prints the
    /// message on its own line. The output device remains suspended until
    /// [`Output::resume`]. While suspended, [`Output::put`], [`Output::puts`],
    /// and [`Output::clear`] fail with [`ErrorKind::Suspended`]. Debugging
    /// does not nest. Further messages are printed as is and a single resume
    /// suffices.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use prettyplay::Output;
    /// # let mut output = Output::new(std::io::stdout())?;
    /// # let (x, y) = (1, 2);
    /// output.debug(format_args!("player at {},{}", x, y))?;
    /// output.resume()?;
    /// # Ok::<(), prettyplay::err::Error>(())
    /// ```
    pub fn debug(&mut self, message: fmt::Arguments<'_>) -> Result<()> {
        if !self.debugging {
            self.writer.flush().map_err(unwritable)?;
            write!(self.writer, "{}", fuse!(ExitAlternateScreen, ShowCursor)).map_err(unwritable)?;
            self.debugging = true;
        }

        self.writer.write_fmt(message).map_err(unwritable)?;
        self.writer.write_all(self.newline.as_bytes()).map_err(unwritable)?;
        self.sync()
    }

    /// Resume operation after debugging.
    ///
    /// Since the terminal clears the alternate screen upon reentry, callers
    /// should repaint afterwards. This method does nothing if the output
    /// device is not suspended.
    pub fn resume(&mut self) -> Result<()> {
        if self.debugging {
            write!(self.writer, "{}", fuse!(EnterAlternateScreen, HideCursor)).map_err(unwritable)?;
            self.debugging = false;
            self.sync()?;
        }
        Ok(())
    }

    /// Restore the terminal.
    ///
    /// This method flushes pending output, clears the screen, shows the cursor,
    /// exits the alternate screen, and restores the original terminal
    /// configuration. It is idempotent. Only the first invocation restores
    /// the terminal. Since there is nothing a caller could do about them, this
    /// method ignores errors.
    pub fn free(&mut self) {
        if self.active {
            self.active = false;
            let _ = self.writer.flush();
            let _ = write!(
                self.writer,
                "{}",
                fuse!(EraseScreen, ShowCursor, ExitAlternateScreen)
            );
            let _ = self.writer.flush();
            if let Some(config) = self.config.take() {
                let _ = config.write(self.handle);
            }
            self.debugging = false;
            tracing::debug!("terminal output restored");
        }

        if self.claim.take().is_some() {
            tracing::trace!("terminal released");
        }
    }
}

fn unwritable(error: std::io::Error) -> Error {
    Error::with_source(ErrorKind::Io, error)
}

impl<W: Write + AsFd> Canvas for Output<W> {
    #[inline]
    fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    fn put(&mut self, x: usize, y: usize, text: &[u8]) -> Result<()> {
        Output::put(self, x, y, text)
    }
}

impl<W: Write + AsFd> fmt::Debug for Output<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("handle", &self.handle)
            .field("active", &self.active)
            .field("debugging", &self.debugging)
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .finish()
    }
}

impl<W: Write + AsFd> Drop for Output<W> {
    fn drop(&mut self) {
        self.free();
    }
}
