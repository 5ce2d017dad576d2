//! Helper module with the options for terminal devices.
//!
//! This module provides the options for [`Output`](crate::Output),
//! [`Input`](crate::Input), and [`Io`](crate::Io) as well as the corresponding
//! builder.
//!
//!
//! # Example
//!
//! ```
//! # use prettyplay::opt::{Mode, Options};
//! let options = Options::builder()
//!     .mode(Mode::Raw)
//!     .tick(50)
//!     .build();
//!
//! assert_eq!(options.mode(), Mode::Raw);
//! assert_eq!(options.tick(), 50);
//! ```

use std::ffi::c_int;

/// A terminal mode.
///
/// Two terminal modes are supported:
///
///   * __Rare mode__, also called cbreak mode, turns off echo and the line
///     editor. Key presses arrive byte by byte, while the terminal still turns
///     control-c into a signal and translates line endings on output. This is
///     the default mode.
///
///   * __Raw mode__ disables all features beyond character-based I/O and ANSI
///     escape sequences. Control-c arrives as byte 0x03 and output newlines are
///     no longer translated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Rare or cbreak mode.
    #[default]
    Rare,
    /// Raw mode.
    Raw,
}

#[derive(Clone, Debug)]
struct OptionData {
    mode: Mode,
    tick: i32,
    signals: Vec<c_int>,
    write_buffer_size: usize,
}

impl OptionData {
    pub fn new() -> Self {
        Self {
            mode: Mode::Rare,
            tick: 0,
            signals: vec![signal_hook::consts::SIGWINCH],
            write_buffer_size: 16_384,
        }
    }
}

/// A builder of options objects.
#[derive(Debug)]
pub struct OptionBuilder(OptionData);

impl OptionBuilder {
    /// Set rare or raw mode.
    pub fn mode(&mut self, mode: Mode) -> &mut Self {
        self.0.mode = mode;
        self
    }

    /// Set the tick in milliseconds.
    ///
    /// A value of zero or less disables ticking.
    pub fn tick(&mut self, tick: i32) -> &mut Self {
        self.0.tick = tick;
        self
    }

    /// Set the signals delivered as events.
    ///
    /// An empty list disables signal delivery altogether.
    pub fn signals(&mut self, signals: &[c_int]) -> &mut Self {
        self.0.signals = signals.to_vec();
        self
    }

    /// Set the write buffer size.
    ///
    /// Painting a scene writes a positioning sequence and the cell contents for
    /// every cell of the viewport. A buffer that holds a whole frame avoids
    /// partial frames flickering through.
    pub fn write_buffer_size(&mut self, size: usize) -> &mut Self {
        self.0.write_buffer_size = size;
        self
    }

    /// Instantiate the options.
    pub fn build(&self) -> Options {
        Options(self.0.clone())
    }
}

/// An options object.
#[derive(Debug)]
pub struct Options(OptionData);

impl Default for Options {
    fn default() -> Self {
        Options(OptionData::new())
    }
}

impl Options {
    /// Create a new builder with the default option values.
    pub fn builder() -> OptionBuilder {
        OptionBuilder(OptionData::new())
    }

    /// Instantiate the default options but with the given tick.
    pub fn with_tick(tick: i32) -> Options {
        Self::builder().tick(tick).build()
    }

    /// Get the terminal mode.
    pub fn mode(&self) -> Mode {
        self.0.mode
    }

    /// Get the tick in milliseconds.
    pub fn tick(&self) -> i32 {
        self.0.tick
    }

    /// Get the signals delivered as events.
    pub fn signals(&self) -> &[c_int] {
        &self.0.signals
    }

    /// Get the size of the write buffer.
    pub fn write_buffer_size(&self) -> usize {
        self.0.write_buffer_size
    }
}
