use std::fmt;
use std::io::Write;
use std::os::fd::AsFd;
use std::time::{Duration, Instant};

use crate::api::Canvas;
use crate::err::Result;
use crate::event::Event;
use crate::input::Input;
use crate::opt::Options;
use crate::output::Output;

/// A source of monotonic time in milliseconds.
pub trait Clock {
    /// Get the current time in milliseconds since some fixed epoch.
    fn now(&self) -> u64;
}

/// The monotonic system clock.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// A terminal connection combining input and output with a tick clock.
///
/// A connection owns one [`Input`] and one [`Output`] device. Beyond
/// delegating to them, it injects [`Event::Tick`] into the event stream at a
/// regular period. With a tick of `t` milliseconds, [`Io::read`] returns a
/// tick whenever `t` milliseconds have passed since the last one, no matter
/// how many key presses arrived in between. That makes it easy to write game
/// loops that advance the game state on each tick.
///
/// A connection is tickless by default, in which case reading waits
/// indefinitely for the next key press or signal.
///
/// If the connection receives `SIGWINCH`, it updates the output's cached
/// terminal size before delivering the signal.
///
/// # Example
///
/// ```no_run
/// # use prettyplay::{Event, Io, Key};
/// let mut io = Io::new(std::io::stdin(), std::io::stdout())?;
/// io.set_tick(100);
///
/// loop {
///     match io.read() {
///         Event::Key(key) if key == b'q' => break,
///         Event::Tick => {
///             io.puts(1, 1, "tick")?;
///             io.sync()?;
///         }
///         _ => {}
///     }
/// }
/// # Ok::<(), prettyplay::err::Error>(())
/// ```
pub struct Io<R: AsFd, W: Write + AsFd, C: Clock = MonotonicClock> {
    input: Input<R>,
    output: Output<W>,
    tick: i32,
    last_tick: Option<u64>,
    clock: C,
}

impl<R: AsFd, W: Write + AsFd> Io<R, W> {
    /// Create a new connection with the default options.
    pub fn new(input: R, output: W) -> Result<Self> {
        Self::with_options(input, output, &Options::default())
    }

    /// Create a new connection with the given options.
    pub fn with_options(input: R, output: W, options: &Options) -> Result<Self> {
        // The output device restores the terminal if the input device fails.
        let output = Output::with_options(output, options)?;
        let input = Input::with_options(input, options)?;

        let mut this = Self::attach(input, output);
        this.set_tick(options.tick());
        Ok(this)
    }

    /// Combine the existing input and output devices into a tickless
    /// connection.
    pub fn attach(input: Input<R>, output: Output<W>) -> Self {
        Self::attach_with_clock(input, output, MonotonicClock::default())
    }
}

impl<R: AsFd, W: Write + AsFd, C: Clock> Io<R, W, C> {
    /// Combine the existing input and output devices into a tickless
    /// connection with the given clock.
    pub fn attach_with_clock(input: Input<R>, output: Output<W>, clock: C) -> Self {
        Self {
            input,
            output,
            tick: 0,
            last_tick: None,
            clock,
        }
    }

    /// Get the tick period in milliseconds.
    pub fn tick(&self) -> i32 {
        self.tick
    }

    /// Set the tick period in milliseconds.
    ///
    /// A period of zero or less disables ticking.
    pub fn set_tick(&mut self, tick: i32) {
        self.tick = tick;
    }

    /// Get the input device.
    pub fn input(&mut self) -> &mut Input<R> {
        &mut self.input
    }

    /// Get the output device.
    pub fn output(&mut self) -> &mut Output<W> {
        &mut self.output
    }

    /// Read the next event.
    ///
    /// If the connection is tickless, this method waits indefinitely. If it
    /// has a tick, this method returns a tick without reading any input when
    /// no tick happened yet or a full period has passed since the last one.
    /// Otherwise, it waits for at most the remainder of the period.
    pub fn read(&mut self) -> Event {
        let event = if self.tick <= 0 {
            self.input.read(-1)
        } else {
            let period = self.tick as u64;
            let now = self.clock.now();

            match self.last_tick {
                Some(last) if now.saturating_sub(last) < period => {
                    let remaining = period - now.saturating_sub(last);
                    let event = self.input.read(remaining as i32);
                    if event.is_tick() {
                        self.last_tick = Some(self.clock.now());
                    }
                    event
                }
                _ => {
                    self.last_tick = Some(now);
                    Event::Tick
                }
            }
        };

        if event == Event::Signal(libc::SIGWINCH) {
            if let Err(error) = self.output.refresh_size() {
                return Event::from_io(&error.into());
            }
        }

        event
    }

    /// Get the number of columns.
    pub fn columns(&self) -> usize {
        self.output.columns()
    }

    /// Get the number of rows.
    pub fn rows(&self) -> usize {
        self.output.rows()
    }

    /// Write the bytes at the given 1-based column and row.
    pub fn put(&mut self, x: usize, y: usize, text: &[u8]) -> Result<()> {
        self.output.put(x, y, text)
    }

    /// Write the string at the given 1-based column and row.
    pub fn puts(&mut self, x: usize, y: usize, text: &str) -> Result<()> {
        self.output.puts(x, y, text)
    }

    /// Flush all buffered output.
    pub fn sync(&mut self) -> Result<()> {
        self.output.sync()
    }

    /// Clear the screen.
    pub fn clear(&mut self) -> Result<()> {
        self.output.clear()
    }

    /// Print a debugging message.
    ///
    /// With a pause, this method sleeps for the given duration and then
    /// resumes automatically. Without, the connection stays suspended until
    /// [`Io::resume`].
    pub fn debug(&mut self, pause: Option<Duration>, message: fmt::Arguments<'_>) -> Result<()> {
        self.output.debug(message)?;
        if let Some(pause) = pause {
            std::thread::sleep(pause);
            self.output.resume()?;
        }
        Ok(())
    }

    /// Resume operation after debugging.
    pub fn resume(&mut self) -> Result<()> {
        self.output.resume()
    }

    /// Free the output and then the input device.
    ///
    /// This method is idempotent.
    pub fn free(&mut self) {
        self.output.free();
        self.input.free();
    }
}

impl<R: AsFd, W: Write + AsFd, C: Clock> Canvas for Io<R, W, C> {
    fn columns(&self) -> usize {
        self.output.columns()
    }

    fn rows(&self) -> usize {
        self.output.rows()
    }

    fn put(&mut self, x: usize, y: usize, text: &[u8]) -> Result<()> {
        self.output.put(x, y, text)
    }
}

impl<R: AsFd, W: Write + AsFd, C: Clock> fmt::Debug for Io<R, W, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Io")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("tick", &self.tick)
            .field("last_tick", &self.last_tick)
            .finish_non_exhaustive()
    }
}

impl<R: AsFd, W: Write + AsFd, C: Clock> Drop for Io<R, W, C> {
    fn drop(&mut self) {
        self.free();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::Key;
    use crate::testing::{exclusive, pipe_pair, Pty};
    use std::cell::Cell;
    use std::fs::File;
    use std::os::unix::net::UnixStream;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct ManualClock(Rc<Cell<u64>>);

    impl ManualClock {
        fn set(&self, now: u64) {
            self.0.set(now);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> u64 {
            self.0.get()
        }
    }

    fn quiet() -> Options {
        Options::builder().signals(&[]).build()
    }

    fn connect<C: Clock>(
        pty: &mut Pty,
        clock: C,
    ) -> std::io::Result<(Io<UnixStream, File, C>, UnixStream)> {
        let (reader, writer) = pipe_pair();
        let input = Input::with_options(reader, &quiet())?;
        let output = Output::with_options(pty.take_terminal(), &quiet())?;
        Ok((Io::attach_with_clock(input, output, clock), writer))
    }

    #[test]
    fn test_tick_fairness() -> std::io::Result<()> {
        let _guard = exclusive();
        let mut pty = Pty::open(10, 4)?;
        let clock = ManualClock::default();
        let (mut io, mut keys) = connect(&mut pty, clock.clone())?;

        // Tickless by default.
        assert_eq!(io.tick(), 0);
        keys.write_all(b"a")?;
        assert_eq!(io.read(), Event::Key(Key::from(b'a')));

        // The first tickful read ticks right away.
        io.set_tick(100);
        keys.write_all(b"b")?;
        assert_eq!(io.read(), Event::Tick);

        // Within the period, keys come through.
        clock.set(40);
        assert_eq!(io.read(), Event::Key(Key::from(b'b')));

        // Once the period has passed, the tick preempts pending keys.
        keys.write_all(b"c")?;
        clock.set(100);
        assert_eq!(io.read(), Event::Tick);
        clock.set(150);
        assert_eq!(io.read(), Event::Key(Key::from(b'c')));

        // Several rapid reads within a period never tick twice.
        clock.set(199);
        keys.write_all(b"de")?;
        assert_eq!(io.read(), Event::Key(Key::from(b'd')));
        assert_eq!(io.read(), Event::Key(Key::from(b'e')));
        clock.set(200);
        assert_eq!(io.read(), Event::Tick);
        assert_eq!(io.read(), Event::Tick, "input times out after the full period");
        Ok(())
    }

    #[test]
    fn test_real_ticks() -> std::io::Result<()> {
        let _guard = exclusive();
        let mut pty = Pty::open(10, 4)?;
        let (mut io, _keys) = connect(&mut pty, MonotonicClock::default())?;
        io.set_tick(30);

        let start = Instant::now();
        assert_eq!(io.read(), Event::Tick);
        assert!(start.elapsed() < Duration::from_millis(25));
        assert_eq!(io.read(), Event::Tick);
        assert!(start.elapsed() >= Duration::from_millis(25));
        Ok(())
    }

    #[test]
    fn test_window_change_refreshes_size() -> std::io::Result<()> {
        let _guard = exclusive();
        let mut pty = Pty::open(10, 4)?;
        let (reader, _keys) = pipe_pair();
        let options = Options::builder().signals(&[libc::SIGWINCH]).build();
        let input = Input::with_options(reader, &options)?;
        let output = Output::with_options(pty.take_terminal(), &options)?;
        let mut io = Io::attach(input, output);
        assert_eq!((io.columns(), io.rows()), (10, 4));

        pty.resize(33, 7)?;
        assert_eq!((io.columns(), io.rows()), (10, 4), "size is cached");

        signal_hook::low_level::raise(libc::SIGWINCH)?;
        assert_eq!(io.read(), Event::Signal(libc::SIGWINCH));
        assert_eq!((io.columns(), io.rows()), (33, 7));
        Ok(())
    }

    #[test]
    fn test_delegation_and_free() -> std::io::Result<()> {
        let _guard = exclusive();
        let mut pty = Pty::open(12, 3)?;
        let (mut io, _keys) = connect(&mut pty, MonotonicClock::default())?;
        pty.read_all();

        assert_eq!(io.columns(), 12);
        assert_eq!(io.rows(), 3);
        io.puts(3, 2, "hi")?;
        io.sync()?;
        assert_eq!(pty.read_all(), "\x1b[2;3Hhi");

        io.debug(Some(Duration::from_millis(1)), format_args!("pause"))?;
        io.puts(1, 1, "ok")?;

        io.free();
        io.free();
        drop(io);
        let restored = pty.read_all();
        assert_eq!(restored.matches("\x1b[?1049l").count(), 2, "debug and free each exit once");
        assert!(restored.ends_with("\x1b[2J\x1b[?25h\x1b[?1049l"));
        Ok(())
    }
}
