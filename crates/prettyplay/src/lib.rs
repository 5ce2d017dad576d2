//! # Pretty 🌸 Play
//!
//! This crate provides **terminal I/O and sprite compositing for character-grid
//! games**. It takes over a Unix terminal by turning off echo and the line
//! editor, switching to the alternate screen, and hiding the cursor. It
//! restores the terminal when done, even if the game exits with an error.
//!
//! Terminal access comes in three layers:
//!
//!   * [`Output`] owns the terminal's configuration and writes positioned
//!     text, buffered until [`Output::sync`].
//!   * [`Input`] resolves each read into exactly one [`Event`], i.e., a key
//!     press, a tick upon timeout, a signal, or an error.
//!   * [`Io`] combines both and adds a tick clock, which interleaves ticks
//!     with key presses at a regular period.
//!
//! A [`Scene`] holds sprites, each with one or more forms, placed at integer
//! coordinates in an unbounded, layered space. Painting the scene onto a
//! [`Canvas`], such as [`Output`] or [`Io`], renders the part visible from some
//! origin, one cell at a time.
//!
//! Configuration is handled by [`opt::Options`], errors by [`err::Error`], and
//! the few ANSI escape sequences involved live in [`cmd`]. The library logs
//! through [`tracing`](https://docs.rs/tracing) but never installs a
//! subscriber. Since the game owns the terminal, any subscriber should write
//! to a file.
//!
//!
//! # Example
//!
//! ```no_run
//! # use prettyplay::{Event, Io, Key, Point, Scene, Sprite};
//! # use prettyplay::opt::Options;
//! let mut io = Io::with_options(std::io::stdin(), std::io::stdout(), &Options::with_tick(100))?;
//! let mut scene = Scene::new();
//! let player = scene.add(0, 0, 1, &Sprite::new(["@"]))?;
//! let (mut x, mut y) = (0, 0);
//!
//! loop {
//!     scene.paint(&mut io, Point::new(-5, -5))?;
//!     io.sync()?;
//!
//!     match io.read() {
//!         Event::Key(key) if key == b'q' => break,
//!         Event::Key(Key::UP) => y -= 1,
//!         Event::Key(Key::DOWN) => y += 1,
//!         Event::Key(Key::LEFT) => x -= 1,
//!         Event::Key(Key::RIGHT) => x += 1,
//!         _ => continue,
//!     }
//!     scene.move_to(player, x, y, 1)?;
//! }
//! # Ok::<(), prettyplay::err::Error>(())
//! ```

mod api;
pub mod cmd;
mod conn;
pub mod err;
mod event;
mod input;
pub mod opt;
mod output;
mod scene;
mod signal;
mod sys;
#[cfg(test)]
mod testing;
pub mod util;

pub use api::{Canvas, Command};
pub use conn::{Clock, Io, MonotonicClock};
pub use event::{Event, Key};
pub use input::Input;
pub use output::Output;
pub use scene::{Handle, Point, Scene, Sprite};
