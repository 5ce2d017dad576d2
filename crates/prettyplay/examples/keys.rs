/// # keys: Visualizing Key Presses
///
/// This example reads events with a one second tick. It prints a small circle
/// for every tick and the bytes of every key press between large angular
/// brackets like so `〈‹esc›[A〉`. Pressing `q` exits the program.
///
/// If the `PRETTYPLAY_LOG` environment variable names a file, the example
/// writes the library's trace output to that file.
use std::fs::File;
use std::sync::Mutex;

use prettyplay::err::{report, Result};
use prettyplay::opt::Options;
use prettyplay::{Event, Io};

fn trace_to_file() -> std::io::Result<()> {
    if let Some(path) = std::env::var_os("PRETTYPLAY_LOG") {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

fn run() -> Result<()> {
    trace_to_file()?;

    let mut io = Io::with_options(std::io::stdin(), std::io::stdout(), &Options::with_tick(1_000))?;
    let width = io.columns().max(8);
    let (mut column, mut row) = (1, 2);
    io.puts(1, 1, "press ‹q› to quit")?;
    io.sync()?;

    loop {
        let token = match io.read() {
            Event::Key(key) if key == b'q' => break,
            Event::Key(key) => format!("〈{}〉", key),
            Event::Tick => "◦".to_owned(),
            Event::Signal(signal) => format!("⟪signal {}⟫", signal),
            Event::Error(code) => return Err(std::io::Error::from_raw_os_error(code).into()),
        };

        let length = token.chars().count();
        if width < column + length {
            column = 1;
            row = if io.rows() <= row { 2 } else { row + 1 };
        }
        io.puts(column, row, &token)?;
        io.sync()?;
        column += length;
    }

    io.free();
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        report(&error);
    }
}
