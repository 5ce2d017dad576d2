/// # termsize: Measuring the Terminal
///
/// This example draws a crosshair spanning the terminal and labels it with the
/// number of columns and rows. Resizing the window redraws the crosshair.
/// Pressing any key exits the program.
use prettyplay::err::{report, Result};
use prettyplay::{Event, Io};

fn draw<R, W>(io: &mut Io<R, W>) -> Result<()>
where
    R: std::os::fd::AsFd,
    W: std::io::Write + std::os::fd::AsFd,
{
    let (columns, rows) = (io.columns(), io.rows());
    io.clear()?;

    for column in 1..=columns {
        let c = if column == 1 {
            "◄"
        } else if column == columns {
            "►"
        } else {
            "─"
        };
        io.puts(column, rows / 2, c)?;
    }

    for row in 1..=rows {
        let c = if row == 1 {
            "▲"
        } else if row == rows {
            "▼"
        } else if row == rows / 2 {
            "┼"
        } else {
            "│"
        };
        io.puts(columns / 2, row, c)?;
    }

    let label = format!("{} columns", columns);
    io.puts((columns / 4 * 3).saturating_sub(5), (rows / 2).saturating_sub(1), &label)?;
    let label = format!("{} rows", rows);
    io.puts(columns / 2 + 1, rows / 4, &label)?;

    io.sync()
}

fn run() -> Result<()> {
    let mut io = Io::new(std::io::stdin(), std::io::stdout())?;
    draw(&mut io)?;

    loop {
        match io.read() {
            Event::Signal(_) => draw(&mut io)?,
            Event::Error(code) => return Err(std::io::Error::from_raw_os_error(code).into()),
            _ => return Ok(()),
        }
    }
}

fn main() {
    if let Err(error) = run() {
        report(&error);
    }
}
