//! Helper module with utilities for displaying raw input bytes.

use std::fmt;

/// Nicely format a byte.
///
/// Printable ASCII is written as is, the escape and delete controls as
/// mnemonics, all other C0 controls in caret notation, and everything else as
/// a two-digit hexadecimal number.
fn format_nicely<W>(byte: u8, output: &mut W) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    match byte {
        0x20..=0x7e => output.write_char(byte as char),
        0x1b => output.write_str("‹esc›"),
        0x7f => output.write_str("‹del›"),
        0x00..=0x1f => write!(output, "‹^{}›", (byte + 0x40) as char),
        _ => write!(output, "‹{:02x}›", byte),
    }
}

/// A newtype for nicely formatting a byte slice.
struct Nicely<'a>(&'a [u8]);

impl fmt::Display for Nicely<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            format_nicely(*byte, f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Nicely<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

/// Turn the slice into a value that displays nicely.
///
/// # Example
///
/// ```
/// # use prettyplay::util::nicely;
/// assert_eq!(format!("{}", nicely(b"\x1b[A")), "‹esc›[A");
/// assert_eq!(format!("{:?}", nicely(b"\x04q")), "\"‹^D›q\"");
/// ```
pub fn nicely(bytes: &[u8]) -> impl fmt::Debug + fmt::Display + '_ {
    Nicely(bytes)
}
