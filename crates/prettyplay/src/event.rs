use std::ffi::c_int;

use crate::util::nicely;

/// A key press, packed into 32 bits.
///
/// A key press is the sequence of up to four bytes a terminal sends for one
/// key: a single ASCII byte, a multi-byte UTF-8 character, or a short ANSI
/// escape sequence such as `ESC [ A` for the up arrow. The bytes are packed
/// with the first byte in the lowest-order position. Consequently, a single
/// ASCII byte packs to itself and control characters come out as they are
/// read, e.g., control-d as 0x04.
///
/// Longer escape sequences, such as those for function keys with modifiers,
/// are truncated to their first four bytes.
///
/// # Example
///
/// ```
/// # use prettyplay::Key;
/// assert_eq!(Key::from_bytes(b"\x1b[A"), Key::UP);
/// assert_eq!(Key::UP.value(), 0x41_5b_1b);
/// assert_eq!(Key::from(b'q'), b'q');
/// assert_eq!(Key::from('é').as_char(), Some('é'));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(u32);

impl Key {
    /// The up arrow `ESC [ A`.
    pub const UP: Key = Key(0x41_5b_1b);
    /// The down arrow `ESC [ B`.
    pub const DOWN: Key = Key(0x42_5b_1b);
    /// The right arrow `ESC [ C`.
    pub const RIGHT: Key = Key(0x43_5b_1b);
    /// The left arrow `ESC [ D`.
    pub const LEFT: Key = Key(0x44_5b_1b);
    /// A lone escape.
    pub const ESCAPE: Key = Key(0x1b);
    /// Control-c, delivered as a key in raw mode only.
    pub const CTRL_C: Key = Key(0x03);
    /// Control-d.
    pub const CTRL_D: Key = Key(0x04);

    /// Create a new key from its packed value.
    pub const fn from_value(value: u32) -> Self {
        Self(value)
    }

    /// Pack the first four bytes into a key.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let value = bytes
            .iter()
            .take(4)
            .enumerate()
            .fold(0, |acc, (index, byte)| acc | (*byte as u32) << (index * 8));
        Self(value)
    }

    /// Get the packed value.
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Get the number of bytes in this key press.
    ///
    /// Since a zero byte is a valid key press, namely control-@, the length is
    /// always at least one.
    pub const fn len(&self) -> usize {
        let significant = 4 - (self.0.leading_zeros() as usize) / 8;
        if significant == 0 {
            1
        } else {
            significant
        }
    }

    /// Determine whether this key press has no bytes, which it never has.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Unpack the bytes.
    pub fn to_bytes(&self) -> ([u8; 4], usize) {
        (self.0.to_le_bytes(), self.len())
    }

    /// Decode the key press as a character, if it is one.
    pub fn as_char(&self) -> Option<char> {
        let (bytes, len) = self.to_bytes();
        let text = std::str::from_utf8(&bytes[..len]).ok()?;
        let mut chars = text.chars();
        let c = chars.next()?;
        if chars.next().is_none() {
            Some(c)
        } else {
            None
        }
    }
}

impl From<u8> for Key {
    fn from(value: u8) -> Self {
        Self(value as u32)
    }
}

impl From<char> for Key {
    fn from(value: char) -> Self {
        let mut buffer = [0; 4];
        Self::from_bytes(value.encode_utf8(&mut buffer).as_bytes())
    }
}

impl PartialEq<u8> for Key {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other as u32
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (bytes, len) = self.to_bytes();
        let text = nicely(&bytes[..len]);
        write!(f, "Key({:#x}, {:?})", self.0, text)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (bytes, len) = self.to_bytes();
        let text = nicely(&bytes[..len]);
        write!(f, "{}", text)
    }
}

// ------------------------------------------------------------------------------------------------

/// An input event.
///
/// Reading from an [`Input`](crate::Input) or [`Io`](crate::Io) device always
/// produces exactly one event. Failures are reported in-band as
/// [`Event::Error`], so that a game loop can decide for itself whether an
/// error is fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Reading failed with the given OS error code.
    Error(c_int),
    /// A key was pressed.
    Key(Key),
    /// The timeout elapsed without input.
    Tick,
    /// The process received the given signal.
    Signal(c_int),
}

impl Event {
    /// Create an error event for the I/O error.
    pub(crate) fn from_io(error: &std::io::Error) -> Self {
        Self::Error(error.raw_os_error().unwrap_or(libc::EIO))
    }

    /// Determine whether this event is a tick.
    pub fn is_tick(&self) -> bool {
        matches!(self, Self::Tick)
    }

    /// Get the key for a key event.
    pub fn key(&self) -> Option<Key> {
        if let Self::Key(key) = self {
            Some(*key)
        } else {
            None
        }
    }

    /// Get the I/O error for an error event.
    pub fn error(&self) -> Option<std::io::Error> {
        if let Self::Error(code) = self {
            Some(std::io::Error::from_raw_os_error(*code))
        } else {
            None
        }
    }
}
