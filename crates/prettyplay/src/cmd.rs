//! The terminal commands for managing the screen.
//!
//! This module provides the handful of [`Command`](crate::Command)s that
//! terminal devices need, organized by topic:
//!
//!   * Screen management:
//!       * [`EnterAlternateScreen`] and [`ExitAlternateScreen`]
//!       * [`EraseScreen`]
//!   * Cursor management:
//!       * [`HideCursor`] and [`ShowCursor`]
//!       * Absolute positioning with [`DynMoveTo`]
//!
//! Unit commands are zero-sized, whereas [`DynMoveTo`] stores its arguments.
//! Several commands can be combined into one with [`fuse!`](crate::fuse).
//!
//!
//! # Example
//!
//! Executing a command is as simple as writing its display:
//! ```
//! # use prettyplay::cmd::{DynMoveTo, HideCursor};
//! assert_eq!(format!("{}{}", HideCursor, DynMoveTo(3, 14)), "\x1b[?25l\x1b[3;14H");
//! ```

macro_rules! declare_unit_struct {
    ($name:ident) => {
        #[doc = concat!("The unit `",stringify!($name),"` command.")]
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $name;
    };
}

macro_rules! implement_command {
    ($name:ident : $selfish:ident ; $output:ident $body:block) => {
        impl $crate::Command for $name {}

        impl ::core::fmt::Display for $name {
            #[inline]
            fn fmt(&$selfish, $output: &mut ::core::fmt::Formatter<'_>) -> core::fmt::Result {
                $body
            }
        }
    }
}

macro_rules! define_unit_command {
    ($name:ident, $ansi:tt) => {
        declare_unit_struct!($name);
        implement_command!($name: self; f { f.write_str($ansi) });
    };
}

// --------------------------------- Screen Management ---------------------------------

define_unit_command!(EnterAlternateScreen, "\x1b[?1049h");
define_unit_command!(ExitAlternateScreen, "\x1b[?1049l");

define_unit_command!(EraseScreen, "\x1b[2J");

// --------------------------------- Cursor Management ---------------------------------

define_unit_command!(HideCursor, "\x1b[?25l");
define_unit_command!(ShowCursor, "\x1b[?25h");

/// The dynamic `DynMoveTo(row, column)` command.
///
/// Rows and columns are 1-based. Since terminals clamp positions to the
/// screen, `DynMoveTo(0, 0)` is equivalent to `DynMoveTo(1, 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DynMoveTo(pub u16, pub u16);

implement_command!(DynMoveTo: self; f {
    write!(f, "\x1b[{};{}H", self.0, self.1)
});

// =====================================================================================
