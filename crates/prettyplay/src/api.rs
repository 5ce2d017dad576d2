use crate::err::Result;

/// A command for the terminal.
///
/// Commands provide instructions to the terminal and are communicated in-band
/// by writing ANSI escape codes. Doing so is the responsibility of the
/// [`std::fmt::Display`] implementation, whereas the [`std::fmt::Debug`]
/// implementation should simply identify the command.
///
/// This trait is object-safe.
pub trait Command: std::fmt::Debug + std::fmt::Display {}

/// Combine several commands into a single new command.
///
/// The new command preserves the order of its component commands. Upon
/// display, it emits as many ANSI escape sequence as it has component
/// commands. Upon debug, it reveals the macro's source arguments.
///
/// # Example
///
/// ```
/// # use prettyplay::{cmd::{EnterAlternateScreen, HideCursor}, fuse};
/// let enter = fuse!(EnterAlternateScreen, HideCursor);
/// assert_eq!(format!("{}", enter), "\x1b[?1049h\x1b[?25l");
/// ```
#[macro_export]
macro_rules! fuse {
    ($($command:expr),+ $(,)?) => {{
        /// One or more combined commands.
        #[derive(Copy, Clone, PartialEq, Eq)]
        struct Fused;

        impl $crate::Command for Fused {}

        impl ::std::fmt::Debug for Fused {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(concat!(stringify!(fuse!), "(", stringify!($($command),+), ")"))
            }
        }

        impl ::std::fmt::Display for Fused {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                $(::std::fmt::Display::fmt(&$command, f)?;)*
                Ok(())
            }
        }

        Fused
    }}
}

// ------------------------------------------------------------------------------------------------

/// A grid of character cells that accepts positioned text.
///
/// Canvases are what [`Scene::paint`](crate::Scene::paint) draws onto. Both
/// [`Output`](crate::Output) and [`Io`](crate::Io) are canvases. Coordinates
/// are 1-based, with `x` selecting the column and `y` the row.
pub trait Canvas {
    /// Get the number of columns.
    fn columns(&self) -> usize;

    /// Get the number of rows.
    fn rows(&self) -> usize;

    /// Write the bytes verbatim, starting at the given cell.
    fn put(&mut self, x: usize, y: usize, text: &[u8]) -> Result<()>;

    /// Write the string verbatim, starting at the given cell.
    #[inline]
    fn puts(&mut self, x: usize, y: usize, text: &str) -> Result<()> {
        self.put(x, y, text.as_bytes())
    }
}

/// A mutably borrowed canvas is a canvas.
impl<C: Canvas + ?Sized> Canvas for &mut C {
    #[inline]
    fn columns(&self) -> usize {
        (**self).columns()
    }

    #[inline]
    fn rows(&self) -> usize {
        (**self).rows()
    }

    #[inline]
    fn put(&mut self, x: usize, y: usize, text: &[u8]) -> Result<()> {
        (**self).put(x, y, text)
    }
}

fn _assert_traits_are_object_safe() {
    fn is_object_safe<T: ?Sized>() {}

    is_object_safe::<dyn Command>();
    is_object_safe::<dyn Canvas>();
}
