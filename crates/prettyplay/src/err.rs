//! Helper module with this crate's error type.
//!
//! Errors classify what went wrong with terminal devices and scenes. They
//! carry the underlying I/O error, if any, and seamlessly convert to and from
//! I/O errors.

/// The enumeration of error kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// An argument is malformed, e.g., a sprite without forms.
    InvalidArgument,
    /// Memory for a new sprite could not be reserved.
    OutOfMemory,
    /// Writing to or flushing the terminal failed.
    Io,
    /// A position lies outside the cached terminal bounds or a form index
    /// outside the sprite's forms.
    OutOfRange,
    /// A sprite handle does not belong to the scene.
    NotFound,
    /// The output stream is not connected to a terminal.
    NotATerminal,
    /// Another output device already controls the terminal.
    AlreadyActive,
    /// The output device is suspended for debugging.
    Suspended,
}

impl ErrorKind {
    /// Turn the error kind to an error message.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid argument",
            Self::OutOfMemory => "out of memory",
            Self::Io => "terminal I/O failed",
            Self::OutOfRange => "position or index out of range",
            Self::NotFound => "sprite not found in scene",
            Self::NotATerminal => "stream is not a terminal",
            Self::AlreadyActive => "terminal is already controlled by another output device",
            Self::Suspended => "output is suspended for debugging",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error { kind, source: None }
    }
}

impl From<ErrorKind> for std::io::Error {
    fn from(value: ErrorKind) -> Self {
        Error::from(value).into()
    }
}

/// A terminal or scene error.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<std::io::Error>,
}

impl Error {
    /// Create a new error of the given kind caused by an I/O error.
    pub fn with_source(kind: ErrorKind, source: std::io::Error) -> Self {
        Self {
            kind,
            source: Some(source),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        let kind = if value.kind() == std::io::ErrorKind::OutOfMemory {
            ErrorKind::OutOfMemory
        } else {
            ErrorKind::Io
        };
        Error::with_source(kind, value)
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        ErrorKind::OutOfMemory.into()
    }
}

impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        use self::ErrorKind::*;

        match value.kind {
            InvalidArgument | OutOfRange => Self::new(std::io::ErrorKind::InvalidInput, value),
            OutOfMemory => std::io::ErrorKind::OutOfMemory.into(),
            NotFound => Self::new(std::io::ErrorKind::NotFound, value),
            NotATerminal => Self::new(std::io::ErrorKind::Unsupported, value),
            AlreadyActive | Suspended => Self::new(std::io::ErrorKind::ResourceBusy, value),
            Io => {
                if let Some(error) = value.source {
                    error
                } else {
                    Self::new(std::io::ErrorKind::Other, value)
                }
            }
        }
    }
}

/// A specialized result type for terminal devices and scenes.
pub type Result<T> = std::result::Result<T, Error>;

/// Report the error, including any sources.
///
/// Call this only after the terminal has been restored, since the report goes
/// to standard output.
pub fn report<E: std::error::Error>(error: &E) {
    println!("ERROR: {}", error);

    let mut error: &dyn std::error::Error = error;
    while let Some(inner) = error.source() {
        println!("    {}", inner);
        error = inner;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_conversions() {
        let error = Error::from(ErrorKind::NotFound);
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(format!("{}", error), "sprite not found in scene");

        let io = std::io::Error::from(error);
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);

        let broken = std::io::Error::from(std::io::ErrorKind::BrokenPipe);
        let error = Error::from(broken);
        assert_eq!(error.kind(), ErrorKind::Io);
        assert!(std::error::Error::source(&error).is_some());
        assert_eq!(
            std::io::Error::from(error).kind(),
            std::io::ErrorKind::BrokenPipe
        );
    }
}
