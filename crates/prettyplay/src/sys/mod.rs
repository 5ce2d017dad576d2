//! The operating system interface.
//!
//! Everything that touches a file descriptor with a system call lives here:
//! terminal attributes, the window size, raw reads and writes, and readiness
//! polling. The rest of the crate only sees the types re-exported below.

#[cfg(target_family = "unix")]
pub(crate) type RawHandle = std::os::fd::RawFd;

#[cfg(target_family = "unix")]
mod unix;

#[cfg(target_family = "unix")]
pub(crate) use self::unix::{
    check_handle, is_terminal, poll, window_size, Config, RawInput, RawOutput,
};

#[cfg(not(target_family = "unix"))]
compile_error!("prettyplay drives terminals through termios and poll(2), which requires Unix");
