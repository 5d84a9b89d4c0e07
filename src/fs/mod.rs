//! Synchronous file access over the native OS file API.
//!
//! The backend is picked when the crate is compiled: POSIX targets bind
//! against `libc`, Windows targets against `winapi`. Both backends expose
//! the same module surface (an owned `Handle` plus path-based free
//! functions) so the platform neutral code in [`file`] is identical for
//! every target.

#[cfg_attr(target_family = "unix", path = "file_unix.rs")]
#[cfg_attr(target_family = "windows", path = "file_win32.rs")]
pub(crate) mod imp;

mod file;
pub use file::*;
