//! POSIX backend, built directly on `libc`.
//!
//! `create` in [`FileTimes`] carries `st_ctime`, the status change time,
//! since POSIX keeps no birth time in `stat`. Hidden means a dot-prefixed
//! file name.

use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use errno::errno;
use libc::*;

use super::{FileMode, FileTime, FileTimes, Whence};

/// Owned POSIX file descriptor. Closed on drop if never explicitly closed.
#[derive(Debug)]
pub(crate) struct Handle {
    fd: c_int,
}

impl Handle {
    pub(crate) fn open(path: &Path, mode: FileMode) -> Option<Handle> {
        let pathname = c_path(path)?;

        let fd = unsafe {
            match mode {
                FileMode::Read => open(pathname.as_ptr(), O_RDONLY),
                FileMode::Write => open(
                    pathname.as_ptr(),
                    O_CREAT | O_WRONLY,
                    (S_IRUSR | S_IWUSR) as c_uint,
                ),
            }
        };

        if fd == -1 {
            log::trace!(target: "unix_fs", "open({:?}) failed: {}", path, errno());
            return None;
        }

        Some(Handle { fd })
    }

    /// Explicit close. On failure the descriptor is handed back so it is
    /// neither leaked nor blindly discarded; drop retries later.
    pub(crate) fn close(self) -> Result<(), Handle> {
        let fd = self.fd;

        if unsafe { libc::close(fd) } == 0 {
            std::mem::forget(self);
            Ok(())
        } else {
            log::trace!(target: "unix_fs", "close({}) failed: {}", fd, errno());
            Err(self)
        }
    }

    pub(crate) fn seek(&self, distance: i64, whence: Whence) -> i64 {
        let whence = match whence {
            Whence::Begin => SEEK_SET,
            Whence::Current => SEEK_CUR,
            Whence::End => SEEK_END,
        };

        unsafe { lseek(self.fd, distance as off_t, whence) as i64 }
    }

    pub(crate) fn read(&self, buffer: &mut [u8]) -> i64 {
        unsafe { libc::read(self.fd, buffer.as_mut_ptr().cast(), buffer.len()) as i64 }
    }

    pub(crate) fn write(&self, buffer: &[u8]) -> i64 {
        unsafe { libc::write(self.fd, buffer.as_ptr().cast(), buffer.len()) as i64 }
    }

    /// The handle is authoritative even while the bound path is stale.
    pub(crate) fn exists(&self) -> bool {
        self.stat().is_some()
    }

    pub(crate) fn times(&self) -> Option<FileTimes> {
        local_times(&self.stat()?)
    }

    fn stat(&self) -> Option<stat> {
        let mut file_stat = MaybeUninit::<stat>::uninit();

        if unsafe { fstat(self.fd, file_stat.as_mut_ptr()) } == -1 {
            return None;
        }

        Some(unsafe { file_stat.assume_init() })
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

pub(crate) fn exists(path: &Path) -> bool {
    stat_path(path).is_some()
}

pub(crate) fn remove(path: &Path) -> bool {
    let pathname = match c_path(path) {
        Some(pathname) => pathname,
        None => return false,
    };

    if unsafe { unlink(pathname.as_ptr()) } == 0 {
        true
    } else {
        log::trace!(target: "unix_fs", "unlink({:?}) failed: {}", path, errno());
        false
    }
}

pub(crate) fn rename(old_path: &Path, new_path: &Path) -> bool {
    let (old_name, new_name) = match (c_path(old_path), c_path(new_path)) {
        (Some(old_name), Some(new_name)) => (old_name, new_name),
        _ => return false,
    };

    if unsafe { libc::rename(old_name.as_ptr(), new_name.as_ptr()) } == 0 {
        true
    } else {
        log::trace!(
            target: "unix_fs",
            "rename({:?} -> {:?}) failed: {}",
            old_path,
            new_path,
            errno()
        );
        false
    }
}

pub(crate) fn times(path: &Path) -> Option<FileTimes> {
    local_times(&stat_path(path)?)
}

pub(crate) fn access(path: &Path, mode: FileMode) -> bool {
    let pathname = match c_path(path) {
        Some(pathname) => pathname,
        None => return false,
    };

    let probe = match mode {
        FileMode::Read => R_OK,
        FileMode::Write => W_OK,
    };

    unsafe { libc::access(pathname.as_ptr(), probe) == 0 }
}

pub(crate) fn hidden(path: &Path) -> bool {
    match path.file_name() {
        Some(name) => name.as_bytes().starts_with(b"."),
        None => false,
    }
}

pub(crate) fn size(path: &Path) -> i64 {
    match stat_path(path) {
        Some(file_stat) => file_stat.st_size as i64,
        None => -1,
    }
}

fn c_path(path: &Path) -> Option<CString> {
    // Interior NUL bytes cannot reach the native API.
    CString::new(path.as_os_str().as_bytes()).ok()
}

fn stat_path(path: &Path) -> Option<stat> {
    let pathname = c_path(path)?;
    let mut file_stat = MaybeUninit::<stat>::uninit();

    if unsafe { stat(pathname.as_ptr(), file_stat.as_mut_ptr()) } == -1 {
        return None;
    }

    Some(unsafe { file_stat.assume_init() })
}

/// All three stamps convert to local calendar time or the query fails.
fn local_times(file_stat: &stat) -> Option<FileTimes> {
    Some(FileTimes {
        access: local_time(file_stat.st_atime)?,
        modify: local_time(file_stat.st_mtime)?,
        create: local_time(file_stat.st_ctime)?,
    })
}

fn local_time(stamp: time_t) -> Option<FileTime> {
    let mut calendar = MaybeUninit::<tm>::uninit();

    if unsafe { localtime_r(&stamp, calendar.as_mut_ptr()) }.is_null() {
        return None;
    }

    let calendar = unsafe { calendar.assume_init() };

    Some(FileTime {
        year: calendar.tm_year + 1900,
        month: (calendar.tm_mon + 1) as u8,
        day: calendar.tm_mday as u8,
        hour: calendar.tm_hour as u8,
        minute: calendar.tm_min as u8,
        second: calendar.tm_sec as u8,
    })
}
