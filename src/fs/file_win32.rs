//! Windows backend, built directly on `winapi`.
//!
//! Hidden means the FILE_ATTRIBUTE_HIDDEN bit; dot-prefixed names are not
//! treated specially here. Write access is judged from the read-only
//! attribute bit.

use std::mem::MaybeUninit;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::ptr::null_mut;

use winapi::shared::minwindef::{DWORD, FILETIME, LPVOID};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::fileapi::{
    CreateFileW, DeleteFileW, FileTimeToLocalFileTime, GetFileAttributesExW, GetFileAttributesW,
    GetFileInformationByHandle, GetFileTime, ReadFile, SetFilePointerEx, WriteFile,
    BY_HANDLE_FILE_INFORMATION, INVALID_FILE_ATTRIBUTES, OPEN_ALWAYS, OPEN_EXISTING,
    WIN32_FILE_ATTRIBUTE_DATA,
};
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::minwinbase::{GetFileExInfoStandard, SYSTEMTIME};
use winapi::um::timezoneapi::FileTimeToSystemTime;
use winapi::um::winbase::{MoveFileW, FILE_BEGIN, FILE_CURRENT, FILE_END};
use winapi::um::winnt::{
    FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_NORMAL, FILE_ATTRIBUTE_READONLY, FILE_SHARE_READ,
    GENERIC_READ, GENERIC_WRITE, HANDLE, LARGE_INTEGER,
};

use super::{FileMode, FileTime, FileTimes, Whence};

/// Owned Win32 file handle. Closed on drop if never explicitly closed.
#[derive(Debug)]
pub(crate) struct Handle {
    handle: HANDLE,
}

impl Handle {
    pub(crate) fn open(path: &Path, mode: FileMode) -> Option<Handle> {
        let pathname = wide_path(path);

        let handle = unsafe {
            match mode {
                FileMode::Read => CreateFileW(
                    pathname.as_ptr(),
                    GENERIC_READ,
                    FILE_SHARE_READ,
                    null_mut(),
                    OPEN_EXISTING,
                    FILE_ATTRIBUTE_NORMAL,
                    null_mut(),
                ),
                FileMode::Write => CreateFileW(
                    pathname.as_ptr(),
                    GENERIC_WRITE,
                    0,
                    null_mut(),
                    OPEN_ALWAYS,
                    FILE_ATTRIBUTE_NORMAL,
                    null_mut(),
                ),
            }
        };

        if handle == INVALID_HANDLE_VALUE {
            log::trace!(target: "win32_fs", "CreateFileW({:?}) failed: {}", path, unsafe {
                GetLastError()
            });
            return None;
        }

        Some(Handle { handle })
    }

    /// Explicit close. On failure the handle is handed back so it is
    /// neither leaked nor blindly discarded; drop retries later.
    pub(crate) fn close(self) -> Result<(), Handle> {
        let handle = self.handle;

        if unsafe { CloseHandle(handle) } != 0 {
            std::mem::forget(self);
            Ok(())
        } else {
            log::trace!(target: "win32_fs", "CloseHandle({:?}) failed: {}", handle, unsafe {
                GetLastError()
            });
            Err(self)
        }
    }

    pub(crate) fn seek(&self, distance: i64, whence: Whence) -> i64 {
        let method = match whence {
            Whence::Begin => FILE_BEGIN,
            Whence::Current => FILE_CURRENT,
            Whence::End => FILE_END,
        };

        unsafe {
            let mut offset: LARGE_INTEGER = std::mem::zeroed();
            *offset.QuadPart_mut() = distance;

            let mut new_offset: LARGE_INTEGER = std::mem::zeroed();

            if SetFilePointerEx(self.handle, offset, &mut new_offset, method) == 0 {
                return -1;
            }

            *new_offset.QuadPart()
        }
    }

    pub(crate) fn read(&self, buffer: &mut [u8]) -> i64 {
        let count = buffer.len().min(DWORD::MAX as usize) as DWORD;
        let mut done: DWORD = 0;

        let ok = unsafe {
            ReadFile(
                self.handle,
                buffer.as_mut_ptr().cast(),
                count,
                &mut done,
                null_mut(),
            )
        };

        if ok == 0 {
            return -1;
        }

        done as i64
    }

    pub(crate) fn write(&self, buffer: &[u8]) -> i64 {
        let count = buffer.len().min(DWORD::MAX as usize) as DWORD;
        let mut done: DWORD = 0;

        let ok = unsafe {
            WriteFile(
                self.handle,
                buffer.as_ptr().cast(),
                count,
                &mut done,
                null_mut(),
            )
        };

        if ok == 0 {
            return -1;
        }

        done as i64
    }

    /// The handle is authoritative even while the bound path is stale.
    pub(crate) fn exists(&self) -> bool {
        let mut info = MaybeUninit::<BY_HANDLE_FILE_INFORMATION>::uninit();

        unsafe { GetFileInformationByHandle(self.handle, info.as_mut_ptr()) != 0 }
    }

    pub(crate) fn times(&self) -> Option<FileTimes> {
        let mut create = zero_filetime();
        let mut access = zero_filetime();
        let mut modify = zero_filetime();

        if unsafe { GetFileTime(self.handle, &mut create, &mut access, &mut modify) } == 0 {
            return None;
        }

        local_times(&access, &modify, &create)
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.handle);
        }
    }
}

pub(crate) fn exists(path: &Path) -> bool {
    let pathname = wide_path(path);

    unsafe { GetFileAttributesW(pathname.as_ptr()) != INVALID_FILE_ATTRIBUTES }
}

pub(crate) fn remove(path: &Path) -> bool {
    let pathname = wide_path(path);

    if unsafe { DeleteFileW(pathname.as_ptr()) } != 0 {
        true
    } else {
        log::trace!(target: "win32_fs", "DeleteFileW({:?}) failed: {}", path, unsafe {
            GetLastError()
        });
        false
    }
}

pub(crate) fn rename(old_path: &Path, new_path: &Path) -> bool {
    let old_name = wide_path(old_path);
    let new_name = wide_path(new_path);

    if unsafe { MoveFileW(old_name.as_ptr(), new_name.as_ptr()) } != 0 {
        true
    } else {
        log::trace!(
            target: "win32_fs",
            "MoveFileW({:?} -> {:?}) failed: {}",
            old_path,
            new_path,
            unsafe { GetLastError() }
        );
        false
    }
}

pub(crate) fn times(path: &Path) -> Option<FileTimes> {
    let data = attribute_data(path)?;

    local_times(
        &data.ftLastAccessTime,
        &data.ftLastWriteTime,
        &data.ftCreationTime,
    )
}

pub(crate) fn access(path: &Path, mode: FileMode) -> bool {
    let pathname = wide_path(path);
    let attributes = unsafe { GetFileAttributesW(pathname.as_ptr()) };

    if attributes == INVALID_FILE_ATTRIBUTES {
        return false;
    }

    match mode {
        FileMode::Read => true,
        FileMode::Write => attributes & FILE_ATTRIBUTE_READONLY == 0,
    }
}

pub(crate) fn hidden(path: &Path) -> bool {
    let pathname = wide_path(path);
    let attributes = unsafe { GetFileAttributesW(pathname.as_ptr()) };

    attributes != INVALID_FILE_ATTRIBUTES && attributes & FILE_ATTRIBUTE_HIDDEN != 0
}

pub(crate) fn size(path: &Path) -> i64 {
    match attribute_data(path) {
        Some(data) => ((data.nFileSizeHigh as i64) << 32) | data.nFileSizeLow as i64,
        None => -1,
    }
}

fn wide_path(path: &Path) -> Vec<u16> {
    path.as_os_str().encode_wide().chain(Some(0)).collect()
}

fn attribute_data(path: &Path) -> Option<WIN32_FILE_ATTRIBUTE_DATA> {
    let pathname = wide_path(path);
    let mut data = MaybeUninit::<WIN32_FILE_ATTRIBUTE_DATA>::uninit();

    let ok = unsafe {
        GetFileAttributesExW(
            pathname.as_ptr(),
            GetFileExInfoStandard,
            data.as_mut_ptr() as LPVOID,
        )
    };

    if ok == 0 {
        return None;
    }

    Some(unsafe { data.assume_init() })
}

fn zero_filetime() -> FILETIME {
    FILETIME {
        dwLowDateTime: 0,
        dwHighDateTime: 0,
    }
}

/// All three stamps convert to local calendar time or the query fails.
fn local_times(access: &FILETIME, modify: &FILETIME, create: &FILETIME) -> Option<FileTimes> {
    Some(FileTimes {
        access: local_time(access)?,
        modify: local_time(modify)?,
        create: local_time(create)?,
    })
}

fn local_time(stamp: &FILETIME) -> Option<FileTime> {
    unsafe {
        let mut local = zero_filetime();

        if FileTimeToLocalFileTime(stamp, &mut local) == 0 {
            return None;
        }

        let mut calendar: SYSTEMTIME = std::mem::zeroed();

        if FileTimeToSystemTime(&local, &mut calendar) == 0 {
            return None;
        }

        Some(FileTime {
            year: calendar.wYear as i32,
            month: calendar.wMonth as u8,
            day: calendar.wDay as u8,
            hour: calendar.wHour as u8,
            minute: calendar.wMinute as u8,
            second: calendar.wSecond as u8,
        })
    }
}
