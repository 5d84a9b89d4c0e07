//! Platform neutral file facade over the compiled native backend.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;

use super::imp;

/// How a file should be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Open an existing file for reading only.
    Read,
    /// Open for writing only, creating the file with owner read/write
    /// permission bits if it does not exist. The existing content is not
    /// truncated.
    Write,
}

/// Reference point for interpreting a seek distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Start of the file.
    Begin,
    /// Current file pointer position.
    Current,
    /// End of the file.
    End,
}

/// One calendar time stamp, converted to the local time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTime {
    pub year: i32,
    /// 1 through 12.
    pub month: u8,
    /// 1 through 31.
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Access, modification and creation stamps, always fetched together.
///
/// POSIX does not record a creation time; there `create` carries the status
/// change time the native `stat` surface provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    pub access: FileTime,
    pub modify: FileTime,
    pub create: FileTime,
}

/// A file on the file system, always bound to a path and optionally to an
/// open native handle.
///
/// Every operation is a direct blocking call into the native API and
/// signals failure through its return value. A `File` owns its handle
/// exclusively; concurrent use of one object from several threads needs
/// external synchronization. Dropping a `File` releases any handle that
/// `close` never did.
#[derive(Debug)]
pub struct File {
    path: PathBuf,
    handle: Option<imp::Handle>,
}

impl File {
    /// Binds a new unopened `File` to `path`. The file need not exist yet.
    pub fn new<P: Into<PathBuf>>(path: P) -> File {
        File {
            path: path.into(),
            handle: None,
        }
    }

    /// The path this file is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the file in the requested mode. A previously held handle is
    /// closed first; if that close fails the open is aborted and the old
    /// handle stays in place. Returns whether a valid handle was obtained.
    pub fn open(&mut self, mode: FileMode) -> bool {
        if self.handle.is_some() && !self.close() {
            return false;
        }

        self.handle = imp::Handle::open(&self.path, mode);
        self.handle.is_some()
    }

    /// Closes the currently open handle. Fails when no handle is open, so
    /// repeated calls are safe and simply report failure. When the native
    /// close itself fails the handle is retained and drop retries later.
    pub fn close(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => match handle.close() {
                Ok(()) => true,
                Err(handle) => {
                    self.handle = Some(handle);
                    false
                }
            },
            None => false,
        }
    }

    /// Whether a native handle is currently open.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Moves the file pointer `distance` bytes relative to `whence` and
    /// returns the new absolute offset, or -1 when unopened or when the
    /// native seek fails.
    pub fn seek(&mut self, distance: i64, whence: Whence) -> i64 {
        match &self.handle {
            Some(handle) => handle.seek(distance, whence),
            None => -1,
        }
    }

    /// The current file pointer position, or -1 when unopened.
    pub fn tell(&self) -> i64 {
        match &self.handle {
            Some(handle) => handle.seek(0, Whence::Current),
            None => -1,
        }
    }

    /// Reads up to `buffer.len()` bytes and returns the number actually
    /// read. Zero signals end of file and is not an error. Returns -1 when
    /// unopened or on a native failure.
    pub fn read(&mut self, buffer: &mut [u8]) -> i64 {
        match &self.handle {
            Some(handle) => handle.read(buffer),
            None => -1,
        }
    }

    /// Writes up to `buffer.len()` bytes and returns the number actually
    /// written, which may be less than requested; the caller handles
    /// partial writes. Returns -1 when unopened or on a native failure.
    pub fn write(&mut self, buffer: &[u8]) -> i64 {
        match &self.handle {
            Some(handle) => handle.write(buffer),
            None => -1,
        }
    }

    /// Whether the file exists. With an open handle the handle itself is
    /// queried; otherwise this delegates to the path based [`exists`].
    pub fn exists(&self) -> bool {
        match &self.handle {
            Some(handle) => handle.exists(),
            None => exists(&self.path),
        }
    }

    /// Deletes the file's directory entry, closing any open handle first.
    /// A failed close does not stop the removal; the return value reports
    /// the deletion only. Other hard links to the same content remain.
    pub fn remove(&mut self) -> bool {
        self.close();

        imp::remove(&self.path)
    }

    /// Moves the file to `new_path`. Refuses, before any native call, to
    /// overwrite an existing entry. Any open handle is closed first; on a
    /// failed rename the stored path is left unchanged but the close is
    /// not undone.
    pub fn rename<P: Into<PathBuf>>(&mut self, new_path: P) -> bool {
        let new_path = new_path.into();

        if exists(&new_path) {
            return false;
        }

        self.close();

        if imp::rename(&self.path, &new_path) {
            self.path = new_path;
            return true;
        }

        false
    }

    /// Access, modification and creation times in local calendar time,
    /// via the handle when open and via the path otherwise. All three
    /// stamps convert or the whole query fails.
    pub fn times(&self) -> Option<FileTimes> {
        match &self.handle {
            Some(handle) => handle.times(),
            None => times(&self.path),
        }
    }

    /// Whether the current process could open this file in `mode`. Always
    /// a path based check, independent of any handle held here.
    pub fn access(&self, mode: FileMode) -> bool {
        access(&self.path, mode)
    }

    /// Whether the file is hidden under the platform's convention; see
    /// the free function [`hidden`] for the per backend rule.
    pub fn hidden(&self) -> bool {
        hidden(&self.path)
    }

    /// The file size in bytes, or -1 on failure.
    ///
    /// When unopened the path metadata is queried directly. When open the
    /// size is measured against the live handle with seek alone, so it
    /// reflects the open file even mid-write: save the current offset,
    /// seek to the end, restore the offset.
    pub fn size(&mut self) -> i64 {
        if self.handle.is_none() {
            return size(&self.path);
        }

        let cur_pos = self.tell();
        let size = self.seek(0, Whence::End);
        self.seek(cur_pos, Whence::Begin);

        size
    }

    /// Binds a `File` to a freshly chosen unique path under the platform
    /// temp directory. Nothing is created or opened; the caller decides
    /// when to [`open`](File::open).
    pub fn temp() -> File {
        static TEMP_DIR: Lazy<PathBuf> = Lazy::new(std::env::temp_dir);

        File::temp_in(TEMP_DIR.as_path())
    }

    /// Like [`File::temp`] with a caller chosen base directory.
    pub fn temp_in<P: Into<PathBuf>>(base: P) -> File {
        static SEQ: AtomicU64 = AtomicU64::new(0);

        let base = base.into();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.subsec_nanos())
            .unwrap_or(0);

        loop {
            let name = format!(
                "osfile-{}-{:x}-{:x}",
                std::process::id(),
                nanos,
                SEQ.fetch_add(1, Ordering::Relaxed)
            );

            let candidate = base.join(name);

            if !exists(&candidate) {
                return File::new(candidate);
            }
        }
    }
}

// The path based free functions below mirror the instance operations for
// callers holding no `File`. They go straight to the native metadata call
// or action; constructing a `File` (or opening a throwaway handle) inside
// them would change their cost, so they never delegate to the methods
// above.

/// Whether an entry exists at `path`.
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    imp::exists(path.as_ref())
}

/// Deletes the directory entry at `path`. Other hard links to the same
/// content are untouched.
pub fn remove<P: AsRef<Path>>(path: P) -> bool {
    imp::remove(path.as_ref())
}

/// Moves `old_path` to `new_path`, refusing to overwrite an existing
/// entry. The existence check and the rename are two native calls; a
/// racing outside process can still slip between them, which is left to
/// native file system semantics.
pub fn rename<P: AsRef<Path>, Q: AsRef<Path>>(old_path: P, new_path: Q) -> bool {
    if imp::exists(new_path.as_ref()) {
        return false;
    }

    imp::rename(old_path.as_ref(), new_path.as_ref())
}

/// Access, modification and creation times of `path` in local calendar
/// time; `None` when the metadata query or any conversion fails.
pub fn times<P: AsRef<Path>>(path: P) -> Option<FileTimes> {
    imp::times(path.as_ref())
}

/// Whether the current process could open `path` in `mode`.
pub fn access<P: AsRef<Path>>(path: P, mode: FileMode) -> bool {
    imp::access(path.as_ref(), mode)
}

/// Whether `path` is hidden. POSIX backends use the dot-prefixed file
/// name convention; the Windows backend reads the native hidden attribute
/// bit and ignores dot prefixes.
pub fn hidden<P: AsRef<Path>>(path: P) -> bool {
    imp::hidden(path.as_ref())
}

/// The size in bytes of the entry at `path`, or -1 when the metadata
/// query fails.
pub fn size<P: AsRef<Path>>(path: P) -> i64 {
    imp::size(path.as_ref())
}
