use std::path::PathBuf;

use osfile::fs::{self, File, FileMode, Whence};

fn scratch_dir() -> PathBuf {
    let dir: PathBuf = env!("CARGO_TARGET_TMPDIR").into();

    std::fs::create_dir_all(&dir).unwrap();

    dir
}

#[test]
fn test_write_read_round_trip() {
    let mut file = File::temp_in(scratch_dir());

    assert!(file.open(FileMode::Write));
    assert_eq!(file.write(b"hello world"), 11);
    assert!(file.close());

    assert!(file.open(FileMode::Read));

    let mut buffer = [0u8; 11];

    assert_eq!(file.read(&mut buffer), 11);
    assert_eq!(&buffer, b"hello world");
    // End of file is reported as zero, not as a failure.
    assert_eq!(file.read(&mut buffer), 0);

    assert!(file.close());
    assert!(file.remove());
}

#[test]
fn test_seek_contract() {
    let mut file = File::temp_in(scratch_dir());

    assert!(file.open(FileMode::Write));
    assert_eq!(file.write(b"0123456789"), 10);
    assert!(file.close());

    assert!(file.open(FileMode::Read));

    assert_eq!(file.seek(0, Whence::End), 10);
    assert_eq!(file.seek(0, Whence::Begin), 0);
    assert_eq!(file.tell(), 0);

    let mut buffer = [0u8; 4];

    assert_eq!(file.read(&mut buffer), 4);
    assert_eq!(file.tell(), 4);
    assert_eq!(file.seek(-4, Whence::Current), 0);

    assert_eq!(file.seek(3, Whence::Begin), 3);
    assert_eq!(file.read(&mut buffer), 4);
    assert_eq!(&buffer, b"3456");

    assert!(file.close());
    assert!(file.remove());
}

#[test]
fn test_size_open_matches_size_closed() {
    let mut file = File::temp_in(scratch_dir());

    assert!(file.open(FileMode::Write));
    assert_eq!(file.write(b"hello"), 5);
    assert!(file.close());

    assert!(file.open(FileMode::Read));
    assert_eq!(file.seek(2, Whence::Begin), 2);

    // Measured against the live handle, with the offset preserved.
    assert_eq!(file.size(), 5);
    assert_eq!(file.tell(), 2);

    assert!(file.close());
    assert_eq!(file.size(), 5);
    assert_eq!(fs::size(file.path()), 5);

    assert!(file.remove());
}

#[test]
fn test_rename_refuses_overwrite() {
    let dir = scratch_dir();

    let mut first = File::temp_in(&dir);
    assert!(first.open(FileMode::Write));
    assert_eq!(first.write(b"first"), 5);
    assert!(first.close());

    let mut second = File::temp_in(&dir);
    assert!(second.open(FileMode::Write));
    assert_eq!(second.write(b"second"), 6);
    assert!(second.close());

    let first_path = first.path().to_path_buf();

    assert!(!first.rename(second.path()));

    // Both entries and both bound paths are untouched.
    assert_eq!(first.path(), first_path);
    assert_eq!(fs::size(&first_path), 5);
    assert_eq!(fs::size(second.path()), 6);

    assert!(first.remove());
    assert!(second.remove());
}

#[test]
fn test_rename_moves_entry_and_rebinds() {
    let dir = scratch_dir();

    let mut file = File::temp_in(&dir);
    assert!(file.open(FileMode::Write));
    assert_eq!(file.write(b"payload"), 7);

    let old_path = file.path().to_path_buf();
    let new_path = File::temp_in(&dir).path().to_path_buf();

    assert!(file.rename(&new_path));

    // The open handle was closed on the way and the path was rebound.
    assert!(!file.is_open());
    assert_eq!(file.path(), new_path);
    assert!(!fs::exists(&old_path));
    assert_eq!(fs::size(&new_path), 7);

    assert!(file.remove());
}

#[test]
fn test_static_rename_guard() {
    let dir = scratch_dir();

    let mut from = File::temp_in(&dir);
    assert!(from.open(FileMode::Write));
    assert!(from.close());

    let mut to = File::temp_in(&dir);
    assert!(to.open(FileMode::Write));
    assert!(to.close());

    assert!(!fs::rename(from.path(), to.path()));
    assert!(fs::exists(from.path()));

    let fresh = File::temp_in(&dir).path().to_path_buf();

    assert!(fs::rename(from.path(), &fresh));
    assert!(!fs::exists(from.path()));
    assert!(fs::exists(&fresh));

    assert!(fs::remove(&fresh));
    assert!(to.remove());
}

#[test]
fn test_times_fetched_together() {
    let mut file = File::temp_in(scratch_dir());

    assert!(file.open(FileMode::Write));
    assert_eq!(file.write(b"stamped"), 7);

    // Handle based and path based queries both produce full stamp sets.
    let via_handle = file.times().unwrap();
    assert!(file.close());
    let via_path = file.times().unwrap();

    for stamps in [via_handle, via_path] {
        for stamp in [stamps.access, stamps.modify, stamps.create] {
            assert!(stamp.year >= 1970);
            assert!((1..=12).contains(&stamp.month));
            assert!((1..=31).contains(&stamp.day));
            assert!(stamp.hour < 24);
            assert!(stamp.minute < 60);
            assert!(stamp.second < 62);
        }
    }

    assert!(file.remove());
}

#[test]
fn test_access_on_created_file() {
    let mut file = File::temp_in(scratch_dir());

    assert!(!file.access(FileMode::Read));

    assert!(file.open(FileMode::Write));
    assert!(file.close());

    assert!(file.access(FileMode::Read));
    assert!(file.access(FileMode::Write));
    assert!(fs::access(file.path(), FileMode::Read));

    assert!(file.remove());
}

#[test]
fn test_exists_prefers_open_handle() {
    let mut file = File::temp_in(scratch_dir());

    assert!(file.open(FileMode::Write));
    assert!(file.exists());
    assert!(fs::exists(file.path()));

    assert!(file.close());
    assert!(file.remove());
    assert!(!file.exists());
}

#[test]
fn test_temp_end_to_end() {
    let mut file = File::temp();

    assert!(!file.is_open());
    assert!(!fs::exists(file.path()));

    assert!(file.open(FileMode::Write));
    assert_eq!(file.write(b"hello"), 5);
    assert!(file.close());

    assert_eq!(fs::size(file.path()), 5);
    assert!(fs::access(file.path(), FileMode::Read));

    let path = file.path().to_path_buf();

    assert!(file.remove());
    assert!(!fs::exists(&path));
}

#[cfg(target_family = "unix")]
#[test]
fn test_hidden_is_dot_prefix() {
    let dir = scratch_dir();

    assert!(fs::hidden(dir.join(".profile")));
    assert!(!fs::hidden(dir.join("profile")));

    let mut file = File::temp_in(&dir);
    assert!(file.open(FileMode::Write));
    assert!(file.close());
    assert!(!file.hidden());
    assert!(file.remove());
}

#[cfg(target_family = "windows")]
#[test]
fn test_hidden_reads_attribute_bit() {
    let mut file = File::temp_in(scratch_dir());

    assert!(file.open(FileMode::Write));
    assert!(file.close());

    // A freshly created file carries no hidden attribute, and the
    // dot-prefix convention means nothing to this backend.
    assert!(!file.hidden());
    assert!(!fs::hidden(file.path()));

    assert!(file.remove());
}

#[cfg(target_family = "unix")]
#[test]
fn test_write_mode_creates_owner_rw() {
    let mut file = File::temp_in(scratch_dir());

    assert!(file.open(FileMode::Write));
    assert!(file.close());

    let mode = std::fs::metadata(file.path()).unwrap().permissions();

    use std::os::unix::fs::PermissionsExt;
    assert_eq!(mode.mode() & 0o777, 0o600);

    assert!(file.remove());
}
