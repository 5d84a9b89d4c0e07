#![doc = include_str!("../README.md")]

pub mod fs;

#[cfg(test)]
mod tests {
    use crate::fs::{self, File, FileMode, Whence};

    fn scratch_file() -> File {
        _ = pretty_env_logger::try_init();

        File::temp()
    }

    #[test]
    fn test_open_close() {
        let mut file = scratch_file();

        assert!(!file.is_open());
        assert!(file.open(FileMode::Write));
        assert!(file.is_open());

        assert!(file.close());
        assert!(!file.is_open());
        // Second close reports failure instead of crashing.
        assert!(!file.close());

        assert!(file.remove());
    }

    #[test]
    fn test_read_mode_needs_existing_file() {
        let mut file = scratch_file();

        assert!(!file.open(FileMode::Read));
        assert!(!file.is_open());
    }

    #[test]
    fn test_handle_ops_require_open() {
        let mut file = scratch_file();
        let mut buffer = [0u8; 4];

        assert_eq!(file.seek(0, Whence::Begin), -1);
        assert_eq!(file.tell(), -1);
        assert_eq!(file.read(&mut buffer), -1);
        assert_eq!(file.write(&buffer), -1);
    }

    #[test]
    fn test_missing_path_queries() {
        let file = scratch_file();

        assert!(!fs::exists(file.path()));
        assert_eq!(fs::size(file.path()), -1);
        assert!(!fs::remove(file.path()));
        assert!(fs::times(file.path()).is_none());
        assert!(!file.exists());
    }

    #[test]
    fn test_reopen_closes_previous_handle() {
        let mut file = scratch_file();

        assert!(file.open(FileMode::Write));
        assert_eq!(file.write(b"abc"), 3);

        // Reopening goes through an implicit close of the write handle.
        assert!(file.open(FileMode::Read));
        assert!(file.is_open());

        let mut buffer = [0u8; 3];

        assert_eq!(file.read(&mut buffer), 3);
        assert_eq!(&buffer, b"abc");

        assert!(file.close());
        assert!(file.remove());
    }

    #[test]
    fn test_temp_paths_are_unique() {
        let first = File::temp();
        let second = File::temp();

        assert_ne!(first.path(), second.path());
        assert!(!fs::exists(first.path()));
        assert!(!fs::exists(second.path()));
    }

    #[test]
    fn test_drop_releases_handle() {
        let path = {
            let mut file = scratch_file();

            assert!(file.open(FileMode::Write));
            assert_eq!(file.write(b"x"), 1);

            file.path().to_path_buf()
            // No explicit close; drop releases the handle.
        };

        assert_eq!(fs::size(&path), 1);
        assert!(fs::remove(&path));
    }
}
