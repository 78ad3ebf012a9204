//! Writing chunks to the output directory.

use crate::batch::error::BatchError;
use filetime::FileTime;
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

/// Create the output directory and any missing parents.
pub fn ensure_output_dir(output_dir: &Path) -> Result<(), BatchError> {
    fs::create_dir_all(output_dir).map_err(|e| BatchError::io(output_dir, e))
}

/// Whether two paths name the same existing file or directory.
pub fn is_same_location(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy `src` to `dst`, replacing `dst`, and carry over access and
/// modification times.
///
/// Timestamps are best effort: a filesystem that refuses them only produces
/// a warning. Copying a file onto itself is refused, since it would
/// truncate the source.
///
/// # Returns
/// Number of bytes copied.
pub fn copy_preserving_times(src: &Path, dst: &Path) -> Result<u64, BatchError> {
    let metadata = fs::metadata(src).map_err(|e| BatchError::io(src, e))?;
    if is_same_location(src, dst) {
        return Err(BatchError::io(
            dst,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "source and destination are the same file",
            ),
        ));
    }
    let bytes = fs::copy(src, dst).map_err(|e| BatchError::io(dst, e))?;

    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    if let Err(e) = filetime::set_file_times(dst, atime, mtime) {
        warn!(path = %dst.display(), error = %e, "Could not preserve timestamps");
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_preserves_content_and_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.wav");
        let dst = dir.path().join("dst.wav");
        fs::write(&src, b"pcm").unwrap();

        let past = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_times(&src, past, past).unwrap();

        let bytes = copy_preserving_times(&src, &dst).unwrap();
        assert_eq!(bytes, 3);
        assert_eq!(fs::read(&dst).unwrap(), b"pcm");

        let copied = fs::metadata(&dst).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&copied), past);
    }

    #[test]
    fn test_copy_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.wav");
        let dst = dir.path().join("dst.wav");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old content").unwrap();

        copy_preserving_times(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"new");
    }

    #[test]
    fn test_copy_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.wav");
        let result = copy_preserving_times(&missing, &dir.path().join("out.wav"));
        assert!(matches!(result, Err(BatchError::Io { .. })));
    }

    #[test]
    fn test_copy_onto_itself_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.wav");
        fs::write(&src, b"original pcm").unwrap();

        let same = dir.path().join(".").join("a.wav");
        let result = copy_preserving_times(&src, &same);

        assert!(matches!(result, Err(BatchError::Io { .. })));
        assert_eq!(fs::read(&src).unwrap(), b"original pcm");
    }

    #[test]
    fn test_is_same_location() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();

        assert!(is_same_location(dir.path(), &nested.join("..")));
        assert!(!is_same_location(dir.path(), &nested));
        assert!(!is_same_location(dir.path(), &dir.path().join("missing")));
    }

    #[test]
    fn test_ensure_output_dir_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        ensure_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_output_dir(&nested).unwrap();
    }
}
