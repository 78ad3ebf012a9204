//! Chunk discovery.

use crate::batch::error::BatchError;
use crate::batch::types::ChunkRef;
use std::path::Path;

/// List the chunks directly under `input_dir`.
///
/// Only regular files (or symlinks to them) whose name ends with
/// `.{extension}` are kept; the match is case-sensitive and done on the raw
/// name, so names that are not valid UTF-8 are kept too. Subdirectories are
/// not descended into. The result is sorted by file name.
///
/// # Errors
/// `BatchError::InputDirNotFound` if `input_dir` is not a directory,
/// `BatchError::Io` if it cannot be read.
pub fn discover_chunks(input_dir: &Path, extension: &str) -> Result<Vec<ChunkRef>, BatchError> {
    if !input_dir.is_dir() {
        return Err(BatchError::InputDirNotFound(input_dir.to_path_buf()));
    }

    let suffix = format!(".{}", extension);
    let mut chunks = Vec::new();

    for entry in std::fs::read_dir(input_dir).map_err(|e| BatchError::io(input_dir, e))? {
        let entry = entry.map_err(|e| BatchError::io(input_dir, e))?;
        let file_name = entry.file_name();

        if !file_name.as_encoded_bytes().ends_with(suffix.as_bytes()) || !entry.path().is_file() {
            continue;
        }

        chunks.push(ChunkRef::new(input_dir, file_name));
    }

    chunks.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(chunks)
}
