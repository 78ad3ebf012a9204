//! Error types for batch processing.

use denoise_abstraction::EnhanceError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a batch run.
///
/// Remote failures never show up here; they end in a fallback copy.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The input directory is missing or not a directory.
    #[error("Input directory not found: {}", .0.display())]
    InputDirNotFound(PathBuf),

    /// A local filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path the operation was working on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The output directory is the input directory, possibly through
    /// another path. Fallback copies would overwrite the originals.
    #[error("Output directory is the input directory: {}", .0.display())]
    SameDirectory(PathBuf),
}

impl BatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Why a single enhancement attempt did not produce a usable artifact.
///
/// Every variant is retried until the chunk's attempt budget is spent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The enhancement call itself failed.
    #[error(transparent)]
    Remote(#[from] EnhanceError),

    /// The call succeeded but returned no denoised artifact.
    #[error("service returned no denoised artifact")]
    MissingArtifact,

    /// The returned artifact is missing on disk or has no content.
    #[error("denoised artifact is empty or unreadable: {}", .0.display())]
    EmptyArtifact(PathBuf),
}
