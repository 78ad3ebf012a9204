//! Error types for the denoise runner.

use crate::batch::BatchError;
use crate::config::ConfigError;
use denoise_abstraction::EnhanceError;
use thiserror::Error;

/// Top-level error type for a denoise run.
#[derive(Error, Debug)]
pub enum DenoiseError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Batch errors
    #[error("{0}")]
    Batch(#[from] BatchError),

    /// Enhancer construction errors
    #[error("Enhancer error: {0}")]
    Enhance(#[from] EnhanceError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for denoise operations.
pub type Result<T> = std::result::Result<T, DenoiseError>;
