//! Enhancement abstraction layer for denoise.
//!
//! This module defines the core trait and types for talking to a remote
//! speech-enhancement service. The batch runner only ever sees an
//! [`Enhancer`], so a real network client and a test double are
//! interchangeable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Inclusive bounds for the number of function evaluations.
pub const NFE_RANGE: std::ops::RangeInclusive<u32> = 1..=128;

/// Inclusive bounds for the prior temperature.
pub const TAU_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.0;

/// Represents an error that can occur when calling an enhancement service.
///
/// Every variant is treated as retryable by the batch runner.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnhanceError {
    /// An error occurred while sending the request (e.g., DNS, connect, timeout).
    #[error("Request Error: {0}")]
    RequestError(String),

    /// The service answered with a non-success status.
    #[error("Response Error ({status}): {message}")]
    ResponseError {
        /// HTTP status code returned by the service.
        status: u16,
        /// Body or reason attached to the failure.
        message: String,
    },

    /// The service accepted the job but reported a failure while running it.
    #[error("Remote Error: {0}")]
    RemoteError(String),

    /// The service answered, but the payload could not be understood.
    #[error("Serialization Error: {0}")]
    SerializationError(String),

    /// The request parameters are outside the ranges the service accepts.
    #[error("Invalid Parameters: {0}")]
    InvalidParameters(String),

    /// Reading the input or writing a downloaded artifact failed.
    #[error("I/O Error: {0}")]
    Io(String),

    /// Other unexpected errors.
    #[error("Other Enhance Error: {0}")]
    Other(String),
}

impl From<std::io::Error> for EnhanceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// ODE solver used by the enhancement model's latent flow matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Solver {
    /// Midpoint method (the service default).
    #[default]
    Midpoint,
    /// Classic fourth-order Runge-Kutta.
    #[serde(rename = "RK4")]
    Rk4,
    /// Forward Euler.
    Euler,
}

impl Solver {
    /// Returns the label the remote endpoint expects.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Midpoint => "Midpoint",
            Self::Rk4 => "RK4",
            Self::Euler => "Euler",
        }
    }
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters sent alongside every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnhanceParameters {
    /// ODE solver mode.
    pub solver: Solver,

    /// Number of function evaluations, between 1 and 128.
    pub nfe: u32,

    /// Prior temperature, between 0 and 1.
    /// Lower values keep more of the original signal.
    pub tau: f32,

    /// Run the denoiser before enhancement.
    pub denoise: bool,
}

impl Default for EnhanceParameters {
    fn default() -> Self {
        Self { solver: Solver::Midpoint, nfe: 64, tau: 0.5, denoise: true }
    }
}

impl EnhanceParameters {
    /// Checks that the numeric parameters are inside the accepted ranges.
    ///
    /// # Errors
    /// Returns `EnhanceError::InvalidParameters` naming the offending field.
    pub fn validate(&self) -> Result<(), EnhanceError> {
        if !NFE_RANGE.contains(&self.nfe) {
            return Err(EnhanceError::InvalidParameters(format!(
                "nfe must be between {} and {}, got {}",
                NFE_RANGE.start(),
                NFE_RANGE.end(),
                self.nfe
            )));
        }
        if !TAU_RANGE.contains(&self.tau) {
            return Err(EnhanceError::InvalidParameters(format!(
                "tau must be between {} and {}, got {}",
                TAU_RANGE.start(),
                TAU_RANGE.end(),
                self.tau
            )));
        }
        Ok(())
    }
}

/// Artifacts produced by a single enhancement call.
///
/// The service answers with two files. Only `denoised` feeds the batch
/// output; `enhanced` is kept so callers can see it was returned and chose
/// not to use it. Both files belong to the caller, which may move or delete
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceOutput {
    /// Local path of the denoised audio, if the service produced one.
    pub denoised: Option<PathBuf>,

    /// Local path of the denoised-and-enhanced audio, if produced.
    pub enhanced: Option<PathBuf>,
}

/// A trait for remote speech-enhancement services.
///
/// Implementations are constructed once per run and shared, so they must be
/// `Send + Sync`.
#[async_trait]
pub trait Enhancer: Send + Sync {
    /// Enhances one audio file.
    ///
    /// # Arguments
    /// * `input` - Path of the audio chunk to upload
    /// * `parameters` - Solver settings for this call
    ///
    /// # Errors
    /// Returns an `EnhanceError` if the call fails for any reason.
    async fn enhance(
        &self,
        input: &Path,
        parameters: &EnhanceParameters,
    ) -> Result<EnhanceOutput, EnhanceError>;

    /// Returns an identifier for the backing service (space id, URL, "mock").
    fn endpoint_id(&self) -> &str;
}
