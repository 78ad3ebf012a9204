//! Denoise Core - sequential batch enhancement of audio chunks.
//!
//! This crate provides the runner behind the `denoise` binary, including:
//! - Chunk discovery and ordered, one-at-a-time processing
//! - Bounded retry with linear backoff around a remote `Enhancer`
//! - Copy-through fallback so every input chunk gets an output file
//! - Configuration loading and error handling
//!
//! # Example
//!
//! ```rust,no_run
//! use denoise_core::{config::DenoiseConfig, run};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> denoise_core::Result<()> {
//!     let config = DenoiseConfig::load(None)?;
//!     let report = run(&config, Path::new("chunks"), Path::new("denoised"), None).await?;
//!     println!("{} chunks, {} copied through", report.total(), report.fallback_count());
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod run;

pub use batch::{
    AttemptFailure, BatchError, BatchReport, BatchRunner, ChunkEvent, ChunkOutcome, ChunkReport,
    ProgressCallback, RetryPolicy,
};
pub use config::{ConfigError, DenoiseConfig};
pub use denoise_abstraction::{EnhanceError, EnhanceOutput, EnhanceParameters, Enhancer, Solver};
pub use error::{DenoiseError, Result};
pub use run::run;
