//! Enhancer implementations for denoise.
//!
//! This crate provides concrete implementations of the `Enhancer` trait.
//!
//! # Supported Providers
//!
//! - **Mock**: Pass-through copy, for testing and dry runs
//! - **Gradio**: Any Gradio app exposing the Resemble Enhance signature,
//!   by default the `ResembleAI/resemble-enhance` Hugging Face Space

pub mod factory;
pub mod gradio;

use async_trait::async_trait;
use denoise_abstraction::{EnhanceError, EnhanceOutput, EnhanceParameters, Enhancer};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;
use tracing::debug;

pub use factory::{EnhancerConfig, EnhancerFactory, EnhancerType};
pub use gradio::{GradioOptions, GradioSpaceEnhancer};

/// A mock implementation of the `Enhancer` trait for testing and dry runs.
///
/// Returns a copy of the input as the denoised artifact and no enhanced
/// artifact.
#[derive(Debug)]
pub struct MockEnhancer {
    artifacts: TempDir,
    calls: AtomicU64,
}

impl MockEnhancer {
    /// Creates a new `MockEnhancer` with its own artifact directory.
    ///
    /// # Errors
    /// Returns an `EnhanceError` if the artifact directory cannot be created.
    pub fn new() -> Result<Self, EnhanceError> {
        Ok(Self {
            artifacts: tempfile::Builder::new().prefix("denoise-mock-").tempdir()?,
            calls: AtomicU64::new(0),
        })
    }

    /// Number of `enhance` calls served so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Enhancer for MockEnhancer {
    async fn enhance(
        &self,
        input: &Path,
        parameters: &EnhanceParameters,
    ) -> Result<EnhanceOutput, EnhanceError> {
        parameters.validate()?;
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        debug!(input = %input.display(), parameters = ?parameters, "MockEnhancer enhancing chunk");

        let name = input
            .file_name()
            .ok_or_else(|| EnhanceError::Io(format!("Invalid filename: {}", input.display())))?;
        let dest = self.artifacts.path().join(format!("{}-{}", call, name.to_string_lossy()));
        tokio::fs::copy(input, &dest).await?;

        Ok(EnhanceOutput { denoised: Some(dest), enhanced: None })
    }

    fn endpoint_id(&self) -> &str {
        "mock"
    }
}
