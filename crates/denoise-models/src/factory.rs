//! Enhancer factory for creating enhancer instances from configuration.
//!
//! The CLI builds one enhancer per run through this module and hands it to
//! the batch runner as an `Arc<dyn Enhancer>`.

use crate::gradio::{DEFAULT_SPACE, GradioOptions, GradioSpaceEnhancer};
use crate::MockEnhancer;
use denoise_abstraction::{EnhanceError, Enhancer};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Enhancer type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhancerType {
    /// Pass-through enhancer for testing and dry runs.
    Mock,
    /// Gradio Space over HTTP.
    Gradio,
}

impl FromStr for EnhancerType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" | "passthrough" => Ok(Self::Mock),
            "gradio" | "space" | "huggingface" | "hf" => Ok(Self::Gradio),
            _ => Err(()),
        }
    }
}

/// Enhancer configuration.
#[derive(Debug, Clone)]
pub struct EnhancerConfig {
    /// The type of enhancer to create.
    pub enhancer_type: EnhancerType,
    /// Space id (`owner/name`) or app URL.
    pub space: String,
    /// Optional Hub URL used to resolve Space ids.
    pub hub_url: Option<String>,
    /// Optional Hugging Face token.
    pub hf_token: Option<String>,
    /// Optional per-request timeout.
    pub request_timeout: Option<Duration>,
}

impl EnhancerConfig {
    /// Creates a new `EnhancerConfig` for the given type and Space.
    #[must_use]
    pub fn new(enhancer_type: EnhancerType, space: String) -> Self {
        Self { enhancer_type, space, hub_url: None, hf_token: None, request_timeout: None }
    }

    /// Sets the Hugging Face token.
    #[must_use]
    pub fn with_hf_token(mut self, hf_token: String) -> Self {
        self.hf_token = Some(hf_token);
        self
    }

    /// Sets the Hub URL used to resolve Space ids.
    #[must_use]
    pub fn with_hub_url(mut self, hub_url: String) -> Self {
        self.hub_url = Some(hub_url);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self::new(EnhancerType::Gradio, DEFAULT_SPACE.to_string())
    }
}

/// Factory for creating enhancer instances.
pub struct EnhancerFactory;

impl EnhancerFactory {
    /// Creates an enhancer from the given configuration.
    ///
    /// # Errors
    /// Returns an `EnhanceError` if the enhancer cannot be constructed.
    pub fn create(config: EnhancerConfig) -> Result<Arc<dyn Enhancer>, EnhanceError> {
        debug!(
            enhancer_type = ?config.enhancer_type,
            space = %config.space,
            "Creating enhancer instance"
        );

        match config.enhancer_type {
            EnhancerType::Mock => Ok(Arc::new(MockEnhancer::new()?)),
            EnhancerType::Gradio => {
                let mut options =
                    GradioOptions { hf_token: config.hf_token, ..GradioOptions::default() };
                if let Some(hub_url) = config.hub_url {
                    options.hub_url = hub_url;
                }
                if let Some(timeout) = config.request_timeout {
                    options.request_timeout = timeout;
                }
                Ok(Arc::new(GradioSpaceEnhancer::with_options(config.space, options)?))
            }
        }
    }
}
