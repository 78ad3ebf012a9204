//! Configuration module for the denoise runner.

pub mod cli_config;

pub use cli_config::{ConfigError, ConfigResult, DenoiseConfig};
