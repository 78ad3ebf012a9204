//! CLI configuration loading and merging.

use anyhow::Context;
use denoise_core::DenoiseConfig;
use std::path::Path;

/// Load and merge configuration.
///
/// Configuration precedence:
/// 1. Environment variables (`DENOISE_*`, `HF_TOKEN`)
/// 2. Explicit `--config` file, or else:
/// 3. Local config file (./.denoiserc)
/// 4. Global config file (~/.denoise/config.toml)
/// 5. Defaults
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<DenoiseConfig> {
    DenoiseConfig::load(explicit).context("Failed to load configuration")
}
