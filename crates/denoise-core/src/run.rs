//! One-call entry point used by the CLI.

use crate::batch::{BatchReport, BatchRunner, ProgressCallback};
use crate::config::DenoiseConfig;
use crate::error::Result;
use denoise_models::EnhancerFactory;
use std::path::Path;
use tracing::debug;

/// Build the configured enhancer and process every chunk of `input_dir`.
///
/// One enhancer is created per run and reused for all chunks.
///
/// # Errors
/// Fails on invalid configuration, when the enhancer cannot be built, or on
/// any fatal `BatchError`.
pub async fn run(
    config: &DenoiseConfig,
    input_dir: &Path,
    output_dir: &Path,
    progress: Option<ProgressCallback>,
) -> Result<BatchReport> {
    let enhancer = EnhancerFactory::create(config.enhancer_config()?)?;
    let retry_policy = config.retry_policy();
    debug!(
        endpoint = %enhancer.endpoint_id(),
        max_attempts = retry_policy.max_attempts,
        base_delay_ms = retry_policy.base_delay.as_millis() as u64,
        "Enhancer ready"
    );

    let mut runner = BatchRunner::new(enhancer, retry_policy);
    if let Some(callback) = progress {
        runner = runner.with_progress_callback(callback);
    }

    Ok(runner.run(input_dir, output_dir).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DenoiseError;

    fn mock_config() -> DenoiseConfig {
        DenoiseConfig {
            provider: Some("mock".to_string()),
            retry_base_delay_ms: Some(0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_run_with_mock_provider() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("chunk_000.wav"), b"pcm").unwrap();

        let report = run(&mock_config(), input.path(), output.path(), None).await.unwrap();
        assert_eq!(report.enhanced_count(), 1);
        assert_eq!(std::fs::read(output.path().join("chunk_000.wav")).unwrap(), b"pcm");
    }

    #[tokio::test]
    async fn test_run_unknown_provider() {
        let dir = tempfile::tempdir().unwrap();
        let config = DenoiseConfig { provider: Some("sox".to_string()), ..Default::default() };
        let result = run(&config, dir.path(), &dir.path().join("out"), None).await;
        assert!(matches!(result, Err(DenoiseError::Config(_))));
    }
}
