//! Sequential batch runner with bounded retry and copy-through fallback.

use crate::batch::error::{AttemptFailure, BatchError};
use crate::batch::input::discover_chunks;
use crate::batch::output::{copy_preserving_times, ensure_output_dir, is_same_location};
use crate::batch::types::{
    BatchReport, CHUNK_EXTENSION, ChunkEvent, ChunkOutcome, ChunkRef, ChunkReport,
    ProgressCallback, RetryPolicy,
};
use denoise_abstraction::{EnhanceParameters, Enhancer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of spending a chunk's attempt budget.
enum Attempted {
    Artifact { path: PathBuf, attempt: u32 },
    Exhausted { attempts: u32, last_failure: AttemptFailure },
}

/// Drives every chunk of an input directory through an `Enhancer`.
///
/// Chunks are handled one at a time in file-name order. Each chunk gets up
/// to `retry_policy.max_attempts` calls; when none of them yields a usable
/// artifact the original file is copied instead, so the output directory
/// always ends up with one file per input chunk.
///
/// Artifacts returned by the enhancer are removed once they have been
/// copied or rejected.
pub struct BatchRunner {
    /// Long-lived enhancement client shared by all chunks.
    enhancer: Arc<dyn Enhancer>,
    /// Parameters sent with every call.
    parameters: EnhanceParameters,
    /// Retry policy.
    retry_policy: RetryPolicy,
    /// Chunk file extension.
    extension: String,
    /// Optional progress observer.
    progress_callback: Option<ProgressCallback>,
}

impl BatchRunner {
    /// Create a new batch runner.
    ///
    /// # Arguments
    /// * `enhancer` - Client used for every chunk
    /// * `retry_policy` - Attempt budget and backoff
    pub fn new(enhancer: Arc<dyn Enhancer>, retry_policy: RetryPolicy) -> Self {
        Self {
            enhancer,
            parameters: EnhanceParameters::default(),
            retry_policy,
            extension: CHUNK_EXTENSION.to_string(),
            progress_callback: None,
        }
    }

    /// Register a progress observer.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The retry policy in use.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Process every chunk in `input_dir`, writing results to `output_dir`.
    ///
    /// Both directories are checked before the output directory is created,
    /// so a bad input path, or an output path that resolves to the input
    /// directory, leaves the filesystem untouched.
    ///
    /// # Errors
    /// Returns a `BatchError` only for local problems: a missing input
    /// directory, an output directory that is the input directory, or a
    /// failed filesystem operation. Remote failures are absorbed by the
    /// fallback.
    pub async fn run(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<BatchReport, BatchError> {
        let start_time = Instant::now();

        let chunks = discover_chunks(input_dir, &self.extension)?;
        if is_same_location(input_dir, output_dir) {
            return Err(BatchError::SameDirectory(output_dir.to_path_buf()));
        }
        ensure_output_dir(output_dir)?;

        let total = chunks.len();
        info!(
            total_chunks = total,
            endpoint = %self.enhancer.endpoint_id(),
            input_dir = %input_dir.display(),
            output_dir = %output_dir.display(),
            "Starting batch"
        );

        let mut reports = Vec::with_capacity(total);
        for (index, chunk) in chunks.iter().enumerate() {
            let position = index + 1;
            self.emit(&ChunkEvent::Started { position, total, name: chunk.name.clone() });

            let report = self.process_chunk(chunk, output_dir).await?;

            self.emit(&ChunkEvent::Finished {
                position,
                total,
                name: chunk.name.clone(),
                outcome: report.outcome.clone(),
            });
            reports.push(report);
        }

        let report = BatchReport::new(reports, start_time.elapsed());
        info!(
            total_chunks = report.total(),
            enhanced = report.enhanced_count(),
            fallback = report.fallback_count(),
            duration_ms = report.total_duration.as_millis() as u64,
            "Batch completed"
        );

        Ok(report)
    }

    async fn process_chunk(
        &self,
        chunk: &ChunkRef,
        output_dir: &Path,
    ) -> Result<ChunkReport, BatchError> {
        let dest = output_dir.join(&chunk.file_name);

        let outcome = match self.enhance_with_retry(chunk).await {
            Attempted::Artifact { path, attempt } => {
                let copied = copy_preserving_times(&path, &dest);
                discard_artifact(&path).await;
                match copied {
                    Ok(bytes) => {
                        debug!(chunk = %chunk.name, attempt, bytes, "Wrote enhanced chunk");
                        ChunkOutcome::Enhanced { attempt }
                    }
                    Err(e) => {
                        let reason = format!("writing artifact failed: {}", e);
                        self.fall_back(chunk, &dest, attempt, reason)?
                    }
                }
            }
            Attempted::Exhausted { attempts, last_failure } => {
                self.fall_back(chunk, &dest, attempts, last_failure.to_string())?
            }
        };

        Ok(ChunkReport { name: chunk.name.clone(), output: dest, outcome })
    }

    fn fall_back(
        &self,
        chunk: &ChunkRef,
        dest: &Path,
        attempts: u32,
        reason: String,
    ) -> Result<ChunkOutcome, BatchError> {
        warn!(
            chunk = %chunk.name,
            attempts,
            reason = %reason,
            "Enhancement unavailable, copying original"
        );
        copy_preserving_times(&chunk.path, dest)?;
        Ok(ChunkOutcome::FallbackOriginal { attempts, reason })
    }

    async fn enhance_with_retry(&self, chunk: &ChunkRef) -> Attempted {
        let mut attempt = 1;

        loop {
            let failure = match self.attempt(&chunk.path).await {
                Ok(path) => return Attempted::Artifact { path, attempt },
                Err(failure) => failure,
            };

            warn!(
                chunk = %chunk.name,
                attempt,
                max_attempts = self.retry_policy.max_attempts,
                error = %failure,
                "Enhancement attempt failed"
            );
            self.emit(&ChunkEvent::AttemptFailed {
                name: chunk.name.clone(),
                attempt,
                max_attempts: self.retry_policy.max_attempts,
                reason: failure.to_string(),
            });

            let Some(delay) = self.retry_policy.delay_after(attempt) else {
                return Attempted::Exhausted { attempts: attempt, last_failure: failure };
            };
            debug!(
                chunk = %chunk.name,
                next_attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "Retrying after backoff"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// One full enhancement call. Re-issued from scratch on every retry.
    async fn attempt(&self, input: &Path) -> Result<PathBuf, AttemptFailure> {
        let output = self.enhancer.enhance(input, &self.parameters).await?;

        // `output.enhanced` is not part of the batch output.
        if let Some(enhanced) = &output.enhanced {
            discard_artifact(enhanced).await;
        }

        let artifact = output.denoised.ok_or(AttemptFailure::MissingArtifact)?;
        match tokio::fs::metadata(&artifact).await {
            Ok(metadata) if metadata.is_file() && metadata.len() > 0 => Ok(artifact),
            _ => {
                discard_artifact(&artifact).await;
                Err(AttemptFailure::EmptyArtifact(artifact))
            }
        }
    }

    fn emit(&self, event: &ChunkEvent) {
        if let Some(callback) = &self.progress_callback {
            callback(event);
        }
    }
}

async fn discard_artifact(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!(path = %path.display(), error = %e, "Could not remove artifact");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use denoise_models::MockEnhancer;
    use std::sync::Mutex;
    use std::time::Duration;

    fn runner(enhancer: Arc<dyn Enhancer>) -> BatchRunner {
        BatchRunner::new(enhancer, RetryPolicy::with_base_delay(Duration::ZERO))
    }

    #[tokio::test]
    async fn test_run_with_mock_enhancer() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("b.wav"), b"bbb").unwrap();
        std::fs::write(input.path().join("a.wav"), b"aaa").unwrap();
        std::fs::write(input.path().join("skip.txt"), b"x").unwrap();

        let enhancer = Arc::new(MockEnhancer::new().unwrap());
        let report = runner(enhancer.clone()).run(input.path(), output.path()).await.unwrap();

        assert_eq!(report.total(), 2);
        assert!(report.is_complete_success());
        assert_eq!(report.chunks[0].name, "a.wav");
        assert_eq!(report.chunks[0].outcome, ChunkOutcome::Enhanced { attempt: 1 });
        assert_eq!(std::fs::read(output.path().join("b.wav")).unwrap(), b"bbb");
        assert!(!output.path().join("skip.txt").exists());
        assert_eq!(enhancer.call_count(), 2);
    }

    #[tokio::test]
    async fn test_run_empty_input_creates_output_dir() {
        let input = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let output = root.path().join("out").join("nested");

        let report = runner(Arc::new(MockEnhancer::new().unwrap()))
            .run(input.path(), &output)
            .await
            .unwrap();

        assert_eq!(report.total(), 0);
        assert!(output.is_dir());
    }

    #[tokio::test]
    async fn test_run_missing_input_leaves_output_untouched() {
        let root = tempfile::tempdir().unwrap();
        let output = root.path().join("out");

        let result = runner(Arc::new(MockEnhancer::new().unwrap()))
            .run(&root.path().join("missing"), &output)
            .await;

        assert!(matches!(result, Err(BatchError::InputDirNotFound(_))));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_output_dir_equal_to_input_dir_is_refused() {
        let input = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("a.wav"), b"original pcm").unwrap();
        let enhancer = Arc::new(MockEnhancer::new().unwrap());

        for output in [input.path().to_path_buf(), input.path().join(".")] {
            let result = runner(enhancer.clone()).run(input.path(), &output).await;
            assert!(matches!(result, Err(BatchError::SameDirectory(_))));
        }

        assert_eq!(std::fs::read(input.path().join("a.wav")).unwrap(), b"original pcm");
        assert_eq!(enhancer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_progress_events_in_order() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("a.wav"), b"a").unwrap();
        std::fs::write(input.path().join("b.wav"), b"b").unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let callback: ProgressCallback = Arc::new(move |event: &ChunkEvent| {
            sink.lock().unwrap().push(event.clone());
        });

        runner(Arc::new(MockEnhancer::new().unwrap()))
            .with_progress_callback(callback)
            .run(input.path(), output.path())
            .await
            .unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            ChunkEvent::Started { position: 1, total: 2, name: "a.wav".to_string() }
        );
        assert!(matches!(
            &events[3],
            ChunkEvent::Finished { position: 2, name, .. } if name == "b.wav"
        ));
    }

    #[test]
    fn test_retry_policy_accessor() {
        let runner = runner(Arc::new(MockEnhancer::new().unwrap()));
        assert_eq!(runner.retry_policy().max_attempts, 3);
        assert_eq!(runner.retry_policy().base_delay, Duration::ZERO);
    }
}
