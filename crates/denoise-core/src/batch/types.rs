//! Data types for batch processing.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of enhancement calls per chunk.
pub const MAX_ATTEMPTS: u32 = 3;

/// Base unit of the linear backoff between attempts.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

/// Extension (without the dot) of the files treated as chunks.
pub const CHUNK_EXTENSION: &str = "wav";

/// Retry policy for remote enhancement calls.
///
/// Backoff is linear: after failed attempt `n` the runner waits
/// `n * base_delay`. Nothing is waited after the final attempt, and every
/// chunk starts with a fresh budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts per chunk, at least 1.
    pub max_attempts: u32,
    /// Delay unit multiplied by the attempt number.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: MAX_ATTEMPTS, base_delay: DEFAULT_BASE_DELAY }
    }
}

impl RetryPolicy {
    /// Create a new retry policy.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_delay }
    }

    /// Default attempt budget with a custom delay unit.
    pub fn with_base_delay(base_delay: Duration) -> Self {
        Self::new(MAX_ATTEMPTS, base_delay)
    }

    /// Delay to wait after failed attempt `attempt` (1-based).
    ///
    /// Returns `None` once the budget is spent.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            None
        } else {
            Some(self.base_delay.saturating_mul(attempt))
        }
    }
}

/// A chunk found in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRef {
    /// File name as found on disk, reused verbatim for the output file.
    pub file_name: OsString,
    /// Display form of `file_name`, used in logs, events and reports.
    pub name: String,
    /// Full path of the input file.
    pub path: PathBuf,
}

impl ChunkRef {
    /// Create a chunk reference for `file_name` inside `dir`.
    pub fn new(dir: &std::path::Path, file_name: OsString) -> Self {
        Self {
            name: file_name.to_string_lossy().into_owned(),
            path: dir.join(&file_name),
            file_name,
        }
    }
}

/// Terminal state of a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The enhanced artifact was written to the output directory.
    Enhanced {
        /// Attempt that produced the artifact (1-based).
        attempt: u32,
    },
    /// The original input was copied through unchanged.
    FallbackOriginal {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Last failure seen.
        reason: String,
    },
}

impl ChunkOutcome {
    /// Whether the chunk ended with enhanced content.
    pub fn is_enhanced(&self) -> bool {
        matches!(self, Self::Enhanced { .. })
    }
}

/// What happened to one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReport {
    /// Chunk file name.
    pub name: String,
    /// File written in the output directory.
    pub output: PathBuf,
    /// Terminal state.
    pub outcome: ChunkOutcome,
}

/// Result of a batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// One report per chunk, in processing order.
    pub chunks: Vec<ChunkReport>,
    /// Wall-clock duration of the run.
    pub total_duration: Duration,
}

impl BatchReport {
    /// Create a new batch report.
    pub fn new(chunks: Vec<ChunkReport>, total_duration: Duration) -> Self {
        Self { chunks, total_duration }
    }

    /// Number of chunks processed.
    pub fn total(&self) -> usize {
        self.chunks.len()
    }

    /// Number of chunks written with enhanced content.
    pub fn enhanced_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.outcome.is_enhanced()).count()
    }

    /// Number of chunks copied through unchanged.
    pub fn fallback_count(&self) -> usize {
        self.total() - self.enhanced_count()
    }

    /// Check if every chunk was enhanced.
    pub fn is_complete_success(&self) -> bool {
        self.fallback_count() == 0
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkEvent {
    /// A chunk is about to be processed.
    Started {
        /// 1-based position in the batch.
        position: usize,
        /// Number of chunks in the batch.
        total: usize,
        /// Chunk file name.
        name: String,
    },
    /// One enhancement attempt failed.
    AttemptFailed {
        /// Chunk file name.
        name: String,
        /// Failed attempt (1-based).
        attempt: u32,
        /// Attempt budget.
        max_attempts: u32,
        /// Failure description.
        reason: String,
    },
    /// A chunk reached its terminal state.
    Finished {
        /// 1-based position in the batch.
        position: usize,
        /// Number of chunks in the batch.
        total: usize,
        /// Chunk file name.
        name: String,
        /// Terminal state.
        outcome: ChunkOutcome,
    },
}

/// Progress callback function type.
pub type ProgressCallback = Arc<dyn Fn(&ChunkEvent) + Send + Sync>;
