//! Batch processing module: sequential enhancement of a directory of chunks.

pub mod error;
pub mod input;
pub mod output;
pub mod processor;
pub mod types;

pub use error::{AttemptFailure, BatchError};
pub use input::discover_chunks;
pub use output::copy_preserving_times;
pub use processor::BatchRunner;
pub use types::{
    BatchReport, CHUNK_EXTENSION, ChunkEvent, ChunkOutcome, ChunkRef, ChunkReport,
    DEFAULT_BASE_DELAY, MAX_ATTEMPTS, ProgressCallback, RetryPolicy,
};
