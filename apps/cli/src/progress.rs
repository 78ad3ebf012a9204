//! Human-readable progress on stderr.

use colored::Colorize;
use denoise_core::{BatchReport, ChunkEvent, ProgressCallback};
use std::sync::Arc;

/// Progress line for an event, if it gets one.
///
/// Only chunk starts are printed; attempt failures and fallbacks are
/// reported through tracing.
pub fn format_event(event: &ChunkEvent) -> Option<String> {
    match event {
        ChunkEvent::Started { position, total, name } => {
            Some(format!("[{}/{}] {}", position, total, name))
        }
        ChunkEvent::AttemptFailed { .. } | ChunkEvent::Finished { .. } => None,
    }
}

/// Callback printing `[i/total] name` to stderr as each chunk starts.
pub fn stderr_reporter() -> ProgressCallback {
    Arc::new(|event: &ChunkEvent| {
        if let Some(line) = format_event(event) {
            eprintln!("{}", line);
        }
    })
}

/// Warning line when some chunks were copied through unchanged.
pub fn fallback_summary(report: &BatchReport) -> Option<String> {
    let fallback = report.fallback_count();
    if fallback == 0 {
        return None;
    }
    let message = format!("{} of {} chunks copied through unchanged", fallback, report.total());
    Some(message.yellow().to_string())
}
