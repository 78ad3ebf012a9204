//! Denoise CLI - batch speech enhancement for directories of `.wav` chunks
//!
//! This CLI provides a `denoise` command that sends every chunk of an input
//! directory through a remote enhancement service and writes the results,
//! or the untouched originals when the service keeps failing, to an output
//! directory.

mod config;
mod progress;

use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// Short usage line printed after argument errors.
const USAGE: &str = "Usage: denoise <input_dir> <output_dir>";

/// Denoise CLI - enhance a directory of audio chunks
///
/// Chunks are processed one at a time in file-name order. Each chunk gets up
/// to three attempts with linear backoff; chunks that never succeed are
/// copied through unchanged so the output always has one file per input.
#[derive(Parser, Debug)]
#[command(
    name = "denoise",
    author,
    version,
    about = "Denoise - batch speech enhancement with copy-through fallback"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Configuration file (replaces ~/.denoise/config.toml and ./.denoiserc)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing the `.wav` chunks to enhance
    input_dir: PathBuf,

    /// Directory receiving one output file per chunk
    output_dir: PathBuf,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprint!("{}", e);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    let denoise_config = config::load_config(args.config.as_deref())?;

    let level = args
        .log_level
        .as_deref()
        .or(denoise_config.log_level.as_deref())
        .map_or(Level::INFO, parse_level);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let report = denoise_core::run(
        &denoise_config,
        &args.input_dir,
        &args.output_dir,
        Some(progress::stderr_reporter()),
    )
    .await?;

    if let Some(summary) = progress::fallback_summary(&report) {
        eprintln!("{}", summary);
    }
    info!(chunks = report.total(), output_dir = %args.output_dir.display(), "Done");

    println!("OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_args_positional() {
        let args = Args::try_parse_from(["denoise", "-l", "debug", "in", "out"]).unwrap();
        assert_eq!(args.input_dir, PathBuf::from("in"));
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_args_arity() {
        assert!(Args::try_parse_from(["denoise"]).is_err());
        assert!(Args::try_parse_from(["denoise", "in"]).is_err());
        assert!(Args::try_parse_from(["denoise", "in", "out", "extra"]).is_err());
    }
}
