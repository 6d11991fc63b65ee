//! Beatcut command-line runner.
//!
//! Reads a music analysis and a video analysis (JSON), matches them against a
//! segment configuration and writes the full matching result.
//!
//! ```bash
//! beatcut music.json video.json --segments segments.toml --output result.json
//! ```

mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use beatcut_engine::{load_segment_config, MatchingConfig, MatchingEngine, MatchingError};
use beatcut_models::{
    parse_timecode, MatchingResult, MusicAnalysis, OptimizationMethod, VideoAnalysis,
};

/// Match music edit points to video shots under three editorial strategies
#[derive(Parser, Debug)]
#[command(name = "beatcut", version)]
struct Args {
    /// Music analysis JSON
    music: PathBuf,

    /// Video analysis JSON
    video: PathBuf,

    /// Segment configuration (TOML, JSON or YAML)
    #[arg(short, long, env = "BEATCUT_SEGMENTS", value_name = "FILE")]
    segments: PathBuf,

    /// Write the matching result here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write only the explain payload of the recommended pattern
    #[arg(long, value_name = "FILE")]
    explain: Option<PathBuf>,

    /// Override the track duration, e.g. `00:00:45.000` or `45.5`
    #[arg(long, value_name = "TIMECODE")]
    duration: Option<String>,

    /// Snap cut times in the printed summary to this frame rate
    #[arg(long)]
    fps: Option<f64>,

    /// Optimization method: `dp` or `greedy`
    #[arg(long)]
    optimization: Option<OptimizationMethod>,

    /// Abort the run after this many milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Generate strategies one after another instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Run matching on the async runtime's blocking pool
    #[arg(long = "async")]
    run_async: bool,

    /// Print the JSON schema of the matching result and exit
    #[arg(long, exclusive = true)]
    schema: bool,

    /// Suppress the human-readable summary
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    if args.schema {
        let schema = schemars::schema_for!(MatchingResult);
        return match serde_json::to_string_pretty(&schema) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to render schema: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<MatchingError>() {
            Some(matching) if matching.is_config_error() => {
                match matching.config_key() {
                    Some(key) => error!(key = %key, "Configuration error: {}", matching),
                    None => error!("Configuration error: {}", matching),
                }
                ExitCode::from(2)
            }
            _ => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

/// Colored output for terminals, JSON when `LOG_FORMAT=json`.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("beatcut=info,warn"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = matching_config(&args);
    info!("Matching config: {:?}", config);

    let segment_config = load_segment_config(&args.segments)?;
    let engine = MatchingEngine::new(config).with_segments(segment_config)?;

    let mut music: MusicAnalysis = read_json(&args.music)?;
    let video: VideoAnalysis = read_json(&args.video)?;

    if let Some(tc) = &args.duration {
        let duration =
            parse_timecode(tc).with_context(|| format!("Invalid --duration '{}'", tc))?;
        info!(from = music.duration, to = duration, "Overriding track duration");
        music.duration = duration;
    }

    let result = if args.run_async {
        Arc::new(engine)
            .match_async(Arc::new(music), Arc::new(video))
            .await?
    } else {
        engine.match_analysis(&music, &video)?
    };

    let result = stamp(result);

    if !args.quiet {
        eprint!("{}", report::render_summary(&result, args.fps));
    }
    if !result.meets_confidence_gate() {
        warn!(
            aggregate_confidence = result.explain_data.aggregate_confidence,
            "Recommended pattern is below the QA confidence gate"
        );
    }

    if let Some(path) = &args.explain {
        write_json(path, &result.explain_data)?;
        info!(path = %path.display(), "Wrote explain data");
    }

    match &args.output {
        Some(path) => {
            write_json(path, &result)?;
            info!(path = %path.display(), "Wrote matching result");
        }
        None => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}

/// Environment defaults overridden by command-line flags.
fn matching_config(args: &Args) -> MatchingConfig {
    let mut config = MatchingConfig::from_env();
    if let Some(method) = args.optimization {
        config = config.with_optimization_method(method);
    }
    if let Some(ms) = args.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    if args.sequential {
        config = config.with_parallel_strategies(false);
    }
    config
}

/// Attach the generation timestamp to the explain payload.
fn stamp(mut result: MatchingResult) -> MatchingResult {
    result.explain_data = result
        .explain_data
        .with_generated_at(chrono::Utc::now().to_rfc3339());
    result
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "beatcut",
            "music.json",
            "video.json",
            "--segments",
            "segments.toml",
            "--optimization",
            "greedy",
            "--timeout-ms",
            "250",
            "--sequential",
        ]);
        let config = matching_config(&args);

        assert_eq!(config.optimization_method, OptimizationMethod::Greedy);
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));
        assert!(!config.parallel_strategies);
    }

    #[test]
    fn test_read_json_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = read_json::<MusicAnalysis>(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[tokio::test]
    async fn test_missing_segments_file_is_config_error() {
        let args = Args::parse_from([
            "beatcut",
            "music.json",
            "video.json",
            "--segments",
            "/nonexistent/segments.toml",
        ]);
        let err = run(args).await.unwrap_err();
        let matching = err.downcast_ref::<MatchingError>().unwrap();
        assert!(matching.is_config_error());
    }
}
