//! Engine configuration.
//!
//! Two layers:
//! - [`MatchingConfig`]: tuning knobs for the matching run itself, with
//!   presets and `from_env()`.
//! - [`load_segment_config`]: the named segment map, read from a TOML or JSON
//!   file with `BEATCUT_` environment overrides layered on top.

use std::path::Path;
use std::time::Duration;

use beatcut_models::{OptimizationMethod, SegmentConfig};
use tracing::debug;

use crate::error::EngineResult;
use crate::segment_planner::validate_segment_config;

/// Tuning for one matching run.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    /// Abort the whole run after this long
    pub timeout: Option<Duration>,
    /// Global optimization applied after candidate selection
    pub optimization_method: OptimizationMethod,
    /// Generate the three patterns on the rayon pool
    pub parallel_strategies: bool,
    /// Shortest a trimmed decision may become before it is dropped (ms)
    pub min_trimmed_duration: f64,
    /// Timeline gap above which a transition is penalized (ms)
    pub gap_threshold: f64,
    /// Cost of a cut that fails the 30% rule
    pub invalid_transition_penalty: f64,
    /// Cost of a gap longer than `gap_threshold`
    pub gap_penalty: f64,
    /// Window at the start of the opening segment that requires fully
    /// stable footage (ms)
    pub opening_stable_window: f64,
    /// Distance from a segment boundary that counts as "near" (ms)
    pub boundary_window: f64,
    /// Bucket size for cross-pattern comparison (ms)
    pub comparison_bucket: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            optimization_method: OptimizationMethod::DynamicProgramming,
            parallel_strategies: true,
            min_trimmed_duration: 500.0,
            gap_threshold: 1000.0,
            invalid_transition_penalty: 0.5,
            gap_penalty: 0.3,
            opening_stable_window: 3000.0,
            boundary_window: 500.0,
            comparison_bucket: 100.0,
        }
    }
}

impl MatchingConfig {
    /// Greedy optimization, for long decision lists where the cubic DP is
    /// too slow.
    pub fn fast() -> Self {
        Self {
            optimization_method: OptimizationMethod::Greedy,
            ..Self::default()
        }
    }

    /// Sequential, single-threaded run. Useful under an outer thread pool.
    pub fn sequential() -> Self {
        Self {
            parallel_strategies: false,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_optimization_method(mut self, method: OptimizationMethod) -> Self {
        self.optimization_method = method;
        self
    }

    pub fn with_parallel_strategies(mut self, parallel: bool) -> Self {
        self.parallel_strategies = parallel;
        self
    }

    pub fn with_transition_penalties(mut self, invalid: f64, gap: f64) -> Self {
        self.invalid_transition_penalty = invalid;
        self.gap_penalty = gap;
        self
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout: std::env::var("BEATCUT_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis),
            optimization_method: std::env::var("BEATCUT_OPTIMIZATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.optimization_method),
            parallel_strategies: std::env::var("BEATCUT_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.parallel_strategies),
            min_trimmed_duration: std::env::var("BEATCUT_MIN_TRIMMED_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_trimmed_duration),
            gap_threshold: std::env::var("BEATCUT_GAP_THRESHOLD_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.gap_threshold),
            ..defaults
        }
    }
}

/// Load and validate a segment configuration file.
///
/// The format follows the file extension (`.toml`, `.json`, `.yaml`).
/// Environment variables prefixed `BEATCUT_` override file values, with `__`
/// separating nested keys, e.g.
/// `BEATCUT_SEGMENTS__HOOK__CONSTRAINTS__PREFERHEROSHOTS=true`.
pub fn load_segment_config(path: impl AsRef<Path>) -> EngineResult<SegmentConfig> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading segment configuration");

    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("BEATCUT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let segment_config: SegmentConfig = settings.try_deserialize()?;
    validate_segment_config(&segment_config)?;
    Ok(segment_config)
}

/// Parse and validate a segment configuration from a JSON string.
pub fn parse_segment_config_json(json: &str) -> EngineResult<SegmentConfig> {
    let segment_config: SegmentConfig = serde_json::from_str(json)?;
    validate_segment_config(&segment_config)?;
    Ok(segment_config)
}
