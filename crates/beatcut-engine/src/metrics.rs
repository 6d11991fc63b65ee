//! Engine metrics.
//!
//! Emitted through the `metrics` facade; installing an exporter is left to
//! the host process.

use metrics::{counter, histogram};

use beatcut_models::{EditPattern, Strategy};

/// Metric names as constants for consistency.
pub mod names {
    pub const MATCHES_TOTAL: &str = "beatcut_matches_total";
    pub const MATCH_FAILURES_TOTAL: &str = "beatcut_match_failures_total";
    pub const MATCH_DURATION_SECONDS: &str = "beatcut_match_duration_seconds";

    pub const PATTERN_DECISIONS: &str = "beatcut_pattern_decisions";
    pub const PATTERN_CONFIDENCE: &str = "beatcut_pattern_aggregate_confidence";
    pub const DECISIONS_PRUNED_TOTAL: &str = "beatcut_decisions_pruned_total";
    pub const CONFLICTS_TOTAL: &str = "beatcut_conflicts_total";

    pub const RECOMMENDATIONS_TOTAL: &str = "beatcut_recommendations_total";
}

/// Record a completed match.
pub fn record_match(duration_secs: f64) {
    counter!(names::MATCHES_TOTAL).increment(1);
    histogram!(names::MATCH_DURATION_SECONDS).record(duration_secs);
}

/// Record a failed match.
pub fn record_match_failure(reason: &str) {
    let labels = [("reason", reason.to_string())];
    counter!(names::MATCH_FAILURES_TOTAL, &labels).increment(1);
}

/// Record the shape of one generated pattern.
pub fn record_pattern(pattern: &EditPattern) {
    let labels = [("strategy", pattern.name.as_str().to_string())];
    histogram!(names::PATTERN_DECISIONS, &labels).record(pattern.decisions.len() as f64);
    histogram!(names::PATTERN_CONFIDENCE, &labels)
        .record(pattern.evaluation.aggregate_confidence);

    let optimization = &pattern.optimization;
    counter!(names::DECISIONS_PRUNED_TOTAL, &labels).increment(optimization.pruned as u64);
    counter!(names::CONFLICTS_TOTAL, &labels)
        .increment((optimization.conflicts_dropped + optimization.conflicts_trimmed) as u64);
}

/// Record which strategy was recommended.
pub fn record_recommendation(strategy: Strategy) {
    let labels = [("strategy", strategy.as_str().to_string())];
    counter!(names::RECOMMENDATIONS_TOTAL, &labels).increment(1);
}
