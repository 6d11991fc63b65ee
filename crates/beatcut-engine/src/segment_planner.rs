//! Segment planning and configuration validation.
//!
//! Turns the named segment map into an ordered list of timeline slices
//! clipped to the track duration:
//!
//! ```text
//!   config { hook: [0,3000], main: [3000,57000], outro: [57000,60000] }
//!                              │
//!                   sort by start, clip to [0, duration)
//!                              ▼
//!   [ hook (opening) | main | outro ]
//! ```

use beatcut_models::{SegmentConfig, SegmentConstraints, SegmentDefinition, SegmentWeights};

use crate::error::{EngineResult, MatchingError};

/// Tolerance on the weight sum.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Tolerance when comparing segment boundaries.
const BOUNDARY_EPSILON: f64 = 1e-6;

/// One segment ready for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSegment {
    pub name: String,
    pub label: String,
    /// Start in milliseconds
    pub start: f64,
    /// End in milliseconds, clipped to the track duration
    pub end: f64,
    /// Weights as configured, before strategy modifiers
    pub base_weights: SegmentWeights,
    pub constraints: SegmentConstraints,
    /// First segment of the timeline
    pub is_opening: bool,
}

impl PlannedSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

/// Order segments by start time, ties by name.
fn sorted_segments(config: &SegmentConfig) -> Vec<(&String, &SegmentDefinition)> {
    let mut segments: Vec<_> = config.segments.iter().collect();
    segments.sort_by(|(a_name, a), (b_name, b)| {
        a.start()
            .total_cmp(&b.start())
            .then_with(|| a_name.cmp(b_name))
    });
    segments
}

/// Plan the segments for a track of `duration` milliseconds.
///
/// Segments starting at or after `duration` are dropped; the rest are
/// clipped to it.
pub fn plan_segments(
    config: Option<&SegmentConfig>,
    duration: f64,
) -> EngineResult<Vec<PlannedSegment>> {
    let config = config.ok_or(MatchingError::ConfigMissing)?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(MatchingError::invalid_input(format!(
            "track duration must be a non-negative number of milliseconds, got {}",
            duration
        )));
    }

    let planned = sorted_segments(config)
        .into_iter()
        .filter(|(_, segment)| segment.start() < duration)
        .enumerate()
        .map(|(index, (name, segment))| PlannedSegment {
            name: name.clone(),
            label: segment.label.clone(),
            start: segment.start().max(0.0),
            end: segment.end().min(duration),
            base_weights: segment.weights,
            constraints: segment.constraints,
            is_opening: index == 0,
        })
        .collect();

    Ok(planned)
}

/// Validate a segment configuration.
///
/// Every failure is a [`MatchingError::Configuration`] naming the offending
/// key.
pub fn validate_segment_config(config: &SegmentConfig) -> EngineResult<()> {
    if config.segments.is_empty() {
        return Err(MatchingError::configuration(
            "segments",
            "at least one segment is required",
        ));
    }

    for (name, segment) in &config.segments {
        validate_segment(name, segment)?;
    }

    let mut expected_start = 0.0;
    for (name, segment) in sorted_segments(config) {
        let start = segment.start();
        if start < expected_start - BOUNDARY_EPSILON {
            return Err(MatchingError::configuration(
                format!("segments.{}.range", name),
                format!(
                    "overlaps the previous segment (starts at {} before {})",
                    start, expected_start
                ),
            ));
        }
        if start > expected_start + BOUNDARY_EPSILON {
            return Err(MatchingError::configuration(
                format!("segments.{}.range", name),
                format!("leaves a gap from {} to {}", expected_start, start),
            ));
        }
        expected_start = segment.end();
    }

    Ok(())
}

fn validate_segment(name: &str, segment: &SegmentDefinition) -> EngineResult<()> {
    let key = |field: &str| format!("segments.{}.{}", name, field);

    let [start, end] = segment.range;
    if !start.is_finite() || !end.is_finite() || start < 0.0 {
        return Err(MatchingError::configuration(
            key("range"),
            format!("range must be finite and start at or after 0, got [{}, {}]", start, end),
        ));
    }
    if start >= end {
        return Err(MatchingError::configuration(
            key("range"),
            format!("start {} must be before end {}", start, end),
        ));
    }

    for (component, value) in segment.weights.components() {
        if !(0.0..=1.0).contains(&value) {
            return Err(MatchingError::configuration(
                key(&format!("weights.{}", component)),
                format!("weight must be within [0, 1], got {}", value),
            ));
        }
    }
    let sum = segment.weights.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(MatchingError::configuration(
            key("weights"),
            format!("weights must sum to 1.0, got {:.3}", sum),
        ));
    }

    let constraints = &segment.constraints;
    if constraints.min_shot_duration <= 0.0 {
        return Err(MatchingError::configuration(
            key("constraints.minShotDuration"),
            "must be positive",
        ));
    }
    if constraints.max_shot_duration <= 0.0 {
        return Err(MatchingError::configuration(
            key("constraints.maxShotDuration"),
            "must be positive",
        ));
    }
    if constraints.min_shot_duration > constraints.max_shot_duration {
        return Err(MatchingError::configuration(
            key("constraints"),
            format!(
                "minShotDuration {} exceeds maxShotDuration {}",
                constraints.min_shot_duration, constraints.max_shot_duration
            ),
        ));
    }
    if constraints.max_consecutive_same_shot == 0 {
        return Err(MatchingError::configuration(
            key("constraints.maxConsecutiveSameShot"),
            "must be at least 1",
        ));
    }

    Ok(())
}
