//! Video analysis models: candidate shots and 30%-rule transition checks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Minimum change on at least one dimension for a cut to read as a new shot.
pub const MIN_CHANGE_THRESHOLD: f64 = 0.30;

/// Returns true if `max_change` satisfies the 30% rule.
pub fn meets_thirty_percent_rule(max_change: f64) -> bool {
    max_change >= MIN_CHANGE_THRESHOLD
}

/// Per-shot quality metrics, all in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShotQuality {
    pub sharpness: f64,
    /// Camera shake (higher is worse)
    pub shake: f64,
    pub lighting: f64,
    pub composition: f64,
    pub overall_score: f64,
}

/// A candidate shot from the source footage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shot {
    pub id: String,
    /// Source start in milliseconds
    pub start_time: f64,
    /// Source end in milliseconds
    pub end_time: f64,
    pub duration: f64,
    /// First usable source time
    pub in_point: f64,
    /// Last usable source time
    pub out_point: f64,
    /// Source time after which the shot is usable (settled after the cut-in)
    pub usable_from: f64,
    /// Source time after which the shot is fully stable
    pub stable_from: f64,
    pub quality: ShotQuality,
    #[serde(default)]
    pub is_hero_shot: bool,
    #[serde(default)]
    pub hero_shot_score: f64,
}

impl Shot {
    /// Length of source material available after `threshold`.
    pub fn usable_span_after(&self, threshold: f64) -> f64 {
        (self.end_time - threshold.max(self.start_time)).max(0.0)
    }
}

/// Change magnitudes across a cut, one per perceptual dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeMagnitudes {
    pub position: f64,
    pub size: f64,
    pub color: f64,
    pub motion: f64,
}

impl ChangeMagnitudes {
    /// The largest change and the dimension it happened on.
    ///
    /// Ties resolve in the order position, size, color, motion.
    pub fn dominant(&self) -> (ChangeDimension, f64) {
        let mut best = (ChangeDimension::Position, self.position);
        for candidate in [
            (ChangeDimension::Size, self.size),
            (ChangeDimension::Color, self.color),
            (ChangeDimension::Motion, self.motion),
        ] {
            if candidate.1 > best.1 {
                best = candidate;
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDimension {
    Position,
    Size,
    Color,
    Motion,
}

impl ChangeDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeDimension::Position => "position",
            ChangeDimension::Size => "size",
            ChangeDimension::Color => "color",
            ChangeDimension::Motion => "motion",
        }
    }
}

impl fmt::Display for ChangeDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of checking one shot-to-shot cut against the 30% rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionValidation {
    pub from_shot: String,
    pub to_shot: String,
    #[serde(default)]
    pub changes: ChangeMagnitudes,
    pub is_valid: bool,
    pub max_change: f64,
    pub change_dimension: ChangeDimension,
}

impl TransitionValidation {
    /// Build a validation from raw change magnitudes, applying the 30% rule.
    pub fn from_changes(
        from_shot: impl Into<String>,
        to_shot: impl Into<String>,
        changes: ChangeMagnitudes,
    ) -> Self {
        let (change_dimension, max_change) = changes.dominant();
        Self {
            from_shot: from_shot.into(),
            to_shot: to_shot.into(),
            changes,
            is_valid: meets_thirty_percent_rule(max_change),
            max_change,
            change_dimension,
        }
    }
}

/// Everything the engine consumes from the video analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoAnalysis {
    #[serde(default)]
    pub shots: Vec<Shot>,
    #[serde(default)]
    pub transition_validations: Vec<TransitionValidation>,
}

impl VideoAnalysis {
    pub fn new(shots: Vec<Shot>) -> Self {
        Self {
            shots,
            transition_validations: Vec::new(),
        }
    }

    /// Index shots by id.
    pub fn shot_index(&self) -> HashMap<&str, &Shot> {
        self.shots.iter().map(|s| (s.id.as_str(), s)).collect()
    }
}
