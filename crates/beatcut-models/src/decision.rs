//! Edit decision models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::music::{EditPointType, MusicalContext};
use crate::segment::SegmentWeights;
use crate::strategy::Strategy;
use crate::video::TransitionValidation;

/// Identifier of one edit decision.
///
/// Ids are name-based (UUID v5) so that the same inputs always produce the
/// same ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DecisionId(pub String);

impl DecisionId {
    /// Derive the id for a decision from what makes it unique.
    pub fn derive(strategy: Strategy, segment: &str, time: f64, shot_id: &str) -> Self {
        let name = format!("{}:{}:{}:{}", strategy.as_str(), segment, time.to_bits(), shot_id);
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DecisionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Component scores for a shot in a slot, all in 0.0-1.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DecisionScores {
    pub visual: f64,
    pub sync: f64,
    pub semantic: f64,
    pub stability: f64,
    pub overall: f64,
}

/// The 30%-rule check attached to a cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTransition {
    /// Shot cut away from
    pub from_shot: String,
    pub validation: TransitionValidation,
    /// Hint for fixing an invalid cut
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement: Option<String>,
}

impl DecisionTransition {
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid
    }
}

/// One cut on the output timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditDecision {
    pub id: DecisionId,
    /// Timeline position in milliseconds
    pub time: f64,
    pub shot_id: String,
    pub is_hero_shot: bool,
    /// Source in point in milliseconds
    pub in_point: f64,
    /// Source out point in milliseconds
    pub out_point: f64,
    /// Timeline duration in milliseconds
    pub duration: f64,
    /// Confidence of the edit point this cut sits on
    pub confidence: f64,
    /// Allowed adjustment in ± milliseconds
    pub flexibility: f64,
    pub scores: DecisionScores,
    pub segment_name: String,
    pub applied_weights: SegmentWeights,
    pub edit_point_type: EditPointType,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub musical_context: Option<MusicalContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<DecisionTransition>,
}

impl EditDecision {
    /// Timeline end in milliseconds.
    pub fn end(&self) -> f64 {
        self.time + self.duration
    }

    pub fn is_downbeat(&self) -> bool {
        self.musical_context.map(|c| c.is_downbeat).unwrap_or(false)
    }

    /// True if this decision and `other` share any timeline span.
    pub fn overlaps(&self, other: &EditDecision) -> bool {
        self.time < other.end() && other.time < self.end()
    }
}
