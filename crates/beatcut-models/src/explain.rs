//! Explainability payload for downstream quality gates.
//!
//! Built from the recommended pattern. Every map is ordered so the payload
//! serializes identically for identical inputs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::decision::{DecisionId, DecisionScores, DecisionTransition};
use crate::music::MusicalContext;
use crate::segment::SegmentWeights;

/// Version of the explain payload format.
pub const EXPLAIN_VERSION: &str = "1.0.0";

/// Where a decision sits and what it cuts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionContext {
    pub segment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub musical_context: Option<MusicalContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<DecisionTransition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExplainDecision {
    pub id: DecisionId,
    pub time: f64,
    /// `HH:MM:SS.mmm` rendering of `time`
    pub timecode: String,
    pub shot: String,
    pub confidence: f64,
    pub reason: String,
    pub scores: DecisionScores,
    pub context: DecisionContext,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub music_sync: f64,
    pub visual_flow: f64,
    pub narrative_coherence: f64,
    /// Aggregate decision confidence
    pub technical_quality: f64,
    /// Transition quality under the 30% rule
    pub thirty_percent_compliance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPerformance {
    pub target_score: f64,
    pub actual_score: f64,
    pub gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentAnalysis {
    pub segment: String,
    /// `[start, end)` in milliseconds
    pub time_range: [f64; 2],
    pub applied_weights: SegmentWeights,
    pub performance: SegmentPerformance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExplainStatistics {
    pub total_decisions: usize,
    pub avg_confidence: f64,
    pub avg_flexibility: f64,
    /// Decisions per shot id
    pub shot_usage: BTreeMap<String, usize>,
    /// Decisions per edit point type
    pub edit_point_types: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExplainData {
    pub version: String,
    /// RFC 3339 timestamp, set by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub aggregate_confidence: f64,
    pub decisions: Vec<ExplainDecision>,
    pub quality_metrics: QualityMetrics,
    pub segment_analysis: Vec<SegmentAnalysis>,
    pub statistics: ExplainStatistics,
}

impl ExplainData {
    /// Stamp the generation time.
    pub fn with_generated_at(mut self, generated_at: impl Into<String>) -> Self {
        self.generated_at = Some(generated_at.into());
        self
    }
}
