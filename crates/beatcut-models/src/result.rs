//! Top-level matching output.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::decision::EditDecision;
use crate::explain::ExplainData;
use crate::pattern::EditPattern;
use crate::strategy::Strategy;

/// One pattern per strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatternSet {
    pub dynamic_cut: EditPattern,
    pub narrative_flow: EditPattern,
    pub hybrid_balance: EditPattern,
}

impl PatternSet {
    pub fn get(&self, strategy: Strategy) -> &EditPattern {
        match strategy {
            Strategy::DynamicCut => &self.dynamic_cut,
            Strategy::NarrativeFlow => &self.narrative_flow,
            Strategy::HybridBalance => &self.hybrid_balance,
        }
    }

    /// Patterns in strategy order.
    pub fn iter(&self) -> impl Iterator<Item = &EditPattern> {
        Strategy::ALL.into_iter().map(move |s| self.get(s))
    }
}

/// Quality summary across all three patterns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverallQuality {
    pub score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
}

/// A time bucket where the patterns disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatternDifference {
    /// Bucket start in milliseconds
    pub time: f64,
    /// Patterns with a decision in the bucket
    pub patterns: Vec<Strategy>,
    pub reason: String,
}

/// A time bucket where every pattern cut to the same shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusPoint {
    /// Bucket start in milliseconds
    pub time: f64,
    pub shot_id: String,
}

/// One timeline merged from the three patterns.
///
/// Each time bucket contributes its best-scoring decision across patterns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegratedPattern {
    /// Time-ordered, non-overlapping decisions
    pub decisions: Vec<EditDecision>,
    pub aggregate_confidence: f64,
    /// Decisions taken from each strategy, keyed by strategy name
    pub contributions: BTreeMap<String, usize>,
}

/// Agreement between the three patterns, bucketed by time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatternComparison {
    /// Share of buckets where every pattern picked the same shot
    pub similarity: f64,
    pub differences: Vec<PatternDifference>,
    pub consensus: Vec<ConsensusPoint>,
    #[serde(default)]
    pub integrated: IntegratedPattern,
}

/// Everything one `match` call produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchingResult {
    pub patterns: PatternSet,
    pub recommended_pattern: Strategy,
    pub recommendation_reason: String,
    pub overall_quality: OverallQuality,
    pub comparison: PatternComparison,
    pub explain_data: ExplainData,
}

impl MatchingResult {
    pub fn recommended(&self) -> &EditPattern {
        self.patterns.get(self.recommended_pattern)
    }

    /// True when the recommended pattern clears the QA confidence gate.
    pub fn meets_confidence_gate(&self) -> bool {
        self.recommended().evaluation.aggregate_confidence >= crate::QA_CONFIDENCE_THRESHOLD
    }
}
