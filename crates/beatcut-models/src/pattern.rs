//! Edit pattern models: one decision list per strategy plus its evaluation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::decision::EditDecision;
use crate::strategy::Strategy;

/// Pattern-level quality metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatternEvaluation {
    /// Mean decision confidence (QA gate expects >= 0.88)
    pub aggregate_confidence: f64,
    /// Mean decision duration in milliseconds
    pub avg_shot_duration: f64,
    /// Cuts per second
    pub cut_frequency: f64,
    pub transition_quality: f64,
    pub musical_alignment: f64,
    pub visual_flow: f64,
    pub narrative_cohesion: f64,
}

/// Quality findings for one timeline segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentEvaluation {
    pub segment_name: String,
    pub start_time: f64,
    pub end_time: f64,
    pub score: f64,
    pub issues: Vec<String>,
}

/// Quality of the hand-off between two adjacent segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryEvaluation {
    pub from: String,
    pub to: String,
    pub time: f64,
    pub quality: f64,
    pub issues: Vec<String>,
}

/// Global optimization method applied after candidate selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMethod {
    /// Interval dynamic program over the whole decision list.
    #[default]
    DynamicProgramming,
    /// Highest-confidence-first selection of non-overlapping decisions.
    Greedy,
}

impl OptimizationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationMethod::DynamicProgramming => "dynamic_programming",
            OptimizationMethod::Greedy => "greedy",
        }
    }
}

impl fmt::Display for OptimizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OptimizationMethod {
    type Err = OptimizationMethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "dynamic_programming" | "dp" => Ok(OptimizationMethod::DynamicProgramming),
            "greedy" => Ok(OptimizationMethod::Greedy),
            _ => Err(OptimizationMethodParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown optimization method: {0}")]
pub struct OptimizationMethodParseError(String);

/// What the optimizer did to a pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSummary {
    pub method: OptimizationMethod,
    /// Decisions entering the optimizer
    pub input_decisions: usize,
    /// Decisions dropped by conflict resolution
    pub conflicts_dropped: usize,
    /// Decisions trimmed by conflict resolution
    pub conflicts_trimmed: usize,
    /// Decisions pruned by the optimizer or the reuse limit
    pub pruned: usize,
    /// `Σ(1 - confidence) + Σ transition cost` of the returned decisions,
    /// measured after reuse pruning
    pub total_cost: f64,
}

/// The full result of running one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditPattern {
    pub name: Strategy,
    pub description: String,
    /// Time-ordered, non-overlapping decisions
    pub decisions: Vec<EditDecision>,
    pub evaluation: PatternEvaluation,
    pub segment_evaluations: Vec<SegmentEvaluation>,
    #[serde(default)]
    pub boundary_evaluations: Vec<BoundaryEvaluation>,
    #[serde(default)]
    pub optimization: OptimizationSummary,
    /// Suggestions derived from the evaluation, deduplicated in order
    #[serde(default)]
    pub improvement_suggestions: Vec<String>,
}

impl EditPattern {
    /// Weighted pattern score used to pick the recommendation.
    pub fn recommendation_score(&self) -> f64 {
        let e = &self.evaluation;
        e.aggregate_confidence * 0.4
            + e.transition_quality * 0.3
            + e.musical_alignment * 0.2
            + e.narrative_cohesion * 0.1
    }
}
