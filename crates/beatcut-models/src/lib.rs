//! Shared data models for the Beatcut edit matching engine.
//!
//! This crate provides Serde-serializable types for:
//! - Music analysis input (edit points, relative dynamics)
//! - Video analysis input (shots, 30%-rule transition checks)
//! - Segment configuration and editorial strategies
//! - Edit decisions, patterns and the matching result
//! - The explain payload consumed by quality gates
//!
//! All times are milliseconds on the wire, field names are camelCase.

pub mod decision;
pub mod explain;
pub mod music;
pub mod pattern;
pub mod result;
pub mod segment;
pub mod strategy;
pub mod timecode;
pub mod video;

/// Aggregate confidence the QA layer expects from a pattern.
pub const QA_CONFIDENCE_THRESHOLD: f64 = 0.88;

// Re-export common types
pub use decision::{DecisionId, DecisionScores, DecisionTransition, EditDecision};
pub use explain::{
    DecisionContext, ExplainData, ExplainDecision, ExplainStatistics, QualityMetrics,
    SegmentAnalysis, SegmentPerformance, EXPLAIN_VERSION,
};
pub use music::{
    Beat, EditPoint, EditPointType, MusicAnalysis, MusicSegment, MusicalContext, Onset, OnsetKind,
    RelativeDynamics,
};
pub use pattern::{
    BoundaryEvaluation, EditPattern, OptimizationMethod, OptimizationMethodParseError,
    OptimizationSummary, PatternEvaluation, SegmentEvaluation,
};
pub use result::{
    ConsensusPoint, IntegratedPattern, MatchingResult, OverallQuality, PatternComparison,
    PatternDifference, PatternSet,
};
pub use segment::{
    PatternDefinition, SegmentConfig, SegmentConstraints, SegmentDefinition, SegmentWeights,
};
pub use strategy::{Strategy, StrategyParseError, WeightModifiers};
pub use timecode::{format_ms, parse_timecode, snap_to_frame, TimecodeError};
pub use video::{
    meets_thirty_percent_rule, ChangeDimension, ChangeMagnitudes, Shot, ShotQuality,
    TransitionValidation, VideoAnalysis, MIN_CHANGE_THRESHOLD,
};
