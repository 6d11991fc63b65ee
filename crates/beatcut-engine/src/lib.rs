//! Time-based edit matching engine.
//!
//! Matches analyzed music (edit points, relative dynamics) against analyzed
//! footage (shots, 30%-rule transition checks) and produces three complete
//! edit patterns, one per editorial strategy, plus a recommendation and an
//! explain payload for QA.
//!
//! # Pipeline
//!
//! ```text
//! ┌───────────────┐   ┌──────────────────┐   ┌────────────────────┐
//! │ MusicAnalysis │   │  SegmentConfig   │   │   VideoAnalysis    │
//! └──────┬────────┘   └────────┬─────────┘   └─────────┬──────────┘
//!        │                     ▼                       │
//!        │            segment_planner                  │
//!        ▼                     ▼                       ▼
//!   ┌──────────────────────────────────────────────────────────┐
//!   │ generator (per strategy)                                 │
//!   │   selector + scorer ─► optimizer ─► transition_linker    │
//!   │                     ─► evaluator                         │
//!   └──────────────────────────┬───────────────────────────────┘
//!                              ▼
//!          recommendation ─► comparison ─► MatchingResult
//! ```
//!
//! # Example
//!
//! ```ignore
//! use beatcut_engine::{MatchingConfig, MatchingEngine};
//!
//! let engine = MatchingEngine::new(MatchingConfig::from_env())
//!     .with_segments(beatcut_engine::load_segment_config("segments.toml")?)?;
//! let result = engine.match_analysis(&music, &video)?;
//! println!("{}", result.recommendation_reason);
//! ```

pub mod comparison;
pub mod config;
pub mod deadline;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod metrics;
pub mod optimizer;
pub mod recommendation;
pub mod scorer;
pub mod segment_planner;
pub mod selector;
pub mod transition_linker;

pub use comparison::{compare_patterns, integrate_patterns, integration_weight};
pub use config::{load_segment_config, parse_segment_config_json, MatchingConfig};
pub use deadline::Deadline;
pub use engine::MatchingEngine;
pub use error::{EngineResult, MatchingError};
pub use evaluator::{
    evaluate_boundaries, evaluate_pattern, evaluate_segment, evaluate_segments,
    improvement_suggestions,
};
pub use generator::{generate_pattern, GenerationContext};
pub use optimizer::{
    enforce_run_limits, greedy_select, interval_dp, resolve_conflicts, ConflictStats,
    DecisionOptimizer, IntervalPlan, OptimizedDecisions, TransitionCostModel,
};
pub use recommendation::{build_explain_data, overall_quality, recommend, Recommendation};
pub use scorer::{dynamics_at, score_shot};
pub use segment_planner::{plan_segments, validate_segment_config, PlannedSegment};
pub use selector::{CandidateSelector, ShotUsage, SlotContext};
pub use transition_linker::{improvement_hint, link_transitions, TransitionIndex};
