//! Pattern generation: one full matching run per strategy.
//!
//! ```text
//!   for each planned segment:
//!       weights = base weights × strategy modifiers, normalized
//!       decisions += select(edit points in segment)      ── ShotUsage threaded through
//!   optimize(decisions) ──► link transitions ──► evaluate ──► EditPattern
//! ```

use std::collections::HashMap;

use beatcut_models::{
    EditPattern, MusicAnalysis, SegmentConfig, SegmentConstraints, Strategy, VideoAnalysis,
};
use tracing::debug;

use crate::config::MatchingConfig;
use crate::deadline::Deadline;
use crate::error::EngineResult;
use crate::evaluator::{
    evaluate_boundaries, evaluate_pattern, evaluate_segments, improvement_suggestions,
};
use crate::optimizer::DecisionOptimizer;
use crate::segment_planner::PlannedSegment;
use crate::selector::{CandidateSelector, ShotUsage, SlotContext};
use crate::transition_linker::{link_transitions, TransitionIndex};

/// Read-only inputs shared by all strategy runs.
pub struct GenerationContext<'a> {
    pub config: &'a MatchingConfig,
    pub segment_config: &'a SegmentConfig,
    pub segments: &'a [PlannedSegment],
    pub music: &'a MusicAnalysis,
    pub video: &'a VideoAnalysis,
    pub transitions: &'a TransitionIndex<'a>,
    /// Constraints per segment name
    pub constraints: HashMap<String, SegmentConstraints>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        config: &'a MatchingConfig,
        segment_config: &'a SegmentConfig,
        segments: &'a [PlannedSegment],
        music: &'a MusicAnalysis,
        video: &'a VideoAnalysis,
        transitions: &'a TransitionIndex<'a>,
    ) -> Self {
        let constraints = segments
            .iter()
            .map(|s| (s.name.clone(), s.constraints))
            .collect();
        Self {
            config,
            segment_config,
            segments,
            music,
            video,
            transitions,
            constraints,
        }
    }
}

/// Generate the edit pattern for one strategy.
///
/// Every call owns its own shot-reuse state, so runs for different
/// strategies are independent.
pub fn generate_pattern(
    ctx: &GenerationContext<'_>,
    strategy: Strategy,
    deadline: &Deadline,
) -> EngineResult<EditPattern> {
    let modifiers = ctx.segment_config.modifiers_for(strategy);
    let selector = CandidateSelector::new(&ctx.video.shots, &ctx.music.dynamics);
    let mut usage = ShotUsage::new();
    let mut candidates = Vec::new();

    for segment in ctx.segments {
        deadline.check()?;

        let weights = segment.base_weights.modified_by(&modifiers);
        let points = ctx.music.edit_points_in(segment.start, segment.end);
        let slot = SlotContext {
            strategy,
            segment,
            weights: &weights,
            opening_stable_window: ctx.config.opening_stable_window,
        };

        let selected = selector.select_segment(&slot, &points, &mut usage);
        debug!(
            strategy = %strategy,
            segment = %segment.name,
            edit_points = points.len(),
            selected = selected.len(),
            "Selected candidates for segment"
        );
        candidates.extend(selected);
    }

    let optimizer = DecisionOptimizer::new(ctx.config, ctx.transitions, &ctx.constraints);
    let optimized = optimizer.optimize(candidates, deadline)?;
    let mut decisions = optimized.decisions;
    let linked = link_transitions(&mut decisions, ctx.transitions);

    let evaluation = evaluate_pattern(&decisions, ctx.music.duration);
    let segment_evaluations = evaluate_segments(ctx.segments, &decisions);
    let boundary_evaluations =
        evaluate_boundaries(ctx.segments, &decisions, ctx.config.boundary_window);
    let suggestions = improvement_suggestions(&evaluation, &segment_evaluations);

    debug!(
        strategy = %strategy,
        decisions = decisions.len(),
        linked_transitions = linked,
        aggregate_confidence = evaluation.aggregate_confidence,
        "Generated pattern"
    );

    Ok(EditPattern {
        name: strategy,
        description: ctx.segment_config.description_for(strategy),
        decisions,
        evaluation,
        segment_evaluations,
        boundary_evaluations,
        optimization: optimized.summary,
        improvement_suggestions: suggestions,
    })
}
