//! Candidate selection: one shot per edit point.
//!
//! For each edit point inside a segment the selector computes the slot
//! length up to the next edit point, filters the shot pool down to shots that
//! can fill that slot, and keeps the best-scoring one.

use std::collections::BTreeMap;

use beatcut_models::{
    DecisionId, DecisionScores, EditDecision, EditPoint, RelativeDynamics, SegmentWeights, Shot,
    Strategy,
};
use tracing::trace;

use crate::scorer::{dynamics_at, score_shot};
use crate::segment_planner::PlannedSegment;

/// Shot-reuse state for one generation run.
///
/// Tracks the current unbroken run of one shot plus per-shot totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotUsage {
    last_shot: Option<String>,
    run_length: u32,
    totals: BTreeMap<String, u32>,
}

impl ShotUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `shot_id` may be used again without exceeding `max_run`.
    pub fn can_use(&self, shot_id: &str, max_run: u32) -> bool {
        match &self.last_shot {
            Some(last) if last == shot_id => self.run_length < max_run,
            _ => true,
        }
    }

    /// Record `shot_id` as the next cut.
    pub fn record(&mut self, shot_id: &str) {
        match &self.last_shot {
            Some(last) if last == shot_id => self.run_length += 1,
            _ => {
                self.last_shot = Some(shot_id.to_string());
                self.run_length = 1;
            }
        }
        *self.totals.entry(shot_id.to_string()).or_insert(0) += 1;
    }

    pub fn run_length(&self) -> u32 {
        self.run_length
    }

    /// Times `shot_id` has been used in this run.
    pub fn total(&self, shot_id: &str) -> u32 {
        self.totals.get(shot_id).copied().unwrap_or(0)
    }
}

/// The segment being filled and the weights in force for it.
#[derive(Debug, Clone, Copy)]
pub struct SlotContext<'a> {
    pub strategy: Strategy,
    pub segment: &'a PlannedSegment,
    /// Segment weights after strategy modifiers
    pub weights: &'a SegmentWeights,
    /// Opening window that requires fully stable footage (ms)
    pub opening_stable_window: f64,
}

impl SlotContext<'_> {
    /// Source time from which a shot must be usable at timeline `time`.
    fn usability_threshold(&self, shot: &Shot, time: f64) -> f64 {
        if self.segment.is_opening && time < self.opening_stable_window {
            shot.stable_from
        } else {
            shot.usable_from
        }
    }
}

/// Picks one shot per edit point.
pub struct CandidateSelector<'a> {
    shots: &'a [Shot],
    dynamics: &'a [RelativeDynamics],
}

impl<'a> CandidateSelector<'a> {
    pub fn new(shots: &'a [Shot], dynamics: &'a [RelativeDynamics]) -> Self {
        Self { shots, dynamics }
    }

    /// Select decisions for every edit point in the segment.
    ///
    /// `points` must be the segment's edit points sorted by time. Points with
    /// a slot shorter than the segment minimum or with no eligible shot are
    /// skipped.
    pub fn select_segment(
        &self,
        ctx: &SlotContext<'_>,
        points: &[&EditPoint],
        usage: &mut ShotUsage,
    ) -> Vec<EditDecision> {
        let mut decisions = Vec::with_capacity(points.len());

        for (index, point) in points.iter().enumerate() {
            let slot_end = points
                .get(index + 1)
                .map(|next| next.time)
                .unwrap_or(ctx.segment.end);
            let duration = slot_end - point.time;

            if duration < ctx.segment.constraints.min_shot_duration {
                trace!(
                    segment = %ctx.segment.name,
                    time = point.time,
                    duration,
                    "Slot shorter than minimum shot duration"
                );
                continue;
            }

            match self.select(ctx, point, duration, usage) {
                Some(decision) => {
                    usage.record(&decision.shot_id);
                    decisions.push(decision);
                }
                None => {
                    trace!(
                        segment = %ctx.segment.name,
                        time = point.time,
                        "No eligible shot for edit point"
                    );
                }
            }
        }

        decisions
    }

    /// Best decision for one edit point, if any shot is eligible.
    pub fn select(
        &self,
        ctx: &SlotContext<'_>,
        point: &EditPoint,
        duration: f64,
        usage: &ShotUsage,
    ) -> Option<EditDecision> {
        let max_run = ctx.segment.constraints.max_consecutive_same_shot;

        let eligible: Vec<&Shot> = self
            .shots
            .iter()
            .filter(|shot| shot.duration >= duration)
            .filter(|shot| {
                let threshold = ctx.usability_threshold(shot, point.time);
                shot.usable_span_after(threshold) >= duration
                    && shot.out_point - shot.in_point.max(threshold) >= duration
            })
            .filter(|shot| usage.can_use(&shot.id, max_run))
            .collect();

        let hero_gated = ctx.segment.is_opening
            && ctx.segment.constraints.prefer_hero_shots
            && eligible.iter().any(|shot| shot.is_hero_shot);

        let dynamics = dynamics_at(self.dynamics, point.time);

        let mut best: Option<(&Shot, DecisionScores)> = None;
        for shot in eligible
            .into_iter()
            .filter(|shot| !hero_gated || shot.is_hero_shot)
        {
            let scores = score_shot(shot, &dynamics, ctx.weights);
            let better = match &best {
                None => true,
                Some((current, current_scores)) => {
                    scores.overall > current_scores.overall
                        || (scores.overall == current_scores.overall && shot.id < current.id)
                }
            };
            if better {
                best = Some((shot, scores));
            }
        }

        best.map(|(shot, scores)| {
            let threshold = ctx.usability_threshold(shot, point.time);
            let in_point = shot.in_point.max(threshold);
            let out_point = shot.out_point.min(in_point + duration);

            EditDecision {
                id: DecisionId::derive(ctx.strategy, &ctx.segment.name, point.time, &shot.id),
                time: point.time,
                shot_id: shot.id.clone(),
                is_hero_shot: shot.is_hero_shot,
                in_point,
                out_point,
                duration: out_point - in_point,
                confidence: point.confidence,
                flexibility: point.flexibility,
                scores,
                segment_name: ctx.segment.name.clone(),
                applied_weights: *ctx.weights,
                edit_point_type: point.point_type,
                reason: point.reason.clone(),
                musical_context: point.musical_context,
                transition: None,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatcut_models::{EditPointType, SegmentConstraints, ShotQuality};

    fn shot(id: &str, duration: f64, overall: f64, hero: bool) -> Shot {
        Shot {
            id: id.into(),
            start_time: 0.0,
            end_time: duration,
            duration,
            in_point: 0.0,
            out_point: duration,
            usable_from: 0.0,
            stable_from: 0.0,
            quality: ShotQuality {
                sharpness: 0.8,
                shake: 0.1,
                lighting: 0.7,
                composition: 0.7,
                overall_score: overall,
            },
            is_hero_shot: hero,
            hero_shot_score: if hero { 0.9 } else { 0.0 },
        }
    }

    fn segment(name: &str, start: f64, end: f64, is_opening: bool) -> PlannedSegment {
        PlannedSegment {
            name: name.into(),
            label: String::new(),
            start,
            end,
            base_weights: SegmentWeights::balanced(),
            constraints: SegmentConstraints::default(),
            is_opening,
        }
    }

    fn ctx<'a>(segment: &'a PlannedSegment, weights: &'a SegmentWeights) -> SlotContext<'a> {
        SlotContext {
            strategy: Strategy::HybridBalance,
            segment,
            weights,
            opening_stable_window: 3000.0,
        }
    }

    #[test]
    fn test_usage_tracks_runs() {
        let mut usage = ShotUsage::new();
        assert!(usage.can_use("a", 2));
        usage.record("a");
        usage.record("a");
        assert_eq!(usage.run_length(), 2);
        assert!(!usage.can_use("a", 2));
        assert!(usage.can_use("b", 2));

        usage.record("b");
        assert_eq!(usage.run_length(), 1);
        assert!(usage.can_use("a", 2));
        assert_eq!(usage.total("a"), 2);
        assert_eq!(usage.total("c"), 0);
    }

    #[test]
    fn test_picks_highest_score() {
        let shots = vec![shot("low", 5000.0, 0.3, false), shot("high", 5000.0, 0.9, false)];
        let selector = CandidateSelector::new(&shots, &[]);
        let segment = segment("main", 0.0, 10000.0, false);
        let weights = SegmentWeights::balanced();
        let point = EditPoint::new(0.0, 0.8, EditPointType::Beat);

        let decision = selector
            .select(&ctx(&segment, &weights), &point, 2000.0, &ShotUsage::new())
            .unwrap();
        assert_eq!(decision.shot_id, "high");
        assert_eq!(decision.confidence, 0.8);
        assert_eq!(decision.duration, 2000.0);
    }

    #[test]
    fn test_ties_break_on_shot_id() {
        let shots = vec![shot("b", 5000.0, 0.5, false), shot("a", 5000.0, 0.5, false)];
        let selector = CandidateSelector::new(&shots, &[]);
        let segment = segment("main", 0.0, 10000.0, false);
        let weights = SegmentWeights::balanced();
        let point = EditPoint::new(0.0, 0.8, EditPointType::Beat);

        let decision = selector
            .select(&ctx(&segment, &weights), &point, 2000.0, &ShotUsage::new())
            .unwrap();
        assert_eq!(decision.shot_id, "a");
    }

    #[test]
    fn test_rejects_short_shots() {
        let shots = vec![shot("short", 1000.0, 0.9, false)];
        let selector = CandidateSelector::new(&shots, &[]);
        let segment = segment("main", 0.0, 10000.0, false);
        let weights = SegmentWeights::balanced();
        let point = EditPoint::new(0.0, 0.8, EditPointType::Beat);

        assert!(selector
            .select(&ctx(&segment, &weights), &point, 2000.0, &ShotUsage::new())
            .is_none());
    }

    #[test]
    fn test_rejects_shots_with_short_marked_range() {
        let mut trimmed = shot("trimmed", 5000.0, 0.9, false);
        trimmed.out_point = 200.0;
        let shots = vec![trimmed, shot("full", 5000.0, 0.4, false)];
        let selector = CandidateSelector::new(&shots, &[]);
        let segment = segment("main", 0.0, 10000.0, false);
        let weights = SegmentWeights::balanced();
        let point = EditPoint::new(0.0, 0.8, EditPointType::Beat);

        let decision = selector
            .select(&ctx(&segment, &weights), &point, 2000.0, &ShotUsage::new())
            .unwrap();
        assert_eq!(decision.shot_id, "full");
        assert_eq!(decision.out_point - decision.in_point, 2000.0);

        let only_trimmed = &shots[..1];
        let selector = CandidateSelector::new(only_trimmed, &[]);
        assert!(selector
            .select(&ctx(&segment, &weights), &point, 2000.0, &ShotUsage::new())
            .is_none());
    }

    #[test]
    fn test_opening_uses_stable_from() {
        let mut unstable = shot("unstable", 4000.0, 0.9, false);
        unstable.stable_from = 3000.0;
        let shots = vec![unstable];
        let selector = CandidateSelector::new(&shots, &[]);
        let weights = SegmentWeights::balanced();
        let point = EditPoint::new(0.0, 0.8, EditPointType::Beat);

        let opening = segment("hook", 0.0, 3000.0, true);
        assert!(selector
            .select(&ctx(&opening, &weights), &point, 2000.0, &ShotUsage::new())
            .is_none());

        let later = segment("main", 0.0, 10000.0, false);
        let decision = selector
            .select(&ctx(&later, &weights), &point, 2000.0, &ShotUsage::new())
            .unwrap();
        assert_eq!(decision.in_point, 0.0);
    }

    #[test]
    fn test_in_point_starts_at_usability_threshold() {
        let mut late = shot("late", 6000.0, 0.9, false);
        late.usable_from = 1000.0;
        let shots = vec![late];
        let selector = CandidateSelector::new(&shots, &[]);
        let segment = segment("main", 0.0, 10000.0, false);
        let weights = SegmentWeights::balanced();
        let point = EditPoint::new(5000.0, 0.8, EditPointType::Beat);

        let decision = selector
            .select(&ctx(&segment, &weights), &point, 2000.0, &ShotUsage::new())
            .unwrap();
        assert_eq!(decision.in_point, 1000.0);
        assert_eq!(decision.out_point, 3000.0);
        assert_eq!(decision.duration, 2000.0);
    }

    #[test]
    fn test_hero_gating_in_opening() {
        let shots = vec![shot("plain", 5000.0, 1.0, false), shot("hero", 5000.0, 0.0, true)];
        let selector = CandidateSelector::new(&shots, &[]);
        let weights = SegmentWeights::balanced();
        let point = EditPoint::new(0.0, 0.9, EditPointType::Beat);

        let mut opening = segment("hook", 0.0, 3000.0, true);
        opening.constraints.prefer_hero_shots = true;
        let decision = selector
            .select(&ctx(&opening, &weights), &point, 2000.0, &ShotUsage::new())
            .unwrap();
        assert_eq!(decision.shot_id, "hero");
        assert!(decision.is_hero_shot);

        opening.constraints.prefer_hero_shots = false;
        let decision = selector
            .select(&ctx(&opening, &weights), &point, 2000.0, &ShotUsage::new())
            .unwrap();
        assert_eq!(decision.shot_id, "plain");
    }

    #[test]
    fn test_select_segment_skips_short_slots_and_limits_runs() {
        let shots = vec![shot("only", 20000.0, 0.9, false)];
        let selector = CandidateSelector::new(&shots, &[]);
        let mut segment = segment("main", 0.0, 10000.0, false);
        segment.constraints.max_consecutive_same_shot = 2;
        let weights = SegmentWeights::balanced();

        let points = vec![
            EditPoint::new(0.0, 0.9, EditPointType::Beat),
            EditPoint::new(100.0, 0.9, EditPointType::Beat),
            EditPoint::new(2000.0, 0.9, EditPointType::Beat),
            EditPoint::new(4000.0, 0.9, EditPointType::Beat),
            EditPoint::new(6000.0, 0.9, EditPointType::Beat),
        ];
        let refs: Vec<&EditPoint> = points.iter().collect();
        let mut usage = ShotUsage::new();

        let decisions = selector.select_segment(&ctx(&segment, &weights), &refs, &mut usage);
        let times: Vec<f64> = decisions.iter().map(|d| d.time).collect();
        // 0 -> 100 is below the 500ms minimum; the third use of "only" is refused
        assert_eq!(times, vec![100.0, 2000.0]);
        assert_eq!(usage.total("only"), 2);
    }
}
