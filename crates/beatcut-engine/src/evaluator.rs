//! Pattern, segment and segment-boundary evaluation.

use std::collections::{BTreeMap, HashSet};

use beatcut_models::{
    BoundaryEvaluation, EditDecision, EditPointType, PatternEvaluation, SegmentEvaluation,
};

use crate::segment_planner::PlannedSegment;

/// Average confidence below which a segment is flagged.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Maximum change above which an invalid cut still counts as near-valid.
pub const NEAR_VALID_CHANGE: f64 = 0.2;

/// Confidence delta across a boundary that is flagged.
pub const BOUNDARY_CONFIDENCE_DELTA: f64 = 0.3;

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Pattern-level metrics for a finalized decision list.
///
/// `duration` is the track length in milliseconds.
pub fn evaluate_pattern(decisions: &[EditDecision], duration: f64) -> PatternEvaluation {
    let n = decisions.len();

    let aggregate_confidence = mean(decisions.iter().map(|d| d.confidence)).unwrap_or(0.0);
    let avg_shot_duration = mean(decisions.iter().map(|d| d.duration)).unwrap_or(0.0);

    let cut_frequency = if duration > 0.0 {
        n as f64 / (duration / 1000.0)
    } else {
        0.0
    };

    let transition_quality = if n < 2 {
        1.0
    } else {
        let valid = decisions[1..]
            .iter()
            .filter(|d| d.transition.as_ref().map_or(true, |t| t.is_valid()))
            .count();
        valid as f64 / (n - 1) as f64
    };

    let musical_alignment = if n == 0 {
        0.0
    } else {
        let total: f64 = decisions
            .iter()
            .map(|d| {
                let beat = if d.edit_point_type == EditPointType::Beat { 0.3 } else { 0.0 };
                let downbeat = if d.is_downbeat() { 0.2 } else { 0.0 };
                beat + downbeat
            })
            .sum();
        (total / n as f64).min(1.0)
    };

    let visual_flow = if n < 2 {
        1.0
    } else {
        let flow: f64 = decisions[1..]
            .iter()
            .map(|d| match &d.transition {
                None => 1.0,
                Some(t) if t.is_valid() => 1.0,
                Some(t) if t.validation.max_change > NEAR_VALID_CHANGE => 0.5,
                Some(_) => 0.0,
            })
            .sum();
        flow / (n - 1) as f64
    };

    PatternEvaluation {
        aggregate_confidence,
        avg_shot_duration,
        cut_frequency,
        transition_quality,
        musical_alignment,
        visual_flow,
        narrative_cohesion: narrative_cohesion(decisions),
    }
}

/// Share of distinct shots that are reused, doubled and capped at 1.
fn narrative_cohesion(decisions: &[EditDecision]) -> f64 {
    if decisions.is_empty() {
        return 0.0;
    }
    let mut usage: BTreeMap<&str, usize> = BTreeMap::new();
    for decision in decisions {
        *usage.entry(decision.shot_id.as_str()).or_insert(0) += 1;
    }
    let reused = usage.values().filter(|&&count| count > 1).count();
    (2.0 * reused as f64 / usage.len() as f64).min(1.0)
}

/// Evaluate one planned segment.
pub fn evaluate_segment(segment: &PlannedSegment, decisions: &[EditDecision]) -> SegmentEvaluation {
    let in_segment: Vec<&EditDecision> =
        decisions.iter().filter(|d| segment.contains(d.time)).collect();

    let mut issues = Vec::new();
    let mut score = 0.0;

    if in_segment.is_empty() {
        issues.push("No edit decisions in segment".to_string());
    } else {
        let avg_confidence = mean(in_segment.iter().map(|d| d.confidence)).unwrap_or(0.0);
        score += avg_confidence * 0.5;
        if avg_confidence < LOW_CONFIDENCE_THRESHOLD {
            issues.push(format!("Low confidence ({:.2})", avg_confidence));
        }

        if segment.is_opening && segment.constraints.prefer_hero_shots {
            if in_segment.iter().any(|d| d.is_hero_shot) {
                score += 0.3;
            } else {
                issues.push("No hero shot in opening".to_string());
            }
        }

        let avg_duration = mean(in_segment.iter().map(|d| d.duration)).unwrap_or(0.0);
        if avg_duration < segment.constraints.min_shot_duration {
            issues.push("Shots too short".to_string());
        } else if avg_duration > segment.constraints.max_shot_duration {
            issues.push("Shots too long".to_string());
        } else {
            score += 0.2;
        }
    }

    SegmentEvaluation {
        segment_name: segment.name.clone(),
        start_time: segment.start,
        end_time: segment.end,
        score: score.min(1.0),
        issues,
    }
}

pub fn evaluate_segments(
    segments: &[PlannedSegment],
    decisions: &[EditDecision],
) -> Vec<SegmentEvaluation> {
    segments
        .iter()
        .map(|segment| evaluate_segment(segment, decisions))
        .collect()
}

/// Evaluate the hand-off at every boundary between adjacent segments.
///
/// Decisions closer than `window` milliseconds to a boundary are considered.
pub fn evaluate_boundaries(
    segments: &[PlannedSegment],
    decisions: &[EditDecision],
    window: f64,
) -> Vec<BoundaryEvaluation> {
    segments
        .windows(2)
        .map(|pair| {
            let (from, to) = (&pair[0], &pair[1]);
            let boundary = from.end;
            let mut issues = Vec::new();
            let mut quality = 1.0;

            let near: Vec<&EditDecision> = decisions
                .iter()
                .filter(|d| (d.time - boundary).abs() < window)
                .collect();

            if near.is_empty() {
                issues.push("No decisions near segment boundary".to_string());
                quality *= 0.5;
            } else {
                let last_before = near.iter().filter(|d| d.time < boundary).last();
                let first_after = near.iter().find(|d| d.time >= boundary);

                if let (Some(before), Some(after)) = (last_before, first_after) {
                    if before.shot_id == after.shot_id {
                        issues.push("Same shot across segment boundary".to_string());
                        quality *= 0.8;
                    }
                    if (before.confidence - after.confidence).abs() > BOUNDARY_CONFIDENCE_DELTA {
                        issues.push("Large confidence change at boundary".to_string());
                        quality *= 0.9;
                    }
                }
            }

            BoundaryEvaluation {
                from: from.name.clone(),
                to: to.name.clone(),
                time: boundary,
                quality,
                issues,
            }
        })
        .collect()
}

/// Actionable suggestions for one pattern.
///
/// Thresholds apply to the pattern evaluation; every segment with issues adds
/// a `"<segment>: <issue>, <issue>"` line. Duplicates are dropped, first
/// occurrence wins.
pub fn improvement_suggestions(
    evaluation: &PatternEvaluation,
    segments: &[SegmentEvaluation],
) -> Vec<String> {
    let mut suggestions: Vec<String> = Vec::new();

    if evaluation.aggregate_confidence < 0.7 {
        suggestions.push("Consider adjusting edit point detection sensitivity".into());
        suggestions.push("Review shot quality thresholds".into());
    }
    if evaluation.transition_quality < 0.6 {
        suggestions.push("Increase shot variety to meet 30% change rule".into());
        suggestions.push("Consider using more diverse camera angles".into());
    }
    if evaluation.musical_alignment < 0.5 {
        suggestions.push("Improve beat detection accuracy".into());
        suggestions.push("Consider manual beat marking for complex sections".into());
    }
    if evaluation.cut_frequency < 0.5 {
        suggestions.push("Cuts may be too sparse - consider adding more edit points".into());
    } else if evaluation.cut_frequency > 3.0 {
        suggestions.push("Cuts may be too frequent - consider longer shots".into());
    }
    for segment in segments.iter().filter(|s| !s.issues.is_empty()) {
        suggestions.push(format!("{}: {}", segment.segment_name, segment.issues.join(", ")));
    }

    let mut seen = HashSet::new();
    suggestions.retain(|s| seen.insert(s.clone()));
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatcut_models::{
        ChangeMagnitudes, DecisionId, DecisionScores, DecisionTransition, MusicalContext,
        SegmentConstraints, SegmentWeights, TransitionValidation,
    };

    fn decision(shot: &str, time: f64, duration: f64, confidence: f64) -> EditDecision {
        EditDecision {
            id: DecisionId::from(format!("{}@{}", shot, time).as_str()),
            time,
            shot_id: shot.into(),
            is_hero_shot: false,
            in_point: 0.0,
            out_point: duration,
            duration,
            confidence,
            flexibility: 0.0,
            scores: DecisionScores::default(),
            segment_name: "main".into(),
            applied_weights: SegmentWeights::balanced(),
            edit_point_type: EditPointType::Onset,
            reason: String::new(),
            musical_context: None,
            transition: None,
        }
    }

    fn with_transition(mut decision: EditDecision, from: &str, max_change: f64) -> EditDecision {
        let validation = TransitionValidation::from_changes(
            from,
            decision.shot_id.clone(),
            ChangeMagnitudes {
                size: max_change,
                ..ChangeMagnitudes::default()
            },
        );
        decision.transition = Some(DecisionTransition {
            from_shot: from.into(),
            validation,
            improvement: None,
        });
        decision
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

    #[test]
    fn test_empty_pattern() {
        let evaluation = evaluate_pattern(&[], 60000.0);
        assert_eq!(evaluation.aggregate_confidence, 0.0);
        assert_eq!(evaluation.avg_shot_duration, 0.0);
        assert_eq!(evaluation.cut_frequency, 0.0);
        assert_eq!(evaluation.transition_quality, 1.0);
        assert_eq!(evaluation.musical_alignment, 0.0);
        assert_eq!(evaluation.visual_flow, 1.0);
        assert_eq!(evaluation.narrative_cohesion, 0.0);
    }

    #[test]
    fn test_zero_duration_has_no_cut_frequency() {
        let evaluation = evaluate_pattern(&[decision("a", 0.0, 1000.0, 0.9)], 0.0);
        assert_eq!(evaluation.cut_frequency, 0.0);
    }

    #[test]
    fn test_aggregate_confidence_is_mean() {
        let decisions = vec![
            decision("a", 0.0, 1000.0, 0.9),
            decision("b", 1000.0, 1000.0, 0.8),
            decision("c", 2000.0, 2000.0, 0.7),
        ];
        let evaluation = evaluate_pattern(&decisions, 10000.0);
        assert!((evaluation.aggregate_confidence - 0.8).abs() < 1e-9);
        assert!((evaluation.avg_shot_duration - 4000.0 / 3.0).abs() < 1e-9);
        assert!((evaluation.cut_frequency - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_transition_quality_and_visual_flow() {
        let decisions = vec![
            decision("a", 0.0, 1000.0, 0.9),
            with_transition(decision("b", 1000.0, 1000.0, 0.9), "a", 0.5),
            with_transition(decision("c", 2000.0, 1000.0, 0.9), "b", 0.25),
            with_transition(decision("d", 3000.0, 1000.0, 0.9), "c", 0.1),
            decision("e", 4000.0, 1000.0, 0.9),
        ];
        let evaluation = evaluate_pattern(&decisions, 5000.0);

        // b valid, c invalid, d invalid, e unlinked counts as valid
        assert!((evaluation.transition_quality - 0.5).abs() < 1e-12);
        // 1 + 0.5 + 0 + 1
        assert!((evaluation.visual_flow - 2.5 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_musical_alignment() {
        let mut beat = decision("a", 0.0, 1000.0, 0.9);
        beat.edit_point_type = EditPointType::Beat;
        beat.musical_context = Some(MusicalContext {
            is_downbeat: true,
            measure_position: 0.0,
            phrase_position: 0.0,
        });
        let onset = decision("b", 1000.0, 1000.0, 0.9);

        let evaluation = evaluate_pattern(&[beat, onset], 2000.0);
        assert!((evaluation.musical_alignment - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_narrative_cohesion() {
        let decisions = vec![
            decision("a", 0.0, 1000.0, 0.9),
            decision("b", 1000.0, 1000.0, 0.9),
            decision("a", 2000.0, 1000.0, 0.9),
            decision("c", 3000.0, 1000.0, 0.9),
        ];
        // One of three shots reused
        assert!((narrative_cohesion(&decisions) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_segment_issue() {
        let evaluation = evaluate_segment(&segment("main", 3000.0, 57000.0, false), &[]);
        assert_eq!(evaluation.score, 0.0);
        assert_eq!(evaluation.issues, vec!["No edit decisions in segment"]);
    }

    #[test]
    fn test_segment_low_confidence_and_short_shots() {
        let decisions = vec![decision("a", 3000.0, 200.0, 0.5)];
        let evaluation = evaluate_segment(&segment("main", 3000.0, 57000.0, false), &decisions);
        assert_eq!(evaluation.issues, vec!["Low confidence (0.50)", "Shots too short"]);
        assert!((evaluation.score - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_opening_hero_check() {
        let mut opening = segment("hook", 0.0, 3000.0, true);
        opening.constraints.prefer_hero_shots = true;

        let plain = vec![decision("a", 0.0, 3000.0, 0.9)];
        let evaluation = evaluate_segment(&opening, &plain);
        assert!(evaluation.issues.contains(&"No hero shot in opening".to_string()));
        assert!((evaluation.score - 0.65).abs() < 1e-12);

        let mut hero = decision("h", 0.0, 3000.0, 0.9);
        hero.is_hero_shot = true;
        let evaluation = evaluate_segment(&opening, &[hero]);
        assert!(evaluation.issues.is_empty());
        assert!((evaluation.score - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_evaluation() {
        let segments = vec![
            segment("hook", 0.0, 3000.0, true),
            segment("main", 3000.0, 57000.0, false),
            segment("outro", 57000.0, 60000.0, false),
        ];
        let decisions = vec![
            decision("a", 2800.0, 200.0, 0.9),
            decision("a", 3000.0, 1000.0, 0.5),
        ];

        let evaluations = evaluate_boundaries(&segments, &decisions, 500.0);
        assert_eq!(evaluations.len(), 2);

        let hook_main = &evaluations[0];
        assert_eq!(hook_main.time, 3000.0);
        assert_eq!(
            hook_main.issues,
            vec!["Same shot across segment boundary", "Large confidence change at boundary"]
        );
        assert!((hook_main.quality - 0.72).abs() < 1e-12);

        let main_outro = &evaluations[1];
        assert_eq!(main_outro.issues, vec!["No decisions near segment boundary"]);
        assert_eq!(main_outro.quality, 0.5);
    }

    #[test]
    fn test_improvement_suggestions() {
        let weak = PatternEvaluation {
            aggregate_confidence: 0.5,
            transition_quality: 0.4,
            musical_alignment: 0.2,
            cut_frequency: 4.0,
            ..PatternEvaluation::default()
        };
        let segments = vec![
            SegmentEvaluation {
                segment_name: "hook".into(),
                start_time: 0.0,
                end_time: 3000.0,
                score: 0.4,
                issues: vec!["Low confidence (0.50)".into(), "Shots too short".into()],
            },
            SegmentEvaluation {
                segment_name: "main".into(),
                start_time: 3000.0,
                end_time: 60000.0,
                score: 1.0,
                issues: Vec::new(),
            },
            SegmentEvaluation {
                segment_name: "hook".into(),
                start_time: 0.0,
                end_time: 3000.0,
                score: 0.4,
                issues: vec!["Low confidence (0.50)".into(), "Shots too short".into()],
            },
        ];

        let suggestions = improvement_suggestions(&weak, &segments);
        assert_eq!(
            suggestions,
            vec![
                "Consider adjusting edit point detection sensitivity",
                "Review shot quality thresholds",
                "Increase shot variety to meet 30% change rule",
                "Consider using more diverse camera angles",
                "Improve beat detection accuracy",
                "Consider manual beat marking for complex sections",
                "Cuts may be too frequent - consider longer shots",
                "hook: Low confidence (0.50), Shots too short",
            ]
        );
    }

    #[test]
    fn test_strong_pattern_has_no_suggestions() {
        let strong = PatternEvaluation {
            aggregate_confidence: 0.9,
            transition_quality: 0.9,
            musical_alignment: 0.6,
            cut_frequency: 1.0,
            ..PatternEvaluation::default()
        };
        assert!(improvement_suggestions(&strong, &[]).is_empty());

        let sparse = PatternEvaluation {
            cut_frequency: 0.2,
            ..strong
        };
        assert_eq!(
            improvement_suggestions(&sparse, &[]),
            vec!["Cuts may be too sparse - consider adding more edit points"]
        );
    }
}
