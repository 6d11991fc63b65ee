//! Recommendation, overall quality and the explain payload.

use std::collections::BTreeMap;

use beatcut_models::{
    format_ms, DecisionContext, EditPattern, ExplainData, ExplainDecision, ExplainStatistics,
    OverallQuality, PatternSet, QualityMetrics, SegmentAnalysis, SegmentConfig,
    SegmentPerformance, Strategy, EXPLAIN_VERSION, QA_CONFIDENCE_THRESHOLD,
};

use crate::segment_planner::PlannedSegment;

/// Reason used when an edit point carried none.
const FALLBACK_REASON: &str = "Manual selection";

/// The recommended strategy and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub strategy: Strategy,
    pub score: f64,
    pub reason: String,
}

/// Pick the best-scoring pattern. Ties resolve in strategy order.
pub fn recommend(patterns: &PatternSet) -> Recommendation {
    let mut best_strategy = Strategy::ALL[0];
    let mut best_score = patterns.get(best_strategy).recommendation_score();
    for strategy in Strategy::ALL.into_iter().skip(1) {
        let score = patterns.get(strategy).recommendation_score();
        if score > best_score {
            best_strategy = strategy;
            best_score = score;
        }
    }

    let evaluation = &patterns.get(best_strategy).evaluation;
    let mut reason = format!("Highest overall score ({:.2})", best_score);
    if evaluation.aggregate_confidence >= QA_CONFIDENCE_THRESHOLD {
        reason.push_str(". Meets confidence threshold.");
    }
    if evaluation.musical_alignment > 0.8 {
        reason.push_str(" Excellent music synchronization.");
    }
    if evaluation.transition_quality > 0.9 {
        reason.push_str(" Smooth transitions.");
    }

    Recommendation {
        strategy: best_strategy,
        score: best_score,
        reason,
    }
}

/// Strengths, weaknesses and suggestions across all three patterns.
pub fn overall_quality(patterns: &PatternSet) -> OverallQuality {
    let count = Strategy::ALL.len() as f64;
    let avg = |metric: fn(&EditPattern) -> f64| patterns.iter().map(metric).sum::<f64>() / count;

    let avg_confidence = avg(|p| p.evaluation.aggregate_confidence);
    let avg_transition = avg(|p| p.evaluation.transition_quality);
    let avg_alignment = avg(|p| p.evaluation.musical_alignment);

    let mut quality = OverallQuality {
        score: (avg_confidence + avg_transition + avg_alignment) / 3.0,
        ..OverallQuality::default()
    };

    if avg_confidence >= QA_CONFIDENCE_THRESHOLD {
        quality
            .strengths
            .push("High confidence in edit decisions".to_string());
    }
    if avg_transition > 0.8 {
        quality
            .strengths
            .push("Good transition quality (30% rule compliance)".to_string());
    }
    if avg_alignment > 0.7 {
        quality
            .strengths
            .push("Strong musical synchronization".to_string());
    }

    if avg_confidence < 0.7 {
        quality.weaknesses.push("Low overall confidence".to_string());
        quality
            .suggestions
            .push("Consider adjusting edit point sensitivity".to_string());
    }
    if avg_transition < 0.6 {
        quality.weaknesses.push("Poor transition quality".to_string());
        quality
            .suggestions
            .push("Review shot selection for better visual variety".to_string());
    }
    if avg_alignment < 0.5 {
        quality.weaknesses.push("Weak musical alignment".to_string());
        quality
            .suggestions
            .push("Increase beat detection sensitivity".to_string());
    }

    quality
}

/// Build the explain payload for the recommended pattern.
///
/// `generated_at` is left unset so identical inputs serialize identically.
pub fn build_explain_data(
    pattern: &EditPattern,
    segments: &[PlannedSegment],
    segment_config: &SegmentConfig,
) -> ExplainData {
    let evaluation = &pattern.evaluation;
    let modifiers = segment_config.modifiers_for(pattern.name);

    let decisions = pattern
        .decisions
        .iter()
        .map(|d| ExplainDecision {
            id: d.id.clone(),
            time: d.time,
            timecode: format_ms(d.time),
            shot: d.shot_id.clone(),
            confidence: d.confidence,
            reason: if d.reason.is_empty() {
                FALLBACK_REASON.to_string()
            } else {
                d.reason.clone()
            },
            scores: d.scores,
            context: DecisionContext {
                segment: d.segment_name.clone(),
                musical_context: d.musical_context,
                transition: d.transition.clone(),
            },
        })
        .collect();

    let quality_metrics = QualityMetrics {
        music_sync: evaluation.musical_alignment,
        visual_flow: evaluation.visual_flow,
        narrative_coherence: evaluation.narrative_cohesion,
        technical_quality: evaluation.aggregate_confidence,
        thirty_percent_compliance: evaluation.transition_quality,
    };

    let segment_analysis = pattern
        .segment_evaluations
        .iter()
        .map(|se| {
            let applied_weights = segments
                .iter()
                .find(|s| s.name == se.segment_name)
                .map(|s| s.base_weights.modified_by(&modifiers))
                .unwrap_or_default();
            SegmentAnalysis {
                segment: se.segment_name.clone(),
                time_range: [se.start_time, se.end_time],
                applied_weights,
                performance: SegmentPerformance {
                    target_score: 1.0,
                    actual_score: se.score,
                    gap: 1.0 - se.score,
                },
            }
        })
        .collect();

    let mut shot_usage = BTreeMap::new();
    let mut edit_point_types = BTreeMap::new();
    for decision in &pattern.decisions {
        *shot_usage.entry(decision.shot_id.clone()).or_insert(0) += 1;
        *edit_point_types
            .entry(decision.edit_point_type.as_str().to_string())
            .or_insert(0) += 1;
    }

    let avg_flexibility = if pattern.decisions.is_empty() {
        0.0
    } else {
        pattern.decisions.iter().map(|d| d.flexibility).sum::<f64>()
            / pattern.decisions.len() as f64
    };

    ExplainData {
        version: EXPLAIN_VERSION.to_string(),
        generated_at: None,
        aggregate_confidence: evaluation.aggregate_confidence,
        decisions,
        quality_metrics,
        segment_analysis,
        statistics: ExplainStatistics {
            total_decisions: pattern.decisions.len(),
            avg_confidence: evaluation.aggregate_confidence,
            avg_flexibility,
            shot_usage,
            edit_point_types,
        },
    }
}
