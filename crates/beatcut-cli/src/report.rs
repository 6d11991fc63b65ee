//! Human-readable run summary.

use std::fmt;

use beatcut_models::{format_ms, snap_to_frame, MatchingResult, QA_CONFIDENCE_THRESHOLD};

/// The summary printed after a run.
///
/// With `fps` set, cut times are snapped to the nearest frame boundary.
pub struct Summary<'a> {
    pub result: &'a MatchingResult,
    pub fps: Option<f64>,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let recommended = result.recommended();

        writeln!(f, "Recommended: {}", result.recommended_pattern)?;
        writeln!(f, "{}", result.recommendation_reason)?;
        writeln!(
            f,
            "Aggregate confidence: {:.3} (gate {:.2}{})",
            recommended.evaluation.aggregate_confidence,
            QA_CONFIDENCE_THRESHOLD,
            if result.meets_confidence_gate() { "" } else { ", NOT MET" }
        )?;

        for pattern in result.patterns.iter() {
            writeln!(
                f,
                "  {:<15} decisions={:<3} confidence={:.3} transitions={:.3} alignment={:.3}",
                pattern.name.as_str(),
                pattern.decisions.len(),
                pattern.evaluation.aggregate_confidence,
                pattern.evaluation.transition_quality,
                pattern.evaluation.musical_alignment,
            )?;
        }

        writeln!(f, "Edit decision list:")?;
        for decision in &recommended.decisions {
            let time = self
                .fps
                .map_or(decision.time, |fps| snap_to_frame(decision.time, fps));
            writeln!(
                f,
                "  {}  {:<12} {:>7.0}ms  conf={:.2}  [{}]",
                format_ms(time),
                decision.shot_id,
                decision.duration,
                decision.confidence,
                decision.segment_name,
            )?;
        }

        for weakness in &result.overall_quality.weaknesses {
            writeln!(f, "Weakness: {}", weakness)?;
        }
        for suggestion in &result.overall_quality.suggestions {
            writeln!(f, "Suggestion: {}", suggestion)?;
        }
        for suggestion in &recommended.improvement_suggestions {
            writeln!(f, "Improve {}: {}", result.recommended_pattern, suggestion)?;
        }

        let integrated = &result.comparison.integrated;
        writeln!(
            f,
            "Integrated timeline: decisions={} confidence={:.3}",
            integrated.decisions.len(),
            integrated.aggregate_confidence,
        )
    }
}

/// Render the summary printed after a run.
pub fn render_summary(result: &MatchingResult, fps: Option<f64>) -> String {
    Summary { result, fps }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatcut_engine::{MatchingConfig, MatchingEngine};
    use beatcut_models::{
        EditPoint, EditPointType, MusicAnalysis, SegmentConfig, SegmentDefinition,
        SegmentWeights, Shot, ShotQuality, VideoAnalysis,
    };

    fn result() -> MatchingResult {
        let segments = SegmentConfig::new().with_segment(
            "main",
            SegmentDefinition::new(0.0, 4000.0, SegmentWeights::balanced()),
        );
        let mut music = MusicAnalysis::new(4000.0);
        music.edit_points = vec![
            EditPoint::new(0.0, 0.9, EditPointType::Beat),
            EditPoint::new(1010.0, 0.9, EditPointType::Onset),
        ];
        let video = VideoAnalysis::new(vec![Shot {
            id: "wide".into(),
            start_time: 0.0,
            end_time: 5000.0,
            duration: 5000.0,
            in_point: 0.0,
            out_point: 5000.0,
            usable_from: 0.0,
            stable_from: 0.0,
            quality: ShotQuality {
                sharpness: 0.8,
                shake: 0.1,
                lighting: 0.7,
                composition: 0.7,
                overall_score: 0.8,
            },
            is_hero_shot: false,
            hero_shot_score: 0.2,
        }]);

        MatchingEngine::new(MatchingConfig::default())
            .with_segments(segments)
            .unwrap()
            .match_analysis(&music, &video)
            .unwrap()
    }

    #[test]
    fn test_summary_carries_reason_and_decisions() {
        let result = result();
        let summary = render_summary(&result, None);

        assert!(summary.contains(&result.recommendation_reason));
        assert!(summary.contains("00:00:00.000  wide"));
        assert!(summary.contains("00:00:01.010  wide"));
    }

    #[test]
    fn test_summary_snaps_to_frames() {
        let summary = render_summary(&result(), Some(25.0));
        // 1010ms is closest to frame 25 at 25fps
        assert!(summary.contains("00:00:01.000  wide"));
    }

    #[test]
    fn test_summary_lists_pattern_suggestions() {
        let mut result = result();
        let strategy = result.recommended_pattern;
        let recommended = match strategy {
            beatcut_models::Strategy::DynamicCut => &mut result.patterns.dynamic_cut,
            beatcut_models::Strategy::NarrativeFlow => &mut result.patterns.narrative_flow,
            beatcut_models::Strategy::HybridBalance => &mut result.patterns.hybrid_balance,
        };
        recommended.improvement_suggestions = vec!["Review shot quality thresholds".into()];

        let summary = Summary {
            result: &result,
            fps: None,
        }
        .to_string();
        assert!(summary.contains(&format!("Improve {}: Review shot quality thresholds", strategy)));
        assert!(summary.contains("Integrated timeline: decisions="));
    }
}
