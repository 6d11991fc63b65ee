//! Shot scoring against one time slot.
//!
//! Four components, each in 0.0-1.0, combined by the slot's weights:
//!
//! | Component | Driven by |
//! |-----------|-----------|
//! | visual    | overall quality and hero score |
//! | sync      | intensity/complexity vs. quality/hero score |
//! | semantic  | valence vs. lighting, arousal vs. composition |
//! | stability | camera shake |

use beatcut_models::{DecisionScores, RelativeDynamics, SegmentWeights, Shot};

/// A dynamics sample closer than this to the slot time is used as-is (ms).
pub const DYNAMICS_MATCH_WINDOW_MS: f64 = 100.0;

/// Dynamics sample for `time`.
///
/// The first sample within [`DYNAMICS_MATCH_WINDOW_MS`], else the first
/// sample, else a neutral mid-scale sample.
pub fn dynamics_at(dynamics: &[RelativeDynamics], time: f64) -> RelativeDynamics {
    dynamics
        .iter()
        .find(|d| (d.time - time).abs() < DYNAMICS_MATCH_WINDOW_MS)
        .or_else(|| dynamics.first())
        .copied()
        .unwrap_or_else(|| RelativeDynamics::neutral(time))
}

/// Score `shot` against the music at one instant.
pub fn score_shot(
    shot: &Shot,
    dynamics: &RelativeDynamics,
    weights: &SegmentWeights,
) -> DecisionScores {
    let quality = &shot.quality;

    let visual = clamp01(0.6 * quality.overall_score + 0.4 * shot.hero_shot_score);

    let sync = clamp01(
        ((1.0 - (dynamics.intensity - quality.overall_score).abs())
            + (1.0 - (dynamics.complexity - shot.hero_shot_score).abs()))
            / 2.0,
    );

    let valence_term = if dynamics.emotional_valence > 0.0 {
        quality.lighting
    } else {
        1.0 - quality.lighting
    };
    let semantic = clamp01(
        (valence_term + (1.0 - (dynamics.arousal - quality.composition).abs())) / 2.0,
    );

    let stability = clamp01(1.0 - quality.shake);

    let overall = clamp01(
        visual * weights.visual
            + sync * weights.sync
            + semantic * weights.semantic
            + stability * weights.stability,
    );

    DecisionScores {
        visual,
        sync,
        semantic,
        stability,
        overall,
    }
}

fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
