//! The matching engine entry point.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        MatchingEngine                            │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  plan_segments(config, duration)                                 │
//! │        │                                                         │
//! │        ├──► dynamic_cut    ─┐                                    │
//! │        ├──► narrative_flow ─┼─ rayon, one ShotUsage per run      │
//! │        └──► hybrid_balance ─┘                                    │
//! │                  │                                               │
//! │                  ▼                                               │
//! │  recommend ─► overall_quality ─► compare ─► explain data         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Instant;

use beatcut_models::{
    EditPattern, MatchingResult, MusicAnalysis, PatternSet, SegmentConfig, Strategy,
    VideoAnalysis,
};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::comparison::compare_patterns;
use crate::config::MatchingConfig;
use crate::deadline::Deadline;
use crate::error::{EngineResult, MatchingError};
use crate::generator::{generate_pattern, GenerationContext};
use crate::metrics;
use crate::recommendation::{build_explain_data, overall_quality, recommend};
use crate::segment_planner::{plan_segments, validate_segment_config};
use crate::transition_linker::TransitionIndex;

/// Time-based edit matching engine.
///
/// Holds the run configuration and the loaded segment configuration. A
/// single engine can serve any number of `match_analysis` calls.
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    config: MatchingConfig,
    segment_config: Option<SegmentConfig>,
}

impl MatchingEngine {
    /// Create an engine with no segment configuration loaded yet.
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            config,
            segment_config: None,
        }
    }

    /// Validate and load a segment configuration.
    pub fn load_segments(&mut self, segment_config: SegmentConfig) -> EngineResult<()> {
        validate_segment_config(&segment_config)?;
        info!(
            segments = segment_config.segments.len(),
            pattern_overrides = segment_config.patterns.len(),
            "Loaded segment configuration"
        );
        self.segment_config = Some(segment_config);
        Ok(())
    }

    /// Builder form of [`MatchingEngine::load_segments`].
    pub fn with_segments(mut self, segment_config: SegmentConfig) -> EngineResult<Self> {
        self.load_segments(segment_config)?;
        Ok(self)
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn segment_config(&self) -> Option<&SegmentConfig> {
        self.segment_config.as_ref()
    }

    /// Run the full matching pipeline.
    ///
    /// Either returns all three patterns with a recommendation or fails as a
    /// whole; no partial result is produced.
    pub fn match_analysis(
        &self,
        music: &MusicAnalysis,
        video: &VideoAnalysis,
    ) -> EngineResult<MatchingResult> {
        let started = Instant::now();
        let result = self.run(music, video);

        match &result {
            Ok(matching) => {
                let elapsed = started.elapsed().as_secs_f64();
                metrics::record_match(elapsed);
                info!(
                    recommended = %matching.recommended_pattern,
                    decisions = matching.recommended().decisions.len(),
                    aggregate_confidence = matching.explain_data.aggregate_confidence,
                    elapsed_ms = elapsed * 1000.0,
                    "Matching complete"
                );
                if !matching.meets_confidence_gate() {
                    warn!(
                        aggregate_confidence = matching.explain_data.aggregate_confidence,
                        threshold = beatcut_models::QA_CONFIDENCE_THRESHOLD,
                        "Recommended pattern is below the QA confidence gate"
                    );
                }
            }
            Err(e) => {
                let reason = match e {
                    MatchingError::MatchingTimeout(_) => "timeout",
                    e if e.is_config_error() => "configuration",
                    _ => "input",
                };
                metrics::record_match_failure(reason);
                warn!(error = %e, "Matching failed");
            }
        }

        result
    }

    fn run(&self, music: &MusicAnalysis, video: &VideoAnalysis) -> EngineResult<MatchingResult> {
        let deadline = Deadline::new(self.config.timeout);
        let segment_config = self
            .segment_config
            .as_ref()
            .ok_or(MatchingError::ConfigMissing)?;
        let segments = plan_segments(Some(segment_config), music.duration)?;

        info!(
            duration_ms = music.duration,
            segments = segments.len(),
            edit_points = music.edit_points.len(),
            shots = video.shots.len(),
            transitions = video.transition_validations.len(),
            "Starting edit matching"
        );

        let transitions = TransitionIndex::new(&video.transition_validations);
        let ctx = GenerationContext::new(
            &self.config,
            segment_config,
            &segments,
            music,
            video,
            &transitions,
        );

        let generated: Vec<EditPattern> = if self.config.parallel_strategies {
            Strategy::ALL
                .par_iter()
                .map(|&strategy| generate_pattern(&ctx, strategy, &deadline))
                .collect::<EngineResult<Vec<_>>>()?
        } else {
            Strategy::ALL
                .iter()
                .map(|&strategy| generate_pattern(&ctx, strategy, &deadline))
                .collect::<EngineResult<Vec<_>>>()?
        };
        deadline.check()?;

        let patterns = into_pattern_set(generated)?;
        for pattern in patterns.iter() {
            metrics::record_pattern(pattern);
        }

        let recommendation = recommend(&patterns);
        metrics::record_recommendation(recommendation.strategy);

        let overall_quality = overall_quality(&patterns);
        for weakness in &overall_quality.weaknesses {
            warn!(weakness = %weakness, "Pattern quality shortfall");
        }

        let comparison = compare_patterns(
            &patterns,
            self.config.comparison_bucket,
            self.config.min_trimmed_duration,
        );
        let explain_data = build_explain_data(
            patterns.get(recommendation.strategy),
            &segments,
            segment_config,
        );

        Ok(MatchingResult {
            patterns,
            recommended_pattern: recommendation.strategy,
            recommendation_reason: recommendation.reason,
            overall_quality,
            comparison,
            explain_data,
        })
    }

    /// Run matching on tokio's blocking pool, bounded by the configured
    /// timeout.
    pub async fn match_async(
        self: Arc<Self>,
        music: Arc<MusicAnalysis>,
        video: Arc<VideoAnalysis>,
    ) -> EngineResult<MatchingResult> {
        let timeout = self.config.timeout;
        let task = tokio::task::spawn_blocking(move || self.match_analysis(&music, &video));

        let joined = match timeout {
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| MatchingError::MatchingTimeout(limit))?,
            None => task.await,
        };

        joined.map_err(|e| MatchingError::TaskFailed(e.to_string()))?
    }
}

/// Collect generated patterns (in strategy order) into a [`PatternSet`].
fn into_pattern_set(patterns: Vec<EditPattern>) -> EngineResult<PatternSet> {
    let mut iter = patterns.into_iter();
    let mut next = |strategy: Strategy| {
        iter.next()
            .filter(|p| p.name == strategy)
            .ok_or_else(|| {
                MatchingError::TaskFailed(format!("missing pattern for {}", strategy))
            })
    };

    Ok(PatternSet {
        dynamic_cut: next(Strategy::DynamicCut)?,
        narrative_flow: next(Strategy::NarrativeFlow)?,
        hybrid_balance: next(Strategy::HybridBalance)?,
    })
}
