//! Cross-pattern comparison.
//!
//! Decisions from all patterns are grouped into fixed-size time buckets. A
//! bucket where every pattern cut to the same shot is a consensus point;
//! anything else is a difference. The same buckets drive the integrated
//! pattern, which keeps the best-scoring decision of each bucket.

use std::collections::{BTreeMap, HashMap};

use beatcut_models::{
    ConsensusPoint, DecisionId, EditDecision, IntegratedPattern, PatternComparison,
    PatternDifference, PatternSet, Strategy,
};

use crate::optimizer::resolve_conflicts;

fn bucket_size(bucket_ms: f64) -> f64 {
    if bucket_ms > 0.0 {
        bucket_ms
    } else {
        100.0
    }
}

/// Share of the integration score a strategy carries.
pub fn integration_weight(strategy: Strategy) -> f64 {
    match strategy {
        Strategy::DynamicCut => 0.33,
        Strategy::NarrativeFlow => 0.33,
        Strategy::HybridBalance => 0.34,
    }
}

/// Merge the three patterns into one timeline.
///
/// Within each bucket the decision maximizing
/// `0.4·confidence + 0.3·overall + 0.2·pattern confidence + 0.1·strategy weight`
/// wins, ties going to the earlier strategy. The winners are put in time
/// order and made non-overlapping the way the optimizer does it.
pub fn integrate_patterns(
    patterns: &PatternSet,
    bucket_ms: f64,
    min_duration: f64,
) -> IntegratedPattern {
    let bucket_ms = bucket_size(bucket_ms);

    let mut best: BTreeMap<i64, (f64, Strategy, &EditDecision)> = BTreeMap::new();
    for pattern in patterns.iter() {
        let pattern_confidence = pattern.evaluation.aggregate_confidence;
        for decision in &pattern.decisions {
            let key = (decision.time / bucket_ms).floor() as i64;
            let score = decision.confidence * 0.4
                + decision.scores.overall * 0.3
                + pattern_confidence * 0.2
                + integration_weight(pattern.name) * 0.1;
            let better = best
                .get(&key)
                .map_or(true, |(current, _, _)| score > *current);
            if better {
                best.insert(key, (score, pattern.name, decision));
            }
        }
    }

    let origin: HashMap<&DecisionId, Strategy> = best
        .values()
        .map(|(_, strategy, decision)| (&decision.id, *strategy))
        .collect();

    let mut picked: Vec<EditDecision> = best
        .values()
        .map(|(_, _, decision)| (*decision).clone())
        .collect();
    picked.sort_by(|a, b| a.time.total_cmp(&b.time));
    let (decisions, _) = resolve_conflicts(picked, min_duration);

    let mut contributions: BTreeMap<String, usize> = BTreeMap::new();
    for decision in &decisions {
        if let Some(strategy) = origin.get(&decision.id) {
            *contributions.entry(strategy.as_str().to_string()).or_insert(0) += 1;
        }
    }

    let aggregate_confidence = if decisions.is_empty() {
        0.0
    } else {
        decisions.iter().map(|d| d.confidence).sum::<f64>() / decisions.len() as f64
    };

    IntegratedPattern {
        decisions,
        aggregate_confidence,
        contributions,
    }
}

/// Compare the three patterns using buckets of `bucket_ms` milliseconds.
///
/// `min_duration` is the floor below which an integrated decision trimmed by
/// an overlap is dropped.
pub fn compare_patterns(
    patterns: &PatternSet,
    bucket_ms: f64,
    min_duration: f64,
) -> PatternComparison {
    let bucket_ms = bucket_size(bucket_ms);

    // bucket index -> (strategy, shot) in strategy order
    let mut buckets: BTreeMap<i64, Vec<(Strategy, &str)>> = BTreeMap::new();
    for pattern in patterns.iter() {
        for decision in &pattern.decisions {
            let key = (decision.time / bucket_ms).floor() as i64;
            buckets
                .entry(key)
                .or_default()
                .push((pattern.name, decision.shot_id.as_str()));
        }
    }

    let mut comparison = PatternComparison::default();
    let mut agreed = 0usize;

    for (key, entries) in &buckets {
        let time = *key as f64 * bucket_ms;

        let mut strategies: Vec<Strategy> = Vec::new();
        let mut shots: Vec<&str> = Vec::new();
        for (strategy, shot) in entries {
            if !strategies.contains(strategy) {
                strategies.push(*strategy);
            }
            if !shots.contains(shot) {
                shots.push(*shot);
            }
        }

        if strategies.len() == Strategy::ALL.len() {
            if shots.len() == 1 {
                agreed += 1;
                comparison.consensus.push(ConsensusPoint {
                    time,
                    shot_id: shots[0].to_string(),
                });
            } else {
                comparison.differences.push(PatternDifference {
                    time,
                    patterns: strategies,
                    reason: format!("Different shots selected: {}", shots.join(", ")),
                });
            }
        } else {
            comparison.differences.push(PatternDifference {
                time,
                patterns: strategies,
                reason: "Not all patterns have decision at this time".to_string(),
            });
        }
    }

    comparison.similarity = if buckets.is_empty() {
        0.0
    } else {
        agreed as f64 / buckets.len() as f64
    };
    comparison.integrated = integrate_patterns(patterns, bucket_ms, min_duration);
    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatcut_models::{
        DecisionId, DecisionScores, EditDecision, EditPattern, EditPointType,
        OptimizationSummary, PatternEvaluation, SegmentWeights,
    };

    fn decision(shot: &str, time: f64) -> EditDecision {
        EditDecision {
            id: DecisionId::from(shot),
            time,
            shot_id: shot.into(),
            is_hero_shot: false,
            in_point: 0.0,
            out_point: 500.0,
            duration: 500.0,
            confidence: 0.9,
            flexibility: 0.0,
            scores: DecisionScores::default(),
            segment_name: "main".into(),
            applied_weights: SegmentWeights::balanced(),
            edit_point_type: EditPointType::Beat,
            reason: String::new(),
            musical_context: None,
            transition: None,
        }
    }

    fn pattern(name: Strategy, decisions: Vec<EditDecision>) -> EditPattern {
        EditPattern {
            name,
            description: String::new(),
            decisions,
            evaluation: PatternEvaluation::default(),
            segment_evaluations: Vec::new(),
            boundary_evaluations: Vec::new(),
            optimization: OptimizationSummary::default(),
            improvement_suggestions: Vec::new(),
        }
    }

    #[test]
    fn test_consensus_and_differences() {
        let patterns = PatternSet {
            dynamic_cut: pattern(
                Strategy::DynamicCut,
                vec![decision("a", 0.0), decision("b", 1000.0), decision("c", 2000.0)],
            ),
            narrative_flow: pattern(
                Strategy::NarrativeFlow,
                vec![decision("a", 50.0), decision("x", 1000.0)],
            ),
            hybrid_balance: pattern(
                Strategy::HybridBalance,
                vec![decision("a", 99.0), decision("b", 1010.0)],
            ),
        };

        let comparison = compare_patterns(&patterns, 100.0, 500.0);

        assert_eq!(
            comparison.consensus,
            vec![ConsensusPoint {
                time: 0.0,
                shot_id: "a".into()
            }]
        );
        assert_eq!(comparison.differences.len(), 2);
        assert_eq!(comparison.differences[0].time, 1000.0);
        assert_eq!(comparison.differences[0].reason, "Different shots selected: b, x");
        assert_eq!(
            comparison.differences[1].reason,
            "Not all patterns have decision at this time"
        );
        assert_eq!(comparison.differences[1].patterns, vec![Strategy::DynamicCut]);
        assert!((comparison.similarity - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_patterns_have_zero_similarity() {
        let patterns = PatternSet {
            dynamic_cut: pattern(Strategy::DynamicCut, Vec::new()),
            narrative_flow: pattern(Strategy::NarrativeFlow, Vec::new()),
            hybrid_balance: pattern(Strategy::HybridBalance, Vec::new()),
        };
        let comparison = compare_patterns(&patterns, 100.0, 500.0);
        assert_eq!(comparison.similarity, 0.0);
        assert!(comparison.consensus.is_empty());
        assert!(comparison.differences.is_empty());
        assert!(comparison.integrated.decisions.is_empty());
        assert_eq!(comparison.integrated.aggregate_confidence, 0.0);
    }

    fn scored(shot: &str, time: f64, confidence: f64, overall: f64) -> EditDecision {
        let mut decision = decision(shot, time);
        decision.confidence = confidence;
        decision.scores.overall = overall;
        decision
    }

    #[test]
    fn test_integrated_pattern_takes_best_per_bucket() {
        let patterns = PatternSet {
            dynamic_cut: pattern(
                Strategy::DynamicCut,
                vec![scored("d0", 0.0, 0.6, 0.5), scored("d1", 1000.0, 0.9, 0.9)],
            ),
            narrative_flow: pattern(
                Strategy::NarrativeFlow,
                vec![scored("n0", 20.0, 0.9, 0.8), scored("n1", 1050.0, 0.5, 0.5)],
            ),
            hybrid_balance: pattern(
                Strategy::HybridBalance,
                vec![scored("h2", 2000.0, 0.7, 0.7)],
            ),
        };

        let integrated = integrate_patterns(&patterns, 100.0, 500.0);
        let shots: Vec<&str> = integrated.decisions.iter().map(|d| d.shot_id.as_str()).collect();
        assert_eq!(shots, vec!["n0", "d1", "h2"]);
        assert_eq!(integrated.contributions.get("dynamic_cut"), Some(&1));
        assert_eq!(integrated.contributions.get("narrative_flow"), Some(&1));
        assert_eq!(integrated.contributions.get("hybrid_balance"), Some(&1));
        assert!((integrated.aggregate_confidence - (0.9 + 0.9 + 0.7) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_integrated_ties_go_to_earlier_strategy() {
        let patterns = PatternSet {
            dynamic_cut: pattern(Strategy::DynamicCut, vec![scored("d", 0.0, 0.8, 0.8)]),
            narrative_flow: pattern(Strategy::NarrativeFlow, vec![scored("n", 0.0, 0.8, 0.8)]),
            hybrid_balance: pattern(Strategy::HybridBalance, Vec::new()),
        };

        let integrated = integrate_patterns(&patterns, 100.0, 500.0);
        assert_eq!(integrated.decisions.len(), 1);
        assert_eq!(integrated.decisions[0].shot_id, "d");
    }

    #[test]
    fn test_integrated_decisions_do_not_overlap() {
        let mut long = scored("long", 0.0, 0.9, 0.9);
        long.duration = 1500.0;
        long.out_point = 1500.0;
        let patterns = PatternSet {
            dynamic_cut: pattern(Strategy::DynamicCut, vec![long]),
            narrative_flow: pattern(
                Strategy::NarrativeFlow,
                vec![scored("short", 1200.0, 0.5, 0.5)],
            ),
            hybrid_balance: pattern(Strategy::HybridBalance, Vec::new()),
        };

        let comparison = compare_patterns(&patterns, 100.0, 500.0);
        let integrated = &comparison.integrated;
        // "short" keeps 200ms after its head is cut, below the floor
        assert_eq!(integrated.decisions.len(), 1);
        assert_eq!(integrated.decisions[0].shot_id, "long");
        assert_eq!(integrated.contributions.get("narrative_flow"), None);
    }
}
