//! Decision optimization.
//!
//! Runs over the candidate decisions of one pattern:
//!
//! ```text
//!   candidates ──► resolve_conflicts ──► interval DP / greedy ──► enforce_run_limits
//!                  (trim or drop          (min Σ(1-conf) +         (cap unbroken
//!                   overlapping cuts)      Σ transition cost)       same-shot runs)
//! ```
//!
//! The DP is the classic O(n³) interval recurrence
//! `dp[i][j] = min_k dp[i][k] + dp[k+1][j] + cost(k, k+1)` with an explicit
//! split table, reconstructed recursively. It never reorders decisions.

use std::collections::{HashMap, VecDeque};

use beatcut_models::{EditDecision, OptimizationMethod, OptimizationSummary, SegmentConstraints};
use tracing::debug;

use crate::config::MatchingConfig;
use crate::deadline::Deadline;
use crate::error::EngineResult;
use crate::selector::ShotUsage;
use crate::transition_linker::TransitionIndex;

/// Counts from conflict resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictStats {
    pub dropped: usize,
    pub trimmed: usize,
}

/// Make the decision list non-overlapping.
///
/// Decisions are processed in time order. When one overlaps the last kept
/// decision the higher confidence wins, ties going to the earlier one. An
/// earlier loser has its tail cut at the winner's start; a later loser has
/// its head cut at the winner's end. A loser trimmed below `min_duration`
/// is dropped.
pub fn resolve_conflicts(
    mut decisions: Vec<EditDecision>,
    min_duration: f64,
) -> (Vec<EditDecision>, ConflictStats) {
    decisions.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut stats = ConflictStats::default();
    let mut pending: VecDeque<EditDecision> = decisions.into();
    let mut kept: Vec<EditDecision> = Vec::with_capacity(pending.len());

    while let Some(mut candidate) = pending.pop_front() {
        let Some(last) = kept.last_mut() else {
            kept.push(candidate);
            continue;
        };

        if candidate.time >= last.end() {
            kept.push(candidate);
            continue;
        }

        if candidate.confidence > last.confidence {
            let remaining = candidate.time - last.time;
            if remaining < min_duration {
                kept.pop();
                stats.dropped += 1;
            } else {
                last.duration = remaining;
                last.out_point = last.in_point + remaining;
                stats.trimmed += 1;
            }
            pending.push_front(candidate);
        } else {
            let shift = last.end() - candidate.time;
            let remaining = candidate.duration - shift;
            if remaining < min_duration {
                stats.dropped += 1;
            } else {
                candidate.time += shift;
                candidate.in_point += shift;
                candidate.duration = remaining;
                stats.trimmed += 1;

                let position = pending
                    .iter()
                    .position(|d| d.time > candidate.time)
                    .unwrap_or(pending.len());
                pending.insert(position, candidate);
            }
        }
    }

    (kept, stats)
}

/// Transition cost between two consecutive decisions.
#[derive(Debug, Clone, Copy)]
pub struct TransitionCostModel<'i, 'a> {
    transitions: &'i TransitionIndex<'a>,
    invalid_penalty: f64,
    gap_penalty: f64,
    gap_threshold: f64,
}

impl<'i, 'a> TransitionCostModel<'i, 'a> {
    pub fn new(transitions: &'i TransitionIndex<'a>, config: &MatchingConfig) -> Self {
        Self {
            transitions,
            invalid_penalty: config.invalid_transition_penalty,
            gap_penalty: config.gap_penalty,
            gap_threshold: config.gap_threshold,
        }
    }

    /// Penalty for a known 30%-rule failure plus a penalty for a long gap.
    ///
    /// A pair with no validation on record is not penalized.
    pub fn cost(&self, from: &EditDecision, to: &EditDecision) -> f64 {
        let mut cost = 0.0;
        if let Some(validation) = self.transitions.get(&from.shot_id, &to.shot_id) {
            if !validation.is_valid {
                cost += self.invalid_penalty;
            }
        }
        if to.time - from.end() > self.gap_threshold {
            cost += self.gap_penalty;
        }
        cost
    }

    /// Total cost of a sequence: `Σ(1 - confidence) + Σ cost(i, i+1)`.
    pub fn sequence_cost(&self, decisions: &[EditDecision]) -> f64 {
        let unit: f64 = decisions.iter().map(|d| 1.0 - d.confidence).sum();
        let transitions: f64 = decisions
            .windows(2)
            .map(|pair| self.cost(&pair[0], &pair[1]))
            .sum();
        unit + transitions
    }
}

/// Result of the interval DP.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalPlan {
    /// Selected decision indices, in order
    pub order: Vec<usize>,
    pub total_cost: f64,
}

/// Solve the interval DP.
///
/// `unit_costs[i]` is `1 - confidence[i]`, `transition_costs[k]` is the cost
/// between decisions `k` and `k + 1`. Ties keep the smallest split point.
pub fn interval_dp(
    unit_costs: &[f64],
    transition_costs: &[f64],
    deadline: &Deadline,
) -> EngineResult<IntervalPlan> {
    let n = unit_costs.len();
    if n == 0 {
        return Ok(IntervalPlan {
            order: Vec::new(),
            total_cost: 0.0,
        });
    }
    debug_assert_eq!(transition_costs.len(), n - 1);

    let mut dp = vec![vec![0.0_f64; n]; n];
    let mut split = vec![vec![0_usize; n]; n];
    for i in 0..n {
        dp[i][i] = unit_costs[i];
        split[i][i] = i;
    }

    for len in 2..=n {
        deadline.check()?;
        for i in 0..=(n - len) {
            let j = i + len - 1;
            let mut best = f64::INFINITY;
            let mut best_k = i;
            for k in i..j {
                let cost = dp[i][k] + dp[k + 1][j] + transition_costs[k];
                if cost < best {
                    best = cost;
                    best_k = k;
                }
            }
            dp[i][j] = best;
            split[i][j] = best_k;
        }
    }

    let mut order = Vec::with_capacity(n);
    reconstruct(&split, 0, n - 1, &mut order);

    Ok(IntervalPlan {
        order,
        total_cost: dp[0][n - 1],
    })
}

fn reconstruct(split: &[Vec<usize>], i: usize, j: usize, order: &mut Vec<usize>) {
    if i == j {
        order.push(i);
        return;
    }
    let k = split[i][j];
    reconstruct(split, i, k, order);
    reconstruct(split, k + 1, j, order);
}

/// Constraints for a segment, falling back to the defaults for unknown names.
fn constraints_for(
    constraints: &HashMap<String, SegmentConstraints>,
    segment: &str,
) -> SegmentConstraints {
    constraints.get(segment).copied().unwrap_or_default()
}

/// Gap between two decisions, negative when they overlap.
fn spacing(a: &EditDecision, b: &EditDecision) -> f64 {
    if a.time <= b.time {
        b.time - a.end()
    } else {
        a.time - b.end()
    }
}

/// Highest-confidence-first selection with a minimum gap between cuts.
///
/// A candidate is accepted only when it sits at least its segment's
/// `min_shot_duration` away from every decision already accepted. Ties go to
/// the earlier decision. The result is in time order.
pub fn greedy_select(
    decisions: &[EditDecision],
    constraints: &HashMap<String, SegmentConstraints>,
) -> Vec<usize> {
    let mut by_confidence: Vec<usize> = (0..decisions.len()).collect();
    by_confidence.sort_by(|&a, &b| {
        decisions[b]
            .confidence
            .total_cmp(&decisions[a].confidence)
            .then_with(|| decisions[a].time.total_cmp(&decisions[b].time))
            .then_with(|| a.cmp(&b))
    });

    let mut accepted: Vec<usize> = Vec::new();
    for index in by_confidence {
        let candidate = &decisions[index];
        let min_gap = constraints_for(constraints, &candidate.segment_name).min_shot_duration;
        if accepted
            .iter()
            .all(|&other| spacing(&decisions[other], candidate) >= min_gap)
        {
            accepted.push(index);
        }
    }

    accepted.sort_by(|&a, &b| {
        decisions[a]
            .time
            .total_cmp(&decisions[b].time)
            .then_with(|| a.cmp(&b))
    });
    accepted
}

/// Drop decisions that would extend an unbroken same-shot run past the
/// segment's `max_consecutive_same_shot`. Returns the number pruned.
pub fn enforce_run_limits(
    decisions: &mut Vec<EditDecision>,
    constraints: &HashMap<String, SegmentConstraints>,
) -> usize {
    let mut usage = ShotUsage::new();
    let before = decisions.len();

    decisions.retain(|decision| {
        let limit = constraints_for(constraints, &decision.segment_name).max_consecutive_same_shot;
        if usage.can_use(&decision.shot_id, limit) {
            usage.record(&decision.shot_id);
            true
        } else {
            false
        }
    });

    before - decisions.len()
}

/// Optimized decisions plus what the optimizer did.
#[derive(Debug, Clone)]
pub struct OptimizedDecisions {
    pub decisions: Vec<EditDecision>,
    pub summary: OptimizationSummary,
}

/// Runs conflict resolution, global optimization and reuse enforcement.
pub struct DecisionOptimizer<'c, 'i, 'a> {
    config: &'c MatchingConfig,
    costs: TransitionCostModel<'i, 'a>,
    constraints: &'c HashMap<String, SegmentConstraints>,
}

impl<'c, 'i, 'a> DecisionOptimizer<'c, 'i, 'a> {
    pub fn new(
        config: &'c MatchingConfig,
        transitions: &'i TransitionIndex<'a>,
        constraints: &'c HashMap<String, SegmentConstraints>,
    ) -> Self {
        Self {
            config,
            costs: TransitionCostModel::new(transitions, config),
            constraints,
        }
    }

    pub fn optimize(
        &self,
        decisions: Vec<EditDecision>,
        deadline: &Deadline,
    ) -> EngineResult<OptimizedDecisions> {
        let input_decisions = decisions.len();
        let (resolved, conflicts) =
            resolve_conflicts(decisions, self.config.min_trimmed_duration);

        let order = match self.config.optimization_method {
            OptimizationMethod::DynamicProgramming => {
                let unit_costs: Vec<f64> = resolved.iter().map(|d| 1.0 - d.confidence).collect();
                let transition_costs: Vec<f64> = resolved
                    .windows(2)
                    .map(|pair| self.costs.cost(&pair[0], &pair[1]))
                    .collect();
                interval_dp(&unit_costs, &transition_costs, deadline)?.order
            }
            OptimizationMethod::Greedy => greedy_select(&resolved, self.constraints),
        };
        deadline.check()?;

        let selected = order.len();
        let mut slots: Vec<Option<EditDecision>> = resolved.into_iter().map(Some).collect();
        let mut optimized: Vec<EditDecision> = order
            .into_iter()
            .filter_map(|index| slots.get_mut(index).and_then(Option::take))
            .collect();

        let run_pruned = enforce_run_limits(&mut optimized, self.constraints);

        let summary = OptimizationSummary {
            method: self.config.optimization_method,
            input_decisions,
            conflicts_dropped: conflicts.dropped,
            conflicts_trimmed: conflicts.trimmed,
            pruned: (slots.len() - selected) + run_pruned,
            total_cost: self.costs.sequence_cost(&optimized),
        };

        debug!(
            method = %summary.method,
            input = input_decisions,
            output = optimized.len(),
            conflicts_dropped = conflicts.dropped,
            conflicts_trimmed = conflicts.trimmed,
            pruned = summary.pruned,
            total_cost = summary.total_cost,
            "Optimized decisions"
        );

        Ok(OptimizedDecisions {
            decisions: optimized,
            summary,
        })
    }
}
