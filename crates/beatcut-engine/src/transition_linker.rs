//! Attach 30%-rule transition checks to consecutive decisions.

use std::collections::HashMap;

use beatcut_models::{DecisionTransition, EditDecision, TransitionValidation};

/// Transition validations keyed by `(from_shot, to_shot)`.
///
/// When the analyzer reports the same pair twice the first entry wins.
#[derive(Debug, Default)]
pub struct TransitionIndex<'a> {
    by_pair: HashMap<(&'a str, &'a str), &'a TransitionValidation>,
}

impl<'a> TransitionIndex<'a> {
    pub fn new(validations: &'a [TransitionValidation]) -> Self {
        let mut by_pair = HashMap::with_capacity(validations.len());
        for validation in validations {
            by_pair
                .entry((validation.from_shot.as_str(), validation.to_shot.as_str()))
                .or_insert(validation);
        }
        Self { by_pair }
    }

    pub fn get(&self, from_shot: &str, to_shot: &str) -> Option<&'a TransitionValidation> {
        self.by_pair.get(&(from_shot, to_shot)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_pair.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }
}

/// Hint attached to a cut that fails the 30% rule.
pub fn improvement_hint(validation: &TransitionValidation) -> Option<String> {
    if validation.is_valid {
        None
    } else {
        Some(format!("Need more {} change", validation.change_dimension))
    }
}

/// Link every adjacent pair of decisions to its transition check.
///
/// The check is attached to the later decision of each pair. Pairs without
/// a known validation are left unlinked. Returns the number of linked cuts.
pub fn link_transitions(decisions: &mut [EditDecision], index: &TransitionIndex<'_>) -> usize {
    let mut linked = 0;
    for i in 1..decisions.len() {
        let (head, tail) = decisions.split_at_mut(i);
        let from = &head[i - 1];
        let to = &mut tail[0];

        to.transition = index.get(&from.shot_id, &to.shot_id).map(|validation| {
            linked += 1;
            DecisionTransition {
                from_shot: from.shot_id.clone(),
                validation: validation.clone(),
                improvement: improvement_hint(validation),
            }
        });
    }
    linked
}
