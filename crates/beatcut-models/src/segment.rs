//! Timeline segment configuration models.
//!
//! A segment is a named slice of the music timeline (hook, main, outro, ...)
//! with its own scoring weights and editing constraints.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::strategy::{Strategy, WeightModifiers};

/// Relative importance of each score component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentWeights {
    pub visual: f64,
    pub sync: f64,
    pub semantic: f64,
    pub stability: f64,
}

impl SegmentWeights {
    pub fn new(visual: f64, sync: f64, semantic: f64, stability: f64) -> Self {
        Self {
            visual,
            sync,
            semantic,
            stability,
        }
    }

    /// Equal weighting across all components.
    pub fn balanced() -> Self {
        Self::new(0.25, 0.25, 0.25, 0.25)
    }

    pub fn sum(&self) -> f64 {
        self.visual + self.sync + self.semantic + self.stability
    }

    /// Scale so the weights sum to 1.0. A zero vector becomes balanced.
    pub fn normalized(&self) -> Self {
        let sum = self.sum();
        if sum <= 0.0 || !sum.is_finite() {
            return Self::balanced();
        }
        Self::new(
            self.visual / sum,
            self.sync / sum,
            self.semantic / sum,
            self.stability / sum,
        )
    }

    /// Apply strategy modifiers and re-normalize.
    pub fn modified_by(&self, modifiers: &WeightModifiers) -> Self {
        Self::new(
            self.visual * modifiers.all * modifiers.visual,
            self.sync * modifiers.all * modifiers.sync,
            self.semantic * modifiers.all * modifiers.semantic,
            self.stability * modifiers.all * modifiers.stability,
        )
        .normalized()
    }

    /// Components as `(name, value)` pairs, in a fixed order.
    pub fn components(&self) -> [(&'static str, f64); 4] {
        [
            ("visual", self.visual),
            ("sync", self.sync),
            ("semantic", self.semantic),
            ("stability", self.stability),
        ]
    }
}

impl Default for SegmentWeights {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Editing constraints for one segment.
///
/// Lowercase aliases accept keys coming from environment overrides, which
/// arrive case-folded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentConstraints {
    /// Minimum shot length in milliseconds
    #[serde(alias = "minimumShotLength", alias = "minshotduration")]
    pub min_shot_duration: f64,
    /// Maximum shot length in milliseconds
    #[serde(alias = "maximumShotLength", alias = "maxshotduration")]
    pub max_shot_duration: f64,
    /// Longest allowed unbroken run of the same shot
    #[serde(
        default = "default_max_consecutive_same_shot",
        alias = "maxconsecutivesameshot"
    )]
    pub max_consecutive_same_shot: u32,
    #[serde(default, alias = "preferheroshots")]
    pub prefer_hero_shots: bool,
}

fn default_max_consecutive_same_shot() -> u32 {
    3
}

impl Default for SegmentConstraints {
    fn default() -> Self {
        Self {
            min_shot_duration: 500.0,
            max_shot_duration: 10_000.0,
            max_consecutive_same_shot: default_max_consecutive_same_shot(),
            prefer_hero_shots: false,
        }
    }
}

/// One named segment as it appears in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentDefinition {
    /// Human-readable label
    #[serde(default)]
    pub label: String,
    /// `[start, end)` in milliseconds
    pub range: [f64; 2],
    pub weights: SegmentWeights,
    #[serde(default)]
    pub constraints: SegmentConstraints,
}

impl SegmentDefinition {
    pub fn new(start: f64, end: f64, weights: SegmentWeights) -> Self {
        Self {
            label: String::new(),
            range: [start, end],
            weights,
            constraints: SegmentConstraints::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: SegmentConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn start(&self) -> f64 {
        self.range[0]
    }

    pub fn end(&self) -> f64 {
        self.range[1]
    }
}

/// Optional per-strategy override of the built-in weight modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatternDefinition {
    pub name: Strategy,
    #[serde(default)]
    pub description: Option<String>,
    pub modifiers: WeightModifiers,
}

/// The complete matching configuration: named segments plus optional
/// strategy overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentConfig {
    pub segments: BTreeMap<String, SegmentDefinition>,
    #[serde(default)]
    pub patterns: Vec<PatternDefinition>,
}

impl SegmentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_segment(mut self, name: impl Into<String>, segment: SegmentDefinition) -> Self {
        self.segments.insert(name.into(), segment);
        self
    }

    /// Modifiers for `strategy`, preferring a configured override.
    pub fn modifiers_for(&self, strategy: Strategy) -> WeightModifiers {
        self.patterns
            .iter()
            .find(|p| p.name == strategy)
            .map(|p| p.modifiers)
            .unwrap_or_else(|| strategy.modifiers())
    }

    /// Description for `strategy`, preferring a configured override.
    pub fn description_for(&self, strategy: Strategy) -> String {
        self.patterns
            .iter()
            .find(|p| p.name == strategy)
            .and_then(|p| p.description.clone())
            .unwrap_or_else(|| strategy.description().to_string())
    }
}
