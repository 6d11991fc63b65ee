//! Editorial strategy definitions.
//!
//! Each strategy is the same matching machinery run under a different
//! weighting preset:
//!
//! - `DynamicCut`: rhythm first, boosts sync and visual punch
//! - `NarrativeFlow`: story first, boosts semantic fit and stability
//! - `HybridBalance`: the segment weights as configured

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Multiplicative adjustments applied to a segment's base weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WeightModifiers {
    /// Applied to every component
    pub all: f64,
    pub visual: f64,
    pub sync: f64,
    pub semantic: f64,
    pub stability: f64,
}

impl WeightModifiers {
    /// Modifiers that leave weights unchanged.
    pub const fn identity() -> Self {
        Self {
            all: 1.0,
            visual: 1.0,
            sync: 1.0,
            semantic: 1.0,
            stability: 1.0,
        }
    }
}

impl Default for WeightModifiers {
    fn default() -> Self {
        Self::identity()
    }
}

/// Editorial strategy used to generate one edit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Rhythm-driven cutting.
    DynamicCut,

    /// Story-driven cutting with steadier shots.
    NarrativeFlow,

    /// Configured segment weights, unmodified.
    HybridBalance,
}

impl Strategy {
    /// All strategies, in the order patterns are generated and reported.
    pub const ALL: [Strategy; 3] = [
        Strategy::DynamicCut,
        Strategy::NarrativeFlow,
        Strategy::HybridBalance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::DynamicCut => "dynamic_cut",
            Strategy::NarrativeFlow => "narrative_flow",
            Strategy::HybridBalance => "hybrid_balance",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Strategy::DynamicCut => "Dynamic cut (rhythm first)",
            Strategy::NarrativeFlow => "Narrative flow (story first)",
            Strategy::HybridBalance => "Hybrid balance (balanced)",
        }
    }

    /// Built-in weight modifiers for this strategy.
    pub fn modifiers(&self) -> WeightModifiers {
        match self {
            Strategy::DynamicCut => WeightModifiers {
                sync: 1.3,
                visual: 1.1,
                ..WeightModifiers::identity()
            },
            Strategy::NarrativeFlow => WeightModifiers {
                semantic: 1.4,
                stability: 1.2,
                ..WeightModifiers::identity()
            },
            Strategy::HybridBalance => WeightModifiers::identity(),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "dynamic_cut" | "dynamic" => Ok(Strategy::DynamicCut),
            "narrative_flow" | "narrative" => Ok(Strategy::NarrativeFlow),
            "hybrid_balance" | "hybrid" => Ok(Strategy::HybridBalance),
            _ => Err(StrategyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown strategy: {0}")]
pub struct StrategyParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!("dynamic_cut".parse::<Strategy>().unwrap(), Strategy::DynamicCut);
        assert_eq!("narrative-flow".parse::<Strategy>().unwrap(), Strategy::NarrativeFlow);
        assert_eq!("hybrid".parse::<Strategy>().unwrap(), Strategy::HybridBalance);
        assert!("montage".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&Strategy::NarrativeFlow).unwrap();
        assert_eq!(json, "\"narrative_flow\"");
        assert_eq!(Strategy::DynamicCut.to_string(), "dynamic_cut");
    }

    #[test]
    fn test_modifier_tables() {
        let dynamic = Strategy::DynamicCut.modifiers();
        assert_eq!(dynamic.sync, 1.3);
        assert_eq!(dynamic.visual, 1.1);
        assert_eq!(dynamic.semantic, 1.0);

        let narrative = Strategy::NarrativeFlow.modifiers();
        assert_eq!(narrative.semantic, 1.4);
        assert_eq!(narrative.stability, 1.2);

        assert_eq!(Strategy::HybridBalance.modifiers(), WeightModifiers::identity());
    }

    #[test]
    fn test_partial_modifiers_default_to_one() {
        let modifiers: WeightModifiers = serde_json::from_str(r#"{ "sync": 1.5 }"#).unwrap();
        assert_eq!(modifiers.sync, 1.5);
        assert_eq!(modifiers.all, 1.0);
        assert_eq!(modifiers.visual, 1.0);
    }
}
