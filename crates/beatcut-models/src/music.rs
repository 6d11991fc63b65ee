//! Music analysis models.
//!
//! These types are produced upstream by the music analyzer and edit point
//! detector. The engine only reads them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of musical event an edit point was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EditPointType {
    Beat,
    Onset,
    SegmentBoundary,
    EnergyPeak,
    Silence,
}

impl EditPointType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditPointType::Beat => "beat",
            EditPointType::Onset => "onset",
            EditPointType::SegmentBoundary => "segment_boundary",
            EditPointType::EnergyPeak => "energy_peak",
            EditPointType::Silence => "silence",
        }
    }
}

impl fmt::Display for EditPointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position of an edit point within the bar/phrase structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MusicalContext {
    pub is_downbeat: bool,
    /// Position within the measure (0.0-1.0)
    pub measure_position: f64,
    /// Position within the phrase (0.0-1.0)
    #[serde(default)]
    pub phrase_position: f64,
}

/// A candidate cut time on the music timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditPoint {
    /// Time in milliseconds
    pub time: f64,
    /// Recommendation strength (0.0-1.0)
    pub confidence: f64,
    /// Allowed adjustment range in ± milliseconds
    pub flexibility: f64,
    #[serde(rename = "type")]
    pub point_type: EditPointType,
    /// Why this moment was proposed as a cut
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub musical_context: Option<MusicalContext>,
}

impl EditPoint {
    /// Create an edit point with no musical context.
    pub fn new(time: f64, confidence: f64, point_type: EditPointType) -> Self {
        Self {
            time,
            confidence,
            flexibility: 0.0,
            point_type,
            reason: String::new(),
            musical_context: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_flexibility(mut self, flexibility: f64) -> Self {
        self.flexibility = flexibility;
        self
    }

    pub fn with_musical_context(mut self, context: MusicalContext) -> Self {
        self.musical_context = Some(context);
        self
    }

    /// True when the edit point falls on a downbeat.
    pub fn is_downbeat(&self) -> bool {
        self.musical_context.map(|c| c.is_downbeat).unwrap_or(false)
    }
}

/// Per-instant relative "mood" of the track, normalized within the song.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelativeDynamics {
    pub time: f64,
    /// 0.0-1.0
    pub intensity: f64,
    /// 0.0-1.0
    pub complexity: f64,
    /// 0.0-1.0
    #[serde(default)]
    pub variation: f64,
    /// -1.0 (negative) to 1.0 (positive)
    pub emotional_valence: f64,
    /// 0.0-1.0
    pub arousal: f64,
}

impl RelativeDynamics {
    /// Mid-scale sample used when the track carries no dynamics at all.
    pub fn neutral(time: f64) -> Self {
        Self {
            time,
            intensity: 0.5,
            complexity: 0.5,
            variation: 0.5,
            emotional_valence: 0.0,
            arousal: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Beat {
    pub time: f64,
    pub strength: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OnsetKind {
    Percussive,
    Harmonic,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Onset {
    pub time: f64,
    pub strength: f64,
    #[serde(default)]
    pub frequency: f64,
    #[serde(rename = "type")]
    pub kind: OnsetKind,
}

/// Structural section detected in the track (verse, chorus, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MusicSegment {
    #[serde(rename = "type")]
    pub kind: String,
    pub start_time: f64,
    pub end_time: f64,
    pub confidence: f64,
    pub energy: f64,
}

/// Everything the engine consumes from the music analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MusicAnalysis {
    /// Total track length in milliseconds
    pub duration: f64,
    #[serde(default)]
    pub beats: Vec<Beat>,
    #[serde(default)]
    pub onsets: Vec<Onset>,
    #[serde(default)]
    pub segments: Vec<MusicSegment>,
    #[serde(default)]
    pub edit_points: Vec<EditPoint>,
    #[serde(default)]
    pub dynamics: Vec<RelativeDynamics>,
}

impl MusicAnalysis {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    /// Edit points in `[start, end)`, sorted by time.
    pub fn edit_points_in(&self, start: f64, end: f64) -> Vec<&EditPoint> {
        let mut points: Vec<&EditPoint> = self
            .edit_points
            .iter()
            .filter(|p| p.time >= start && p.time < end)
            .collect();
        points.sort_by(|a, b| a.time.total_cmp(&b.time));
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_point_wire_format() {
        let json = r#"{
            "time": 500,
            "confidence": 0.8,
            "flexibility": 40,
            "type": "energy_peak",
            "reason": "Energy spike",
            "musicalContext": { "isDownbeat": true, "measurePosition": 0.0 }
        }"#;
        let point: EditPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.point_type, EditPointType::EnergyPeak);
        assert!(point.is_downbeat());
        assert_eq!(point.musical_context.unwrap().phrase_position, 0.0);
    }

    #[test]
    fn test_edit_points_in_is_sorted_and_half_open() {
        let mut music = MusicAnalysis::new(10_000.0);
        music.edit_points = vec![
            EditPoint::new(3000.0, 0.5, EditPointType::Beat),
            EditPoint::new(1000.0, 0.5, EditPointType::Onset),
            EditPoint::new(0.0, 0.5, EditPointType::Beat),
        ];

        let points = music.edit_points_in(0.0, 3000.0);
        let times: Vec<f64> = points.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 1000.0]);
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let music: MusicAnalysis = serde_json::from_str(r#"{ "duration": 60000 }"#).unwrap();
        assert!(music.edit_points.is_empty());
        assert!(music.dynamics.is_empty());
    }
}
