//! Angle labels and per-image results

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of orientation classes produced by the model
pub const ANGLE_CLASSES: usize = 2;

/// Orientation of a text line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleLabel {
    /// Classification was skipped for this image
    Unclassified,
    /// Text reads normally (class 0)
    Upright,
    /// Text is rotated 180 degrees (class 1)
    Flipped,
}

impl AngleLabel {
    /// Map a model class index to a label
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(AngleLabel::Upright),
            1 => Some(AngleLabel::Flipped),
            _ => None,
        }
    }

    /// Signed class index, -1 for unclassified
    pub fn index(&self) -> i32 {
        match self {
            AngleLabel::Unclassified => -1,
            AngleLabel::Upright => 0,
            AngleLabel::Flipped => 1,
        }
    }

    /// Rotation in degrees
    pub fn degrees(&self) -> Option<u32> {
        match self {
            AngleLabel::Unclassified => None,
            AngleLabel::Upright => Some(0),
            AngleLabel::Flipped => Some(180),
        }
    }

    pub fn is_classified(&self) -> bool {
        !matches!(self, AngleLabel::Unclassified)
    }
}

/// Classification outcome for one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleResult {
    /// Orientation label
    pub label: AngleLabel,
    /// Raw model score of the winning class
    pub confidence: f32,
    /// Time spent preprocessing, running and decoding this image
    pub elapsed: Duration,
}

impl AngleResult {
    pub fn new(label: AngleLabel, confidence: f32, elapsed: Duration) -> Self {
        Self {
            label,
            confidence,
            elapsed,
        }
    }

    /// Placeholder result used when angle classification is disabled
    pub fn unclassified() -> Self {
        Self::new(AngleLabel::Unclassified, 0.0, Duration::ZERO)
    }
}

impl Default for AngleResult {
    fn default() -> Self {
        Self::unclassified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_indices() {
        assert_eq!(AngleLabel::Unclassified.index(), -1);
        assert_eq!(AngleLabel::Upright.index(), 0);
        assert_eq!(AngleLabel::Flipped.index(), 1);

        assert_eq!(AngleLabel::from_index(0), Some(AngleLabel::Upright));
        assert_eq!(AngleLabel::from_index(1), Some(AngleLabel::Flipped));
        assert_eq!(AngleLabel::from_index(2), None);
    }

    #[test]
    fn test_degrees() {
        assert_eq!(AngleLabel::Upright.degrees(), Some(0));
        assert_eq!(AngleLabel::Flipped.degrees(), Some(180));
        assert_eq!(AngleLabel::Unclassified.degrees(), None);
    }

    #[test]
    fn test_unclassified_result() {
        let result = AngleResult::unclassified();
        assert_eq!(result.label, AngleLabel::Unclassified);
        assert!(!result.label.is_classified());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.elapsed, Duration::ZERO);
    }

    #[test]
    fn test_label_serializes_snake_case() {
        let json = serde_json::to_string(&AngleLabel::Flipped).unwrap();
        assert_eq!(json, "\"flipped\"");
    }
}
