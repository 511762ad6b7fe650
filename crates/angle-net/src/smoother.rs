//! Batch-level majority vote

use crate::angle::{AngleLabel, AngleResult};
use tracing::info;

/// Post-processing applied to a classified batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Smoothing {
    /// Keep every image's own label
    #[default]
    None,
    /// Force the whole batch to the majority label
    MajorityVote,
}

impl Smoothing {
    /// Smoothing implied by the classifier switches
    pub fn from_flags(do_angle: bool, most_angle: bool) -> Self {
        if do_angle && most_angle {
            Smoothing::MajorityVote
        } else {
            Smoothing::None
        }
    }
}

/// Label every result of the batch would be forced to
///
/// Sums the label indices and compares against half the batch size. Anything
/// below half goes to upright; an exact tie goes to flipped.
pub fn majority_label(results: &[AngleResult]) -> Option<AngleLabel> {
    if results.is_empty() {
        return None;
    }

    let sum: f64 = results.iter().map(|r| f64::from(r.label.index())).sum();
    let half = results.len() as f64 / 2.0;

    if sum < half {
        Some(AngleLabel::Upright)
    } else {
        Some(AngleLabel::Flipped)
    }
}

/// Apply `policy` to a classified batch
///
/// Only labels change; confidence and elapsed time are kept.
pub fn smooth(mut results: Vec<AngleResult>, policy: Smoothing) -> Vec<AngleResult> {
    if policy == Smoothing::None {
        return results;
    }

    if let Some(label) = majority_label(&results) {
        info!(
            "Setting all {} angles to majority label {:?}",
            results.len(),
            label
        );
        for result in &mut results {
            result.label = label;
        }
    }

    results
}
