//! Per-part and overall score synthesis
//!
//! Only the material photo is classified. Every other part is shown with the
//! material score minus a small deduction (2-5 points), and the overall score
//! is the rounded mean of the per-part scores.

use rand::Rng;
use std::sync::Arc;

use crate::models::{CapturedPart, PartScore, VerificationResult, PRIMARY_PART};
use crate::services::classification_client::Classification;

pub const MIN_DEDUCTION: u8 = 2;
pub const MAX_DEDUCTION: u8 = 5;

/// Source of per-part deductions
pub trait DeductionSource: Send + Sync {
    /// Deduction for one non-material part
    fn next_deduction(&self) -> u8;
}

/// Uniform deduction in `MIN_DEDUCTION..=MAX_DEDUCTION`
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomDeduction;

impl DeductionSource for RandomDeduction {
    fn next_deduction(&self) -> u8 {
        rand::thread_rng().gen_range(MIN_DEDUCTION..=MAX_DEDUCTION)
    }
}

/// Same deduction for every part
#[derive(Debug, Clone, Copy)]
pub struct FixedDeduction(pub u8);

impl DeductionSource for FixedDeduction {
    fn next_deduction(&self) -> u8 {
        self.0
    }
}

/// Turns one material classification into a full verdict
#[derive(Clone)]
pub struct ScoreAggregator {
    deductions: Arc<dyn DeductionSource>,
}

impl ScoreAggregator {
    pub fn new(deductions: Arc<dyn DeductionSource>) -> Self {
        Self { deductions }
    }

    /// Build the verification result for `parts`
    ///
    /// The material score is clamped to 0-100 before deriving the other
    /// parts; the unclamped value is kept in `raw_primary_score`.
    pub fn aggregate(&self, classification: Classification, parts: &[CapturedPart]) -> VerificationResult {
        let material = classification.score.clamp(0, 100) as u8;

        let part_scores: Vec<PartScore> = parts
            .iter()
            .map(|part| {
                let confidence = if part.part_name == PRIMARY_PART {
                    material
                } else {
                    material.saturating_sub(self.deductions.next_deduction())
                };
                PartScore::new(part.part_name.clone(), confidence)
            })
            .collect();

        let overall_score = overall_score(&part_scores).unwrap_or(material);

        tracing::debug!(
            material,
            overall_score,
            parts = part_scores.len(),
            "Scores aggregated"
        );

        VerificationResult::new(
            overall_score,
            part_scores,
            classification.source,
            classification.score,
        )
    }
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::new(Arc::new(RandomDeduction))
    }
}

/// Rounded mean of the per-part scores; `None` for an empty set
pub fn overall_score(scores: &[PartScore]) -> Option<u8> {
    if scores.is_empty() {
        return None;
    }
    let sum: u32 = scores.iter().map(|s| u32::from(s.confidence)).sum();
    Some((f64::from(sum) / scores.len() as f64).round() as u8)
}
