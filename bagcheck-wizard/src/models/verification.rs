//! Verification result types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Three-way verdict derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// Overall score >= 90
    Pass,
    /// Overall score 70..=89
    Review,
    /// Overall score < 70
    Fail,
}

impl Band {
    pub const PASS_THRESHOLD: u8 = 90;
    pub const REVIEW_THRESHOLD: u8 = 70;

    pub fn from_score(score: u8) -> Self {
        if score >= Self::PASS_THRESHOLD {
            Band::Pass
        } else if score >= Self::REVIEW_THRESHOLD {
            Band::Review
        } else {
            Band::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Pass => "pass",
            Band::Review => "review",
            Band::Fail => "fail",
        }
    }

    /// Short verdict line for the result screen
    pub fn headline(&self) -> &'static str {
        match self {
            Band::Pass => "Confident - Authentic",
            Band::Review => "Borderline - Needs Review",
            Band::Fail => "Likely Fake",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Band::Pass => "This item shows high confidence of authenticity. All verification checks passed successfully.",
            Band::Review => "This item requires manual verification. Please resubmit with better images or contact support for human review.",
            Band::Fail => "This item appears to be counterfeit. Multiple verification checks failed.",
        }
    }
}

/// Endpoint that produced the material score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Primary,
    Secondary,
}

impl ScoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreSource::Primary => "primary",
            ScoreSource::Secondary => "secondary",
        }
    }
}

/// Derived confidence for one captured part
///
/// Previews are not repeated here; scores follow the order of the confirmed parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartScore {
    pub part_name: String,
    /// 0-100
    pub confidence: u8,
    /// Band of this part's own confidence, for per-part colouring
    pub band: Band,
}

impl PartScore {
    pub fn new(part_name: impl Into<String>, confidence: u8) -> Self {
        Self {
            part_name: part_name.into(),
            confidence,
            band: Band::from_score(confidence),
        }
    }
}

/// Scored verdict for a complete capture set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Rounded mean of the per-part scores (0-100)
    pub overall_score: u8,
    pub band: Band,
    /// Verdict line for `band`
    pub headline: String,
    /// Next-step advice for `band`
    pub guidance: String,
    /// Mirrors the confirmed parts, in capture order
    pub part_scores: Vec<PartScore>,
    pub source: ScoreSource,
    /// Material score exactly as normalized by the endpoint, before clamping
    pub raw_primary_score: i64,
}

impl VerificationResult {
    /// Build a result, deriving band and result-screen text from `overall_score`
    pub fn new(
        overall_score: u8,
        part_scores: Vec<PartScore>,
        source: ScoreSource,
        raw_primary_score: i64,
    ) -> Self {
        let band = Band::from_score(overall_score);
        Self {
            overall_score,
            band,
            headline: band.headline().to_string(),
            guidance: band.guidance().to_string(),
            part_scores,
            source,
            raw_primary_score,
        }
    }
}

/// Why a verification run produced no score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationFailureKind {
    #[error("all classification endpoints unavailable")]
    AllEndpointsUnavailable,

    #[error("material photo missing from capture set")]
    MissingPrimaryPart,
}

/// Terminal state of a verification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Verified(VerificationResult),
    Failed {
        kind: VerificationFailureKind,
        message: String,
    },
}

impl VerificationOutcome {
    pub fn result(&self) -> Option<&VerificationResult> {
        match self {
            VerificationOutcome::Verified(result) => Some(result),
            VerificationOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, VerificationOutcome::Failed { .. })
    }
}
