//! Service modules for the verification workflow
//!
//! - Classification client (primary endpoint with local fallback)
//! - Score aggregation and banding
//! - Simulated progress reporting
//! - Verification run tying them together

pub mod classification_client;
pub mod progress_reporter;
pub mod score_aggregator;
pub mod verifier;

pub use classification_client::{
    Classification, ClassificationClient, ClassificationError, ClassificationStrategy,
    PrimaryEndpoint, PrimaryResponse, SecondaryEndpoint, SecondaryResponse, StrategyError,
};
pub use progress_reporter::{ProgressReporter, ProgressSettings};
pub use score_aggregator::{DeductionSource, FixedDeduction, RandomDeduction, ScoreAggregator};
pub use verifier::Verifier;
