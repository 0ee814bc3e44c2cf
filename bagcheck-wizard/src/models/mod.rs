//! Data models for the verification wizard
//!
//! - Part catalog (fixed, ordered photo steps)
//! - Capture session state machine
//! - Verification results

pub mod capture_session;
pub mod part_catalog;
pub mod verification;

pub use capture_session::{
    CaptureSession, CapturedPart, ConfirmOutcome, ImageUpload, PendingSelection, SessionError,
    SessionSnapshot, VerificationTicket,
};
pub use part_catalog::{PartDefinition, PRIMARY_PART, REQUIRED_PARTS};
pub use verification::{
    Band, PartScore, ScoreSource, VerificationFailureKind, VerificationOutcome, VerificationResult,
};
