//! Wizard workflow
//!
//! Drives a capture session through collection, analysis and result display.
//! The state machine itself lives in [`crate::models::CaptureSession`]; this
//! module adds the asynchronous verification run and event publication.

pub mod wizard_session;

pub use wizard_session::{OpenChangeCallback, WizardContext, WizardHandle, WizardSnapshot};
