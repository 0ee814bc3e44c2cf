//! Wizard-related event types

use serde::{Deserialize, Serialize};

/// Wizard phase
///
/// A session starts in `Collecting`, moves to `Analyzing` once the last part
/// is confirmed, and reaches `Done` when the verification run settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardPhase {
    /// Photos are being captured part by part
    Collecting,
    /// Classification call is outstanding
    Analyzing,
    /// Verification result (or failure) is available
    Done,
}

impl WizardPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardPhase::Collecting => "collecting",
            WizardPhase::Analyzing => "analyzing",
            WizardPhase::Done => "done",
        }
    }
}

impl std::fmt::Display for WizardPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
