//! Capture session state machine
//!
//! A session walks the part catalog one step at a time:
//! COLLECTING → ANALYZING → DONE, with `reset` returning to COLLECTING from
//! any phase.
//!
//! The state machine is synchronous and owns no I/O. Confirming the last part
//! hands a [`VerificationTicket`] to the caller, who runs classification and
//! reports back through [`CaptureSession::complete`]. Every reset bumps the
//! session epoch so results from an abandoned run are discarded.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bagcheck_common::events::WizardPhase;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::part_catalog::{self, PartDefinition};
use super::verification::VerificationOutcome;

/// Session operation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("{operation} is not allowed while {phase}")]
    WrongPhase {
        operation: &'static str,
        phase: WizardPhase,
    },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

/// Raw image as received from the capture surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub data: Arc<[u8]>,
    /// MIME type, e.g. `image/jpeg`
    pub content_type: String,
    pub file_name: Option<String>,
}

impl ImageUpload {
    pub fn new(data: impl Into<Arc<[u8]>>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Renderable `data:` URI for the image
    pub fn preview_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.data))
    }
}

/// File chosen for the current step, not yet confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    pub image: ImageUpload,
    pub preview_uri: String,
}

/// Confirmed photo for one part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPart {
    pub part_name: String,
    pub image: ImageUpload,
    pub preview_uri: String,
    /// Present only after scoring
    pub confidence: Option<u8>,
}

/// Read-only handoff of a complete capture set to the verification run
#[derive(Debug, Clone)]
pub struct VerificationTicket {
    pub session_id: Uuid,
    /// Epoch the run belongs to; stale once the session is reset
    pub epoch: u64,
    pub parts: Vec<CapturedPart>,
}

/// Result of a confirm request
#[derive(Debug, Clone)]
pub enum ConfirmOutcome {
    /// Nothing selected (or not collecting); state unchanged
    NoSelection,
    /// Part stored, wizard moved to the next step
    Advanced { part_name: String, part_index: usize },
    /// Last part stored, session is now analyzing
    ReadyForAnalysis(VerificationTicket),
}

/// In-memory state for one wizard instance
#[derive(Debug, Clone)]
pub struct CaptureSession {
    session_id: Uuid,
    phase: WizardPhase,
    current_part_index: usize,
    confirmed_parts: Vec<CapturedPart>,
    pending_selection: Option<PendingSelection>,
    progress: u8,
    outcome: Option<VerificationOutcome>,
    epoch: u64,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(session_id: Uuid) -> Self {
        Self {
            session_id,
            phase: WizardPhase::Collecting,
            current_part_index: 0,
            confirmed_parts: Vec::new(),
            pending_selection: None,
            progress: 0,
            outcome: None,
            epoch: 0,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn current_part_index(&self) -> usize {
        self.current_part_index
    }

    /// Part being captured; `None` outside COLLECTING
    pub fn current_part(&self) -> Option<&'static PartDefinition> {
        match self.phase {
            WizardPhase::Collecting => part_catalog::part_at(self.current_part_index),
            _ => None,
        }
    }

    pub fn confirmed_parts(&self) -> &[CapturedPart] {
        &self.confirmed_parts
    }

    pub fn pending_selection(&self) -> Option<&PendingSelection> {
        self.pending_selection.as_ref()
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn outcome(&self) -> Option<&VerificationOutcome> {
        self.outcome.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_last_part(&self) -> bool {
        self.current_part_index + 1 == part_catalog::part_count()
    }

    pub fn can_confirm(&self) -> bool {
        self.phase == WizardPhase::Collecting && self.pending_selection.is_some()
    }

    pub fn can_go_back(&self) -> bool {
        self.phase == WizardPhase::Collecting && self.current_part_index > 0
    }

    /// Store a file for the current step, replacing any earlier selection
    pub fn select_file(&mut self, image: ImageUpload) -> Result<(), SessionError> {
        if self.phase != WizardPhase::Collecting {
            return Err(SessionError::WrongPhase {
                operation: "select_file",
                phase: self.phase,
            });
        }
        if image.data.is_empty() {
            return Err(SessionError::InvalidSelection("image is empty".to_string()));
        }

        let preview_uri = image.preview_uri();
        self.pending_selection = Some(PendingSelection { image, preview_uri });
        Ok(())
    }

    /// Confirm the pending selection for the current step
    ///
    /// Without a pending selection this is a no-op. Confirming the last part
    /// moves the session to ANALYZING and returns the ticket for the run.
    pub fn confirm_current_part(&mut self) -> ConfirmOutcome {
        if self.phase != WizardPhase::Collecting {
            return ConfirmOutcome::NoSelection;
        }
        let Some(selection) = self.pending_selection.take() else {
            return ConfirmOutcome::NoSelection;
        };
        let Some(part) = part_catalog::part_at(self.current_part_index) else {
            return ConfirmOutcome::NoSelection;
        };

        self.confirmed_parts.push(CapturedPart {
            part_name: part.name.to_string(),
            image: selection.image,
            preview_uri: selection.preview_uri,
            confidence: None,
        });

        if self.confirmed_parts.len() == part_catalog::part_count() {
            self.phase = WizardPhase::Analyzing;
            self.progress = 0;
            ConfirmOutcome::ReadyForAnalysis(VerificationTicket {
                session_id: self.session_id,
                epoch: self.epoch,
                parts: self.confirmed_parts.clone(),
            })
        } else {
            let part_index = self.current_part_index;
            self.current_part_index += 1;
            ConfirmOutcome::Advanced {
                part_name: part.name.to_string(),
                part_index,
            }
        }
    }

    /// Step back, discarding the most recently confirmed part
    ///
    /// Returns the discarded part, or `None` when there is nothing to go back to.
    pub fn go_to_previous_part(&mut self) -> Option<CapturedPart> {
        if !self.can_go_back() {
            return None;
        }

        let removed = self.confirmed_parts.pop()?;
        self.current_part_index -= 1;
        self.pending_selection = None;
        Some(removed)
    }

    /// Clear all data and return to the first step
    pub fn reset(&mut self) {
        self.phase = WizardPhase::Collecting;
        self.current_part_index = 0;
        self.confirmed_parts.clear();
        self.pending_selection = None;
        self.progress = 0;
        self.outcome = None;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Record simulated progress for the run with `epoch`
    ///
    /// Returns `false` when the run is stale or the session is no longer analyzing.
    pub fn set_progress(&mut self, epoch: u64, progress: u8) -> bool {
        if epoch != self.epoch || self.phase != WizardPhase::Analyzing {
            return false;
        }
        self.progress = self.progress.max(progress.min(100));
        true
    }

    /// Store the outcome of the run with `epoch` and move to DONE
    ///
    /// Returns `false` (and changes nothing) when the run is stale.
    pub fn complete(&mut self, epoch: u64, outcome: VerificationOutcome) -> bool {
        if epoch != self.epoch || self.phase != WizardPhase::Analyzing {
            return false;
        }

        if let Some(result) = outcome.result() {
            for (part, score) in self.confirmed_parts.iter_mut().zip(&result.part_scores) {
                part.confidence = Some(score.confidence);
            }
        }

        self.progress = 100;
        self.outcome = Some(outcome);
        self.phase = WizardPhase::Done;
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            phase: self.phase,
            current_part_index: self.current_part_index,
            current_part: self.current_part().copied(),
            is_last_part: self.is_last_part(),
            can_confirm: self.can_confirm(),
            can_go_back: self.can_go_back(),
            confirmed_parts: self
                .confirmed_parts
                .iter()
                .map(|p| CapturedPartView {
                    part_name: p.part_name.clone(),
                    file_name: p.image.file_name.clone(),
                    preview_uri: p.preview_uri.clone(),
                    confidence: p.confidence,
                })
                .collect(),
            pending_selection: self.pending_selection.as_ref().map(|s| PendingSelectionView {
                file_name: s.image.file_name.clone(),
                content_type: s.image.content_type.clone(),
                preview_uri: s.preview_uri.clone(),
            }),
            progress: self.progress,
            outcome: self.outcome.clone(),
        }
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable view of a session (image bytes omitted)
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: WizardPhase,
    pub current_part_index: usize,
    pub current_part: Option<PartDefinition>,
    pub is_last_part: bool,
    pub can_confirm: bool,
    pub can_go_back: bool,
    pub confirmed_parts: Vec<CapturedPartView>,
    pub pending_selection: Option<PendingSelectionView>,
    pub progress: u8,
    pub outcome: Option<VerificationOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapturedPartView {
    pub part_name: String,
    pub file_name: Option<String>,
    pub preview_uri: String,
    pub confidence: Option<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingSelectionView {
    pub file_name: Option<String>,
    pub content_type: String,
    pub preview_uri: String,
}
