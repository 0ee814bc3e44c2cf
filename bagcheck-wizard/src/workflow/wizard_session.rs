//! Wizard instance
//!
//! Wraps a [`CaptureSession`] with the asynchronous parts of the workflow:
//! the verification run, its progress reporter, event publication, and the
//! host UI's open/close contract.
//!
//! # Concurrency
//! The session sits behind a `tokio::sync::RwLock` that is never held across
//! the classification call. The run and its progress reporter only write back
//! through epoch-checked methods, so a reset (or a close followed by the
//! delayed reset) makes any late tick or result a no-op.

use bagcheck_common::events::{EventBus, WizardEvent, WizardPhase};
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::{
    CaptureSession, ConfirmOutcome, ImageUpload, SessionError, SessionSnapshot,
    VerificationOutcome, VerificationTicket,
};
use crate::services::{ProgressReporter, ProgressSettings, Verifier};

/// Called with `false` when the wizard is dismissed
pub type OpenChangeCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Dependencies shared by every wizard instance
#[derive(Clone)]
pub struct WizardContext {
    pub verifier: Arc<Verifier>,
    pub event_bus: EventBus,
    pub progress: ProgressSettings,
    /// Delay between close and reset, long enough for the dismiss animation
    pub dismiss_reset_delay: Duration,
    /// Most recent verification failure, for health diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

/// Snapshot plus the host-facing open flag
#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot {
    pub open: bool,
    #[serde(flatten)]
    pub session: SessionSnapshot,
}

struct ActiveRun {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

struct WizardInner {
    session_id: Uuid,
    open: AtomicBool,
    session: RwLock<CaptureSession>,
    active_run: Mutex<Option<ActiveRun>>,
    context: WizardContext,
    on_open_change: Option<OpenChangeCallback>,
}

/// Cloneable handle to one wizard instance
#[derive(Clone)]
pub struct WizardHandle {
    inner: Arc<WizardInner>,
}

impl WizardHandle {
    /// Create an open wizard at the first step
    pub fn new(context: WizardContext, on_open_change: Option<OpenChangeCallback>) -> Self {
        let session = CaptureSession::new();
        let session_id = session.session_id();

        tracing::info!(session_id = %session_id, "Wizard session created");

        Self {
            inner: Arc::new(WizardInner {
                session_id,
                open: AtomicBool::new(true),
                session: RwLock::new(session),
                active_run: Mutex::new(None),
                context,
                on_open_change,
            }),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        let session = self.inner.session.read().await;
        WizardSnapshot {
            open: self.is_open(),
            session: session.snapshot(),
        }
    }

    pub async fn phase(&self) -> WizardPhase {
        self.inner.session.read().await.phase()
    }

    /// Show the wizard again after a dismissal
    pub fn open(&self) {
        if !self.inner.open.swap(true, Ordering::SeqCst) {
            self.emit(WizardEvent::OpenChanged {
                session_id: self.inner.session_id,
                open: true,
                timestamp: Utc::now(),
            });
        }
    }

    /// Dismiss the wizard
    ///
    /// Fires `on_open_change(false)` immediately and resets the session once
    /// the dismiss delay has elapsed. An in-flight classification call keeps
    /// running; its result is discarded by the reset. Closing an already
    /// closed wizard does nothing.
    pub fn close(&self) {
        if !self.inner.open.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(callback) = &self.inner.on_open_change {
            callback(false);
        }
        self.emit(WizardEvent::OpenChanged {
            session_id: self.inner.session_id,
            open: false,
            timestamp: Utc::now(),
        });

        let this = self.clone();
        let delay = self.inner.context.dismiss_reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.reset().await;
        });
    }

    /// Store a file for the current step
    pub async fn select_file(&self, image: ImageUpload) -> Result<WizardSnapshot, SessionError> {
        {
            let mut session = self.inner.session.write().await;
            session.select_file(image)?;
            tracing::debug!(
                session_id = %self.inner.session_id,
                part_index = session.current_part_index(),
                "File selected"
            );
        }
        Ok(self.snapshot().await)
    }

    /// Confirm the pending selection; the last part starts verification
    pub async fn confirm_current_part(&self) -> WizardSnapshot {
        let outcome = self.inner.session.write().await.confirm_current_part();

        match outcome {
            ConfirmOutcome::NoSelection => {
                tracing::debug!(session_id = %self.inner.session_id, "Confirm ignored: nothing selected");
            }
            ConfirmOutcome::Advanced { part_name, part_index } => {
                tracing::info!(
                    session_id = %self.inner.session_id,
                    part = %part_name,
                    part_index,
                    "Part confirmed"
                );
                self.emit(WizardEvent::PartConfirmed {
                    session_id: self.inner.session_id,
                    part_name,
                    part_index,
                    timestamp: Utc::now(),
                });
            }
            ConfirmOutcome::ReadyForAnalysis(ticket) => {
                if let Some(last) = ticket.parts.last() {
                    self.emit(WizardEvent::PartConfirmed {
                        session_id: self.inner.session_id,
                        part_name: last.part_name.clone(),
                        part_index: ticket.parts.len() - 1,
                        timestamp: Utc::now(),
                    });
                }
                self.emit(WizardEvent::PhaseChanged {
                    session_id: self.inner.session_id,
                    old_phase: WizardPhase::Collecting,
                    new_phase: WizardPhase::Analyzing,
                    timestamp: Utc::now(),
                });
                tracing::info!(
                    session_id = %self.inner.session_id,
                    parts = ticket.parts.len(),
                    "All parts captured, starting verification"
                );
                self.spawn_verification(ticket);
            }
        }

        self.snapshot().await
    }

    /// Step back one part, discarding its photo
    pub async fn go_to_previous_part(&self) -> WizardSnapshot {
        let removed = {
            let mut session = self.inner.session.write().await;
            session
                .go_to_previous_part()
                .map(|part| (part.part_name, session.current_part_index()))
        };

        if let Some((part_name, part_index)) = removed {
            tracing::info!(
                session_id = %self.inner.session_id,
                part = %part_name,
                "Stepped back, part discarded"
            );
            self.emit(WizardEvent::PartRemoved {
                session_id: self.inner.session_id,
                part_name,
                part_index,
                timestamp: Utc::now(),
            });
        }

        self.snapshot().await
    }

    /// Clear the session back to the first step
    pub async fn reset(&self) -> WizardSnapshot {
        let old_phase = {
            let mut session = self.inner.session.write().await;
            let old_phase = session.phase();
            session.reset();
            old_phase
        };

        let active_run = self.lock_active_run().take();
        if let Some(run) = active_run {
            // Stops the progress reporter; the classification call itself runs on
            run.token.cancel();
        }

        tracing::info!(session_id = %self.inner.session_id, "Session reset");
        if old_phase != WizardPhase::Collecting {
            self.emit(WizardEvent::PhaseChanged {
                session_id: self.inner.session_id,
                old_phase,
                new_phase: WizardPhase::Collecting,
                timestamp: Utc::now(),
            });
        }
        self.emit(WizardEvent::SessionReset {
            session_id: self.inner.session_id,
            timestamp: Utc::now(),
        });

        self.snapshot().await
    }

    /// Wait for the outstanding verification run, if any
    ///
    /// Returns immediately when no run is outstanding or it was abandoned by reset.
    pub async fn wait_for_verification(&self) {
        let task = self.lock_active_run().as_mut().and_then(|run| run.task.take());
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    fn spawn_verification(&self, ticket: VerificationTicket) {
        let token = CancellationToken::new();
        let epoch = ticket.epoch;

        let reporter = {
            let this = self.clone();
            ProgressReporter::start(self.inner.context.progress, token.child_token(), move |progress| {
                let this = this.clone();
                async move { this.apply_progress(epoch, progress).await }
            })
        };

        let this = self.clone();
        let task = tokio::spawn(async move {
            let outcome = this.inner.context.verifier.verify(&ticket.parts).await;
            reporter.stop().await;
            this.finish(epoch, outcome).await;
        });

        *self.lock_active_run() = Some(ActiveRun {
            token,
            task: Some(task),
        });
    }

    async fn apply_progress(&self, epoch: u64, progress: u8) -> bool {
        let applied = self.inner.session.write().await.set_progress(epoch, progress);
        if applied {
            self.emit(WizardEvent::ProgressUpdated {
                session_id: self.inner.session_id,
                progress,
                timestamp: Utc::now(),
            });
        }
        applied
    }

    async fn finish(&self, epoch: u64, outcome: VerificationOutcome) {
        let completed = self
            .inner
            .session
            .write()
            .await
            .complete(epoch, outcome.clone());

        if !completed {
            tracing::info!(
                session_id = %self.inner.session_id,
                epoch,
                "Discarding verification result for reset session"
            );
            return;
        }

        let session_id = self.inner.session_id;
        self.emit(WizardEvent::ProgressUpdated {
            session_id,
            progress: 100,
            timestamp: Utc::now(),
        });
        self.emit(WizardEvent::PhaseChanged {
            session_id,
            old_phase: WizardPhase::Analyzing,
            new_phase: WizardPhase::Done,
            timestamp: Utc::now(),
        });

        match outcome {
            VerificationOutcome::Verified(result) => {
                self.emit(WizardEvent::VerificationCompleted {
                    session_id,
                    overall_score: result.overall_score,
                    band: result.band.as_str().to_string(),
                    source: result.source.as_str().to_string(),
                    timestamp: Utc::now(),
                });
            }
            VerificationOutcome::Failed { kind, message } => {
                *self.inner.context.last_error.write().await = Some(message.clone());
                tracing::warn!(session_id = %session_id, kind = %kind, "Verification ended without a score");
                self.emit(WizardEvent::VerificationFailed {
                    session_id,
                    reason: message,
                    timestamp: Utc::now(),
                });
            }
        }
    }

    fn lock_active_run(&self) -> std::sync::MutexGuard<'_, Option<ActiveRun>> {
        // A poisoned lock only means a panic elsewhere; the Option is still usable
        self.inner
            .active_run
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: WizardEvent) {
        self.inner.context.event_bus.emit_lossy(event);
    }
}
