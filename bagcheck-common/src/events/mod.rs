//! Event system for bagcheck
//!
//! Provides shared event definitions and the EventBus used by the wizard
//! service to publish session activity to SSE subscribers.

mod wizard_types;

pub use wizard_types::WizardPhase;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Wizard event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WizardEvent {
    /// Wizard opened or dismissed by the host UI
    OpenChanged {
        session_id: Uuid,
        open: bool,
        timestamp: DateTime<Utc>,
    },

    /// Session phase changed
    PhaseChanged {
        session_id: Uuid,
        old_phase: WizardPhase,
        new_phase: WizardPhase,
        timestamp: DateTime<Utc>,
    },

    /// A part photo was confirmed
    PartConfirmed {
        session_id: Uuid,
        part_name: String,
        /// 0-based step index of the confirmed part
        part_index: usize,
        timestamp: DateTime<Utc>,
    },

    /// The most recently confirmed part was discarded by back-navigation
    PartRemoved {
        session_id: Uuid,
        part_name: String,
        part_index: usize,
        timestamp: DateTime<Utc>,
    },

    /// Simulated analysis progress
    ///
    /// Emitted on every progress tick; high frequency, no subscriber required.
    ProgressUpdated {
        session_id: Uuid,
        /// Percentage (0-100)
        progress: u8,
        timestamp: DateTime<Utc>,
    },

    /// Verification produced a scored result
    VerificationCompleted {
        session_id: Uuid,
        overall_score: u8,
        /// "pass", "review" or "fail"
        band: String,
        /// Endpoint that produced the material score ("primary" or "secondary")
        source: String,
        timestamp: DateTime<Utc>,
    },

    /// Verification could not produce a score
    VerificationFailed {
        session_id: Uuid,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Session cleared back to the first step
    SessionReset {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl WizardEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &str {
        match self {
            WizardEvent::OpenChanged { .. } => "OpenChanged",
            WizardEvent::PhaseChanged { .. } => "PhaseChanged",
            WizardEvent::PartConfirmed { .. } => "PartConfirmed",
            WizardEvent::PartRemoved { .. } => "PartRemoved",
            WizardEvent::ProgressUpdated { .. } => "ProgressUpdated",
            WizardEvent::VerificationCompleted { .. } => "VerificationCompleted",
            WizardEvent::VerificationFailed { .. } => "VerificationFailed",
            WizardEvent::SessionReset { .. } => "SessionReset",
        }
    }

    /// Session the event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            WizardEvent::OpenChanged { session_id, .. }
            | WizardEvent::PhaseChanged { session_id, .. }
            | WizardEvent::PartConfirmed { session_id, .. }
            | WizardEvent::PartRemoved { session_id, .. }
            | WizardEvent::ProgressUpdated { session_id, .. }
            | WizardEvent::VerificationCompleted { session_id, .. }
            | WizardEvent::VerificationFailed { session_id, .. }
            | WizardEvent::SessionReset { session_id, .. } => *session_id,
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use bagcheck_common::events::{EventBus, WizardEvent};
/// use uuid::Uuid;
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(WizardEvent::SessionReset {
///     session_id: Uuid::new_v4(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WizardEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: WizardEvent,
    ) -> Result<usize, broadcast::error::SendError<WizardEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: WizardEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let session_id = Uuid::new_v4();
        let event = WizardEvent::PhaseChanged {
            session_id,
            old_phase: WizardPhase::Collecting,
            new_phase: WizardPhase::Analyzing,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PhaseChanged");
        assert_eq!(json["old_phase"], "collecting");
        assert_eq!(json["new_phase"], "analyzing");
        assert_eq!(event.event_type(), "PhaseChanged");
        assert_eq!(event.session_id(), session_id);
    }

    #[test]
    fn test_emit_without_subscribers_is_err() {
        let bus = EventBus::new(10);
        let result = bus.emit(WizardEvent::SessionReset {
            session_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        });
        assert!(result.is_err());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_emitted_event() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();
        let session_id = Uuid::new_v4();

        let delivered = bus
            .emit(WizardEvent::ProgressUpdated {
                session_id,
                progress: 40,
                timestamp: Utc::now(),
            })
            .unwrap();
        assert_eq!(delivered, 1);

        match rx.recv().await.unwrap() {
            WizardEvent::ProgressUpdated { progress, .. } => assert_eq!(progress, 40),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
