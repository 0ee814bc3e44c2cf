//! bagcheck-wizard library interface
//!
//! Exposes the wizard state machine, classification services and HTTP
//! router for the service binary and integration tests.

pub mod api;
pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use bagcheck_common::events::EventBus;
use bagcheck_common::ServiceConfig;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::services::{ProgressSettings, Verifier};
use crate::workflow::{WizardContext, WizardHandle};

/// Largest accepted image upload
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Open wizard sessions by id
    pub sessions: Arc<RwLock<HashMap<Uuid, WizardHandle>>>,
    /// Shared dependencies handed to each new wizard
    pub wizard_context: WizardContext,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: &ServiceConfig, verifier: Arc<Verifier>, event_bus: EventBus) -> Self {
        let last_error = Arc::new(RwLock::new(None));
        let wizard_context = WizardContext {
            verifier,
            event_bus: event_bus.clone(),
            progress: ProgressSettings::from(config),
            dismiss_reset_delay: config.dismiss_reset_delay(),
            last_error: last_error.clone(),
        };

        Self {
            event_bus,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            wizard_context,
            startup_time: Utc::now(),
            last_error,
        }
    }

    /// Look up an open wizard session
    pub async fn wizard(&self, session_id: Uuid) -> ApiResult<WizardHandle> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Wizard session {}", session_id)))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::wizard_routes())
        .merge(api::parts_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
