//! Server-Sent Events (SSE) for wizard sessions
//!
//! Streams one session's events: phase changes, part confirmations, progress
//! ticks and the final verdict.

use crate::error::ApiResult;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// GET /wizard/:session_id/events - SSE event stream for one wizard session
pub async fn wizard_event_stream(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    // 404 for unknown sessions before the stream opens
    state.wizard(session_id).await?;

    info!(session_id = %session_id, "New SSE client connected to wizard events");

    let mut rx = state.event_bus.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) if event.session_id() == session_id => {
                    let event_type = event.event_type().to_string();
                    match serde_json::to_string(&event) {
                        Ok(event_json) => {
                            debug!(session_id = %session_id, "SSE: Sending {}", event_type);
                            yield Ok(Event::default().event(event_type).data(event_json));
                        }
                        Err(e) => {
                            warn!("SSE: Failed to serialize event {}: {}", event_type, e);
                        }
                    }
                }
                Ok(_) => {
                    // Another session's event
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(session_id = %session_id, skipped, "SSE: Subscriber lagged, events dropped");
                }
                Err(RecvError::Closed) => {
                    info!(session_id = %session_id, "SSE: Event bus closed, ending stream");
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    ))
}
