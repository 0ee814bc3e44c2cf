//! Part catalog endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::models::{PartDefinition, PRIMARY_PART, REQUIRED_PARTS};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PartsResponse {
    /// Part whose photo is sent for classification
    pub primary_part: &'static str,
    pub parts: Vec<PartDefinition>,
}

/// GET /parts
pub async fn list_parts() -> Json<PartsResponse> {
    Json(PartsResponse {
        primary_part: PRIMARY_PART,
        parts: REQUIRED_PARTS.to_vec(),
    })
}

pub fn parts_routes() -> Router<AppState> {
    Router::new().route("/parts", get(list_parts))
}
