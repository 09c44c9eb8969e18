//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use event_store::EventStore;
use projections::{Projection, ReadModel};
use serde::Serialize;

use super::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub read_model: &'static str,
    pub room_types: usize,
    pub projections: usize,
    pub failure_policy: String,
    pub projection_position: u64,
    pub head_position: u64,
    pub lag: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /health: 200 while the vacancy view has reached the log head, 503 when
/// the projection is stuck behind it.
pub async fn check<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<(StatusCode, Json<HealthResponse>), ApiError> {
    let error = state.refresh().await;

    let projection_position = state.projector.position().await.last_position.as_u64();
    let head_position = state.event_store.head_position().await?.as_u64();
    let lag = head_position.saturating_sub(projection_position);

    let (status_code, status) = if lag == 0 {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    Ok((
        status_code,
        Json(HealthResponse {
            status,
            read_model: state.vacancies.name(),
            room_types: state.vacancies.count(),
            projections: state.projection_processor.projection_count(),
            failure_policy: state.projection_processor.failure_policy().to_string(),
            projection_position,
            head_position,
            lag,
            error: error.map(|e| e.to_string()),
        }),
    ))
}
