//! Event ingestion endpoint.
//!
//! Stands in for the write side: an event is checked against the current
//! vacancy view before it is appended, so the log only ever holds events the
//! projection accepts.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::{DomainEvent, HotelEvent};
use event_store::{AppendOptions, EventStore};
use projections::{ProjectionError, VacancyError};
use serde::Serialize;

use super::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct EventAcceptedResponse {
    pub event_id: String,
    pub event_type: String,
    pub aggregate_id: String,
    pub version: i64,
    pub position: u64,
}

/// POST /events: validate a hotel event, append it and project it.
#[tracing::instrument(skip(state, event), fields(event_type = event.event_type()))]
pub async fn publish<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(event): Json<HotelEvent>,
) -> Result<(StatusCode, Json<EventAcceptedResponse>), ApiError> {
    state.refresh().await;
    validate(&state, &event)
        .await
        .map_err(|err| ApiError::Projection(ProjectionError::Vacancy(err)))?;

    // Room types and reservations are single-event streams; a second event
    // for the same id is a conflict, even when racing another request.
    let envelope = event.to_envelope(event_store::Version::first())?;
    let event_id = envelope.event_id;
    let aggregate_id = envelope.aggregate_id;
    state
        .event_store
        .append(vec![envelope], AppendOptions::expect_new())
        .await?;

    let stored = state
        .event_store
        .get_events_for_aggregate(aggregate_id)
        .await?
        .into_iter()
        .find(|e| e.event_id == event_id)
        .ok_or_else(|| ApiError::Internal(format!("Event {event_id} missing after append")))?;

    metrics::counter!("api_events_published", "event_type" => stored.event_type.clone())
        .increment(1);

    state.refresh().await;

    Ok((
        StatusCode::CREATED,
        Json(EventAcceptedResponse {
            event_id: stored.event_id.to_string(),
            event_type: stored.event_type,
            aggregate_id: stored.aggregate_id.to_string(),
            version: stored.version.as_i64(),
            position: stored.position.as_u64(),
        }),
    ))
}

/// Rejects events the vacancy projection would refuse to apply.
async fn validate<S: EventStore>(
    state: &AppState<S>,
    event: &HotelEvent,
) -> Result<(), VacancyError> {
    match event {
        HotelEvent::RoomsCreated(data) => {
            state
                .vacancies
                .check_room_type(data.room_type_id, data.total_units)
                .await
        }
        HotelEvent::RoomsReserved(data) => {
            state
                .vacancies
                .check_reservation(data.check_in, data.check_out, data.room_type_id, data.units)
                .await
        }
        _ => Ok(()),
    }
}
