//! Room type lookup endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::RoomTypeId;
use event_store::EventStore;
use serde::Serialize;

use super::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct RoomTypeResponse {
    pub room_type_id: String,
    pub hotel_id: String,
    pub description: String,
    pub total_units: u32,
    pub reservations: Vec<ReservationResponse>,
}

#[derive(Serialize)]
pub struct ReservationResponse {
    pub reservation_id: String,
    pub check_in: String,
    pub check_out: String,
    pub guest_name: String,
    pub units: u32,
}

/// GET /room-types/{id}: a room type and the reservations recorded against it.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<RoomTypeResponse>, ApiError> {
    let room_type_id: RoomTypeId = id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;

    state.refresh().await;

    let room_type = state
        .vacancies
        .room_type(room_type_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Room type {id} not found")))?;

    let reservations = state
        .vacancies
        .reservations_for(room_type_id)
        .await
        .into_iter()
        .map(|r| ReservationResponse {
            reservation_id: r.id.to_string(),
            check_in: r.stay.check_in().to_string(),
            check_out: r.stay.check_out().to_string(),
            guest_name: r.guest_name,
            units: r.units,
        })
        .collect();

    Ok(Json(RoomTypeResponse {
        room_type_id: room_type.id.to_string(),
        hotel_id: room_type.hotel_id.to_string(),
        description: room_type.description,
        total_units: room_type.total_units,
        reservations,
    }))
}
