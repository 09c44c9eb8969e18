//! Vacancy search endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chrono::NaiveDate;
use event_store::EventStore;
use projections::VacancyView;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct VacancyQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Serialize)]
pub struct VacancyResponse {
    pub room_type_id: String,
    pub description: String,
    pub total_units: u32,
    pub units_available: u32,
}

impl From<VacancyView> for VacancyResponse {
    fn from(view: VacancyView) -> Self {
        Self {
            room_type_id: view.room_type_id.to_string(),
            description: view.description,
            total_units: view.total_units,
            units_available: view.units_available,
        }
    }
}

/// GET /vacancies?check_in=..&check_out=..: availability per room type.
#[tracing::instrument(skip(state))]
pub async fn search<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<VacancyQuery>,
) -> Result<Json<Vec<VacancyResponse>>, ApiError> {
    state.refresh().await;

    let vacancies = state
        .vacancies
        .find_vacancies(query.check_in, query.check_out)
        .await?;

    Ok(Json(
        vacancies.into_iter().map(VacancyResponse::from).collect(),
    ))
}
