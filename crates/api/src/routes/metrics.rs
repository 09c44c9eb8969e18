//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use projections::VacancyRepository;

/// State for the metrics router, kept apart from the generic [`AppState`](super::AppState).
#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
    pub vacancies: VacancyRepository,
}

/// GET /metrics: read-model gauges plus everything recorded so far, in Prometheus text.
pub async fn get(State(state): State<MetricsState>) -> impl IntoResponse {
    let room_types = state.vacancies.room_types().await.len();
    let reservations = state.vacancies.reservation_count().await;
    metrics::gauge!("vacancy_room_types").set(room_types as f64);
    metrics::gauge!("vacancy_reservations").set(reservations as f64);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.handle.render(),
    )
}
