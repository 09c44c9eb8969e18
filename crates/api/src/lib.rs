//! HTTP API server with observability for the hotel read side.
//!
//! Serves vacancy searches from the projected read model, accepts hotel
//! events into the shared log, and exposes health and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use projections::{FailurePolicy, ProjectionProcessor, VacancyProjector, VacancyRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;
use routes::metrics::MetricsState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(MetricsState {
            handle: metrics_handle,
            vacancies: state.vacancies.clone(),
        });

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/vacancies", get(routes::vacancies::search::<S>))
        .route("/room-types/{id}", get(routes::room_types::get::<S>))
        .route("/events", post(routes::events::publish::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the vacancy repository, its projector and the processor over `event_store`.
pub fn create_default_state<S: EventStore + Clone + 'static>(
    event_store: S,
    failure_policy: FailurePolicy,
) -> (Arc<AppState<S>>, Arc<ProjectionProcessor<S>>) {
    let vacancies = VacancyRepository::new();

    let projector = VacancyProjector::new(vacancies.clone());

    let mut processor =
        ProjectionProcessor::new(event_store.clone()).with_failure_policy(failure_policy);
    processor.register(Box::new(projector.clone()));
    let processor = Arc::new(processor);

    let state = Arc::new(AppState {
        event_store,
        vacancies,
        projector,
        projection_processor: processor.clone(),
    });

    (state, processor)
}
