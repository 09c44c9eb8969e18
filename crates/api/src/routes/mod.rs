//! HTTP route handlers.

pub mod events;
pub mod health;
pub mod metrics;
pub mod room_types;
pub mod vacancies;

use std::sync::Arc;

use event_store::EventStore;
use projections::{ProjectionError, ProjectionProcessor, VacancyProjector, VacancyRepository};

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub event_store: S,
    pub vacancies: VacancyRepository,
    pub projector: VacancyProjector,
    pub projection_processor: Arc<ProjectionProcessor<S>>,
}

impl<S: EventStore> AppState<S> {
    /// Brings the read model as close to the log head as it will go.
    ///
    /// A failed catch-up leaves the view at its last good position. Reads are
    /// still served from it; `/health` reports the lag.
    pub async fn refresh(&self) -> Option<ProjectionError> {
        match self.projection_processor.run_catch_up().await {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(error = %err, "projection catch-up failed, serving last good view");
                ::metrics::counter!("api_catch_up_failures").increment(1);
                Some(err)
            }
        }
    }
}
