//! Feeds hotel events into the vacancy repository.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{DomainEvent, HotelEvent};
use event_store::EventEnvelope;
use tokio::sync::RwLock;

use super::VacancyRepository;
use crate::Result;
use crate::error::VacancyError;
use crate::projection::{Projection, ProjectionPosition};

/// Projection that keeps a [`VacancyRepository`] in step with the event log.
///
/// The projector holds no business rules: each known event maps to exactly
/// one repository call and repository errors are returned untouched.
#[derive(Clone)]
pub struct VacancyProjector {
    repository: VacancyRepository,
    position: Arc<RwLock<ProjectionPosition>>,
}

impl VacancyProjector {
    pub fn new(repository: VacancyRepository) -> Self {
        Self {
            repository,
            position: Arc::new(RwLock::new(ProjectionPosition::zero())),
        }
    }

    pub fn repository(&self) -> &VacancyRepository {
        &self.repository
    }

    /// Applies a single hotel event to the repository.
    pub async fn apply(&self, event: &HotelEvent) -> std::result::Result<(), VacancyError> {
        match event {
            HotelEvent::RoomsCreated(data) => {
                self.repository
                    .add_room_type(
                        data.room_type_id,
                        data.description.as_str(),
                        data.total_units,
                        data.hotel_id,
                    )
                    .await
            }
            HotelEvent::RoomsReserved(data) => {
                self.repository
                    .add_reservation(
                        data.reservation_id,
                        data.check_in,
                        data.check_out,
                        data.room_type_id,
                        data.guest_name.as_str(),
                        data.units,
                    )
                    .await
            }
            other => {
                tracing::debug!(event_type = other.event_type(), "no vacancy handler");
                Ok(())
            }
        }
    }

    async fn mark_consumed(&self, event: &EventEnvelope) {
        let mut position = self.position.write().await;
        *position = position.advance_to(event.position);
    }
}

#[async_trait]
impl Projection for VacancyProjector {
    fn name(&self) -> &'static str {
        "VacancyProjector"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        if HotelEvent::is_known(&event.event_type) {
            let hotel_event: HotelEvent = serde_json::from_value(event.payload.clone())?;
            self.apply(&hotel_event).await?;
        } else {
            tracing::trace!(event_type = %event.event_type, "ignoring unrelated event");
            metrics::counter!("projections_events_ignored").increment(1);
        }

        self.mark_consumed(event).await;
        Ok(())
    }

    async fn skip(&self, event: &EventEnvelope) {
        self.mark_consumed(event).await;
    }

    async fn position(&self) -> ProjectionPosition {
        *self.position.read().await
    }

    async fn reset(&self) -> Result<()> {
        self.repository.clear().await;
        *self.position.write().await = ProjectionPosition::zero();
        Ok(())
    }
}
