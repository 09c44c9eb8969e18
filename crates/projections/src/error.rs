//! Projection error types.

use chrono::NaiveDate;
use common::RoomTypeId;
use thiserror::Error;

/// Contract violations raised by the vacancy repository.
///
/// These signal bad data from the write side rather than expected runtime
/// conditions. The projector never swallows them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VacancyError {
    #[error("Room type {0} already exists")]
    DuplicateRoomType(RoomTypeId),

    #[error("Unknown room type: {0}")]
    UnknownRoomType(RoomTypeId),

    #[error("Invalid range: check-out {check_out} is not after check-in {check_in}")]
    InvalidRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Invalid units: {units} (must be at least 1)")]
    InvalidUnits { units: u32 },
}

/// Errors that can occur during projection processing.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] event_store::EventStoreError),

    /// Failed to deserialize an event payload.
    #[error("Event deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The vacancy repository rejected an event.
    #[error("Vacancy error: {0}")]
    Vacancy(#[from] VacancyError),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
