//! Domain error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while building domain values or events.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Check-out must fall strictly after check-in.
    #[error("Invalid stay: check-out {check_out} is not after check-in {check_in}")]
    InvalidStayRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// An event could not be wrapped for the store.
    #[error("Event store error: {0}")]
    EventStore(#[from] event_store::EventStoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
