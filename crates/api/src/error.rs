//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use event_store::EventStoreError;
use projections::{ProjectionError, VacancyError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The vacancy projection rejected an event or could not read the log.
    Projection(ProjectionError),
    /// Appending to the event store failed.
    EventStore(EventStoreError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Projection(err) => projection_error_to_response(err),
            ApiError::EventStore(err) => event_store_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn projection_error_to_response(err: ProjectionError) -> (StatusCode, String) {
    match &err {
        ProjectionError::Vacancy(vacancy_err) => match vacancy_err {
            VacancyError::DuplicateRoomType(_) => (StatusCode::CONFLICT, err.to_string()),
            VacancyError::UnknownRoomType(_)
            | VacancyError::InvalidRange { .. }
            | VacancyError::InvalidUnits { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
        },
        ProjectionError::EventStore(store_err) => match store_err {
            EventStoreError::ConcurrencyConflict { .. } => (StatusCode::CONFLICT, err.to_string()),
            _ => {
                tracing::error!(error = %err, "projection failed to read the event store");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        },
        ProjectionError::Deserialization(_) => {
            tracing::error!(error = %err, "projection failed to decode a stored event");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn event_store_error_to_response(err: EventStoreError) -> (StatusCode, String) {
    match &err {
        EventStoreError::ConcurrencyConflict { .. } => (StatusCode::CONFLICT, err.to_string()),
        EventStoreError::InvalidAppend(_) | EventStoreError::IncompleteEnvelope(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        EventStoreError::Serialization(_) => {
            tracing::error!(error = %err, "event store serialization failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<ProjectionError> for ApiError {
    fn from(err: ProjectionError) -> Self {
        ApiError::Projection(err)
    }
}

impl From<VacancyError> for ApiError {
    fn from(err: VacancyError) -> Self {
        match err {
            VacancyError::InvalidRange { .. } => ApiError::BadRequest(err.to_string()),
            other => ApiError::Projection(other.into()),
        }
    }
}

impl From<EventStoreError> for ApiError {
    fn from(err: EventStoreError) -> Self {
        ApiError::EventStore(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::EventStore(store_err) => ApiError::EventStore(store_err),
            DomainError::InvalidStayRange { .. } => ApiError::BadRequest(err.to_string()),
            DomainError::Serialization(_) => ApiError::Internal(err.to_string()),
        }
    }
}
