//! Read models and projections for the CQRS query side.
//!
//! This crate provides the query side of the hotel system:
//! - [`Projection`] trait for folding stored events into read models
//! - [`ReadModel`] trait for query access to denormalized data
//! - [`ProjectionProcessor`] for feeding events from the store to projections
//! - The vacancy read model: [`VacancyRepository`] answers availability
//!   queries, [`VacancyProjector`] keeps it in sync with the event stream

pub mod error;
pub mod processor;
pub mod projection;
pub mod read_model;
pub mod vacancy;

pub use error::{ProjectionError, Result, VacancyError};
pub use processor::{FailurePolicy, ProjectionProcessor};
pub use projection::{Projection, ProjectionPosition};
pub use read_model::ReadModel;
pub use vacancy::{Reservation, RoomType, VacancyProjector, VacancyRepository, VacancyView};
