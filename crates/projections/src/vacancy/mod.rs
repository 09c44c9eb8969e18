//! Vacancy read model.
//!
//! Answers "which room types have free units for `[check_in, check_out)`?"
//! from room-type and reservation events.

mod projector;
mod repository;

pub use projector::VacancyProjector;
pub use repository::{Reservation, RoomType, VacancyRepository, VacancyView};
