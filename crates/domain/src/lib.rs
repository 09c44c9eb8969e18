//! Domain layer for the hotel reservation system.
//!
//! This crate provides:
//! - [`DomainEvent`] for events that can be written to the event store
//! - The [`HotelEvent`] catalog consumed by the read side
//! - [`StayRange`], the half-open night range shared by bookings and queries

pub mod error;
pub mod event;
pub mod hotel;

pub use common::{HotelId, ReservationId, RoomTypeId};
pub use error::DomainError;
pub use event::DomainEvent;
pub use hotel::{HotelEvent, RoomsCreatedData, RoomsReservedData, StayRange};
