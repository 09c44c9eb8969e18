//! Identifier types shared across the hotel vacancy crates.

mod types;

pub use types::{AggregateId, HotelId, ReservationId, RoomTypeId};
