//! Room inventory and reservation events.

mod events;
mod stay;

pub use events::{HotelEvent, RoomsCreatedData, RoomsReservedData};
pub use stay::StayRange;

/// Stream kind for room-type events.
pub const ROOM_TYPE_AGGREGATE: &str = "RoomType";

/// Stream kind for reservation events.
pub const RESERVATION_AGGREGATE: &str = "Reservation";
