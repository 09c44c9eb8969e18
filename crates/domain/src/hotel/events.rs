//! Hotel domain events.

use chrono::NaiveDate;
use common::{AggregateId, HotelId, ReservationId, RoomTypeId};
use serde::{Deserialize, Serialize};

use super::{RESERVATION_AGGREGATE, ROOM_TYPE_AGGREGATE, StayRange};
use crate::DomainEvent;

/// Events emitted by the hotel write side.
///
/// New variants may be added as the catalog grows; consumers must treat
/// variants they do not know as no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
#[non_exhaustive]
pub enum HotelEvent {
    /// A room type was added to a hotel's inventory.
    RoomsCreated(RoomsCreatedData),

    /// Units of a room type were booked for a stay.
    RoomsReserved(RoomsReservedData),
}

impl HotelEvent {
    /// Every event type this catalog can decode.
    pub const KNOWN_TYPES: &'static [&'static str] = &["RoomsCreated", "RoomsReserved"];

    /// Returns true if an envelope with this event type can be decoded as a `HotelEvent`.
    pub fn is_known(event_type: &str) -> bool {
        Self::KNOWN_TYPES.contains(&event_type)
    }

    pub fn rooms_created(
        room_type_id: RoomTypeId,
        description: impl Into<String>,
        total_units: u32,
        hotel_id: HotelId,
    ) -> Self {
        HotelEvent::RoomsCreated(RoomsCreatedData {
            room_type_id,
            description: description.into(),
            total_units,
            hotel_id,
        })
    }

    pub fn rooms_reserved(
        reservation_id: ReservationId,
        stay: StayRange,
        room_type_id: RoomTypeId,
        guest_name: impl Into<String>,
        units: u32,
    ) -> Self {
        HotelEvent::RoomsReserved(RoomsReservedData {
            reservation_id,
            check_in: stay.check_in(),
            check_out: stay.check_out(),
            room_type_id,
            guest_name: guest_name.into(),
            units,
        })
    }
}

impl DomainEvent for HotelEvent {
    fn event_type(&self) -> &'static str {
        match self {
            HotelEvent::RoomsCreated(_) => "RoomsCreated",
            HotelEvent::RoomsReserved(_) => "RoomsReserved",
        }
    }

    fn aggregate_type(&self) -> &'static str {
        match self {
            HotelEvent::RoomsCreated(_) => ROOM_TYPE_AGGREGATE,
            HotelEvent::RoomsReserved(_) => RESERVATION_AGGREGATE,
        }
    }

    fn aggregate_id(&self) -> AggregateId {
        match self {
            HotelEvent::RoomsCreated(data) => data.room_type_id.into(),
            HotelEvent::RoomsReserved(data) => data.reservation_id.into(),
        }
    }
}

/// Data for the RoomsCreated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomsCreatedData {
    pub room_type_id: RoomTypeId,

    /// Human-readable name, e.g. "Double Room".
    pub description: String,

    /// Number of physical units of this type.
    pub total_units: u32,

    pub hotel_id: HotelId,
}

/// Data for the RoomsReserved event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomsReservedData {
    pub reservation_id: ReservationId,

    /// First occupied night.
    pub check_in: NaiveDate,

    /// Departure day, not occupied.
    pub check_out: NaiveDate,

    pub room_type_id: RoomTypeId,

    pub guest_name: String,

    /// Number of units booked.
    pub units: u32,
}
