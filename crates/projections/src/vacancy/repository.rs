//! Vacancy read model: room types, their reservations, and availability queries.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use common::{HotelId, ReservationId, RoomTypeId};
use domain::StayRange;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::VacancyError;
use crate::read_model::ReadModel;

/// A category of room with a fixed number of units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomType {
    pub id: RoomTypeId,
    pub description: String,
    pub total_units: u32,
    pub hotel_id: HotelId,
}

/// A booking of some units of a room type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: ReservationId,
    pub stay: StayRange,
    pub room_type_id: RoomTypeId,
    pub guest_name: String,
    pub units: u32,
}

/// Availability of one room type over a queried stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VacancyView {
    pub room_type_id: RoomTypeId,
    pub description: String,
    pub total_units: u32,
    pub units_available: u32,
}

#[derive(Default)]
struct VacancyState {
    /// Creation order is the query result order.
    room_types: Vec<RoomType>,
    index: HashMap<RoomTypeId, usize>,
    reservations: HashMap<RoomTypeId, Vec<Reservation>>,
    reservation_ids: HashSet<ReservationId>,
}

fn stay_range(check_in: NaiveDate, check_out: NaiveDate) -> Result<StayRange, VacancyError> {
    StayRange::new(check_in, check_out).map_err(|_| VacancyError::InvalidRange {
        check_in,
        check_out,
    })
}

impl VacancyState {
    fn check_room_type(&self, id: RoomTypeId, total_units: u32) -> Result<(), VacancyError> {
        if total_units == 0 {
            return Err(VacancyError::InvalidUnits { units: total_units });
        }
        if self.index.contains_key(&id) {
            return Err(VacancyError::DuplicateRoomType(id));
        }
        Ok(())
    }

    /// Range first, then units, then the room type lookup.
    fn check_reservation(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_type_id: RoomTypeId,
        units: u32,
    ) -> Result<StayRange, VacancyError> {
        let stay = stay_range(check_in, check_out)?;
        if units < 1 {
            return Err(VacancyError::InvalidUnits { units });
        }
        if !self.index.contains_key(&room_type_id) {
            return Err(VacancyError::UnknownRoomType(room_type_id));
        }
        Ok(stay)
    }

    fn vacancy(&self, room_type: &RoomType, stay: &StayRange) -> VacancyView {
        let booked: u64 = self
            .reservations
            .get(&room_type.id)
            .into_iter()
            .flatten()
            .filter(|r| r.stay.overlaps(stay))
            .map(|r| u64::from(r.units))
            .sum();

        // Capacity is enforced on the write side; over-booking only clamps here.
        let units_available = u64::from(room_type.total_units).saturating_sub(booked) as u32;

        VacancyView {
            room_type_id: room_type.id,
            description: room_type.description.clone(),
            total_units: room_type.total_units,
            units_available,
        }
    }
}

/// In-memory store of room types and reservations.
///
/// Cloning is cheap and every clone sees the same data. All access goes
/// through one reader-writer lock, so queries never observe a half-applied
/// event.
#[derive(Clone, Default)]
pub struct VacancyRepository {
    state: Arc<RwLock<VacancyState>>,
}

impl VacancyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new room type.
    pub async fn add_room_type(
        &self,
        id: RoomTypeId,
        description: impl Into<String>,
        total_units: u32,
        hotel_id: HotelId,
    ) -> Result<(), VacancyError> {
        let mut state = self.state.write().await;
        state.check_room_type(id, total_units)?;

        let position = state.room_types.len();
        state.room_types.push(RoomType {
            id,
            description: description.into(),
            total_units,
            hotel_id,
        });
        state.index.insert(id, position);

        tracing::debug!(room_type_id = %id, total_units, "room type added");
        Ok(())
    }

    /// Records a reservation against a registered room type.
    ///
    /// A reservation id that is already present is ignored, so redelivered
    /// events never count twice.
    pub async fn add_reservation(
        &self,
        id: ReservationId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_type_id: RoomTypeId,
        guest_name: impl Into<String>,
        units: u32,
    ) -> Result<(), VacancyError> {
        let mut state = self.state.write().await;
        let stay = state.check_reservation(check_in, check_out, room_type_id, units)?;
        if !state.reservation_ids.insert(id) {
            tracing::debug!(reservation_id = %id, "reservation already recorded, ignoring");
            return Ok(());
        }

        state
            .reservations
            .entry(room_type_id)
            .or_default()
            .push(Reservation {
                id,
                stay,
                room_type_id,
                guest_name: guest_name.into(),
                units,
            });

        tracing::debug!(reservation_id = %id, %room_type_id, %stay, units, "reservation added");
        Ok(())
    }

    /// Returns the error [`add_room_type`](Self::add_room_type) would raise, without
    /// changing anything.
    pub async fn check_room_type(
        &self,
        id: RoomTypeId,
        total_units: u32,
    ) -> Result<(), VacancyError> {
        self.state.read().await.check_room_type(id, total_units)
    }

    /// Returns the error [`add_reservation`](Self::add_reservation) would raise, without
    /// changing anything. Repeated reservation ids pass, as they do on insert.
    pub async fn check_reservation(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_type_id: RoomTypeId,
        units: u32,
    ) -> Result<(), VacancyError> {
        self.state
            .read()
            .await
            .check_reservation(check_in, check_out, room_type_id, units)
            .map(|_| ())
    }

    /// Availability of every room type for `[check_in, check_out)`, in creation order.
    ///
    /// Fails only when the range itself is empty or inverted.
    pub async fn find_vacancies(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<VacancyView>, VacancyError> {
        let stay = stay_range(check_in, check_out)?;
        Ok(self.find_vacancies_for(&stay).await)
    }

    /// Availability of every room type for an already validated stay.
    pub async fn find_vacancies_for(&self, stay: &StayRange) -> Vec<VacancyView> {
        let started = Instant::now();
        let state = self.state.read().await;

        let views: Vec<VacancyView> = state
            .room_types
            .iter()
            .map(|room_type| state.vacancy(room_type, stay))
            .collect();

        metrics::counter!("vacancy_queries_total").increment(1);
        metrics::histogram!("vacancy_query_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        views
    }

    pub async fn room_type(&self, id: RoomTypeId) -> Option<RoomType> {
        let state = self.state.read().await;
        state.index.get(&id).map(|&i| state.room_types[i].clone())
    }

    /// Every room type in creation order.
    pub async fn room_types(&self) -> Vec<RoomType> {
        self.state.read().await.room_types.clone()
    }

    pub async fn reservations_for(&self, room_type_id: RoomTypeId) -> Vec<Reservation> {
        self.state
            .read()
            .await
            .reservations
            .get(&room_type_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn reservation_count(&self) -> usize {
        self.state.read().await.reservation_ids.len()
    }

    /// Drops all room types and reservations.
    pub async fn clear(&self) {
        *self.state.write().await = VacancyState::default();
    }
}

impl ReadModel for VacancyRepository {
    fn name(&self) -> &'static str {
        "VacancyRepository"
    }

    fn count(&self) -> usize {
        self.state
            .try_read()
            .map(|s| s.room_types.len())
            .unwrap_or(0)
    }
}
