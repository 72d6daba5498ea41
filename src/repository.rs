// Read-only access to the remote store
//
// Every search goes through this trait; nothing reaches the store through
// ambient state.

use crate::error::RepositoryError;
use crate::model::{CandidateRoom, HotelId, ReservationWindow, RoomId, RoomTypeDetails};
use crate::request::StayInterval;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::future::Future;
use std::time::Duration;

/// One condition of a candidate-room query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPredicate {
    IsActive(bool),
    HotelIs(HotelId),
    MinOccupancy(u32),
}

/// Candidate-room query as a whole value: every predicate must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomQuery {
    predicates: Vec<RoomPredicate>,
}

impl RoomQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: RoomPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[RoomPredicate] {
        &self.predicates
    }

    pub fn hotel(&self) -> Option<HotelId> {
        self.predicates.iter().find_map(|p| match p {
            RoomPredicate::HotelIs(id) => Some(*id),
            _ => None,
        })
    }

    pub fn matches(&self, candidate: &CandidateRoom) -> bool {
        self.predicates.iter().all(|predicate| match *predicate {
            RoomPredicate::IsActive(active) => candidate.room.is_active == active,
            RoomPredicate::HotelIs(hotel_id) => candidate.room.hotel_id == hotel_id,
            RoomPredicate::MinOccupancy(guests) => candidate.room_type.max_occupancy >= guests,
        })
    }
}

/// Conflict status of a single room for a stay, as decided by a store that
/// can answer for many rooms at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomConflict {
    pub room_id: RoomId,
    pub reserved: bool,
    pub blocked_out: bool,
}

impl RoomConflict {
    pub fn is_available(&self) -> bool {
        !self.reserved && !self.blocked_out
    }
}

#[async_trait]
pub trait RoomRepository: Send + Sync + 'static {
    // Exact name match; Ok(None) when no hotel carries the name
    async fn find_hotel_by_exact_name(&self, name: &str)
        -> Result<Option<HotelId>, RepositoryError>;

    // Rooms with their room type, restricted by every predicate of the query
    async fn list_rooms(&self, query: &RoomQuery) -> Result<Vec<CandidateRoom>, RepositoryError>;

    async fn list_reservations_for_room(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<ReservationWindow>, RepositoryError>;

    // Blockout dates with from <= date < to
    async fn list_blockout_dates_for_room(
        &self,
        room_id: RoomId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, RepositoryError>;

    async fn get_room_type_details(
        &self,
        room_type_name: &str,
    ) -> Result<Option<RoomTypeDetails>, RepositoryError>;

    /// Conflict status for a batch of rooms in one round trip.
    ///
    /// Returns `Ok(None)` when the store has no batch capability, in which
    /// case callers fall back to per-room reads.
    async fn room_conflicts(
        &self,
        _room_ids: &[RoomId],
        _stay: StayInterval,
    ) -> Result<Option<Vec<RoomConflict>>, RepositoryError> {
        Ok(None)
    }
}

// Bounds a store call; an elapsed deadline becomes a read failure
pub async fn with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(RepositoryError::Timeout(timeout.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Room, RoomType, RoomTypeId};

    fn candidate(hotel: i64, occupancy: u32, active: bool) -> CandidateRoom {
        CandidateRoom {
            room: Room {
                id: RoomId(1),
                hotel_id: HotelId(hotel),
                room_type_id: RoomTypeId(1),
                room_number: "101".to_string(),
                is_active: active,
            },
            room_type: RoomType {
                id: RoomTypeId(1),
                hotel_id: HotelId(hotel),
                name: "Standard".to_string(),
                max_occupancy: occupancy,
                base_price_per_night: Some(80.0),
                amenities: vec![],
            },
        }
    }

    #[test]
    fn test_query_matches_all_predicates() {
        let query = RoomQuery::new()
            .with(RoomPredicate::IsActive(true))
            .with(RoomPredicate::HotelIs(HotelId(2)))
            .with(RoomPredicate::MinOccupancy(3));

        assert!(query.matches(&candidate(2, 3, true)));
        assert!(query.matches(&candidate(2, 4, true)));
        assert!(!query.matches(&candidate(2, 2, true)));
        assert!(!query.matches(&candidate(1, 4, true)));
        assert!(!query.matches(&candidate(2, 4, false)));
        assert_eq!(query.hotel(), Some(HotelId(2)));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = RoomQuery::new();
        assert!(query.matches(&candidate(9, 1, false)));
        assert_eq!(query.hotel(), None);
    }

    #[tokio::test]
    async fn test_with_timeout_maps_elapsed_deadline() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, RepositoryError>(())
        };
        let result = with_timeout(Duration::from_millis(10), slow).await;
        assert_eq!(result, Err(RepositoryError::Timeout(10)));

        let fast = async { Ok::<_, RepositoryError>(5) };
        assert_eq!(with_timeout(Duration::from_millis(10), fast).await, Ok(5));
    }
}
