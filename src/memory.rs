// In-process store with the same read contract as the hosted one.
// Used by tests and benchmarks; supports fault injection and batch checks.

use crate::error::RepositoryError;
use crate::model::{
    BlockoutDate, CandidateRoom, Hotel, HotelId, Reservation, ReservationWindow, Room, RoomId,
    RoomType, RoomTypeDetails, RoomTypeId,
};
use crate::repository::{RoomConflict, RoomQuery, RoomRepository};
use crate::request::StayInterval;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

// Read counters, handy for asserting which calls a search made
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadStats {
    pub hotel_lookups: usize,
    pub room_lists: usize,
    pub reservation_reads: usize,
    pub blockout_reads: usize,
    pub batch_reads: usize,
    pub room_type_reads: usize,
}

#[derive(Default)]
struct Counters {
    hotel_lookups: AtomicUsize,
    room_lists: AtomicUsize,
    reservation_reads: AtomicUsize,
    blockout_reads: AtomicUsize,
    batch_reads: AtomicUsize,
    room_type_reads: AtomicUsize,
}

#[derive(Default)]
pub struct InMemoryRepository {
    hotels: DashMap<HotelId, Hotel>,
    room_types: DashMap<RoomTypeId, RoomType>,
    rooms: DashMap<RoomId, Room>,
    reservations: DashMap<RoomId, Vec<ReservationWindow>>,
    blockouts: DashMap<RoomId, Vec<NaiveDate>>,
    batch_enabled: AtomicBool,
    fail_hotel_lookup: AtomicBool,
    fail_room_list: AtomicBool,
    failing_reservation_reads: Mutex<HashSet<RoomId>>,
    failing_blockout_reads: Mutex<HashSet<RoomId>>,
    delay_ms: AtomicU64,
    counters: Counters,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_hotel(&self, hotel: Hotel) {
        self.hotels.insert(hotel.id, hotel);
    }

    pub fn insert_room_type(&self, room_type: RoomType) {
        self.room_types.insert(room_type.id, room_type);
    }

    pub fn insert_room(&self, room: Room) {
        self.rooms.insert(room.id, room);
    }

    pub fn insert_reservation(&self, reservation: Reservation) {
        self.reservations
            .entry(reservation.room_id)
            .or_default()
            .push(reservation.window());
    }

    pub fn insert_blockout(&self, blockout: BlockoutDate) {
        self.blockouts
            .entry(blockout.room_id)
            .or_default()
            .push(blockout.block_date);
    }

    pub fn set_batch_enabled(&self, enabled: bool) {
        self.batch_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn fail_hotel_lookup(&self, fail: bool) {
        self.fail_hotel_lookup.store(fail, Ordering::SeqCst);
    }

    pub fn fail_room_list(&self, fail: bool) {
        self.fail_room_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reservation_reads_for(&self, room_id: RoomId) {
        self.failing_reservation_reads.lock().insert(room_id);
    }

    pub fn fail_blockout_reads_for(&self, room_id: RoomId) {
        self.failing_blockout_reads.lock().insert(room_id);
    }

    pub fn clear_faults(&self) {
        self.fail_hotel_lookup.store(false, Ordering::SeqCst);
        self.fail_room_list.store(false, Ordering::SeqCst);
        self.failing_reservation_reads.lock().clear();
        self.failing_blockout_reads.lock().clear();
    }

    pub fn stats(&self) -> ReadStats {
        ReadStats {
            hotel_lookups: self.counters.hotel_lookups.load(Ordering::SeqCst),
            room_lists: self.counters.room_lists.load(Ordering::SeqCst),
            reservation_reads: self.counters.reservation_reads.load(Ordering::SeqCst),
            blockout_reads: self.counters.blockout_reads.load(Ordering::SeqCst),
            batch_reads: self.counters.batch_reads.load(Ordering::SeqCst),
            room_type_reads: self.counters.room_type_reads.load(Ordering::SeqCst),
        }
    }

    async fn simulate_latency(&self) {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    fn reservation_read_fails(&self, room_id: RoomId) -> bool {
        self.failing_reservation_reads.lock().contains(&room_id)
    }

    fn blockout_read_fails(&self, room_id: RoomId) -> bool {
        self.failing_blockout_reads.lock().contains(&room_id)
    }

    fn windows_for(&self, room_id: RoomId) -> Vec<ReservationWindow> {
        self.reservations
            .get(&room_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn blockouts_between(&self, room_id: RoomId, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .blockouts
            .get(&room_id)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .copied()
                    .filter(|date| from <= *date && *date < to)
                    .collect()
            })
            .unwrap_or_default();
        dates.sort();
        dates
    }
}

#[async_trait]
impl RoomRepository for InMemoryRepository {
    async fn find_hotel_by_exact_name(
        &self,
        name: &str,
    ) -> Result<Option<HotelId>, RepositoryError> {
        self.counters.hotel_lookups.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_hotel_lookup.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("hotels".to_string()));
        }

        let matches: Vec<HotelId> = self
            .hotels
            .iter()
            .filter(|entry| entry.value().name == name)
            .map(|entry| *entry.key())
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches[0])),
            count => Err(RepositoryError::UnexpectedRows {
                table: "hotels",
                count,
            }),
        }
    }

    async fn list_rooms(&self, query: &RoomQuery) -> Result<Vec<CandidateRoom>, RepositoryError> {
        self.counters.room_lists.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_room_list.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("rooms".to_string()));
        }

        let mut candidates: Vec<CandidateRoom> = self
            .rooms
            .iter()
            .filter_map(|entry| {
                let room = entry.value();
                let room_type = self.room_types.get(&room.room_type_id)?;
                Some(CandidateRoom {
                    room: room.clone(),
                    room_type: room_type.value().clone(),
                })
            })
            .filter(|candidate| query.matches(candidate))
            .collect();
        candidates.sort_by_key(|candidate| candidate.id());

        Ok(candidates)
    }

    async fn list_reservations_for_room(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<ReservationWindow>, RepositoryError> {
        self.counters.reservation_reads.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.reservation_read_fails(room_id) {
            return Err(RepositoryError::Unavailable(format!(
                "reservations for room {room_id}"
            )));
        }
        Ok(self.windows_for(room_id))
    }

    async fn list_blockout_dates_for_room(
        &self,
        room_id: RoomId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, RepositoryError> {
        self.counters.blockout_reads.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.blockout_read_fails(room_id) {
            return Err(RepositoryError::Unavailable(format!(
                "blockout dates for room {room_id}"
            )));
        }
        Ok(self.blockouts_between(room_id, from, to))
    }

    async fn get_room_type_details(
        &self,
        room_type_name: &str,
    ) -> Result<Option<RoomTypeDetails>, RepositoryError> {
        self.counters.room_type_reads.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        // Lowest id wins when several hotels reuse a name
        Ok(self
            .room_types
            .iter()
            .filter(|entry| entry.value().name == room_type_name)
            .min_by_key(|entry| *entry.key())
            .map(|entry| RoomTypeDetails::from(entry.value())))
    }

    async fn room_conflicts(
        &self,
        room_ids: &[RoomId],
        stay: StayInterval,
    ) -> Result<Option<Vec<RoomConflict>>, RepositoryError> {
        if !self.batch_enabled.load(Ordering::SeqCst) {
            return Ok(None);
        }

        self.counters.batch_reads.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if let Some(room_id) = room_ids
            .iter()
            .find(|id| self.reservation_read_fails(**id) || self.blockout_read_fails(**id))
        {
            return Err(RepositoryError::Unavailable(format!(
                "batch conflict check (room {room_id})"
            )));
        }

        let conflicts = room_ids
            .iter()
            .map(|room_id| RoomConflict {
                room_id: *room_id,
                reserved: self
                    .windows_for(*room_id)
                    .iter()
                    .any(|w| stay.overlaps(w.check_in, w.check_out)),
                blocked_out: !self
                    .blockouts_between(*room_id, stay.arrival(), stay.departure())
                    .is_empty(),
            })
            .collect();

        Ok(Some(conflicts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RoomPredicate;
    use tokio_test::{assert_err, assert_ok};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn seeded() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        repo.insert_hotel(Hotel {
            id: HotelId(1),
            name: "Amara Hotel".to_string(),
        });
        repo.insert_room_type(RoomType {
            id: RoomTypeId(10),
            hotel_id: HotelId(1),
            name: "Twin".to_string(),
            max_occupancy: 2,
            base_price_per_night: Some(95.0),
            amenities: vec!["Wi-Fi".to_string()],
        });
        for (id, number, active) in [(101, "101", true), (102, "102", false)] {
            repo.insert_room(Room {
                id: RoomId(id),
                hotel_id: HotelId(1),
                room_type_id: RoomTypeId(10),
                room_number: number.to_string(),
                is_active: active,
            });
        }
        repo.insert_blockout(BlockoutDate {
            room_id: RoomId(101),
            block_date: date("2024-07-10"),
        });
        repo
    }

    #[tokio::test]
    async fn test_hotel_lookup_is_exact() {
        let repo = seeded();
        assert_eq!(
            repo.find_hotel_by_exact_name("Amara Hotel").await,
            Ok(Some(HotelId(1)))
        );
        assert_eq!(repo.find_hotel_by_exact_name("Amara").await, Ok(None));
        assert_eq!(repo.find_hotel_by_exact_name("amara hotel").await, Ok(None));
    }

    #[tokio::test]
    async fn test_duplicate_hotel_names_are_an_error() {
        let repo = seeded();
        repo.insert_hotel(Hotel {
            id: HotelId(2),
            name: "Amara Hotel".to_string(),
        });
        assert_eq!(
            repo.find_hotel_by_exact_name("Amara Hotel").await,
            Err(RepositoryError::UnexpectedRows {
                table: "hotels",
                count: 2
            })
        );
    }

    #[tokio::test]
    async fn test_list_rooms_applies_query() {
        let repo = seeded();
        let query = RoomQuery::new().with(RoomPredicate::IsActive(true));
        let rooms = assert_ok!(repo.list_rooms(&query).await);
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].id(), RoomId(101));
        assert_eq!(rooms[0].room_type.name, "Twin");
    }

    #[tokio::test]
    async fn test_blockout_range_is_half_open() {
        let repo = seeded();
        let inside = repo
            .list_blockout_dates_for_room(RoomId(101), date("2024-07-10"), date("2024-07-11"))
            .await;
        assert_eq!(inside, Ok(vec![date("2024-07-10")]));

        let before = repo
            .list_blockout_dates_for_room(RoomId(101), date("2024-07-09"), date("2024-07-10"))
            .await;
        assert_eq!(before, Ok(vec![]));
    }

    #[tokio::test]
    async fn test_fault_injection_and_counters() {
        let repo = seeded();
        repo.fail_reservation_reads_for(RoomId(101));
        assert_err!(repo.list_reservations_for_room(RoomId(101)).await);
        assert_ok!(repo.list_reservations_for_room(RoomId(102)).await);

        repo.clear_faults();
        assert_ok!(repo.list_reservations_for_room(RoomId(101)).await);
        assert_eq!(repo.stats().reservation_reads, 3);
    }

    #[tokio::test]
    async fn test_batch_capability_is_opt_in() {
        let repo = seeded();
        let stay = StayInterval::new(date("2024-07-10"), date("2024-07-12")).unwrap();
        assert_eq!(repo.room_conflicts(&[RoomId(101)], stay).await, Ok(None));

        repo.set_batch_enabled(true);
        let conflicts = repo
            .room_conflicts(&[RoomId(101), RoomId(102)], stay)
            .await
            .unwrap()
            .unwrap();
        assert!(conflicts[0].blocked_out);
        assert!(conflicts[1].is_available());
    }

    #[tokio::test]
    async fn test_room_type_details_by_name() {
        let repo = seeded();
        let details = repo.get_room_type_details("Twin").await.unwrap().unwrap();
        assert_eq!(details.max_occupancy, 2);
        assert_eq!(details.base_price_per_night, Some(95.0));
        assert_eq!(repo.get_room_type_details("Suite").await, Ok(None));
    }
}
