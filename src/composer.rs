// Search Composer: turns search filters into a candidate-room query
use crate::error::SearchError;
use crate::model::{CandidateRoom, HotelId};
use crate::repository::{with_timeout, RoomPredicate, RoomQuery, RoomRepository};
use crate::request::{Building, GuestCount};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct SearchComposer {
    repository: Arc<dyn RoomRepository>,
    call_timeout: Duration,
}

impl SearchComposer {
    pub fn new(repository: Arc<dyn RoomRepository>, call_timeout: Duration) -> Self {
        Self {
            repository,
            call_timeout,
        }
    }

    // Resolves the building to a hotel id; None means every hotel
    pub async fn resolve_building(
        &self,
        building: &Building,
    ) -> Result<Option<HotelId>, SearchError> {
        let Some(name) = building.name() else {
            return Ok(None);
        };

        let lookup = with_timeout(
            self.call_timeout,
            self.repository.find_hotel_by_exact_name(name),
        )
        .await;

        match lookup {
            Ok(Some(hotel_id)) => {
                debug!(hotel = name, %hotel_id, "resolved building");
                Ok(Some(hotel_id))
            }
            Ok(None) => {
                warn!(hotel = name, "no hotel with this name");
                Err(SearchError::HotelNotFound {
                    name: name.to_string(),
                })
            }
            Err(source) => {
                warn!(hotel = name, error = %source, "hotel lookup failed");
                Err(SearchError::HotelLookup {
                    name: name.to_string(),
                    source,
                })
            }
        }
    }

    pub fn build_query(hotel_id: Option<HotelId>, guests: GuestCount) -> RoomQuery {
        let query = RoomQuery::new().with(RoomPredicate::IsActive(true));
        let query = match hotel_id {
            Some(hotel_id) => query.with(RoomPredicate::HotelIs(hotel_id)),
            None => query,
        };
        query.with(RoomPredicate::MinOccupancy(guests.get()))
    }

    /// Produces the candidate rooms for a building and guest count.
    ///
    /// Hotel resolution completes before the room query is issued. An empty
    /// candidate list is returned as such; the caller decides how to signal
    /// it.
    pub async fn candidates(
        &self,
        building: &Building,
        guests: GuestCount,
    ) -> Result<Vec<CandidateRoom>, SearchError> {
        let hotel_id = self.resolve_building(building).await?;
        let query = Self::build_query(hotel_id, guests);

        let rooms = with_timeout(self.call_timeout, self.repository.list_rooms(&query))
            .await
            .map_err(|source| {
                warn!(error = %source, "candidate room query failed");
                SearchError::CandidateFetch(source)
            })?;

        // Stores that only partially honor the query still yield valid candidates
        let candidates: Vec<CandidateRoom> = rooms
            .into_iter()
            .filter(|candidate| query.matches(candidate))
            .collect();

        debug!(candidates = candidates.len(), %guests, "candidate rooms fetched");
        Ok(candidates)
    }
}
