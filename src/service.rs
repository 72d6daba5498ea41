// Room search flow: composer, then availability filter
use crate::availability::AvailabilityFilter;
use crate::composer::SearchComposer;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::listing::{RoomDetail, SearchOutcome};
use crate::model::CandidateRoom;
use crate::repository::{with_timeout, RoomRepository};
use crate::request::SearchRequest;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub struct RoomSearchService {
    repository: Arc<dyn RoomRepository>,
    composer: SearchComposer,
    filter: AvailabilityFilter,
    call_timeout: Duration,
}

impl RoomSearchService {
    pub fn new(repository: Arc<dyn RoomRepository>, config: SearchConfig) -> Self {
        Self {
            composer: SearchComposer::new(repository.clone(), config.call_timeout()),
            filter: AvailabilityFilter::new(repository.clone(), &config),
            call_timeout: config.call_timeout(),
            repository,
        }
    }

    /// Runs one search to a terminal outcome.
    ///
    /// `Err` is an aborting failure; `Ok(NoCandidates)` means nothing matched
    /// the building and occupancy filters; `Ok(Rooms(..))` holds whatever
    /// survived the date checks, possibly nothing.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        let started = Instant::now();
        let candidates = self
            .composer
            .candidates(&request.building, request.guests)
            .await?;

        if candidates.is_empty() {
            info!(
                building = ?request.building,
                guests = %request.guests,
                "no rooms match the search criteria"
            );
            return Ok(SearchOutcome::NoCandidates);
        }

        let rooms = self.filter.filter(candidates, request.stay).await?;
        info!(
            building = ?request.building,
            guests = %request.guests,
            stay = %request.stay,
            available = rooms.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );
        Ok(SearchOutcome::Rooms(rooms))
    }

    // Same as `search`, starting from raw form values
    pub async fn search_form(
        &self,
        building: &str,
        guests: &str,
        arrival: &str,
        departure: &str,
    ) -> Result<SearchOutcome, SearchError> {
        let request = SearchRequest::from_form(building, guests, arrival, departure)?;
        self.search(&request).await
    }

    pub async fn room_detail(&self, room: &CandidateRoom) -> Result<RoomDetail, SearchError> {
        let name = room.room_type.name.as_str();
        let details = with_timeout(
            self.call_timeout,
            self.repository.get_room_type_details(name),
        )
        .await
        .map_err(|source| {
            warn!(room_type = name, error = %source, "room type lookup failed");
            SearchError::RoomDetail(source)
        })?
        .ok_or_else(|| SearchError::RoomTypeNotFound {
            name: name.to_string(),
        })?;

        Ok(RoomDetail::new(room, details))
    }
}
