// Availability Filter: drops candidates with a conflicting reservation or a
// blockout date inside the requested stay.

use crate::config::{CheckFailurePolicy, EvaluationMode, SearchConfig};
use crate::error::{RepositoryError, SearchError};
use crate::listing::{Availability, RoomListing};
use crate::model::{CandidateRoom, ReservationWindow, RoomId};
use crate::repository::{with_timeout, RoomConflict, RoomRepository};
use crate::request::StayInterval;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of checking one room against a stay.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomCheck {
    Available,
    Reserved,
    BlockedOut,
    Failed(RepositoryError),
}

impl From<RoomConflict> for RoomCheck {
    fn from(conflict: RoomConflict) -> Self {
        if conflict.reserved {
            RoomCheck::Reserved
        } else if conflict.blocked_out {
            RoomCheck::BlockedOut
        } else {
            RoomCheck::Available
        }
    }
}

pub fn has_conflicting_reservation(reservations: &[ReservationWindow], stay: &StayInterval) -> bool {
    reservations
        .iter()
        .any(|r| stay.overlaps(r.check_in, r.check_out))
}

pub struct AvailabilityFilter {
    repository: Arc<dyn RoomRepository>,
    call_timeout: Duration,
    policy: CheckFailurePolicy,
    evaluation: EvaluationMode,
    prefer_batch: bool,
}

impl AvailabilityFilter {
    pub fn new(repository: Arc<dyn RoomRepository>, config: &SearchConfig) -> Self {
        Self {
            repository,
            call_timeout: config.call_timeout(),
            policy: config.check_failure_policy,
            evaluation: config.evaluation,
            prefer_batch: config.prefer_batch,
        }
    }

    pub fn policy(&self) -> CheckFailurePolicy {
        self.policy
    }

    /// Checks a single room: reservations first, blockouts only when no
    /// reservation conflicts.
    pub async fn check_room(&self, room_id: RoomId, stay: StayInterval) -> RoomCheck {
        let reservations = match with_timeout(
            self.call_timeout,
            self.repository.list_reservations_for_room(room_id),
        )
        .await
        {
            Ok(reservations) => reservations,
            Err(err) => return RoomCheck::Failed(err),
        };

        if has_conflicting_reservation(&reservations, &stay) {
            return RoomCheck::Reserved;
        }

        let blockouts = match with_timeout(
            self.call_timeout,
            self.repository
                .list_blockout_dates_for_room(room_id, stay.arrival(), stay.departure()),
        )
        .await
        {
            Ok(blockouts) => blockouts,
            Err(err) => return RoomCheck::Failed(err),
        };

        if blockouts.iter().any(|date| stay.contains(*date)) {
            RoomCheck::BlockedOut
        } else {
            RoomCheck::Available
        }
    }

    // One check per candidate, in candidate order
    pub async fn check_rooms(&self, room_ids: &[RoomId], stay: StayInterval) -> Vec<RoomCheck> {
        if self.prefer_batch {
            if let Some(checks) = self.check_batch(room_ids, stay).await {
                return checks;
            }
        }

        match self.evaluation {
            EvaluationMode::Sequential => {
                let mut checks = Vec::with_capacity(room_ids.len());
                for room_id in room_ids {
                    checks.push(self.check_room(*room_id, stay).await);
                }
                checks
            }
            EvaluationMode::Concurrent { max_in_flight } => {
                stream::iter(room_ids.iter().copied())
                    .map(|room_id| self.check_room(room_id, stay))
                    .buffered(max_in_flight.max(1))
                    .collect()
                    .await
            }
        }
    }

    // None when the store has no batch capability or the batch call failed;
    // the caller then checks each room on its own
    async fn check_batch(&self, room_ids: &[RoomId], stay: StayInterval) -> Option<Vec<RoomCheck>> {
        let batch = with_timeout(
            self.call_timeout,
            self.repository.room_conflicts(room_ids, stay),
        )
        .await;

        match batch {
            Ok(None) => None,
            Ok(Some(conflicts)) => {
                let by_room: HashMap<RoomId, RoomConflict> = conflicts
                    .into_iter()
                    .map(|conflict| (conflict.room_id, conflict))
                    .collect();
                Some(
                    room_ids
                        .iter()
                        .map(|room_id| match by_room.get(room_id) {
                            Some(conflict) => RoomCheck::from(*conflict),
                            None => RoomCheck::Failed(RepositoryError::Decode(format!(
                                "batch response has no entry for room {room_id}"
                            ))),
                        })
                        .collect(),
                )
            }
            Err(err) => {
                warn!(
                    rooms = room_ids.len(),
                    error = %err,
                    "batch conflict check failed, checking rooms one by one"
                );
                None
            }
        }
    }

    /// Keeps the candidates that are free for the whole stay, in input order.
    pub async fn filter(
        &self,
        candidates: Vec<CandidateRoom>,
        stay: StayInterval,
    ) -> Result<Vec<RoomListing>, SearchError> {
        let room_ids: Vec<RoomId> = candidates.iter().map(CandidateRoom::id).collect();
        let checks = self.check_rooms(&room_ids, stay).await;
        let total = candidates.len();

        let mut listings = Vec::with_capacity(total);
        for (room, check) in candidates.into_iter().zip(checks) {
            let room_id = room.id();
            match check {
                RoomCheck::Available => listings.push(RoomListing {
                    room,
                    availability: Availability::Available,
                }),
                RoomCheck::Reserved => debug!(%room_id, %stay, "room excluded: reservation overlaps"),
                RoomCheck::BlockedOut => debug!(%room_id, %stay, "room excluded: blockout date"),
                RoomCheck::Failed(source) => match self.policy {
                    CheckFailurePolicy::ExcludeRoom => {
                        warn!(%room_id, error = %source, "availability unknown, room excluded");
                    }
                    CheckFailurePolicy::ReportUnknown => {
                        warn!(%room_id, error = %source, "availability unknown, room kept");
                        listings.push(RoomListing {
                            room,
                            availability: Availability::Unknown,
                        });
                    }
                    CheckFailurePolicy::FailSearch => {
                        return Err(SearchError::RoomCheck { room_id, source });
                    }
                },
            }
        }

        info!(candidates = total, available = listings.len(), %stay, "availability filtered");
        Ok(listings)
    }
}
