// What the search hands to the listing and detail views
use crate::model::{CandidateRoom, RoomId, RoomTypeDetails};
use crate::request::StayInterval;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    // Reads failed and the search was configured to show the room anyway
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomListing {
    pub room: CandidateRoom,
    pub availability: Availability,
}

impl RoomListing {
    pub fn id(&self) -> RoomId {
        self.room.id()
    }

    // Inactive rooms are listed but cannot be opened
    pub fn is_selectable(&self) -> bool {
        self.room.room.is_active
    }

    pub fn title(&self) -> String {
        format!(
            "Room {} - {}",
            self.room.room.room_number, self.room.room_type.name
        )
    }
}

/// Terminal result of a successful search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "rooms", rename_all = "snake_case")]
pub enum SearchOutcome {
    // Nothing passed the building/occupancy filters
    NoCandidates,
    // Candidates existed; this is what survived the date checks, maybe nothing
    Rooms(Vec<RoomListing>),
}

impl SearchOutcome {
    pub fn rooms(&self) -> &[RoomListing] {
        match self {
            SearchOutcome::NoCandidates => &[],
            SearchOutcome::Rooms(rooms) => rooms.as_slice(),
        }
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms().iter().map(RoomListing::id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms().is_empty()
    }

    // User-facing message for the empty states
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            SearchOutcome::NoCandidates => Some("No rooms found matching your criteria."),
            SearchOutcome::Rooms(rooms) if rooms.is_empty() => {
                Some("No available rooms for the selected dates and criteria.")
            }
            SearchOutcome::Rooms(_) => None,
        }
    }
}

/// Detail view of one selected room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomDetail {
    pub room_id: RoomId,
    pub room_number: String,
    pub room_type_name: String,
    pub details: RoomTypeDetails,
}

impl RoomDetail {
    pub fn new(room: &CandidateRoom, details: RoomTypeDetails) -> Self {
        Self {
            room_id: room.id(),
            room_number: room.room.room_number.clone(),
            room_type_name: room.room_type.name.clone(),
            details,
        }
    }

    // Price of the whole stay, when the room type is priced
    pub fn quote(&self, stay: &StayInterval) -> Option<f64> {
        self.details
            .base_price_per_night
            .map(|price| price * stay.nights() as f64)
    }
}

impl fmt::Display for RoomDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Room {} - {}", self.room_number, self.room_type_name)?;
        match self.details.base_price_per_night {
            Some(price) => writeln!(f, "Price: ${price} / night")?,
            None => writeln!(f, "Price: $N/A / night")?,
        }
        writeln!(f, "Max Occupancy: {}", self.details.max_occupancy)?;
        if self.details.amenities.is_empty() {
            write!(f, "Amenities: N/A")
        } else {
            write!(f, "Amenities: {}", self.details.amenities.join(", "))
        }
    }
}
