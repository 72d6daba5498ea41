// Read-only entities mirrored from the remote store tables
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! store_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

store_id!(HotelId);
store_id!(RoomTypeId);
store_id!(RoomId);

// Row of the `hotels` table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Hotel {
    pub id: HotelId,
    pub name: String,
}

// Row of the `room_types` table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RoomType {
    pub id: RoomTypeId,
    pub hotel_id: HotelId,
    pub name: String,
    pub max_occupancy: u32,
    #[serde(default)]
    pub base_price_per_night: Option<f64>,
    // Display order is significant
    #[serde(default)]
    pub amenities: Vec<String>,
}

// Row of the `rooms` table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub hotel_id: HotelId,
    pub room_type_id: RoomTypeId,
    pub room_number: String,
    pub is_active: bool,
}

/// A room that passed the static filters, carrying its room type for the
/// listing and detail views.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CandidateRoom {
    #[serde(flatten)]
    pub room: Room,
    #[serde(rename = "room_types")]
    pub room_type: RoomType,
}

impl CandidateRoom {
    pub fn id(&self) -> RoomId {
        self.room.id
    }
}

// Row of the `reservations` table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Reservation {
    pub id: i64,
    pub room_id: RoomId,
    #[serde(rename = "check_in_date")]
    pub check_in: NaiveDate,
    #[serde(rename = "check_out_date")]
    pub check_out: NaiveDate,
}

impl Reservation {
    pub fn window(&self) -> ReservationWindow {
        ReservationWindow {
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }
}

/// The occupied half-open interval `[check_in, check_out)` of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReservationWindow {
    #[serde(rename = "check_in_date")]
    pub check_in: NaiveDate,
    #[serde(rename = "check_out_date")]
    pub check_out: NaiveDate,
}

// Row of the `room_blockout_dates` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlockoutDate {
    pub room_id: RoomId,
    pub block_date: NaiveDate,
}

/// Pricing and capacity details shown on the room detail view.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RoomTypeDetails {
    #[serde(default)]
    pub base_price_per_night: Option<f64>,
    pub max_occupancy: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl From<&RoomType> for RoomTypeDetails {
    fn from(room_type: &RoomType) -> Self {
        Self {
            base_price_per_night: room_type.base_price_per_night,
            max_occupancy: room_type.max_occupancy,
            amenities: room_type.amenities.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_room_decodes_embedded_room_type() {
        let json = r#"{
            "id": 7,
            "room_number": "101",
            "hotel_id": 1,
            "room_type_id": 3,
            "is_active": true,
            "room_types": {
                "id": 3,
                "hotel_id": 1,
                "name": "Deluxe Twin",
                "max_occupancy": 2,
                "base_price_per_night": 129.5,
                "amenities": ["Wi-Fi", "Minibar", "Sea view"]
            }
        }"#;

        let candidate: CandidateRoom = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.id(), RoomId(7));
        assert_eq!(candidate.room.room_number, "101");
        assert_eq!(candidate.room_type.name, "Deluxe Twin");
        assert_eq!(candidate.room_type.max_occupancy, 2);
        assert_eq!(
            candidate.room_type.amenities,
            vec!["Wi-Fi", "Minibar", "Sea view"]
        );
    }

    #[test]
    fn test_room_type_tolerates_missing_price_and_amenities() {
        let json = r#"{"id": 1, "hotel_id": 1, "name": "Single", "max_occupancy": 1}"#;
        let room_type: RoomType = serde_json::from_str(json).unwrap();
        assert_eq!(room_type.base_price_per_night, None);
        assert!(room_type.amenities.is_empty());
    }

    #[test]
    fn test_reservation_window_uses_store_column_names() {
        let json = r#"{"check_in_date": "2024-06-01", "check_out_date": "2024-06-05"}"#;
        let window: ReservationWindow = serde_json::from_str(json).unwrap();
        assert_eq!(window.check_in, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(window.check_out, NaiveDate::from_ymd_opt(2024, 6, 5).unwrap());
    }
}
