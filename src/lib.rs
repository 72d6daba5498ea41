// Room availability search for the hotel booking site

pub mod availability;
pub mod composer;
pub mod config;
pub mod error;
pub mod listing;
pub mod memory;
pub mod model;
pub mod repository;
pub mod request;
pub mod rest;
pub mod service;

// Re-export key types for convenience
pub use availability::{AvailabilityFilter, RoomCheck};
pub use composer::SearchComposer;
pub use config::{CheckFailurePolicy, ClientConfig, EvaluationMode, SearchConfig};
pub use error::{ConfigError, RepositoryError, SearchError};
pub use listing::{Availability, RoomDetail, RoomListing, SearchOutcome};
pub use memory::InMemoryRepository;
pub use model::{
    BlockoutDate, CandidateRoom, Hotel, HotelId, Reservation, ReservationWindow, Room, RoomId,
    RoomType, RoomTypeDetails, RoomTypeId,
};
pub use repository::{RoomConflict, RoomPredicate, RoomQuery, RoomRepository};
pub use request::{Building, GuestCount, SearchRequest, StayInterval};
pub use rest::RestRepository;
pub use service::RoomSearchService;
