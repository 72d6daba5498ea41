// Error types for the search and the store behind it
use crate::model::RoomId;
use thiserror::Error;

// Failures of a single read against the remote store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Store error: {status_code} - {message}")]
    Status { status_code: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Expected at most one row from {table}, got {count}")]
    UnexpectedRows { table: &'static str, count: usize },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    // Classifies an HTTP client failure; `timeout_ms` is the client's configured deadline
    pub fn from_http(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            RepositoryError::Timeout(timeout_ms)
        } else if err.is_decode() {
            RepositoryError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RepositoryError::Status {
                status_code: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            RepositoryError::Network(err.to_string())
        }
    }
}

// Terminal outcomes of a search invocation
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),

    #[error("No hotel named {name:?}")]
    HotelNotFound { name: String },

    #[error("Error finding hotel {name:?}: {source}")]
    HotelLookup {
        name: String,
        #[source]
        source: RepositoryError,
    },

    #[error("Error fetching rooms: {0}")]
    CandidateFetch(#[source] RepositoryError),

    #[error("Availability check failed for room {room_id}: {source}")]
    RoomCheck {
        room_id: RoomId,
        #[source]
        source: RepositoryError,
    },

    #[error("No room type named {name:?}")]
    RoomTypeNotFound { name: String },

    #[error("Error fetching room details: {0}")]
    RoomDetail(#[source] RepositoryError),
}

impl SearchError {
    // Named hotel missing, or the lookup call itself failed
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            SearchError::HotelNotFound { .. } | SearchError::HotelLookup { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("HTTP client initialization error: {0}")]
    Client(String),
}
