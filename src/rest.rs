// Repository backed by a hosted PostgREST-style HTTP API
use crate::config::ClientConfig;
use crate::error::{ConfigError, RepositoryError};
use crate::model::{CandidateRoom, HotelId, ReservationWindow, RoomId, RoomTypeDetails};
use crate::repository::{RoomConflict, RoomPredicate, RoomQuery, RoomRepository};
use crate::request::StayInterval;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

pub const HOTELS_TABLE: &str = "hotels";
pub const ROOMS_TABLE: &str = "rooms";
pub const RESERVATIONS_TABLE: &str = "reservations";
pub const BLOCKOUTS_TABLE: &str = "room_blockout_dates";
pub const ROOM_TYPES_TABLE: &str = "room_types";

// Inner join so the occupancy filter on the embedded type drops the room itself
const ROOM_SELECT: &str = "id,room_number,hotel_id,room_type_id,is_active,\
room_types!inner(id,hotel_id,name,max_occupancy,base_price_per_night,amenities)";

type QueryParams = Vec<(&'static str, String)>;

#[derive(Deserialize)]
struct IdRow {
    id: HotelId,
}

#[derive(Deserialize)]
struct BlockoutRow {
    block_date: NaiveDate,
}

#[derive(Deserialize)]
struct RoomRow {
    room_id: RoomId,
}

pub struct RestRepository {
    http: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl RestRepository {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key).map_err(|e| ConfigError::Invalid {
            key: "api_key",
            message: e.to_string(),
        })?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|e| {
            ConfigError::Invalid {
                key: "api_key",
                message: e.to_string(),
            }
        })?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &'static str,
        params: &QueryParams,
    ) -> Result<Vec<T>, RepositoryError> {
        debug!(table, ?params, "store select");
        let response = self
            .http
            .get(self.table_url(table))
            .query(params)
            .send()
            .await
            .map_err(|e| RepositoryError::from_http(e, self.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(table, status = status.as_u16(), error = %e, "unreadable error body");
                    format!("<unreadable body: {e}>")
                }
            };
            return Err(RepositoryError::Status {
                status_code: status.as_u16(),
                message,
            });
        }

        response.json::<Vec<T>>().await.map_err(|e| {
            if e.is_timeout() {
                RepositoryError::Timeout(self.timeout_ms)
            } else {
                RepositoryError::Decode(e.to_string())
            }
        })
    }

    async fn conflicting_rooms(
        &self,
        table: &'static str,
        params: &QueryParams,
    ) -> Result<HashSet<RoomId>, RepositoryError> {
        let rows: Vec<RoomRow> = self.select(table, params).await?;
        Ok(rows.into_iter().map(|row| row.room_id).collect())
    }
}

pub fn hotel_lookup_params(name: &str) -> QueryParams {
    vec![("select", "id".to_string()), ("name", format!("eq.{name}"))]
}

pub fn room_query_params(query: &RoomQuery) -> QueryParams {
    let mut params = vec![("select", ROOM_SELECT.to_string())];
    for predicate in query.predicates() {
        match predicate {
            RoomPredicate::IsActive(active) => params.push(("is_active", format!("eq.{active}"))),
            RoomPredicate::HotelIs(hotel_id) => params.push(("hotel_id", format!("eq.{hotel_id}"))),
            RoomPredicate::MinOccupancy(guests) => {
                params.push(("room_types.max_occupancy", format!("gte.{guests}")))
            }
        }
    }
    params.push(("order", "id.asc".to_string()));
    params
}

pub fn reservation_params(room_id: RoomId) -> QueryParams {
    vec![
        ("select", "check_in_date,check_out_date".to_string()),
        ("room_id", format!("eq.{room_id}")),
    ]
}

pub fn blockout_params(room_id: RoomId, from: NaiveDate, to: NaiveDate) -> QueryParams {
    vec![
        ("select", "block_date".to_string()),
        ("room_id", format!("eq.{room_id}")),
        ("block_date", format!("gte.{from}")),
        ("block_date", format!("lt.{to}")),
    ]
}

fn room_id_list(room_ids: &[RoomId]) -> String {
    let ids: Vec<String> = room_ids.iter().map(RoomId::to_string).collect();
    format!("in.({})", ids.join(","))
}

// Reservations of any listed room whose [check_in, check_out) overlaps the stay
pub fn reservation_conflict_params(room_ids: &[RoomId], stay: &StayInterval) -> QueryParams {
    vec![
        ("select", "room_id".to_string()),
        ("room_id", room_id_list(room_ids)),
        ("check_in_date", format!("lt.{}", stay.departure())),
        ("check_out_date", format!("gt.{}", stay.arrival())),
    ]
}

pub fn blockout_conflict_params(room_ids: &[RoomId], stay: &StayInterval) -> QueryParams {
    vec![
        ("select", "room_id".to_string()),
        ("room_id", room_id_list(room_ids)),
        ("block_date", format!("gte.{}", stay.arrival())),
        ("block_date", format!("lt.{}", stay.departure())),
    ]
}

pub fn room_type_params(name: &str) -> QueryParams {
    vec![
        ("select", "base_price_per_night,max_occupancy,amenities".to_string()),
        ("name", format!("eq.{name}")),
        ("order", "id.asc".to_string()),
        ("limit", "1".to_string()),
    ]
}

#[async_trait]
impl RoomRepository for RestRepository {
    async fn find_hotel_by_exact_name(
        &self,
        name: &str,
    ) -> Result<Option<HotelId>, RepositoryError> {
        let rows: Vec<IdRow> = self.select(HOTELS_TABLE, &hotel_lookup_params(name)).await?;
        match rows.as_slice() {
            [] => Ok(None),
            [row] => Ok(Some(row.id)),
            _ => Err(RepositoryError::UnexpectedRows {
                table: HOTELS_TABLE,
                count: rows.len(),
            }),
        }
    }

    async fn list_rooms(&self, query: &RoomQuery) -> Result<Vec<CandidateRoom>, RepositoryError> {
        self.select(ROOMS_TABLE, &room_query_params(query)).await
    }

    async fn list_reservations_for_room(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<ReservationWindow>, RepositoryError> {
        self.select(RESERVATIONS_TABLE, &reservation_params(room_id))
            .await
    }

    async fn list_blockout_dates_for_room(
        &self,
        room_id: RoomId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, RepositoryError> {
        let rows: Vec<BlockoutRow> = self
            .select(BLOCKOUTS_TABLE, &blockout_params(room_id, from, to))
            .await?;
        Ok(rows.into_iter().map(|row| row.block_date).collect())
    }

    async fn get_room_type_details(
        &self,
        room_type_name: &str,
    ) -> Result<Option<RoomTypeDetails>, RepositoryError> {
        let rows: Vec<RoomTypeDetails> = self
            .select(ROOM_TYPES_TABLE, &room_type_params(room_type_name))
            .await?;
        Ok(rows.into_iter().next())
    }

    // Two reads for the whole batch, one per conflict table
    async fn room_conflicts(
        &self,
        room_ids: &[RoomId],
        stay: StayInterval,
    ) -> Result<Option<Vec<RoomConflict>>, RepositoryError> {
        if room_ids.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let reserved = self
            .conflicting_rooms(
                RESERVATIONS_TABLE,
                &reservation_conflict_params(room_ids, &stay),
            )
            .await?;
        let blocked_out = self
            .conflicting_rooms(BLOCKOUTS_TABLE, &blockout_conflict_params(room_ids, &stay))
            .await?;

        Ok(Some(
            room_ids
                .iter()
                .map(|room_id| RoomConflict {
                    room_id: *room_id,
                    reserved: reserved.contains(room_id),
                    blocked_out: blocked_out.contains(room_id),
                })
                .collect(),
        ))
    }
}
