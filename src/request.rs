// Search input as typed values
use crate::error::SearchError;
use chrono::NaiveDate;
use std::fmt;

pub const ALL_BUILDINGS: &str = "*";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Which hotel(s) to search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Building {
    All,
    Named(String),
}

impl Building {
    // The wildcard and an empty selection both mean every hotel
    pub fn parse(input: &str) -> Self {
        if input.trim().is_empty() || input == ALL_BUILDINGS {
            Building::All
        } else {
            Building::Named(input.to_string())
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Building::All => None,
            Building::Named(name) => Some(name),
        }
    }
}

/// Number of guests, always a whole number of at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GuestCount(u32);

impl GuestCount {
    pub fn new(guests: u32) -> Result<Self, SearchError> {
        if guests == 0 {
            return Err(SearchError::InvalidRequest(
                "guest count must be at least 1".to_string(),
            ));
        }
        Ok(Self(guests))
    }

    // Digits only: signs, decimal points and exponents are rejected
    pub fn parse(input: &str) -> Result<Self, SearchError> {
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SearchError::InvalidRequest(format!(
                "guest count {input:?} is not a whole number"
            )));
        }
        let guests = input.parse::<u32>().map_err(|e| {
            SearchError::InvalidRequest(format!("guest count {input:?} is out of range: {e}"))
        })?;
        Self::new(guests)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for GuestCount {
    type Error = SearchError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        GuestCount::new(value)
    }
}

impl From<GuestCount> for u32 {
    fn from(value: GuestCount) -> Self {
        value.0
    }
}

impl fmt::Display for GuestCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Requested stay as the half-open interval `[arrival, departure)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StayInterval {
    arrival: NaiveDate,
    departure: NaiveDate,
}

impl StayInterval {
    pub fn new(arrival: NaiveDate, departure: NaiveDate) -> Result<Self, SearchError> {
        if departure <= arrival {
            return Err(SearchError::InvalidRequest(format!(
                "departure {departure} must be after arrival {arrival}"
            )));
        }
        Ok(Self {
            arrival,
            departure,
        })
    }

    pub fn parse(arrival: &str, departure: &str) -> Result<Self, SearchError> {
        Self::new(
            parse_date("arrival", arrival)?,
            parse_date("departure", departure)?,
        )
    }

    pub fn arrival(&self) -> NaiveDate {
        self.arrival
    }

    pub fn departure(&self) -> NaiveDate {
        self.departure
    }

    pub fn nights(&self) -> i64 {
        (self.departure - self.arrival).num_days()
    }

    // [check_in, check_out) overlaps [arrival, departure); touching ends do not
    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        check_in < self.departure && check_out > self.arrival
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.arrival <= date && date < self.departure
    }
}

impl fmt::Display for StayInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.arrival, self.departure)
    }
}

fn parse_date(field: &str, input: &str) -> Result<NaiveDate, SearchError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SearchError::InvalidRequest(format!("{field} date is required")));
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|e| SearchError::InvalidRequest(format!("{field} date {input:?}: {e}")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub building: Building,
    pub guests: GuestCount,
    pub stay: StayInterval,
}

impl SearchRequest {
    pub fn new(building: Building, guests: GuestCount, stay: StayInterval) -> Self {
        Self {
            building,
            guests,
            stay,
        }
    }

    // Builds a request from raw form field values
    pub fn from_form(
        building: &str,
        guests: &str,
        arrival: &str,
        departure: &str,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            building: Building::parse(building),
            guests: GuestCount::parse(guests)?,
            stay: StayInterval::parse(arrival, departure)?,
        })
    }
}
