//! Departures API client.
//!
//! This module provides an HTTP client for `transport.rest`-style HAFAS
//! REST APIs (the default is the Deutsche Bahn instance), which serve live
//! departures per stop.
//!
//! Key characteristics:
//! - Times are absolute RFC 3339 timestamps that already include delays
//! - Cancelled departures are reported with `when: null`
//! - The public instance is rate limited, so callers poll slowly and the
//!   client caps concurrent requests

mod client;
mod convert;
mod error;
#[cfg(test)]
mod mock;
mod types;

use std::future::Future;

use crate::domain::DepartureRecord;

pub use client::{DEFAULT_BASE_URL, TransportClient, TransportConfig};
pub use convert::{ConversionError, StationMatch, convert_departure, convert_departures};
pub use error::FetchError;
#[cfg(test)]
pub use mock::MockDepartures;
pub use types::{CoordinatesDto, DepartureDto, DeparturesResponse, LineDto, LocationDto};

/// Anything that can supply departures for a station.
///
/// Implementations own their retry policy. A failure never carries a
/// partial list of departures.
pub trait DeparturesSource: Send + Sync {
    /// Fetch departures from `station_id` within the next `within_minutes`.
    fn fetch_departures(
        &self,
        station_id: &str,
        within_minutes: u32,
    ) -> impl Future<Output = Result<Vec<DepartureRecord>, FetchError>> + Send;
}
