//! Scripted departures source for testing without API access.
//!
//! Responses are queued per station and handed out in order, so tests can
//! describe exactly which polls succeed and which fail.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::domain::DepartureRecord;

use super::DeparturesSource;
use super::error::FetchError;

type Scripted = Result<Vec<DepartureRecord>, FetchError>;

#[derive(Default)]
struct MockState {
    responses: HashMap<String, VecDeque<Scripted>>,
    calls: HashMap<String, usize>,
}

/// Departures source that replays queued responses.
///
/// Clones share the same script, so a test can keep a handle after moving
/// one into the code under test. A station with nothing queued answers
/// with a transient 503.
#[derive(Clone, Default)]
pub struct MockDepartures {
    state: Arc<Mutex<MockState>>,
    latency: Duration,
}

impl MockDepartures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency` (use with paused tokio time).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a successful response for a station.
    pub fn push_ok(&self, station_id: &str, departures: Vec<DepartureRecord>) {
        self.push(station_id, Ok(departures));
    }

    /// Queue a failure for a station.
    pub fn push_err(&self, station_id: &str, error: FetchError) {
        self.push(station_id, Err(error));
    }

    /// How many fetches a station has received.
    pub fn calls(&self, station_id: &str) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.calls.get(station_id).copied().unwrap_or(0)
    }

    fn push(&self, station_id: &str, response: Scripted) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .responses
            .entry(station_id.to_string())
            .or_default()
            .push_back(response);
    }

    fn next(&self, station_id: &str) -> Scripted {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state.calls.entry(station_id.to_string()).or_default() += 1;

        state
            .responses
            .get_mut(station_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(FetchError::HttpStatus {
                    status: 503,
                    message: format!("no scripted response for station {station_id}"),
                })
            })
    }
}

impl DeparturesSource for MockDepartures {
    fn fetch_departures(
        &self,
        station_id: &str,
        _within_minutes: u32,
    ) -> impl Future<Output = Result<Vec<DepartureRecord>, FetchError>> + Send {
        let latency = self.latency;
        let response = self.next(station_id);
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn dep() -> DepartureRecord {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        DepartureRecord::new("Bus 60", "Lipsiusstraße", at).unwrap()
    }

    #[tokio::test]
    async fn replays_in_order() {
        let mock = MockDepartures::new();
        mock.push_ok("130637", vec![dep()]);
        mock.push_err("130637", FetchError::RateLimited);

        let first = mock.fetch_departures("130637", 120).await.unwrap();
        assert_eq!(first.len(), 1);

        let second = mock.fetch_departures("130637", 120).await;
        assert!(matches!(second, Err(FetchError::RateLimited)));

        assert_eq!(mock.calls("130637"), 2);
    }

    #[tokio::test]
    async fn unscripted_station_fails_transiently() {
        let mock = MockDepartures::new();
        let result = mock.fetch_departures("000000", 120).await;

        match result {
            Err(e) => assert!(e.is_transient()),
            Ok(_) => panic!("expected an error"),
        }
        assert_eq!(mock.calls("000000"), 1);
    }

    #[tokio::test]
    async fn clones_share_script() {
        let mock = MockDepartures::new();
        let handle = mock.clone();
        handle.push_ok("958956", vec![]);

        assert!(mock.fetch_departures("958956", 60).await.unwrap().is_empty());
        assert_eq!(handle.calls("958956"), 1);
    }
}
