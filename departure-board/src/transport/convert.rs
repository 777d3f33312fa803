//! Conversion from API DTOs to domain types.
//!
//! Individual departures that cannot be converted (cancelled, missing or
//! garbled times) are skipped rather than failing the whole board.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{DepartureRecord, DomainError};

use super::types::{DepartureDto, DeparturesResponse, LocationDto};

/// Line name used when the API omits it. Never matches a configured line.
const UNKNOWN_LINE: &str = "N/A";

/// Direction used when the API omits it.
const UNKNOWN_DIRECTION: &str = "Unknown";

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The departure is cancelled and has no departure time
    #[error("departure is cancelled")]
    Cancelled,

    /// Failed to parse a timestamp
    #[error("invalid time: {0}")]
    InvalidTime(String),

    /// Converted values failed domain validation
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// A station found by name search.
#[derive(Debug, Clone, PartialEq)]
pub struct StationMatch {
    pub id: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Convert a departures response, skipping departures that can't be used.
pub fn convert_departures(response: &DeparturesResponse) -> Vec<DepartureRecord> {
    let mut results = Vec::with_capacity(response.departures.len());

    for dto in &response.departures {
        match convert_departure(dto) {
            Ok(record) => results.push(record),
            Err(e) => {
                debug!(
                    trip = dto.trip_id.as_deref().unwrap_or("?"),
                    error = %e,
                    "skipping departure"
                );
            }
        }
    }

    results
}

/// Convert a single departure.
pub fn convert_departure(dto: &DepartureDto) -> Result<DepartureRecord, ConversionError> {
    if dto.cancelled == Some(true) {
        return Err(ConversionError::Cancelled);
    }

    let when = match dto.when.as_deref() {
        Some(when) if !when.is_empty() => when,
        _ => return Err(ConversionError::Cancelled),
    };
    let scheduled_at = DateTime::parse_from_rfc3339(when)
        .map_err(|_| ConversionError::InvalidTime(when.to_string()))?
        .with_timezone(&Utc);

    let line = dto
        .line
        .as_ref()
        .and_then(|l| l.name.as_deref())
        .unwrap_or(UNKNOWN_LINE);

    let direction = dto
        .direction
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(UNKNOWN_DIRECTION);

    let mut record = DepartureRecord::new(line, direction, scheduled_at)?;

    // The API reports delay in seconds
    if let Some(delay_secs) = dto.delay {
        record = record.with_delay_minutes(delay_secs.div_euclid(60));
    }
    if let Some(platform) = &dto.platform {
        record = record.with_platform(platform.clone());
    }

    Ok(record)
}

/// Convert location search results into station matches.
///
/// Results without an id or a name, and points of interest, are dropped.
pub fn convert_locations(locations: Vec<LocationDto>) -> Vec<StationMatch> {
    locations
        .into_iter()
        .filter(|l| matches!(l.kind.as_deref(), None | Some("stop") | Some("station")))
        .filter_map(|l| {
            let coords = l.location.as_ref();
            Some(StationMatch {
                latitude: coords.and_then(|c| c.latitude),
                longitude: coords.and_then(|c| c.longitude),
                id: l.id?,
                name: l.name?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::types::{CoordinatesDto, LineDto};
    use chrono::TimeZone;

    fn dto(line: Option<&str>, direction: Option<&str>, when: Option<&str>) -> DepartureDto {
        DepartureDto {
            trip_id: None,
            when: when.map(str::to_string),
            planned_when: None,
            delay: None,
            platform: None,
            direction: direction.map(str::to_string),
            line: Some(LineDto {
                name: line.map(str::to_string),
                product: None,
            }),
            cancelled: None,
        }
    }

    #[test]
    fn converts_offset_time_to_utc() {
        let record = convert_departure(&dto(
            Some("STR 15"),
            Some("Meusdorf"),
            Some("2024-03-15T10:04:00+01:00"),
        ))
        .unwrap();

        assert_eq!(
            record.scheduled_at(),
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 4, 0).unwrap()
        );
        assert_eq!(record.line(), "STR 15");
        assert_eq!(record.direction(), "Meusdorf");
    }

    #[test]
    fn accepts_zulu_time() {
        let record =
            convert_departure(&dto(Some("Bus 60"), Some("X"), Some("2024-03-15T09:04:00Z")))
                .unwrap();
        assert_eq!(
            record.scheduled_at(),
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 4, 0).unwrap()
        );
    }

    #[test]
    fn missing_when_is_cancelled() {
        assert_eq!(
            convert_departure(&dto(Some("Bus 60"), Some("X"), None)),
            Err(ConversionError::Cancelled)
        );
        assert_eq!(
            convert_departure(&dto(Some("Bus 60"), Some("X"), Some(""))),
            Err(ConversionError::Cancelled)
        );
    }

    #[test]
    fn cancelled_flag_wins_over_time() {
        let mut d = dto(Some("Bus 60"), Some("X"), Some("2024-03-15T09:04:00Z"));
        d.cancelled = Some(true);
        assert_eq!(convert_departure(&d), Err(ConversionError::Cancelled));
    }

    #[test]
    fn garbled_time_is_rejected() {
        assert_eq!(
            convert_departure(&dto(Some("Bus 60"), Some("X"), Some("10:04"))),
            Err(ConversionError::InvalidTime("10:04".into()))
        );
    }

    #[test]
    fn missing_names_get_placeholders() {
        let record = convert_departure(&dto(None, None, Some("2024-03-15T09:04:00Z"))).unwrap();
        assert_eq!(record.line(), "N/A");
        assert_eq!(record.direction(), "Unknown");
    }

    #[test]
    fn delay_seconds_become_whole_minutes() {
        let mut d = dto(Some("Bus 60"), Some("X"), Some("2024-03-15T09:04:00Z"));
        d.delay = Some(150);
        d.platform = Some("2".into());
        let record = convert_departure(&d).unwrap();
        assert_eq!(record.delay_minutes(), Some(2));
        assert_eq!(record.platform(), Some("2"));

        // Early departures floor towards negative
        d.delay = Some(-30);
        assert_eq!(convert_departure(&d).unwrap().delay_minutes(), Some(-1));
    }

    #[test]
    fn board_conversion_skips_bad_departures() {
        let response = DeparturesResponse {
            departures: vec![
                dto(Some("Bus 60"), Some("A"), Some("2024-03-15T09:04:00Z")),
                dto(Some("Bus 60"), Some("A"), None),
                dto(Some("Bus 60"), Some("A"), Some("not a time")),
                dto(Some("STR 8"), Some("B"), Some("2024-03-15T09:06:00Z")),
            ],
            realtime_data_updated_at: None,
        };

        let records = convert_departures(&response);
        let lines: Vec<&str> = records.iter().map(|r| r.line()).collect();
        assert_eq!(lines, ["Bus 60", "STR 8"]);
    }

    #[test]
    fn locations_keep_stops_only() {
        let locations = vec![
            LocationDto {
                kind: Some("stop".into()),
                id: Some("958956".into()),
                name: Some("Saarländer Str.".into()),
                location: Some(CoordinatesDto {
                    latitude: Some(51.33),
                    longitude: Some(12.32),
                }),
            },
            LocationDto {
                kind: Some("poi".into()),
                id: Some("991".into()),
                name: Some("Zoo".into()),
                location: None,
            },
            LocationDto {
                kind: Some("station".into()),
                id: None,
                name: Some("Nameless".into()),
                location: None,
            },
        ];

        let matches = convert_locations(locations);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "958956");
        assert_eq!(matches[0].latitude, Some(51.33));
    }
}
