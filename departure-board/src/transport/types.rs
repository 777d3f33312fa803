//! Departures API response DTOs.
//!
//! These types map directly to the `transport.rest` JSON responses. They
//! use `Option` liberally because the API sends `null` for unknown values
//! and omits fields for some products.

use serde::Deserialize;

/// Response from `GET /stops/{id}/departures`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeparturesResponse {
    #[serde(default)]
    pub departures: Vec<DepartureDto>,

    /// Server timestamp of the realtime data, if provided.
    pub realtime_data_updated_at: Option<i64>,
}

/// A single departure on the stop's board.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureDto {
    /// Trip identifier (stable across polls).
    pub trip_id: Option<String>,

    /// Expected departure time including delay (RFC 3339).
    /// `null` when the departure is cancelled.
    pub when: Option<String>,

    /// Timetabled departure time (RFC 3339).
    pub planned_when: Option<String>,

    /// Delay in seconds, if realtime data is available.
    pub delay: Option<i64>,

    /// Platform or stop position.
    pub platform: Option<String>,

    /// Final destination shown on the vehicle.
    pub direction: Option<String>,

    /// Line information.
    pub line: Option<LineDto>,

    /// Present and `true` for cancelled departures.
    pub cancelled: Option<bool>,
}

/// Line information within a departure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDto {
    /// Display name, e.g. "Bus 60" or "STR 15".
    pub name: Option<String>,

    /// Product type, e.g. "bus" or "tram".
    pub product: Option<String>,
}

/// One result of `GET /locations`.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationDto {
    /// "stop", "station", "location" or "poi".
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub id: Option<String>,

    pub name: Option<String>,

    pub location: Option<CoordinatesDto>,
}

/// Geographic coordinates of a location.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatesDto {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_departures_with_nulls() {
        let json = r#"{
            "departures": [
                {
                    "tripId": "1|2345|0|80|15032024",
                    "when": "2024-03-15T10:04:00+01:00",
                    "plannedWhen": "2024-03-15T10:02:00+01:00",
                    "delay": 120,
                    "platform": null,
                    "direction": "Lipsiusstraße",
                    "line": { "name": "Bus 60", "product": "bus" }
                },
                {
                    "when": null,
                    "direction": null,
                    "line": { "name": "STR 15" },
                    "cancelled": true
                }
            ],
            "realtimeDataUpdatedAt": 1710493440
        }"#;

        let resp: DeparturesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.departures.len(), 2);
        assert_eq!(resp.departures[0].delay, Some(120));
        assert_eq!(
            resp.departures[0].line.as_ref().unwrap().name.as_deref(),
            Some("Bus 60")
        );
        assert!(resp.departures[1].when.is_none());
        assert_eq!(resp.departures[1].cancelled, Some(true));
    }

    #[test]
    fn missing_departures_defaults_to_empty() {
        let resp: DeparturesResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.departures.is_empty());
    }

    #[test]
    fn parses_location() {
        let json = r#"[{
            "type": "stop",
            "id": "958956",
            "name": "Saarländer Str., Leipzig",
            "location": { "type": "location", "latitude": 51.33, "longitude": 12.32 }
        }]"#;

        let locs: Vec<LocationDto> = serde_json::from_str(json).unwrap();
        assert_eq!(locs[0].id.as_deref(), Some("958956"));
        assert_eq!(locs[0].kind.as_deref(), Some("stop"));
        assert!(locs[0].location.as_ref().unwrap().latitude.is_some());
    }
}
