//! A single upcoming departure.

use chrono::{DateTime, Utc};

use super::DomainError;

/// One upcoming departure of a line from a station.
///
/// Stores the absolute departure time rather than a countdown, so the
/// remaining minutes can be recomputed at any moment without refetching.
/// Immutable once built.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use departure_board::domain::DepartureRecord;
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();
/// let dep = DepartureRecord::new("STR 15", "Meusdorf", at).unwrap();
/// assert_eq!(dep.line(), "STR 15");
/// assert_eq!(dep.scheduled_at(), at);
///
/// // Blank line names are rejected
/// assert!(DepartureRecord::new("  ", "Meusdorf", at).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureRecord {
    line: String,
    direction: String,
    scheduled_at: DateTime<Utc>,
    delay_minutes: Option<i64>,
    platform: Option<String>,
}

impl DepartureRecord {
    /// Create a departure, validating that line and direction are present.
    pub fn new(
        line: impl Into<String>,
        direction: impl Into<String>,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let line = line.into();
        let direction = direction.into();

        if line.trim().is_empty() {
            return Err(DomainError::EmptyLine);
        }
        if direction.trim().is_empty() {
            return Err(DomainError::EmptyDirection);
        }

        Ok(Self {
            line,
            direction,
            scheduled_at,
            delay_minutes: None,
            platform: None,
        })
    }

    /// Attach the reported delay in whole minutes.
    pub fn with_delay_minutes(mut self, delay: i64) -> Self {
        self.delay_minutes = Some(delay);
        self
    }

    /// Attach the departure platform.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Line name as reported by the API, e.g. "Bus 60".
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Direction (final destination) of this departure.
    pub fn direction(&self) -> &str {
        &self.direction
    }

    /// Absolute departure time, already including any realtime delay.
    pub fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    /// Reported delay, if the API sent one.
    pub fn delay_minutes(&self) -> Option<i64> {
        self.delay_minutes
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }
}
