//! Board policy and layout configuration.

use chrono::Duration;

use crate::domain::{Category, LineFilter};

/// Thresholds governing how cached data is turned into countdowns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Maximum age of fetched data before it is shown as "N/A" (seconds).
    pub stale_threshold_secs: i64,

    /// How long after its departure time a departure still shows as "now"
    /// (seconds). Older departures count as gone.
    pub departed_grace_secs: i64,
}

impl BoardConfig {
    pub fn new(stale_threshold_secs: i64, departed_grace_secs: i64) -> Self {
        Self {
            stale_threshold_secs,
            departed_grace_secs,
        }
    }

    /// Returns the staleness threshold as a Duration.
    pub fn stale_threshold(&self) -> Duration {
        saturating_seconds(self.stale_threshold_secs)
    }

    /// Returns the departed grace window as a Duration.
    pub fn departed_grace(&self) -> Duration {
        saturating_seconds(self.departed_grace_secs)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            stale_threshold_secs: 240, // 4 minutes
            departed_grace_secs: 60,
        }
    }
}

fn saturating_seconds(secs: i64) -> Duration {
    Duration::try_seconds(secs).unwrap_or(if secs < 0 { Duration::MIN } else { Duration::MAX })
}

/// One category on the board: where to fetch it and which lines to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedCategory {
    pub category: Category,
    pub station_id: String,
    pub filter: LineFilter,
}

impl TrackedCategory {
    pub fn new(category: Category, station_id: impl Into<String>, filter: LineFilter) -> Self {
        Self {
            category,
            station_id: station_id.into(),
            filter,
        }
    }

    /// Whether this category has anything to fetch or show.
    pub fn is_active(&self) -> bool {
        !self.filter.is_empty()
    }
}
