//! Countdown projection.
//!
//! Derives "minutes remaining" from stored absolute departure times, so the
//! display can tick down between fetches without touching the network.

use chrono::{DateTime, Duration, Utc};

use crate::cache::CacheSnapshot;
use crate::domain::{Category, DepartureRecord, LineSelector};

use super::config::{BoardConfig, TrackedCategory};

/// One line on the board at a moment in time.
///
/// Recomputed on every display cycle and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub category: Category,

    /// Configured line name, e.g. "STR 15".
    pub line_label: String,

    /// Whole minutes until the soonest departure; `None` shows as "N/A".
    pub minutes_remaining: Option<u32>,

    /// The soonest departure is due now (`minutes_remaining == Some(0)`).
    pub is_now: bool,

    /// Two or more departures of this line are due now or later.
    pub is_aggregated: bool,

    /// Positive delay of the soonest departure, in minutes.
    pub delay_minutes: Option<u32>,
}

impl DisplayRow {
    /// A row with no usable countdown.
    pub fn unavailable(category: Category, line: &str) -> Self {
        Self {
            category,
            line_label: line.to_string(),
            minutes_remaining: None,
            is_now: false,
            is_aggregated: false,
            delay_minutes: None,
        }
    }

    fn countdown(
        category: Category,
        line: &str,
        minutes: u32,
        is_aggregated: bool,
        delay_minutes: Option<u32>,
    ) -> Self {
        Self {
            category,
            line_label: line.to_string(),
            minutes_remaining: Some(minutes),
            is_now: minutes == 0,
            is_aggregated,
            delay_minutes,
        }
    }
}

/// Whole minutes from `now` until `scheduled_at`, floored and clamped at 0.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use departure_board::board::minutes_until;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
/// assert_eq!(minutes_until(now + Duration::seconds(119), now), 1);
/// assert_eq!(minutes_until(now + Duration::seconds(120), now), 2);
/// assert_eq!(minutes_until(now - Duration::seconds(30), now), 0);
/// ```
pub fn minutes_until(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let secs = (scheduled_at - now).num_seconds();
    if secs <= 0 {
        0
    } else {
        u32::try_from(secs / 60).unwrap_or(u32::MAX)
    }
}

/// Project cached boards into display rows.
///
/// Rows come out in configured order: categories as tracked, lines as
/// listed in each category's filter. Every configured line yields exactly
/// one row, so the layout is stable across cycles. A category whose data
/// is missing or older than the staleness threshold yields "N/A" for all
/// of its lines.
pub fn project(
    tracked: &[TrackedCategory],
    entries: &CacheSnapshot,
    now: DateTime<Utc>,
    config: &BoardConfig,
) -> Vec<DisplayRow> {
    let threshold = config.stale_threshold();
    let grace = config.departed_grace();

    let mut rows = Vec::new();

    for tracked in tracked {
        let usable = entries
            .get(&tracked.category)
            .filter(|entry| !entry.is_stale(now, threshold));

        for selector in tracked.filter.selectors() {
            let row = match usable {
                Some(entry) => project_line(tracked.category, selector, entry.records(), now, grace),
                None => DisplayRow::unavailable(tracked.category, selector.line()),
            };
            rows.push(row);
        }
    }

    rows
}

/// Categories with lines to show whose data can't be used at `now`.
pub fn stale_categories(
    tracked: &[TrackedCategory],
    entries: &CacheSnapshot,
    now: DateTime<Utc>,
    config: &BoardConfig,
) -> Vec<Category> {
    let threshold = config.stale_threshold();

    tracked
        .iter()
        .filter(|t| t.is_active())
        .filter(|t| {
            entries
                .get(&t.category)
                .is_none_or(|entry| entry.is_stale(now, threshold))
        })
        .map(|t| t.category)
        .collect()
}

fn project_line(
    category: Category,
    selector: &LineSelector,
    records: &[DepartureRecord],
    now: DateTime<Utc>,
    grace: Duration,
) -> DisplayRow {
    // Departures further in the past than the grace window have left
    let cutoff = now.checked_sub_signed(grace).unwrap_or(DateTime::<Utc>::MIN_UTC);

    let qualifying: Vec<&DepartureRecord> = records
        .iter()
        .filter(|r| selector.matches(r) && r.scheduled_at() >= cutoff)
        .collect();

    let Some(earliest) = qualifying.iter().min_by_key(|r| r.scheduled_at()) else {
        return DisplayRow::unavailable(category, selector.line());
    };

    // Only departures due now or later count towards aggregation; one still
    // inside the grace window is shown but has already left.
    let upcoming = qualifying.iter().filter(|r| r.scheduled_at() >= now).count();

    let delay = earliest
        .delay_minutes()
        .filter(|&d| d > 0)
        .and_then(|d| u32::try_from(d).ok());

    DisplayRow::countdown(
        category,
        selector.line(),
        minutes_until(earliest.scheduled_at(), now),
        upcoming >= 2,
        delay,
    )
}
