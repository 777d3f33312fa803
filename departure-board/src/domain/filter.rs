//! Line and direction filters.
//!
//! A filter lists the lines tracked for one category, in display order,
//! and for each line the directions that count. Departures that match no
//! entry are dropped before they reach the cache.

use std::collections::BTreeSet;

use super::{DepartureRecord, DomainError};

/// Which directions of a line are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectionFilter {
    /// Every direction is accepted.
    Any,
    /// Only the named directions are accepted.
    Only(BTreeSet<String>),
}

impl DirectionFilter {
    /// Accept only the given directions.
    pub fn only<I, S>(directions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DirectionFilter::Only(directions.into_iter().map(Into::into).collect())
    }

    pub fn accepts(&self, direction: &str) -> bool {
        match self {
            DirectionFilter::Any => true,
            DirectionFilter::Only(allowed) => allowed.contains(direction),
        }
    }
}

/// One tracked line and its accepted directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSelector {
    line: String,
    directions: DirectionFilter,
}

impl LineSelector {
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn directions(&self) -> &DirectionFilter {
        &self.directions
    }

    /// Whether a departure belongs to this line and an accepted direction.
    pub fn matches(&self, departure: &DepartureRecord) -> bool {
        departure.line() == self.line && self.directions.accepts(departure.direction())
    }
}

/// Ordered set of tracked lines for one category.
///
/// An empty filter is valid: the category renders nothing and is never
/// fetched.
///
/// # Examples
///
/// ```
/// use departure_board::domain::{DirectionFilter, LineFilter};
///
/// let filter = LineFilter::from_lines([
///     ("STR 15", DirectionFilter::only(["Meusdorf", "Angerbrücke"])),
///     ("STR 8", DirectionFilter::Any),
/// ])
/// .unwrap();
///
/// let lines: Vec<&str> = filter.selectors().map(|s| s.line()).collect();
/// assert_eq!(lines, ["STR 15", "STR 8"]);
///
/// // The same line twice is rejected
/// assert!(LineFilter::from_lines([
///     ("STR 8", DirectionFilter::Any),
///     ("STR 8", DirectionFilter::Any),
/// ])
/// .is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFilter {
    selectors: Vec<LineSelector>,
}

impl LineFilter {
    /// Build a filter from `(line, directions)` pairs, keeping their order.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (S, DirectionFilter)>,
        S: Into<String>,
    {
        let mut filter = Self::default();
        for (line, directions) in lines {
            filter.push(line, directions)?;
        }
        Ok(filter)
    }

    /// Append a line to the end of the display order.
    pub fn push(
        &mut self,
        line: impl Into<String>,
        directions: DirectionFilter,
    ) -> Result<(), DomainError> {
        let line = line.into();
        if line.trim().is_empty() {
            return Err(DomainError::EmptyLine);
        }
        if self.selectors.iter().any(|s| s.line == line) {
            return Err(DomainError::DuplicateLine(line));
        }
        self.selectors.push(LineSelector { line, directions });
        Ok(())
    }

    /// Tracked lines in display order.
    pub fn selectors(&self) -> impl Iterator<Item = &LineSelector> {
        self.selectors.iter()
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Whether any tracked line accepts this departure.
    pub fn accepts(&self, departure: &DepartureRecord) -> bool {
        self.selectors.iter().any(|s| s.matches(departure))
    }

    /// Keep the accepted departures, sorted by departure time.
    pub fn select(&self, departures: Vec<DepartureRecord>) -> Vec<DepartureRecord> {
        let mut selected: Vec<DepartureRecord> = departures
            .into_iter()
            .filter(|d| self.accepts(d))
            .collect();
        selected.sort_by_key(|d| d.scheduled_at());
        selected
    }
}
