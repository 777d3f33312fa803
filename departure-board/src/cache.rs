//! In-memory cache of the latest departures per category.
//!
//! The slow cycle writes a complete, filtered board per category; the fast
//! cycle reads snapshots to compute countdowns. Entries are immutable and
//! shared by `Arc`: a write builds a new entry and swaps the pointer, so a
//! reader holds either the previous board or the new one, never a mix.
//!
//! A failed fetch simply doesn't write, leaving the previous entry (and
//! its `fetched_at`) in place. Staleness is judged by the projector from
//! `fetched_at`, not by eviction.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::domain::{Category, DepartureRecord};

/// The latest board for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    category: Category,
    records: Vec<DepartureRecord>,
    fetched_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// The sentinel for a category that has never been fetched.
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            records: Vec::new(),
            fetched_at: None,
        }
    }

    /// Build a populated entry. Records are sorted by departure time.
    pub fn new(
        category: Category,
        mut records: Vec<DepartureRecord>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        records.sort_by_key(|r| r.scheduled_at());
        Self {
            category,
            records,
            fetched_at: Some(fetched_at),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Departures, ascending by departure time.
    pub fn records(&self) -> &[DepartureRecord] {
        &self.records
    }

    /// When the data was fetched; `None` before the first success.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Age of the data at `now`, if it has ever been fetched.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.fetched_at.map(|at| now - at)
    }

    /// Whether the data is unusable for countdowns at `now`.
    ///
    /// Never-fetched entries are always stale.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        match self.age(now) {
            Some(age) => age > threshold,
            None => true,
        }
    }
}

/// Latest entries for every tracked category.
pub type CacheSnapshot = HashMap<Category, Arc<CacheEntry>>;

/// Thread-safe departure cache.
///
/// The lock only guards the category → entry pointer map; it is held just
/// long enough to swap or clone an `Arc`, never across I/O.
#[derive(Debug, Default)]
pub struct DepartureCache {
    entries: RwLock<HashMap<Category, Arc<CacheEntry>>>,
}

impl DepartureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for `category` wholesale.
    ///
    /// `records` should already be filtered to the tracked lines.
    pub async fn update(&self, category: Category, records: Vec<DepartureRecord>, now: DateTime<Utc>) {
        let entry = Arc::new(CacheEntry::new(category, records, now));

        let mut guard = self.entries.write().await;
        guard.insert(category, entry);
    }

    /// Current entry for `category`, or the empty sentinel.
    pub async fn snapshot(&self, category: Category) -> Arc<CacheEntry> {
        let guard = self.entries.read().await;
        guard
            .get(&category)
            .cloned()
            .unwrap_or_else(|| Arc::new(CacheEntry::empty(category)))
    }

    /// Current entries for several categories, taken under one read lock.
    pub async fn snapshot_all(&self, categories: &[Category]) -> CacheSnapshot {
        let guard = self.entries.read().await;
        categories
            .iter()
            .map(|&category| {
                let entry = guard
                    .get(&category)
                    .cloned()
                    .unwrap_or_else(|| Arc::new(CacheEntry::empty(category)));
                (category, entry)
            })
            .collect()
    }

    /// Whether `category` has ever been populated.
    pub async fn is_populated(&self, category: Category) -> bool {
        let guard = self.entries.read().await;
        guard.contains_key(&category)
    }
}
