//! Tracked departure categories.

use std::fmt;

use serde::Deserialize;

/// A group of lines that share one station and one fetch call.
///
/// Categories are tracked independently: each has its own cache entry,
/// fetch outcome and staleness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bus,
    Tram,
}

impl Category {
    /// Every category, in default display order.
    pub const ALL: [Category; 2] = [Category::Bus, Category::Tram];

    /// Lowercase name, as used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bus => "bus",
            Category::Tram => "tram",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
