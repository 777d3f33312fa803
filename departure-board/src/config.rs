//! Configuration loading.
//!
//! The board is configured from a TOML file. Every section is optional and
//! falls back to the defaults below, except `[[categories]]`: at least one
//! must be listed. A handful of environment variables override file values.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::board::{BoardConfig, TimePalette, TrackedCategory};
use crate::domain::{Category, ColorMapping, DirectionFilter, LineFilter, Rgb};
use crate::refresh::{RefreshIntervals, RefreshSettings, StartupBackoff};
use crate::transport::{DEFAULT_BASE_URL, TransportConfig};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "departure-board.toml";

/// Upper bound for every duration setting, in seconds (one day).
const MAX_DURATION_SECS: u64 = 24 * 60 * 60;

/// Overrides `api.base_url`.
pub const API_URL_ENV: &str = "DEPARTURE_BOARD_API_URL";

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Every problem found, not just the first
    #[error("invalid config:\n - {}", .0.join("\n - "))]
    Invalid(Vec<String>),
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub api: ApiSection,
    pub intervals: IntervalsSection,
    pub board: BoardSection,
    pub startup: StartupSection,
    pub categories: Vec<CategorySection>,
    pub colors: ColorsSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiSection {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub max_concurrent: usize,
    /// How far ahead to ask for departures.
    pub duration_mins: u32,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            max_retries: 3,
            retry_delay_secs: 2,
            max_concurrent: 2,
            duration_mins: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntervalsSection {
    pub api_update_secs: u64,
    pub display_update_secs: u64,
}

impl Default for IntervalsSection {
    fn default() -> Self {
        Self {
            api_update_secs: 60,
            display_update_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardSection {
    pub stale_threshold_secs: i64,
    pub departed_grace_secs: i64,
}

impl Default for BoardSection {
    fn default() -> Self {
        let board = BoardConfig::default();
        Self {
            stale_threshold_secs: board.stale_threshold_secs,
            departed_grace_secs: board.departed_grace_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StartupSection {
    pub initial_delay_secs: u64,
    pub max_delay_secs: u64,
    pub max_attempts: u32,
}

impl Default for StartupSection {
    fn default() -> Self {
        Self {
            initial_delay_secs: 10,
            max_delay_secs: 60,
            max_attempts: 5,
        }
    }
}

/// One `[[categories]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySection {
    pub category: Category,
    #[serde(default)]
    pub station_id: String,
    #[serde(default)]
    pub lines: Vec<LineSection>,
}

/// One `[[categories.lines]]` table. Without `directions`, every direction counts.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineSection {
    pub line: String,
    pub directions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorsSection {
    /// Color for lines missing from `lines`.
    pub default_line: Rgb,
    pub now: Rgb,
    pub time: Rgb,
    pub lines: HashMap<String, Rgb>,
}

impl Default for ColorsSection {
    fn default() -> Self {
        let palette = TimePalette::default();
        Self {
            default_line: Rgb::GRAY,
            now: palette.now,
            time: palette.time,
            lines: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Read and parse a config file. Does not validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides looked up by environment variable name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV)
            && !url.trim().is_empty()
        {
            self.api.base_url = url.trim().to_string();
        }
    }

    /// Check the whole configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues: Vec<String> = Vec::new();

        if self.api.base_url.trim().is_empty() {
            issues.push("api.base_url must not be empty".into());
        }
        if self.api.timeout_secs == 0 {
            issues.push("api.timeout_secs must be > 0".into());
        }
        check_at_most(&mut issues, "api.timeout_secs", self.api.timeout_secs);
        check_at_most(&mut issues, "api.retry_delay_secs", self.api.retry_delay_secs);
        if self.api.max_concurrent == 0 {
            issues.push("api.max_concurrent must be > 0".into());
        }
        if self.api.duration_mins == 0 {
            issues.push("api.duration_mins must be > 0".into());
        }

        if self.intervals.api_update_secs == 0 {
            issues.push("intervals.api_update_secs must be > 0".into());
        }
        if self.intervals.display_update_secs == 0 {
            issues.push("intervals.display_update_secs must be > 0".into());
        }
        check_at_most(&mut issues, "intervals.api_update_secs", self.intervals.api_update_secs);
        check_at_most(&mut issues, "intervals.display_update_secs", self.intervals.display_update_secs);

        if self.board.stale_threshold_secs <= 0 {
            issues.push("board.stale_threshold_secs must be > 0".into());
        }
        if self.board.departed_grace_secs < 0 {
            issues.push("board.departed_grace_secs must be >= 0".into());
        }
        check_at_most(&mut issues, "board.stale_threshold_secs", self.board.stale_threshold_secs);
        check_at_most(&mut issues, "board.departed_grace_secs", self.board.departed_grace_secs);

        if self.startup.max_attempts == 0 {
            issues.push("startup.max_attempts must be > 0".into());
        }
        if self.startup.max_delay_secs < self.startup.initial_delay_secs {
            issues.push("startup.max_delay_secs must be >= startup.initial_delay_secs".into());
        }
        check_at_most(&mut issues, "startup.max_delay_secs", self.startup.max_delay_secs);

        if self.categories.is_empty() {
            issues.push("categories must contain at least one category".into());
        }

        let mut seen_categories = HashSet::new();
        for section in &self.categories {
            let name = section.category;
            if !seen_categories.insert(name) {
                issues.push(format!("category {name} is listed more than once"));
            }
            if !section.lines.is_empty() && section.station_id.trim().is_empty() {
                issues.push(format!("categories.{name}.station_id must not be empty"));
            }

            let mut seen_lines = HashSet::new();
            for line in &section.lines {
                if line.line.trim().is_empty() {
                    issues.push(format!("categories.{name} has a line with an empty name"));
                    continue;
                }
                if !seen_lines.insert(line.line.as_str()) {
                    issues.push(format!("categories.{name}: line {:?} is listed more than once", line.line));
                }
                if line.directions.as_ref().is_some_and(Vec::is_empty) {
                    issues.push(format!(
                        "categories.{name}: line {:?} lists no directions (omit the key to accept all)",
                        line.line
                    ));
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    /// Validate and build the orchestrator settings.
    pub fn to_settings(&self) -> Result<RefreshSettings, ConfigError> {
        self.validate()?;

        let tracked = self
            .categories
            .iter()
            .map(|section| {
                let filter = LineFilter::from_lines(section.lines.iter().map(|line| {
                    let directions = match &line.directions {
                        Some(list) => DirectionFilter::only(list.iter().cloned()),
                        None => DirectionFilter::Any,
                    };
                    (line.line.clone(), directions)
                }))
                .map_err(|e| ConfigError::Invalid(vec![format!("categories.{}: {e}", section.category)]))?;
                Ok(TrackedCategory::new(section.category, section.station_id.trim(), filter))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(RefreshSettings {
            tracked,
            board: BoardConfig::new(self.board.stale_threshold_secs, self.board.departed_grace_secs),
            colors: ColorMapping::new(self.colors.lines.clone()).with_fallback(self.colors.default_line),
            palette: TimePalette {
                now: self.colors.now,
                time: self.colors.time,
            },
            intervals: RefreshIntervals {
                api_update: Duration::from_secs(self.intervals.api_update_secs),
                display_update: Duration::from_secs(self.intervals.display_update_secs),
            },
            startup: StartupBackoff::new(
                Duration::from_secs(self.startup.initial_delay_secs),
                Duration::from_secs(self.startup.max_delay_secs),
                self.startup.max_attempts,
            ),
            within_minutes: self.api.duration_mins,
        })
    }

    /// HTTP client settings from the `[api]` section.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(self.api.base_url.clone())
            .with_timeout(self.api.timeout_secs)
            .with_retries(self.api.max_retries, Duration::from_secs(self.api.retry_delay_secs))
            .with_max_concurrent(self.api.max_concurrent)
    }
}

fn check_at_most<T: TryInto<u64>>(issues: &mut Vec<String>, key: &str, value: T) {
    // Negative values are reported by the lower-bound checks
    if let Ok(secs) = value.try_into()
        && secs > MAX_DURATION_SECS
    {
        issues.push(format!("{key} must be <= {MAX_DURATION_SECS}"));
    }
}
