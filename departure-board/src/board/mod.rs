//! Turning cached departures into display rows.
//!
//! Everything here is pure: given cache snapshots and "now", the projector
//! yields one row per configured line, and the formatter maps each row to
//! label/time text and colors. Missing or stale data becomes "N/A" rows,
//! never an error.

mod config;
mod format;
mod project;


pub use config::{BoardConfig, TrackedCategory};
pub use format::{FormattedRow, TimePalette, format_row, short_label, time_text};
pub use project::{DisplayRow, minutes_until, project, stale_categories};
