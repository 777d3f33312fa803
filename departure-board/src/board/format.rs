//! Row formatting.
//!
//! Maps a display row to the text and colors the renderer draws: the line
//! label in the line's color, followed by the time in white, or red when
//! the departure is due now.

use crate::domain::{ColorMapping, Rgb};

use super::project::DisplayRow;

/// Columns reserved for the shortened line label.
const LABEL_WIDTH: usize = 5;

/// Columns reserved for the time text (before any delay suffix).
const TIME_WIDTH: usize = 4;

/// Marker after the label of a line with several upcoming departures.
const AGGREGATED_MARKER: char = '*';

/// Colors for the time text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePalette {
    /// Color for "now".
    pub now: Rgb,
    /// Color for every other time text, including "N/A".
    pub time: Rgb,
}

impl Default for TimePalette {
    fn default() -> Self {
        Self {
            now: Rgb::RED,
            time: Rgb::WHITE,
        }
    }
}

/// A row ready for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRow {
    /// Label text: shortened line name plus the aggregation marker column.
    pub text: String,
    pub number_color: Rgb,
    pub time_text: String,
    pub time_color: Rgb,
}

impl FormattedRow {
    /// The whole row as uncolored text.
    pub fn plain(&self) -> String {
        format!("{}{}", self.text, self.time_text)
    }
}

/// Format a display row for rendering.
pub fn format_row(row: &DisplayRow, colors: &ColorMapping, palette: &TimePalette) -> FormattedRow {
    let marker = if row.is_aggregated {
        AGGREGATED_MARKER
    } else {
        ' '
    };

    FormattedRow {
        text: format!("{}{}", short_label(&row.line_label), marker),
        number_color: colors.color_for(&row.line_label),
        time_text: time_text(row.minutes_remaining, row.is_now, row.delay_minutes),
        time_color: if row.is_now { palette.now } else { palette.time },
    }
}

/// Shorten a line name to fit the label column.
///
/// # Examples
///
/// ```
/// use departure_board::board::short_label;
///
/// assert_eq!(short_label("Bus 60"), "Bus60");
/// assert_eq!(short_label("STR 8"), "STR8 ");
/// assert_eq!(short_label("S-Bahn S1"), "S-Bah");
/// ```
pub fn short_label(line: &str) -> String {
    let short: String = if line.starts_with("Bus ") {
        line.replace(' ', "")
    } else if let Some(rest) = line.strip_prefix("STR ") {
        format!("STR{rest}")
    } else {
        line.chars().take(LABEL_WIDTH).collect()
    };

    format!("{short:<LABEL_WIDTH$}")
}

/// Time text for a countdown, right-aligned.
///
/// # Examples
///
/// ```
/// use departure_board::board::time_text;
///
/// assert_eq!(time_text(None, false, None), " N/A");
/// assert_eq!(time_text(Some(0), true, None), " now");
/// assert_eq!(time_text(Some(7), false, None), "  7m");
/// assert_eq!(time_text(Some(7), false, Some(2)), "  7m+2");
/// assert_eq!(time_text(Some(135), false, None), "  2h");
/// ```
pub fn time_text(minutes: Option<u32>, is_now: bool, delay_minutes: Option<u32>) -> String {
    let base = match minutes {
        None => "N/A".to_string(),
        Some(_) if is_now => "now".to_string(),
        Some(m) if m < 60 => format!("{m}m"),
        Some(m) => format!("{}h", m / 60),
    };

    let mut text = format!("{base:>TIME_WIDTH$}");
    if minutes.is_some()
        && let Some(delay) = delay_minutes.filter(|&d| d > 0)
    {
        text.push_str(&format!("+{delay}"));
    }
    text
}
