//! Terminal renderer.
//!
//! Draws the board as text lines, coloring the label and time segments
//! with 24-bit ANSI escapes. Stands in for the LED matrix during
//! development and on machines without a panel.

use std::io::{self, IsTerminal, Stdout, Write};

use crate::board::FormattedRow;
use crate::domain::Rgb;

use super::{RenderError, Renderer};

/// Text lines a 64×32 panel fits with a 6×10 font.
const DEFAULT_MAX_ROWS: usize = 4;

const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Renders rows as (optionally colored) text.
pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    color: bool,
    clear_screen: bool,
    max_rows: usize,
}

impl TerminalRenderer<Stdout> {
    /// Render to stdout, with colors and screen clearing when it's a terminal.
    pub fn stdout() -> Self {
        let tty = io::stdout().is_terminal();
        Self::new(io::stdout())
            .with_color(tty)
            .with_clear_screen(tty)
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    /// Render to any writer, plain text, without clearing.
    pub fn new(out: W) -> Self {
        Self {
            out,
            color: false,
            clear_screen: false,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    /// Cap the number of rows drawn.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Consume the renderer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn segment(&self, text: &str, color: Rgb) -> String {
        if self.color {
            format!("\x1b[38;2;{};{};{}m{text}{RESET}", color.r, color.g, color.b)
        } else {
            text.to_string()
        }
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render(&mut self, rows: &[FormattedRow]) -> Result<(), RenderError> {
        let mut frame = String::new();
        if self.clear_screen {
            frame.push_str(CLEAR_SCREEN);
        }

        for row in rows.iter().take(self.max_rows) {
            frame.push_str(&self.segment(&row.text, row.number_color));
            frame.push_str(&self.segment(&row.time_text, row.time_color));
            frame.push('\n');
        }

        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
