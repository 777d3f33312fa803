//! Renderer boundary.
//!
//! The orchestrator hands each cycle's formatted rows to a [`Renderer`].
//! Render failures are reported back only so they can be logged; they
//! never affect cached data or fetching, and the next display tick simply
//! tries again.

mod terminal;

use crate::board::FormattedRow;

pub use terminal::TerminalRenderer;

/// Errors from drawing rows.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Writing to the output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The display device reported a fault
    #[error("display fault: {0}")]
    Device(String),
}

/// Something that can draw the board.
pub trait Renderer: Send {
    /// Draw `rows`, top to bottom, replacing whatever was shown.
    fn render(&mut self, rows: &[FormattedRow]) -> Result<(), RenderError>;

    /// Blank the display.
    fn clear(&mut self) -> Result<(), RenderError> {
        self.render(&[])
    }
}
