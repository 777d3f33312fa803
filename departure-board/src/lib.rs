//! Public-transport departure board.
//!
//! Polls a departures API for a few tracked lines and shows, for each,
//! the minutes until its next departure: "now", "N/A" when nothing fresh
//! is known, and a marker when several departures are coming up.
//!
//! Fetching and drawing run on separate clocks. The slow cycle refreshes a
//! shared cache from the network; the fast cycle recomputes countdowns from
//! that cache so the display keeps ticking between polls.

pub mod board;
pub mod cache;
pub mod config;
pub mod display;
pub mod domain;
pub mod refresh;
pub mod transport;
