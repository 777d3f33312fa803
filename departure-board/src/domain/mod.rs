//! Domain types for the departure board.
//!
//! These are the validated values the rest of the crate trades in. Types
//! enforce their invariants at construction time, so the cache and the
//! projector can trust the data they receive and never fail on it.

mod category;
mod color;
mod departure;
mod error;
mod filter;

pub use category::Category;
pub use color::{ColorMapping, Rgb};
pub use departure::DepartureRecord;
pub use error::DomainError;
pub use filter::{DirectionFilter, LineFilter, LineSelector};
