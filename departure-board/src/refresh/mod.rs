//! Refresh orchestration.
//!
//! Drives the two independently clocked cycles: the slow cycle fetches
//! departures and updates the cache, the fast cycle projects and renders.
//! Both run until shutdown is requested.

mod backoff;
mod clock;
mod orchestrator;

pub use backoff::StartupBackoff;
pub use clock::{Clock, ManualClock, SystemClock};
pub use orchestrator::{
    FetchOutcome, Orchestrator, RefreshIntervals, RefreshSettings, StartupOutcome,
};
