//! Territory Engine library.
//!
//! Faction registry, claim index, power ledger and relations engine for a
//! territory-control game mode.
//!
//! ## Structure
//!
//! - `stores/` - In-memory faction snapshots and the derived indexes
//! - `use_cases/` - The four components and the flows that span them
//! - `infrastructure/` - Storage and clock ports, in-memory adapters, settings
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

/// Test fixtures shared by unit and end-to-end tests.
#[cfg(test)]
pub mod test_fixtures;

/// End-to-end scenarios across the composed `App`.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
