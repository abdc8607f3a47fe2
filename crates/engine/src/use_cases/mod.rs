//! Use cases - User story orchestration.
//!
//! The four components each live in their own module. The remaining modules
//! are flows that span several components.

pub mod claims;
pub mod disband;
pub mod kills;
pub mod power;
pub mod protection;
pub mod registry;
pub mod relations;

// Re-export main types
pub use claims::Territory;
pub use disband::DisbandFaction;
pub use kills::{KillOutcome, ResolveKill};
pub use power::PowerLedger;
pub use protection::{CheckInteraction, InteractionDecision};
pub use registry::FactionRegistry;
pub use relations::RelationsEngine;
