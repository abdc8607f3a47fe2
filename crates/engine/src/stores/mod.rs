//! In-memory state storage modules.
//!
//! Stores hold the runtime state every component reads from:
//! - `FactionStore` - Authoritative faction snapshots plus derived lookups
//! - `ClaimIndex` - Chunk ownership, derived from faction claim sets

mod claim_index;
mod factions;

pub use claim_index::ClaimIndex;
pub use factions::{FactionStore, FactionWriter, PendingWrites};
