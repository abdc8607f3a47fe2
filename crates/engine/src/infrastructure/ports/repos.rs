//! Storage port traits.
//!
//! The engine never assumes a file format or wire protocol; adapters decide.
//! Every method is asynchronous and reports failure through `RepoError`.

use async_trait::async_trait;
use territory_domain::{Faction, FactionId, PlayerId, PlayerPower};

use super::error::RepoError;

// =============================================================================
// Faction Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FactionRepo: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Faction>, RepoError>;
    async fn save(&self, faction: &Faction) -> Result<(), RepoError>;
    async fn delete(&self, id: FactionId) -> Result<(), RepoError>;
}

// =============================================================================
// Power Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PowerRepo: Send + Sync {
    async fn load(&self, player_id: PlayerId) -> Result<Option<PlayerPower>, RepoError>;
    async fn save(&self, power: &PlayerPower) -> Result<(), RepoError>;
}
