//! In-memory storage adapters.
//!
//! Back the storage ports with plain maps. Used by the `territory-engine`
//! binary when no durable store is wired in, and by end-to-end tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use territory_domain::{Faction, FactionId, PlayerId, PlayerPower};

use crate::infrastructure::ports::{FactionRepo, PowerRepo, RepoError};

/// Faction storage held in process memory.
#[derive(Default)]
pub struct InMemoryFactionRepo {
    factions: RwLock<HashMap<FactionId, Faction>>,
}

impl InMemoryFactionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. with factions exported from another backend.
    pub fn with_factions(factions: impl IntoIterator<Item = Faction>) -> Self {
        Self {
            factions: RwLock::new(factions.into_iter().map(|f| (f.id(), f)).collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.factions.read().await.len()
    }

    pub async fn get(&self, id: FactionId) -> Option<Faction> {
        self.factions.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl FactionRepo for InMemoryFactionRepo {
    async fn load_all(&self) -> Result<Vec<Faction>, RepoError> {
        Ok(self.factions.read().await.values().cloned().collect())
    }

    async fn save(&self, faction: &Faction) -> Result<(), RepoError> {
        self.factions
            .write()
            .await
            .insert(faction.id(), faction.clone());
        Ok(())
    }

    async fn delete(&self, id: FactionId) -> Result<(), RepoError> {
        self.factions.write().await.remove(&id);
        Ok(())
    }
}

/// Player power storage held in process memory.
#[derive(Default)]
pub struct InMemoryPowerRepo {
    players: RwLock<HashMap<PlayerId, PlayerPower>>,
}

impl InMemoryPowerRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, player_id: PlayerId) -> Option<PlayerPower> {
        self.players.read().await.get(&player_id).copied()
    }
}

#[async_trait]
impl PowerRepo for InMemoryPowerRepo {
    async fn load(&self, player_id: PlayerId) -> Result<Option<PlayerPower>, RepoError> {
        Ok(self.players.read().await.get(&player_id).copied())
    }

    async fn save(&self, power: &PlayerPower) -> Result<(), RepoError> {
        self.players.write().await.insert(power.player_id(), *power);
        Ok(())
    }
}
