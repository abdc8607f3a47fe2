//! Read-only interaction checks for the world protection layer.

use std::sync::Arc;

use territory_domain::{ChunkKey, FactionId, PlayerId};

use crate::use_cases::registry::FactionRegistry;
use crate::use_cases::relations::RelationsEngine;

/// Whether a player may interact with a chunk, and why.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionDecision {
    Wilderness,
    OwnTerritory,
    AllyTerritory,
    Denied { owner: FactionId },
}

impl InteractionDecision {
    pub fn is_allowed(self) -> bool {
        !matches!(self, InteractionDecision::Denied { .. })
    }
}

pub struct CheckInteraction {
    registry: Arc<FactionRegistry>,
    relations: Arc<RelationsEngine>,
}

impl CheckInteraction {
    pub fn new(registry: Arc<FactionRegistry>, relations: Arc<RelationsEngine>) -> Self {
        Self {
            registry,
            relations,
        }
    }

    /// Decide using chunk coordinates.
    pub fn execute(&self, player_id: PlayerId, world: &str, x: i32, z: i32) -> InteractionDecision {
        self.decide(player_id, &ChunkKey::new(world, x, z))
    }

    /// Decide using block coordinates.
    pub fn execute_at_block(
        &self,
        player_id: PlayerId,
        world: &str,
        block_x: i32,
        block_z: i32,
    ) -> InteractionDecision {
        self.decide(player_id, &ChunkKey::from_block(world, block_x, block_z))
    }

    fn decide(&self, player_id: PlayerId, chunk: &ChunkKey) -> InteractionDecision {
        let Some(owner) = self.registry.claim_index().owner(chunk) else {
            return InteractionDecision::Wilderness;
        };
        match self.registry.faction_id_of(player_id) {
            Some(mine) if mine == owner => InteractionDecision::OwnTerritory,
            Some(mine) if self.relations.are_allies(mine, owner) => {
                InteractionDecision::AllyTerritory
            }
            _ => InteractionDecision::Denied { owner },
        }
    }
}
