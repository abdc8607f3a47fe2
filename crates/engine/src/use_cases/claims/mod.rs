//! Territory claims.
//!
//! Claiming, releasing and seizing chunks. Ownership lives in each faction's
//! claim set; the chunk → owner [`ClaimIndex`](crate::stores::ClaimIndex) is
//! derived from those sets and answers the spatial queries.
//!
//! Every mutation runs under the registry writer, and the index is updated
//! only after the replacement snapshot is published. A `Success` result is
//! therefore visible to every later read.

use std::sync::Arc;

use territory_domain::{
    ActivityEntry, ActivityKind, ChunkKey, FactionId, PlayerId, RelationType,
};

mod types;

pub use types::{ClaimResult, OverclaimResult, UnclaimResult};

use crate::infrastructure::ports::ClockPort;
use crate::stores::FactionWriter;
use crate::use_cases::power::PowerLedger;
use crate::use_cases::registry::FactionRegistry;

pub struct Territory {
    registry: Arc<FactionRegistry>,
    power: Arc<PowerLedger>,
    clock: Arc<dyn ClockPort>,
}

impl Territory {
    pub fn new(
        registry: Arc<FactionRegistry>,
        power: Arc<PowerLedger>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            registry,
            power,
            clock,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get_claim_owner(&self, world: &str, x: i32, z: i32) -> Option<FactionId> {
        self.registry
            .claim_index()
            .owner(&ChunkKey::new(world, x, z))
    }

    pub fn is_claimed(&self, world: &str, x: i32, z: i32) -> bool {
        self.registry
            .claim_index()
            .is_claimed(&ChunkKey::new(world, x, z))
    }

    /// Whether one of the four axis neighbors belongs to `faction_id`.
    pub fn has_adjacent_claim(&self, world: &str, x: i32, z: i32, faction_id: FactionId) -> bool {
        self.registry
            .claim_index()
            .has_adjacent_claim(&ChunkKey::new(world, x, z), faction_id)
    }

    /// Claims of a faction ordered by world, then x, then z.
    pub fn get_faction_claims(&self, faction_id: FactionId) -> Vec<ChunkKey> {
        self.registry
            .get_faction(faction_id)
            .map(|f| f.claims().iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get_total_claim_count(&self) -> usize {
        self.registry.claim_index().len()
    }

    /// Rebuild the chunk index from every faction's claim set.
    pub fn build_index(&self) {
        self.registry.rebuild_indexes();
        tracing::info!(
            claims = self.registry.claim_index().len(),
            "Claim index rebuilt"
        );
    }

    // =========================================================================
    // Claim
    // =========================================================================

    pub fn claim(&self, player_id: PlayerId, world: &str, x: i32, z: i32) -> ClaimResult {
        let writer = self.registry.write();
        let Some(faction) = writer.get_by_player(player_id) else {
            return ClaimResult::NotInFaction;
        };
        if !faction.is_officer_or_higher(player_id) {
            return ClaimResult::NotOfficer;
        }
        if !self.registry.settings().is_world_allowed(world) {
            return ClaimResult::WorldNotAllowed;
        }

        let chunk = ChunkKey::new(world, x, z);
        let index = self.registry.claim_index();
        match index.owner(&chunk) {
            Some(owner) if owner == faction.id() => return ClaimResult::AlreadyClaimedSelf,
            Some(_) => return ClaimResult::AlreadyClaimedOther,
            None => {}
        }
        if faction.claim_count() >= self.power.claim_capacity(&faction) {
            return ClaimResult::MaxClaimsReached;
        }
        if faction.claim_count() > 0 && !index.has_adjacent_claim(&chunk, faction.id()) {
            return ClaimResult::NotAdjacent;
        }

        let replacement = (*faction)
            .clone()
            .with_claim(chunk.clone())
            .with_activity(ActivityEntry::new(
                self.clock.now(),
                Some(player_id),
                ActivityKind::Claimed,
                format!("claimed {}", chunk),
            ));
        writer.publish(replacement);

        tracing::info!(faction_id = %faction.id(), chunk = %chunk, "Chunk claimed");
        ClaimResult::Success
    }

    // =========================================================================
    // Unclaim
    // =========================================================================

    pub fn unclaim(&self, player_id: PlayerId, world: &str, x: i32, z: i32) -> UnclaimResult {
        let writer = self.registry.write();
        let Some(faction) = writer.get_by_player(player_id) else {
            return UnclaimResult::NotInFaction;
        };
        if !faction.is_officer_or_higher(player_id) {
            return UnclaimResult::NotOfficer;
        }

        let chunk = ChunkKey::new(world, x, z);
        match self.registry.claim_index().owner(&chunk) {
            None => return UnclaimResult::ChunkNotClaimed,
            Some(owner) if owner != faction.id() => return UnclaimResult::NotYourClaim,
            Some(_) => {}
        }
        if faction.is_home_chunk(&chunk) {
            return UnclaimResult::CannotUnclaimHome;
        }

        let replacement = (*faction)
            .clone()
            .without_claim(&chunk)
            .with_activity(ActivityEntry::new(
                self.clock.now(),
                Some(player_id),
                ActivityKind::Unclaimed,
                format!("released {}", chunk),
            ));
        writer.publish(replacement);

        tracing::info!(faction_id = %faction.id(), chunk = %chunk, "Chunk unclaimed");
        UnclaimResult::Success
    }

    /// Release every chunk of a faction and clear its home. Returns the number
    /// of chunks released.
    pub fn unclaim_all(&self, faction_id: FactionId) -> usize {
        let writer = self.registry.write();
        self.unclaim_all_with(&writer, faction_id)
    }

    pub(crate) fn unclaim_all_with(&self, writer: &FactionWriter<'_>, faction_id: FactionId) -> usize {
        let Some(faction) = writer.get(faction_id) else {
            return 0;
        };
        let released = faction.claim_count();
        if released == 0 && !faction.has_home() {
            return 0;
        }

        let replacement = (*faction)
            .clone()
            .without_all_claims()
            .with_home(None)
            .with_activity(ActivityEntry::new(
                self.clock.now(),
                None,
                ActivityKind::Unclaimed,
                format!("released all {} claims", released),
            ));
        writer.publish(replacement);

        tracing::info!(faction_id = %faction_id, released, "All claims released");
        released
    }

    // =========================================================================
    // Overclaim
    // =========================================================================

    /// Seize a chunk from a faction holding more claims than its power
    /// supports.
    ///
    /// The attacker's snapshot is published before the defender's, so the
    /// chunk moves straight from one owner to the other in the index.
    pub fn overclaim(&self, player_id: PlayerId, world: &str, x: i32, z: i32) -> OverclaimResult {
        let writer = self.registry.write();
        let Some(attacker) = writer.get_by_player(player_id) else {
            return OverclaimResult::NotInFaction;
        };
        if !attacker.is_officer_or_higher(player_id) {
            return OverclaimResult::NotOfficer;
        }

        let chunk = ChunkKey::new(world, x, z);
        let Some(owner) = self.registry.claim_index().owner(&chunk) else {
            return OverclaimResult::ChunkNotClaimed;
        };
        if owner == attacker.id() {
            return OverclaimResult::AlreadyClaimedSelf;
        }
        let Some(defender) = writer.get(owner) else {
            return OverclaimResult::ChunkNotClaimed;
        };
        if attacker.relation_with(owner) == RelationType::Ally
            || defender.relation_with(attacker.id()) == RelationType::Ally
        {
            return OverclaimResult::AlreadyClaimedAlly;
        }
        if !self.power.is_raidable(&defender) {
            return OverclaimResult::TargetHasPower;
        }
        if attacker.claim_count() >= self.power.claim_capacity(&attacker) {
            return OverclaimResult::MaxClaimsReached;
        }

        let now = self.clock.now();
        writer.publish(
            (*attacker)
                .clone()
                .with_claim(chunk.clone())
                .with_activity(ActivityEntry::new(
                    now,
                    Some(player_id),
                    ActivityKind::Overclaimed,
                    format!("seized {} from {}", chunk, defender.name()),
                )),
        );

        let mut lost = (*defender).clone().without_claim(&chunk);
        if defender.is_home_chunk(&chunk) {
            lost = lost.with_home(None);
        }
        writer.publish(lost.with_activity(ActivityEntry::new(
            now,
            Some(player_id),
            ActivityKind::TerritoryLost,
            format!("lost {} to {}", chunk, attacker.name()),
        )));

        tracing::info!(
            attacker = %attacker.id(),
            defender = %owner,
            chunk = %chunk,
            "Chunk overclaimed"
        );
        OverclaimResult::Success
    }
}
