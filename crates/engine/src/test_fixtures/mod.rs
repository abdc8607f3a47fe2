//! Shared test helpers.
//!
//! `TestEngine` wires a full [`App`] against in-memory storage and a
//! [`FixedClock`], and offers shortcuts for the setup most tests repeat.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{chunk, TestEngine};
//!
//! #[test]
//! fn claims_next_to_home() {
//!     let engine = TestEngine::new();
//!     let (id, leader) = engine.faction("Wardens");
//!     engine.seed_claims(id, [chunk(0, 0)]);
//!     // ... test logic
//! }
//! ```

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use territory_domain::{ChunkKey, FactionId, FactionSettings, PlayerId, RelationType};

use crate::app::App;
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::memory::{InMemoryFactionRepo, InMemoryPowerRepo};
use crate::use_cases::registry::{CreateFactionResult, MembershipResult, RankResult};
use crate::use_cases::{
    CheckInteraction, DisbandFaction, FactionRegistry, PowerLedger, RelationsEngine, ResolveKill,
    Territory,
};

/// World used by every fixture chunk.
pub const WORLD: &str = "world";

pub fn chunk(x: i32, z: i32) -> ChunkKey {
    ChunkKey::new(WORLD, x, z)
}

pub struct TestEngine {
    pub app: App,
    pub clock: Arc<FixedClock>,
    pub faction_repo: Arc<InMemoryFactionRepo>,
    pub power_repo: Arc<InMemoryPowerRepo>,
    pub registry: Arc<FactionRegistry>,
    pub power: Arc<PowerLedger>,
    pub territory: Arc<Territory>,
    pub relations: Arc<RelationsEngine>,
    pub disband: Arc<DisbandFaction>,
    pub kills: Arc<ResolveKill>,
    pub protection: Arc<CheckInteraction>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_settings(FactionSettings::default())
    }

    pub fn with_settings(settings: FactionSettings) -> Self {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
                .single()
                .expect("valid fixture timestamp"),
        ));
        let faction_repo = Arc::new(InMemoryFactionRepo::new());
        let power_repo = Arc::new(InMemoryPowerRepo::new());
        let app = App::new(
            settings,
            faction_repo.clone(),
            power_repo.clone(),
            clock.clone(),
        );

        Self {
            clock,
            faction_repo,
            power_repo,
            registry: app.registry.clone(),
            power: app.power.clone(),
            territory: app.territory.clone(),
            relations: app.relations.clone(),
            disband: app.use_cases.disband.clone(),
            kills: app.use_cases.kills.clone(),
            protection: app.use_cases.protection.clone(),
            app,
        }
    }

    /// Create a faction led by a fresh player.
    pub fn faction(&self, name: &str) -> (FactionId, PlayerId) {
        let leader = PlayerId::new();
        match self.registry.create_faction(name, leader, "Leader") {
            CreateFactionResult::Success(id) => (id, leader),
            other => panic!("failed to create {}: {:?}", name, other),
        }
    }

    /// Add a plain member.
    pub fn member(&self, faction_id: FactionId, leader: PlayerId) -> PlayerId {
        let player = PlayerId::new();
        let result = self
            .registry
            .add_member(faction_id, player, "Member", leader);
        assert_eq!(result, MembershipResult::Success);
        player
    }

    /// Add a member and promote them to officer.
    pub fn officer(&self, faction_id: FactionId, leader: PlayerId) -> PlayerId {
        let player = self.member(faction_id, leader);
        assert_eq!(
            self.registry.promote_member(faction_id, player, leader),
            RankResult::Success
        );
        player
    }

    /// Give a faction claims directly, skipping adjacency and capacity rules.
    pub fn seed_claims(&self, faction_id: FactionId, chunks: impl IntoIterator<Item = ChunkKey>) {
        let writer = self.registry.write();
        let faction = writer
            .get(faction_id)
            .unwrap_or_else(|| panic!("unknown faction {}", faction_id));
        let seeded = chunks
            .into_iter()
            .fold((*faction).clone(), |f, chunk| f.with_claim(chunk));
        writer.publish(seeded);
    }

    /// Make two factions allies without the request handshake.
    pub fn ally(&self, a: FactionId, b: FactionId) {
        let writer = self.registry.write();
        for (from, to) in [(a, b), (b, a)] {
            let faction = writer
                .get(from)
                .unwrap_or_else(|| panic!("unknown faction {}", from));
            writer.publish((*faction).clone().with_relation(to, RelationType::Ally));
        }
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}
