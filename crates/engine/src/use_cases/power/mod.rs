//! Power ledger.
//!
//! Per-player power lives in an in-memory cache. Reads never touch storage;
//! unseen players read as the configured starting power. Storage is touched
//! when a player comes online or goes offline, when a penalty or reward is
//! applied, and on `flush_all`.
//!
//! Faction members stay resident whether or not they are online, so faction
//! totals always reflect stored power. Only factionless offline players are
//! evicted.
//!
//! Faction-level figures are never cached. They are summed from the current
//! membership snapshot on every call.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use futures_util::future::join_all;
use territory_domain::{Faction, FactionId, FactionSettings, PlayerId, PlayerPower};

use crate::infrastructure::ports::{ClockPort, PowerRepo, RepoError};
use crate::use_cases::registry::FactionRegistry;

pub struct PowerLedger {
    cache: DashMap<PlayerId, PlayerPower>,
    online: DashSet<PlayerId>,
    repo: Arc<dyn PowerRepo>,
    registry: Arc<FactionRegistry>,
    settings: Arc<FactionSettings>,
    clock: Arc<dyn ClockPort>,
}

impl PowerLedger {
    pub fn new(
        repo: Arc<dyn PowerRepo>,
        registry: Arc<FactionRegistry>,
        settings: Arc<FactionSettings>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            cache: DashMap::new(),
            online: DashSet::new(),
            repo,
            registry,
            settings,
            clock,
        }
    }

    // =========================================================================
    // Player Queries
    // =========================================================================

    /// Cached power, or the starting power for a player never seen.
    pub fn get_player_power(&self, player_id: PlayerId) -> PlayerPower {
        self.cache
            .get(&player_id)
            .map(|entry| *entry.value())
            .unwrap_or_else(|| self.starting_power(player_id))
    }

    pub fn power_of(&self, player_id: PlayerId) -> f64 {
        self.get_player_power(player_id).power()
    }

    pub fn is_online(&self, player_id: PlayerId) -> bool {
        self.online.contains(&player_id)
    }

    pub fn online_count(&self) -> usize {
        self.online.len()
    }

    fn starting_power(&self, player_id: PlayerId) -> PlayerPower {
        PlayerPower::new(
            player_id,
            self.settings.starting_power,
            self.settings.max_power,
            self.clock.now(),
        )
    }

    // =========================================================================
    // Faction Aggregates
    // =========================================================================

    /// Sum of member power; 0 for an unknown faction.
    pub fn get_faction_power(&self, faction_id: FactionId) -> f64 {
        self.registry
            .get_faction(faction_id)
            .map_or(0.0, |f| self.faction_power(&f))
    }

    pub fn get_faction_max_power(&self, faction_id: FactionId) -> f64 {
        self.registry.get_faction(faction_id).map_or(0.0, |f| {
            f.member_ids()
                .map(|id| self.get_player_power(id).max_power())
                .sum()
        })
    }

    pub fn get_faction_claim_capacity(&self, faction_id: FactionId) -> usize {
        self.registry
            .get_faction(faction_id)
            .map_or(0, |f| self.claim_capacity(&f))
    }

    /// A faction holding more claims than its power supports.
    pub fn is_faction_raidable(&self, faction_id: FactionId) -> bool {
        self.registry
            .get_faction(faction_id)
            .is_some_and(|f| self.is_raidable(&f))
    }

    pub fn faction_power(&self, faction: &Faction) -> f64 {
        faction.member_ids().map(|id| self.power_of(id)).sum()
    }

    /// `floor(faction power / power per claim)`.
    pub fn claim_capacity(&self, faction: &Faction) -> usize {
        let per_claim = self.settings.power_per_claim;
        if per_claim.is_nan() || per_claim <= 0.0 {
            return 0;
        }
        let capacity = (self.faction_power(faction) / per_claim).floor();
        if capacity.is_finite() && capacity > 0.0 {
            capacity as usize
        } else {
            0
        }
    }

    /// Strictly more claims than capacity; a faction exactly at capacity is safe.
    pub fn is_raidable(&self, faction: &Faction) -> bool {
        faction.claim_count() > self.claim_capacity(faction)
    }

    // =========================================================================
    // Online Lifecycle
    // =========================================================================

    /// Fetch a player's record into the cache, defaulting when storage has none.
    /// A record already cached is newer than storage and is kept.
    pub async fn load_player(&self, player_id: PlayerId) -> Result<PlayerPower, RepoError> {
        if let Some(cached) = self.cache.get(&player_id) {
            return Ok(*cached.value());
        }
        let power = match self.repo.load(player_id).await? {
            Some(stored) => stored,
            None => self.starting_power(player_id),
        };
        Ok(*self.cache.entry(player_id).or_insert(power))
    }

    /// Make every faction member resident. Returns how many records were
    /// fetched from storage.
    pub async fn load_faction_members(&self) -> Result<usize, RepoError> {
        let missing: Vec<PlayerId> = self
            .registry
            .get_all_factions()
            .iter()
            .flat_map(|f| f.member_ids().collect::<Vec<_>>())
            .filter(|id| !self.cache.contains_key(id))
            .collect();

        let results = join_all(missing.iter().map(|id| self.load_player(*id))).await;
        for result in results {
            result?;
        }
        tracing::info!(players = missing.len(), "Faction member power loaded");
        Ok(missing.len())
    }

    pub async fn player_online(&self, player_id: PlayerId) -> Result<PlayerPower, RepoError> {
        let power = self.load_player(player_id).await?;
        self.online.insert(player_id);
        tracing::debug!(player_id = %player_id, power = power.power(), "Player power loaded");
        Ok(power)
    }

    /// Write the player's record through and, if configured, evict it.
    /// A failed write keeps the cached record.
    pub async fn player_offline(&self, player_id: PlayerId) -> Result<(), RepoError> {
        self.online.remove(&player_id);
        let Some(power) = self.cache.get(&player_id).map(|entry| *entry.value()) else {
            return Ok(());
        };
        self.repo.save(&power).await?;
        self.evict_if_idle(player_id, power);
        Ok(())
    }

    /// Drop a written record unless the player is online, in a faction, or
    /// changed since `written`.
    fn evict_if_idle(&self, player_id: PlayerId, written: PlayerPower) {
        if !self.settings.evict_power_on_offline
            || self.online.contains(&player_id)
            || self.registry.is_in_faction(player_id)
        {
            return;
        }
        self.cache.remove_if(&player_id, |_, cached| *cached == written);
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Subtract the configured death penalty, stamp the death and persist.
    pub async fn apply_death_penalty(&self, player_id: PlayerId) -> Result<PlayerPower, RepoError> {
        self.load_player(player_id).await?;
        let now = self.clock.now();
        let penalty = self.settings.death_penalty;
        let power = self.update(player_id, |p| p.after_death(penalty, now));
        tracing::info!(player_id = %player_id, power = power.power(), "Death penalty applied");
        self.persist(power).await
    }

    pub async fn apply_kill_reward(
        &self,
        player_id: PlayerId,
        amount: f64,
    ) -> Result<PlayerPower, RepoError> {
        self.load_player(player_id).await?;
        let power = self.update(player_id, |p| p.gained(amount));
        tracing::debug!(player_id = %player_id, amount, "Kill reward applied");
        self.persist(power).await
    }

    pub async fn apply_neutral_kill_penalty(
        &self,
        player_id: PlayerId,
        amount: f64,
    ) -> Result<PlayerPower, RepoError> {
        self.load_player(player_id).await?;
        let power = self.update(player_id, |p| p.lost(amount));
        tracing::debug!(player_id = %player_id, amount, "Neutral kill penalty applied");
        self.persist(power).await
    }

    /// Add power up to the player's maximum and stamp the regeneration time.
    pub fn regenerate_power(&self, player_id: PlayerId, amount: f64) -> PlayerPower {
        let now = self.clock.now();
        self.update(player_id, |p| p.regenerated(amount, now))
    }

    /// Override a player's power. Written to storage on the next flush or
    /// when the player goes offline.
    pub fn set_player_power(&self, player_id: PlayerId, power: f64) -> PlayerPower {
        self.update(player_id, |p| p.with_power(power))
    }

    /// One regeneration step for every online player. Returns how many
    /// players were ticked.
    pub fn tick_regeneration(&self) -> usize {
        let minutes = self.settings.regen_interval_secs as f64 / 60.0;
        let amount = self.settings.regen_per_minute * minutes;
        let online: Vec<PlayerId> = self.online.iter().map(|id| *id).collect();
        for player_id in &online {
            self.regenerate_power(*player_id, amount);
        }
        online.len()
    }

    /// Write every cached record. All writes are attempted; the first failure
    /// is returned. Written records of idle players are evicted afterwards.
    pub async fn flush_all(&self) -> Result<usize, RepoError> {
        let snapshot: Vec<PlayerPower> = self.cache.iter().map(|entry| *entry.value()).collect();
        let results = join_all(snapshot.iter().map(|power| self.repo.save(power))).await;

        let mut written = 0;
        let mut first_error = None;
        for (power, result) in snapshot.iter().zip(results) {
            match result {
                Ok(()) => {
                    written += 1;
                    self.evict_if_idle(power.player_id(), *power);
                }
                Err(e) => {
                    tracing::warn!(player_id = %power.player_id(), error = %e, "Power save failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }

    fn update(&self, player_id: PlayerId, f: impl FnOnce(PlayerPower) -> PlayerPower) -> PlayerPower {
        let mut entry = self
            .cache
            .entry(player_id)
            .or_insert_with(|| self.starting_power(player_id));
        let next = f(*entry);
        *entry = next;
        next
    }

    async fn persist(&self, power: PlayerPower) -> Result<PlayerPower, RepoError> {
        self.repo.save(&power).await?;
        Ok(power)
    }
}
