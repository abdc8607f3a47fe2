//! Authoritative faction snapshot store.
//!
//! Holds every live `Faction` as an `Arc` snapshot plus the indexes derived
//! from them (player → faction, name → faction, chunk → faction).
//!
//! # Write discipline
//!
//! Reads are lock-free. All writes go through a [`FactionWriter`], which holds
//! the store's single writer lock for its lifetime, so a "read snapshot →
//! compute replacement → publish" sequence can never interleave with another
//! writer. Multi-faction changes (overclaim, alliance acceptance) publish
//! their replacements under one writer.
//!
//! Each publish replaces the snapshot first and updates the derived indexes
//! afterwards.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::{DashMap, DashSet};
use territory_domain::{name_key, Faction, FactionId, PlayerId};

use super::claim_index::ClaimIndex;

#[derive(Default)]
pub struct FactionStore {
    factions: DashMap<FactionId, Arc<Faction>>,
    by_player: DashMap<PlayerId, FactionId>,
    by_name: DashMap<String, FactionId>,
    claims: ClaimIndex,
    dirty: DashSet<FactionId>,
    deleted: DashSet<FactionId>,
    writer: Mutex<()>,
}

/// Snapshots waiting to be written to storage.
#[derive(Debug, Default)]
pub struct PendingWrites {
    pub saves: Vec<Arc<Faction>>,
    pub deletes: Vec<FactionId>,
}

impl FactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get(&self, id: FactionId) -> Option<Arc<Faction>> {
        self.factions.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn faction_id_of(&self, player_id: PlayerId) -> Option<FactionId> {
        self.by_player.get(&player_id).map(|entry| *entry.value())
    }

    pub fn get_by_player(&self, player_id: PlayerId) -> Option<Arc<Faction>> {
        self.faction_id_of(player_id).and_then(|id| self.get(id))
    }

    /// Case-insensitive name lookup.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<Faction>> {
        let id = self.by_name.get(&name_key(name)).map(|entry| *entry.value())?;
        self.get(id)
    }

    pub fn is_name_taken(&self, name: &str) -> bool {
        self.by_name.contains_key(&name_key(name))
    }

    pub fn all(&self) -> Vec<Arc<Faction>> {
        self.factions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.factions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }

    pub fn claim_index(&self) -> &ClaimIndex {
        &self.claims
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Acquire the single writer. Blocks only behind other writers.
    pub fn write(&self) -> FactionWriter<'_> {
        FactionWriter {
            store: self,
            _guard: self.writer.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Replace the whole snapshot set (e.g. after loading from storage) and
    /// rebuild every derived index. Nothing is left pending.
    pub fn replace_all(&self, factions: Vec<Faction>) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let incoming: BTreeSet<FactionId> = factions.iter().map(Faction::id).collect();
        for faction in factions {
            self.factions.insert(faction.id(), Arc::new(faction));
        }
        self.factions.retain(|id, _| incoming.contains(id));
        self.rebuild_locked();
        self.dirty.clear();
        self.deleted.clear();
    }

    /// Regenerate player, name and claim indexes from the current snapshots.
    pub fn rebuild_indexes(&self) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.rebuild_locked();
    }

    fn rebuild_locked(&self) {
        let snapshots = self.all();

        self.by_player.clear();
        self.by_name.clear();
        for faction in &snapshots {
            for player_id in faction.member_ids() {
                if let Some(previous) = self.by_player.insert(player_id, faction.id()) {
                    tracing::warn!(
                        player_id = %player_id,
                        kept = %faction.id(),
                        dropped = %previous,
                        "Player listed in more than one faction"
                    );
                }
            }
            self.by_name.insert(faction.name().key(), faction.id());
        }
        self.claims.rebuild(snapshots.iter().map(Arc::as_ref));
    }

    /// Take every snapshot changed since the last call.
    ///
    /// Snapshots are read after their dirty flag is cleared, so a change
    /// published concurrently is either included or stays pending.
    pub fn take_pending(&self) -> PendingWrites {
        let dirty: Vec<FactionId> = self.dirty.iter().map(|id| *id).collect();
        let mut saves = Vec::with_capacity(dirty.len());
        for id in dirty {
            self.dirty.remove(&id);
            if let Some(faction) = self.get(id) {
                saves.push(faction);
            }
        }

        let deleted: Vec<FactionId> = self.deleted.iter().map(|id| *id).collect();
        for id in &deleted {
            self.deleted.remove(id);
        }

        PendingWrites {
            saves,
            deletes: deleted,
        }
    }

    /// Put back writes that failed to reach storage.
    pub fn restore_pending(&self, saves: &[FactionId], deletes: &[FactionId]) {
        for id in saves {
            if self.factions.contains_key(id) {
                self.dirty.insert(*id);
            }
        }
        for id in deletes {
            if !self.factions.contains_key(id) {
                self.deleted.insert(*id);
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.dirty.is_empty() || !self.deleted.is_empty()
    }
}

/// Exclusive write access to a [`FactionStore`].
pub struct FactionWriter<'a> {
    store: &'a FactionStore,
    _guard: MutexGuard<'a, ()>,
}

impl FactionWriter<'_> {
    pub fn get(&self, id: FactionId) -> Option<Arc<Faction>> {
        self.store.get(id)
    }

    pub fn get_by_player(&self, player_id: PlayerId) -> Option<Arc<Faction>> {
        self.store.get_by_player(player_id)
    }

    pub fn is_name_taken(&self, name: &str) -> bool {
        self.store.is_name_taken(name)
    }

    /// Publish a new or replacement snapshot.
    pub fn publish(&self, faction: Faction) -> Arc<Faction> {
        debug_assert!(
            faction.check_invariants().is_ok(),
            "publishing faction that violates invariants: {:?}",
            faction.check_invariants()
        );

        let id = faction.id();
        let new = Arc::new(faction);
        let old = self.store.factions.insert(id, Arc::clone(&new));
        self.reindex(id, old.as_deref(), Some(new.as_ref()));
        self.store.deleted.remove(&id);
        self.store.dirty.insert(id);
        new
    }

    /// Remove a faction and every derived index entry pointing at it.
    pub fn remove(&self, id: FactionId) -> Option<Arc<Faction>> {
        let (_, old) = self.store.factions.remove(&id)?;
        self.reindex(id, Some(old.as_ref()), None);
        self.store.dirty.remove(&id);
        self.store.deleted.insert(id);
        Some(old)
    }

    fn reindex(&self, id: FactionId, old: Option<&Faction>, new: Option<&Faction>) {
        if let Some(old) = old {
            for player_id in old.member_ids() {
                if new.map_or(true, |n| !n.is_member(player_id)) {
                    self.store
                        .by_player
                        .remove_if(&player_id, |_, owner| *owner == id);
                }
            }
            let old_key = old.name().key();
            if new.map_or(true, |n| n.name().key() != old_key) {
                self.store.by_name.remove_if(&old_key, |_, owner| *owner == id);
            }
        }
        if let Some(new) = new {
            for player_id in new.member_ids() {
                self.store.by_player.insert(player_id, id);
            }
            self.store.by_name.insert(new.name().key(), id);
        }
        self.store.claims.apply(id, old, new);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use territory_domain::{ChunkKey, FactionName, FactionRole, Member, NameBounds};

    fn faction(name: &str) -> (Faction, PlayerId) {
        let leader = PlayerId::new();
        let name = FactionName::new(name, NameBounds::new(1, 32)).unwrap();
        (Faction::new(name, leader, "Leader", Utc::now()), leader)
    }

    #[test]
    fn publish_indexes_members_names_and_claims() {
        let store = FactionStore::new();
        let (faction, leader) = faction("Wardens");
        let faction = faction.with_claim(ChunkKey::new("w", 0, 0));
        let id = faction.id();
        store.write().publish(faction);

        assert_eq!(store.faction_id_of(leader), Some(id));
        assert_eq!(store.get_by_name("WARDENS").map(|f| f.id()), Some(id));
        assert_eq!(store.claim_index().owner(&ChunkKey::new("w", 0, 0)), Some(id));
    }

    #[test]
    fn replacement_reindexes_the_difference() {
        let store = FactionStore::new();
        let (faction, _) = faction("Wardens");
        let recruit = PlayerId::new();
        let snapshot = store.write().publish(
            faction.with_member(Member::new(recruit, "Bob", FactionRole::Member, Utc::now())),
        );

        let renamed = FactionName::new("Sentinels", NameBounds::new(1, 32)).unwrap();
        let replacement = (*snapshot)
            .clone()
            .without_member(recruit)
            .with_name(renamed);
        store.write().publish(replacement);

        assert_eq!(store.faction_id_of(recruit), None);
        assert!(!store.is_name_taken("wardens"));
        assert!(store.is_name_taken("sentinels"));
    }

    #[test]
    fn old_snapshots_are_not_mutated() {
        let store = FactionStore::new();
        let (faction, _) = faction("Wardens");
        let before = store.write().publish(faction);
        store
            .write()
            .publish((*before).clone().with_claim(ChunkKey::new("w", 1, 1)));

        assert_eq!(before.claim_count(), 0);
        assert_eq!(store.get(before.id()).map(|f| f.claim_count()), Some(1));
    }

    #[test]
    fn remove_clears_indexes_and_marks_deleted() {
        let store = FactionStore::new();
        let (faction, leader) = faction("Wardens");
        let id = faction.id();
        store
            .write()
            .publish(faction.with_claim(ChunkKey::new("w", 0, 0)));
        store.take_pending();

        assert!(store.write().remove(id).is_some());
        assert!(store.get(id).is_none());
        assert_eq!(store.faction_id_of(leader), None);
        assert!(store.claim_index().is_empty());

        let pending = store.take_pending();
        assert!(pending.saves.is_empty());
        assert_eq!(pending.deletes, vec![id]);
    }

    #[test]
    fn pending_writes_are_taken_once_and_can_be_restored() {
        let store = FactionStore::new();
        let (faction, _) = faction("Wardens");
        let id = faction.id();
        store.write().publish(faction);

        let pending = store.take_pending();
        assert_eq!(pending.saves.len(), 1);
        assert!(!store.has_pending());

        store.restore_pending(&[id], &[]);
        assert!(store.has_pending());
    }

    #[test]
    fn replace_all_rebuilds_and_clears_pending() {
        let store = FactionStore::new();
        let (stale, _) = faction("Stale");
        store.write().publish(stale);

        let (loaded, leader) = faction("Loaded");
        let loaded = loaded.with_claim(ChunkKey::new("w", 4, 4));
        let id = loaded.id();
        store.replace_all(vec![loaded]);

        assert_eq!(store.len(), 1);
        assert!(!store.is_name_taken("stale"));
        assert_eq!(store.faction_id_of(leader), Some(id));
        assert_eq!(store.claim_index().len(), 1);
        assert!(!store.has_pending());
    }
}
