//! Derived chunk → owner index.
//!
//! The index is a cache over the claim sets held by faction snapshots. It is
//! only ever written by the faction store, right after the snapshot that
//! caused the change has been published, and it can be rebuilt from scratch
//! at any time.

use std::collections::HashMap;

use dashmap::DashMap;
use territory_domain::{ChunkKey, Faction, FactionId};

/// Concurrent map from chunk to owning faction.
#[derive(Default)]
pub struct ClaimIndex {
    owners: DashMap<ChunkKey, FactionId>,
}

impl ClaimIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self, chunk: &ChunkKey) -> Option<FactionId> {
        self.owners.get(chunk).map(|entry| *entry.value())
    }

    pub fn is_claimed(&self, chunk: &ChunkKey) -> bool {
        self.owners.contains_key(chunk)
    }

    /// True when one of the four axis neighbors of `chunk` belongs to `faction_id`.
    pub fn has_adjacent_claim(&self, chunk: &ChunkKey, faction_id: FactionId) -> bool {
        chunk
            .neighbors()
            .iter()
            .any(|n| self.owner(n) == Some(faction_id))
    }

    /// Chunks owned by `faction_id`, sorted. Full scan; prefer the faction snapshot.
    pub fn claims_of(&self, faction_id: FactionId) -> Vec<ChunkKey> {
        let mut chunks: Vec<ChunkKey> = self
            .owners
            .iter()
            .filter(|entry| *entry.value() == faction_id)
            .map(|entry| entry.key().clone())
            .collect();
        chunks.sort();
        chunks
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Rebuild from the given snapshots.
    ///
    /// New owners are written before stale entries are dropped, so a chunk
    /// that stays claimed is never observed as unowned mid-rebuild.
    pub(crate) fn rebuild<'a>(&self, factions: impl IntoIterator<Item = &'a Faction>) {
        let mut expected: HashMap<ChunkKey, FactionId> = HashMap::new();
        for faction in factions {
            for chunk in faction.claims() {
                if let Some(previous) = expected.insert(chunk.clone(), faction.id()) {
                    tracing::warn!(
                        chunk = %chunk,
                        kept = %faction.id(),
                        dropped = %previous,
                        "Chunk claimed by more than one faction in storage"
                    );
                }
            }
        }
        for (chunk, owner) in &expected {
            self.owners.insert(chunk.clone(), *owner);
        }
        self.owners
            .retain(|chunk, owner| expected.get(chunk) == Some(&*owner));
    }

    /// Apply the claim-set difference between two snapshots of one faction.
    ///
    /// Additions overwrite any previous owner; removals only drop entries
    /// still owned by `faction_id`, so an ownership transfer that has already
    /// been indexed for the new owner is left intact.
    pub(crate) fn apply(&self, faction_id: FactionId, old: Option<&Faction>, new: Option<&Faction>) {
        if let Some(new) = new {
            for chunk in new.claims() {
                if old.map_or(true, |o| !o.has_claim(chunk)) {
                    self.owners.insert(chunk.clone(), faction_id);
                }
            }
        }
        if let Some(old) = old {
            for chunk in old.claims() {
                if new.map_or(true, |n| !n.has_claim(chunk)) {
                    self.owners.remove_if(chunk, |_, owner| *owner == faction_id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use territory_domain::{FactionName, NameBounds, PlayerId};

    fn faction(name: &str) -> Faction {
        let name = FactionName::new(name, NameBounds::new(1, 32)).unwrap();
        Faction::new(name, PlayerId::new(), "Leader", Utc::now())
    }

    fn chunk(x: i32, z: i32) -> ChunkKey {
        ChunkKey::new("world", x, z)
    }

    #[test]
    fn rebuild_indexes_every_claim() {
        let a = faction("A").with_claim(chunk(0, 0)).with_claim(chunk(0, 1));
        let b = faction("B").with_claim(chunk(5, 5));
        let index = ClaimIndex::new();
        index.rebuild([&a, &b]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.owner(&chunk(0, 1)), Some(a.id()));
        assert_eq!(index.owner(&chunk(5, 5)), Some(b.id()));
        assert!(!index.is_claimed(&chunk(9, 9)));
    }

    #[test]
    fn rebuild_drops_stale_entries() {
        let a = faction("A").with_claim(chunk(0, 0));
        let index = ClaimIndex::new();
        index.rebuild([&a]);

        let a = a.without_claim(&chunk(0, 0)).with_claim(chunk(1, 0));
        index.rebuild([&a]);
        assert!(!index.is_claimed(&chunk(0, 0)));
        assert_eq!(index.owner(&chunk(1, 0)), Some(a.id()));
    }

    #[test]
    fn apply_indexes_additions_and_removals() {
        let old = faction("A").with_claim(chunk(0, 0));
        let new = old.clone().without_claim(&chunk(0, 0)).with_claim(chunk(0, 1));
        let index = ClaimIndex::new();
        index.apply(old.id(), None, Some(&old));
        index.apply(old.id(), Some(&old), Some(&new));

        assert!(!index.is_claimed(&chunk(0, 0)));
        assert_eq!(index.owner(&chunk(0, 1)), Some(old.id()));

        index.apply(old.id(), Some(&new), None);
        assert!(index.is_empty());
    }

    #[test]
    fn removal_keeps_a_chunk_already_transferred() {
        let defender = faction("D").with_claim(chunk(3, 3));
        let attacker = faction("A");
        let index = ClaimIndex::new();
        index.apply(defender.id(), None, Some(&defender));

        let attacker_after = attacker.clone().with_claim(chunk(3, 3));
        index.apply(attacker.id(), Some(&attacker), Some(&attacker_after));
        let defender_after = defender.clone().without_claim(&chunk(3, 3));
        index.apply(defender.id(), Some(&defender), Some(&defender_after));

        assert_eq!(index.owner(&chunk(3, 3)), Some(attacker.id()));
    }

    #[test]
    fn adjacency_ignores_diagonals_and_other_factions() {
        let a = faction("A").with_claim(chunk(0, 0));
        let b = faction("B").with_claim(chunk(2, 1));
        let index = ClaimIndex::new();
        index.rebuild([&a, &b]);

        assert!(index.has_adjacent_claim(&chunk(1, 0), a.id()));
        assert!(!index.has_adjacent_claim(&chunk(1, 1), a.id()));
        assert!(!index.has_adjacent_claim(&chunk(2, 0), a.id()));
        assert!(index.has_adjacent_claim(&chunk(2, 0), b.id()));
    }
}
