//! Faction aggregate - a named group sharing territory, power and diplomacy
//!
//! # Immutable snapshots
//!
//! A `Faction` is never edited in place. Every `with_*` / `without_*` method
//! consumes the value and returns the replacement, and the engine publishes
//! the replacement atomically. Readers holding an older snapshot keep a
//! consistent view.
//!
//! # Invariants
//!
//! - Exactly one member holds `FactionRole::Leader` (checked by
//!   [`Faction::check_invariants`]; a violation is a programming error)
//! - `relations` never stores `RelationType::Neutral`
//! - a home, when set, lies in one of the faction's own claims
//! - `name` satisfies the bounds it was validated against

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::member::Member;
use crate::error::DomainError;
use crate::value_objects::{
    ActivityEntry, ActivityLog, ChunkKey, Description, FactionColor, FactionHome, FactionName,
    FactionRole, FactionTag, RelationType,
};
use territory_domain::{FactionId, PlayerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    // Identity
    id: FactionId,
    name: FactionName,
    created_at: DateTime<Utc>,

    // Cosmetic
    #[serde(default)]
    tag: Option<FactionTag>,
    #[serde(default)]
    color: FactionColor,
    #[serde(default)]
    description: Description,

    // Access
    /// Anyone may join without an invitation
    #[serde(default)]
    open: bool,
    #[serde(default)]
    home: Option<FactionHome>,

    // Owned collections
    members: BTreeMap<PlayerId, Member>,
    #[serde(default)]
    claims: BTreeSet<ChunkKey>,
    /// Directed relations from this faction's perspective
    #[serde(default)]
    relations: BTreeMap<FactionId, RelationType>,
    #[serde(default)]
    activity: ActivityLog,
}

impl Faction {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create a faction whose sole member is its leader.
    pub fn new(
        name: FactionName,
        leader_id: PlayerId,
        leader_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let leader = Member::new(leader_id, leader_name, FactionRole::Leader, now);
        let mut members = BTreeMap::new();
        members.insert(leader_id, leader);
        Self {
            id: FactionId::new(),
            name,
            created_at: now,
            tag: None,
            color: FactionColor::default(),
            description: Description::empty(),
            open: false,
            home: None,
            members,
            claims: BTreeSet::new(),
            relations: BTreeMap::new(),
            activity: ActivityLog::new(),
        }
    }

    // =========================================================================
    // Identity Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> FactionId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &FactionName {
        &self.name
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn tag(&self) -> Option<&FactionTag> {
        self.tag.as_ref()
    }

    #[inline]
    pub fn color(&self) -> &FactionColor {
        &self.color
    }

    #[inline]
    pub fn description(&self) -> &Description {
        &self.description
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    pub fn home(&self) -> Option<&FactionHome> {
        self.home.as_ref()
    }

    pub fn has_home(&self) -> bool {
        self.home.is_some()
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    // =========================================================================
    // Membership Queries
    // =========================================================================

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn member_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.members.keys().copied()
    }

    pub fn member(&self, player_id: PlayerId) -> Option<&Member> {
        self.members.get(&player_id)
    }

    pub fn is_member(&self, player_id: PlayerId) -> bool {
        self.members.contains_key(&player_id)
    }

    pub fn role_of(&self, player_id: PlayerId) -> Option<FactionRole> {
        self.members.get(&player_id).map(Member::role)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn leader(&self) -> Option<&Member> {
        self.members.values().find(|m| m.is_leader())
    }

    pub fn is_leader(&self, player_id: PlayerId) -> bool {
        self.role_of(player_id) == Some(FactionRole::Leader)
    }

    pub fn is_officer_or_higher(&self, player_id: PlayerId) -> bool {
        self.role_of(player_id)
            .is_some_and(FactionRole::is_officer_or_higher)
    }

    // =========================================================================
    // Territory & Diplomacy Queries
    // =========================================================================

    pub fn claims(&self) -> &BTreeSet<ChunkKey> {
        &self.claims
    }

    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    pub fn has_claim(&self, chunk: &ChunkKey) -> bool {
        self.claims.contains(chunk)
    }

    /// Whether `chunk` holds this faction's home.
    pub fn is_home_chunk(&self, chunk: &ChunkKey) -> bool {
        self.home.as_ref().is_some_and(|h| &h.chunk() == chunk)
    }

    /// Directed relation toward `other`; `Neutral` when nothing is stored.
    pub fn relation_with(&self, other: FactionId) -> RelationType {
        self.relations.get(&other).copied().unwrap_or_default()
    }

    pub fn relations(&self) -> &BTreeMap<FactionId, RelationType> {
        &self.relations
    }

    /// Factions this one holds the given relation toward.
    pub fn factions_with_relation(&self, relation: RelationType) -> Vec<FactionId> {
        self.relations
            .iter()
            .filter(|(_, r)| **r == relation)
            .map(|(id, _)| *id)
            .collect()
    }

    // =========================================================================
    // Invariants
    // =========================================================================

    /// Verify structural invariants. A failure means a bug in the caller.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        let leaders = self.members.values().filter(|m| m.is_leader()).count();
        if leaders != 1 {
            return Err(DomainError::validation(format!(
                "Faction {} has {} leaders",
                self.id, leaders
            )));
        }
        if self
            .relations
            .values()
            .any(|r| *r == RelationType::Neutral)
        {
            return Err(DomainError::validation(format!(
                "Faction {} stores an explicit neutral relation",
                self.id
            )));
        }
        if let Some(home) = &self.home {
            if !self.claims.contains(&home.chunk()) {
                return Err(DomainError::validation(format!(
                    "Faction {} has its home outside its territory",
                    self.id
                )));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Replacement Methods
    // =========================================================================

    /// Set the faction's ID (used when loading from storage).
    pub fn with_id(mut self, id: FactionId) -> Self {
        self.id = id;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_name(mut self, name: FactionName) -> Self {
        self.name = name;
        self
    }

    pub fn with_tag(mut self, tag: Option<FactionTag>) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_color(mut self, color: FactionColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = description;
        self
    }

    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    pub fn with_home(mut self, home: Option<FactionHome>) -> Self {
        self.home = home;
        self
    }

    /// Insert or replace a member record.
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.insert(member.player_id(), member);
        self
    }

    pub fn without_member(mut self, player_id: PlayerId) -> Self {
        self.members.remove(&player_id);
        self
    }

    /// Change a member's role. Unknown players leave the value unchanged.
    pub fn with_role(mut self, player_id: PlayerId, role: FactionRole) -> Self {
        if let Some(member) = self.members.remove(&player_id) {
            self.members.insert(player_id, member.with_role(role));
        }
        self
    }

    /// Make `new_leader` the leader and demote every previous leader to
    /// officer, in one replacement value.
    ///
    /// `new_leader` must already be a member; otherwise the value is returned
    /// unchanged so no leaderless snapshot can be produced.
    pub fn with_leadership_transferred(mut self, new_leader: PlayerId) -> Self {
        if !self.members.contains_key(&new_leader) {
            return self;
        }
        for member in self.members.values_mut() {
            if member.player_id() == new_leader {
                *member = member.clone().with_role(FactionRole::Leader);
            } else if member.is_leader() {
                *member = member.clone().with_role(FactionRole::Officer);
            }
        }
        self
    }

    pub fn with_claim(mut self, chunk: ChunkKey) -> Self {
        self.claims.insert(chunk);
        self
    }

    pub fn without_claim(mut self, chunk: &ChunkKey) -> Self {
        self.claims.remove(chunk);
        self
    }

    pub fn without_all_claims(mut self) -> Self {
        self.claims.clear();
        self
    }

    /// Set the relation toward `other`. `Neutral` removes the entry.
    pub fn with_relation(mut self, other: FactionId, relation: RelationType) -> Self {
        match relation {
            RelationType::Neutral => {
                self.relations.remove(&other);
            }
            _ => {
                self.relations.insert(other, relation);
            }
        }
        self
    }

    pub fn with_activity(mut self, entry: ActivityEntry) -> Self {
        self.activity = self.activity.with_entry(entry);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
