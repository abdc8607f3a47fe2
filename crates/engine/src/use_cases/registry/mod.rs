//! Faction registry.
//!
//! The single source of truth for which factions exist, who belongs to them
//! and in what role. Every mutation here, and every faction mutation made by
//! the claim and relations components, goes through [`FactionRegistry::write`]
//! so there is exactly one writer of faction snapshots at a time.
//!
//! In-memory operations are synchronous and return closed result enums.
//! Storage is touched only by [`FactionRegistry::load_all`] and
//! [`FactionRegistry::flush`].

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use territory_domain::{
    ActivityEntry, ActivityKind, Description, Faction, FactionColor, FactionHome, FactionId,
    FactionName, FactionNameError, FactionRole, FactionSettings, FactionTag, Member, PlayerId,
};

mod types;

pub use types::{
    ClearHomeResult, CreateFactionResult, DisbandResult, FlushReport, InviteResult, JoinResult,
    MembershipResult, RankResult, RenameResult, SetHomeResult, TransferResult, UpdateResult,
};

use crate::infrastructure::ports::{ClockPort, FactionRepo, RepoError};
use crate::stores::{ClaimIndex, FactionStore, FactionWriter};

pub struct FactionRegistry {
    store: FactionStore,
    repo: Arc<dyn FactionRepo>,
    settings: Arc<FactionSettings>,
    clock: Arc<dyn ClockPort>,
    /// (faction, invited player) → when the invite was sent
    invites: DashMap<(FactionId, PlayerId), DateTime<Utc>>,
}

impl FactionRegistry {
    pub fn new(
        repo: Arc<dyn FactionRepo>,
        settings: Arc<FactionSettings>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            store: FactionStore::new(),
            repo,
            settings,
            clock,
            invites: DashMap::new(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get_faction(&self, id: FactionId) -> Option<Arc<Faction>> {
        self.store.get(id)
    }

    pub fn get_player_faction(&self, player_id: PlayerId) -> Option<Arc<Faction>> {
        self.store.get_by_player(player_id)
    }

    pub fn faction_id_of(&self, player_id: PlayerId) -> Option<FactionId> {
        self.store.faction_id_of(player_id)
    }

    /// Case-insensitive.
    pub fn get_faction_by_name(&self, name: &str) -> Option<Arc<Faction>> {
        self.store.get_by_name(name)
    }

    pub fn is_in_faction(&self, player_id: PlayerId) -> bool {
        self.store.faction_id_of(player_id).is_some()
    }

    pub fn get_all_factions(&self) -> Vec<Arc<Faction>> {
        self.store.all()
    }

    pub fn faction_count(&self) -> usize {
        self.store.len()
    }

    pub fn has_pending_invite(&self, faction_id: FactionId, player_id: PlayerId) -> bool {
        self.invites
            .get(&(faction_id, player_id))
            .is_some_and(|sent| !self.invite_expired(*sent))
    }

    pub fn claim_index(&self) -> &ClaimIndex {
        self.store.claim_index()
    }

    /// Regenerate the player, name and claim indexes from the snapshots.
    pub fn rebuild_indexes(&self) {
        self.store.rebuild_indexes();
    }

    pub fn settings(&self) -> &FactionSettings {
        &self.settings
    }

    /// Exclusive write access to faction snapshots.
    ///
    /// Hold the writer for the whole read-check-publish sequence and never
    /// across an `.await`.
    pub fn write(&self) -> FactionWriter<'_> {
        self.store.write()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn create_faction(
        &self,
        name: &str,
        leader_id: PlayerId,
        leader_name: &str,
    ) -> CreateFactionResult {
        let writer = self.write();
        if writer.get_by_player(leader_id).is_some() {
            return CreateFactionResult::AlreadyInFaction;
        }
        let name = match FactionName::new(name, self.settings.name_bounds()) {
            Ok(name) => name,
            Err(FactionNameError::TooShort { .. }) => return CreateFactionResult::NameTooShort,
            Err(FactionNameError::TooLong { .. }) => return CreateFactionResult::NameTooLong,
        };
        if writer.is_name_taken(name.as_str()) {
            return CreateFactionResult::NameTaken;
        }

        let now = self.clock.now();
        let detail = format!("{} founded {}", leader_name, name);
        let faction = Faction::new(name, leader_id, leader_name, now).with_activity(
            ActivityEntry::new(now, Some(leader_id), ActivityKind::Created, detail),
        );
        let faction = writer.publish(faction);
        self.invites.retain(|(_, player), _| *player != leader_id);

        tracing::info!(
            faction_id = %faction.id(),
            name = %faction.name(),
            leader_id = %leader_id,
            "Faction created"
        );
        CreateFactionResult::Success(faction.id())
    }

    /// Remove the faction record. Claims and relations are released by the
    /// disband use case before this runs.
    pub fn disband_faction(&self, faction_id: FactionId, requester_id: PlayerId) -> DisbandResult {
        let writer = self.write();
        self.disband_with(&writer, faction_id, requester_id)
    }

    /// [`Self::disband_faction`] under a writer the caller already holds.
    pub(crate) fn disband_with(
        &self,
        writer: &FactionWriter<'_>,
        faction_id: FactionId,
        requester_id: PlayerId,
    ) -> DisbandResult {
        let Some(faction) = writer.get(faction_id) else {
            return DisbandResult::FactionNotFound;
        };
        if !faction.is_leader(requester_id) {
            return DisbandResult::NotLeader;
        }
        writer.remove(faction_id);
        self.invites.retain(|(faction, _), _| *faction != faction_id);

        tracing::info!(faction_id = %faction_id, name = %faction.name(), "Faction disbanded");
        DisbandResult::Success
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Add a player directly, bypassing invites. Requires officer or higher.
    pub fn add_member(
        &self,
        faction_id: FactionId,
        target_id: PlayerId,
        target_name: &str,
        requester_id: PlayerId,
    ) -> MembershipResult {
        let writer = self.write();
        let Some(faction) = writer.get(faction_id) else {
            return MembershipResult::NotFound;
        };
        if !faction.is_officer_or_higher(requester_id) {
            return MembershipResult::NotOfficer;
        }
        if writer.get_by_player(target_id).is_some() {
            return MembershipResult::AlreadyInFaction;
        }
        if faction.member_count() >= self.settings.max_members {
            return MembershipResult::FactionFull;
        }

        self.publish_join(&writer, &faction, target_id, target_name, Some(requester_id));
        MembershipResult::Success
    }

    /// Remove a member. `is_kick == false` is a voluntary leave and only the
    /// member themself may request it; a kick needs officer or higher.
    pub fn remove_member(
        &self,
        faction_id: FactionId,
        target_id: PlayerId,
        requester_id: PlayerId,
        is_kick: bool,
    ) -> MembershipResult {
        let writer = self.write();
        let Some(faction) = writer.get(faction_id) else {
            return MembershipResult::NotFound;
        };
        let Some(target) = faction.member(target_id) else {
            return MembershipResult::NotFound;
        };
        let authorized = if is_kick {
            faction.is_officer_or_higher(requester_id)
        } else {
            requester_id == target_id
        };
        if !authorized {
            return MembershipResult::NotOfficer;
        }
        if target.is_leader() {
            return MembershipResult::CannotKickLeader;
        }

        let now = self.clock.now();
        let (kind, detail) = if is_kick {
            (ActivityKind::Kicked, format!("{} was kicked", target.name()))
        } else {
            (ActivityKind::Left, format!("{} left", target.name()))
        };
        let replacement = (*faction)
            .clone()
            .without_member(target_id)
            .with_activity(ActivityEntry::new(now, Some(requester_id), kind, detail));
        writer.publish(replacement);

        tracing::info!(
            faction_id = %faction_id,
            player_id = %target_id,
            kicked = is_kick,
            "Member removed"
        );
        MembershipResult::Success
    }

    /// Leave whatever faction the player is in.
    pub fn leave(&self, player_id: PlayerId) -> MembershipResult {
        match self.store.faction_id_of(player_id) {
            Some(faction_id) => self.remove_member(faction_id, player_id, player_id, false),
            None => MembershipResult::NotFound,
        }
    }

    pub fn invite(
        &self,
        faction_id: FactionId,
        target_id: PlayerId,
        requester_id: PlayerId,
    ) -> InviteResult {
        let writer = self.write();
        let Some(faction) = writer.get(faction_id) else {
            return InviteResult::FactionNotFound;
        };
        if !faction.is_officer_or_higher(requester_id) {
            return InviteResult::NotOfficer;
        }
        if writer.get_by_player(target_id).is_some() {
            return InviteResult::AlreadyInFaction;
        }
        if self.has_pending_invite(faction_id, target_id) {
            return InviteResult::AlreadyInvited;
        }

        let now = self.clock.now();
        self.invites.insert((faction_id, target_id), now);
        writer.publish((*faction).clone().with_activity(ActivityEntry::new(
            now,
            Some(requester_id),
            ActivityKind::Invited,
            format!("invited {}", target_id),
        )));

        tracing::debug!(faction_id = %faction_id, player_id = %target_id, "Player invited");
        InviteResult::Success
    }

    /// Join a faction. Closed factions require an unexpired invite, which is
    /// consumed.
    pub fn join(&self, faction_id: FactionId, player_id: PlayerId, player_name: &str) -> JoinResult {
        let writer = self.write();
        let Some(faction) = writer.get(faction_id) else {
            return JoinResult::FactionNotFound;
        };
        if writer.get_by_player(player_id).is_some() {
            return JoinResult::AlreadyInFaction;
        }
        if faction.member_count() >= self.settings.max_members {
            return JoinResult::FactionFull;
        }
        if !faction.is_open() && !self.has_pending_invite(faction_id, player_id) {
            return JoinResult::NotInvited;
        }

        self.invites.retain(|(_, player), _| *player != player_id);
        self.publish_join(&writer, &faction, player_id, player_name, None);
        JoinResult::Success
    }

    fn publish_join(
        &self,
        writer: &FactionWriter<'_>,
        faction: &Faction,
        player_id: PlayerId,
        player_name: &str,
        actor: Option<PlayerId>,
    ) {
        let now = self.clock.now();
        let replacement = faction
            .clone()
            .with_member(Member::new(player_id, player_name, FactionRole::Member, now))
            .with_activity(ActivityEntry::new(
                now,
                actor.or(Some(player_id)),
                ActivityKind::Joined,
                format!("{} joined", player_name),
            ));
        writer.publish(replacement);
        tracing::info!(faction_id = %faction.id(), player_id = %player_id, "Member joined");
    }

    fn invite_expired(&self, sent: DateTime<Utc>) -> bool {
        let ttl = Duration::seconds(i64::try_from(self.settings.invite_ttl_secs).unwrap_or(i64::MAX));
        self.clock.now() - sent > ttl
    }

    // =========================================================================
    // Ranks
    // =========================================================================

    pub fn promote_member(
        &self,
        faction_id: FactionId,
        target_id: PlayerId,
        requester_id: PlayerId,
    ) -> RankResult {
        self.change_rank(faction_id, target_id, requester_id, true)
    }

    pub fn demote_member(
        &self,
        faction_id: FactionId,
        target_id: PlayerId,
        requester_id: PlayerId,
    ) -> RankResult {
        self.change_rank(faction_id, target_id, requester_id, false)
    }

    fn change_rank(
        &self,
        faction_id: FactionId,
        target_id: PlayerId,
        requester_id: PlayerId,
        promote: bool,
    ) -> RankResult {
        let writer = self.write();
        let Some(faction) = writer.get(faction_id) else {
            return RankResult::NotFound;
        };
        if !faction.is_leader(requester_id) {
            return RankResult::NotLeader;
        }
        let Some(current) = faction.role_of(target_id) else {
            return RankResult::NotFound;
        };

        let next = if promote {
            current.promoted()
        } else {
            current.demoted()
        };
        let Some(next) = next else {
            return match (promote, current) {
                (true, _) => RankResult::CannotPromoteLeader,
                (false, FactionRole::Leader) => RankResult::CannotDemoteLeader,
                (false, _) => RankResult::CannotDemoteMember,
            };
        };

        let kind = if promote {
            ActivityKind::Promoted
        } else {
            ActivityKind::Demoted
        };
        let replacement = (*faction)
            .clone()
            .with_role(target_id, next)
            .with_activity(ActivityEntry::new(
                self.clock.now(),
                Some(requester_id),
                kind,
                format!("{} is now {}", target_id, next),
            ));
        writer.publish(replacement);

        tracing::info!(
            faction_id = %faction_id,
            player_id = %target_id,
            role = %next,
            "Member rank changed"
        );
        RankResult::Success
    }

    /// Hand leadership to another member. The old leader becomes an officer
    /// in the same replacement snapshot.
    pub fn transfer_leadership(
        &self,
        faction_id: FactionId,
        target_id: PlayerId,
        requester_id: PlayerId,
    ) -> TransferResult {
        let writer = self.write();
        let Some(faction) = writer.get(faction_id) else {
            return TransferResult::NotFound;
        };
        if !faction.is_leader(requester_id) {
            return TransferResult::NotLeader;
        }
        if target_id == requester_id {
            return TransferResult::AlreadyLeader;
        }
        if !faction.is_member(target_id) {
            return TransferResult::NotFound;
        }

        let replacement = (*faction)
            .clone()
            .with_leadership_transferred(target_id)
            .with_activity(ActivityEntry::new(
                self.clock.now(),
                Some(requester_id),
                ActivityKind::LeaderTransferred,
                format!("leadership passed to {}", target_id),
            ));
        writer.publish(replacement);

        tracing::info!(
            faction_id = %faction_id,
            from = %requester_id,
            to = %target_id,
            "Leadership transferred"
        );
        TransferResult::Success
    }

    // =========================================================================
    // Faction Settings
    // =========================================================================

    pub fn rename(&self, faction_id: FactionId, new_name: &str, requester_id: PlayerId) -> RenameResult {
        let writer = self.write();
        let Some(faction) = writer.get(faction_id) else {
            return RenameResult::FactionNotFound;
        };
        if !faction.is_leader(requester_id) {
            return RenameResult::NotLeader;
        }
        let name = match FactionName::new(new_name, self.settings.name_bounds()) {
            Ok(name) => name,
            Err(FactionNameError::TooShort { .. }) => return RenameResult::NameTooShort,
            Err(FactionNameError::TooLong { .. }) => return RenameResult::NameTooLong,
        };
        if self
            .store
            .get_by_name(name.as_str())
            .is_some_and(|other| other.id() != faction_id)
        {
            return RenameResult::NameTaken;
        }

        let detail = format!("renamed from {} to {}", faction.name(), name);
        let replacement = (*faction).clone().with_name(name).with_activity(ActivityEntry::new(
            self.clock.now(),
            Some(requester_id),
            ActivityKind::Renamed,
            detail,
        ));
        writer.publish(replacement);
        RenameResult::Success
    }

    pub fn set_open(&self, faction_id: FactionId, open: bool, requester_id: PlayerId) -> UpdateResult {
        self.update_settings(faction_id, requester_id, format!("open = {}", open), |f| {
            f.with_open(open)
        })
    }

    pub fn set_description(
        &self,
        faction_id: FactionId,
        description: Description,
        requester_id: PlayerId,
    ) -> UpdateResult {
        self.update_settings(faction_id, requester_id, "description updated".into(), |f| {
            f.with_description(description)
        })
    }

    pub fn set_tag(
        &self,
        faction_id: FactionId,
        tag: Option<FactionTag>,
        requester_id: PlayerId,
    ) -> UpdateResult {
        let detail = match &tag {
            Some(tag) => format!("tag = {}", tag),
            None => "tag cleared".to_string(),
        };
        self.update_settings(faction_id, requester_id, detail, |f| f.with_tag(tag))
    }

    pub fn set_color(
        &self,
        faction_id: FactionId,
        color: FactionColor,
        requester_id: PlayerId,
    ) -> UpdateResult {
        let detail = format!("color = {}", color);
        self.update_settings(faction_id, requester_id, detail, |f| f.with_color(color))
    }

    fn update_settings(
        &self,
        faction_id: FactionId,
        requester_id: PlayerId,
        detail: String,
        apply: impl FnOnce(Faction) -> Faction,
    ) -> UpdateResult {
        let writer = self.write();
        let Some(faction) = writer.get(faction_id) else {
            return UpdateResult::FactionNotFound;
        };
        if !faction.is_officer_or_higher(requester_id) {
            return UpdateResult::NotOfficer;
        }
        let replacement = apply((*faction).clone()).with_activity(ActivityEntry::new(
            self.clock.now(),
            Some(requester_id),
            ActivityKind::SettingsChanged,
            detail,
        ));
        writer.publish(replacement);
        UpdateResult::Success
    }

    /// Set the home of the player's faction. The home must lie in a chunk the
    /// faction owns.
    pub fn set_home(&self, player_id: PlayerId, home: FactionHome) -> SetHomeResult {
        let writer = self.write();
        let Some(faction) = writer.get_by_player(player_id) else {
            return SetHomeResult::NotInFaction;
        };
        if !faction.is_officer_or_higher(player_id) {
            return SetHomeResult::NotOfficer;
        }
        let chunk = home.chunk();
        if !faction.has_claim(&chunk) {
            return SetHomeResult::NotInTerritory;
        }

        let replacement = (*faction).clone().with_home(Some(home)).with_activity(ActivityEntry::new(
            self.clock.now(),
            Some(player_id),
            ActivityKind::HomeSet,
            format!("home set in {}", chunk),
        ));
        writer.publish(replacement);
        tracing::info!(faction_id = %faction.id(), chunk = %chunk, "Faction home set");
        SetHomeResult::Success
    }

    pub fn clear_home(&self, player_id: PlayerId) -> ClearHomeResult {
        let writer = self.write();
        let Some(faction) = writer.get_by_player(player_id) else {
            return ClearHomeResult::NotInFaction;
        };
        if !faction.is_officer_or_higher(player_id) {
            return ClearHomeResult::NotOfficer;
        }
        if !faction.has_home() {
            return ClearHomeResult::NoHome;
        }

        let replacement = (*faction).clone().with_home(None).with_activity(ActivityEntry::new(
            self.clock.now(),
            Some(player_id),
            ActivityKind::HomeCleared,
            "home cleared",
        ));
        writer.publish(replacement);
        ClearHomeResult::Success
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Replace the in-memory state with what storage holds and rebuild every
    /// derived index. Returns the number of factions loaded.
    ///
    /// Factions are accepted oldest first. One that breaks its own invariants,
    /// or shares a name, member or chunk with an already accepted faction, is
    /// skipped.
    pub async fn load_all(&self) -> Result<usize, RepoError> {
        let mut loaded = self.repo.load_all().await?;
        loaded.sort_by_key(|f| (f.created_at(), f.id()));

        let mut names = HashSet::new();
        let mut players = HashSet::new();
        let mut chunks = HashSet::new();
        let mut valid = Vec::with_capacity(loaded.len());
        for faction in loaded {
            if let Err(e) = faction.check_invariants() {
                tracing::error!(
                    faction_id = %faction.id(),
                    error = %e,
                    "Skipping stored faction that violates invariants"
                );
                continue;
            }
            let collision = if names.contains(&faction.name().key()) {
                Some("name")
            } else if faction.member_ids().any(|id| players.contains(&id)) {
                Some("member")
            } else if faction.claims().iter().any(|c| chunks.contains(c)) {
                Some("chunk")
            } else {
                None
            };
            if let Some(shared) = collision {
                tracing::error!(
                    faction_id = %faction.id(),
                    name = %faction.name(),
                    shared,
                    "Skipping stored faction that collides with an earlier one"
                );
                continue;
            }

            names.insert(faction.name().key());
            players.extend(faction.member_ids());
            chunks.extend(faction.claims().iter().cloned());
            valid.push(faction);
        }

        let count = valid.len();
        self.store.replace_all(valid);
        self.invites.clear();
        tracing::info!(count, claims = self.claim_index().len(), "Factions loaded");
        Ok(count)
    }

    /// Write every changed faction and delete every removed one.
    ///
    /// On the first failure the unwritten changes stay pending for the next
    /// flush and the error is returned.
    pub async fn flush(&self) -> Result<FlushReport, RepoError> {
        let pending = self.store.take_pending();
        let mut report = FlushReport::default();

        for (i, faction) in pending.saves.iter().enumerate() {
            if let Err(e) = self.repo.save(faction).await {
                let unsaved: Vec<FactionId> = pending.saves[i..].iter().map(|f| f.id()).collect();
                self.store.restore_pending(&unsaved, &pending.deletes);
                tracing::warn!(faction_id = %faction.id(), error = %e, "Faction save failed");
                return Err(e);
            }
            report.saved += 1;
        }

        for (i, id) in pending.deletes.iter().enumerate() {
            if let Err(e) = self.repo.delete(*id).await {
                self.store.restore_pending(&[], &pending.deletes[i..]);
                tracing::warn!(faction_id = %id, error = %e, "Faction delete failed");
                return Err(e);
            }
            report.deleted += 1;
        }

        if report != FlushReport::default() {
            tracing::debug!(saved = report.saved, deleted = report.deleted, "Factions flushed");
        }
        Ok(report)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.store.has_pending()
    }
}
