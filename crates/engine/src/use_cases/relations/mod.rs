//! Relations engine.
//!
//! Diplomacy between factions. `Enemy` is one-sided: only the declaring
//! faction's record changes. `Ally` is always held by both sides; it is set on
//! both records at once when a request meets a request from the other side,
//! and removed from both when either side leaves the alliance.
//!
//! Pending ally requests are kept here and never persisted. They are only
//! touched while the registry writer is held, so a request and its reverse
//! cannot both be recorded as "sent".

use std::sync::Arc;

use dashmap::DashSet;
use territory_domain::{
    ActivityEntry, ActivityKind, Faction, FactionId, PlayerId, RelationType,
};

mod types;

pub use types::{AcceptAllyResult, AllyRequestResult, SetEnemyResult, SetNeutralResult};

use crate::infrastructure::ports::ClockPort;
use crate::stores::FactionWriter;
use crate::use_cases::registry::FactionRegistry;

pub struct RelationsEngine {
    registry: Arc<FactionRegistry>,
    clock: Arc<dyn ClockPort>,
    /// (requesting faction, target faction)
    pending: DashSet<(FactionId, FactionId)>,
}

impl RelationsEngine {
    pub fn new(registry: Arc<FactionRegistry>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            registry,
            clock,
            pending: DashSet::new(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Relation of `a` toward `b`. A faction is always its own ally.
    pub fn get_relation(&self, a: FactionId, b: FactionId) -> RelationType {
        if a == b {
            return RelationType::Ally;
        }
        self.registry
            .get_faction(a)
            .map(|f| f.relation_with(b))
            .unwrap_or_default()
    }

    /// Relation between two players' factions; `None` if either has none.
    pub fn get_player_relation(&self, p1: PlayerId, p2: PlayerId) -> Option<RelationType> {
        let a = self.registry.faction_id_of(p1)?;
        let b = self.registry.faction_id_of(p2)?;
        Some(self.get_relation(a, b))
    }

    pub fn are_allies(&self, a: FactionId, b: FactionId) -> bool {
        self.get_relation(a, b) == RelationType::Ally
    }

    /// Directed: whether `a` has declared `b` an enemy.
    pub fn are_enemies(&self, a: FactionId, b: FactionId) -> bool {
        self.get_relation(a, b) == RelationType::Enemy
    }

    pub fn get_allies(&self, faction_id: FactionId) -> Vec<FactionId> {
        self.related(faction_id, RelationType::Ally)
    }

    pub fn get_enemies(&self, faction_id: FactionId) -> Vec<FactionId> {
        self.related(faction_id, RelationType::Enemy)
    }

    fn related(&self, faction_id: FactionId, relation: RelationType) -> Vec<FactionId> {
        self.registry
            .get_faction(faction_id)
            .map(|f| f.factions_with_relation(relation))
            .unwrap_or_default()
    }

    pub fn has_pending_request(&self, from: FactionId, to: FactionId) -> bool {
        self.pending.contains(&(from, to))
    }

    /// Factions that have asked `faction_id` for an alliance.
    pub fn pending_requests_for(&self, faction_id: FactionId) -> Vec<FactionId> {
        let mut from: Vec<FactionId> = self
            .pending
            .iter()
            .filter(|entry| entry.1 == faction_id)
            .map(|entry| entry.0)
            .collect();
        from.sort();
        from
    }

    // =========================================================================
    // Alliances
    // =========================================================================

    /// Ask `target_id` for an alliance, or complete the handshake when the
    /// target has already asked.
    pub fn request_ally(&self, player_id: PlayerId, target_id: FactionId) -> AllyRequestResult {
        let writer = self.registry.write();
        let Some(mine) = writer.get_by_player(player_id) else {
            return AllyRequestResult::NotInFaction;
        };
        if !mine.is_officer_or_higher(player_id) {
            return AllyRequestResult::NotOfficer;
        }
        if mine.id() == target_id {
            return AllyRequestResult::CannotRelateSelf;
        }
        let Some(target) = writer.get(target_id) else {
            return AllyRequestResult::FactionNotFound;
        };
        if mine.relation_with(target_id) == RelationType::Ally {
            return AllyRequestResult::AlreadyAlly;
        }

        if self.pending.contains(&(target_id, mine.id())) {
            self.form_alliance(&writer, &target, &mine, player_id);
            return AllyRequestResult::RequestAccepted;
        }

        self.pending.insert((mine.id(), target_id));
        tracing::info!(from = %mine.id(), to = %target_id, "Ally request sent");
        AllyRequestResult::RequestSent
    }

    /// Accept an outstanding request from `requesting_id`.
    pub fn accept_ally(&self, player_id: PlayerId, requesting_id: FactionId) -> AcceptAllyResult {
        let writer = self.registry.write();
        let Some(mine) = writer.get_by_player(player_id) else {
            return AcceptAllyResult::NotInFaction;
        };
        if !mine.is_officer_or_higher(player_id) {
            return AcceptAllyResult::NotOfficer;
        }
        if !self.pending.contains(&(requesting_id, mine.id())) {
            return AcceptAllyResult::NoPendingRequest;
        }
        let Some(requesting) = writer.get(requesting_id) else {
            self.pending.remove(&(requesting_id, mine.id()));
            return AcceptAllyResult::FactionNotFound;
        };

        self.form_alliance(&writer, &requesting, &mine, player_id);
        AcceptAllyResult::RequestAccepted
    }

    fn form_alliance(
        &self,
        writer: &FactionWriter<'_>,
        requesting: &Faction,
        accepting: &Faction,
        actor: PlayerId,
    ) {
        self.pending.remove(&(requesting.id(), accepting.id()));
        self.pending.remove(&(accepting.id(), requesting.id()));

        let now = self.clock.now();
        writer.publish(
            accepting
                .clone()
                .with_relation(requesting.id(), RelationType::Ally)
                .with_activity(ActivityEntry::new(
                    now,
                    Some(actor),
                    ActivityKind::RelationChanged,
                    format!("allied with {}", requesting.name()),
                )),
        );
        writer.publish(
            requesting
                .clone()
                .with_relation(accepting.id(), RelationType::Ally)
                .with_activity(ActivityEntry::new(
                    now,
                    Some(actor),
                    ActivityKind::RelationChanged,
                    format!("allied with {}", accepting.name()),
                )),
        );

        tracing::info!(a = %requesting.id(), b = %accepting.id(), "Alliance formed");
    }

    // =========================================================================
    // Enemy / Neutral
    // =========================================================================

    /// Declare `target_id` an enemy. Only the caller's record changes, except
    /// that an existing alliance is dissolved on both sides.
    pub fn set_enemy(&self, player_id: PlayerId, target_id: FactionId) -> SetEnemyResult {
        let writer = self.registry.write();
        let Some(mine) = writer.get_by_player(player_id) else {
            return SetEnemyResult::NotInFaction;
        };
        if !mine.is_officer_or_higher(player_id) {
            return SetEnemyResult::NotOfficer;
        }
        if mine.id() == target_id {
            return SetEnemyResult::CannotRelateSelf;
        }
        let Some(target) = writer.get(target_id) else {
            return SetEnemyResult::FactionNotFound;
        };
        let current = mine.relation_with(target_id);
        if current == RelationType::Enemy {
            return SetEnemyResult::AlreadyEnemy;
        }

        self.pending.remove(&(mine.id(), target_id));
        self.pending.remove(&(target_id, mine.id()));

        let now = self.clock.now();
        if target.relation_with(mine.id()) == RelationType::Ally {
            writer.publish(
                (*target)
                    .clone()
                    .with_relation(mine.id(), RelationType::Neutral)
                    .with_activity(ActivityEntry::new(
                        now,
                        Some(player_id),
                        ActivityKind::RelationChanged,
                        format!("alliance with {} ended", mine.name()),
                    )),
            );
        }
        writer.publish(
            (*mine)
                .clone()
                .with_relation(target_id, RelationType::Enemy)
                .with_activity(ActivityEntry::new(
                    now,
                    Some(player_id),
                    ActivityKind::RelationChanged,
                    format!("declared {} an enemy", target.name()),
                )),
        );

        tracing::info!(from = %mine.id(), to = %target_id, "Enemy declared");
        SetEnemyResult::Success
    }

    /// Return to neutral. Leaving an alliance clears both sides; dropping an
    /// enemy declaration clears only the caller's side.
    pub fn set_neutral(&self, player_id: PlayerId, target_id: FactionId) -> SetNeutralResult {
        let writer = self.registry.write();
        let Some(mine) = writer.get_by_player(player_id) else {
            return SetNeutralResult::NotInFaction;
        };
        if !mine.is_officer_or_higher(player_id) {
            return SetNeutralResult::NotOfficer;
        }
        if mine.id() == target_id {
            return SetNeutralResult::CannotRelateSelf;
        }
        let target = writer.get(target_id);
        let current = mine.relation_with(target_id);
        if current == RelationType::Neutral {
            return match target {
                Some(_) => SetNeutralResult::AlreadyNeutral,
                None => SetNeutralResult::FactionNotFound,
            };
        }

        let now = self.clock.now();
        if current == RelationType::Ally {
            if let Some(target) = target
                .as_ref()
                .filter(|t| t.relation_with(mine.id()) == RelationType::Ally)
            {
                writer.publish(
                    (**target)
                        .clone()
                        .with_relation(mine.id(), RelationType::Neutral)
                        .with_activity(ActivityEntry::new(
                            now,
                            Some(player_id),
                            ActivityKind::RelationChanged,
                            format!("alliance with {} ended", mine.name()),
                        )),
                );
            }
        }
        writer.publish(
            (*mine)
                .clone()
                .with_relation(target_id, RelationType::Neutral)
                .with_activity(ActivityEntry::new(
                    now,
                    Some(player_id),
                    ActivityKind::RelationChanged,
                    format!("now neutral toward {}", target_id),
                )),
        );

        tracing::info!(from = %mine.id(), to = %target_id, was = %current, "Relation cleared");
        SetNeutralResult::Success
    }

    // =========================================================================
    // Cleanup
    // =========================================================================

    /// Drop every relation and pending request that references `faction_id`.
    /// Returns how many other factions were updated.
    pub fn forget_faction(&self, faction_id: FactionId) -> usize {
        let writer = self.registry.write();
        self.forget_faction_with(&writer, faction_id)
    }

    pub(crate) fn forget_faction_with(&self, writer: &FactionWriter<'_>, faction_id: FactionId) -> usize {
        self.pending
            .retain(|(from, to)| *from != faction_id && *to != faction_id);

        let mut touched = 0;
        for other in self.registry.get_all_factions() {
            if other.id() == faction_id || !other.relations().contains_key(&faction_id) {
                continue;
            }
            writer.publish((*other).clone().with_relation(faction_id, RelationType::Neutral));
            touched += 1;
        }

        if let Some(own) = writer.get(faction_id) {
            if !own.relations().is_empty() {
                let cleared = own
                    .relations()
                    .keys()
                    .fold((*own).clone(), |f, other| f.with_relation(*other, RelationType::Neutral));
                writer.publish(cleared);
            }
        }

        tracing::debug!(faction_id = %faction_id, touched, "Relations forgotten");
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::TestEngine;

    #[test]
    fn alliance_needs_both_sides() {
        let engine = TestEngine::new();
        let (a, a_leader) = engine.faction("Wardens");
        let (b, b_leader) = engine.faction("Raiders");

        assert_eq!(
            engine.relations.request_ally(a_leader, b),
            AllyRequestResult::RequestSent
        );
        assert!(!engine.relations.are_allies(a, b));
        assert!(engine.relations.has_pending_request(a, b));
        assert_eq!(engine.relations.pending_requests_for(b), vec![a]);

        assert_eq!(
            engine.relations.request_ally(b_leader, a),
            AllyRequestResult::RequestAccepted
        );
        assert!(engine.relations.are_allies(a, b));
        assert!(engine.relations.are_allies(b, a));
        assert!(!engine.relations.has_pending_request(a, b));
        assert_eq!(
            engine.relations.request_ally(a_leader, b),
            AllyRequestResult::AlreadyAlly
        );
    }

    #[test]
    fn explicit_accept_completes_the_handshake() {
        let engine = TestEngine::new();
        let (a, a_leader) = engine.faction("Wardens");
        let (b, b_leader) = engine.faction("Raiders");

        assert_eq!(
            engine.relations.accept_ally(b_leader, a),
            AcceptAllyResult::NoPendingRequest
        );
        let _ = engine.relations.request_ally(a_leader, b);
        assert_eq!(
            engine.relations.accept_ally(b_leader, a),
            AcceptAllyResult::RequestAccepted
        );
        assert_eq!(engine.relations.get_allies(a), vec![b]);
        assert_eq!(engine.relations.get_allies(b), vec![a]);
    }

    #[test]
    fn requests_are_officer_gated_and_never_self_directed() {
        let engine = TestEngine::new();
        let (a, leader) = engine.faction("Wardens");
        let (b, _) = engine.faction("Raiders");
        let member = engine.member(a, leader);

        assert_eq!(engine.relations.request_ally(member, b), AllyRequestResult::NotOfficer);
        assert_eq!(
            engine.relations.request_ally(leader, a),
            AllyRequestResult::CannotRelateSelf
        );
        assert_eq!(
            engine.relations.request_ally(PlayerId::new(), b),
            AllyRequestResult::NotInFaction
        );
        assert_eq!(
            engine.relations.request_ally(leader, FactionId::new()),
            AllyRequestResult::FactionNotFound
        );
    }

    #[test]
    fn enemy_is_one_sided_and_purges_requests() {
        let engine = TestEngine::new();
        let (a, a_leader) = engine.faction("Wardens");
        let (b, b_leader) = engine.faction("Raiders");
        let _ = engine.relations.request_ally(b_leader, a);

        assert_eq!(engine.relations.set_enemy(a_leader, b), SetEnemyResult::Success);
        assert!(engine.relations.are_enemies(a, b));
        assert!(!engine.relations.are_enemies(b, a));
        assert!(!engine.relations.has_pending_request(b, a));
        assert_eq!(engine.relations.set_enemy(a_leader, b), SetEnemyResult::AlreadyEnemy);
    }

    #[test]
    fn declaring_an_ally_enemy_ends_the_alliance_on_both_sides() {
        let engine = TestEngine::new();
        let (a, a_leader) = engine.faction("Wardens");
        let (b, _) = engine.faction("Raiders");
        engine.ally(a, b);

        assert_eq!(engine.relations.set_enemy(a_leader, b), SetEnemyResult::Success);
        assert_eq!(engine.relations.get_relation(a, b), RelationType::Enemy);
        assert_eq!(engine.relations.get_relation(b, a), RelationType::Neutral);
    }

    #[test]
    fn neutral_clears_alliances_both_ways_and_enemies_one_way() {
        let engine = TestEngine::new();
        let (a, a_leader) = engine.faction("Wardens");
        let (b, b_leader) = engine.faction("Raiders");
        let (c, _) = engine.faction("Nomads");
        engine.ally(a, c);

        assert_eq!(engine.relations.set_neutral(a_leader, c), SetNeutralResult::Success);
        assert!(!engine.relations.are_allies(c, a));

        let _ = engine.relations.set_enemy(a_leader, b);
        let _ = engine.relations.set_enemy(b_leader, a);
        assert_eq!(engine.relations.set_neutral(a_leader, b), SetNeutralResult::Success);
        assert!(!engine.relations.are_enemies(a, b));
        assert!(engine.relations.are_enemies(b, a));
        assert_eq!(
            engine.relations.set_neutral(a_leader, b),
            SetNeutralResult::AlreadyNeutral
        );
    }

    #[test]
    fn player_relation_resolves_factions() {
        let engine = TestEngine::new();
        let (a, a_leader) = engine.faction("Wardens");
        let (_, b_leader) = engine.faction("Raiders");
        let a_member = engine.member(a, a_leader);

        assert_eq!(
            engine.relations.get_player_relation(a_leader, a_member),
            Some(RelationType::Ally)
        );
        assert_eq!(
            engine.relations.get_player_relation(a_leader, b_leader),
            Some(RelationType::Neutral)
        );
        assert_eq!(engine.relations.get_player_relation(a_leader, PlayerId::new()), None);
    }

    #[test]
    fn forget_faction_removes_every_reference() {
        let engine = TestEngine::new();
        let (a, a_leader) = engine.faction("Wardens");
        let (b, b_leader) = engine.faction("Raiders");
        let (c, _) = engine.faction("Nomads");
        engine.ally(a, c);
        let _ = engine.relations.set_enemy(b_leader, a);
        let _ = engine.relations.request_ally(a_leader, b);

        assert_eq!(engine.relations.forget_faction(a), 2);
        assert!(engine.relations.get_allies(c).is_empty());
        assert!(engine.relations.get_enemies(b).is_empty());
        assert!(engine.relations.get_allies(a).is_empty());
        assert!(engine.relations.pending_requests_for(b).is_empty());
    }
}
