//! Disband a faction and everything that hangs off it.

use std::sync::Arc;

use territory_domain::{FactionId, PlayerId};

use crate::use_cases::claims::Territory;
use crate::use_cases::registry::{DisbandResult, FactionRegistry};
use crate::use_cases::relations::RelationsEngine;

/// Releases claims, forgets relations and pending requests, then removes the
/// record, all under one registry writer. Member power is left alone.
pub struct DisbandFaction {
    registry: Arc<FactionRegistry>,
    territory: Arc<Territory>,
    relations: Arc<RelationsEngine>,
}

impl DisbandFaction {
    pub fn new(
        registry: Arc<FactionRegistry>,
        territory: Arc<Territory>,
        relations: Arc<RelationsEngine>,
    ) -> Self {
        Self {
            registry,
            territory,
            relations,
        }
    }

    pub fn execute(&self, faction_id: FactionId, requester_id: PlayerId) -> DisbandResult {
        let writer = self.registry.write();
        match writer.get(faction_id) {
            None => return DisbandResult::FactionNotFound,
            Some(f) if !f.is_leader(requester_id) => return DisbandResult::NotLeader,
            Some(_) => {}
        }

        let released = self.territory.unclaim_all_with(&writer, faction_id);
        let relations = self.relations.forget_faction_with(&writer, faction_id);
        let result = self.registry.disband_with(&writer, faction_id, requester_id);

        tracing::info!(
            faction_id = %faction_id,
            released,
            relations,
            "Disband cascade finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{chunk, TestEngine};
    use crate::use_cases::relations::AllyRequestResult;

    #[test]
    fn disband_releases_claims_relations_and_requests() {
        let engine = TestEngine::new();
        let (a, a_leader) = engine.faction("Wardens");
        let (b, b_leader) = engine.faction("Raiders");
        let (c, _) = engine.faction("Nomads");
        engine.seed_claims(a, [chunk(0, 0), chunk(0, 1)]);
        engine.ally(a, c);
        let _ = engine.relations.set_enemy(b_leader, a);
        assert_eq!(
            engine.relations.request_ally(a_leader, b),
            AllyRequestResult::RequestSent
        );
        let member = engine.member(a, a_leader);

        assert_eq!(engine.disband.execute(a, member), DisbandResult::NotLeader);
        assert_eq!(engine.territory.get_total_claim_count(), 2);

        assert_eq!(engine.disband.execute(a, a_leader), DisbandResult::Success);
        assert!(engine.registry.get_faction(a).is_none());
        assert!(!engine.registry.is_in_faction(member));
        assert_eq!(engine.territory.get_claim_owner("world", 0, 0), None);
        assert!(engine.relations.get_allies(c).is_empty());
        assert!(engine.relations.get_enemies(b).is_empty());
        assert!(engine.relations.pending_requests_for(b).is_empty());
        assert_eq!(engine.disband.execute(a, a_leader), DisbandResult::FactionNotFound);
    }

    #[test]
    fn member_power_survives_disband() {
        let engine = TestEngine::new();
        let (a, leader) = engine.faction("Wardens");
        engine.power.set_player_power(leader, 3.0);

        assert_eq!(engine.disband.execute(a, leader), DisbandResult::Success);
        assert_eq!(engine.power.power_of(leader), 3.0);
    }
}
