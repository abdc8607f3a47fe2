//! Diplomacy flows across factions, and how relations feed protection and
//! kill resolution.

use territory_domain::{FactionSettings, RelationType};

use crate::test_fixtures::{chunk, TestEngine, WORLD};
use crate::use_cases::claims::OverclaimResult;
use crate::use_cases::relations::{
    AcceptAllyResult, AllyRequestResult, SetEnemyResult, SetNeutralResult,
};

fn assert_symmetric_alliances(engine: &TestEngine) {
    for faction in engine.registry.get_all_factions() {
        for ally in faction.factions_with_relation(RelationType::Ally) {
            let other = engine.registry.get_faction(ally).unwrap();
            assert_eq!(
                other.relation_with(faction.id()),
                RelationType::Ally,
                "{} allied with {} but not the reverse",
                faction.name(),
                other.name()
            );
        }
    }
}

#[test]
fn alliance_handshake_is_symmetric_throughout() {
    let engine = TestEngine::new();
    let (a, a_leader) = engine.faction("Wardens");
    let (b, b_leader) = engine.faction("Raiders");
    let (c, c_leader) = engine.faction("Nomads");

    assert_eq!(engine.relations.request_ally(a_leader, b), AllyRequestResult::RequestSent);
    assert_symmetric_alliances(&engine);
    assert!(!engine.relations.are_allies(a, b));

    assert_eq!(engine.relations.accept_ally(b_leader, a), AcceptAllyResult::RequestAccepted);
    assert!(engine.relations.are_allies(a, b));
    assert!(engine.relations.are_allies(b, a));
    assert_symmetric_alliances(&engine);

    // mutual requests complete without an explicit accept
    assert_eq!(engine.relations.request_ally(c_leader, a), AllyRequestResult::RequestSent);
    assert_eq!(engine.relations.request_ally(a_leader, c), AllyRequestResult::RequestAccepted);
    assert_eq!(engine.relations.get_allies(a).len(), 2);
    assert_symmetric_alliances(&engine);

    // either side leaving clears both records
    assert_eq!(engine.relations.set_neutral(b_leader, a), SetNeutralResult::Success);
    assert!(!engine.relations.are_allies(a, b));
    assert_eq!(engine.relations.get_relation(a, b), RelationType::Neutral);
    assert_symmetric_alliances(&engine);

    // declaring war on an ally dissolves the alliance on both sides
    assert_eq!(engine.relations.set_enemy(c_leader, a), SetEnemyResult::Success);
    assert_eq!(engine.relations.get_relation(c, a), RelationType::Enemy);
    assert_eq!(engine.relations.get_relation(a, c), RelationType::Neutral);
    assert_symmetric_alliances(&engine);
}

#[test]
fn enemy_declarations_are_one_sided_and_reversible() {
    let engine = TestEngine::new();
    let (a, a_leader) = engine.faction("Wardens");
    let (b, b_leader) = engine.faction("Raiders");

    assert_eq!(engine.relations.set_enemy(a_leader, b), SetEnemyResult::Success);
    assert!(engine.relations.are_enemies(a, b));
    assert!(!engine.relations.are_enemies(b, a));
    assert_eq!(engine.relations.get_relation(b, a), RelationType::Neutral);
    assert_eq!(
        engine.relations.set_enemy(a_leader, b),
        SetEnemyResult::AlreadyEnemy
    );

    // b answering in kind does not touch a's record
    assert_eq!(engine.relations.set_enemy(b_leader, a), SetEnemyResult::Success);
    assert_eq!(engine.relations.set_neutral(b_leader, a), SetNeutralResult::Success);
    assert!(engine.relations.are_enemies(a, b));
    assert!(!engine.relations.are_enemies(b, a));

    assert_eq!(engine.relations.set_neutral(a_leader, b), SetNeutralResult::Success);
    assert_eq!(engine.relations.get_relation(a, b), RelationType::Neutral);
    assert_eq!(
        engine.relations.set_neutral(a_leader, b),
        SetNeutralResult::AlreadyNeutral
    );
}

#[test]
fn war_cancels_outstanding_requests() {
    let engine = TestEngine::new();
    let (a, a_leader) = engine.faction("Wardens");
    let (b, b_leader) = engine.faction("Raiders");

    assert_eq!(engine.relations.request_ally(a_leader, b), AllyRequestResult::RequestSent);
    assert_eq!(engine.relations.pending_requests_for(b), vec![a]);
    assert_eq!(engine.relations.set_enemy(b_leader, a), SetEnemyResult::Success);

    assert!(!engine.relations.has_pending_request(a, b));
    assert_eq!(
        engine.relations.accept_ally(b_leader, a),
        AcceptAllyResult::NoPendingRequest
    );
}

#[test]
fn allies_share_territory_but_cannot_raid_it() {
    let engine = TestEngine::new();
    let (a, a_leader) = engine.faction("Wardens");
    let (b, b_leader) = engine.faction("Raiders");
    engine.seed_claims(a, (0..4).map(|x| chunk(x, 0)));
    engine.power.set_player_power(a_leader, 0.0);

    assert_eq!(engine.relations.request_ally(a_leader, b), AllyRequestResult::RequestSent);
    assert_eq!(engine.relations.accept_ally(b_leader, a), AcceptAllyResult::RequestAccepted);

    assert!(engine.protection.execute(b_leader, WORLD, 0, 0).is_allowed());
    assert_eq!(
        engine.territory.overclaim(b_leader, WORLD, 0, 0),
        OverclaimResult::AlreadyClaimedAlly
    );

    assert_eq!(engine.relations.set_neutral(a_leader, b), SetNeutralResult::Success);
    assert!(!engine.protection.execute(b_leader, WORLD, 0, 0).is_allowed());
    assert_eq!(
        engine.territory.overclaim(b_leader, WORLD, 0, 0),
        OverclaimResult::Success
    );
}

#[tokio::test]
async fn relations_decide_who_pays_for_a_kill() {
    let mut settings = FactionSettings::default();
    settings.kill_reward = 1.0;
    settings.neutral_kill_penalty = 2.0;
    let engine = TestEngine::with_settings(settings);
    let (_, a_leader) = engine.faction("Wardens");
    let (b, b_leader) = engine.faction("Raiders");
    engine.power.set_player_power(a_leader, 5.0);

    // neutral kill costs the killer
    let outcome = engine.kills.execute(a_leader, b_leader).await.unwrap();
    assert_eq!(outcome.relation, Some(RelationType::Neutral));
    assert_eq!(engine.power.power_of(a_leader), 3.0);

    // after declaring war the same kill pays
    assert_eq!(engine.relations.set_enemy(a_leader, b), SetEnemyResult::Success);
    let outcome = engine.kills.execute(a_leader, b_leader).await.unwrap();
    assert_eq!(outcome.relation, Some(RelationType::Enemy));
    assert_eq!(engine.power.power_of(a_leader), 4.0);
    assert_eq!(engine.power.power_of(b_leader), 8.0);

    // the victim's view is unaffected by a's declaration
    let outcome = engine.kills.execute(b_leader, a_leader).await.unwrap();
    assert_eq!(outcome.relation, Some(RelationType::Neutral));
}
