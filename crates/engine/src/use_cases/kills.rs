//! Kill resolution: the power side of a player death.

use std::sync::Arc;

use territory_domain::{PlayerId, PlayerPower, RelationType};

use crate::infrastructure::ports::RepoError;
use crate::use_cases::power::PowerLedger;
use crate::use_cases::registry::FactionRegistry;
use crate::use_cases::relations::RelationsEngine;

/// Power changes applied for one kill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KillOutcome {
    pub victim: PlayerPower,
    /// `None` when the killer's power was left unchanged
    pub killer: Option<PlayerPower>,
    /// Relation of the killer's faction toward the victim's, when both have one
    pub relation: Option<RelationType>,
}

/// The victim always pays the death penalty. The killer is rewarded for an
/// enemy kill and penalized for a neutral kill; ally, same-faction and
/// factionless kills leave the killer unchanged.
pub struct ResolveKill {
    registry: Arc<FactionRegistry>,
    power: Arc<PowerLedger>,
    relations: Arc<RelationsEngine>,
}

impl ResolveKill {
    pub fn new(
        registry: Arc<FactionRegistry>,
        power: Arc<PowerLedger>,
        relations: Arc<RelationsEngine>,
    ) -> Self {
        Self {
            registry,
            power,
            relations,
        }
    }

    /// Both sides are applied in memory even if storage fails for one of
    /// them; the first storage error is returned afterwards.
    pub async fn execute(
        &self,
        killer_id: PlayerId,
        victim_id: PlayerId,
    ) -> Result<KillOutcome, RepoError> {
        let victim = self.power.apply_death_penalty(victim_id).await;
        if killer_id == victim_id {
            return victim.map(|victim| KillOutcome {
                victim,
                killer: None,
                relation: None,
            });
        }

        let relation = self.relations.get_player_relation(killer_id, victim_id);
        let settings = self.registry.settings();
        let killer = match relation {
            Some(RelationType::Enemy) if settings.kill_reward > 0.0 => Some(
                self.power
                    .apply_kill_reward(killer_id, settings.kill_reward)
                    .await,
            ),
            Some(RelationType::Neutral) if settings.neutral_kill_penalty > 0.0 => Some(
                self.power
                    .apply_neutral_kill_penalty(killer_id, settings.neutral_kill_penalty)
                    .await,
            ),
            _ => None,
        };

        let victim = victim.inspect_err(|e| {
            tracing::warn!(victim_id = %victim_id, error = %e, "Victim power not saved");
        })?;
        let killer = killer.transpose()?;

        tracing::info!(
            killer_id = %killer_id,
            victim_id = %victim_id,
            relation = ?relation,
            victim_power = victim.power(),
            "Kill resolved"
        );
        Ok(KillOutcome {
            victim,
            killer,
            relation,
        })
    }
}
