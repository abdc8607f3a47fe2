//! Application state and composition.

use std::sync::Arc;

use territory_domain::FactionSettings;

use crate::infrastructure::ports::{ClockPort, FactionRepo, PowerRepo, RepoError};
use crate::use_cases::{
    CheckInteraction, DisbandFaction, FactionRegistry, PowerLedger, RelationsEngine, ResolveKill,
    Territory,
};

/// Main application state.
///
/// Holds the four components and the flows composed from them.
pub struct App {
    pub settings: Arc<FactionSettings>,
    pub registry: Arc<FactionRegistry>,
    pub power: Arc<PowerLedger>,
    pub territory: Arc<Territory>,
    pub relations: Arc<RelationsEngine>,
    pub use_cases: UseCases,
}

/// Flows that span several components.
pub struct UseCases {
    pub disband: Arc<DisbandFaction>,
    pub kills: Arc<ResolveKill>,
    pub protection: Arc<CheckInteraction>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        settings: FactionSettings,
        faction_repo: Arc<dyn FactionRepo>,
        power_repo: Arc<dyn PowerRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let settings = Arc::new(settings);

        let registry = Arc::new(FactionRegistry::new(
            faction_repo,
            settings.clone(),
            clock.clone(),
        ));
        let power = Arc::new(PowerLedger::new(
            power_repo,
            registry.clone(),
            settings.clone(),
            clock.clone(),
        ));
        let territory = Arc::new(Territory::new(
            registry.clone(),
            power.clone(),
            clock.clone(),
        ));
        let relations = Arc::new(RelationsEngine::new(registry.clone(), clock));

        let use_cases = UseCases {
            disband: Arc::new(DisbandFaction::new(
                registry.clone(),
                territory.clone(),
                relations.clone(),
            )),
            kills: Arc::new(ResolveKill::new(
                registry.clone(),
                power.clone(),
                relations.clone(),
            )),
            protection: Arc::new(CheckInteraction::new(registry.clone(), relations.clone())),
        };

        Self {
            settings,
            registry,
            power,
            territory,
            relations,
            use_cases,
        }
    }

    /// Load every faction from storage, build the derived indexes and make
    /// every member's power resident.
    pub async fn start(&self) -> Result<usize, RepoError> {
        let loaded = self.registry.load_all().await?;
        self.power.load_faction_members().await?;
        Ok(loaded)
    }

    /// Persist pending faction changes and every cached power record.
    ///
    /// Members who joined while their power was not cached are loaded first.
    /// Every step is attempted even if an earlier one fails; the first error
    /// is returned.
    pub async fn flush(&self) -> Result<(), RepoError> {
        let members = self.power.load_faction_members().await;
        let factions = self.registry.flush().await;
        let power = self.power.flush_all().await;
        members?;
        factions?;
        power?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::memory::{InMemoryFactionRepo, InMemoryPowerRepo};
    use crate::infrastructure::ports::MockFactionRepo;
    use crate::use_cases::registry::CreateFactionResult;
    use territory_domain::PlayerId;

    #[tokio::test]
    async fn state_survives_a_restart() {
        let faction_repo = Arc::new(InMemoryFactionRepo::new());
        let power_repo = Arc::new(InMemoryPowerRepo::new());
        let leader = PlayerId::new();

        let first = App::new(
            FactionSettings::default(),
            faction_repo.clone(),
            power_repo.clone(),
            Arc::new(SystemClock::new()),
        );
        let CreateFactionResult::Success(id) = first.registry.create_faction("Wardens", leader, "A")
        else {
            panic!("faction not created");
        };
        let _ = first.territory.claim(leader, "world", 0, 0);
        first.power.set_player_power(leader, 6.0);
        first.flush().await.unwrap();

        let second = App::new(
            FactionSettings::default(),
            faction_repo,
            power_repo,
            Arc::new(SystemClock::new()),
        );
        assert_eq!(second.start().await.unwrap(), 1);
        assert_eq!(second.territory.get_claim_owner("world", 0, 0), Some(id));
        second.power.player_online(leader).await.unwrap();
        assert_eq!(second.power.power_of(leader), 6.0);
    }

    #[tokio::test]
    async fn weakened_factions_stay_raidable_after_a_restart() {
        let faction_repo = Arc::new(InMemoryFactionRepo::new());
        let power_repo = Arc::new(InMemoryPowerRepo::new());
        let leader = PlayerId::new();

        let first = App::new(
            FactionSettings::default(),
            faction_repo.clone(),
            power_repo.clone(),
            Arc::new(SystemClock::new()),
        );
        let CreateFactionResult::Success(id) = first.registry.create_faction("Wardens", leader, "A")
        else {
            panic!("faction not created");
        };
        let _ = first.territory.claim(leader, "world", 0, 0);
        let _ = first.territory.claim(leader, "world", 1, 0);
        for _ in 0..8 {
            first.power.apply_death_penalty(leader).await.unwrap();
        }
        assert!(first.power.is_faction_raidable(id));
        first.flush().await.unwrap();

        let second = App::new(
            FactionSettings::default(),
            faction_repo,
            power_repo,
            Arc::new(SystemClock::new()),
        );
        second.start().await.unwrap();
        assert!(!second.power.is_online(leader));
        assert_eq!(second.power.get_faction_power(id), 2.0);
        assert!(second.power.is_faction_raidable(id));
    }

    #[tokio::test]
    async fn flush_reports_faction_failures_after_writing_power() {
        let mut faction_repo = MockFactionRepo::new();
        faction_repo
            .expect_save()
            .returning(|_| Err(RepoError::database("save", "offline")));
        let power_repo = Arc::new(InMemoryPowerRepo::new());
        let app = App::new(
            FactionSettings::default(),
            Arc::new(faction_repo),
            power_repo.clone(),
            Arc::new(SystemClock::new()),
        );
        let leader = PlayerId::new();
        let _ = app.registry.create_faction("Wardens", leader, "A");
        app.power.set_player_power(leader, 4.0);

        assert!(app.flush().await.is_err());
        assert_eq!(power_repo.get(leader).await.map(|p| p.power()), Some(4.0));
    }
}
