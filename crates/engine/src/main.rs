//! Territory Engine - Main entry point.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use territory_engine::infrastructure::clock::SystemClock;
use territory_engine::infrastructure::json_store::JsonFileStore;
use territory_engine::infrastructure::memory::{InMemoryFactionRepo, InMemoryPowerRepo};
use territory_engine::infrastructure::ports::{FactionRepo, PowerRepo};
use territory_engine::infrastructure::settings::load_settings;
use territory_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from the workspace root even when run from `crates/engine`.
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "territory_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Territory Engine");

    // Load configuration
    let config_path = std::env::var("TERRITORY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("territory.toml"));
    let settings = load_settings(Some(&config_path))?;
    let regen_every = Duration::from_secs(settings.regen_interval_secs.max(1));
    let autosave_every = Duration::from_secs(settings.autosave_interval_secs.max(1));

    // Storage: JSON files when a data directory is set, otherwise memory only
    let (faction_repo, power_repo): (Arc<dyn FactionRepo>, Arc<dyn PowerRepo>) =
        match std::env::var("TERRITORY_DATA_DIR") {
            Ok(dir) => {
                let store = Arc::new(JsonFileStore::open(dir).await?);
                (store.clone(), store)
            }
            Err(_) => {
                tracing::warn!("TERRITORY_DATA_DIR not set, state will not survive a restart");
                (
                    Arc::new(InMemoryFactionRepo::new()),
                    Arc::new(InMemoryPowerRepo::new()),
                )
            }
        };

    // Create application
    let app = Arc::new(App::new(
        settings,
        faction_repo,
        power_repo,
        Arc::new(SystemClock::new()),
    ));
    let loaded = app.start().await?;
    tracing::info!(factions = loaded, "Engine ready");

    // Spawn power regeneration
    let regen_app = app.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(regen_every);
        interval.tick().await;
        loop {
            interval.tick().await;
            let players = regen_app.power.tick_regeneration();
            tracing::trace!(players, "Power regeneration tick");
        }
    });

    // Spawn autosave
    let autosave_app = app.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(autosave_every);
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = autosave_app.flush().await {
                tracing::warn!(error = %e, "Autosave failed, will retry next interval");
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down, flushing state");
    app.flush().await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
