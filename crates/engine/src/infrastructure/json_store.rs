//! JSON file storage adapter.
//!
//! One pretty-printed JSON document per record:
//!
//! ```text
//! <root>/factions/<faction id>.json
//! <root>/power/<player id>.json
//! ```
//!
//! Writes go to a temporary file that is then renamed over the target, so a
//! crash mid-write leaves the previous document intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use territory_domain::{Faction, FactionId, PlayerId, PlayerPower};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::infrastructure::ports::{FactionRepo, PowerRepo, RepoError};

const FACTIONS_DIR: &str = "factions";
const POWER_DIR: &str = "power";

/// Faction and power storage on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let root = root.into();
        for dir in [FACTIONS_DIR, POWER_DIR] {
            fs::create_dir_all(root.join(dir))
                .await
                .map_err(|e| RepoError::database("open_store", e))?;
        }
        tracing::info!(root = %root.display(), "JSON store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn faction_path(&self, id: FactionId) -> PathBuf {
        self.root.join(FACTIONS_DIR).join(format!("{}.json", id))
    }

    fn power_path(&self, id: PlayerId) -> PathBuf {
        self.root.join(POWER_DIR).join(format!("{}.json", id))
    }
}

async fn write_json<T: Serialize>(
    operation: &'static str,
    path: &Path,
    value: &T,
) -> Result<(), RepoError> {
    let data = serde_json::to_vec_pretty(value).map_err(RepoError::serialization)?;
    let tmp = path.with_extension("json.tmp");

    let mut file = fs::File::create(&tmp)
        .await
        .map_err(|e| RepoError::database(operation, e))?;
    file.write_all(&data)
        .await
        .map_err(|e| RepoError::database(operation, e))?;
    file.sync_all()
        .await
        .map_err(|e| RepoError::database(operation, e))?;
    drop(file);

    fs::rename(&tmp, path)
        .await
        .map_err(|e| RepoError::database(operation, e))
}

async fn read_json<T: DeserializeOwned>(
    operation: &'static str,
    path: &Path,
) -> Result<Option<T>, RepoError> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(RepoError::database(operation, e)),
    };
    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|e| RepoError::serialization(format!("{}: {}", path.display(), e)))
}

#[async_trait]
impl FactionRepo for JsonFileStore {
    async fn load_all(&self) -> Result<Vec<Faction>, RepoError> {
        let dir = self.root.join(FACTIONS_DIR);
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| RepoError::database("load_factions", e))?;

        let mut factions = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::database("load_factions", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match read_json::<Faction>("load_factions", &path).await {
                Ok(Some(faction)) => factions.push(faction),
                Ok(None) => {}
                // one unreadable document should not keep the rest from loading
                Err(e) => tracing::error!(path = %path.display(), error = %e, "Skipping faction file"),
            }
        }
        Ok(factions)
    }

    async fn save(&self, faction: &Faction) -> Result<(), RepoError> {
        write_json("save_faction", &self.faction_path(faction.id()), faction).await
    }

    async fn delete(&self, id: FactionId) -> Result<(), RepoError> {
        match fs::remove_file(self.faction_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RepoError::database("delete_faction", e)),
        }
    }
}

#[async_trait]
impl PowerRepo for JsonFileStore {
    async fn load(&self, player_id: PlayerId) -> Result<Option<PlayerPower>, RepoError> {
        read_json("load_power", &self.power_path(player_id)).await
    }

    async fn save(&self, power: &PlayerPower) -> Result<(), RepoError> {
        write_json("save_power", &self.power_path(power.player_id()), power).await
    }
}
