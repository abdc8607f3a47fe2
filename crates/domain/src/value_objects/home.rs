//! Faction home - the teleport anchor inside a faction's territory

use serde::{Deserialize, Serialize};

use super::chunk::ChunkKey;

/// A precise position in the host world.
///
/// Only [`FactionHome::chunk`] matters to territory rules; the rest is carried
/// for the teleport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionHome {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}

impl FactionHome {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn with_rotation(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }

    /// The chunk this home stands in.
    pub fn chunk(&self) -> ChunkKey {
        ChunkKey::from_block(
            self.world.clone(),
            self.x.floor() as i32,
            self.z.floor() as i32,
        )
    }
}
