extern crate self as territory_domain;

pub mod aggregates;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use aggregates::{Faction, Member};

pub use error::DomainError;

// Re-export ID types
pub use ids::{FactionId, PlayerId};

// Re-export value objects (explicit list in value_objects/mod.rs)
pub use value_objects::{
    name_key, ActivityEntry, ActivityKind, ActivityLog, ChunkKey, Description, FactionColor,
    FactionHome, FactionName, FactionNameError, FactionRole, FactionSettings, FactionTag,
    NameBounds, PlayerPower, RelationType, ACTIVITY_LOG_CAPACITY, CHUNK_SHIFT,
};
