//! Value objects - Immutable objects defined by their attributes

mod activity;
mod chunk;
mod home;
mod names;
mod power;
mod relation;
mod role;
mod settings;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog, ACTIVITY_LOG_CAPACITY};
pub use chunk::{ChunkKey, CHUNK_SHIFT};
pub use home::FactionHome;
pub use names::{
    name_key, Description, FactionColor, FactionName, FactionNameError, FactionTag, NameBounds,
};
pub use power::PlayerPower;
pub use relation::RelationType;
pub use role::FactionRole;
pub use settings::FactionSettings;
