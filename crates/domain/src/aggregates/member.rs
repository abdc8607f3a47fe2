//! Faction member record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::FactionRole;
use territory_domain::PlayerId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    player_id: PlayerId,
    name: String,
    role: FactionRole,
    joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(
        player_id: PlayerId,
        name: impl Into<String>,
        role: FactionRole,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            player_id,
            name: name.into(),
            role,
            joined_at,
        }
    }

    #[inline]
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn role(&self) -> FactionRole {
        self.role
    }

    #[inline]
    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    pub fn is_leader(&self) -> bool {
        self.role == FactionRole::Leader
    }

    pub fn is_officer_or_higher(&self) -> bool {
        self.role.is_officer_or_higher()
    }

    pub fn with_role(mut self, role: FactionRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
