//! Faction member roles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Rank of a member inside a faction.
///
/// Variants are declared lowest to highest so `Ord` reflects privilege:
/// `role >= FactionRole::Officer` is the officer-or-higher check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactionRole {
    Member,
    Officer,
    Leader,
}

impl FactionRole {
    pub fn is_officer_or_higher(self) -> bool {
        self >= FactionRole::Officer
    }

    /// Next rank up. Promotion caps at `Officer`; leadership only moves by transfer.
    pub fn promoted(self) -> Option<FactionRole> {
        match self {
            FactionRole::Member => Some(FactionRole::Officer),
            FactionRole::Officer | FactionRole::Leader => None,
        }
    }

    /// Next rank down. Plain members and the leader cannot be demoted.
    pub fn demoted(self) -> Option<FactionRole> {
        match self {
            FactionRole::Officer => Some(FactionRole::Member),
            FactionRole::Member | FactionRole::Leader => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FactionRole::Member => "member",
            FactionRole::Officer => "officer",
            FactionRole::Leader => "leader",
        }
    }
}

impl fmt::Display for FactionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactionRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" => Ok(Self::Member),
            "officer" | "mod" | "moderator" => Ok(Self::Officer),
            "leader" | "owner" => Ok(Self::Leader),
            _ => Err(DomainError::parse(format!("Unknown faction role: {}", s))),
        }
    }
}
