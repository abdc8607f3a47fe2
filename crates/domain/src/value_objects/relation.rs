//! Diplomatic relation between two factions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Directed relation from one faction's point of view.
///
/// `Neutral` is the default and is never stored in a faction's relation map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    #[default]
    Neutral,
    Ally,
    Enemy,
}

impl RelationType {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::Neutral => "neutral",
            RelationType::Ally => "ally",
            RelationType::Enemy => "enemy",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neutral" => Ok(Self::Neutral),
            "ally" | "allies" => Ok(Self::Ally),
            "enemy" | "enemies" => Ok(Self::Enemy),
            _ => Err(DomainError::parse(format!("Unknown relation: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_neutral() {
        assert_eq!(RelationType::default(), RelationType::Neutral);
    }

    #[test]
    fn round_trips_through_str() {
        for relation in [RelationType::Neutral, RelationType::Ally, RelationType::Enemy] {
            assert_eq!(relation.as_str().parse::<RelationType>().unwrap(), relation);
        }
        assert!("friend".parse::<RelationType>().is_err());
    }
}
