//! Faction settings value object
//!
//! The engine treats every value here as an opaque constant supplied by the
//! configuration collaborator. Missing keys fall back to the defaults below,
//! so a partial config file or environment is always loadable.

use serde::{Deserialize, Serialize};

use super::names::NameBounds;
use crate::error::DomainError;

/// All configurable faction, claim and power constants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FactionSettings {
    // ============================================================================
    // Factions
    // ============================================================================
    pub min_name_length: usize,
    pub max_name_length: usize,
    /// Upper bound on members per faction (leader included)
    pub max_members: usize,
    /// Seconds an invitation stays valid
    pub invite_ttl_secs: u64,

    // ============================================================================
    // Claims
    // ============================================================================
    /// Power each claimed chunk costs; capacity = floor(power / power_per_claim)
    pub power_per_claim: f64,
    /// Worlds where claiming is allowed. Empty means every world.
    pub allowed_worlds: Vec<String>,
    /// Worlds where claiming is never allowed (checked after `allowed_worlds`)
    pub blocked_worlds: Vec<String>,

    // ============================================================================
    // Power
    // ============================================================================
    pub starting_power: f64,
    pub max_power: f64,
    pub death_penalty: f64,
    pub kill_reward: f64,
    pub neutral_kill_penalty: f64,
    pub regen_per_minute: f64,
    pub regen_interval_secs: u64,
    /// Drop a player's cached power once it has been flushed on logout
    pub evict_power_on_offline: bool,

    // ============================================================================
    // Persistence
    // ============================================================================
    pub autosave_interval_secs: u64,
}

impl Default for FactionSettings {
    fn default() -> Self {
        Self {
            min_name_length: 3,
            max_name_length: 16,
            max_members: 50,
            invite_ttl_secs: 300,
            power_per_claim: 2.0,
            allowed_worlds: Vec::new(),
            blocked_worlds: Vec::new(),
            starting_power: 10.0,
            max_power: 10.0,
            death_penalty: 1.0,
            kill_reward: 0.0,
            neutral_kill_penalty: 0.0,
            regen_per_minute: 0.1,
            regen_interval_secs: 60,
            evict_power_on_offline: true,
            autosave_interval_secs: 300,
        }
    }
}

impl FactionSettings {
    pub fn name_bounds(&self) -> NameBounds {
        NameBounds::new(self.min_name_length, self.max_name_length)
    }

    /// Whether `world` accepts claims under the allow/block lists.
    pub fn is_world_allowed(&self, world: &str) -> bool {
        let allowed = self.allowed_worlds.is_empty()
            || self
                .allowed_worlds
                .iter()
                .any(|w| w.eq_ignore_ascii_case(world));
        allowed
            && !self
                .blocked_worlds
                .iter()
                .any(|w| w.eq_ignore_ascii_case(world))
    }

    /// Reject combinations the engine cannot operate with.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(self.power_per_claim.is_finite() && self.power_per_claim > 0.0) {
            return Err(DomainError::validation(format!(
                "power_per_claim must be positive, got {}",
                self.power_per_claim
            )));
        }
        if self.min_name_length > self.max_name_length {
            return Err(DomainError::validation(format!(
                "min_name_length ({}) exceeds max_name_length ({})",
                self.min_name_length, self.max_name_length
            )));
        }
        if self.max_members == 0 {
            return Err(DomainError::validation("max_members must be at least 1"));
        }
        if !(self.max_power.is_finite() && self.max_power >= 0.0) {
            return Err(DomainError::validation("max_power must be non-negative"));
        }
        if !(0.0..=self.max_power).contains(&self.starting_power) {
            return Err(DomainError::validation(format!(
                "starting_power ({}) must be within 0..={}",
                self.starting_power, self.max_power
            )));
        }
        let non_negative = [
            ("death_penalty", self.death_penalty),
            ("kill_reward", self.kill_reward),
            ("neutral_kill_penalty", self.neutral_kill_penalty),
            ("regen_per_minute", self.regen_per_minute),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(DomainError::validation(format!(
                    "{} must be non-negative, got {}",
                    field, value
                )));
            }
        }
        if self.regen_interval_secs == 0 {
            return Err(DomainError::validation(
                "regen_interval_secs must be at least 1",
            ));
        }
        Ok(())
    }
}
