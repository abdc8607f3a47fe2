//! Per-player power - the regenerating resource behind claim capacity
//!
//! # Invariants
//!
//! - `0.0 <= power <= max_power` after every constructor and mutator
//! - `max_power >= 0.0`
//!
//! Non-finite inputs are treated as the nearest bound (NaN collapses to 0).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// A player's power snapshot. Mutators return a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerPower {
    player_id: PlayerId,
    power: f64,
    max_power: f64,
    last_death: Option<DateTime<Utc>>,
    last_regen: DateTime<Utc>,
}

impl PlayerPower {
    pub fn new(player_id: PlayerId, power: f64, max_power: f64, now: DateTime<Utc>) -> Self {
        let max_power = sanitize_max(max_power);
        Self {
            player_id,
            power: clamp_power(power, max_power),
            max_power,
            last_death: None,
            last_regen: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    #[inline]
    pub fn power(&self) -> f64 {
        self.power
    }

    #[inline]
    pub fn max_power(&self) -> f64 {
        self.max_power
    }

    #[inline]
    pub fn last_death(&self) -> Option<DateTime<Utc>> {
        self.last_death
    }

    #[inline]
    pub fn last_regen(&self) -> DateTime<Utc> {
        self.last_regen
    }

    pub fn is_full(&self) -> bool {
        self.power >= self.max_power
    }

    // =========================================================================
    // Mutators (all re-clamp)
    // =========================================================================

    pub fn with_power(mut self, power: f64) -> Self {
        self.power = clamp_power(power, self.max_power);
        self
    }

    /// Changes the ceiling and re-clamps current power under it.
    pub fn with_max_power(mut self, max_power: f64) -> Self {
        self.max_power = sanitize_max(max_power);
        self.power = clamp_power(self.power, self.max_power);
        self
    }

    /// Power lost on death; stamps `last_death`.
    pub fn after_death(mut self, penalty: f64, now: DateTime<Utc>) -> Self {
        self.power = clamp_power(self.power - penalty.max(0.0), self.max_power);
        self.last_death = Some(now);
        self
    }

    pub fn gained(self, amount: f64) -> Self {
        let power = self.power + amount.max(0.0);
        self.with_power(power)
    }

    pub fn lost(self, amount: f64) -> Self {
        let power = self.power - amount.max(0.0);
        self.with_power(power)
    }

    /// Regeneration tick; stamps `last_regen` even when already full.
    pub fn regenerated(mut self, amount: f64, now: DateTime<Utc>) -> Self {
        self.power = clamp_power(self.power + amount.max(0.0), self.max_power);
        self.last_regen = now;
        self
    }

    /// Restores timestamps when loading from storage.
    pub fn with_timestamps(
        mut self,
        last_death: Option<DateTime<Utc>>,
        last_regen: DateTime<Utc>,
    ) -> Self {
        self.last_death = last_death;
        self.last_regen = last_regen;
        self
    }
}

fn sanitize_max(max_power: f64) -> f64 {
    if max_power.is_nan() {
        0.0
    } else {
        max_power.max(0.0)
    }
}

fn clamp_power(power: f64, max_power: f64) -> f64 {
    if power.is_nan() {
        0.0
    } else {
        power.clamp(0.0, max_power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn power(value: f64) -> PlayerPower {
        PlayerPower::new(PlayerId::new(), value, 10.0, now())
    }

    fn assert_bounded(p: &PlayerPower) {
        assert!(p.power() >= 0.0, "power below zero: {}", p.power());
        assert!(p.power() <= p.max_power(), "power above max: {}", p.power());
    }

    #[test]
    fn constructor_clamps_into_range() {
        assert_eq!(power(15.0).power(), 10.0);
        assert_eq!(power(-3.0).power(), 0.0);
        assert_eq!(power(f64::NAN).power(), 0.0);
        assert_eq!(power(f64::INFINITY).power(), 10.0);
    }

    #[test]
    fn death_penalty_floors_at_zero_and_stamps_time() {
        let p = power(0.5).after_death(1.0, now());
        assert_eq!(p.power(), 0.0);
        assert_eq!(p.last_death(), Some(now()));
    }

    #[test]
    fn negative_amounts_never_invert_direction() {
        let p = power(5.0);
        assert_eq!(p.gained(-3.0).power(), 5.0);
        assert_eq!(p.lost(-3.0).power(), 5.0);
        assert_eq!(p.after_death(-3.0, now()).power(), 5.0);
    }

    #[test]
    fn regeneration_caps_at_max() {
        let later = now() + chrono::Duration::minutes(1);
        let p = power(9.95).regenerated(0.1, later);
        assert_eq!(p.power(), 10.0);
        assert!(p.is_full());
        assert_eq!(p.last_regen(), later);
    }

    #[test]
    fn lowering_max_reclamps() {
        let p = power(8.0).with_max_power(5.0);
        assert_eq!(p.power(), 5.0);
        assert_eq!(p.with_max_power(-1.0).max_power(), 0.0);
    }

    #[test]
    fn bounds_hold_across_mixed_sequences() {
        let mut p = power(10.0);
        let steps: [(u8, f64); 8] = [
            (0, 4.0),
            (1, 7.5),
            (2, 0.3),
            (0, 11.0),
            (1, 100.0),
            (3, 2.0),
            (0, 0.1),
            (2, 50.0),
        ];
        for (op, amount) in steps {
            p = match op {
                0 => p.after_death(amount, now()),
                1 => p.gained(amount),
                2 => p.regenerated(amount, now()),
                _ => p.lost(amount),
            };
            assert_bounded(&p);
        }
    }
}
