//! Team classification for team-play sessions
//!
//! Servers report how many rounds a player spent on each side. When both
//! counters are zero the side is inferred from which side's standard-issue
//! weapons the player fired more. Equal weapon usage resolves to a
//! configured side.

use super::types::StatCounters;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Axis,
    Allies,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Axis => "Axis",
            Side::Allies => "Allies",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "axis" => Ok(Side::Axis),
            "allies" => Ok(Side::Allies),
            other => Err(format!("unknown side: {}", other)),
        }
    }
}

/// How a player's side was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// Explicit side counters
    Reported,
    /// Weapon usage majority
    Weapons,
    /// Weapon usage tied, configured side used
    Tie,
}

/// Side assignment policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamClassifier {
    pub tie_side: Side,
}

impl Default for TeamClassifier {
    fn default() -> Self {
        Self { tie_side: Side::Allies }
    }
}

impl TeamClassifier {
    pub fn new(tie_side: Side) -> Self {
        Self { tie_side }
    }

    pub fn classify(&self, stats: &StatCounters) -> Side {
        self.classify_with_basis(stats).0
    }

    /// Reported counters win when they disagree; the weapon vote only
    /// decides when they are equal (normally both zero).
    pub fn classify_with_basis(&self, stats: &StatCounters) -> (Side, Basis) {
        if stats.axis > stats.allies {
            return (Side::Axis, Basis::Reported);
        }
        if stats.allies > stats.axis {
            return (Side::Allies, Basis::Reported);
        }

        let axis_shots = stats.weapons.axis_total();
        let allies_shots = stats.weapons.allies_total();
        if axis_shots > allies_shots {
            (Side::Axis, Basis::Weapons)
        } else if allies_shots > axis_shots {
            (Side::Allies, Basis::Weapons)
        } else {
            log::warn!(
                "⚠️  No side reported and weapon usage tied ({} shots each), assigning {}",
                axis_shots,
                self.tie_side
            );
            (self.tie_side, Basis::Tie)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::WeaponShots;

    fn stats(axis: i64, allies: i64, weapons: WeaponShots) -> StatCounters {
        StatCounters { axis, allies, weapons, ..Default::default() }
    }

    #[test]
    fn test_reported_side_wins() {
        let classifier = TeamClassifier::default();
        let heavy_allied_weapons = WeaponShots { thompson: 500, ..Default::default() };

        assert_eq!(
            classifier.classify_with_basis(&stats(2, 0, heavy_allied_weapons)),
            (Side::Axis, Basis::Reported)
        );
        assert_eq!(classifier.classify(&stats(0, 1, WeaponShots::default())), Side::Allies);
        assert_eq!(classifier.classify(&stats(1, 3, WeaponShots::default())), Side::Allies);
    }

    #[test]
    fn test_weapon_vote_when_sides_missing() {
        let classifier = TeamClassifier::default();
        let axis_weapons = WeaponShots { mp40: 30, kar: 5, colt: 10, ..Default::default() };
        let allied_weapons = WeaponShots { garand: 12, bazooka: 2, luger: 3, ..Default::default() };

        assert_eq!(
            classifier.classify_with_basis(&stats(0, 0, axis_weapons)),
            (Side::Axis, Basis::Weapons)
        );
        assert_eq!(classifier.classify(&stats(0, 0, allied_weapons)), Side::Allies);
    }

    #[test]
    fn test_tie_uses_configured_side() {
        let even = WeaponShots { panzer: 4, bar: 4, ..Default::default() };

        assert_eq!(
            TeamClassifier::default().classify_with_basis(&stats(0, 0, even)),
            (Side::Allies, Basis::Tie)
        );
        assert_eq!(TeamClassifier::new(Side::Axis).classify(&stats(0, 0, even)), Side::Axis);
        assert_eq!(
            TeamClassifier::new(Side::Axis).classify(&stats(0, 0, WeaponShots::default())),
            Side::Axis
        );
    }

    #[test]
    fn test_side_parses_case_insensitively() {
        assert_eq!("ALLIES".parse::<Side>(), Ok(Side::Allies));
        assert_eq!("axis".parse::<Side>(), Ok(Side::Axis));
        assert!("red".parse::<Side>().is_err());
    }
}
