pub mod actions;

pub use actions::{choose_opponent_action, compute_damage, mitigation_factor, AttackOutcome};

use serde::{Deserialize, Serialize};

use crate::character::Character;

/// A side's stats for one battle: hp/attack/defense scaled by the
/// collaboration multiplier, rounded, and fixed from then on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveStats {
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub miss_chance: f64,
    pub crit_chance: f64,
    pub heal: f64,
}

impl EffectiveStats {
    pub fn of(c: &Character) -> Self {
        let m = c.effective_multiplier();
        let scale = |v: i32| ((f64::from(v) * m).round() as i32).max(0);
        Self {
            hp: scale(c.stats.hp),
            attack: scale(c.stats.attack),
            defense: scale(c.stats.defense),
            miss_chance: c.stats.miss_chance,
            crit_chance: c.stats.crit_chance,
            heal: c.stats.heal,
        }
    }
}
