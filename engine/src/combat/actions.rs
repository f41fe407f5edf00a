use serde::{Deserialize, Serialize};

use super::EffectiveStats;
use crate::battle::Action;
use crate::config::BattleConfig;
use crate::life::Health;
use crate::Dice;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub damage: i32,
    pub missed: bool,
    pub crit: bool,
}

/// Multiplicative damage reduction; 1.0 at zero defense, falling toward 0.
pub fn mitigation_factor(defense: i32, cfg: &BattleConfig) -> f64 {
    100.0 / (100.0 + f64::from(defense.max(0)) * cfg.defense_scale)
}

/// Resolve one attack. Miss is rolled first; a miss never rolls crit.
pub fn compute_damage(
    dice: &mut Dice,
    attacker: &EffectiveStats,
    defender: &EffectiveStats,
    cfg: &BattleConfig,
) -> AttackOutcome {
    if dice.roll_percent(attacker.miss_chance) {
        return AttackOutcome { damage: 0, missed: true, crit: false };
    }

    let crit = dice.roll_percent(attacker.crit_chance);
    let crit_mult = if crit { cfg.crit_multiplier } else { 1.0 };
    let raw = f64::from(attacker.attack) * crit_mult;
    let mitigated = (raw * mitigation_factor(defender.defense, cfg)).round() as i32;

    AttackOutcome {
        damage: mitigated.max(cfg.damage_floor).max(1),
        missed: false,
        crit,
    }
}

/// Memoryless opponent heuristic: below the low-health line it heals more often.
pub fn choose_opponent_action(dice: &mut Dice, health: &Health, cfg: &BattleConfig) -> Action {
    let p = if health.percent() < cfg.low_health_pct {
        cfg.heal_chance_low
    } else {
        cfg.heal_chance_normal
    };
    if dice.chance(p) { Action::Heal } else { Action::Attack }
}
