use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub hp: i32,
    pub max_hp: i32,
}

impl Health {
    pub fn new(max_hp: i32) -> Self {
        let max_hp = max_hp.max(0);
        Self { hp: max_hp, max_hp }
    }

    pub fn is_down(&self) -> bool {
        self.hp <= 0
    }

    /// Current HP as a percentage of max.
    pub fn percent(&self) -> f64 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        f64::from(self.hp) / f64::from(self.max_hp) * 100.0
    }
}

/// Subtract damage, clamping at 0. Returns true if this hit dropped the creature to 0.
pub fn apply_damage(name: &str, health: &mut Health, dmg: i32) -> bool {
    let before = health.hp;
    health.hp = (health.hp - dmg.max(0)).clamp(0, health.max_hp);
    tracing::debug!(target: "engine::life", %name, before, after = health.hp, dmg, "damage applied");
    before > 0 && health.hp == 0
}

/// HP a heal action restores before the max-HP cap: `max(1, round(max * pct / 100))`.
pub fn heal_amount(max_hp: i32, heal_pct: f64) -> i32 {
    let amount = (f64::from(max_hp) * heal_pct / 100.0).round() as i32;
    amount.max(1)
}

/// Heal without exceeding max HP. Returns the HP actually restored.
pub fn heal(name: &str, health: &mut Health, amount: i32) -> i32 {
    if amount <= 0 {
        return 0;
    }
    let before = health.hp;
    let actual = amount.min(health.max_hp - before).max(0);
    health.hp = (before + actual).min(health.max_hp);
    tracing::debug!(target: "engine::life", %name, before, after = health.hp, actual, "healed");
    actual
}
