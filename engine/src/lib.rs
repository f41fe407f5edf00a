use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod api;
pub mod battle;
pub mod character;
pub mod collection;
pub mod combat;
pub mod config;
pub mod content;
pub mod generator;
pub mod life;

pub use battle::{
    Action, ActionReport, ActionResult, Arena, BattleLog, BattleSession, PendingTurn, Phase,
    PlayerTurn, Side,
};
pub use character::{Character, CharacterError, CharacterStats, Collaboration, Element, Rarity};
pub use collection::Collection;
pub use config::{BattleConfig, ConfigError};
pub use content::{Catalog, ProductRecord};
pub use generator::{generate_character, generate_character_from, generate_character_with};

/// Seedable random source shared by the generator and the battle engine.
pub struct Dice {
    rng: ChaCha8Rng,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: ChaCha8Rng::from_entropy() }
    }

    /// Uniform draw in `[0, 100)`.
    pub fn percent(&mut self) -> f64 {
        self.rng.gen_range(0.0..100.0)
    }

    /// True when a fresh percent draw lands under `pct`.
    pub fn roll_percent(&mut self, pct: f64) -> bool {
        self.percent() < pct
    }

    /// True with probability `p` (clamped to `[0, 1]`).
    pub fn chance(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}
