#![allow(dead_code)]

use engine::{BattleConfig, Character, CharacterStats, Collaboration, Rarity};

pub fn fighter(id: &str, hp: i32, attack: i32, defense: i32, miss: f64, crit: f64, heal: f64) -> Character {
    Character {
        id: id.to_string(),
        jan_code: None,
        name: id.to_string(),
        product_name: "Test Product".to_string(),
        category: "Test".to_string(),
        element: None,
        rarity: Rarity::Common,
        stats: CharacterStats {
            hp,
            attack,
            defense,
            speed: None,
            miss_chance: miss,
            crit_chance: crit,
            heal,
        },
        description: String::new(),
        image_url: String::new(),
        is_campaign: false,
        multiplier: 1.0,
        collaboration: None,
    }
}

pub fn with_collaboration(mut c: Character, multiplier: f64) -> Character {
    c.collaboration = Some(Collaboration {
        products: vec![],
        synergy_score: 80.0,
        grade: "A".to_string(),
        multiplier,
    });
    c
}

/// Opponent never heals, so every opponent turn is an attack.
pub fn attack_only() -> BattleConfig {
    BattleConfig {
        heal_chance_low: 0.0,
        heal_chance_normal: 0.0,
        ..BattleConfig::default()
    }
}
