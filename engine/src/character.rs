use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Water,
    Earth,
    Electric,
    Wind,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Fire,
        Element::Water,
        Element::Earth,
        Element::Electric,
        Element::Wind,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Element::Fire => "Fire",
            Element::Water => "Water",
            Element::Earth => "Earth",
            Element::Electric => "Electric",
            Element::Wind => "Wind",
        }
    }

    /// Art shown for characters without a product image. Electric has none.
    pub fn image_url(self) -> &'static str {
        match self {
            Element::Fire => "/shin.jpg",
            Element::Water => "/suntory.jpg",
            Element::Earth => "pocky.jpg",
            Element::Electric => "",
            Element::Wind => {
                "https://images.unsplash.com/photo-1691684117224-ec6721b57601?crop=entropy&cs=tinysrgb&fit=max&fm=jpg&q=80&w=1080"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Price tiers are exclusive on the lower bound: 200 is rare, 201 is epic.
    pub fn from_price(price: u32) -> Self {
        if price > 300 {
            Rarity::Legendary
        } else if price > 200 {
            Rarity::Epic
        } else if price > 150 {
            Rarity::Rare
        } else {
            Rarity::Common
        }
    }

    pub fn stars(self) -> u8 {
        match self {
            Rarity::Common => 1,
            Rarity::Rare => 2,
            Rarity::Epic => 3,
            Rarity::Legendary => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStats {
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<i32>,
    /// Percent chance in `[0, 100]` that an attack deals nothing.
    pub miss_chance: f64,
    /// Percent chance in `[0, 100]` that a landed attack is critical.
    pub crit_chance: f64,
    /// Percent of max HP restored by one heal action.
    pub heal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationProduct {
    pub product_name: String,
    pub category: String,
}

/// Bonus profile of a character combined from two scanned products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaboration {
    pub products: Vec<CollaborationProduct>,
    pub synergy_score: f64,
    pub grade: String,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jan_code: Option<String>,
    pub name: String,
    pub product_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
    pub rarity: Rarity,
    pub stats: CharacterStats,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_campaign: bool,
    #[serde(default = "unit_multiplier")]
    pub multiplier: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaboration: Option<Collaboration>,
}

fn unit_multiplier() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CharacterError {
    #[error("malformed character record: {0}")]
    Malformed(String),
    #[error("character has an empty id")]
    MissingId,
    #[error("character '{id}': {field} must be positive, got {value}")]
    NonPositive {
        id: String,
        field: &'static str,
        value: i64,
    },
    #[error("character '{id}': {field} must not be negative, got {value}")]
    Negative {
        id: String,
        field: &'static str,
        value: i64,
    },
    #[error("character '{id}': {field} must be within 0..=100, got {value}")]
    OutOfRange {
        id: String,
        field: &'static str,
        value: f64,
    },
}

impl Character {
    /// Parse and validate a record coming from an external character source.
    pub fn from_json(text: &str) -> Result<Self, CharacterError> {
        let character: Character =
            serde_json::from_str(text).map_err(|e| CharacterError::Malformed(e.to_string()))?;
        character.validate()?;
        Ok(character)
    }

    /// Checks every number the battle engine does arithmetic on.
    pub fn validate(&self) -> Result<(), CharacterError> {
        if self.id.trim().is_empty() {
            return Err(CharacterError::MissingId);
        }
        let s = &self.stats;
        for (field, value) in [("hp", s.hp), ("attack", s.attack)] {
            if value <= 0 {
                return Err(CharacterError::NonPositive {
                    id: self.id.clone(),
                    field,
                    value: value.into(),
                });
            }
        }
        if s.defense < 0 {
            return Err(CharacterError::Negative {
                id: self.id.clone(),
                field: "defense",
                value: s.defense.into(),
            });
        }
        for (field, value) in [
            ("missChance", s.miss_chance),
            ("critChance", s.crit_chance),
            ("heal", s.heal),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(CharacterError::OutOfRange {
                    id: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        if let Some(collab) = &self.collaboration {
            if !collab.multiplier.is_finite() {
                return Err(CharacterError::Malformed(format!(
                    "character '{}': collaboration multiplier is not a finite number",
                    self.id
                )));
            }
        }
        Ok(())
    }

    /// Collaboration boost used for effective stats; anything not strictly
    /// positive counts as no boost.
    pub fn effective_multiplier(&self) -> f64 {
        match &self.collaboration {
            Some(c) if c.multiplier.is_finite() && c.multiplier > 0.0 => c.multiplier,
            _ => 1.0,
        }
    }
}
