//! Barcode → character generation.
//!
//! Stats, rarity and element are a pure function of the barcode and the
//! catalog. Only the display name draws from the supplied RNG.

use std::sync::OnceLock;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::character::{Character, CharacterStats, Element, Rarity};
use crate::content::{Catalog, ProductRecord};

pub const STAT_FLOOR: i32 = 50;
pub const CAMPAIGN_MULTIPLIER: f64 = 1.5;

/// Combat rolls given to generated characters; products carry no such data.
pub const DEFAULT_MISS_CHANCE: f64 = 10.0;
pub const DEFAULT_CRIT_CHANCE: f64 = 15.0;
pub const DEFAULT_HEAL_PCT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BaseStats {
    hp: i32,
    attack: i32,
    defense: i32,
    speed: i32,
}

const DEFAULT_TEMPLATE: BaseStats = BaseStats { hp: 100, attack: 80, defense: 80, speed: 80 };

fn template_for(category: &str) -> BaseStats {
    match category {
        "Food" => BaseStats { hp: 120, attack: 85, defense: 70, speed: 75 },
        "Alcohol" => BaseStats { hp: 80, attack: 95, defense: 60, speed: 90 },
        "Snacks" => BaseStats { hp: 90, attack: 75, defense: 85, speed: 80 },
        "Beverage" => BaseStats { hp: 100, attack: 70, defense: 75, speed: 85 },
        "Electronics" => BaseStats { hp: 70, attack: 90, defense: 95, speed: 65 },
        _ => DEFAULT_TEMPLATE,
    }
}

pub fn element_for_category(category: &str) -> Element {
    match category {
        "Alcohol" | "Beverage" => Element::Water,
        "Snacks" => Element::Earth,
        "Food" => Element::Fire,
        "Electronics" => Element::Electric,
        _ => Element::Earth,
    }
}

fn name_prefixes(element: Element) -> &'static [&'static str] {
    match element {
        Element::Fire => &["Inferno", "Blazing", "Scorching", "Volcanic"],
        Element::Water => &["Aquatic", "Frost", "Tidal", "Sparkling"],
        Element::Earth => &["Stone", "Terra", "Crystal", "Boulder"],
        Element::Electric => &["Thunder", "Volt", "Lightning", "Plasma"],
        Element::Wind => &["Gale", "Tempest", "Storm", "Cyclone"],
    }
}

fn name_suffixes(element: Element) -> &'static [&'static str] {
    match element {
        Element::Fire => &["Demon", "Beast", "Dragon", "Fiend"],
        Element::Water => &["Demon", "Leviathan", "Kraken", "Serpent"],
        Element::Earth => &["Golem", "Titan", "Behemoth", "Giant"],
        Element::Electric => &["Demon", "Elemental", "Wyrm", "Spirit"],
        Element::Wind => &["Djinn", "Wraith", "Phantom", "Elemental"],
    }
}

fn builtin_catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(Catalog::builtin)
}

/// Generate against the bundled catalog with a thread-local name RNG.
pub fn generate_character(code: &str) -> Character {
    generate_character_from(code, builtin_catalog())
}

pub fn generate_character_from(code: &str, catalog: &Catalog) -> Character {
    generate_character_with(code, catalog, &mut rand::thread_rng())
}

pub fn generate_character_with<R: Rng + ?Sized>(
    code: &str,
    catalog: &Catalog,
    rng: &mut R,
) -> Character {
    match catalog.get(code) {
        Some(product) => from_product(code, product, rng),
        None => mystery(code),
    }
}

/// Leading digits of the last six characters, as `parseInt` would read them.
pub fn code_seed(code: &str) -> u64 {
    let chars: Vec<char> = code.chars().collect();
    let tail = &chars[chars.len().saturating_sub(6)..];
    tail.iter()
        .map_while(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc * 10 + u64::from(d))
}

/// Sum of the decimal digits in `code`; other characters are ignored.
pub fn code_checksum(code: &str) -> u64 {
    code.chars().filter_map(|c| c.to_digit(10)).map(u64::from).sum()
}

fn from_product<R: Rng + ?Sized>(code: &str, product: &ProductRecord, rng: &mut R) -> Character {
    let element = element_for_category(&product.category);
    let rarity = Rarity::from_price(product.price);
    let base = template_for(&product.category);

    let variance = (code_seed(code) % 20) as i32 - 10;
    let multiplier = if product.is_campaign { CAMPAIGN_MULTIPLIER } else { 1.0 };
    let stat = |v: i32| {
        let floored = (v + variance).max(STAT_FLOOR);
        (f64::from(floored) * multiplier).round() as i32
    };

    let image_url = product
        .image_url
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| element.image_url().to_string());

    Character {
        id: format!("char_{code}"),
        jan_code: Some(code.to_string()),
        name: character_name(&product.name, element, rng),
        product_name: product.name.clone(),
        category: product.category.clone(),
        element: Some(element),
        rarity,
        stats: CharacterStats {
            hp: stat(base.hp),
            attack: stat(base.attack),
            defense: stat(base.defense),
            speed: Some(stat(base.speed)),
            miss_chance: DEFAULT_MISS_CHANCE,
            crit_chance: DEFAULT_CRIT_CHANCE,
            heal: DEFAULT_HEAL_PCT,
        },
        description: format!("Born from {}. {}", product.name, product.description),
        image_url,
        is_campaign: product.is_campaign,
        multiplier,
        collaboration: None,
    }
}

fn mystery(code: &str) -> Character {
    const RARITIES: [Rarity; 3] = [Rarity::Common, Rarity::Rare, Rarity::Epic];

    let sum = code_checksum(code);
    let element = Element::ALL[(sum % Element::ALL.len() as u64) as usize];
    let rarity = RARITIES[(sum % RARITIES.len() as u64) as usize];
    let offset = |base: i32, range: u64| base + (sum % range) as i32;

    Character {
        id: format!("char_{code}"),
        jan_code: Some(code.to_string()),
        name: format!("Mystery {} Warrior", element.label()),
        product_name: "Unknown Product".to_string(),
        category: "Unknown".to_string(),
        element: Some(element),
        rarity,
        stats: CharacterStats {
            hp: offset(80, 30),
            attack: offset(70, 25),
            defense: offset(70, 25),
            speed: Some(offset(75, 20)),
            miss_chance: DEFAULT_MISS_CHANCE,
            crit_chance: DEFAULT_CRIT_CHANCE,
            heal: DEFAULT_HEAL_PCT,
        },
        description: "A mysterious warrior from an unknown product.".to_string(),
        image_url: element.image_url().to_string(),
        is_campaign: false,
        multiplier: 1.0,
        collaboration: None,
    }
}

fn character_name<R: Rng + ?Sized>(product_name: &str, element: Element, rng: &mut R) -> String {
    let prefix = name_prefixes(element).choose(rng).copied().unwrap_or_default();
    let suffix = name_suffixes(element).choose(rng).copied().unwrap_or_default();
    let base = product_name.split(' ').next().unwrap_or_default();
    format!("{prefix} {base} {suffix}")
}
