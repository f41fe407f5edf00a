use serde::{Deserialize, Serialize};

use crate::character::Character;

/// Session-scoped set of collected characters, in collection order.
/// Identity is the character id only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    characters: Vec<Character>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and keeps the existing entry) when the id is already held.
    pub fn add(&mut self, character: Character) -> bool {
        if self.contains(&character.id) {
            return false;
        }
        self.characters.push(character);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.characters.iter().any(|c| c.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Character> {
        let idx = self.characters.iter().position(|c| c.id == id)?;
        Some(self.characters.remove(idx))
    }

    /// Everything a battle against `player_id` could be fought with.
    pub fn opponents_for<'a>(&'a self, player_id: &'a str) -> impl Iterator<Item = &'a Character> + 'a {
        self.characters.iter().filter(move |c| c.id != player_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
