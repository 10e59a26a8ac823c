//! Player-derived modifiers read by the action engine.
//!
//! The engine only ever reads these values; they are owned and mutated by
//! the external character/equipment model. [`PlayerStats`] is the
//! capability the engine consumes, and [`CharacterSheet`] is a plain
//! snapshot implementation of it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::ActionType;

/// Read-only view of a character's stats as the engine needs them.
pub trait PlayerStats {
    /// Base skill level for the given action.
    fn skill_level(&self, action: ActionType) -> f64;

    /// Flat gear bonus for the given action.
    fn gear_bonus(&self, action: ActionType) -> f64;

    /// Set-bonus multiplier for the given action (0.0 = no set bonus).
    fn set_bonus(&self, action: ActionType) -> f64;

    /// Enchantment level by name; 0 when the enchant is absent.
    fn enchant_level(&self, name: &str) -> i32;

    /// Fishing tackle and bait numbers.
    fn tackle(&self) -> TackleStats;
}

/// Fishing gear bases and bait contributions. Gear values come from the
/// equipped rod/tackle, the `bait_*` values from the consumable bait.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TackleStats {
    pub bait_power: f64,
    pub bonus_rarity: f64,
    pub reel_power: f64,
    pub bait_fishing_bonus: f64,
    pub bait_bait_power: f64,
    pub bait_bonus_rarity: f64,
    pub bait_reel_power: f64,
}

/// Level and gear numbers for a single gathering skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillLoadout {
    pub level: f64,
    pub gear_bonus: f64,
    pub set_bonus: f64,
}

/// A plain snapshot of everything the engine reads from a character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub mining: SkillLoadout,
    pub foraging: SkillLoadout,
    pub fishing: SkillLoadout,
    pub tackle: TackleStats,
    pub enchantments: HashMap<String, i32>,
}

impl CharacterSheet {
    pub fn loadout(&self, action: ActionType) -> &SkillLoadout {
        match action {
            ActionType::Mining => &self.mining,
            ActionType::Foraging => &self.foraging,
            ActionType::Fishing => &self.fishing,
        }
    }

    pub fn with_enchant(mut self, name: &str, level: i32) -> Self {
        self.enchantments.insert(name.to_string(), level);
        self
    }
}

impl PlayerStats for CharacterSheet {
    fn skill_level(&self, action: ActionType) -> f64 {
        self.loadout(action).level
    }

    fn gear_bonus(&self, action: ActionType) -> f64 {
        self.loadout(action).gear_bonus
    }

    fn set_bonus(&self, action: ActionType) -> f64 {
        self.loadout(action).set_bonus
    }

    fn enchant_level(&self, name: &str) -> i32 {
        self.enchantments.get(name).copied().unwrap_or(0)
    }

    fn tackle(&self) -> TackleStats {
        self.tackle
    }
}
