//! Mining: the simplest analytic gathering action.
//!
//! Node selection follows raw node frequencies, one attempt consumes the
//! node's average yield, and the action rate is the shared level/haste
//! formula. Mining is also the only action with a superheating route,
//! transmuting ores into bars at a heat and fuel cost.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::actions::balance::{
    enchant, DEFAULT_ENCHANT_STRENGTH, HASTE_SPEED_PER_LEVEL, MS_PER_HOUR, RATE_LEVEL_OFFSET,
    RATE_LEVEL_SCALE,
};
use crate::actions::contract::GatheringAction;
use crate::catalog::{load_catalog, ActionType, Catalog, ItemIndex, Location, RawCatalog};
use crate::character::PlayerStats;
use crate::error::EngineError;

const VALID_ENCHANTS: &[&str] = &[
    enchant::GATHERING,
    enchant::EMPOWERED_GATHERING,
    enchant::HASTE,
    enchant::SUPERHEATING,
    enchant::EMPOWERED_SUPERHEATING,
];

/// Superheating routes: ore id to bar id.
const TRANSMUTE_TABLE: &[(u32, u32)] = &[
    (101, 201), // Copper
    (102, 201), // Tin
    (103, 202), // Iron
    (104, 203), // Gold
    (105, 204), // Mithril
    (106, 205), // Adamantite
    (107, 206), // Runite
    (110, 3001), // Sand
    (114, 207), // Stygian
    (115, 208), // Void
];

pub struct Mining<P: PlayerStats> {
    player: P,
    catalog: Arc<Catalog>,
    items: Arc<ItemIndex>,
    enchant_strength: f64,
}

impl<P: PlayerStats> Mining<P> {
    /// Builds the mining action over the mining locations in `raw`.
    pub fn new(player: P, raw: &RawCatalog, items: Arc<ItemIndex>) -> Result<Self, EngineError> {
        let catalog = load_catalog(raw, &items, ActionType::Mining)?;
        Ok(Self::from_catalog(player, catalog, items))
    }

    pub fn from_catalog(player: P, catalog: Catalog, items: Arc<ItemIndex>) -> Self {
        Self {
            player,
            catalog: Arc::new(catalog),
            items,
            enchant_strength: DEFAULT_ENCHANT_STRENGTH,
        }
    }

    pub fn with_enchant_strength(mut self, strength: f64) -> Self {
        self.enchant_strength = strength;
        self
    }

    /// Replaces the catalog from fresh raw data. Readers holding a
    /// previous snapshot keep a consistent view.
    pub fn set_location_data(&mut self, raw: &RawCatalog) -> Result<(), EngineError> {
        let catalog = load_catalog(raw, &self.items, ActionType::Mining)?;
        log::debug!("replacing mining catalog: {} locations", catalog.len());
        self.catalog = Arc::new(catalog);
        Ok(())
    }

    pub fn catalog_snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }
}

impl<P: PlayerStats> GatheringAction for Mining<P> {
    fn player(&self) -> &dyn PlayerStats {
        &self.player
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn items(&self) -> &ItemIndex {
        &self.items
    }

    fn valid_enchants(&self) -> &'static [&'static str] {
        VALID_ENCHANTS
    }

    fn enchant_strength(&self) -> f64 {
        self.enchant_strength
    }

    fn transmute_table(&self) -> &'static [(u32, u32)] {
        TRANSMUTE_TABLE
    }

    fn effective_level(&self) -> f64 {
        self.player.skill_level(ActionType::Mining)
            + self.player.gear_bonus(ActionType::Mining)
                * (1.0 + self.player.set_bonus(ActionType::Mining))
    }

    fn node_weights(&self, location: &Location) -> BTreeMap<String, f64> {
        let mut weights = BTreeMap::new();
        let mut total = 0.0;
        for (name, node) in &location.nodes {
            let frequency = node.frequency.min(node.max_frequency).max(0.0);
            total += frequency;
            weights.insert(name.clone(), frequency);
        }
        if total <= 0.0 {
            return BTreeMap::new();
        }
        for weight in weights.values_mut() {
            *weight /= total;
        }
        weights
    }

    fn node_sizes(&self, location: &Location) -> BTreeMap<String, f64> {
        location
            .nodes
            .iter()
            .map(|(name, node)| {
                (
                    name.clone(),
                    (node.min_base_amount + node.max_base_amount) / 2.0,
                )
            })
            .collect()
    }

    fn node_attempts(&self, location: &Location) -> BTreeMap<String, f64> {
        // One attempt consumes the whole average yield.
        self.node_sizes(location)
    }

    fn zone_action_rate(&self, location_name: &str) -> Result<f64, EngineError> {
        let location = self.location(location_name)?;
        if (location.level as f64) > self.effective_level() {
            return Ok(0.0);
        }
        if location.base_duration_ms <= 0.0 {
            return Ok(0.0);
        }
        let haste = self.get_enchant(enchant::HASTE);
        let rate_modifier = (self.effective_level() + RATE_LEVEL_OFFSET) / RATE_LEVEL_SCALE
            * (1.0 + haste * HASTE_SPEED_PER_LEVEL);
        Ok(rate_modifier * MS_PER_HOUR / location.base_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::catalog::{Loot, Node};
    use crate::character::{CharacterSheet, SkillLoadout};

    fn node(id: &str, frequency: f64, max_frequency: f64, min: f64, max: f64) -> Node {
        let mut loot = BTreeMap::new();
        loot.insert(
            101,
            Loot {
                id: 101,
                frequency: 100.0,
                max_frequency: 100.0,
                min_amount: 1.0,
                max_amount: 1.0,
                item_class: "ore".to_string(),
            },
        );
        Node {
            node_id: id.to_string(),
            frequency,
            max_frequency,
            min_base_amount: min,
            max_base_amount: max,
            tags: BTreeSet::new(),
            loot,
        }
    }

    fn location(level: u32, nodes: Vec<Node>) -> Location {
        Location {
            name: "Clay Pit".to_string(),
            loc_id: 10,
            action: ActionType::Mining,
            base_duration_ms: 5000.0,
            level,
            experience: 30.0,
            nodes: nodes
                .into_iter()
                .map(|node| (node.node_id.clone(), node))
                .collect(),
        }
    }

    fn miner(level: f64, location: Location) -> Mining<CharacterSheet> {
        let sheet = CharacterSheet {
            mining: SkillLoadout {
                level,
                ..Default::default()
            },
            ..Default::default()
        };
        Mining::from_catalog(
            sheet,
            Catalog::from_locations(vec![location]),
            Arc::new(ItemIndex::new()),
        )
    }

    #[test]
    fn test_node_weights_normalize() {
        let loc = location(
            1,
            vec![
                node("a", 60.0, 80.0, 1.0, 3.0),
                node("b", 20.0, 80.0, 1.0, 3.0),
                node("c", 20.0, 80.0, 1.0, 3.0),
            ],
        );
        let mining = miner(20.0, loc.clone());
        let weights = mining.node_weights(&loc);

        let total: f64 = weights.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(weights.values().all(|w| *w >= 0.0));
        assert!((weights["a"] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_node_weights_clamp_to_cap() {
        let loc = location(
            1,
            vec![node("a", 90.0, 50.0, 1.0, 3.0), node("b", 50.0, 50.0, 1.0, 3.0)],
        );
        let mining = miner(20.0, loc.clone());
        let weights = mining.node_weights(&loc);
        // 90 caps down to 50, so the two nodes split evenly.
        assert!((weights["a"] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_total_frequency_is_empty_distribution() {
        let loc = location(1, vec![node("a", 0.0, 10.0, 1.0, 3.0)]);
        let mining = miner(20.0, loc.clone());
        assert!(mining.node_weights(&loc).is_empty());
    }

    #[test]
    fn test_sizes_and_attempts_are_the_midpoint() {
        let loc = location(1, vec![node("a", 60.0, 80.0, 2.0, 6.0)]);
        let mining = miner(20.0, loc.clone());
        assert!((mining.node_sizes(&loc)["a"] - 4.0).abs() < 1e-12);
        assert!((mining.node_attempts(&loc)["a"] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_action_rate_formula() {
        let mining = miner(20.0, location(1, vec![node("a", 60.0, 80.0, 1.0, 3.0)]));
        // (20 + 99) / 100 * 3_600_000 / 5000
        let rate = mining.zone_action_rate("Clay Pit").unwrap();
        assert!((rate - 856.8).abs() < 1e-9);
    }

    #[test]
    fn test_gear_and_set_bonus_raise_effective_level() {
        let sheet = CharacterSheet {
            mining: SkillLoadout {
                level: 20.0,
                gear_bonus: 10.0,
                set_bonus: 0.5,
            },
            ..Default::default()
        };
        let mining = Mining::from_catalog(
            sheet,
            Catalog::from_locations(vec![location(1, vec![node("a", 60.0, 80.0, 1.0, 3.0)])]),
            Arc::new(ItemIndex::new()),
        );
        assert!((mining.effective_level() - 35.0).abs() < 1e-12);
    }

    #[test]
    fn test_inaccessible_location_rates_are_zero() {
        let mining = miner(20.0, location(50, vec![node("a", 60.0, 80.0, 1.0, 3.0)]));
        assert_eq!(mining.zone_action_rate("Clay Pit").unwrap(), 0.0);
        assert_eq!(mining.zone_experience_rate("Clay Pit").unwrap(), 0.0);
    }

    #[test]
    fn test_haste_strictly_raises_the_rate() {
        let loc = location(1, vec![node("a", 60.0, 80.0, 1.0, 3.0)]);
        let slow = miner(20.0, loc.clone());
        let sheet = CharacterSheet {
            mining: SkillLoadout {
                level: 20.0,
                ..Default::default()
            },
            ..Default::default()
        }
        .with_enchant(enchant::HASTE, 5);
        let fast = Mining::from_catalog(
            sheet,
            Catalog::from_locations(vec![loc]),
            Arc::new(ItemIndex::new()),
        );

        let base = slow.zone_action_rate("Clay Pit").unwrap();
        let hasted = fast.zone_action_rate("Clay Pit").unwrap();
        assert!(hasted > base);
        assert!((hasted - base * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_set_location_data_swaps_the_snapshot() {
        let mut mining = miner(20.0, location(1, vec![node("a", 60.0, 80.0, 1.0, 3.0)]));
        let before = mining.catalog_snapshot();

        let raw: RawCatalog = serde_json::from_value(serde_json::json!({
            "11": {
                "name": "Old Quarry",
                "actionType": "Action-Mining",
                "baseDuration": 8000,
                "accessRequirements": {"requiredSkills": [{"level": 1}]},
                "xpPerCompletion": [{"amount": 50}],
                "nodes": [{"nodeID": "granite", "frequency": 10, "loot": [{"id": 101}]}]
            }
        }))
        .unwrap();
        mining.set_location_data(&raw).unwrap();

        // The old snapshot is untouched; the live catalog is the new one.
        assert_eq!(before.names().collect::<Vec<_>>(), vec!["Clay Pit"]);
        assert_eq!(mining.list_of_actions(), vec!["Old Quarry".to_string()]);
    }
}
