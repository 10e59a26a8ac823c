//! Foraging: mining's analytic twin with tag-keyed node bonuses.
//!
//! Nature, herbalist and seedHarvesting enchants add flat frequency to
//! nodes carrying the matching tag before the cap is applied, and embers
//! turns part of the yield into a heat byproduct.

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
    enchant::NATURE,
    enchant::HERBALIST,
    enchant::SEED_HARVESTING,
    enchant::EMBERS,
];

/// Node tags the frequency enchants key off.
const TREE_TAG: &str = "tree";
const PLANTS_TAG: &str = "plants";
const SEEDS_TAG: &str = "seeds";

pub struct Foraging<P: PlayerStats> {
    player: P,
    catalog: Arc<Catalog>,
    items: Arc<ItemIndex>,
    enchant_strength: f64,
}

impl<P: PlayerStats> Foraging<P> {
    /// Builds the foraging action over the foraging locations in `raw`.
    pub fn new(player: P, raw: &RawCatalog, items: Arc<ItemIndex>) -> Result<Self, EngineError> {
        let catalog = load_catalog(raw, &items, ActionType::Foraging)?;
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
        let catalog = load_catalog(raw, &self.items, ActionType::Foraging)?;
        log::debug!("replacing foraging catalog: {} locations", catalog.len());
        self.catalog = Arc::new(catalog);
        Ok(())
    }

    pub fn catalog_snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }
}

impl<P: PlayerStats> GatheringAction for Foraging<P> {
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

    fn effective_level(&self) -> f64 {
        self.player.skill_level(ActionType::Foraging)
            + self.player.gear_bonus(ActionType::Foraging)
                * (1.0 + self.player.set_bonus(ActionType::Foraging))
    }

    fn node_weights(&self, location: &Location) -> BTreeMap<String, f64> {
        let mut weights = BTreeMap::new();
        let mut total = 0.0;
        for (name, node) in &location.nodes {
            let mut frequency = node.frequency;
            if node.has_tag(TREE_TAG) {
                frequency += self.get_enchant(enchant::NATURE);
            }
            if node.has_tag(PLANTS_TAG) {
                frequency += self.get_enchant(enchant::HERBALIST);
            }
            if node.has_tag(SEEDS_TAG) {
                frequency += self.get_enchant(enchant::SEED_HARVESTING);
            }
            let frequency = frequency.min(node.max_frequency).max(0.0);
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
