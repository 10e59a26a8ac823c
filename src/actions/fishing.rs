//! Fishing: the simulation-backed gathering action.
//!
//! Four derived tackle aggregates feed every formula: effective level,
//! bait power, bonus rarity and reel power. Node and loot frequencies
//! scale with effective level, fishingMagnetism pulls rare nodes toward
//! the mean, and node sizes and depletion costs come from the Monte-Carlo
//! estimators because the catch process has no closed form.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::actions::balance::{enchant, DEFAULT_ENCHANT_STRENGTH, HASTE_SPEED_PER_LEVEL};
use crate::actions::contract::GatheringAction;
use crate::catalog::{load_catalog, ActionType, Catalog, ItemIndex, Location, Loot, RawCatalog};
use crate::character::PlayerStats;
use crate::error::EngineError;
use crate::sampling::{self, NodeDrawParams};

const VALID_ENCHANTS: &[&str] = &[
    enchant::GATHERING,
    enchant::EMPOWERED_GATHERING,
    enchant::HASTE,
    enchant::PUNGENT_BAIT,
    enchant::DEADLIEST_CATCH,
    enchant::FISHING_MAGNETISM,
    enchant::REINFORCED_LINE,
    enchant::FIBER_FINDER,
    enchant::FISHING,
];

// Tackle aggregate tuning.
const DEADLIEST_CATCH_BAIT_PER_LEVEL: f64 = 0.05;
const PUNGENT_BAIT_POWER_PER_LEVEL: f64 = 3.0;
const REINFORCED_LINE_REEL_PER_LEVEL: f64 = 3.0;
const MAGNETISM_GEAR_PENALTY_PER_LEVEL: f64 = 2.0;
const MAGNETISM_RARITY_PER_LEVEL: f64 = 2.0;

// Frequency and catch-chance scaling.
const LEVEL_FREQUENCY_SCALE: f64 = 360.0;
const MAGNETISM_PULL_PER_LEVEL: f64 = 2.0 / 50.0;
const FIBER_BOOST_PER_LEVEL: f64 = 0.25;
const BASE_CATCH_CHANCE: f64 = 0.4;
const CHANCE_LEVEL_SCALE: f64 = 275.0;
const ZONE_LEVEL_FACTOR: f64 = 1.25;
const BAIT_CHANCE_SCALE: f64 = 200.0;
const FISHING_CHANCE_PER_ENCHANT: f64 = 0.025;

// Node-find model: success is guaranteed by the 7th attempt.
const MAX_NODE_FIND_ATTEMPTS: u32 = 7;
const NODE_FIND_RAMP: f64 = 6.0;

// Throughput timing.
const NODE_SEARCH_FACTOR: f64 = 1.75;
const BAIT_TIME_SCALE: f64 = 400.0;
const LOOT_SEARCH_DIVISOR: f64 = 1.25;
const REEL_TIME_SCALE: f64 = 200.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Default Monte-Carlo trial count per node estimate.
pub const DEFAULT_TRIALS: u32 = 10_000;

pub struct Fishing<P: PlayerStats> {
    player: P,
    catalog: Arc<Catalog>,
    items: Arc<ItemIndex>,
    enchant_strength: f64,
    /// Monte-Carlo trials per node estimate; precision/cost knob.
    accuracy: u32,
    seed: Option<u64>,
}

impl<P: PlayerStats> Fishing<P> {
    /// Builds the fishing action over the fishing locations in `raw`.
    pub fn new(player: P, raw: &RawCatalog, items: Arc<ItemIndex>) -> Result<Self, EngineError> {
        let catalog = load_catalog(raw, &items, ActionType::Fishing)?;
        Ok(Self::from_catalog(player, catalog, items))
    }

    pub fn from_catalog(player: P, catalog: Catalog, items: Arc<ItemIndex>) -> Self {
        Self {
            player,
            catalog: Arc::new(catalog),
            items,
            enchant_strength: DEFAULT_ENCHANT_STRENGTH,
            accuracy: DEFAULT_TRIALS,
            seed: None,
        }
    }

    /// Sets the Monte-Carlo trial count. Values below 1 are clamped up so
    /// the estimators always have at least one draw.
    pub fn with_accuracy(mut self, trials: u32) -> Self {
        self.accuracy = trials.max(1);
        self
    }

    /// Fixes the estimator seed, making every rate computation
    /// reproducible. Unseeded instances draw from entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_enchant_strength(mut self, strength: f64) -> Self {
        self.enchant_strength = strength;
        self
    }

    /// Replaces the catalog from fresh raw data. Readers holding a
    /// previous snapshot keep a consistent view.
    pub fn set_location_data(&mut self, raw: &RawCatalog) -> Result<(), EngineError> {
        let catalog = load_catalog(raw, &self.items, ActionType::Fishing)?;
        log::debug!("replacing fishing catalog: {} locations", catalog.len());
        self.catalog = Arc::new(catalog);
        Ok(())
    }

    pub fn catalog_snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    fn sampler_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn set_multiplier(&self) -> f64 {
        1.0 + self.player.set_bonus(ActionType::Fishing)
    }

    fn bait_scale(&self) -> f64 {
        1.0 + self.get_enchant(enchant::DEADLIEST_CATCH) * DEADLIEST_CATCH_BAIT_PER_LEVEL
    }

    /// Bait attraction: pungentBait feeds it, fishingMagnetism trades it
    /// away for rarity.
    pub fn bait_power(&self) -> f64 {
        let tackle = self.player.tackle();
        let gear_enchant = self.get_enchant(enchant::PUNGENT_BAIT) * PUNGENT_BAIT_POWER_PER_LEVEL
            - self.get_enchant(enchant::FISHING_MAGNETISM) * MAGNETISM_GEAR_PENALTY_PER_LEVEL;
        (tackle.bait_power + gear_enchant) * self.set_multiplier()
            + tackle.bait_bait_power * self.bait_scale()
    }

    pub fn bonus_rarity(&self) -> f64 {
        let tackle = self.player.tackle();
        let gear_enchant =
            self.get_enchant(enchant::FISHING_MAGNETISM) * MAGNETISM_RARITY_PER_LEVEL;
        (tackle.bonus_rarity + gear_enchant) * self.set_multiplier()
            + tackle.bait_bonus_rarity * self.bait_scale()
    }

    pub fn reel_power(&self) -> f64 {
        let tackle = self.player.tackle();
        let gear_enchant = self.get_enchant(enchant::REINFORCED_LINE) * REINFORCED_LINE_REEL_PER_LEVEL
            - self.get_enchant(enchant::FISHING_MAGNETISM) * MAGNETISM_GEAR_PENALTY_PER_LEVEL;
        (tackle.reel_power + gear_enchant) * self.set_multiplier()
            + tackle.bait_reel_power * self.bait_scale()
    }

    /// Per-attempt chance of pulling a unit from a node at this location.
    fn node_base_chance(&self, location: &Location) -> f64 {
        let fishing_enchant = self.get_enchant(enchant::FISHING);
        BASE_CATCH_CHANCE
            + (self.effective_level() - location.level as f64 * ZONE_LEVEL_FACTOR)
                / CHANCE_LEVEL_SCALE
            + fishing_enchant * FISHING_CHANCE_PER_ENCHANT
            + self.bait_power() / BAIT_CHANCE_SCALE
    }

    /// Expected casts to find a node. Per-attempt success ramps up with
    /// each failure and is certain by the last attempt, so the closed form
    /// runs over at most seven attempts.
    fn average_attempts_to_find_node(&self, location: &Location) -> f64 {
        let base_chance = self.node_base_chance(location);
        let fishing_enchant = self.get_enchant(enchant::FISHING);
        let mut average = 0.0;
        let mut reach_probability = 1.0;
        for failures in 0..MAX_NODE_FIND_ATTEMPTS {
            let chance = (base_chance
                + fishing_enchant * FISHING_CHANCE_PER_ENCHANT
                + failures as f64 / NODE_FIND_RAMP)
                .min(1.0);
            average += chance * reach_probability * (failures + 1) as f64;
            reach_probability *= 1.0 - chance;
        }
        average
    }

    fn size_draw_params(&self, location: &Location, node_min: f64, node_max: f64) -> NodeDrawParams {
        NodeDrawParams {
            zone_level: location.level as f64,
            min_base: node_min,
            max_base: node_max,
            fishing_level: self.effective_level(),
            bait_power: self.bait_power(),
        }
    }
}

impl<P: PlayerStats> GatheringAction for Fishing<P> {
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
        let tackle = self.player.tackle();
        let bait = tackle.bait_fishing_bonus * self.bait_scale();
        self.player.skill_level(ActionType::Fishing)
            + bait
            + self.player.gear_bonus(ActionType::Fishing) * self.set_multiplier()
    }

    fn node_weights(&self, location: &Location) -> BTreeMap<String, f64> {
        let bonus_rarity = self.bonus_rarity();
        let level_scale = 1.0 + self.effective_level() / LEVEL_FREQUENCY_SCALE;
        let mut weights = BTreeMap::new();
        for (name, node) in &location.nodes {
            let frequency = ((node.frequency + bonus_rarity) * level_scale)
                .min(node.max_frequency)
                .max(0.0);
            weights.insert(name.clone(), frequency);
        }

        // Magnetism pulls nodes rarer than the (positive) average toward
        // the mean.
        let positives: Vec<f64> = weights.values().copied().filter(|f| *f > 0.0).collect();
        if positives.is_empty() {
            return BTreeMap::new();
        }
        let positive_average = positives.iter().sum::<f64>() / positives.len() as f64;
        let boost = 1.0 + self.get_enchant(enchant::FISHING_MAGNETISM) * MAGNETISM_PULL_PER_LEVEL;
        let mut total = 0.0;
        for weight in weights.values_mut() {
            if *weight < positive_average {
                *weight *= boost;
            }
            total += *weight;
        }
        if total <= 0.0 {
            return BTreeMap::new();
        }
        for weight in weights.values_mut() {
            *weight /= total;
        }
        weights
    }

    /// Level- and rarity-scaled loot weight, cap-bound, with the
    /// fiberFinder boost on fiber-class items.
    fn relative_loot_frequency(&self, loot: &Loot) -> f64 {
        let mut frequency = ((loot.frequency + self.bonus_rarity())
            * (1.0 + self.effective_level() / LEVEL_FREQUENCY_SCALE))
            .min(loot.max_frequency);
        if loot.item_class == "fiber" {
            frequency *= 1.0 + self.get_enchant(enchant::FIBER_FINDER) * FIBER_BOOST_PER_LEVEL;
        }
        frequency.max(0.0)
    }

    fn node_sizes(&self, location: &Location) -> BTreeMap<String, f64> {
        let mut rng = self.sampler_rng();
        location
            .nodes
            .iter()
            .map(|(name, node)| {
                let params =
                    self.size_draw_params(location, node.min_base_amount, node.max_base_amount);
                // accuracy is never zero, so the estimator cannot fail
                let size = sampling::average_node_size(&params, self.accuracy, &mut rng)
                    .unwrap_or(0.0);
                (name.clone(), size)
            })
            .collect()
    }

    fn node_attempts(&self, location: &Location) -> BTreeMap<String, f64> {
        let mut rng = self.sampler_rng();
        let base_chance = self.node_base_chance(location);
        let fishing_enchant = self.get_enchant(enchant::FISHING);
        // The depletion process runs on raw skill and gear, without the
        // set-bonus and bait scaling the size draw sees.
        let fishing_level = self.player.skill_level(ActionType::Fishing)
            + self.player.gear_bonus(ActionType::Fishing);
        let bait_power = self.player.tackle().bait_power;
        location
            .nodes
            .iter()
            .map(|(name, node)| {
                let params = NodeDrawParams {
                    zone_level: location.level as f64,
                    min_base: node.min_base_amount,
                    max_base: node.max_base_amount,
                    fishing_level,
                    bait_power,
                };
                let attempts = sampling::average_attempts_to_deplete(
                    &params,
                    base_chance,
                    fishing_enchant,
                    self.accuracy,
                    &mut rng,
                )
                .unwrap_or(0.0);
                (name.clone(), attempts)
            })
            .collect()
    }

    fn zone_action_rate(&self, location_name: &str) -> Result<f64, EngineError> {
        let location = self.location(location_name)?;
        if (location.level as f64) > self.effective_level() {
            return Ok(0.0);
        }

        let node_weights = self.node_weights(location);
        let node_sizes = self.node_sizes(location);
        let node_attempts = self.node_attempts(location);
        let haste = self.get_enchant(enchant::HASTE);

        let base_time =
            location.base_duration_ms / 1000.0 / (1.0 + haste * HASTE_SPEED_PER_LEVEL);
        let node_search_time =
            (base_time * NODE_SEARCH_FACTOR * (1.0 - self.bait_power() / BAIT_TIME_SCALE)).max(1.0);
        let finds = self.average_attempts_to_find_node(location);
        let loot_search_time = (base_time / LOOT_SEARCH_DIVISOR
            * (REEL_TIME_SCALE / (self.reel_power() + REEL_TIME_SCALE)))
        .max(1.0);

        let mut total_yield = 0.0;
        let mut total_time = 0.0;
        for (name, weight) in &node_weights {
            let attempts = node_attempts.get(name).copied().unwrap_or(0.0);
            total_time += (node_search_time * finds + loot_search_time * attempts) * weight;
            total_yield += node_sizes.get(name).copied().unwrap_or(0.0) * weight;
        }
        if total_time <= 0.0 {
            return Ok(0.0);
        }
        Ok(total_yield / total_time * SECONDS_PER_HOUR)
    }
}
