//! The shared gathering-action contract.
//!
//! Every variant answers the same questions over a location: how likely is
//! each node, how much does a node yield, how many attempts does a node
//! cost, and how fast do attempts happen. The expected item deltas per
//! node and the per-location item histogram are computed here once, on top
//! of those variant-specific answers.

use std::collections::BTreeMap;

use crate::actions::balance::{self, enchant};
use crate::catalog::{
    Catalog, ItemIndex, Location, Loot, Node, FUEL_ITEM_ID, HEAT_ITEM_ID, NATURE_ITEM_ID,
};
use crate::character::PlayerStats;
use crate::error::EngineError;

/// Whether a histogram rate is per single attempt or per hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateInterval {
    PerAction,
    PerHour,
}

/// A gathering action over a player reference and its own subset of valid
/// enchantments.
pub trait GatheringAction {
    fn player(&self) -> &dyn PlayerStats;
    fn catalog(&self) -> &Catalog;
    fn items(&self) -> &ItemIndex;

    /// Enchant names this action responds to; everything else reads as 0.
    fn valid_enchants(&self) -> &'static [&'static str];

    /// Per-level scaling applied to raw enchantment levels.
    fn enchant_strength(&self) -> f64;

    /// Transmutation routing for superheating-style enchants: source item
    /// id to transmuted item id. Empty for actions without one.
    fn transmute_table(&self) -> &'static [(u32, u32)] {
        &[]
    }

    /// Composite of base skill level and gear/enchant bonuses used in the
    /// rate formulas.
    fn effective_level(&self) -> f64;

    /// Normalized node-selection distribution for a location. Empty when
    /// every node's capped frequency comes out non-positive.
    fn node_weights(&self, location: &Location) -> BTreeMap<String, f64>;

    /// Expected resource amount per node completion.
    fn node_sizes(&self, location: &Location) -> BTreeMap<String, f64>;

    /// Expected gathering attempts to fully deplete one node occurrence.
    fn node_attempts(&self, location: &Location) -> BTreeMap<String, f64>;

    /// Attempts per hour at the location, or 0 when the player cannot
    /// access it. Inaccessibility is a valid zero-rate result, not an
    /// error.
    fn zone_action_rate(&self, location_name: &str) -> Result<f64, EngineError>;

    /// Scaled enchant value: player level times this action's strength, or
    /// 0 for enchants outside the valid set.
    fn get_enchant(&self, name: &str) -> f64 {
        if self.valid_enchants().contains(&name) {
            self.enchant_strength() * self.player().enchant_level(name) as f64
        } else {
            0.0
        }
    }

    /// A loot entry's selection weight before normalization: capped base
    /// frequency, floored at 0.
    fn relative_loot_frequency(&self, loot: &Loot) -> f64 {
        loot.frequency.min(loot.max_frequency).max(0.0)
    }

    /// Looks up a location by name, failing with the valid set on a miss.
    fn location(&self, name: &str) -> Result<&Location, EngineError> {
        self.catalog().get(name).ok_or_else(|| EngineError::UnknownLocation {
            name: name.to_string(),
            known: self.list_of_actions(),
        })
    }

    /// Location names in catalog order.
    fn list_of_actions(&self) -> Vec<String> {
        self.catalog().names().map(str::to_string).collect()
    }

    fn zone_experience_rate(&self, location_name: &str) -> Result<f64, EngineError> {
        let location = self.location(location_name)?;
        Ok(location.experience * self.zone_action_rate(location_name)?)
    }

    /// Best hourly experience over all locations in the catalog.
    fn max_experience_rate(&self) -> Result<f64, EngineError> {
        let names = self.list_of_actions();
        let mut best = 0.0_f64;
        for name in &names {
            let rate = self.zone_experience_rate(name)?;
            if rate > best {
                best = rate;
            }
        }
        Ok(best)
    }

    /// Expected item deltas per node completion, keyed by item id. Signed:
    /// enchant side effects consume heat, fuel and nature resources.
    fn loot_rates(&self, node: &Node) -> BTreeMap<u32, f64> {
        let gathering =
            (self.get_enchant(enchant::GATHERING) * balance::GATHERING_YIELD_PER_LEVEL).min(1.0);
        let empowered_gathering = (self.get_enchant(enchant::EMPOWERED_GATHERING)
            * balance::GATHERING_YIELD_PER_LEVEL)
            .min(1.0);
        let total_gathering = balance::diminishing_combine(gathering, empowered_gathering);
        let superheat =
            (self.get_enchant(enchant::SUPERHEATING) * balance::SUPERHEAT_CHANCE_PER_LEVEL).min(1.0);
        let empowered_superheat = (self.get_enchant(enchant::EMPOWERED_SUPERHEATING)
            * balance::SUPERHEAT_CHANCE_PER_LEVEL)
            .min(1.0);
        let total_superheat = balance::diminishing_combine(superheat, empowered_superheat);
        let embers = self.get_enchant(enchant::EMBERS) * balance::EMBERS_HEAT_PER_LEVEL;

        // Normalize the loot table into a selection distribution.
        let mut frequencies: BTreeMap<u32, f64> = BTreeMap::new();
        for (id, loot) in &node.loot {
            *frequencies.entry(*id).or_insert(0.0) += self.relative_loot_frequency(loot);
        }
        let total_frequency: f64 = frequencies.values().sum();
        if total_frequency <= 0.0 {
            return BTreeMap::new();
        }
        for frequency in frequencies.values_mut() {
            *frequency /= total_frequency;
        }

        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for (id, loot) in &node.loot {
            let frequency = frequencies.get(id).copied().unwrap_or(0.0);
            let base_items = ((loot.min_amount + loot.max_amount) / 2.0 + total_gathering
                - total_superheat)
                * frequency;
            *counts.entry(*id).or_insert(0.0) += base_items;

            if total_superheat > 0.0 {
                if let Some(&(_, transmuted_id)) = self
                    .transmute_table()
                    .iter()
                    .find(|(source, _)| source == id)
                {
                    let transmuted = total_superheat * frequency;
                    *counts.entry(transmuted_id).or_insert(0.0) += transmuted;
                    let lost_heat = transmuted
                        * balance::SMELT_HEAT_FACTOR
                        * self.items().smelt_heat_of(transmuted_id);
                    *counts.entry(HEAT_ITEM_ID).or_insert(0.0) -= lost_heat;
                    let lost_fuel = frequency * superheat * (1.0 - empowered_superheat);
                    *counts.entry(FUEL_ITEM_ID).or_insert(0.0) -= lost_fuel;
                }
            }
            if embers > 0.0 {
                let new_heat = self.items().heat_of(*id) * embers * frequency;
                *counts.entry(HEAT_ITEM_ID).or_insert(0.0) += new_heat;
            }
            if gathering > 0.0 {
                // Debited once per qualifying loot entry, so multi-loot
                // nodes pay the nature cost more than once per completion.
                let lost_nature =
                    frequency * gathering * balance::NATURE_COST_PER_PROC * (1.0 - empowered_gathering);
                *counts.entry(NATURE_ITEM_ID).or_insert(0.0) -= lost_nature;
            }
        }
        counts
    }

    /// Expected item rates across all nodes of a location, keyed by item
    /// id, weighted by node probability, expected yield, and (per hour)
    /// the zone action rate.
    fn location_item_id_histogram(
        &self,
        location_name: &str,
        interval: RateInterval,
    ) -> Result<BTreeMap<u32, f64>, EngineError> {
        let location = self.location(location_name)?;
        let node_weights = self.node_weights(location);
        let node_sizes = self.node_sizes(location);
        let node_attempts = self.node_attempts(location);
        let action_rate = match interval {
            RateInterval::PerHour => self.zone_action_rate(location_name)?,
            RateInterval::PerAction => 1.0,
        };

        let mut items: BTreeMap<u32, f64> = BTreeMap::new();
        let mut total_attempts = 0.0;
        for (node_name, weight) in &node_weights {
            let avg_size = node_sizes.get(node_name).copied().unwrap_or(0.0);
            total_attempts += node_attempts.get(node_name).copied().unwrap_or(0.0) * weight;
            let node = &location.nodes[node_name];
            for (id, count) in self.loot_rates(node) {
                *items.entry(id).or_insert(0.0) += count * avg_size * weight * action_rate;
            }
        }
        if total_attempts <= 0.0 {
            return Ok(BTreeMap::new());
        }
        Ok(items
            .into_iter()
            .map(|(id, rate)| (id, rate / total_attempts))
            .collect())
    }

    /// [`Self::location_item_id_histogram`] keyed by item display name.
    /// Ids the item index does not know keep their numeric form.
    fn location_item_histogram(
        &self,
        location_name: &str,
        interval: RateInterval,
    ) -> Result<BTreeMap<String, f64>, EngineError> {
        let by_id = self.location_item_id_histogram(location_name, interval)?;
        let mut named: BTreeMap<String, f64> = BTreeMap::new();
        for (id, rate) in by_id {
            let name = match self.items().name_of(id) {
                Some(name) => name.to_string(),
                None => id.to_string(),
            };
            *named.entry(name).or_insert(0.0) += rate;
        }
        Ok(named)
    }
}
