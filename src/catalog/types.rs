//! Catalog entity types.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Item id of the heat resource consumed and produced by smelting effects.
pub const HEAT_ITEM_ID: u32 = 2;

/// Item id of the fuel resource burned per superheating proc.
pub const FUEL_ITEM_ID: u32 = 512;

/// Item id of the nature resource debited by gathering-enchant procs.
pub const NATURE_ITEM_ID: u32 = 517;

/// The gathering action a location belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Mining,
    Foraging,
    Fishing,
}

impl ActionType {
    /// Returns the display name for this action.
    pub fn name(&self) -> &'static str {
        match self {
            ActionType::Mining => "Mining",
            ActionType::Foraging => "Foraging",
            ActionType::Fishing => "Fishing",
        }
    }

    /// The `actionType` tag used in raw location data.
    pub fn data_tag(&self) -> &'static str {
        match self {
            ActionType::Mining => "Action-Mining",
            ActionType::Foraging => "Action-Foraging",
            ActionType::Fishing => "Action-Fishing",
        }
    }
}

/// A gathering location: a timed action with a level gate and a weighted
/// set of nodes to draw loot from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub loc_id: u32,
    pub action: ActionType,
    /// Base time per attempt, in milliseconds.
    pub base_duration_ms: f64,
    /// Required skill level to gather here.
    pub level: u32,
    /// Experience awarded per completion.
    pub experience: f64,
    pub nodes: BTreeMap<String, Node>,
}

impl Location {
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }
}

/// A weighted sub-option within a location. Successful attempts select a
/// node by frequency and then draw from its loot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub node_id: String,
    /// Base selection frequency, clamped to `max_frequency` before any
    /// distribution is formed.
    pub frequency: f64,
    pub max_frequency: f64,
    pub min_base_amount: f64,
    pub max_base_amount: f64,
    /// Descriptive tags ("tree", "plants", "seeds", ...) that enchantment
    /// bonuses key off.
    pub tags: BTreeSet<String>,
    pub loot: BTreeMap<u32, Loot>,
}

impl Node {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// An item-yield rule attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loot {
    pub id: u32,
    pub frequency: f64,
    pub max_frequency: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    /// Item classification ("fiber", "ore", ...) used to route class-keyed
    /// enchant effects.
    pub item_class: String,
}

/// All locations of one action type, in load order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    locations: Vec<Location>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_locations(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    pub fn get(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|loc| loc.name == name)
    }

    /// Location names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.locations.iter().map(|loc| loc.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Item metadata consulted by loot-rate adjustments: display name, class,
/// intrinsic heat value, and the heat cost of smelting the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub id: u32,
    pub name: String,
    pub class: String,
    /// Heat released when the item is burned (embers byproduct).
    pub heat: f64,
    /// Heat required to smelt this item, per unit.
    pub smelt_heat: f64,
}

/// Lookup over all known items, keyed by id. Unknown ids resolve to
/// neutral defaults rather than failing, so a catalog referencing an item
/// the caller never described still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemIndex {
    items: HashMap<u32, ItemInfo>,
}

impl ItemIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: ItemInfo) {
        self.items.insert(info.id, info);
    }

    pub fn get(&self, id: u32) -> Option<&ItemInfo> {
        self.items.get(&id)
    }

    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.items.get(&id).map(|info| info.name.as_str())
    }

    pub fn class_of(&self, id: u32) -> &str {
        self.items.get(&id).map(|info| info.class.as_str()).unwrap_or("")
    }

    pub fn heat_of(&self, id: u32) -> f64 {
        self.items.get(&id).map(|info| info.heat).unwrap_or(0.0)
    }

    pub fn smelt_heat_of(&self, id: u32) -> f64 {
        self.items.get(&id).map(|info| info.smelt_heat).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_tags() {
        assert_eq!(ActionType::Mining.data_tag(), "Action-Mining");
        assert_eq!(ActionType::Foraging.data_tag(), "Action-Foraging");
        assert_eq!(ActionType::Fishing.data_tag(), "Action-Fishing");
        assert_eq!(ActionType::Fishing.name(), "Fishing");
    }

    #[test]
    fn test_catalog_lookup_and_order() {
        let make = |name: &str| Location {
            name: name.to_string(),
            loc_id: 0,
            action: ActionType::Mining,
            base_duration_ms: 5000.0,
            level: 1,
            experience: 10.0,
            nodes: BTreeMap::new(),
        };
        let catalog = Catalog::from_locations(vec![make("Clay Pit"), make("Old Quarry")]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Clay Pit", "Old Quarry"]);
        assert!(catalog.get("Old Quarry").is_some());
        assert!(catalog.get("Sunken Reef").is_none());
    }

    #[test]
    fn test_item_index_unknown_ids_are_neutral() {
        let mut index = ItemIndex::new();
        index.insert(ItemInfo {
            id: 101,
            name: "Copper Ore".to_string(),
            class: "ore".to_string(),
            heat: 0.5,
            smelt_heat: 2.0,
        });

        assert_eq!(index.name_of(101), Some("Copper Ore"));
        assert_eq!(index.class_of(101), "ore");
        assert_eq!(index.class_of(9999), "");
        assert_eq!(index.heat_of(9999), 0.0);
        assert_eq!(index.smelt_heat_of(9999), 0.0);
    }
}
