//! Loader contract for raw location and item data.
//!
//! The raw structures mirror the game-data shapes the external parser
//! produces; the engine only consumes the result of [`load_catalog`].
//! Defaulting follows the game data conventions: caps default to the base
//! value, maximum amounts to the minimum, and a location without a node
//! list is treated as one anonymous node wrapping its flat loot table.

use std::collections::{BTreeMap, BTreeSet};

use log::warn;
use serde::Deserialize;

use crate::catalog::types::{
    ActionType, Catalog, ItemIndex, ItemInfo, Location, Loot, Node, HEAT_ITEM_ID,
};
use crate::error::EngineError;

/// Raw location entries keyed by their catalog key.
pub type RawCatalog = BTreeMap<String, RawLocation>;

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSkillRequirement {
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub level: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAccessRequirements {
    #[serde(default, rename = "requiredSkills")]
    pub required_skills: Vec<RawSkillRequirement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExperienceAward {
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLoot {
    #[serde(default)]
    pub id: u32,
    #[serde(default = "one")]
    pub frequency: f64,
    #[serde(default, rename = "maxFrequency")]
    pub max_frequency: Option<f64>,
    #[serde(default = "one", rename = "minAmount")]
    pub min_amount: f64,
    #[serde(default, rename = "maxAmount")]
    pub max_amount: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    #[serde(default, rename = "nodeID")]
    pub node_id: String,
    #[serde(default = "one")]
    pub frequency: f64,
    #[serde(default, rename = "maxFrequency")]
    pub max_frequency: Option<f64>,
    #[serde(default = "one", rename = "minimumBaseAmount")]
    pub minimum_base_amount: f64,
    #[serde(default, rename = "maximumBaseAmount")]
    pub maximum_base_amount: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub loot: Vec<RawLoot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "locID")]
    pub loc_id: u32,
    #[serde(default, rename = "actionType")]
    pub action_type: String,
    #[serde(default, rename = "baseDuration")]
    pub base_duration: f64,
    #[serde(default, rename = "accessRequirements")]
    pub access_requirements: RawAccessRequirements,
    #[serde(default, rename = "xpPerCompletion")]
    pub xp_per_completion: Vec<RawExperienceAward>,
    #[serde(default)]
    pub nodes: Option<Vec<RawNode>>,
    #[serde(default)]
    pub loot: Vec<RawLoot>,
}

/// Raw item metadata, keyed externally by the item id string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub heat: f64,
    #[serde(default, rename = "requiredResources")]
    pub required_resources: Vec<BTreeMap<String, f64>>,
}

/// Builds the item lookup from raw item data keyed by id string.
pub fn load_item_index(raw: &BTreeMap<String, RawItem>) -> ItemIndex {
    let heat_key = HEAT_ITEM_ID.to_string();
    let mut index = ItemIndex::new();
    for (key, item) in raw {
        let id: u32 = match key.parse() {
            Ok(id) => id,
            Err(_) => {
                warn!("skipping item with non-numeric id '{key}'");
                continue;
            }
        };
        let smelt_heat = item
            .required_resources
            .first()
            .and_then(|resources| resources.get(&heat_key))
            .copied()
            .unwrap_or(0.0);
        index.insert(ItemInfo {
            id,
            name: item.name.clone(),
            class: item.class.clone(),
            heat: item.heat,
            smelt_heat,
        });
    }
    index
}

/// Builds the catalog of all raw locations tagged with `action`, resolving
/// loot item classes through `items`.
///
/// Identical raw input always produces a structurally equal catalog.
pub fn load_catalog(
    raw: &RawCatalog,
    items: &ItemIndex,
    action: ActionType,
) -> Result<Catalog, EngineError> {
    let mut locations = Vec::new();
    for (key, entry) in raw {
        if entry.action_type != action.data_tag() {
            continue;
        }
        if entry.name.is_empty() {
            return Err(EngineError::MalformedLocation {
                name: key.clone(),
                field: "name",
            });
        }
        locations.push(build_location(entry, items, action));
    }
    Ok(Catalog::from_locations(locations))
}

fn build_location(entry: &RawLocation, items: &ItemIndex, action: ActionType) -> Location {
    let level = match entry.access_requirements.required_skills.first() {
        Some(requirement) => requirement.level,
        None => {
            warn!("no required level in '{}', defaulting to 0", entry.name);
            0
        }
    };
    let experience = match entry.xp_per_completion.first() {
        Some(award) => award.amount,
        None => {
            warn!("no experience award in '{}', defaulting to 100", entry.name);
            100.0
        }
    };

    // A location without a node list is one anonymous node over its flat
    // loot table.
    let fallback_node;
    let raw_nodes: &[RawNode] = match &entry.nodes {
        Some(nodes) => nodes,
        None => {
            fallback_node = [RawNode {
                node_id: String::new(),
                frequency: 1.0,
                max_frequency: None,
                minimum_base_amount: 1.0,
                maximum_base_amount: None,
                tags: Vec::new(),
                loot: entry.loot.clone(),
            }];
            &fallback_node
        }
    };

    let mut nodes = BTreeMap::new();
    for raw_node in raw_nodes {
        nodes.insert(raw_node.node_id.clone(), build_node(raw_node, items));
    }

    Location {
        name: entry.name.clone(),
        loc_id: entry.loc_id,
        action,
        base_duration_ms: entry.base_duration,
        level,
        experience,
        nodes,
    }
}

fn build_node(raw: &RawNode, items: &ItemIndex) -> Node {
    let mut loot = BTreeMap::new();
    for raw_loot in &raw.loot {
        if items.get(raw_loot.id).is_none() {
            warn!("loot references unknown item id {}", raw_loot.id);
        }
        loot.insert(
            raw_loot.id,
            Loot {
                id: raw_loot.id,
                frequency: raw_loot.frequency,
                max_frequency: raw_loot.max_frequency.unwrap_or(raw_loot.frequency),
                min_amount: raw_loot.min_amount,
                max_amount: raw_loot.max_amount.unwrap_or(raw_loot.min_amount),
                item_class: items.class_of(raw_loot.id).to_string(),
            },
        );
    }
    Node {
        node_id: raw.node_id.clone(),
        frequency: raw.frequency,
        max_frequency: raw.max_frequency.unwrap_or(raw.frequency),
        min_base_amount: raw.minimum_base_amount,
        max_base_amount: raw.maximum_base_amount.unwrap_or(raw.minimum_base_amount),
        tags: raw.tags.iter().cloned().collect::<BTreeSet<_>>(),
        loot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_items() -> ItemIndex {
        let raw: BTreeMap<String, RawItem> = serde_json::from_value(json!({
            "101": {"name": "Copper Ore", "class": "ore", "heat": 0.5},
            "201": {"name": "Copper Bar", "class": "bar", "requiredResources": [{"2": 4.0}]},
            "60": {"name": "Raw Shrimp", "class": "fish"},
            "61": {"name": "Kelp", "class": "fiber"},
        }))
        .unwrap();
        load_item_index(&raw)
    }

    fn test_raw_catalog() -> RawCatalog {
        serde_json::from_value(json!({
            "10": {
                "name": "Clay Pit",
                "locID": 10,
                "actionType": "Action-Mining",
                "baseDuration": 5000,
                "accessRequirements": {"requiredSkills": [{"skill": "mining", "level": 5}]},
                "xpPerCompletion": [{"amount": 30}],
                "nodes": [
                    {
                        "nodeID": "copper_vein",
                        "frequency": 60,
                        "maxFrequency": 80,
                        "minimumBaseAmount": 2,
                        "maximumBaseAmount": 6,
                        "loot": [{"id": 101, "frequency": 100, "minAmount": 1}]
                    }
                ]
            },
            "30": {
                "name": "Shallow Reef",
                "locID": 30,
                "actionType": "Action-Fishing",
                "baseDuration": 12000,
                "loot": [{"id": 60, "frequency": 50}, {"id": 61, "frequency": 10, "maxAmount": 3}]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_load_filters_by_action_type() {
        let items = test_items();
        let raw = test_raw_catalog();

        let mining = load_catalog(&raw, &items, ActionType::Mining).unwrap();
        assert_eq!(mining.names().collect::<Vec<_>>(), vec!["Clay Pit"]);

        let fishing = load_catalog(&raw, &items, ActionType::Fishing).unwrap();
        assert_eq!(fishing.names().collect::<Vec<_>>(), vec!["Shallow Reef"]);
    }

    #[test]
    fn test_load_resolves_fields_and_classes() {
        let items = test_items();
        let raw = test_raw_catalog();
        let catalog = load_catalog(&raw, &items, ActionType::Mining).unwrap();

        let pit = catalog.get("Clay Pit").unwrap();
        assert_eq!(pit.level, 5);
        assert!((pit.experience - 30.0).abs() < 1e-12);
        let vein = &pit.nodes["copper_vein"];
        assert!((vein.max_frequency - 80.0).abs() < 1e-12);
        assert_eq!(vein.loot[&101].item_class, "ore");
        // maxAmount defaults to minAmount
        assert!((vein.loot[&101].max_amount - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_nodes_synthesizes_flat_loot_node() {
        let items = test_items();
        let raw = test_raw_catalog();
        let catalog = load_catalog(&raw, &items, ActionType::Fishing).unwrap();

        let reef = catalog.get("Shallow Reef").unwrap();
        // Missing level / xp fall back to their defaults.
        assert_eq!(reef.level, 0);
        assert!((reef.experience - 100.0).abs() < 1e-12);
        assert_eq!(reef.nodes.len(), 1);
        let node = &reef.nodes[""];
        assert!((node.frequency - 1.0).abs() < 1e-12);
        assert_eq!(node.loot.len(), 2);
        assert_eq!(node.loot[&61].item_class, "fiber");
        assert!((node.loot[&61].max_amount - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_twice_is_structurally_equal() {
        let items = test_items();
        let raw = test_raw_catalog();
        let first = load_catalog(&raw, &items, ActionType::Mining).unwrap();
        let second = load_catalog(&raw, &items, ActionType::Mining).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unnamed_entry_is_malformed() {
        let items = test_items();
        let raw: RawCatalog = serde_json::from_value(json!({
            "99": {"actionType": "Action-Mining"}
        }))
        .unwrap();
        let err = load_catalog(&raw, &items, ActionType::Mining).unwrap_err();
        assert_eq!(
            err,
            EngineError::MalformedLocation {
                name: "99".to_string(),
                field: "name"
            }
        );
    }

    #[test]
    fn test_item_index_smelt_heat_from_required_resources() {
        let items = test_items();
        assert!((items.smelt_heat_of(201) - 4.0).abs() < 1e-12);
        assert!((items.smelt_heat_of(101) - 0.0).abs() < 1e-12);
    }
}
