//! Static game-data catalog: locations, their gathering nodes, and loot.
//!
//! Entities are built once at load time and never mutated afterwards. The
//! only way to change them is to load a fresh catalog and swap it in as a
//! whole, so concurrent readers always see a consistent snapshot.

mod loader;
mod types;

pub use loader::{
    load_catalog, load_item_index, RawAccessRequirements, RawCatalog, RawExperienceAward,
    RawItem, RawLocation, RawLoot, RawNode, RawSkillRequirement,
};
pub use types::*;
