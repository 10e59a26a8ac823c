//! Gatherer - Action Economy Engine for an Idle RPG
//!
//! Computes how fast a character acquires items and experience at a chosen
//! gathering location, given their stats, equipment and enchantment levels.
//! Mining and foraging rates are analytic; fishing rates lean on a
//! Monte-Carlo estimate of the node resource/depletion process, which has
//! no closed form.

pub mod actions;
pub mod catalog;
pub mod character;
pub mod error;
pub mod sampling;
