//! Monte-Carlo estimation of fishing node sizes and depletion costs.
//!
//! A fishing node's resource count is drawn from a layered random process
//! (level- and bait-scaled bounds, a lucky roll, then a uniform draw
//! between the bounds), and the attempts needed to deplete it follow a
//! geometric process whose per-unit success chance is clamped at 1. The
//! clamp leaves no closed form, so both quantities are estimated by
//! sampling. Estimators are pure over the supplied rng: seed it for
//! reproducibility, and treat the trial count as a precision/cost knob.

use rand::Rng;

use crate::error::EngineError;

/// Chance of a lucky node before bait scaling.
const LUCKY_BASE_CHANCE: f64 = 0.05;

/// Bait power divisor feeding the lucky chance.
const LUCKY_BAIT_SCALE: f64 = 2000.0;

/// Extra per-unit success chance per point of fishing enchant.
const CHANCE_PER_FISHING_ENCHANT: f64 = 0.025;

/// Divisor converting remaining resources into bonus success chance: full
/// nodes are easier to pull from than nearly empty ones.
const DEPLETION_CHANCE_SCALE: f64 = 48.0;

/// Inputs of the node-size draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeDrawParams {
    pub zone_level: f64,
    pub min_base: f64,
    pub max_base: f64,
    pub fishing_level: f64,
    pub bait_power: f64,
}

/// Draws one node resource count.
///
/// Degenerate inputs (max below min, levels below the zone) are valid: the
/// bounds are reordered by construction and the draw may come out at or
/// below zero.
pub fn draw_node_size(params: &NodeDrawParams, rng: &mut impl Rng) -> f64 {
    let level_edge = params.fishing_level - params.zone_level;
    let mut max_size = (params.max_base
        + rng.gen::<f64>() * level_edge / 8.0
        + (rng.gen::<f64>() * params.bait_power / 20.0).floor())
    .floor();
    let mut min_size = (params.min_base
        + rng.gen::<f64>() * level_edge / 6.0
        + (rng.gen::<f64>() * params.bait_power / 10.0).floor())
    .floor();

    let lucky_chance = LUCKY_BASE_CHANCE + params.bait_power / LUCKY_BAIT_SCALE;
    if rng.gen::<f64>() <= lucky_chance {
        min_size *= 1.5;
        max_size *= 3.0;
    }

    let delta = (max_size - min_size).abs();
    let small = max_size.min(min_size);
    (rng.gen::<f64>() * (delta + 1.0) + small).floor()
}

/// Mean node resource count over `trials` independent draws.
pub fn average_node_size(
    params: &NodeDrawParams,
    trials: u32,
    rng: &mut impl Rng,
) -> Result<f64, EngineError> {
    if trials == 0 {
        return Err(EngineError::InvalidTrials(trials));
    }
    let mut total = 0.0;
    for _ in 0..trials {
        total += draw_node_size(params, rng);
    }
    Ok(total / trials as f64)
}

/// Expected attempts to fully deplete one node, over `trials` sampled
/// resource counts.
///
/// Two-level Monte Carlo: node counts are sampled with [`draw_node_size`],
/// then each count indexes into a precomputed expected-attempts table. The
/// per-unit success chance is `min(1, base_chance + fishing_enchant *
/// 0.025 + remaining / 48)`, so each unit costs `1 / chance` expected
/// attempts and the node gets harder as it empties.
pub fn average_attempts_to_deplete(
    params: &NodeDrawParams,
    base_chance: f64,
    fishing_enchant: f64,
    trials: u32,
    rng: &mut impl Rng,
) -> Result<f64, EngineError> {
    if trials == 0 {
        return Err(EngineError::InvalidTrials(trials));
    }

    let counts: Vec<i64> = (0..trials)
        .map(|_| draw_node_size(params, rng) as i64)
        .collect();
    let min_count = counts.iter().copied().min().unwrap_or(0);
    let max_count = counts.iter().copied().max().unwrap_or(0);

    let mut expected_attempts = Vec::with_capacity((max_count - min_count + 1) as usize);
    for resources in min_count..=max_count {
        let mut attempts = 0.0;
        let mut remaining = resources;
        while remaining > 0 {
            let chance = (base_chance
                + fishing_enchant * CHANCE_PER_FISHING_ENCHANT
                + remaining as f64 / DEPLETION_CHANCE_SCALE)
                .min(1.0);
            attempts += 1.0 / chance;
            remaining -= 1;
        }
        expected_attempts.push(attempts);
    }

    let total: f64 = counts
        .iter()
        .map(|count| expected_attempts[(count - min_count) as usize])
        .sum();
    Ok(total / trials as f64)
}
