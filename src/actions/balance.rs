//! Shared balance constants for the gathering actions.
//!
//! All cross-variant balance numbers live here. Change once, test
//! everywhere. Fishing-only tuning constants sit with the fishing variant.

// =============================================================================
// ENCHANT NAMES - as spelled in game data and character enchantment maps
// =============================================================================

pub mod enchant {
    pub const GATHERING: &str = "gathering";
    pub const EMPOWERED_GATHERING: &str = "empoweredGathering";
    pub const HASTE: &str = "haste";
    pub const SUPERHEATING: &str = "superheating";
    pub const EMPOWERED_SUPERHEATING: &str = "empoweredSuperheating";
    pub const NATURE: &str = "nature";
    pub const HERBALIST: &str = "herbalist";
    pub const SEED_HARVESTING: &str = "seedHarvesting";
    pub const EMBERS: &str = "embers";
    pub const PUNGENT_BAIT: &str = "pungentBait";
    pub const DEADLIEST_CATCH: &str = "deadliestCatch";
    pub const FISHING_MAGNETISM: &str = "fishingMagnetism";
    pub const REINFORCED_LINE: &str = "reinforcedLine";
    pub const FIBER_FINDER: &str = "fiberFinder";
    pub const FISHING: &str = "fishing";
}

// =============================================================================
// ENCHANT SCALING
// =============================================================================

/// Multiplier applied to raw enchantment levels. Owned per variant
/// instance so alternative balance experiments stay local.
pub const DEFAULT_ENCHANT_STRENGTH: f64 = 1.0;

/// Extra yield chance per gathering/empoweredGathering level.
pub const GATHERING_YIELD_PER_LEVEL: f64 = 0.10;

/// Transmute chance per superheating/empoweredSuperheating level.
pub const SUPERHEAT_CHANCE_PER_LEVEL: f64 = 0.01;

/// Heat byproduct fraction per embers level.
pub const EMBERS_HEAT_PER_LEVEL: f64 = 0.1;

/// Action speed bonus per haste level.
pub const HASTE_SPEED_PER_LEVEL: f64 = 0.04;

/// Nature resource debited per gathering proc.
pub const NATURE_COST_PER_PROC: f64 = 0.15;

/// Heat burned per transmuted unit, as a multiple of the target item's
/// smelting heat.
pub const SMELT_HEAT_FACTOR: f64 = 1.5;

// =============================================================================
// ACTION RATE
// =============================================================================

/// Analytic rate formula: (effective_level + RATE_LEVEL_OFFSET) /
/// RATE_LEVEL_SCALE attempts per base duration.
pub const RATE_LEVEL_OFFSET: f64 = 99.0;
pub const RATE_LEVEL_SCALE: f64 = 100.0;

/// Milliseconds per hour, converting base durations into hourly rates.
pub const MS_PER_HOUR: f64 = 3_600_000.0;

// =============================================================================
// Helpers
// =============================================================================

/// Merges two probability-like bonuses without exceeding 100%:
/// `1 - (1 - a)(1 - b)`.
pub fn diminishing_combine(a: f64, b: f64) -> f64 {
    1.0 - (1.0 - a) * (1.0 - b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diminishing_combine_is_symmetric() {
        let pairs = [(0.0, 0.0), (0.3, 0.7), (0.25, 0.25), (1.0, 0.4)];
        for (a, b) in pairs {
            assert!((diminishing_combine(a, b) - diminishing_combine(b, a)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_diminishing_combine_is_bounded() {
        // combine(a, b) lands between max(a, b) and 1 for a, b in [0, 1].
        let values = [0.0, 0.1, 0.5, 0.9, 1.0];
        for a in values {
            for b in values {
                let combined = diminishing_combine(a, b);
                assert!(combined >= a.max(b) - 1e-12);
                assert!(combined <= 1.0 + 1e-12);
            }
        }
    }

    #[test]
    fn test_diminishing_combine_edges() {
        assert!((diminishing_combine(0.0, 0.0) - 0.0).abs() < 1e-12);
        assert!((diminishing_combine(1.0, 0.3) - 1.0).abs() < 1e-12);
        assert!((diminishing_combine(0.5, 0.5) - 0.75).abs() < 1e-12);
    }
}
