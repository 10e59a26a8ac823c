//! Engine error taxonomy.
//!
//! Only two things are true failures here: asking for a location that does
//! not exist, and handing the estimators or loader invalid parameters.
//! Degenerate-but-valid situations (a location the player cannot access,
//! a node whose frequencies cap out at zero) are modeled as zero rates and
//! empty distributions, never as errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The requested location is not in the catalog. Carries the valid set
    /// so callers can present it.
    #[error("unknown location '{name}'; known locations: {known:?}")]
    UnknownLocation { name: String, known: Vec<String> },

    /// Monte-Carlo estimators need at least one trial.
    #[error("trial count must be positive, got {0}")]
    InvalidTrials(u32),

    /// A raw catalog entry is missing a field the engine cannot default.
    #[error("malformed location entry '{name}': missing {field}")]
    MalformedLocation { name: String, field: &'static str },
}
