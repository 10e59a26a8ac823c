//! Gathering action variants and the shared action contract.
//!
//! Mining and foraging are fully analytic; fishing layers the derived
//! tackle stats and the Monte-Carlo node estimators on top of the same
//! contract.

mod balance;
mod contract;
mod fishing;
mod foraging;
mod mining;

pub use balance::*;
pub use contract::{GatheringAction, RateInterval};
pub use fishing::Fishing;
pub use foraging::Foraging;
pub use mining::Mining;
