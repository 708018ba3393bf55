//! Commute on-time probability estimation.
//!
//! Each transport mode's door-to-door duration is modeled as a normal
//! distribution built from upstream point estimates (driving time, next
//! departure waits). The on-time probability is the CDF of that
//! distribution evaluated at the time budget.

pub mod error;
pub mod estimator;
pub mod model;
pub mod probability;
pub mod time_budget;

pub use error::EstimatorError;
pub use estimator::{compute_probabilities, CommuteInputs, EARLY_MORNING_END_HOUR};
pub use model::{CommuteProbabilities, ModeDetail, ModeResult, TransportMode};
pub use probability::ontime_prob;
pub use time_budget::{parse_hhmm, time_budget_min, TimeBudget, MINUTES_PER_DAY};
