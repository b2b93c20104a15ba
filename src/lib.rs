//! Monte Carlo estimator for "pulls until the featured outcome" under a gacha
//! pity system: soft pity ramp, hard pity, an optional 50/50 gate and a
//! cumulative featured guarantee.
//!
//! The randomness-consuming step ([`engine`]) is kept apart from the cheap,
//! pure aggregation steps ([`distribution`], [`stats`]) so stash and cost
//! changes never require a rerun.

pub mod config;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod i18n;
pub mod pity;
pub mod presets;
pub mod report;
pub mod rng;
pub mod sim;
pub mod stats;
pub mod worker;

pub use config::{AppConfig, GachaSystemConfig, SimParams};
pub use distribution::{build_distribution, CumulativePoint, Distribution, DistributionPoint};
pub use engine::{run_monte_carlo, MonteCarloEngine, SimulationBatch};
pub use error::{Result, SimError};
pub use sim::{simulate_trial, TrialOutcome, TrialState};
pub use stats::{compute_summary, SummaryStats};
