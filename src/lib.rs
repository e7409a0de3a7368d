//! Hourly energy balance simulator with levelized costing and a genetic
//! capacity optimizer.

pub mod cli;
pub mod config;
/// Levelized cost, emissions and system aggregates.
pub mod economics;
pub mod error;
/// File export of run and optimizer results.
pub mod io {
    pub mod export;
}
pub mod logging;
pub mod optimizer;
pub mod runner;
/// Scenario, dispatch order, engine and run metrics.
pub mod sim;
/// Technology records, hourly profiles and per-technology controllers.
pub mod tech;

pub use error::{SimError, SimResult};
