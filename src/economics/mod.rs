//! Economics engine: levelized costs, emissions and lifetime totals.

pub mod costing;
pub mod summary;

pub use costing::{CostBasis, TechSummary, capital_annuity, capital_recovery_factor};
pub use summary::SystemSummary;
