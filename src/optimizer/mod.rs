//! Capacity optimizer: gene layout, fitness signals and the genetic search.

pub mod fitness;
pub mod genes;
pub mod search;

pub use fitness::{Metric, MetricValues, Target, Targets, lcoe_fitness};
pub use genes::{Approach, CapacityRange, GeneBlock, GeneLayout, apply_capacities, decode};
pub use search::{
    Choice, Evaluation, OptimizerOutcome, OptimizerSettings, Optimizer, Signal, scale_load,
};
