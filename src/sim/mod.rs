/// Hour counter for the yearly loop.
pub mod clock;
pub mod engine;
pub mod kpi;
/// Merit and dispatch order resolution.
pub mod order;
pub mod scenario;
pub mod types;

pub use engine::Engine;
pub use kpi::RunMetadata;
pub use order::DispatchOrder;
pub use scenario::Scenario;
pub use types::{EnergyBalance, HourRecord, ScenarioContext, ShortfallSign, TechTotals};
