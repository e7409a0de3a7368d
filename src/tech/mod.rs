//! Technology records, hourly profiles and the per-technology controllers.

pub mod generator;
pub mod profile;
pub mod record;
pub mod storage;

pub use generator::GeneratorRule;
pub use profile::{HOURS_PER_YEAR, HourlyProfiles};
pub use record::{Category, CostParams, StorageParams, Technology};
pub use storage::{StorageFlow, StorageStats, StorageUnit};
