//! Dispatchable generator controller.

use crate::tech::record::Technology;

/// Hourly output rule for a non-storage dispatchable technology.
///
/// Stateless: the same inputs always give the same output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorRule {
    /// Must-run floor in energy per hour.
    pub floor: f64,
    /// Maximum output in energy per hour.
    pub ceiling: f64,
}

impl GeneratorRule {
    /// Derives the envelope from a technology's effective capacity.
    pub fn new(tech: &Technology) -> Self {
        let capacity = tech.effective_capacity();
        let ceiling = (capacity * tech.capacity_max).max(0.0);
        Self {
            floor: (capacity * tech.capacity_min).clamp(0.0, ceiling),
            ceiling,
        }
    }

    /// Output for one hour given the demand still unmet.
    ///
    /// Runs at the ceiling when demand exceeds it, at the floor when demand
    /// is below it (even if that creates local surplus), and otherwise
    /// matches demand exactly.
    pub fn dispatch(&self, remaining_demand: f64) -> f64 {
        if remaining_demand >= self.ceiling {
            self.ceiling
        } else if remaining_demand < self.floor {
            self.floor
        } else {
            remaining_demand
        }
    }
}
