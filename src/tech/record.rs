//! Static attributes of one technology or facility.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Lifetime substituted when a record declares zero years.
pub const DEFAULT_LIFETIME_YEARS: f64 = 20.0;

/// Broad role a technology plays in the energy balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The demand being served. Exactly one per scenario.
    Load,
    /// Dispatchable thermal or firm generation.
    Generator,
    /// Energy storage driven by the storage state machine.
    Storage,
    /// Variable generation that is taken whenever available.
    Renewable,
}

impl Category {
    /// Returns `true` for categories that belong in the dispatch order.
    pub fn is_dispatchable(self) -> bool {
        matches!(self, Category::Generator | Category::Storage)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Load => "load",
            Category::Generator => "generator",
            Category::Storage => "storage",
            Category::Renewable => "renewable",
        };
        f.write_str(s)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "load" => Ok(Category::Load),
            "generator" => Ok(Category::Generator),
            "storage" => Ok(Category::Storage),
            "renewable" => Ok(Category::Renewable),
            _ => Err(format!("unknown technology category: {s}")),
        }
    }
}

/// Storage-only operating parameters.
///
/// Loss values are fractions (0.0..1.0). Rate caps are fractions of the
/// effective capacity that may move in one hour; `None` means uncapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageParams {
    /// Initial stored energy as a fraction of effective capacity.
    pub initial: f64,
    /// Maximum recharge per hour, as a fraction of capacity.
    pub recharge_max: Option<f64>,
    /// Fraction of charging input lost.
    pub recharge_loss: f64,
    /// Maximum discharge per hour, as a fraction of capacity.
    pub discharge_max: Option<f64>,
    /// Fraction of drawn energy lost while discharging.
    pub discharge_loss: f64,
    /// Self-discharge per day, as a fraction of the stored level.
    pub parasitic_loss: f64,
    /// Minimum length of a discharge run in hours (0 = no constraint).
    pub min_runtime: u32,
    /// Output penalty on the first hour of a discharge run (fraction of an hour).
    pub warm_time: f64,
}

impl Default for StorageParams {
    fn default() -> Self {
        Self {
            initial: 0.0,
            recharge_max: None,
            recharge_loss: 0.0,
            discharge_max: None,
            discharge_loss: 0.0,
            parasitic_loss: 0.0,
            min_runtime: 0,
            warm_time: 0.0,
        }
    }
}

impl StorageParams {
    /// Efficiency applied to energy going into storage.
    pub fn charge_efficiency(&self) -> f64 {
        1.0 - self.recharge_loss
    }

    /// Efficiency applied to energy coming out of storage.
    pub fn discharge_efficiency(&self) -> f64 {
        1.0 - self.discharge_loss
    }
}

/// Cost and emissions attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostParams {
    /// Capital cost per unit of capacity.
    pub capex: f64,
    /// Fixed operating cost per unit of capacity per year.
    pub fixed_om: f64,
    /// Variable operating cost per unit of energy.
    pub variable_om: f64,
    /// Fuel cost per unit of energy.
    pub fuel: f64,
    /// Reference levelized cost, used when no cost breakdown is given.
    pub lcoe: f64,
    /// Capacity factor behind `lcoe`; 0 uses the simulated capacity factor.
    pub lcoe_cf: f64,
    /// Discount rate; 0 falls back to the scenario discount rate.
    pub discount_rate: f64,
    /// Economic lifetime in years; 0 means the default of 20.
    pub lifetime: f64,
    /// Emissions per unit of energy generated.
    pub emissions: f64,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            capex: 0.0,
            fixed_om: 0.0,
            variable_om: 0.0,
            fuel: 0.0,
            lcoe: 0.0,
            lcoe_cf: 0.0,
            discount_rate: 0.0,
            lifetime: DEFAULT_LIFETIME_YEARS,
            emissions: 0.0,
        }
    }
}

impl CostParams {
    /// Returns `true` when any detailed cost component is present.
    pub fn has_breakdown(&self) -> bool {
        self.capex > 0.0 || self.fixed_om > 0.0 || self.variable_om > 0.0 || self.fuel > 0.0
    }
}

/// One named facility or aggregate technology.
///
/// Records are created from external configuration before a run. Only
/// `capacity` and `multiplier` change between optimizer evaluations, and
/// only on a private copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Technology {
    /// Unique name.
    pub name: String,
    /// Role in the balance.
    pub category: Category,
    /// Nameplate capacity (MW for generators, MWh for storage).
    pub capacity: f64,
    /// Scales nameplate capacity and profile output.
    pub multiplier: f64,
    /// Lower operating bound as a fraction of capacity.
    pub capacity_min: f64,
    /// Upper operating bound as a fraction of capacity.
    pub capacity_max: f64,
    /// Merit rank; lower ranks dispatch first.
    pub order: i32,
    /// Name of the hourly series, or `None` for constant output.
    pub profile: Option<String>,
    /// Land area per unit of capacity.
    pub area: f64,
    pub storage: StorageParams,
    pub cost: CostParams,
}

impl Default for Technology {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: Category::Renewable,
            capacity: 0.0,
            multiplier: 1.0,
            capacity_min: 0.0,
            capacity_max: 1.0,
            order: 0,
            profile: None,
            area: 0.0,
            storage: StorageParams::default(),
            cost: CostParams::default(),
        }
    }
}

impl Technology {
    /// Creates a record with default attributes.
    pub fn new(name: impl Into<String>, category: Category, capacity: f64) -> Self {
        Self {
            name: name.into(),
            category,
            capacity,
            ..Self::default()
        }
    }

    /// Sets the hourly series this technology follows.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Sets the merit rank.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Sets the operating envelope as fractions of capacity.
    pub fn with_envelope(mut self, capacity_min: f64, capacity_max: f64) -> Self {
        self.capacity_min = capacity_min;
        self.capacity_max = capacity_max;
        self
    }

    /// Replaces the storage parameters.
    pub fn with_storage(mut self, storage: StorageParams) -> Self {
        self.storage = storage;
        self
    }

    /// Replaces the cost parameters.
    pub fn with_cost(mut self, cost: CostParams) -> Self {
        self.cost = cost;
        self
    }

    /// Capacity scaled by the multiplier.
    pub fn effective_capacity(&self) -> f64 {
        self.capacity * self.multiplier
    }

    /// Economic lifetime with the zero-year default applied.
    pub fn lifetime(&self) -> f64 {
        if self.cost.lifetime <= 0.0 {
            DEFAULT_LIFETIME_YEARS
        } else {
            self.cost.lifetime
        }
    }

    /// Applies defaults and unit conversions, then checks invariants.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidTechnology` for negative capacity or
    /// multiplier, an inverted operating envelope, or loss fractions
    /// outside `[0, 1)`.
    pub fn normalized(mut self) -> Result<Self, SimError> {
        let invalid = |reason: &str| SimError::InvalidTechnology {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.capacity < 0.0 {
            return Err(invalid("capacity must be >= 0"));
        }
        if self.multiplier < 0.0 {
            return Err(invalid("multiplier must be >= 0"));
        }
        if self.capacity_min > self.capacity_max {
            return Err(invalid("capacity_min must be <= capacity_max"));
        }
        for (label, loss) in [
            ("recharge_loss", self.storage.recharge_loss),
            ("discharge_loss", self.storage.discharge_loss),
            ("parasitic_loss", self.storage.parasitic_loss),
        ] {
            if !(0.0..1.0).contains(&loss) {
                return Err(invalid(&format!("{label} must be in [0, 1)")));
            }
        }

        if self.cost.lifetime <= 0.0 {
            self.cost.lifetime = DEFAULT_LIFETIME_YEARS;
        }
        self.storage.warm_time = normalize_warm_time(self.storage.warm_time);
        self.name = self.name.trim().to_string();
        Ok(self)
    }
}

/// Converts a warm-up time given in minutes or days into a fraction of an hour.
///
/// Values of 1 or more are minutes (capped at one hour). Values up to one
/// hour expressed in days (<= 1/24) are scaled up to hours. Anything else is
/// already a fraction of an hour.
pub fn normalize_warm_time(warm_time: f64) -> f64 {
    if warm_time >= 1.0 {
        (warm_time / 60.0).min(1.0)
    } else if warm_time > 0.0 && warm_time <= 1.0 / 24.0 {
        warm_time * 24.0
    } else {
        warm_time.max(0.0)
    }
}
