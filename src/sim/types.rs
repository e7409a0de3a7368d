//! Core simulation types: scenario context, hourly records and run output.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tech::{Category, StorageStats};

/// Display convention for the residual columns of exported results.
///
/// Only the sign of exported shortfall/surplus values changes; energy
/// values inside the core are always non-negative magnitudes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortfallSign {
    /// Shortfall exported as negative, surplus as positive.
    #[default]
    Negative,
    /// Shortfall exported as positive, surplus as negative.
    Positive,
}

impl ShortfallSign {
    /// Multiplier applied to an exported shortfall value.
    pub fn shortfall_factor(self) -> f64 {
        match self {
            ShortfallSign::Negative => -1.0,
            ShortfallSign::Positive => 1.0,
        }
    }
}

/// Scalar inputs shared by every core call of one scenario.
///
/// Immutable for the duration of a run; the optimizer never mutates it.
///
/// # Examples
///
/// ```
/// use merit_sim::sim::types::ScenarioContext;
///
/// let ctx = ScenarioContext::default();
/// assert_eq!(ctx.carbon_price, 0.0);
/// assert!(!ctx.detail);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioContext {
    /// Cost per unit of emissions.
    pub carbon_price: f64,
    /// Discount rate for technologies that declare none.
    pub discount_rate: f64,
    /// Sign convention for exported residuals.
    pub shortfall_sign: ShortfallSign,
    /// Record per-technology hourly output.
    pub detail: bool,
    /// Compute load correlation diagnostics.
    pub correlation: bool,
}

impl Default for ScenarioContext {
    fn default() -> Self {
        Self {
            carbon_price: 0.0,
            discount_rate: 0.0,
            shortfall_sign: ShortfallSign::Negative,
            detail: false,
            correlation: false,
        }
    }
}

/// Complete record of one simulated hour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourRecord {
    /// Hour index (0..8760).
    pub hour: usize,
    /// Demand after the load multiplier.
    pub load: f64,
    /// Unmet load after every technology has acted.
    pub shortfall: f64,
    /// Excess left after every technology has acted.
    pub surplus: f64,
    /// Renewable energy neither delivered nor stored.
    pub curtailment: f64,
    /// Energy drawn into storage from excess.
    pub storage_charge: f64,
    /// Renewable energy counted toward load.
    pub renewable_to_load: f64,
    /// Storage discharge counted toward load.
    pub storage_to_load: f64,
    /// Dispatchable generation counted toward load.
    pub generator_to_load: f64,
    /// Total output of every technology, including curtailed renewables.
    pub output: f64,
    /// Per-technology output in [`EnergyBalance::columns`] order.
    ///
    /// Empty unless detail mode is on.
    pub outputs: Vec<f64>,
}

impl HourRecord {
    /// Energy counted toward load by all technologies.
    pub fn to_meet_load(&self) -> f64 {
        self.renewable_to_load + self.storage_to_load + self.generator_to_load
    }
}

impl fmt::Display for HourRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "h={:>4} | load={:>9.2}  short={:>8.2}  surplus={:>8.2}  curtail={:>8.2} | \
             re={:.2}  sto={:.2}  gen={:.2}  charge={:.2}",
            self.hour,
            self.load,
            self.shortfall,
            self.surplus,
            self.curtailment,
            self.renewable_to_load,
            self.storage_to_load,
            self.generator_to_load,
            self.storage_charge,
        )
    }
}

/// Per-technology energy totals for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TechTotals {
    pub name: String,
    pub category: Category,
    /// Capacity × multiplier.
    pub capacity: f64,
    /// Energy generated, curtailed energy included.
    pub generation: f64,
    /// Energy counted toward meeting load.
    pub to_meet_load: f64,
    /// Largest single-hour output.
    pub max_hour: f64,
    /// Storage accounting, for storage technologies only.
    pub storage: Option<StorageStats>,
}

impl TechTotals {
    pub(crate) fn new(name: &str, category: Category, capacity: f64) -> Self {
        Self {
            name: name.to_string(),
            category,
            capacity,
            generation: 0.0,
            to_meet_load: 0.0,
            max_hour: 0.0,
            storage: None,
        }
    }

    pub(crate) fn record(&mut self, output: f64, to_meet_load: f64) {
        self.generation += output;
        self.to_meet_load += to_meet_load;
        self.max_hour = self.max_hour.max(output);
    }
}

/// Ephemeral result of one full-year simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyBalance {
    /// Name of the load technology.
    pub load_name: String,
    /// One record per hour.
    pub hours: Vec<HourRecord>,
    /// Totals for every dispatched technology, merit order then dispatch order.
    pub technologies: Vec<TechTotals>,
    /// Technology names matching [`HourRecord::outputs`].
    pub columns: Vec<String>,
    /// Wall-clock time spent in the hourly loop.
    pub elapsed: Duration,
}

impl EnergyBalance {
    pub fn total_load(&self) -> f64 {
        self.hours.iter().map(|h| h.load).sum()
    }

    pub fn total_shortfall(&self) -> f64 {
        self.hours.iter().map(|h| h.shortfall).sum()
    }

    pub fn total_surplus(&self) -> f64 {
        self.hours.iter().map(|h| h.surplus).sum()
    }

    pub fn total_curtailment(&self) -> f64 {
        self.hours.iter().map(|h| h.curtailment).sum()
    }

    pub fn total_storage_charge(&self) -> f64 {
        self.hours.iter().map(|h| h.storage_charge).sum()
    }

    /// Looks up totals by technology name.
    pub fn totals(&self, name: &str) -> Option<&TechTotals> {
        self.technologies.iter().find(|t| t.name == name)
    }

    /// Sum of `to_meet_load` per category.
    pub fn to_meet_load_by_category(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for t in &self.technologies {
            *out.entry(t.category.to_string()).or_insert(0.0) += t.to_meet_load;
        }
        out
    }

    /// Whether per-technology hourly output was recorded.
    pub fn has_detail(&self) -> bool {
        !self.columns.is_empty()
    }
}
