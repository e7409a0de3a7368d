//! Per-technology levelized cost and emissions.

use serde::Serialize;

use crate::sim::types::{ScenarioContext, TechTotals};
use crate::tech::{Category, HOURS_PER_YEAR, Technology};

/// Capital recovery factor for a discount rate and lifetime in years.
///
/// `r × (1+r)^n / ((1+r)^n − 1)` for `r > 0`, otherwise `1 / n`. A
/// lifetime of zero yields 0.
pub fn capital_recovery_factor(discount_rate: f64, lifetime: f64) -> f64 {
    if lifetime <= 0.0 {
        return 0.0;
    }
    if discount_rate <= 0.0 {
        return 1.0 / lifetime;
    }
    let factor = (1.0 + discount_rate).powf(lifetime);
    discount_rate * factor / (factor - 1.0)
}

/// Annualized capital cost of `capex_total`.
pub fn capital_annuity(capex_total: f64, discount_rate: f64, lifetime: f64) -> f64 {
    capex_total * capital_recovery_factor(discount_rate, lifetime)
}

/// Division that yields 0 for a zero denominator.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator != 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// How a technology's annual cost was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostBasis {
    /// Capital, operating and fuel components.
    Breakdown,
    /// Reference levelized cost × reference capacity factor.
    Reference,
    /// No cost attributes.
    NoCost,
}

/// Summary output for one technology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechSummary {
    pub name: String,
    pub category: Category,
    pub capacity: f64,
    pub generation: f64,
    pub to_meet_load: f64,
    pub capacity_factor: f64,
    pub cost_basis: CostBasis,
    pub annual_cost: f64,
    pub lcog: f64,
    pub lcoe: f64,
    pub lcoe_with_co2: f64,
    pub emissions: f64,
    pub emissions_cost: f64,
    pub max_hour: f64,
    /// Peak stored energy; 0 for non-storage technologies.
    pub max_balance: f64,
    pub capital_cost: f64,
    pub lifetime_cost: f64,
    pub lifetime_emissions: f64,
    pub lifetime_emissions_cost: f64,
    pub area: f64,
    /// Reference capacity factor actually applied (reference basis only).
    pub reference_cf: f64,
}

impl TechSummary {
    /// Costs one technology from its run totals.
    ///
    /// # Arguments
    ///
    /// * `totals` - Energy totals from the simulator
    /// * `tech` - The record the run used
    /// * `context` - Carbon price and fallback discount rate
    /// * `max_lifetime` - System lifetime used for lifetime totals
    pub fn new(
        totals: &TechTotals,
        tech: &Technology,
        context: &ScenarioContext,
        max_lifetime: f64,
    ) -> Self {
        let capacity = totals.capacity;
        let generation = totals.generation;
        let to_meet_load = totals.to_meet_load;
        let capacity_factor = ratio(generation, capacity * HOURS_PER_YEAR as f64);
        let cost = &tech.cost;

        let mut capital_cost = 0.0;
        let mut reference_cf = 0.0;
        let (cost_basis, annual_cost) = if cost.has_breakdown() {
            let discount_rate = if cost.discount_rate > 0.0 {
                cost.discount_rate
            } else {
                context.discount_rate
            };
            capital_cost = capacity * cost.capex;
            let annual = capital_annuity(capital_cost, discount_rate, tech.lifetime())
                + capacity * cost.fixed_om
                + generation * (cost.variable_om + cost.fuel);
            (CostBasis::Breakdown, annual)
        } else if cost.lcoe > 0.0 {
            reference_cf = if cost.lcoe_cf > 0.0 {
                cost.lcoe_cf
            } else {
                capacity_factor
            };
            let annual = cost.lcoe * reference_cf * HOURS_PER_YEAR as f64 * capacity;
            (CostBasis::Reference, annual)
        } else {
            (CostBasis::NoCost, 0.0)
        };

        let emissions = generation * cost.emissions;
        let emissions_cost = emissions * context.carbon_price;

        Self {
            name: totals.name.clone(),
            category: totals.category,
            capacity,
            generation,
            to_meet_load,
            capacity_factor,
            cost_basis,
            annual_cost,
            lcog: ratio(annual_cost, generation),
            lcoe: ratio(annual_cost, to_meet_load),
            lcoe_with_co2: ratio(annual_cost + emissions_cost, to_meet_load),
            emissions,
            emissions_cost,
            max_hour: totals.max_hour,
            max_balance: totals.storage.map_or(0.0, |s| s.peak_level),
            capital_cost,
            lifetime_cost: annual_cost * max_lifetime,
            lifetime_emissions: emissions * max_lifetime,
            lifetime_emissions_cost: emissions_cost * max_lifetime,
            area: capacity * tech.area,
            reference_cf,
        }
    }
}
