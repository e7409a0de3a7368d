//! System aggregates across every costed technology.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::sim::types::{EnergyBalance, ScenarioContext};
use crate::tech::Technology;

use super::costing::{TechSummary, ratio};

/// Economic and emissions summary for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSummary {
    /// One entry per technology with non-zero effective capacity.
    pub technologies: Vec<TechSummary>,
    pub capacity: f64,
    pub generation: f64,
    pub to_meet_load: f64,
    pub annual_cost: f64,
    pub capital_cost: f64,
    pub emissions: f64,
    pub emissions_cost: f64,
    pub lifetime_cost: f64,
    pub lifetime_emissions: f64,
    pub lifetime_emissions_cost: f64,
    pub area: f64,
    /// Largest lifetime among costed technologies.
    pub max_lifetime: f64,
    pub total_load: f64,
    pub total_shortfall: f64,
    /// Total cost over load actually served.
    pub lcoe: f64,
    pub lcoe_with_co2: f64,
    /// Total cost over total generation.
    pub lcog: f64,
}

impl SystemSummary {
    /// Costs every technology in `balance` and sums the results.
    ///
    /// Technologies with zero effective capacity, or without a record in
    /// `technologies`, are skipped.
    pub fn from_balance(
        balance: &EnergyBalance,
        technologies: &BTreeMap<String, Technology>,
        context: &ScenarioContext,
    ) -> Self {
        let costed: Vec<_> = balance
            .technologies
            .iter()
            .filter(|t| t.capacity > 0.0)
            .filter_map(|t| technologies.get(&t.name).map(|tech| (t, tech)))
            .collect();
        let max_lifetime = costed
            .iter()
            .map(|(_, tech)| tech.lifetime())
            .fold(0.0, f64::max);

        let techs: Vec<TechSummary> = costed
            .into_iter()
            .map(|(totals, tech)| TechSummary::new(totals, tech, context, max_lifetime))
            .collect();

        let sum = |f: fn(&TechSummary) -> f64| techs.iter().map(f).sum::<f64>();
        let annual_cost = sum(|t| t.annual_cost);
        let emissions_cost = sum(|t| t.emissions_cost);
        let generation = sum(|t| t.generation);
        let total_load = balance.total_load();
        let total_shortfall = balance.total_shortfall();
        let served = total_load - total_shortfall;

        Self {
            capacity: sum(|t| t.capacity),
            generation,
            to_meet_load: sum(|t| t.to_meet_load),
            annual_cost,
            capital_cost: sum(|t| t.capital_cost),
            emissions: sum(|t| t.emissions),
            emissions_cost,
            lifetime_cost: sum(|t| t.lifetime_cost),
            lifetime_emissions: sum(|t| t.lifetime_emissions),
            lifetime_emissions_cost: sum(|t| t.lifetime_emissions_cost),
            area: sum(|t| t.area),
            max_lifetime,
            total_load,
            total_shortfall,
            lcoe: ratio(annual_cost, served),
            lcoe_with_co2: ratio(annual_cost + emissions_cost, served),
            lcog: ratio(annual_cost, generation),
            technologies: techs,
        }
    }

    /// Looks up one technology's summary.
    pub fn technology(&self, name: &str) -> Option<&TechSummary> {
        self.technologies.iter().find(|t| t.name == name)
    }
}

impl fmt::Display for SystemSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Technology Summary ---")?;
        writeln!(
            f,
            "{:<16} {:>10} {:>12} {:>12} {:>7} {:>14} {:>9} {:>9} {:>12}",
            "Technology", "Capacity", "Generation", "To load", "CF", "Annual cost", "LCOG", "LCOE", "Emissions"
        )?;
        for t in &self.technologies {
            writeln!(
                f,
                "{:<16} {:>10.1} {:>12.1} {:>12.1} {:>6.1}% {:>14.0} {:>9.2} {:>9.2} {:>12.1}",
                t.name,
                t.capacity,
                t.generation,
                t.to_meet_load,
                t.capacity_factor * 100.0,
                t.annual_cost,
                t.lcog,
                t.lcoe,
                t.emissions,
            )?;
        }
        writeln!(
            f,
            "{:<16} {:>10.1} {:>12.1} {:>12.1} {:>7} {:>14.0} {:>9.2} {:>9.2} {:>12.1}",
            "Total",
            self.capacity,
            self.generation,
            self.to_meet_load,
            "",
            self.annual_cost,
            self.lcog,
            self.lcoe,
            self.emissions,
        )?;
        writeln!(f, "System LCOE:           {:.2} $/MWh", self.lcoe)?;
        writeln!(f, "System LCOE incl. CO2: {:.2} $/MWh", self.lcoe_with_co2)?;
        writeln!(f, "Capital cost:          {:.0}", self.capital_cost)?;
        write!(
            f,
            "Lifetime cost:         {:.0} over {:.0} years",
            self.lifetime_cost, self.max_lifetime
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::{HourRecord, TechTotals};
    use crate::tech::{Category, CostParams};
    use std::time::Duration;

    fn fixture() -> (EnergyBalance, BTreeMap<String, Technology>) {
        let mut gas = TechTotals::new("Gas", Category::Generator, 10.0);
        gas.record(60.0, 60.0);
        let mut wind = TechTotals::new("Wind", Category::Renewable, 20.0);
        wind.record(40.0, 30.0);
        let idle = TechTotals::new("Idle", Category::Generator, 0.0);

        let balance = EnergyBalance {
            load_name: "Load".into(),
            hours: vec![HourRecord {
                load: 100.0,
                shortfall: 10.0,
                ..HourRecord::default()
            }],
            technologies: vec![wind, gas, idle],
            columns: Vec::new(),
            elapsed: Duration::ZERO,
        };

        let techs = [
            Technology::new("Gas", Category::Generator, 10.0).with_cost(CostParams {
                fuel: 2.0,
                emissions: 1.0,
                lifetime: 30.0,
                ..CostParams::default()
            }),
            Technology::new("Wind", Category::Renewable, 20.0).with_cost(CostParams {
                variable_om: 1.0,
                lifetime: 25.0,
                ..CostParams::default()
            }),
            Technology::new("Idle", Category::Generator, 0.0).with_cost(CostParams {
                lifetime: 60.0,
                ..CostParams::default()
            }),
        ]
        .into_iter()
        .map(|t| (t.name.clone(), t))
        .collect();
        (balance, techs)
    }

    #[test]
    fn aggregates_costed_technologies() {
        let (balance, techs) = fixture();
        let ctx = ScenarioContext {
            carbon_price: 5.0,
            ..ScenarioContext::default()
        };
        let s = SystemSummary::from_balance(&balance, &techs, &ctx);
        assert_eq!(s.technologies.len(), 2);
        assert!(s.technology("Idle").is_none());
        // idle technology's longer lifetime is ignored
        assert_eq!(s.max_lifetime, 30.0);
        assert_eq!(s.annual_cost, 160.0);
        assert_eq!(s.emissions, 60.0);
        assert_eq!(s.lcoe, 160.0 / 90.0);
        assert_eq!(s.lcoe_with_co2, (160.0 + 300.0) / 90.0);
        assert_eq!(s.lifetime_cost, 160.0 * 30.0);
    }

    #[test]
    fn empty_run_is_all_zero() {
        let (mut balance, techs) = fixture();
        balance.hours.clear();
        balance.technologies.clear();
        let s = SystemSummary::from_balance(&balance, &techs, &ScenarioContext::default());
        assert_eq!(s.lcoe, 0.0);
        assert_eq!(s.max_lifetime, 0.0);
    }

    #[test]
    fn display_lists_each_technology() {
        let (balance, techs) = fixture();
        let s = SystemSummary::from_balance(&balance, &techs, &ScenarioContext::default());
        let text = format!("{s}");
        assert!(text.contains("Gas"));
        assert!(text.contains("Wind"));
        assert!(text.contains("System LCOE"));
    }
}
