//! Boundary glue: configuration in, simulation, costing and optimizer results out.

use std::collections::BTreeMap;
use std::fmt;

use tracing::info;

use crate::config::ScenarioConfig;
use crate::economics::SystemSummary;
use crate::error::{SimError, SimResult};
use crate::optimizer::{
    Optimizer, OptimizerOutcome, OptimizerSettings, apply_capacities, scale_load,
};
use crate::sim::{EnergyBalance, RunMetadata, Scenario};

/// Everything one simulated year produces.
pub struct RunReport {
    pub balance: EnergyBalance,
    pub metadata: RunMetadata,
    pub summary: SystemSummary,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary)?;
        write!(f, "{}", self.metadata)
    }
}

/// Checks a configuration and builds its scenario.
///
/// # Errors
///
/// Returns the first validation error as `SimError::Config`, or any error
/// raised while building the scenario.
pub fn prepare(config: &ScenarioConfig) -> SimResult<Scenario> {
    if let Some(err) = config.validate().into_iter().next() {
        return Err(SimError::Config(err));
    }
    config.build_scenario()
}

/// Simulates and costs a scenario with its own records.
pub fn run_scenario(scenario: &Scenario) -> RunReport {
    run_with(scenario, scenario.technologies())
}

/// Simulates and costs a scenario sized to `capacities`.
pub fn run_with_capacities(scenario: &Scenario, capacities: &BTreeMap<String, f64>) -> RunReport {
    let techs = apply_capacities(scenario.technologies(), capacities);
    run_with(scenario, &techs)
}

/// Simulates and costs an optimizer result under the load the optimizer
/// scored it with.
pub fn run_best(
    scenario: &Scenario,
    settings: &OptimizerSettings,
    capacities: &BTreeMap<String, f64>,
) -> RunReport {
    let scaled = scale_load(scenario.technologies(), settings.load_multiplier);
    let techs = apply_capacities(&scaled, capacities);
    run_with(scenario, &techs)
}

fn run_with(scenario: &Scenario, techs: &BTreeMap<String, crate::tech::Technology>) -> RunReport {
    let context = scenario.context();
    info!(
        technologies = techs.len(),
        load = %scenario.order().load,
        detail = context.detail,
        "simulation started"
    );
    let balance = scenario.simulate_with(techs, context);
    let metadata = RunMetadata::from_balance(&balance, context.correlation);
    let summary = SystemSummary::from_balance(&balance, techs, context);
    info!(
        elapsed_ms = balance.elapsed.as_millis() as u64,
        load_pct = metadata.load_pct,
        lcoe = summary.lcoe,
        "simulation finished"
    );
    RunReport {
        balance,
        metadata,
        summary,
    }
}

/// Runs the capacity optimizer over a scenario.
pub fn optimize(scenario: &Scenario, settings: &OptimizerSettings) -> OptimizerOutcome {
    info!(
        population = settings.population,
        generations = settings.generations,
        choice = ?settings.choice,
        parallel = settings.parallel,
        "optimizer started"
    );
    let outcome = Optimizer::new(scenario, settings.clone()).run();
    info!(
        generations = outcome.history.len().saturating_sub(1),
        "optimizer finished"
    );
    outcome
}
