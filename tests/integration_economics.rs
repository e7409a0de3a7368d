//! Integration tests for costing a simulated year.

mod common;

use common::{assert_close, demand, flat_profiles, generator, renewable, scenario};
use merit_sim::economics::{CostBasis, SystemSummary, capital_annuity};
use merit_sim::sim::ScenarioContext;
use merit_sim::tech::{CostParams, HOURS_PER_YEAR};

const HOURS: f64 = HOURS_PER_YEAR as f64;

#[test]
fn zero_discount_rate_annuity_is_straight_line() {
    assert_eq!(capital_annuity(1_000_000.0, 0.0, 20.0), 1_000_000.0 / 20.0);
    assert_eq!(capital_annuity(750.0, 0.0, 3.0), 750.0 / 3.0);
}

#[test]
fn reference_lcoe_carries_through_to_system_lcoe() {
    let wind = renewable("Wind", 80.0).with_cost(CostParams {
        lcoe: 50.0,
        ..CostParams::default()
    });
    let s = scenario(
        vec![demand(), wind],
        flat_profiles(&[("demand", 100.0), ("wind", 80.0)]),
    );
    let balance = s.simulate();
    let summary = SystemSummary::from_balance(&balance, s.technologies(), s.context());

    let w = summary.technology("Wind").unwrap();
    assert_eq!(w.cost_basis, CostBasis::Reference);
    assert_close(w.capacity_factor, 1.0);
    assert_close(w.annual_cost, 50.0 * HOURS * 80.0);
    assert_close(summary.lcoe, 50.0);
    assert_close(summary.total_shortfall, 20.0 * HOURS);
}

#[test]
fn curtailed_generation_costs_but_earns_no_credit() {
    let wind = renewable("Wind", 200.0).with_cost(CostParams {
        capex: 1000.0,
        lifetime: 10.0,
        ..CostParams::default()
    });
    let s = scenario(
        vec![demand(), wind],
        flat_profiles(&[("demand", 100.0), ("wind", 200.0)]),
    );
    let balance = s.simulate();
    let summary = SystemSummary::from_balance(&balance, s.technologies(), s.context());
    let w = summary.technology("Wind").unwrap();

    assert_close(w.annual_cost, 200.0 * 1000.0 / 10.0);
    assert_close(w.lcog, w.annual_cost / (200.0 * HOURS));
    assert_close(w.lcoe, w.annual_cost / (100.0 * HOURS));
    assert_close(balance.total_curtailment(), 100.0 * HOURS);
}

#[test]
fn emissions_lifetime_and_carbon_cost() {
    let gas = generator("Gas", 100.0, 0.0, 1.0).with_cost(CostParams {
        fuel: 10.0,
        emissions: 0.5,
        lifetime: 30.0,
        ..CostParams::default()
    });
    let wind = renewable("Wind", 50.0).with_cost(CostParams {
        capex: 100.0,
        lifetime: 20.0,
        ..CostParams::default()
    });
    let s = scenario(
        vec![demand(), wind, gas],
        flat_profiles(&[("demand", 100.0), ("wind", 50.0)]),
    )
    .with_context(ScenarioContext {
        carbon_price: 4.0,
        ..ScenarioContext::default()
    });
    let balance = s.simulate();
    let summary = SystemSummary::from_balance(&balance, s.technologies(), s.context());

    let g = summary.technology("Gas").unwrap();
    assert_close(g.generation, 50.0 * HOURS);
    assert_close(g.emissions, 25.0 * HOURS);
    assert_close(g.emissions_cost, 100.0 * HOURS);
    assert_close(g.lcoe_with_co2 - g.lcoe, 2.0);
    assert_eq!(summary.max_lifetime, 30.0);
    assert_close(g.lifetime_emissions, g.emissions * 30.0);
    assert_close(summary.emissions, g.emissions);
}

#[test]
fn costing_is_bit_identical_across_runs() {
    let cfg = merit_sim::config::ScenarioConfig::high_renewables();
    let s = cfg.build_scenario().unwrap();
    let a = SystemSummary::from_balance(&s.simulate(), s.technologies(), s.context());
    let b = SystemSummary::from_balance(&s.simulate(), s.technologies(), s.context());
    assert_eq!(a, b);
}
