//! Integration tests for the capacity optimizer.

mod common;

use std::collections::BTreeMap;

use common::{demand, flat_profiles, generator, lossless_storage, renewable, scenario};
use merit_sim::optimizer::{
    CapacityRange, Choice, Metric, Optimizer, OptimizerSettings, Signal, Target, Targets,
};
use merit_sim::runner::{run_best, run_scenario};
use merit_sim::sim::Scenario;
use merit_sim::tech::{CostParams, HourlyProfiles};
use merit_sim::tech::profile::{flat, solar};

fn small_scenario() -> Scenario {
    let mut profiles = HourlyProfiles::new();
    profiles.insert("demand", flat(100.0)).unwrap();
    profiles.insert("solar", solar(100.0, 6, 18, 0.0, 1)).unwrap();
    scenario(
        vec![
            demand(),
            renewable("Solar", 100.0).with_cost(CostParams {
                capex: 1_000_000.0,
                lifetime: 25.0,
                ..CostParams::default()
            }),
            lossless_storage("Battery", 100.0, 0.0).with_cost(CostParams {
                capex: 300_000.0,
                lifetime: 15.0,
                ..CostParams::default()
            }),
            generator("Gas", 100.0, 0.0, 1.0).with_cost(CostParams {
                capex: 800_000.0,
                fuel: 60.0,
                lifetime: 30.0,
                ..CostParams::default()
            }),
        ],
        profiles,
    )
}

fn settings(choice: Choice, parallel: bool) -> OptimizerSettings {
    let mut ranges = BTreeMap::new();
    ranges.insert("Solar".to_string(), CapacityRange::range(0.0, 400.0, 100.0));
    ranges.insert("Battery".to_string(), CapacityRange::discrete(vec![100.0, 200.0]));
    ranges.insert("Gas".to_string(), CapacityRange::range(100.0, 100.0, 0.0));

    let mut targets = BTreeMap::new();
    targets.insert(
        Metric::LoadPct,
        Target {
            weight: 1.0,
            better: 100.0,
            worse: 90.0,
        },
    );
    targets.insert(
        Metric::Cost,
        Target {
            weight: 1.0,
            better: 0.0,
            worse: -1.0,
        },
    );

    OptimizerSettings {
        population: 8,
        generations: 5,
        mutation: 0.05,
        stop_after: 0,
        choice,
        seed: 11,
        parallel,
        ranges,
        targets: Targets(targets),
        ..OptimizerSettings::default()
    }
}

#[test]
fn best_score_never_worsens() {
    let s = small_scenario();
    let outcome = Optimizer::new(&s, settings(Choice::Both, false)).run();

    assert_eq!(outcome.history.len(), 6);
    for pair in outcome.history.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        assert!(next.best_lcoe.unwrap() <= prev.best_lcoe.unwrap());
        assert!(next.best_multi.unwrap() <= prev.best_multi.unwrap());
    }
    assert_eq!(outcome.best.len(), 2);
}

#[test]
fn same_seed_gives_same_outcome_in_parallel_and_serial() {
    let s = small_scenario();
    let serial = Optimizer::new(&s, settings(Choice::Lcoe, false)).run();
    let again = Optimizer::new(&s, settings(Choice::Lcoe, false)).run();
    let parallel = Optimizer::new(&s, settings(Choice::Lcoe, true)).run();

    assert_eq!(serial.history, again.history);
    assert_eq!(serial.best, again.best);
    assert_eq!(serial.history, parallel.history);
    assert_eq!(serial.best, parallel.best);
}

#[test]
fn decoded_best_respects_layout() {
    let s = small_scenario();
    let outcome = Optimizer::new(&s, settings(Choice::Lcoe, false)).run();
    let best = outcome.best_for(Signal::Lcoe).unwrap();
    let caps = &best.evaluation.capacities;

    assert_eq!(caps["Gas"], 100.0);
    assert!((0.0..=400.0).contains(&caps["Solar"]));
    assert!([0.0, 100.0, 200.0, 300.0].contains(&caps["Battery"]));
    assert_eq!(best.evaluation.chromosome.len(), outcome.layout.len());
    assert!(outcome.best_for(Signal::Multi).is_none());
}

#[test]
fn unknown_bounds_are_discovered() {
    let s = small_scenario();
    let outcome = Optimizer::new(&s, settings(Choice::Multi, false)).run();
    let cost = outcome.targets.get(Metric::Cost).unwrap();
    assert!(cost.worse > 0.0);
    assert_eq!(outcome.targets.get(Metric::LoadPct).unwrap().worse, 90.0);
}

#[test]
fn evaluation_matches_a_direct_run() {
    let s = small_scenario();
    let optimizer = Optimizer::new(&s, settings(Choice::Lcoe, false));
    let mut caps = BTreeMap::new();
    caps.insert("Solar".to_string(), 100.0);
    caps.insert("Battery".to_string(), 100.0);
    caps.insert("Gas".to_string(), 100.0);
    let values = optimizer.evaluate_capacities(&caps);

    let report = run_scenario(&s);
    assert_eq!(values.lcoe, report.summary.lcoe);
    assert_eq!(values.load_pct, report.metadata.load_pct);
}

/// Gas alone covers a flat 100 MW load; the idle spare unit costs nothing.
fn firm_scenario() -> Scenario {
    scenario(
        vec![
            demand(),
            generator("Gas", 100.0, 0.0, 1.0).with_cost(CostParams {
                capex: 800_000.0,
                fuel: 60.0,
                ..CostParams::default()
            }),
            generator("Spare", 100.0, 0.0, 1.0),
        ],
        flat_profiles(&[("demand", 100.0)]),
    )
}

fn firm_settings() -> OptimizerSettings {
    let mut ranges = BTreeMap::new();
    ranges.insert("Gas".to_string(), CapacityRange::range(100.0, 100.0, 0.0));
    ranges.insert("Spare".to_string(), CapacityRange::range(0.0, 400.0, 100.0));
    OptimizerSettings {
        population: 6,
        generations: 20,
        stop_after: 2,
        choice: Choice::Lcoe,
        seed: 5,
        parallel: false,
        ranges,
        ..OptimizerSettings::default()
    }
}

#[test]
fn stable_best_score_stops_early() {
    let s = firm_scenario();
    let outcome = Optimizer::new(&s, firm_settings()).run();

    assert_eq!(outcome.history.len(), 3);
    assert_eq!(outcome.history[2].generation, 2);
    assert_eq!(outcome.history[0].best_lcoe, outcome.history[2].best_lcoe);
}

#[test]
fn load_multiplier_applies_to_search_and_best_mix_rerun() {
    let s = firm_scenario();
    let settings = OptimizerSettings {
        load_multiplier: 2.0,
        ..firm_settings()
    };
    let mut caps = BTreeMap::new();
    caps.insert("Gas".to_string(), 100.0);
    caps.insert("Spare".to_string(), 0.0);

    let scored = Optimizer::new(&s, settings.clone()).evaluate_capacities(&caps);
    let rerun = run_best(&s, &settings, &caps);

    assert_eq!(scored.load_pct, 50.0);
    assert_eq!(rerun.metadata.load_pct, scored.load_pct);
    assert_eq!(rerun.summary.lcoe, scored.lcoe);
    assert_eq!(run_scenario(&s).metadata.load_pct, 100.0);
}
