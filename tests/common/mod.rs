//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use merit_sim::sim::{Scenario, ScenarioContext};
use merit_sim::tech::profile::flat;
use merit_sim::tech::{Category, HourlyProfiles, StorageParams, Technology, HOURS_PER_YEAR};

/// Profile table with a flat series per `(name, value)` pair.
pub fn flat_profiles(series: &[(&str, f64)]) -> HourlyProfiles {
    let mut profiles = HourlyProfiles::new();
    for (name, value) in series {
        profiles.insert(*name, flat(*value)).unwrap();
    }
    profiles
}

/// A series that alternates `a`, `b` hour by hour.
pub fn alternating(a: f64, b: f64) -> Vec<f64> {
    (0..HOURS_PER_YEAR).map(|h| if h % 2 == 0 { a } else { b }).collect()
}

/// Load technology following the `demand` profile.
pub fn demand() -> Technology {
    Technology::new("Demand", Category::Load, 0.0).with_profile("demand")
}

/// Renewable following a profile of the same name in lower case.
pub fn renewable(name: &str, capacity: f64) -> Technology {
    Technology::new(name, Category::Renewable, capacity).with_profile(name.to_lowercase())
}

/// Lossless, uncapped storage starting at `initial` (fraction of capacity).
pub fn lossless_storage(name: &str, capacity: f64, initial: f64) -> Technology {
    Technology::new(name, Category::Storage, capacity).with_storage(StorageParams {
        initial,
        ..StorageParams::default()
    })
}

/// Generator with an operating envelope.
pub fn generator(name: &str, capacity: f64, min: f64, max: f64) -> Technology {
    Technology::new(name, Category::Generator, capacity).with_envelope(min, max)
}

/// Builds a scenario with rank-derived orders and a default context.
pub fn scenario(techs: Vec<Technology>, profiles: HourlyProfiles) -> Scenario {
    Scenario::new(techs, profiles, None, None, ScenarioContext::default()).unwrap()
}

/// Builds a scenario with explicit orders and hourly detail on.
pub fn ordered_scenario(
    techs: Vec<Technology>,
    profiles: HourlyProfiles,
    merit: &[&str],
    dispatch: &[&str],
) -> Scenario {
    let merit: Vec<String> = merit.iter().map(|s| s.to_string()).collect();
    let dispatch: Vec<String> = dispatch.iter().map(|s| s.to_string()).collect();
    Scenario::new(
        techs,
        profiles,
        Some(merit.as_slice()),
        Some(dispatch.as_slice()),
        ScenarioContext {
            detail: true,
            ..ScenarioContext::default()
        },
    )
    .unwrap()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
