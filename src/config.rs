//! TOML-based scenario configuration and preset definitions.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::SimResult;
use crate::optimizer::{CapacityRange, Metric, OptimizerSettings, Target, Targets};
use crate::sim::{Scenario, ScenarioContext};
use crate::tech::profile::{self, HOURS_PER_YEAR};
use crate::tech::{Category, CostParams, HourlyProfiles, StorageParams, Technology};

/// Top-level scenario configuration parsed from TOML.
///
/// Every table is optional in the file, but a usable scenario needs one
/// `load` technology and a profile for it. Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or start from [`ScenarioConfig::baseline`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Scalar context shared by every technology.
    #[serde(default)]
    pub context: ScenarioContext,
    /// Technology records, one `[[technology]]` table each.
    #[serde(default, rename = "technology")]
    pub technologies: Vec<Technology>,
    /// Named hourly series.
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileSpec>,
    /// Explicit renewable order; derived from ranks when absent.
    #[serde(default)]
    pub merit_order: Option<Vec<String>>,
    /// Explicit storage/generator order; derived from ranks when absent.
    #[serde(default)]
    pub dispatch_order: Option<Vec<String>>,
    #[serde(default)]
    pub optimizer: OptimizerSettings,
}

/// How one hourly series is produced.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase", deny_unknown_fields)]
pub enum ProfileSpec {
    /// The same value every hour.
    Flat { value: f64 },
    /// Daily sinusoid with Gaussian noise.
    Diurnal {
        base: f64,
        amplitude: f64,
        #[serde(default)]
        phase_rad: f64,
        #[serde(default)]
        noise_std: f64,
        #[serde(default)]
        seed: u64,
    },
    /// Daylight curve between `sunrise` and `sunset` hours.
    Solar {
        peak: f64,
        sunrise: usize,
        sunset: usize,
        #[serde(default)]
        noise_std: f64,
        #[serde(default)]
        seed: u64,
    },
    /// Explicit values; `repeat` tiles a shorter pattern over the year.
    Values {
        values: Vec<f64>,
        #[serde(default)]
        repeat: bool,
    },
}

impl ProfileSpec {
    /// Adds the series described by `self` to `profiles` under `name`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::ProfileTooShort` for a non-repeating value list
    /// shorter than a year, or an empty one.
    pub fn insert_into(&self, profiles: &mut HourlyProfiles, name: &str) -> SimResult<()> {
        match self {
            ProfileSpec::Flat { value } => profiles.insert(name, profile::flat(*value)),
            ProfileSpec::Diurnal {
                base,
                amplitude,
                phase_rad,
                noise_std,
                seed,
            } => profiles.insert(
                name,
                profile::diurnal(*base, *amplitude, *phase_rad, *noise_std, *seed),
            ),
            ProfileSpec::Solar {
                peak,
                sunrise,
                sunset,
                noise_std,
                seed,
            } => profiles.insert(
                name,
                profile::solar(*peak, *sunrise, *sunset, *noise_std, *seed),
            ),
            ProfileSpec::Values { values, repeat: true } => profiles.insert_tiled(name, values),
            ProfileSpec::Values { values, repeat: false } => profiles.insert(name, values.clone()),
        }
    }

    fn seed_mut(&mut self) -> Option<&mut u64> {
        match self {
            ProfileSpec::Diurnal { seed, .. } | ProfileSpec::Solar { seed, .. } => Some(seed),
            ProfileSpec::Flat { .. } | ProfileSpec::Values { .. } => None,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"optimizer.mutation"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn cost(capex: f64, fixed_om: f64, variable_om: f64, fuel: f64, emissions: f64) -> CostParams {
    CostParams {
        capex,
        fixed_om,
        variable_om,
        fuel,
        emissions,
        lifetime: 25.0,
        ..CostParams::default()
    }
}

fn battery(capacity: f64) -> Technology {
    Technology::new("Battery", Category::Storage, capacity)
        .with_order(1)
        .with_envelope(0.1, 1.0)
        .with_storage(StorageParams {
            initial: 0.5,
            recharge_max: Some(0.25),
            recharge_loss: 0.08,
            discharge_max: Some(0.25),
            discharge_loss: 0.08,
            parasitic_loss: 0.01,
            ..StorageParams::default()
        })
        .with_cost(CostParams {
            lifetime: 15.0,
            ..cost(400_000.0, 8_000.0, 0.0, 0.0, 0.0)
        })
}

fn gas(capacity: f64) -> Technology {
    Technology::new("Gas", Category::Generator, capacity)
        .with_order(2)
        .with_cost(cost(900_000.0, 15_000.0, 4.0, 45.0, 0.45))
}

fn range_targets() -> Targets {
    let mut map = BTreeMap::new();
    map.insert(
        Metric::Lcoe,
        Target {
            weight: 1.0,
            better: 0.0,
            worse: -1.0,
        },
    );
    map.insert(
        Metric::LoadPct,
        Target {
            weight: 2.0,
            better: 100.0,
            worse: 95.0,
        },
    );
    Targets(map)
}

impl ScenarioConfig {
    /// Returns the baseline scenario: wind and solar, a battery and gas backup.
    pub fn baseline() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "demand".to_string(),
            ProfileSpec::Diurnal {
                base: 500.0,
                amplitude: 120.0,
                phase_rad: 4.2,
                noise_std: 15.0,
                seed: 42,
            },
        );
        profiles.insert(
            "wind".to_string(),
            ProfileSpec::Diurnal {
                base: 140.0,
                amplitude: 60.0,
                phase_rad: 1.0,
                noise_std: 40.0,
                seed: 43,
            },
        );
        profiles.insert(
            "solar".to_string(),
            ProfileSpec::Solar {
                peak: 300.0,
                sunrise: 6,
                sunset: 18,
                noise_std: 0.1,
                seed: 44,
            },
        );

        let mut ranges = BTreeMap::new();
        ranges.insert("Wind".to_string(), CapacityRange::range(0.0, 1200.0, 100.0));
        ranges.insert("Solar".to_string(), CapacityRange::range(0.0, 900.0, 100.0));
        ranges.insert("Battery".to_string(), CapacityRange::discrete(vec![100.0, 200.0, 400.0, 800.0]));
        ranges.insert("Gas".to_string(), CapacityRange::range(200.0, 800.0, 100.0));

        Self {
            context: ScenarioContext {
                carbon_price: 25.0,
                discount_rate: 0.06,
                ..ScenarioContext::default()
            },
            technologies: vec![
                Technology::new("Demand", Category::Load, 0.0).with_profile("demand"),
                Technology::new("Wind", Category::Renewable, 400.0)
                    .with_profile("wind")
                    .with_cost(cost(1_500_000.0, 40_000.0, 0.0, 0.0, 0.0)),
                Technology::new("Solar", Category::Renewable, 300.0)
                    .with_order(1)
                    .with_profile("solar")
                    .with_cost(cost(1_000_000.0, 18_000.0, 0.0, 0.0, 0.0)),
                battery(400.0),
                gas(600.0),
            ],
            profiles,
            merit_order: None,
            dispatch_order: None,
            optimizer: OptimizerSettings {
                ranges,
                targets: range_targets(),
                ..OptimizerSettings::default()
            },
        }
    }

    /// Returns the high-renewables preset: more than twice the wind and
    /// solar of the baseline with a large battery and reduced gas.
    pub fn high_renewables() -> Self {
        let mut cfg = Self::baseline();
        cfg.profiles.insert(
            "wind".to_string(),
            ProfileSpec::Diurnal {
                base: 315.0,
                amplitude: 135.0,
                phase_rad: 1.0,
                noise_std: 90.0,
                seed: 43,
            },
        );
        cfg.profiles.insert(
            "solar".to_string(),
            ProfileSpec::Solar {
                peak: 800.0,
                sunrise: 6,
                sunset: 18,
                noise_std: 0.1,
                seed: 44,
            },
        );
        for tech in &mut cfg.technologies {
            match tech.name.as_str() {
                "Wind" => tech.capacity = 900.0,
                "Solar" => tech.capacity = 800.0,
                "Battery" => tech.capacity = 1200.0,
                "Gas" => tech.capacity = 300.0,
                _ => {}
            }
        }
        cfg
    }

    /// Returns the firmed preset: the baseline plus a must-run nuclear unit
    /// and pumped hydro with a minimum run time.
    pub fn firmed() -> Self {
        let mut cfg = Self::baseline();
        cfg.technologies.push(
            Technology::new("Nuclear", Category::Generator, 200.0)
                .with_envelope(0.6, 1.0)
                .with_cost(CostParams {
                    lifetime: 60.0,
                    ..cost(6_000_000.0, 120_000.0, 2.0, 8.0, 0.0)
                }),
        );
        cfg.technologies.push(
            Technology::new("Pumped Hydro", Category::Storage, 1500.0)
                .with_order(1)
                .with_storage(StorageParams {
                    initial: 0.3,
                    recharge_max: Some(0.1),
                    recharge_loss: 0.1,
                    discharge_max: Some(0.1),
                    discharge_loss: 0.1,
                    min_runtime: 3,
                    warm_time: 10.0,
                    ..StorageParams::default()
                })
                .with_cost(CostParams {
                    lifetime: 50.0,
                    ..cost(1_200_000.0, 10_000.0, 0.5, 0.0, 0.0)
                }),
        );
        cfg.dispatch_order = Some(vec![
            "Nuclear".to_string(),
            "Battery".to_string(),
            "Pumped Hydro".to_string(),
            "Gas".to_string(),
        ]);
        cfg.optimizer
            .ranges
            .insert("Nuclear".to_string(), CapacityRange::range(200.0, 200.0, 0.0));
        cfg.optimizer
            .ranges
            .insert("Pumped Hydro".to_string(), CapacityRange::range(0.0, 3000.0, 500.0));
        cfg
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "high_renewables", "firmed"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "high_renewables" => Ok(Self::high_renewables()),
            "firmed" => Ok(Self::firmed()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Reseeds the optimizer and every synthetic profile.
    ///
    /// Profiles get `seed + i` in name order so they stay independent.
    pub fn apply_seed(&mut self, seed: u64) {
        self.optimizer.seed = seed;
        for (i, spec) in self.profiles.values_mut().enumerate() {
            if let Some(s) = spec.seed_mut() {
                *s = seed.wrapping_add(i as u64);
            }
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut names = BTreeSet::new();
        let mut loads = Vec::new();

        for (i, tech) in self.technologies.iter().enumerate() {
            let field = |name: &str| format!("technology[{i}].{name}");
            let name = tech.name.trim();
            if name.is_empty() {
                errors.push(ConfigError::new(field("name"), "must not be empty"));
            } else if !names.insert(name.to_string()) {
                errors.push(ConfigError::new(field("name"), format!("duplicate name \"{name}\"")));
            }
            if tech.capacity < 0.0 {
                errors.push(ConfigError::new(field("capacity"), "must be >= 0"));
            }
            if tech.multiplier < 0.0 {
                errors.push(ConfigError::new(field("multiplier"), "must be >= 0"));
            }
            if tech.capacity_min > tech.capacity_max {
                errors.push(ConfigError::new(field("capacity_min"), "must be <= capacity_max"));
            }
            for (label, loss) in [
                ("storage.recharge_loss", tech.storage.recharge_loss),
                ("storage.discharge_loss", tech.storage.discharge_loss),
                ("storage.parasitic_loss", tech.storage.parasitic_loss),
            ] {
                if !(0.0..1.0).contains(&loss) {
                    errors.push(ConfigError::new(field(label), "must be in [0.0, 1.0)"));
                }
            }
            if tech.category == Category::Load {
                loads.push(tech);
            }
        }

        match loads.as_slice() {
            [] => errors.push(ConfigError::new("technology", "a load technology is required")),
            [load] => match &load.profile {
                Some(p) if self.profiles.contains_key(p) => {}
                Some(p) => errors.push(ConfigError::new(
                    "technology.profile",
                    format!("load profile \"{p}\" is not defined in [profiles]"),
                )),
                None => errors.push(ConfigError::new(
                    "technology.profile",
                    format!("load \"{}\" needs a profile", load.name),
                )),
            },
            _ => errors.push(ConfigError::new("technology", "only one load technology is allowed")),
        }

        for (name, spec) in &self.profiles {
            let field = |key: &str| format!("profiles.{name}.{key}");
            match spec {
                ProfileSpec::Values { values, repeat } => {
                    if values.is_empty() {
                        errors.push(ConfigError::new(field("values"), "must not be empty"));
                    } else if !repeat && values.len() < HOURS_PER_YEAR {
                        errors.push(ConfigError::new(
                            field("values"),
                            format!(
                                "has {} values, needs {HOURS_PER_YEAR} (or set repeat = true)",
                                values.len()
                            ),
                        ));
                    }
                }
                ProfileSpec::Solar { sunrise, sunset, .. } => {
                    if sunrise >= sunset {
                        errors.push(ConfigError::new(field("sunrise"), "must be < sunset"));
                    }
                    if *sunset > 24 {
                        errors.push(ConfigError::new(field("sunset"), "must be <= 24"));
                    }
                }
                ProfileSpec::Flat { .. } | ProfileSpec::Diurnal { .. } => {}
            }
        }

        for (key, list) in [
            ("merit_order", &self.merit_order),
            ("dispatch_order", &self.dispatch_order),
        ] {
            for name in list.iter().flatten() {
                if !names.contains(name.as_str()) {
                    errors.push(ConfigError::new(key, format!("unknown technology \"{name}\"")));
                }
            }
        }

        let opt = &self.optimizer;
        if opt.population < 2 {
            errors.push(ConfigError::new("optimizer.population", "must be >= 2"));
        }
        if !(0.0..=1.0).contains(&opt.mutation) {
            errors.push(ConfigError::new("optimizer.mutation", "must be in [0.0, 1.0]"));
        }
        if opt.load_multiplier <= 0.0 {
            errors.push(ConfigError::new("optimizer.load_multiplier", "must be > 0"));
        }
        for name in opt.ranges.keys() {
            if !names.contains(name.as_str()) {
                errors.push(ConfigError::new(
                    format!("optimizer.ranges.{name}"),
                    "unknown technology",
                ));
            }
        }
        for (metric, target) in &opt.targets.0 {
            if target.weight < 0.0 {
                errors.push(ConfigError::new(
                    format!("optimizer.targets.{metric}.weight"),
                    "must be >= 0",
                ));
            }
        }

        errors
    }

    /// Materializes profiles and builds the validated [`Scenario`].
    ///
    /// # Errors
    ///
    /// Returns a [`SimError`](crate::error::SimError) for profile, record
    /// or order problems.
    pub fn build_scenario(&self) -> SimResult<Scenario> {
        let mut profiles = HourlyProfiles::new();
        for (name, spec) in &self.profiles {
            spec.insert_into(&mut profiles, name)?;
        }
        Scenario::new(
            self.technologies.clone(),
            profiles,
            self.merit_order.as_deref(),
            self.dispatch_order.as_deref(),
            self.context.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::optimizer::{Approach, Choice};

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
        }
    }

    #[test]
    fn high_renewables_has_more_wind() {
        let base = ScenarioConfig::baseline();
        let high = ScenarioConfig::high_renewables();
        let cap = |c: &ScenarioConfig, n: &str| {
            c.technologies.iter().find(|t| t.name == n).map(|t| t.capacity)
        };
        assert!(cap(&high, "Wind") > cap(&base, "Wind"));
        assert!(cap(&high, "Gas") < cap(&base, "Gas"));
    }

    #[test]
    fn firmed_builds_with_explicit_dispatch_order() {
        let scenario = ScenarioConfig::firmed().build_scenario().unwrap();
        assert_eq!(
            scenario.order().dispatch,
            vec!["Nuclear", "Battery", "Pumped Hydro", "Gas"]
        );
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
merit_order = ["Wind"]
dispatch_order = ["Battery", "Gas"]

[context]
carbon_price = 30.0
discount_rate = 0.05
shortfall_sign = "positive"
detail = true

[[technology]]
name = "Demand"
category = "load"
profile = "demand"

[[technology]]
name = "Wind"
category = "renewable"
capacity = 100.0
profile = "wind"

[technology.cost]
capex = 1500000.0
lifetime = 25.0

[[technology]]
name = "Battery"
category = "storage"
capacity = 50.0

[technology.storage]
initial = 0.5
recharge_max = 0.25
min_runtime = 2

[[technology]]
name = "Gas"
category = "generator"
capacity = 200.0
capacity_min = 0.2

[profiles.demand]
shape = "flat"
value = 80.0

[profiles.wind]
shape = "values"
values = [10.0, 50.0, 90.0]
repeat = true

[optimizer]
population = 10
generations = 3
choice = "both"

[optimizer.ranges.Wind]
approach = "range"
min = 0.0
max = 300.0
step = 50.0

[optimizer.ranges.Battery]
approach = "discrete"
capacities = [25.0, 50.0]

[optimizer.targets.load_pct]
weight = 1.0
better = 100.0
worse = 90.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
        assert_eq!(cfg.technologies.len(), 4);
        assert_eq!(cfg.technologies[2].storage.min_runtime, 2);
        assert_eq!(cfg.context.carbon_price, 30.0);
        assert_eq!(cfg.optimizer.choice, Choice::Both);
        assert_eq!(cfg.optimizer.ranges["Battery"].approach, Approach::Discrete);
        assert_eq!(cfg.optimizer.targets.load_floor(), Some(90.0));

        let scenario = cfg.build_scenario().unwrap();
        let wind = scenario.profiles().get("wind").unwrap();
        assert_eq!(wind.len(), HOURS_PER_YEAR);
        assert_eq!(&wind[..4], &[10.0, 50.0, 90.0, 10.0]);
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[context]
carbon_price = 1.0
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn unknown_profile_shape_rejected() {
        let toml = r#"
[profiles.x]
shape = "triangle"
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = ScenarioConfig::from_toml_str("[context]\ncarbon_price = 5.0\n").unwrap();
        assert_eq!(cfg.context.carbon_price, 5.0);
        assert_eq!(cfg.optimizer.population, OptimizerSettings::default().population);
        assert!(cfg.technologies.is_empty());
    }

    #[test]
    fn validation_requires_one_load() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.technologies.retain(|t| t.category != Category::Load);
        assert!(cfg.validate().iter().any(|e| e.field == "technology"));

        let mut cfg = ScenarioConfig::baseline();
        cfg.technologies
            .push(Technology::new("Second", Category::Load, 0.0).with_profile("demand"));
        assert!(cfg
            .validate()
            .iter()
            .any(|e| e.message.contains("only one load")));
    }

    #[test]
    fn validation_catches_duplicates_and_bad_losses() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.technologies.push(gas(10.0));
        cfg.technologies[3].storage.recharge_loss = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.message.contains("duplicate")));
        assert!(errors.iter().any(|e| e.field == "technology[3].storage.recharge_loss"));
    }

    #[test]
    fn validation_catches_short_values() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.profiles.insert(
            "demand".to_string(),
            ProfileSpec::Values {
                values: vec![1.0; 100],
                repeat: false,
            },
        );
        assert!(cfg.validate().iter().any(|e| e.field == "profiles.demand.values"));
        assert!(matches!(
            cfg.build_scenario(),
            Err(SimError::ProfileTooShort { len: 100, .. })
        ));
    }

    #[test]
    fn validation_catches_optimizer_problems() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.optimizer.mutation = 2.0;
        cfg.optimizer.population = 1;
        cfg.optimizer
            .ranges
            .insert("Ghost".to_string(), CapacityRange::range(0.0, 1.0, 1.0));
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "optimizer.mutation"));
        assert!(errors.iter().any(|e| e.field == "optimizer.population"));
        assert!(errors.iter().any(|e| e.field == "optimizer.ranges.Ghost"));
    }

    #[test]
    fn validation_catches_unknown_order_names() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.merit_order = Some(vec!["Tidal".to_string()]);
        assert!(cfg.validate().iter().any(|e| e.field == "merit_order"));
    }

    #[test]
    fn seed_override_reseeds_synthetic_profiles() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.apply_seed(7);
        assert_eq!(cfg.optimizer.seed, 7);
        let seeds: Vec<u64> = cfg
            .profiles
            .values_mut()
            .filter_map(|p| p.seed_mut().map(|s| *s))
            .collect();
        assert_eq!(seeds, vec![7, 8, 9]);
    }
}
