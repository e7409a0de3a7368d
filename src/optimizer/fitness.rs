//! Fitness signals: penalized system LCOE and the multi-objective weight.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::economics::SystemSummary;
use crate::sim::RunMetadata;

/// Metrics a multi-objective target can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// System LCOE.
    Lcoe,
    /// Percentage of load met.
    LoadPct,
    /// Surplus as a percentage of load.
    SurplusPct,
    /// Renewable share of energy served, in percent.
    RePct,
    /// Total annual cost.
    Cost,
    /// Total annual emissions.
    Co2,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Lcoe,
        Metric::LoadPct,
        Metric::SurplusPct,
        Metric::RePct,
        Metric::Cost,
        Metric::Co2,
    ];
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.to_string() == s)
            .ok_or_else(|| format!("unknown metric \"{s}\""))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Metric::Lcoe => "lcoe",
            Metric::LoadPct => "load_pct",
            Metric::SurplusPct => "surplus_pct",
            Metric::RePct => "re_pct",
            Metric::Cost => "cost",
            Metric::Co2 => "co2",
        };
        f.write_str(s)
    }
}

/// Weight and bounds for one metric.
///
/// A negative bound is discovered from the starting population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Target {
    pub weight: f64,
    pub better: f64,
    pub worse: f64,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            weight: 0.0,
            better: 0.0,
            worse: -1.0,
        }
    }
}

impl Target {
    /// Distance of `value` from the better bound, in `[0, 2]`.
    ///
    /// 0 at or beyond the better bound, 2 beyond the worse bound, linear in
    /// between. Equal bounds score 0 on an exact match and 1 otherwise.
    pub fn normalise(&self, value: f64) -> f64 {
        if self.better == self.worse {
            return if value == self.better { 0.0 } else { 1.0 };
        }
        let t = (value - self.better) / (self.worse - self.better);
        if t <= 0.0 {
            0.0
        } else if t > 1.0 {
            2.0
        } else {
            t
        }
    }

    /// Whether either bound still has to be discovered.
    pub fn needs_discovery(&self) -> bool {
        self.better < 0.0 || self.worse < 0.0
    }
}

/// Metric values of one evaluated capacity mix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricValues {
    pub lcoe: f64,
    pub load_pct: f64,
    pub surplus_pct: f64,
    pub re_pct: f64,
    pub cost: f64,
    pub co2: f64,
}

impl MetricValues {
    /// Extracts the metric values from a costed run.
    pub fn from_run(summary: &SystemSummary, metadata: &RunMetadata) -> Self {
        Self {
            lcoe: summary.lcoe,
            load_pct: metadata.load_pct,
            surplus_pct: metadata.surplus_pct,
            re_pct: metadata.re_pct,
            cost: summary.annual_cost,
            co2: summary.emissions,
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Lcoe => self.lcoe,
            Metric::LoadPct => self.load_pct,
            Metric::SurplusPct => self.surplus_pct,
            Metric::RePct => self.re_pct,
            Metric::Cost => self.cost,
            Metric::Co2 => self.co2,
        }
    }
}

/// Multi-objective targets keyed by metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Target>",
    into = "BTreeMap<String, Target>"
)]
pub struct Targets(pub BTreeMap<Metric, Target>);

impl TryFrom<BTreeMap<String, Target>> for Targets {
    type Error = String;

    fn try_from(raw: BTreeMap<String, Target>) -> Result<Self, Self::Error> {
        raw.into_iter()
            .map(|(key, target)| Ok((key.parse::<Metric>()?, target)))
            .collect::<Result<_, String>>()
            .map(Targets)
    }
}

impl From<Targets> for BTreeMap<String, Target> {
    fn from(targets: Targets) -> Self {
        targets.0.into_iter().map(|(m, t)| (m.to_string(), t)).collect()
    }
}

impl Targets {
    pub fn get(&self, metric: Metric) -> Option<&Target> {
        self.0.get(&metric)
    }

    /// Weighted sum of normalised distances; lower is better.
    ///
    /// Metrics with a non-positive weight are ignored.
    pub fn weight(&self, values: &MetricValues) -> f64 {
        self.0
            .iter()
            .filter(|(_, t)| t.weight > 0.0)
            .map(|(m, t)| t.normalise(values.get(*m)) * t.weight)
            .sum()
    }

    /// Fills negative bounds with the largest value observed in `samples`.
    pub fn discover_bounds(&mut self, samples: &[MetricValues]) {
        for (metric, target) in self.0.iter_mut() {
            if !target.needs_discovery() {
                continue;
            }
            let observed = samples
                .iter()
                .map(|v| v.get(*metric))
                .fold(0.0, f64::max);
            if target.better < 0.0 {
                target.better = observed;
            }
            if target.worse < 0.0 {
                target.worse = observed;
            }
        }
    }

    /// Load-met floor for the LCOE penalty, taken from the `load_pct` worse bound.
    pub fn load_floor(&self) -> Option<f64> {
        self.get(Metric::LoadPct)
            .map(|t| t.worse)
            .filter(|w| *w > 0.0)
    }
}

/// System LCOE, penalized when load met falls below `load_floor`.
///
/// Below the floor the score is `lcoe^(floor / achieved)`; a run that
/// meets no load at all scores 1.
pub fn lcoe_fitness(values: &MetricValues, load_floor: Option<f64>) -> f64 {
    match load_floor {
        Some(floor) if values.load_pct < floor => {
            if values.load_pct <= 0.0 {
                1.0
            } else {
                values.lcoe.powf(floor / values.load_pct)
            }
        }
        _ => values.lcoe,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(better: f64, worse: f64) -> Target {
        Target {
            weight: 1.0,
            better,
            worse,
        }
    }

    #[test]
    fn normalise_lower_is_better() {
        let t = target(50.0, 150.0);
        assert_eq!(t.normalise(40.0), 0.0);
        assert_eq!(t.normalise(100.0), 0.5);
        assert_eq!(t.normalise(200.0), 2.0);
    }

    #[test]
    fn normalise_higher_is_better() {
        let t = target(100.0, 80.0);
        assert_eq!(t.normalise(100.0), 0.0);
        assert_eq!(t.normalise(90.0), 0.5);
        assert_eq!(t.normalise(70.0), 2.0);
    }

    #[test]
    fn normalise_exact_target() {
        let t = target(10.0, 10.0);
        assert_eq!(t.normalise(10.0), 0.0);
        assert_eq!(t.normalise(11.0), 1.0);
    }

    #[test]
    fn weight_ignores_unweighted_metrics() {
        let mut map = BTreeMap::new();
        map.insert(Metric::Lcoe, target(50.0, 150.0));
        map.insert(
            Metric::Co2,
            Target {
                weight: 0.0,
                ..target(0.0, 1.0)
            },
        );
        let targets = Targets(map);
        let values = MetricValues {
            lcoe: 100.0,
            co2: 1e9,
            ..MetricValues::default()
        };
        assert_eq!(targets.weight(&values), 0.5);
    }

    #[test]
    fn bounds_discovered_from_samples() {
        let mut map = BTreeMap::new();
        map.insert(Metric::Cost, target(0.0, -1.0));
        let mut targets = Targets(map);
        let samples = [
            MetricValues {
                cost: 10.0,
                ..MetricValues::default()
            },
            MetricValues {
                cost: 30.0,
                ..MetricValues::default()
            },
        ];
        targets.discover_bounds(&samples);
        assert_eq!(targets.get(Metric::Cost).unwrap().worse, 30.0);
    }

    #[test]
    fn lcoe_penalty_below_floor() {
        let values = MetricValues {
            lcoe: 2.0,
            load_pct: 50.0,
            ..MetricValues::default()
        };
        assert_eq!(lcoe_fitness(&values, Some(100.0)), 4.0);
        assert_eq!(lcoe_fitness(&values, Some(40.0)), 2.0);
        assert_eq!(lcoe_fitness(&values, None), 2.0);

        let nothing = MetricValues {
            lcoe: 5.0,
            load_pct: 0.0,
            ..MetricValues::default()
        };
        assert_eq!(lcoe_fitness(&nothing, Some(90.0)), 1.0);
    }

    #[test]
    fn unknown_metric_is_rejected() {
        assert!("lcoe".parse::<Metric>().is_ok());
        assert!("price".parse::<Metric>().is_err());
    }

    #[test]
    fn targets_parse_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            targets: Targets,
        }
        let w: Wrapper = toml::from_str(
            r#"
[targets.lcoe]
weight = 1.0
better = 40.0
worse = 120.0

[targets.load_pct]
weight = 2.0
better = 100.0
worse = 90.0
"#,
        )
        .unwrap();
        assert_eq!(w.targets.load_floor(), Some(90.0));
        assert_eq!(w.targets.get(Metric::Lcoe).unwrap().better, 40.0);
    }
}
