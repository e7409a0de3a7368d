//! Energy balance simulator: the hour-major dispatch loop.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, warn};

use crate::tech::{Category, GeneratorRule, HOURS_PER_YEAR, HourlyProfiles, StorageUnit, Technology};

use super::clock::Clock;
use super::scenario::Scenario;
use super::types::{EnergyBalance, HourRecord, ScenarioContext, TechTotals};

/// A renewable with its availability precomputed for the whole year.
struct RenewableSlot {
    index: usize,
    available: Vec<f64>,
}

enum Controller {
    Storage(StorageUnit),
    Generator(GeneratorRule),
}

/// A storage unit or generator at its dispatch-order position.
struct DispatchSlot {
    index: usize,
    controller: Controller,
}

/// Simulation engine for one run.
///
/// Owns the per-run state (storage units and running totals) and walks the
/// year hour by hour. Within an hour technologies act strictly in merit
/// order, then dispatch order; each sees the residual left by the ones
/// before it.
pub struct Engine {
    load_name: String,
    load: Vec<f64>,
    /// Load minus renewable availability, read by storage look-ahead.
    projected: Vec<f64>,
    renewables: Vec<RenewableSlot>,
    dispatch: Vec<DispatchSlot>,
    totals: Vec<TechTotals>,
    detail: bool,
}

impl Engine {
    /// Prepares a run.
    ///
    /// # Arguments
    ///
    /// * `scenario` - Validated scenario supplying order and profiles
    /// * `overrides` - Records that replace the scenario's own by name
    /// * `context` - Scalar context for this run
    pub fn new(
        scenario: &Scenario,
        overrides: &BTreeMap<String, Technology>,
        context: &ScenarioContext,
    ) -> Self {
        let order = scenario.order();
        let profiles = scenario.profiles();

        let load = match scenario.record(overrides, &order.load) {
            Some(tech) => load_series(tech, profiles),
            None => vec![0.0; HOURS_PER_YEAR],
        };

        let mut totals = Vec::new();
        let mut renewables = Vec::new();
        let mut dispatch = Vec::new();
        for name in order.iter() {
            let Some(tech) = scenario.record(overrides, name) else {
                continue;
            };
            let index = totals.len();
            totals.push(TechTotals::new(&tech.name, tech.category, tech.effective_capacity()));
            if tech.effective_capacity() <= 0.0 {
                continue;
            }
            match tech.category {
                Category::Renewable => renewables.push(RenewableSlot {
                    index,
                    available: availability(tech, profiles),
                }),
                Category::Storage => dispatch.push(DispatchSlot {
                    index,
                    controller: Controller::Storage(StorageUnit::new(tech)),
                }),
                Category::Generator => dispatch.push(DispatchSlot {
                    index,
                    controller: Controller::Generator(GeneratorRule::new(tech)),
                }),
                Category::Load => {}
            }
        }

        let projected = load
            .iter()
            .enumerate()
            .map(|(h, l)| l - renewables.iter().map(|r| r.available[h]).sum::<f64>())
            .collect();

        Self {
            load_name: order.load.clone(),
            load,
            projected,
            renewables,
            dispatch,
            totals,
            detail: context.detail,
        }
    }

    /// Simulates one hour.
    ///
    /// Must be called for hours in increasing order.
    pub fn step(&mut self, hour: usize) -> HourRecord {
        let load = self.load[hour];
        let mut residual = load;
        let mut renewable_spill = 0.0;
        let mut rec = HourRecord {
            hour,
            load,
            outputs: if self.detail {
                vec![0.0; self.totals.len()]
            } else {
                Vec::new()
            },
            ..HourRecord::default()
        };

        for slot in &self.renewables {
            let available = slot.available[hour];
            let delivered = available.min(residual.max(0.0));
            renewable_spill += available - delivered;
            residual -= available;

            self.totals[slot.index].record(available, delivered);
            rec.renewable_to_load += delivered;
            rec.output += available;
            if self.detail {
                rec.outputs[slot.index] = available;
            }
        }

        for slot in &mut self.dispatch {
            match &mut slot.controller {
                Controller::Storage(unit) => {
                    let flow = unit.step(hour, residual, &self.projected);
                    residual += flow.charged - flow.delivered;

                    self.totals[slot.index].record(flow.delivered, flow.delivered);
                    rec.storage_charge += flow.charged;
                    rec.storage_to_load += flow.delivered;
                    rec.output += flow.delivered;
                    if self.detail {
                        rec.outputs[slot.index] = flow.delivered - flow.charged;
                    }
                }
                Controller::Generator(rule) => {
                    let output = rule.dispatch(residual);
                    let to_load = output.min(residual.max(0.0));
                    residual -= output;

                    self.totals[slot.index].record(output, to_load);
                    rec.generator_to_load += to_load;
                    rec.output += output;
                    if self.detail {
                        rec.outputs[slot.index] = output;
                    }
                }
            }
        }

        rec.shortfall = residual.max(0.0);
        rec.surplus = (-residual).max(0.0);
        // storage absorbs renewable spill before must-run spill
        rec.curtailment = (renewable_spill - rec.storage_charge)
            .max(0.0)
            .min(rec.surplus);
        rec
    }

    /// Runs every hour of the year and returns the balance record.
    pub fn run(mut self) -> EnergyBalance {
        let start = Instant::now();
        let mut clock = Clock::year();
        let mut hours = Vec::with_capacity(HOURS_PER_YEAR);
        while let Some(hour) = clock.tick() {
            hours.push(self.step(hour));
        }

        for slot in &self.dispatch {
            if let Controller::Storage(unit) = &slot.controller {
                self.totals[slot.index].storage = Some(*unit.stats());
            }
        }
        for t in &self.totals {
            debug!(
                technology = %t.name,
                generation = t.generation,
                to_meet_load = t.to_meet_load,
                max_hour = t.max_hour,
                "technology totals"
            );
        }

        let columns = if self.detail {
            self.totals.iter().map(|t| t.name.clone()).collect()
        } else {
            Vec::new()
        };
        EnergyBalance {
            load_name: self.load_name,
            hours,
            technologies: self.totals,
            columns,
            elapsed: start.elapsed(),
        }
    }
}

fn load_series(tech: &Technology, profiles: &HourlyProfiles) -> Vec<f64> {
    match tech.profile.as_deref().and_then(|p| profiles.get(p)) {
        Some(series) => series.iter().map(|v| v * tech.multiplier).collect(),
        None => vec![0.0; HOURS_PER_YEAR],
    }
}

/// Hourly availability of a renewable: profile × multiplier, or constant
/// capacity × multiplier when it has no usable profile.
fn availability(tech: &Technology, profiles: &HourlyProfiles) -> Vec<f64> {
    match tech.profile.as_deref() {
        Some(name) => match profiles.get(name) {
            Some(series) => series.iter().map(|v| v * tech.multiplier).collect(),
            None => {
                warn!(
                    technology = %tech.name,
                    profile = name,
                    "profile missing; using constant output"
                );
                vec![tech.effective_capacity(); HOURS_PER_YEAR]
            }
        },
        None => vec![tech.effective_capacity(); HOURS_PER_YEAR],
    }
}
