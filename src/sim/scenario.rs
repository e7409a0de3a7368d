//! A validated scenario: technology records, profiles, order and context.

use std::collections::BTreeMap;

use crate::error::{SimError, SimResult};
use crate::tech::{Category, HourlyProfiles, Technology};

use super::engine::Engine;
use super::order::DispatchOrder;
use super::types::{EnergyBalance, ScenarioContext};

/// Everything the simulator needs, checked for fatal errors up front.
///
/// Once built, a `Scenario` can be simulated any number of times; the
/// optimizer runs it with private copies of the technology records.
#[derive(Debug, Clone)]
pub struct Scenario {
    technologies: BTreeMap<String, Technology>,
    profiles: HourlyProfiles,
    order: DispatchOrder,
    context: ScenarioContext,
}

impl Scenario {
    /// Validates inputs and resolves the processing order.
    ///
    /// # Errors
    ///
    /// Returns a [`SimError`] for invalid records, duplicate names, order
    /// problems, or a load without a profile.
    pub fn new(
        technologies: Vec<Technology>,
        profiles: HourlyProfiles,
        merit_order: Option<&[String]>,
        dispatch_order: Option<&[String]>,
        context: ScenarioContext,
    ) -> SimResult<Self> {
        let mut map = BTreeMap::new();
        for tech in technologies {
            let tech = tech.normalized()?;
            if map.contains_key(&tech.name) {
                return Err(SimError::InvalidTechnology {
                    name: tech.name,
                    reason: "defined more than once".to_string(),
                });
            }
            map.insert(tech.name.clone(), tech);
        }

        let order = DispatchOrder::resolve(&map, merit_order, dispatch_order)?;
        let load = map
            .get(&order.load)
            .filter(|t| t.category == Category::Load)
            .ok_or(SimError::MissingLoad)?;
        match &load.profile {
            Some(p) if profiles.contains(p) => {}
            Some(p) => return Err(SimError::MissingLoadProfile { profile: p.clone() }),
            None => {
                return Err(SimError::MissingLoadProfile {
                    profile: String::new(),
                });
            }
        }

        Ok(Self {
            technologies: map,
            profiles,
            order,
            context,
        })
    }

    pub fn technologies(&self) -> &BTreeMap<String, Technology> {
        &self.technologies
    }

    pub fn profiles(&self) -> &HourlyProfiles {
        &self.profiles
    }

    pub fn order(&self) -> &DispatchOrder {
        &self.order
    }

    pub fn context(&self) -> &ScenarioContext {
        &self.context
    }

    /// Returns a copy with a different context.
    pub fn with_context(&self, context: ScenarioContext) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }

    /// Runs the full year with the scenario's own records.
    pub fn simulate(&self) -> EnergyBalance {
        self.simulate_with(&self.technologies, &self.context)
    }

    /// Runs the full year with substitute records and context.
    ///
    /// Records missing from `technologies` fall back to the scenario's own.
    pub fn simulate_with(
        &self,
        technologies: &BTreeMap<String, Technology>,
        context: &ScenarioContext,
    ) -> EnergyBalance {
        Engine::new(self, technologies, context).run()
    }

    /// Looks up a record, preferring `overrides`.
    pub(crate) fn record<'a>(
        &'a self,
        overrides: &'a BTreeMap<String, Technology>,
        name: &str,
    ) -> Option<&'a Technology> {
        overrides.get(name).or_else(|| self.technologies.get(name))
    }
}
