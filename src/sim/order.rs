//! Merit and dispatch order resolution.
//!
//! The merit order holds the load followed by renewables; the dispatch
//! order holds storage and dispatchable generators. Both are resolved and
//! checked once, before any hour is simulated.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::error::{SimError, SimResult};
use crate::tech::{Category, Technology};

/// Validated processing order for one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOrder {
    /// Load technology name.
    pub load: String,
    /// Renewables in merit order, load excluded.
    pub renewables: Vec<String>,
    /// Storage and generators in dispatch order.
    pub dispatch: Vec<String>,
}

impl DispatchOrder {
    /// Resolves the order from explicit lists, or from `order` ranks when a
    /// list is omitted.
    ///
    /// Ranks sort ascending with ties broken by name. Technologies left out
    /// of an explicit list are not dispatched.
    ///
    /// # Errors
    ///
    /// * `MissingLoad` when no load technology exists.
    /// * `UnknownTechnology` for a listed name with no record.
    /// * `DuplicateInOrder` for a name listed twice, or in both lists.
    /// * `WrongOrderList` for a category placed in the wrong list.
    /// * `InvalidTechnology` when more than one load technology exists.
    pub fn resolve(
        technologies: &BTreeMap<String, Technology>,
        merit_order: Option<&[String]>,
        dispatch_order: Option<&[String]>,
    ) -> SimResult<Self> {
        let mut loads = technologies
            .values()
            .filter(|t| t.category == Category::Load)
            .map(|t| t.name.clone());
        let load = loads.next().ok_or(SimError::MissingLoad)?;
        if let Some(extra) = loads.next() {
            return Err(SimError::InvalidTechnology {
                name: extra,
                reason: format!("only one load technology is allowed (\"{load}\" already defined)"),
            });
        }

        let mut seen = BTreeSet::new();
        let renewables = match merit_order {
            Some(names) => checked_list(technologies, names, &mut seen, |c| {
                matches!(c, Category::Load | Category::Renewable)
            })?
            .into_iter()
            .filter(|n| *n != load)
            .collect(),
            None => ranked(technologies, |c| c == Category::Renewable),
        };
        let dispatch = match dispatch_order {
            Some(names) => checked_list(technologies, names, &mut seen, Category::is_dispatchable)?,
            None => ranked(technologies, Category::is_dispatchable),
        };

        let order = Self {
            load,
            renewables,
            dispatch,
        };
        for name in technologies.keys() {
            if *name != order.load && !order.contains(name) {
                warn!(technology = %name, "technology not in merit or dispatch order; not dispatched");
            }
        }
        Ok(order)
    }

    /// Returns `true` when `name` is dispatched (load excluded).
    pub fn contains(&self, name: &str) -> bool {
        self.renewables.iter().chain(&self.dispatch).any(|n| n == name)
    }

    /// Dispatched technologies in processing order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.renewables.iter().chain(&self.dispatch).map(String::as_str)
    }
}

fn checked_list(
    technologies: &BTreeMap<String, Technology>,
    names: &[String],
    seen: &mut BTreeSet<String>,
    allowed: impl Fn(Category) -> bool,
) -> SimResult<Vec<String>> {
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let tech = technologies
            .get(name)
            .ok_or_else(|| SimError::UnknownTechnology { name: name.clone() })?;
        if !allowed(tech.category) {
            return Err(SimError::WrongOrderList {
                name: name.clone(),
                category: tech.category,
            });
        }
        if !seen.insert(name.clone()) {
            return Err(SimError::DuplicateInOrder { name: name.clone() });
        }
        out.push(name.clone());
    }
    Ok(out)
}

fn ranked(technologies: &BTreeMap<String, Technology>, keep: impl Fn(Category) -> bool) -> Vec<String> {
    let mut picked: Vec<&Technology> = technologies.values().filter(|t| keep(t.category)).collect();
    picked.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
    picked.into_iter().map(|t| t.name.clone()).collect()
}
