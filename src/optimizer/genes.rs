//! Chromosome layout and decoding.
//!
//! Each optimized technology owns a contiguous block of genes. A gene that
//! is on adds its value to the block's base capacity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::sim::DispatchOrder;
use crate::tech::Technology;

/// Number of genes for technologies without a configured range.
pub const DEFAULT_RANGE_GENES: usize = 5;

/// How candidate capacities are described for one technology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approach {
    /// A list of capacity increments, one gene each.
    Discrete,
    /// `min` plus any number of `step` increments up to `max`.
    #[default]
    Range,
}

/// Configured capacity search space for one technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacityRange {
    pub approach: Approach,
    /// Increments for the discrete approach.
    pub capacities: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for CapacityRange {
    fn default() -> Self {
        Self {
            approach: Approach::Range,
            capacities: Vec::new(),
            min: 0.0,
            max: 0.0,
            step: 0.0,
        }
    }
}

impl CapacityRange {
    /// A stepped range.
    pub fn range(min: f64, max: f64, step: f64) -> Self {
        Self {
            approach: Approach::Range,
            min,
            max,
            step,
            ..Self::default()
        }
    }

    /// A discrete set of increments.
    pub fn discrete(capacities: Vec<f64>) -> Self {
        Self {
            approach: Approach::Discrete,
            capacities,
            ..Self::default()
        }
    }
}

/// The genes owned by one technology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneBlock {
    pub technology: String,
    /// Index of the first gene in the chromosome.
    pub start: usize,
    /// Capacity added by each gene when on.
    pub values: Vec<f64>,
    /// Capacity with every gene off.
    pub base: f64,
}

impl GeneBlock {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Capacity encoded by the block's slice of `chromosome`.
    pub fn decode(&self, chromosome: &[bool]) -> f64 {
        let genes = chromosome.iter().skip(self.start).take(self.values.len());
        self.base
            + genes
                .zip(&self.values)
                .filter(|(on, _)| **on)
                .map(|(_, v)| v)
                .sum::<f64>()
    }
}

/// Mapping from chromosome positions to technology capacities.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneLayout {
    blocks: Vec<GeneBlock>,
    /// Technologies held at a fixed capacity.
    fixed: BTreeMap<String, f64>,
    len: usize,
}

impl GeneLayout {
    /// Builds the layout for every dispatched technology.
    ///
    /// Technologies without a range entry get `default_genes` genes worth
    /// one `default_genes`-th of their effective capacity each, starting
    /// from zero. Ranges that collapse to a point, or whose step is not
    /// positive, hold the technology at a fixed capacity.
    pub fn build(
        technologies: &BTreeMap<String, Technology>,
        order: &DispatchOrder,
        ranges: &BTreeMap<String, CapacityRange>,
        default_genes: usize,
    ) -> Self {
        let mut layout = Self::default();
        for name in order.iter() {
            let Some(tech) = technologies.get(name) else {
                continue;
            };
            // a profile output scales with the multiplier, not the nameplate
            if tech.capacity <= 0.0 && tech.profile.is_some() {
                warn!(technology = %name, "zero nameplate with a profile; capacity held at zero");
                layout.fixed.insert(name.to_string(), 0.0);
                continue;
            }
            match ranges.get(name) {
                Some(range) => layout.push_range(tech, range),
                None => {
                    warn!(
                        technology = %name,
                        genes = default_genes,
                        "no optimizer range; using default range"
                    );
                    let capacity = tech.effective_capacity();
                    if default_genes == 0 || capacity <= 0.0 {
                        layout.fixed.insert(name.to_string(), capacity);
                    } else {
                        let gene = capacity / default_genes as f64;
                        layout.push_block(name, vec![gene; default_genes], 0.0);
                    }
                }
            }
        }
        layout
    }

    fn push_range(&mut self, tech: &Technology, range: &CapacityRange) {
        let name = tech.name.as_str();
        match range.approach {
            Approach::Discrete => {
                let values: Vec<f64> = range.capacities.iter().copied().filter(|c| *c > 0.0).collect();
                if values.is_empty() {
                    warn!(technology = %name, "empty discrete range; capacity held fixed");
                    self.fixed.insert(name.to_string(), tech.effective_capacity());
                } else {
                    self.push_block(name, values, 0.0);
                }
            }
            Approach::Range => {
                if range.min == range.max {
                    self.fixed.insert(name.to_string(), range.min);
                    return;
                }
                if range.step <= 0.0 || range.max < range.min {
                    warn!(
                        technology = %name,
                        min = range.min,
                        max = range.max,
                        step = range.step,
                        "infeasible range; capacity held fixed"
                    );
                    self.fixed.insert(name.to_string(), tech.effective_capacity());
                    return;
                }
                let span = range.max - range.min;
                let steps = (span / range.step).floor() as usize;
                let mut values = vec![range.step; steps];
                let remainder = span - steps as f64 * range.step;
                if remainder > 1e-9 * span {
                    values.push(remainder);
                }
                self.push_block(name, values, range.min);
            }
        }
    }

    fn push_block(&mut self, technology: &str, values: Vec<f64>, base: f64) {
        let start = self.len;
        self.len += values.len();
        self.blocks.push(GeneBlock {
            technology: technology.to_string(),
            start,
            values,
            base,
        });
    }

    /// Total chromosome length.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn blocks(&self) -> &[GeneBlock] {
        &self.blocks
    }

    pub fn fixed(&self) -> &BTreeMap<String, f64> {
        &self.fixed
    }
}

/// Decodes a chromosome into a capacity per technology.
///
/// Fixed technologies are included at their fixed capacity.
pub fn decode(chromosome: &[bool], layout: &GeneLayout) -> BTreeMap<String, f64> {
    let mut capacities = layout.fixed.clone();
    for block in &layout.blocks {
        capacities.insert(block.technology.clone(), block.decode(chromosome));
    }
    capacities
}

/// Returns copies of `technologies` sized to `capacities`.
///
/// Capacity is expressed through the multiplier (`capacity / nameplate`).
/// A technology with zero nameplate takes the capacity directly; the layout
/// holds profiled ones of that kind at zero.
pub fn apply_capacities(
    technologies: &BTreeMap<String, Technology>,
    capacities: &BTreeMap<String, f64>,
) -> BTreeMap<String, Technology> {
    let mut out = technologies.clone();
    for (name, capacity) in capacities {
        if let Some(tech) = out.get_mut(name) {
            if tech.capacity > 0.0 {
                tech.multiplier = capacity / tech.capacity;
            } else {
                tech.capacity = *capacity;
                tech.multiplier = 1.0;
            }
        }
    }
    out
}
