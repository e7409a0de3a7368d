//! Genetic search over technology capacities.
//!
//! Each fitness evaluation is a full-year simulation plus costing on a
//! private copy of the technology records, so evaluations within a
//! generation can run in parallel.

use std::collections::BTreeMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::economics::SystemSummary;
use crate::sim::{RunMetadata, Scenario, ScenarioContext};
use crate::tech::{Category, Technology};

use super::fitness::{MetricValues, Targets, lcoe_fitness};
use super::genes::{CapacityRange, DEFAULT_RANGE_GENES, GeneLayout, apply_capacities, decode};

/// Which fitness signals drive selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    /// Penalized system LCOE only.
    #[default]
    Lcoe,
    /// Multi-objective weight only.
    Multi,
    /// Both signals; tournaments use their normalized sum.
    Both,
}

impl Choice {
    fn signals(self) -> &'static [Signal] {
        match self {
            Choice::Lcoe => &[Signal::Lcoe],
            Choice::Multi => &[Signal::Multi],
            Choice::Both => &[Signal::Lcoe, Signal::Multi],
        }
    }
}

/// One scalar fitness signal; lower is better for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Lcoe,
    Multi,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Lcoe => f.write_str("lcoe"),
            Signal::Multi => f.write_str("multi"),
        }
    }
}

/// Optimizer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerSettings {
    /// Chromosomes per generation.
    pub population: usize,
    /// Maximum number of generations after the first.
    pub generations: usize,
    /// Per-gene flip probability.
    pub mutation: f64,
    /// Stop when the best score is unchanged for this many generations (0 = never).
    pub stop_after: usize,
    pub choice: Choice,
    pub seed: u64,
    /// Evaluate each generation in parallel.
    pub parallel: bool,
    /// Scales the load multiplier during optimization.
    pub load_multiplier: f64,
    /// Gene count for technologies without a range.
    pub default_range: usize,
    pub ranges: BTreeMap<String, CapacityRange>,
    pub targets: Targets,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            population: 50,
            generations: 20,
            mutation: 0.005,
            stop_after: 5,
            choice: Choice::Lcoe,
            seed: 42,
            parallel: true,
            load_multiplier: 1.0,
            default_range: DEFAULT_RANGE_GENES,
            ranges: BTreeMap::new(),
            targets: Targets::default(),
        }
    }
}

/// A scored chromosome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub chromosome: Vec<bool>,
    pub capacities: BTreeMap<String, f64>,
    pub values: MetricValues,
    pub lcoe_score: f64,
    pub multi_score: f64,
}

impl Evaluation {
    pub fn score(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Lcoe => self.lcoe_score,
            Signal::Multi => self.multi_score,
        }
    }
}

/// Best score per active signal for one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_lcoe: Option<f64>,
    pub best_multi: Option<f64>,
}

/// Final best chromosome for one signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSolution {
    pub signal: Signal,
    pub score: f64,
    pub evaluation: Evaluation,
}

/// Everything the search produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizerOutcome {
    pub layout: GeneLayout,
    /// Targets after bound discovery.
    pub targets: Targets,
    pub best: Vec<BestSolution>,
    pub history: Vec<GenerationStats>,
}

impl OptimizerOutcome {
    /// Best solution for `signal`, if that signal was active.
    pub fn best_for(&self, signal: Signal) -> Option<&BestSolution> {
        self.best.iter().find(|b| b.signal == signal)
    }
}

impl fmt::Display for OptimizerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Optimizer ---")?;
        writeln!(
            f,
            "Generations:           {} ({} genes)",
            self.history.len().saturating_sub(1),
            self.layout.len()
        )?;
        for best in &self.best {
            writeln!(f, "Best {} score:       {:.4}", best.signal, best.score)?;
            for (name, capacity) in &best.evaluation.capacities {
                writeln!(f, "  {name:<20} {capacity:>10.1}")?;
            }
            writeln!(
                f,
                "  lcoe={:.2}  load={:.1}%  re={:.1}%  surplus={:.1}%",
                best.evaluation.values.lcoe,
                best.evaluation.values.load_pct,
                best.evaluation.values.re_pct,
                best.evaluation.values.surplus_pct,
            )?;
        }
        Ok(())
    }
}

/// Genetic capacity optimizer bound to one scenario.
pub struct Optimizer<'a> {
    scenario: &'a Scenario,
    settings: OptimizerSettings,
    layout: GeneLayout,
    /// Records with the optimization load multiplier applied.
    base: BTreeMap<String, Technology>,
    context: ScenarioContext,
    targets: Targets,
}

impl<'a> Optimizer<'a> {
    /// Prepares the gene layout for `scenario`.
    pub fn new(scenario: &'a Scenario, settings: OptimizerSettings) -> Self {
        let base = scale_load(scenario.technologies(), settings.load_multiplier);
        let layout = GeneLayout::build(&base, scenario.order(), &settings.ranges, settings.default_range);
        let context = ScenarioContext {
            detail: false,
            correlation: false,
            ..scenario.context().clone()
        };
        let targets = settings.targets.clone();
        Self {
            scenario,
            settings,
            layout,
            base,
            context,
            targets,
        }
    }

    pub fn layout(&self) -> &GeneLayout {
        &self.layout
    }

    /// Simulates and costs one capacity mix.
    pub fn evaluate_capacities(&self, capacities: &BTreeMap<String, f64>) -> MetricValues {
        let techs = apply_capacities(&self.base, capacities);
        let balance = self.scenario.simulate_with(&techs, &self.context);
        let summary = SystemSummary::from_balance(&balance, &techs, &self.context);
        let metadata = RunMetadata::from_balance(&balance, false);
        MetricValues::from_run(&summary, &metadata)
    }

    /// Decodes, simulates and scores one chromosome.
    pub fn evaluate(&self, chromosome: &[bool]) -> Evaluation {
        let capacities = decode(chromosome, &self.layout);
        let values = self.evaluate_capacities(&capacities);
        Evaluation {
            chromosome: chromosome.to_vec(),
            capacities,
            lcoe_score: lcoe_fitness(&values, self.targets.load_floor()),
            multi_score: self.targets.weight(&values),
            values,
        }
    }

    fn evaluate_all(&self, population: &[Vec<bool>]) -> Vec<Evaluation> {
        if self.settings.parallel {
            population.par_iter().map(|c| self.evaluate(c)).collect()
        } else {
            population.iter().map(|c| self.evaluate(c)).collect()
        }
    }

    /// Runs the search to completion.
    pub fn run(mut self) -> OptimizerOutcome {
        let mut rng = StdRng::seed_from_u64(self.settings.seed);
        let signals = self.settings.choice.signals();
        let size = self.settings.population.max(2);
        let genes = self.layout.len();

        let initial: Vec<Vec<bool>> = if genes == 0 {
            vec![Vec::new()]
        } else {
            (0..size).map(|_| random_chromosome(genes, &mut rng)).collect()
        };
        let mut population = self.evaluate_all(&initial);

        let samples: Vec<MetricValues> = population.iter().map(|e| e.values).collect();
        self.targets.discover_bounds(&samples);
        for e in &mut population {
            e.multi_score = self.targets.weight(&e.values);
        }

        let mut history = vec![generation_stats(0, &population, signals)];
        info!(
            generation = 0,
            genes,
            population = population.len(),
            best_lcoe = ?history[0].best_lcoe,
            best_multi = ?history[0].best_multi,
            "initial population evaluated"
        );

        let mut stable = 0;
        if genes > 0 {
            for generation in 1..=self.settings.generations {
                let mut next: Vec<Evaluation> = signals
                    .iter()
                    .filter_map(|s| best_index(&population, *s))
                    .map(|i| population[i].clone())
                    .collect();

                let mut children = Vec::with_capacity(size);
                while next.len() + children.len() < size {
                    let a = tournament(&population, signals, &mut rng);
                    let b = tournament(&population, signals, &mut rng);
                    let (mut c1, mut c2) = crossover(
                        &population[a].chromosome,
                        &population[b].chromosome,
                        &mut rng,
                    );
                    mutate(&mut c1, self.settings.mutation, &mut rng);
                    mutate(&mut c2, self.settings.mutation, &mut rng);
                    children.push(c1);
                    if next.len() + children.len() < size {
                        children.push(c2);
                    }
                }
                next.extend(self.evaluate_all(&children));
                population = next;

                let stats = generation_stats(generation, &population, signals);
                info!(
                    generation,
                    best_lcoe = ?stats.best_lcoe,
                    best_multi = ?stats.best_multi,
                    "generation complete"
                );
                let unchanged = history
                    .last()
                    .is_some_and(|prev| prev.best_lcoe == stats.best_lcoe && prev.best_multi == stats.best_multi);
                history.push(stats);

                stable = if unchanged { stable + 1 } else { 0 };
                if self.settings.stop_after > 0 && stable >= self.settings.stop_after {
                    debug!(generation, stable, "best score stable; stopping early");
                    break;
                }
            }
        }

        let best = signals
            .iter()
            .filter_map(|s| {
                best_index(&population, *s).map(|i| BestSolution {
                    signal: *s,
                    score: population[i].score(*s),
                    evaluation: population[i].clone(),
                })
            })
            .collect();

        OptimizerOutcome {
            layout: self.layout,
            targets: self.targets,
            best,
            history,
        }
    }
}

/// Returns copies of `technologies` with every load multiplier scaled by
/// `load_multiplier`.
pub fn scale_load(
    technologies: &BTreeMap<String, Technology>,
    load_multiplier: f64,
) -> BTreeMap<String, Technology> {
    let mut scaled = technologies.clone();
    for tech in scaled.values_mut().filter(|t| t.category == Category::Load) {
        tech.multiplier *= load_multiplier;
    }
    scaled
}

/// A chromosome with a random number (at least one) of genes switched on.
fn random_chromosome(genes: usize, rng: &mut StdRng) -> Vec<bool> {
    let ones = rng.random_range(1..=genes);
    let mut chromosome: Vec<bool> = (0..genes).map(|i| i < ones).collect();
    chromosome.shuffle(rng);
    chromosome
}

/// Two-point crossover; chromosomes shorter than 3 genes are copied.
fn crossover(a: &[bool], b: &[bool], rng: &mut StdRng) -> (Vec<bool>, Vec<bool>) {
    let len = a.len().min(b.len());
    if len < 3 {
        return (a.to_vec(), b.to_vec());
    }
    let p1 = rng.random_range(1..=len - 2);
    let p2 = rng.random_range(p1 + 1..=len - 1);
    let splice = |x: &[bool], y: &[bool]| {
        let mut child = Vec::with_capacity(len);
        child.extend_from_slice(&x[..p1]);
        child.extend_from_slice(&y[p1..p2]);
        child.extend_from_slice(&x[p2..len]);
        child
    };
    (splice(a, b), splice(b, a))
}

/// Flips each gene with probability `rate`.
fn mutate(chromosome: &mut [bool], rate: f64, rng: &mut StdRng) {
    let rate = rate.clamp(0.0, 1.0);
    if rate == 0.0 {
        return;
    }
    for gene in chromosome.iter_mut() {
        if rng.random_bool(rate) {
            *gene = !*gene;
        }
    }
}

/// Picks two random contenders; the lower combined score wins, ties go to the first.
fn tournament(population: &[Evaluation], signals: &[Signal], rng: &mut StdRng) -> usize {
    let a = rng.random_range(0..population.len());
    let b = rng.random_range(0..population.len());
    if combined_score(population, signals, b) < combined_score(population, signals, a) {
        b
    } else {
        a
    }
}

/// Sum of min-max normalized scores across the active signals.
fn combined_score(population: &[Evaluation], signals: &[Signal], index: usize) -> f64 {
    signals
        .iter()
        .map(|s| {
            let (min, max) = population
                .iter()
                .map(|e| e.score(*s))
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
            if max > min {
                (population[index].score(*s) - min) / (max - min)
            } else {
                0.0
            }
        })
        .sum()
}

fn best_index(population: &[Evaluation], signal: Signal) -> Option<usize> {
    population
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.score(signal).total_cmp(&b.score(signal)))
        .map(|(i, _)| i)
}

fn generation_stats(generation: usize, population: &[Evaluation], signals: &[Signal]) -> GenerationStats {
    let best = |s: Signal| {
        signals
            .contains(&s)
            .then(|| best_index(population, s).map(|i| population[i].score(s)))
            .flatten()
    };
    GenerationStats {
        generation,
        best_lcoe: best(Signal::Lcoe),
        best_multi: best(Signal::Multi),
    }
}
