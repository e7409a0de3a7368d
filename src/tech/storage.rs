//! Storage controller: the per-unit hourly charge/discharge state machine.

use crate::tech::record::Technology;

/// Energy moved by one storage unit in one hour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StorageFlow {
    /// Energy taken from the hour's excess (before charge losses).
    pub charged: f64,
    /// Energy delivered toward load (after discharge losses).
    pub delivered: f64,
}

/// Cumulative storage accounting for one simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StorageStats {
    /// Energy drawn from excess, before losses.
    pub charged: f64,
    /// Energy delivered toward load.
    pub discharged: f64,
    pub charge_loss: f64,
    pub discharge_loss: f64,
    pub parasitic_loss: f64,
    /// Highest level reached, including the initial level.
    pub peak_level: f64,
    /// Largest single-hour delivery.
    pub max_hour_discharge: f64,
    /// Largest single-hour charge draw.
    pub max_hour_charge: f64,
}

impl StorageStats {
    /// All energy lost to inefficiency and self-discharge.
    pub fn total_losses(&self) -> f64 {
        self.charge_loss + self.discharge_loss + self.parasitic_loss
    }
}

/// Runtime state of one storage unit.
///
/// Created at the start of a simulation from a storage [`Technology`] and
/// dropped at the end. Level always stays within `[min_level, max_level]`.
#[derive(Debug, Clone)]
pub struct StorageUnit {
    name: String,
    level: f64,
    min_level: f64,
    max_level: f64,
    charge_efficiency: f64,
    discharge_efficiency: f64,
    /// Fraction of the level lost per hour.
    parasitic_rate: f64,
    recharge_cap: f64,
    discharge_cap: f64,
    min_runtime: usize,
    warm_time: f64,
    discharge_run_active: bool,
    warm_run_active: bool,
    stats: StorageStats,
}

impl StorageUnit {
    /// Builds the runtime state for a storage technology.
    ///
    /// Levels and rate caps scale with `capacity × multiplier`. A unit with
    /// a minimum run time and an empty initial charge starts outside a
    /// discharge run; every other unit starts inside one.
    pub fn new(tech: &Technology) -> Self {
        let capacity = tech.effective_capacity();
        let params = &tech.storage;
        let min_level = (capacity * tech.capacity_min).max(0.0);
        let max_level = (capacity * tech.capacity_max).max(min_level);
        let level = (capacity * params.initial).clamp(min_level, max_level);
        let cap = |fraction: Option<f64>| match fraction {
            Some(f) if f > 0.0 => capacity * f,
            _ => f64::INFINITY,
        };

        Self {
            name: tech.name.clone(),
            level,
            min_level,
            max_level,
            charge_efficiency: params.charge_efficiency(),
            discharge_efficiency: params.discharge_efficiency(),
            parasitic_rate: params.parasitic_loss / 24.0,
            recharge_cap: cap(params.recharge_max),
            discharge_cap: cap(params.discharge_max),
            min_runtime: params.min_runtime as usize,
            warm_time: params.warm_time,
            discharge_run_active: !(params.min_runtime > 0 && params.initial == 0.0),
            warm_run_active: false,
            stats: StorageStats {
                peak_level: level,
                ..StorageStats::default()
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current stored energy.
    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn min_level(&self) -> f64 {
        self.min_level
    }

    pub fn max_level(&self) -> f64 {
        self.max_level
    }

    /// Whether the unit is committed to a discharge run.
    pub fn discharge_run_active(&self) -> bool {
        self.discharge_run_active
    }

    /// Whether the warm-up penalty has been applied to the current run.
    pub fn warm_run_active(&self) -> bool {
        self.warm_run_active
    }

    pub fn stats(&self) -> &StorageStats {
        &self.stats
    }

    /// Advances the unit by one hour.
    ///
    /// `residual` is the demand still unmet at this unit's position in the
    /// dispatch order: positive means shortfall, negative means excess that
    /// may be stored. `projected` is the residual trace used for the minimum
    /// run-time look-ahead.
    ///
    /// # Arguments
    ///
    /// * `hour` - Index of the current hour
    /// * `residual` - Remaining demand (negative for excess)
    /// * `projected` - Projected residual for every hour of the year
    ///
    /// # Returns
    ///
    /// The energy charged from excess and delivered toward load this hour.
    pub fn step(&mut self, hour: usize, residual: f64, projected: &[f64]) -> StorageFlow {
        self.apply_parasitic();

        let flow = if residual < 0.0 {
            StorageFlow {
                charged: self.charge(-residual),
                delivered: 0.0,
            }
        } else if residual > 0.0 {
            StorageFlow {
                charged: 0.0,
                delivered: self.discharge(hour, residual, projected),
            }
        } else {
            StorageFlow::default()
        };

        self.stats.peak_level = self.stats.peak_level.max(self.level);
        self.stats.max_hour_charge = self.stats.max_hour_charge.max(flow.charged);
        self.stats.max_hour_discharge = self.stats.max_hour_discharge.max(flow.delivered);
        flow
    }

    fn apply_parasitic(&mut self) {
        if self.parasitic_rate <= 0.0 || self.level <= 0.0 {
            return;
        }
        let loss = self.level * self.parasitic_rate;
        self.level -= loss;
        self.stats.parasitic_loss += loss;
        self.clamp_level();
    }

    /// Stores part of `excess`; returns the energy drawn from it.
    fn charge(&mut self, excess: f64) -> f64 {
        // any excess interrupts a discharge commitment
        self.discharge_run_active = false;
        self.warm_run_active = false;

        if self.charge_efficiency <= 0.0 {
            return 0.0;
        }
        let headroom = ((self.max_level - self.level) / self.charge_efficiency).max(0.0);
        let chargeable = excess.min(headroom).min(self.recharge_cap);
        if chargeable <= 0.0 {
            return 0.0;
        }

        self.level += chargeable * self.charge_efficiency;
        self.clamp_level();
        self.stats.charged += chargeable;
        self.stats.charge_loss += chargeable * (1.0 - self.charge_efficiency);
        chargeable
    }

    /// Covers part of `demand`; returns the energy delivered.
    fn discharge(&mut self, hour: usize, demand: f64, projected: &[f64]) -> f64 {
        if !self.discharge_run_active {
            self.discharge_run_active =
                self.min_runtime == 0 || self.sustained_need(hour, projected);
        }
        if !self.discharge_run_active || self.discharge_efficiency <= 0.0 {
            return 0.0;
        }

        let available = (self.level - self.min_level).max(0.0);
        let needed = demand / self.discharge_efficiency;
        let mut amount = needed.min(available).min(self.discharge_cap);
        if self.warm_time > 0.0 && !self.warm_run_active {
            self.warm_run_active = true;
            amount *= 1.0 - self.warm_time;
        }
        if amount <= 0.0 {
            return 0.0;
        }

        self.level -= amount;
        self.clamp_level();
        let delivered = amount * self.discharge_efficiency;
        self.stats.discharged += delivered;
        self.stats.discharge_loss += amount - delivered;
        delivered
    }

    /// True when every hour of the look-ahead window projects a shortfall.
    ///
    /// A window that would run past the end of the year never starts a run.
    fn sustained_need(&self, hour: usize, projected: &[f64]) -> bool {
        let end = hour + self.min_runtime;
        if end >= projected.len() {
            return false;
        }
        projected[hour + 1..=end].iter().all(|r| *r > 0.0)
    }

    fn clamp_level(&mut self) {
        self.level = self.level.clamp(self.min_level, self.max_level);
    }
}
