//! Post-hoc run metadata computed from an energy balance.

use std::fmt;
use std::time::Duration;

use super::types::{EnergyBalance, HourRecord};

/// Pearson correlation of hourly load against supply groupings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Correlation {
    /// Load vs renewable energy counted toward load.
    pub renewable: f64,
    /// Load vs renewable plus storage.
    pub renewable_storage: f64,
    /// Load vs all energy counted toward load.
    pub total: f64,
}

/// Energy metrics derived from a complete run.
///
/// Percentages are on a 0-100 scale. Every ratio with a zero denominator
/// is reported as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetadata {
    pub total_load: f64,
    pub total_shortfall: f64,
    pub total_surplus: f64,
    pub total_curtailment: f64,
    /// Renewable share of energy served.
    pub re_pct: f64,
    /// Storage share of energy served.
    pub storage_pct: f64,
    /// Share of load met.
    pub load_pct: f64,
    /// Surplus relative to load.
    pub surplus_pct: f64,
    /// Curtailed share of renewable generation.
    pub curtailment_pct: f64,
    /// Losses across every storage unit.
    pub storage_losses: f64,
    pub largest_shortfall: f64,
    pub largest_shortfall_hour: Option<usize>,
    pub peak_load: f64,
    pub peak_load_hour: usize,
    pub processing_time: Duration,
    pub correlation: Option<Correlation>,
}

impl RunMetadata {
    /// Computes metadata from the hourly records.
    ///
    /// # Arguments
    ///
    /// * `balance` - Complete simulation output
    /// * `with_correlation` - Whether to compute correlation diagnostics
    pub fn from_balance(balance: &EnergyBalance, with_correlation: bool) -> Self {
        let mut served = 0.0;
        let mut renewable = 0.0;
        let mut storage = 0.0;
        let mut peak_load = 0.0_f64;
        let mut peak_load_hour = 0;
        let mut largest_shortfall = 0.0_f64;
        let mut largest_shortfall_hour = None;

        for h in &balance.hours {
            served += h.to_meet_load();
            renewable += h.renewable_to_load;
            storage += h.storage_to_load;
            if h.load > peak_load {
                peak_load = h.load;
                peak_load_hour = h.hour;
            }
            if h.shortfall > largest_shortfall {
                largest_shortfall = h.shortfall;
                largest_shortfall_hour = Some(h.hour);
            }
        }

        let total_load = balance.total_load();
        let total_shortfall = balance.total_shortfall();
        let total_surplus = balance.total_surplus();
        let total_curtailment = balance.total_curtailment();
        let renewable_generation: f64 = balance
            .technologies
            .iter()
            .filter(|t| t.category == crate::tech::Category::Renewable)
            .map(|t| t.generation)
            .sum();
        let storage_losses = balance
            .technologies
            .iter()
            .filter_map(|t| t.storage.as_ref())
            .map(|s| s.total_losses())
            .sum();

        let correlation = with_correlation.then(|| Correlation {
            renewable: pearson_by(&balance.hours, |h| h.renewable_to_load),
            renewable_storage: pearson_by(&balance.hours, |h| h.renewable_to_load + h.storage_to_load),
            total: pearson_by(&balance.hours, HourRecord::to_meet_load),
        });

        Self {
            total_load,
            total_shortfall,
            total_surplus,
            total_curtailment,
            re_pct: pct(renewable, served),
            storage_pct: pct(storage, served),
            load_pct: pct(total_load - total_shortfall, total_load),
            surplus_pct: pct(total_surplus, total_load),
            curtailment_pct: pct(total_curtailment, renewable_generation),
            storage_losses,
            largest_shortfall,
            largest_shortfall_hour,
            peak_load,
            peak_load_hour,
            processing_time: balance.elapsed,
            correlation,
        }
    }
}

fn pct(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        100.0 * numerator / denominator
    } else {
        0.0
    }
}

fn pearson_by(hours: &[HourRecord], f: impl Fn(&HourRecord) -> f64) -> f64 {
    let load: Vec<f64> = hours.iter().map(|h| h.load).collect();
    let other: Vec<f64> = hours.iter().map(f).collect();
    pearson(&load, &other)
}

/// Pearson correlation coefficient; 0 when undefined.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom > 0.0 { cov / denom } else { 0.0 }
}

impl fmt::Display for RunMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Metadata ---")?;
        writeln!(f, "Total load:            {:.1} MWh", self.total_load)?;
        writeln!(f, "Load met:              {:.2}%", self.load_pct)?;
        writeln!(f, "Renewable share:       {:.2}%", self.re_pct)?;
        writeln!(f, "Storage share:         {:.2}%", self.storage_pct)?;
        writeln!(f, "Surplus:               {:.2}%", self.surplus_pct)?;
        writeln!(f, "Curtailment:           {:.2}%", self.curtailment_pct)?;
        writeln!(f, "Storage losses:        {:.1} MWh", self.storage_losses)?;
        match self.largest_shortfall_hour {
            Some(h) => writeln!(
                f,
                "Largest shortfall:     {:.2} MW (hour {h})",
                self.largest_shortfall
            )?,
            None => writeln!(f, "Largest shortfall:     none")?,
        }
        writeln!(
            f,
            "Peak load:             {:.2} MW (hour {})",
            self.peak_load, self.peak_load_hour
        )?;
        if let Some(c) = &self.correlation {
            writeln!(
                f,
                "Correlation:           re={:.3}  re+storage={:.3}  all={:.3}",
                c.renewable, c.renewable_storage, c.total
            )?;
        }
        write!(
            f,
            "Processing time:       {:.3} s",
            self.processing_time.as_secs_f64()
        )
    }
}
