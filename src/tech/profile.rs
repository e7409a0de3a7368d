//! Hourly profile table and synthetic profile shapes.
//!
//! Each technology references at most one named series. Series are stored
//! per name so no technology depends on column position.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::error::{SimError, SimResult};

/// Number of hourly periods in one simulated year.
pub const HOURS_PER_YEAR: usize = 8760;

const HOURS_PER_DAY: usize = 24;

/// Named hourly series, each exactly [`HOURS_PER_YEAR`] values long.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyProfiles {
    series: BTreeMap<String, Vec<f64>>,
}

impl HourlyProfiles {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a full-year series, truncating anything past the last hour.
    ///
    /// # Errors
    ///
    /// Returns `SimError::ProfileTooShort` when `values` holds fewer than
    /// 8760 entries.
    pub fn insert(&mut self, name: impl Into<String>, mut values: Vec<f64>) -> SimResult<()> {
        let name = name.into();
        if values.len() < HOURS_PER_YEAR {
            return Err(SimError::ProfileTooShort {
                profile: name,
                len: values.len(),
            });
        }
        values.truncate(HOURS_PER_YEAR);
        self.series.insert(name, values);
        Ok(())
    }

    /// Adds a series built by repeating `pattern` over the whole year.
    ///
    /// # Errors
    ///
    /// Returns `SimError::ProfileTooShort` when `pattern` is empty.
    pub fn insert_tiled(&mut self, name: impl Into<String>, pattern: &[f64]) -> SimResult<()> {
        let name = name.into();
        if pattern.is_empty() {
            return Err(SimError::ProfileTooShort { profile: name, len: 0 });
        }
        self.series.insert(name, tile(pattern, HOURS_PER_YEAR));
        Ok(())
    }

    /// Returns the series for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// Returns `true` when a series named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    /// Iterates over series names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Repeats or truncates `pattern` to exactly `horizon` values.
///
/// An empty pattern yields zeros.
pub fn tile(pattern: &[f64], horizon: usize) -> Vec<f64> {
    if pattern.is_empty() {
        return vec![0.0; horizon];
    }
    pattern.iter().copied().cycle().take(horizon).collect()
}

/// A constant series.
pub fn flat(value: f64) -> Vec<f64> {
    vec![value; HOURS_PER_YEAR]
}

/// A daily sinusoid around `base` with Gaussian noise, floored at zero.
///
/// `phase_rad = 0` puts the mid-point of the rising edge at midnight.
pub fn diurnal(base: f64, amplitude: f64, phase_rad: f64, noise_std: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..HOURS_PER_YEAR)
        .map(|h| {
            let day_pos = (h % HOURS_PER_DAY) as f64 / HOURS_PER_DAY as f64;
            let angle = 2.0 * std::f64::consts::PI * day_pos + phase_rad;
            let value = base + amplitude * angle.sin() + gaussian_noise(&mut rng, noise_std);
            value.max(0.0)
        })
        .collect()
}

/// A half-cosine daylight shape between `sunrise` (inclusive) and `sunset`
/// (exclusive), scaled to `peak` with multiplicative noise.
///
/// Hours outside daylight are zero. `sunrise >= sunset` yields an all-zero
/// series.
pub fn solar(peak: f64, sunrise: usize, sunset: usize, noise_std: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..HOURS_PER_YEAR)
        .map(|h| {
            let frac = daylight_frac(h % HOURS_PER_DAY, sunrise, sunset);
            if frac <= 0.0 {
                return 0.0;
            }
            let noise_mult = 1.0 + gaussian_noise(&mut rng, noise_std);
            (peak * frac * noise_mult).max(0.0)
        })
        .collect()
}

/// Fraction of peak output for an hour of the day, peaking at solar noon.
fn daylight_frac(hour: usize, sunrise: usize, sunset: usize) -> f64 {
    if sunrise >= sunset || hour < sunrise || hour >= sunset {
        return 0.0;
    }
    let span = (sunset - sunrise) as f64;
    let x = (hour - sunrise) as f64 + 0.5;
    (std::f64::consts::PI * x / span).sin().max(0.0)
}

/// Gaussian noise via the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_short_series() {
        let mut profiles = HourlyProfiles::new();
        let err = profiles.insert("load", vec![1.0; 100]).unwrap_err();
        assert!(matches!(err, SimError::ProfileTooShort { len: 100, .. }));
        assert!(profiles.is_empty());
    }

    #[test]
    fn insert_truncates_long_series() {
        let mut profiles = HourlyProfiles::new();
        profiles.insert("load", vec![1.0; 9000]).unwrap();
        assert_eq!(profiles.get("load").unwrap().len(), HOURS_PER_YEAR);
    }

    #[test]
    fn tile_repeats_pattern() {
        assert_eq!(tile(&[1.0, 2.0, 3.0], 7), vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0]);
        assert_eq!(tile(&[], 3), vec![0.0; 3]);
        assert_eq!(tile(&[5.0, 6.0], 1), vec![5.0]);
    }

    #[test]
    fn tiled_insert_fills_the_year() {
        let mut profiles = HourlyProfiles::new();
        profiles.insert_tiled("day", &[0.0; 24]).unwrap();
        assert_eq!(profiles.get("day").unwrap().len(), HOURS_PER_YEAR);
        assert!(profiles.insert_tiled("empty", &[]).is_err());
    }

    #[test]
    fn solar_is_zero_at_night_and_positive_at_noon() {
        let series = solar(10.0, 6, 18, 0.0, 1);
        assert_eq!(series[0], 0.0);
        assert_eq!(series[23], 0.0);
        assert!(series[12] > 9.0);
        assert_eq!(series[12], series[24 + 12]);
    }

    #[test]
    fn diurnal_is_reproducible_and_non_negative() {
        let a = diurnal(100.0, 30.0, 0.0, 5.0, 7);
        let b = diurnal(100.0, 30.0, 0.0, 5.0, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn noiseless_diurnal_follows_sinusoid() {
        let series = diurnal(10.0, 5.0, 0.0, 0.0, 0);
        assert!((series[0] - 10.0).abs() < 1e-9);
        assert!((series[6] - 15.0).abs() < 1e-9);
    }
}
