//! Stochastic process generators.
//!
//! Pure sampling functions and time-of-day lookup tables that drive the
//! simulation:
//!
//! 1. **Inter-arrival gaps**: exponential with the current hour's rate
//! 2. **Service durations**: normal, floored at [`MIN_SERVICE_MINUTES`]
//! 3. **Hourly tables**: arrival rate and misdiagnosis base rate, each a
//!    step function over 24 one-hour buckets with no smoothing between
//!    buckets
//!
//! All draws go through the caller's [`RngManager`], so the same seed gives
//! the same sequence.
//!
//! # Example
//!
//! ```
//! use ed_simulator_core_rs::arrivals::{sample_interarrival, ArrivalConfig};
//! use ed_simulator_core_rs::RngManager;
//!
//! let mut rng = RngManager::new(42);
//! let arrivals = ArrivalConfig::default();
//! let rate = arrivals.rate_per_minute(11.0 * 60.0); // 11am
//! let gap = sample_interarrival(rate, &mut rng);
//! assert!(gap.is_finite() && gap >= 0.0);
//! ```

use crate::core::time::{hour_of_day, MINUTES_PER_HOUR};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Gap returned for a zero arrival rate: very large but finite, so the
/// next arrival simply lands beyond any realistic run horizon.
pub const ZERO_RATE_GAP_MINUTES: f64 = i32::MAX as f64;

/// Lower bound on any drawn service duration (minutes)
pub const MIN_SERVICE_MINUTES: f64 = 0.5;

/// A value per hour of day, looked up as a step function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyTable(pub [f64; 24]);

impl HourlyTable {
    /// Same value for every hour
    pub fn constant(value: f64) -> Self {
        Self([value; 24])
    }

    /// Value for hour of day `hour` (taken modulo 24)
    pub fn at_hour(&self, hour: usize) -> f64 {
        self.0[hour % 24]
    }

    /// Value for the hour containing absolute time `minutes`
    pub fn at_time(&self, minutes: f64) -> f64 {
        self.at_hour(hour_of_day(minutes))
    }

    /// Iterate over the 24 buckets in hour order
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

/// Default hourly arrival profile in patients per hour, with the midday
/// surge between 11am and 4pm.
pub fn default_hourly_arrivals() -> HourlyTable {
    HourlyTable([
        5.0, 4.5, 4.0, 3.0, 4.0, 4.0, 4.0, 5.0, // 00-07
        7.0, 10.0, 13.0, 14.0, 14.0, 14.0, 13.0, 13.0, // 08-15
        13.0, 12.0, 11.0, 11.0, 9.0, 8.0, 7.0, 7.0, // 16-23
    ])
}

/// Default hourly misdiagnosis base rates at triage.
pub fn default_misdiagnosis_rates() -> HourlyTable {
    HourlyTable([
        0.05, 0.05, 0.05, 0.05, 0.05, 0.05, // 00-05
        0.10, 0.10, 0.10, 0.10, // 06-09
        0.15, 0.15, 0.15, 0.15, 0.15, 0.15, 0.15, // 10-16
        0.10, 0.10, 0.10, // 17-19
        0.07, 0.07, 0.07, 0.07, // 20-23
    ])
}

/// ED arrival process configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrivalConfig {
    /// Use the hourly table; when false every hour uses `constant_per_hour`
    pub variable_rate: bool,

    /// Arrivals per hour when the variable rate is disabled
    pub constant_per_hour: f64,

    /// Arrivals per hour for each hour of the day
    pub hourly_per_hour: HourlyTable,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            variable_rate: true,
            constant_per_hour: 10.0,
            hourly_per_hour: default_hourly_arrivals(),
        }
    }
}

impl ArrivalConfig {
    /// Arrival rate (patients per minute) in effect at absolute time `minutes`
    pub fn rate_per_minute(&self, minutes: f64) -> f64 {
        let per_hour = if self.variable_rate {
            self.hourly_per_hour.at_time(minutes)
        } else {
            self.constant_per_hour
        };
        per_hour / MINUTES_PER_HOUR
    }
}

/// Normal service-time distribution for one station (minutes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceTime {
    pub mean: f64,
    pub std_dev: f64,
}

impl ServiceTime {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }
}

/// Sample an inter-arrival gap in minutes for a Poisson process with the
/// given per-minute rate. A zero rate yields [`ZERO_RATE_GAP_MINUTES`].
pub fn sample_interarrival(rate_per_minute: f64, rng: &mut RngManager) -> f64 {
    if rate_per_minute.is_nan() || rate_per_minute <= 0.0 {
        return ZERO_RATE_GAP_MINUTES;
    }
    rng.exponential(rate_per_minute).min(ZERO_RATE_GAP_MINUTES)
}

/// Sample a service duration in minutes, floored at [`MIN_SERVICE_MINUTES`].
pub fn sample_service_time(service: &ServiceTime, rng: &mut RngManager) -> f64 {
    rng.normal(service.mean, service.std_dev).max(MIN_SERVICE_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_have_expected_buckets() {
        let arrivals = default_hourly_arrivals();
        assert_eq!(arrivals.at_hour(3), 3.0);
        assert_eq!(arrivals.at_hour(12), 14.0);
        assert_eq!(arrivals.at_hour(23), 7.0);

        let misdx = default_misdiagnosis_rates();
        assert_eq!(misdx.at_hour(2), 0.05);
        assert_eq!(misdx.at_hour(9), 0.10);
        assert_eq!(misdx.at_hour(16), 0.15);
        assert_eq!(misdx.at_hour(19), 0.10);
        assert_eq!(misdx.at_hour(22), 0.07);
    }

    #[test]
    fn test_rate_is_step_function_across_hour_boundary() {
        let config = ArrivalConfig::default();
        // 09:59 vs 10:00
        let before = config.rate_per_minute(9.0 * 60.0 + 59.9);
        let after = config.rate_per_minute(10.0 * 60.0);
        assert_eq!(before, 10.0 / 60.0);
        assert_eq!(after, 13.0 / 60.0);
    }

    #[test]
    fn test_constant_rate_when_variable_disabled() {
        let config = ArrivalConfig {
            variable_rate: false,
            ..ArrivalConfig::default()
        };
        assert_eq!(config.rate_per_minute(0.0), 10.0 / 60.0);
        assert_eq!(config.rate_per_minute(13.0 * 60.0), 10.0 / 60.0);
    }

    #[test]
    fn test_zero_rate_gives_large_finite_gap() {
        let mut rng = RngManager::new(1);
        let gap = sample_interarrival(0.0, &mut rng);
        assert!(gap.is_finite());
        assert_eq!(gap, ZERO_RATE_GAP_MINUTES);
    }

    #[test]
    fn test_service_time_never_below_floor() {
        let mut rng = RngManager::new(99);
        let wild = ServiceTime::new(1.0, 50.0);
        for _ in 0..1000 {
            assert!(sample_service_time(&wild, &mut rng) >= MIN_SERVICE_MINUTES);
        }
    }
}
