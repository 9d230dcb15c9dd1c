//! Simulator configuration
//!
//! One plain value threaded into [`crate::orchestrator::Simulator::new`].
//! Every field has a default, so a JSON document only needs to name what
//! it changes:
//!
//! ```rust
//! use ed_simulator_core_rs::orchestrator::SimulatorConfig;
//!
//! let config = SimulatorConfig::from_json_str(r#"{
//!     "rng_seed": 7,
//!     "reassessment_enabled": false,
//!     "severity_noise_multiplier": 1.5
//! }"#).unwrap();
//!
//! assert_eq!(config.rng_seed, 7);
//! assert!(config.misdiagnosis_enabled); // default kept
//! ```

use crate::arrivals::{default_misdiagnosis_rates, ArrivalConfig, HourlyTable, ServiceTime};
use crate::models::location::StationName;
use crate::models::waiting_area::PrioritizationPolicy;
use crate::orchestrator::engine::SimulationError;
use serde::{Deserialize, Serialize};

// ============================================================================
// Stations
// ============================================================================

/// Capacity and service-time settings for one station
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationSettings {
    /// Beds (single-bed stations: service slots)
    pub beds: usize,

    /// Initial staff. Ignored by single-bed stations; overwritten by the
    /// staffing schedule for scheduled stations.
    pub staff: usize,

    /// Mean service duration (minutes)
    pub service_mean: f64,

    /// Standard deviation of service duration (minutes)
    pub service_std_dev: f64,
}

impl StationSettings {
    pub fn new(beds: usize, staff: usize, service_mean: f64, service_std_dev: f64) -> Self {
        Self {
            beds,
            staff,
            service_mean,
            service_std_dev,
        }
    }

    pub fn service(&self) -> ServiceTime {
        ServiceTime::new(self.service_mean, self.service_std_dev)
    }
}

/// Settings for every station in the department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationsConfig {
    pub sort: StationSettings,
    pub registration: StationSettings,
    pub triage: StationSettings,
    pub reassessment: StationSettings,
    pub eru: StationSettings,
    pub red: StationSettings,
    pub green: StationSettings,
    pub fast_track: StationSettings,
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            sort: StationSettings::new(1, 1, 4.0, 2.0),
            registration: StationSettings::new(1, 1, 3.0, 2.0),
            triage: StationSettings::new(3, 3, 5.0, 2.0),
            reassessment: StationSettings::new(1, 1, 5.0, 2.0),
            eru: StationSettings::new(14, 1, 76.0, 42.0),
            red: StationSettings::new(34, 3, 66.7, 29.91),
            green: StationSettings::new(10, 2, 38.67, 24.79),
            fast_track: StationSettings::new(19, 1, 21.38, 13.38),
        }
    }
}

impl StationsConfig {
    /// Settings for a station. `None` for the department-wide `Ed` name.
    pub fn get(&self, name: StationName) -> Option<&StationSettings> {
        match name {
            StationName::Sort => Some(&self.sort),
            StationName::Registration => Some(&self.registration),
            StationName::Triage => Some(&self.triage),
            StationName::Reassessment => Some(&self.reassessment),
            StationName::Eru => Some(&self.eru),
            StationName::Red => Some(&self.red),
            StationName::Green => Some(&self.green),
            StationName::FastTrack => Some(&self.fast_track),
            StationName::Ed => None,
        }
    }
}

// ============================================================================
// Staffing
// ============================================================================

/// Staff on duty at each scheduled station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffLevels {
    pub triage: usize,
    pub eru: usize,
    pub red: usize,
    pub green: usize,
    pub fast_track: usize,
}

impl StaffLevels {
    /// (station, staff) pairs in a fixed order
    pub fn entries(&self) -> [(StationName, usize); 5] {
        [
            (StationName::Green, self.green),
            (StationName::Red, self.red),
            (StationName::FastTrack, self.fast_track),
            (StationName::Eru, self.eru),
            (StationName::Triage, self.triage),
        ]
    }
}

/// Staff levels over the hours `[start_hour, end_hour)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingBand {
    pub start_hour: usize,
    pub end_hour: usize,
    pub staff: StaffLevels,
}

/// Time-of-day staffing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingSchedule {
    pub bands: Vec<StaffingBand>,
}

impl Default for StaffingSchedule {
    /// Night, day and evening shifts
    fn default() -> Self {
        Self {
            bands: vec![
                StaffingBand {
                    start_hour: 0,
                    end_hour: 7,
                    staff: StaffLevels {
                        triage: 3,
                        eru: 1,
                        red: 3,
                        green: 2,
                        fast_track: 1,
                    },
                },
                StaffingBand {
                    start_hour: 7,
                    end_hour: 15,
                    staff: StaffLevels {
                        triage: 3,
                        eru: 4,
                        red: 4,
                        green: 2,
                        fast_track: 1,
                    },
                },
                StaffingBand {
                    start_hour: 15,
                    end_hour: 24,
                    staff: StaffLevels {
                        triage: 3,
                        eru: 2,
                        red: 5,
                        green: 2,
                        fast_track: 1,
                    },
                },
            ],
        }
    }
}

impl StaffingSchedule {
    /// Same staff around the clock
    pub fn constant(staff: StaffLevels) -> Self {
        Self {
            bands: vec![StaffingBand {
                start_hour: 0,
                end_hour: 24,
                staff,
            }],
        }
    }

    /// Staff levels for hour of day `hour`
    pub fn levels_at_hour(&self, hour: usize) -> Option<&StaffLevels> {
        self.bands
            .iter()
            .find(|band| band.start_hour <= hour && hour < band.end_hour)
            .map(|band| &band.staff)
    }

    /// Bands must tile [0, 24) with no gap and no overlap
    pub fn validate(&self) -> Result<(), SimulationError> {
        let mut bands: Vec<&StaffingBand> = self.bands.iter().collect();
        bands.sort_by_key(|band| band.start_hour);

        let mut expected_start = 0;
        for band in bands {
            if band.start_hour != expected_start || band.end_hour <= band.start_hour {
                return Err(SimulationError::InvalidConfig(format!(
                    "staffing band [{}, {}) leaves a gap or overlaps at hour {}",
                    band.start_hour, band.end_hour, expected_start
                )));
            }
            expected_start = band.end_hour;
        }
        if expected_start != 24 {
            return Err(SimulationError::InvalidConfig(format!(
                "staffing schedule ends at hour {}, must cover 24 hours",
                expected_start
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Simulator
// ============================================================================

/// Complete simulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Seed for the run's random stream
    pub rng_seed: u64,

    /// Disposals before the end of this many days are excluded from the
    /// steady-state list
    pub warm_up_days: usize,

    /// Minutes between a waiting patient's leave-without-being-seen checks
    pub lwbs_reevaluation_minutes: f64,

    /// Global scale on leave-without-being-seen probabilities
    pub lwbs_toughness_factor: f64,

    /// Triage may assign a severity different from the truth
    pub misdiagnosis_enabled: bool,

    /// Zones pull long-waiting patients out for reassessment
    pub reassessment_enabled: bool,

    /// Minutes after zone admission at which reassessment fires
    pub reassessment_delay_minutes: f64,

    /// Scales both the misdiagnosis probability and its spread
    pub severity_noise_multiplier: f64,

    /// Probability that reassessment corrects the assigned severity
    pub reassessment_accuracy: f64,

    /// Ordering of every station's waiting area
    pub queue_policy: PrioritizationPolicy,

    /// Keep the in-memory domain event log
    pub record_event_log: bool,

    pub arrivals: ArrivalConfig,

    /// Triage misdiagnosis base rate per hour of day
    pub misdiagnosis_rates: HourlyTable,

    pub stations: StationsConfig,

    pub staffing: StaffingSchedule,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            warm_up_days: 0,
            lwbs_reevaluation_minutes: 30.0,
            lwbs_toughness_factor: 0.1,
            misdiagnosis_enabled: true,
            reassessment_enabled: true,
            reassessment_delay_minutes: 120.0,
            severity_noise_multiplier: 0.5,
            reassessment_accuracy: 1.0,
            queue_policy: PrioritizationPolicy::HigherAcuityFirst,
            record_event_log: true,
            arrivals: ArrivalConfig::default(),
            misdiagnosis_rates: default_misdiagnosis_rates(),
            stations: StationsConfig::default(),
            staffing: StaffingSchedule::default(),
        }
    }
}

impl SimulatorConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, SimulationError> {
        let config: SimulatorConfig =
            serde_json::from_str(json).map_err(|e| SimulationError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self).map_err(|e| SimulationError::ConfigParse(e.to_string()))
    }

    /// Check every field for values the kernel cannot run with
    pub fn validate(&self) -> Result<(), SimulationError> {
        fn invalid(msg: String) -> Result<(), SimulationError> {
            Err(SimulationError::InvalidConfig(msg))
        }
        fn non_negative(name: &str, value: f64) -> Result<(), SimulationError> {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{} must be finite and >= 0, got {}", name, value));
            }
            Ok(())
        }
        fn probability(name: &str, value: f64) -> Result<(), SimulationError> {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{} must be in [0, 1], got {}", name, value));
            }
            Ok(())
        }

        if !(self.lwbs_reevaluation_minutes > 0.0 && self.lwbs_reevaluation_minutes.is_finite()) {
            return invalid(format!(
                "lwbs_reevaluation_minutes must be > 0, got {}",
                self.lwbs_reevaluation_minutes
            ));
        }
        non_negative("lwbs_toughness_factor", self.lwbs_toughness_factor)?;
        non_negative("reassessment_delay_minutes", self.reassessment_delay_minutes)?;
        non_negative("severity_noise_multiplier", self.severity_noise_multiplier)?;
        probability("reassessment_accuracy", self.reassessment_accuracy)?;

        non_negative("arrivals.constant_per_hour", self.arrivals.constant_per_hour)?;
        for (hour, rate) in self.arrivals.hourly_per_hour.values().enumerate() {
            non_negative(&format!("arrivals.hourly_per_hour[{}]", hour), rate)?;
        }
        for (hour, rate) in self.misdiagnosis_rates.values().enumerate() {
            probability(&format!("misdiagnosis_rates[{}]", hour), rate)?;
        }

        for name in StationName::STATIONS {
            let Some(settings) = self.stations.get(name) else {
                continue;
            };
            if settings.beds == 0 {
                return invalid(format!("{} must have at least one bed", name));
            }
            non_negative(&format!("{} service_mean", name), settings.service_mean)?;
            non_negative(&format!("{} service_std_dev", name), settings.service_std_dev)?;
        }
        if self.reassessment_enabled && self.stations.reassessment.staff == 0 {
            return invalid(
                "reassessment is enabled but the reassessment station has no staff".to_string(),
            );
        }

        self.staffing.validate()
    }
}
