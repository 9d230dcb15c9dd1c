//! Leave-without-being-seen model
//!
//! The kernel asks an [`LwbsModel`] for a base probability each time a
//! waiting patient's re-evaluation fires, then scales it by the patient's
//! acuity and the configured toughness factor before drawing.
//!
//! Two models are provided:
//! 1. **LogisticLwbsModel** (default): logistic in crowding, arrival
//!    pressure, time since arrival and night hours
//! 2. **FixedLwbsModel**: constant probability, for scenarios and tests

use crate::core::time::MINUTES_PER_HOUR;
use crate::models::patient::{ArrivalMode, Esi, Patient};
use serde::{Deserialize, Serialize};

/// Probability model for a waiting patient walking out.
///
/// Implementations must be pure: same inputs, same answer. The kernel
/// clamps the result to [0, 1].
pub trait LwbsModel {
    fn predict(
        &self,
        patient: &Patient,
        waiting_count: usize,
        arrival_rate_per_minute: f64,
        door_to_provider_minutes: f64,
        hour_of_day: usize,
    ) -> f64;
}

/// Multiplier applied to the model output by true severity: the sicker
/// the patient, the less likely they leave.
pub fn acuity_modifier(esi: Esi) -> f64 {
    match esi {
        Esi::Resuscitation => 0.01,
        Esi::Emergent => 0.10,
        Esi::Urgent => 0.60,
        Esi::LessUrgent | Esi::NonUrgent => 1.0,
    }
}

/// Logistic model over the kernel's inputs
///
/// `p = 1 / (1 + e^-z)` with
/// `z = intercept + waiting·w + arrivals_per_hour·a + wait_minutes·d
///      + night·n + ambulance·m`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticLwbsModel {
    pub intercept: f64,
    pub per_waiting_patient: f64,
    pub per_hourly_arrival: f64,
    pub per_minute_waited: f64,
    /// Added between 22:00 and 06:59
    pub night_shift: f64,
    /// Added for ambulance arrivals (usually negative)
    pub ambulance: f64,
}

impl Default for LogisticLwbsModel {
    fn default() -> Self {
        Self {
            intercept: -5.5,
            per_waiting_patient: 0.03,
            per_hourly_arrival: 0.08,
            per_minute_waited: 0.012,
            night_shift: 0.4,
            ambulance: -0.5,
        }
    }
}

impl LwbsModel for LogisticLwbsModel {
    fn predict(
        &self,
        patient: &Patient,
        waiting_count: usize,
        arrival_rate_per_minute: f64,
        door_to_provider_minutes: f64,
        hour_of_day: usize,
    ) -> f64 {
        let night = hour_of_day >= 22 || hour_of_day < 7;
        let mut z = self.intercept
            + self.per_waiting_patient * waiting_count as f64
            + self.per_hourly_arrival * arrival_rate_per_minute * MINUTES_PER_HOUR
            + self.per_minute_waited * door_to_provider_minutes.max(0.0);
        if night {
            z += self.night_shift;
        }
        if patient.arrival_mode() == ArrivalMode::Ambulance {
            z += self.ambulance;
        }
        1.0 / (1.0 + (-z).exp())
    }
}

/// Same probability for everyone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedLwbsModel {
    pub probability: f64,
}

impl FixedLwbsModel {
    pub fn new(probability: f64) -> Self {
        Self { probability }
    }

    /// Nobody ever leaves
    pub fn never() -> Self {
        Self::new(0.0)
    }
}

impl LwbsModel for FixedLwbsModel {
    fn predict(&self, _: &Patient, _: usize, _: f64, _: f64, _: usize) -> f64 {
        self.probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patient::{PatientId, PatientProfile};

    fn walk_in() -> Patient {
        Patient::new(PatientId(0), PatientProfile::with_esi(Esi::LessUrgent))
    }

    #[test]
    fn test_logistic_increases_with_wait() {
        let model = LogisticLwbsModel::default();
        let p = walk_in();
        let short = model.predict(&p, 10, 0.2, 10.0, 12);
        let long = model.predict(&p, 10, 0.2, 300.0, 12);
        assert!(long > short);
        assert!((0.0..=1.0).contains(&short) && (0.0..=1.0).contains(&long));
    }

    #[test]
    fn test_night_raises_probability() {
        let model = LogisticLwbsModel::default();
        let p = walk_in();
        assert!(model.predict(&p, 5, 0.1, 60.0, 2) > model.predict(&p, 5, 0.1, 60.0, 14));
    }

    #[test]
    fn test_acuity_modifiers() {
        assert_eq!(acuity_modifier(Esi::Resuscitation), 0.01);
        assert_eq!(acuity_modifier(Esi::Emergent), 0.10);
        assert_eq!(acuity_modifier(Esi::Urgent), 0.60);
        assert_eq!(acuity_modifier(Esi::NonUrgent), 1.0);
    }

    #[test]
    fn test_fixed_never() {
        assert_eq!(FixedLwbsModel::never().predict(&walk_in(), 100, 1.0, 1e6, 3), 0.0);
    }
}
