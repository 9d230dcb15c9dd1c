//! Run statistics
//!
//! Read-only aggregation over finished patient records and station
//! collections. Nothing here mutates the simulator, so it may be called
//! between steps or after a run.
//!
//! Every mean over an empty sample is 0.0.
//!
//! # Example
//!
//! ```rust
//! use ed_simulator_core_rs::models::location::StationName;
//! use ed_simulator_core_rs::orchestrator::{Simulator, SimulatorConfig};
//! use ed_simulator_core_rs::statistics::{calculate_mean, Property, RunSummary};
//!
//! let mut sim = Simulator::new(SimulatorConfig::default()).unwrap();
//! sim.run_for_days(1.0).unwrap();
//!
//! let triage_wait = calculate_mean(&sim, StationName::Triage, Property::WaitingTime).unwrap();
//! assert!(triage_wait >= 0.0);
//!
//! let summary = RunSummary::from_simulator(&sim);
//! assert!(summary.lwbs_rate >= 0.0 && summary.lwbs_rate <= 1.0);
//! ```

use crate::models::location::{StationName, ZoneId};
use crate::models::patient::{Patient, PatientId, StationVisit};
use crate::orchestrator::engine::{SimulationError, Simulator};
use serde::{Deserialize, Serialize};

/// Quantity a mean can be taken over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    /// Arrival to start of service at a station
    WaitingTime,
    /// Start of service to departure
    ProcessingTime,
    /// Arrival to departure (station), or ED arrival to outcome (ED)
    ResponseTime,
    /// ED arrival to start of zone treatment (ED only)
    DoorToProviderTime,
    /// Gap between consecutive station arrivals
    InterArrivalTime,
}

/// Mean of the finite values in `values`, 0.0 if there are none
pub fn mean_of_finite(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Time a patient spent in the department as a whole.
///
/// Patients who left are counted up to when they left. Discharged patients
/// get back the waiting time reassessment took off their zone clock.
/// Deaths have no response time.
pub fn ed_response_time(patient: &Patient) -> Option<f64> {
    if patient.has_lwbs() {
        return patient.ed_length_of_stay();
    }
    if patient.was_discharged() {
        let los = patient.ed_length_of_stay()?;
        return Some(los + patient.reassessment().time_in_queue_before);
    }
    None
}

/// Mean of `property` at `station` over the patients it has finished with.
///
/// # Errors
///
/// * `UnsupportedProperty` - `Ed` with a per-station property, or a
///   station with `DoorToProviderTime`
pub fn calculate_mean(
    sim: &Simulator,
    station: StationName,
    property: Property,
) -> Result<f64, SimulationError> {
    let unsupported = || SimulationError::UnsupportedProperty { station, property };

    if station == StationName::Ed {
        let disposed = sim.disposed().iter().map(|&id| &sim.patients()[id]);
        return match property {
            Property::DoorToProviderTime => Ok(mean_of_finite(
                disposed.filter_map(Patient::door_to_provider_time),
            )),
            Property::ResponseTime => Ok(mean_of_finite(disposed.filter_map(ed_response_time))),
            _ => Err(unsupported()),
        };
    }

    let core = sim.station(station)?.core();
    let kind = core.kind();
    let visit = |id: &PatientId| -> StationVisit { *sim.patients()[*id].visit(kind) };

    match property {
        Property::InterArrivalTime => Ok(mean_inter_arrival(core.arrival_times())),
        Property::WaitingTime => Ok(mean_of_finite(
            core.departed().iter().map(visit).filter_map(|v| v.waiting_time()),
        )),
        Property::ProcessingTime => Ok(mean_of_finite(
            core.departed().iter().map(visit).filter_map(|v| v.service_time()),
        )),
        Property::ResponseTime => Ok(mean_of_finite(
            core.departed().iter().map(visit).filter_map(|v| v.response_time()),
        )),
        Property::DoorToProviderTime => Err(unsupported()),
    }
}

/// Arrival times are recorded in clock order, so the summed gaps collapse
/// to last minus first.
fn mean_inter_arrival(arrival_times: &[f64]) -> f64 {
    match arrival_times {
        [first, .., last] => (last - first) / (arrival_times.len() - 1) as f64,
        _ => 0.0,
    }
}

pub fn count_deaths<'a>(patients: impl IntoIterator<Item = &'a Patient>) -> usize {
    patients.into_iter().filter(|p| p.died()).count()
}

pub fn count_lwbs<'a>(patients: impl IntoIterator<Item = &'a Patient>) -> usize {
    patients.into_iter().filter(|p| p.has_lwbs()).count()
}

// ============================================================================
// Station metrics
// ============================================================================

/// Observed queueing metrics for one station
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StationMetrics {
    pub mean_waiting_time: f64,
    pub mean_service_time: f64,
    pub mean_response_time: f64,
    pub mean_inter_arrival_time: f64,

    /// Patients who completed service (X)
    pub throughput: usize,

    /// Patients waiting for a bed right now
    pub queue_size: usize,

    /// λ, per minute
    pub arrival_rate: f64,

    /// μ, per minute
    pub service_rate: f64,

    /// ρ = λ / μ
    pub utilization: f64,

    /// Throughput over arrivals
    pub efficiency: f64,
}

impl StationMetrics {
    pub fn compute(sim: &Simulator, station: StationName) -> Result<Self, SimulationError> {
        let core = sim.station(station)?.core();
        let mean_waiting_time = calculate_mean(sim, station, Property::WaitingTime)?;
        let mean_service_time = calculate_mean(sim, station, Property::ProcessingTime)?;
        let mean_response_time = calculate_mean(sim, station, Property::ResponseTime)?;
        let mean_inter_arrival_time = calculate_mean(sim, station, Property::InterArrivalTime)?;

        let throughput = core.departed().len();
        let service_rate = reciprocal(mean_service_time);
        let arrival_rate = reciprocal(mean_inter_arrival_time);
        let utilization = if service_rate > 0.0 {
            arrival_rate / service_rate
        } else {
            0.0
        };
        let efficiency = if core.total_arrivals() > 0 {
            throughput as f64 / core.total_arrivals() as f64
        } else {
            0.0
        };

        Ok(Self {
            mean_waiting_time,
            mean_service_time,
            mean_response_time,
            mean_inter_arrival_time,
            throughput,
            queue_size: core.queue().len(),
            arrival_rate,
            service_rate,
            utilization,
            efficiency,
        })
    }
}

fn reciprocal(x: f64) -> f64 {
    if x > 0.0 {
        1.0 / x
    } else {
        0.0
    }
}

// ============================================================================
// Run summary
// ============================================================================

/// Per-run figures an experiment driver reads back after a replication.
///
/// Length-of-stay figures and the death/LWBS counts cover the steady-state
/// disposals (those at or after the warm-up cutoff). The LWBS rate and the
/// per-zone times cover the whole run, like the station collections they
/// are read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Mean ED length of stay over discharged patients
    pub mean_ed_los: f64,

    /// Mean time from zone arrival to zone departure, indexed by
    /// [`ZoneId::index`]
    pub mean_zone_los: [f64; 4],

    /// Mean ED length of stay of discharged patients, split by the zone
    /// triage first sent them to
    pub mean_ed_los_by_zone: [f64; 4],

    pub deaths: usize,
    pub lwbs: usize,

    /// Patients who left without being seen over ED arrivals
    pub lwbs_rate: f64,

    pub arrivals: usize,
    pub disposed: usize,
}

impl RunSummary {
    pub fn from_simulator(sim: &Simulator) -> Self {
        let patients: Vec<&Patient> = sim
            .steady_state_disposed()
            .iter()
            .map(|&id| &sim.patients()[id])
            .collect();
        let discharged = || patients.iter().filter(|p| p.was_discharged());

        let mean_zone_los = ZoneId::ALL.map(|zone| {
            calculate_mean(sim, zone.station_name(), Property::ResponseTime).unwrap_or(0.0)
        });
        let mean_ed_los_by_zone = ZoneId::ALL.map(|zone| {
            mean_of_finite(
                discharged()
                    .filter(|p| p.original_zone() == Some(zone))
                    .filter_map(|p| p.ed_length_of_stay()),
            )
        });

        let arrivals = sim.total_arrivals();
        let lwbs_rate = if arrivals == 0 {
            0.0
        } else {
            count_lwbs(sim.disposed().iter().map(|&id| &sim.patients()[id])) as f64
                / arrivals as f64
        };

        Self {
            mean_ed_los: mean_of_finite(discharged().filter_map(|p| p.ed_length_of_stay())),
            mean_zone_los,
            mean_ed_los_by_zone,
            deaths: count_deaths(patients.iter().copied()),
            lwbs: count_lwbs(patients.iter().copied()),
            lwbs_rate,
            arrivals,
            disposed: patients.len(),
        }
    }

    pub fn zone_los(&self, zone: ZoneId) -> f64 {
        self.mean_zone_los[zone.index()]
    }

    pub fn ed_los_by_zone(&self, zone: ZoneId) -> f64 {
        self.mean_ed_los_by_zone[zone.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_finite_skips_nan_and_inf() {
        assert_eq!(mean_of_finite([1.0, f64::NAN, 3.0, f64::INFINITY]), 2.0);
        assert_eq!(mean_of_finite(Vec::<f64>::new()), 0.0);
    }

    #[test]
    fn test_inter_arrival_mean() {
        assert_eq!(mean_inter_arrival(&[]), 0.0);
        assert_eq!(mean_inter_arrival(&[5.0]), 0.0);
        assert_eq!(mean_inter_arrival(&[0.0, 2.0, 6.0]), 3.0);
    }

    #[test]
    fn test_reciprocal_of_zero() {
        assert_eq!(reciprocal(0.0), 0.0);
        assert_eq!(reciprocal(4.0), 0.25);
    }
}
