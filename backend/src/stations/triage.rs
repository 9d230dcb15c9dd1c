//! Triage: assign a severity and route to a treatment zone.
//!
//! When misdiagnosis is enabled the assigned severity may differ from the
//! true one. The chance of a mistake follows the time-of-day base rate,
//! grows with triage congestion, and scales with the configured severity
//! noise. The assigned severity, right or wrong, decides the zone.

use crate::arrivals::{HourlyTable, ServiceTime};
use crate::events::EventKind;
use crate::models::event::Event;
use crate::models::location::{StationName, ZoneId};
use crate::models::patient::{Esi, PatientId};
use crate::models::waiting_area::PrioritizationPolicy;
use crate::rng::RngManager;
use crate::stations::{Departure, ServiceStation, StationContext, StationCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Overload term is capped at this many waiting patients per staff member
const MAX_OVERLOAD: f64 = 3.0;

/// Zone for an assigned severity.
///
/// ESI 1 → acute, ESI 2 → secondary acute, ESI 3 → secondary acute one
/// time in three else lower acuity, ESI 4 → lower acuity one time in five
/// else fast track, ESI 5 → fast track.
pub fn route_by_assigned_esi(esi: Esi, rng: &mut RngManager) -> ZoneId {
    match esi {
        Esi::Resuscitation => ZoneId::Eru,
        Esi::Emergent => ZoneId::Red,
        Esi::Urgent => {
            if rng.chance(1.0 / 3.0) {
                ZoneId::Red
            } else {
                ZoneId::Green
            }
        }
        Esi::LessUrgent => {
            if rng.chance(0.2) {
                ZoneId::Green
            } else {
                ZoneId::FastTrack
            }
        }
        Esi::NonUrgent => ZoneId::FastTrack,
    }
}

/// Misdiagnosis tallies kept for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MisdiagnosisCounters {
    pub total: usize,
    /// Assigned a milder (numerically higher) ESI than the truth
    pub under: usize,
    /// Assigned a more severe (numerically lower) ESI than the truth
    pub over: usize,
    /// Indexed by true ESI level - 1
    pub by_true_esi: [usize; 5],
}

impl MisdiagnosisCounters {
    pub fn for_esi(&self, esi: Esi) -> usize {
        self.by_true_esi[esi.level() as usize - 1]
    }
}

#[derive(Debug, Clone)]
pub struct TriageStation {
    core: StationCore,
    misdiagnosis_enabled: bool,
    severity_noise_multiplier: f64,
    misdiagnosis_rates: HourlyTable,
    counters: MisdiagnosisCounters,
}

impl TriageStation {
    pub fn new(
        num_beds: usize,
        staff: usize,
        service: ServiceTime,
        policy: PrioritizationPolicy,
    ) -> Self {
        Self {
            core: StationCore::multi_resource(StationName::Triage, num_beds, staff, service, policy),
            misdiagnosis_enabled: false,
            severity_noise_multiplier: 1.0,
            misdiagnosis_rates: HourlyTable::constant(0.0),
            counters: MisdiagnosisCounters::default(),
        }
    }

    /// Enable diagnosis errors with the given hourly base rates
    pub fn with_misdiagnosis(mut self, rates: HourlyTable, noise_multiplier: f64) -> Self {
        self.misdiagnosis_enabled = true;
        self.misdiagnosis_rates = rates;
        self.severity_noise_multiplier = noise_multiplier;
        self
    }

    pub fn misdiagnosis_enabled(&self) -> bool {
        self.misdiagnosis_enabled
    }

    pub fn counters(&self) -> &MisdiagnosisCounters {
        &self.counters
    }

    /// Probability that a non-ESI-1 patient is misjudged right now
    pub fn misdiagnosis_probability(&self, now: f64) -> f64 {
        let overload = (self.core.queue().len() as f64 / (self.core.max_staff() as f64 + 1.0))
            .min(MAX_OVERLOAD);
        self.misdiagnosis_rates.at_time(now)
            * (1.0 + 0.2 * overload)
            * 1.5
            * self.severity_noise_multiplier
    }

    /// Draw the severity triage assigns to this patient
    fn diagnose(&mut self, patient: PatientId, ctx: &mut StationContext<'_>) -> Esi {
        let record = &ctx.patients[patient];
        let true_esi = record.esi();
        let complexity = record.complexity();

        let assigned = if true_esi == Esi::Resuscitation {
            let rare_mistake = 0.01 * (1.0 + 0.5 * complexity);
            if !ctx.rng.chance(rare_mistake) {
                true_esi
            } else if ctx.rng.chance(0.7) {
                Esi::Emergent
            } else {
                Esi::Urgent
            }
        } else if ctx.rng.chance(self.misdiagnosis_probability(ctx.now)) {
            self.perturb(true_esi, ctx.rng)
        } else {
            true_esi
        };

        if assigned != true_esi {
            self.counters.total += 1;
            self.counters.by_true_esi[true_esi.level() as usize - 1] += 1;
            if assigned > true_esi {
                self.counters.under += 1;
            } else {
                self.counters.over += 1;
            }
            ctx.patients[patient].record_misdiagnosis(assigned);
            ctx.log.log(Event::Misdiagnosed {
                time: ctx.now,
                patient,
                true_esi,
                assigned_esi: assigned,
            });
            debug!(time = ctx.now, %patient, ?true_esi, ?assigned, "misdiagnosed");
        }
        assigned
    }

    /// Biased, noisy severity around the truth. Never below ESI 2 for a
    /// patient who is truly ESI 3 or milder.
    fn perturb(&self, true_esi: Esi, rng: &mut RngManager) -> Esi {
        let bias = match true_esi {
            Esi::Resuscitation => 0.0,
            Esi::Emergent => {
                if rng.chance(0.05) {
                    -1.0
                } else {
                    1.0
                }
            }
            Esi::Urgent => {
                if rng.chance(0.4) {
                    -1.0
                } else {
                    1.0
                }
            }
            Esi::LessUrgent => {
                if rng.chance(0.3) {
                    -1.0
                } else {
                    1.0
                }
            }
            Esi::NonUrgent => {
                if rng.chance(0.6) {
                    -1.0
                } else {
                    -2.0
                }
            }
        };
        let std_dev = if true_esi == Esi::Urgent { 1.2 } else { 1.0 };
        let drawn = rng.normal(
            true_esi.level() as f64 + bias,
            std_dev * self.severity_noise_multiplier,
        );
        let diagnosed = Esi::clamped(drawn.clamp(1.0, 5.0).round() as i64);
        if true_esi >= Esi::Urgent && diagnosed < Esi::Emergent {
            Esi::Emergent
        } else {
            diagnosed
        }
    }
}

impl ServiceStation for TriageStation {
    fn core(&self) -> &StationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StationCore {
        &mut self.core
    }

    fn departure_kind(&self) -> EventKind {
        EventKind::TriageDeparture
    }

    fn next_destination(&mut self, patient: PatientId, ctx: &mut StationContext<'_>) -> Departure {
        let assigned = if self.misdiagnosis_enabled {
            self.diagnose(patient, ctx)
        } else {
            ctx.patients[patient].esi()
        };
        ctx.patients[patient].set_assigned_esi(assigned);

        let zone = route_by_assigned_esi(assigned, ctx.rng);
        ctx.patients[patient].set_original_zone(zone);
        Departure::Route(zone.station_name())
    }
}
