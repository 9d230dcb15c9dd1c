//! Treatment zones
//!
//! A zone is a multi-resource station whose departures leave the
//! department. On top of the shared protocol it:
//!
//! 1. schedules a reassessment check when a not-yet-reassessed patient
//!    arrives, and cancels it the moment treatment starts
//! 2. stretches treatment time for misdiagnosed patients
//! 3. checks for in-treatment death at the scheduled end of treatment
//!    (true ESI 1-3 only)

use crate::arrivals::ServiceTime;
use crate::events::EventKind;
use crate::models::event::Event;
use crate::models::location::{StationKind, ZoneId};
use crate::models::patient::{Esi, Patient, PatientId, PatientRegistry};
use crate::models::waiting_area::PrioritizationPolicy;
use crate::stations::{Departure, ServiceStation, StationContext, StationCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Upper bound on the misdiagnosis service-time multiplier
pub const MAX_PENALTY_FACTOR: f64 = 3.0;

/// Queue wait (minutes) after which a patient counts as waiting too long
pub const LONG_QUEUE_WAIT: f64 = 240.0;

/// Bed-but-no-staff wait (minutes) after which a patient counts as
/// waiting too long
pub const LONG_STAFF_WAIT: f64 = 120.0;

/// Reassessment settings a zone applies to its arrivals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZonePolicy {
    pub reassessment_enabled: bool,
    pub reassessment_delay_minutes: f64,
}

impl Default for ZonePolicy {
    fn default() -> Self {
        Self {
            reassessment_enabled: false,
            reassessment_delay_minutes: 120.0,
        }
    }
}

/// Service-time multiplier for a misdiagnosed patient.
///
/// `(1 + 0.3·|delta|^1.4) × direction × severity weight`, capped at
/// [`MAX_PENALTY_FACTOR`]. Under-diagnosis weighs 1.6, over-diagnosis 1.2.
/// A reassessed patient has had the mistake caught and pays nothing.
pub fn misdiagnosis_penalty(patient: &Patient) -> f64 {
    let record = patient.misdiagnosis();
    if !record.was_misdiagnosed || patient.reassessment().reassessed {
        return 1.0;
    }
    let core = 1.0 + 0.30 * (record.delta.unsigned_abs() as f64).powf(1.4);
    let direction = if record.under_diagnosed() { 1.6 } else { 1.2 };
    let weight = match patient.esi() {
        Esi::Resuscitation | Esi::Emergent => 1.3,
        Esi::Urgent => 1.2,
        Esi::LessUrgent | Esi::NonUrgent => 1.0,
    };
    (core * direction * weight).min(MAX_PENALTY_FACTOR)
}

/// Logistic weight of the pre-treatment wait, 0.5 at two hours
fn delay_factor(wait: f64) -> f64 {
    1.0 / (1.0 + (-(wait - 120.0) / 60.0).exp())
}

/// Saturating weight of time spent in treatment (63% at three hours)
fn treatment_factor(elapsed: f64) -> f64 {
    1.0 - (-elapsed / 180.0).exp()
}

#[derive(Debug, Clone)]
pub struct ZoneStation {
    core: StationCore,
    zone: ZoneId,
    policy: ZonePolicy,
    deaths: Vec<PatientId>,
}

impl ZoneStation {
    pub fn new(
        zone: ZoneId,
        num_beds: usize,
        staff: usize,
        service: ServiceTime,
        queue_policy: PrioritizationPolicy,
        policy: ZonePolicy,
    ) -> Self {
        Self {
            core: StationCore::multi_resource(
                zone.station_name(),
                num_beds,
                staff,
                service,
                queue_policy,
            ),
            zone,
            policy,
            deaths: Vec::new(),
        }
    }

    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    pub fn policy(&self) -> ZonePolicy {
        self.policy
    }

    pub fn deaths(&self) -> &[PatientId] {
        &self.deaths
    }

    /// Death risk for a patient whose treatment is scheduled to end at
    /// `now`, or `None` for severities that carry no in-treatment risk.
    ///
    /// Uses the zone's occupancy as it stands, so call it before the
    /// patient's slot is released.
    pub fn mortality_risk(&self, patient: &Patient, now: f64) -> Option<f64> {
        let (mut base, under_multiplier) = match patient.esi() {
            Esi::Resuscitation => (0.02, 3.0),
            Esi::Emergent => (0.01, 1.75),
            Esi::Urgent => (0.004, 1.25),
            Esi::LessUrgent | Esi::NonUrgent => return None,
        };
        if patient.misdiagnosis().under_diagnosed() {
            base *= under_multiplier;
        }

        let visit = patient.visit(StationKind::Zone);
        let started = visit.processing.unwrap_or(now);
        let wait = visit.waiting_time().unwrap_or(0.0);
        let elapsed = now - started;

        let mut congestion = 1.0;
        if self.core.busy_beds() >= self.core.num_beds() {
            congestion += 0.25;
        }
        if self.core.active_treatments() >= self.core.max_staff() {
            congestion += 0.25;
        }

        Some(base * (0.6 * treatment_factor(elapsed) + 0.4 * delay_factor(wait)) * congestion)
    }

    /// Waiting patients past the long-wait thresholds (queue or staff-wait)
    pub fn patients_waiting_too_long(&self, patients: &PatientRegistry, now: f64) -> Vec<PatientId> {
        let waited = |id: PatientId| {
            patients[id]
                .visit(StationKind::Zone)
                .arrival
                .map_or(0.0, |arrival| now - arrival)
        };
        self.core
            .queue()
            .iter()
            .filter(|&id| waited(id) > LONG_QUEUE_WAIT)
            .chain(self.core.staff_wait().filter(|&id| waited(id) > LONG_STAFF_WAIT))
            .collect()
    }
}

impl ServiceStation for ZoneStation {
    fn core(&self) -> &StationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StationCore {
        &mut self.core
    }

    fn departure_kind(&self) -> EventKind {
        EventKind::ZoneDeparture
    }

    fn on_admit(&mut self, patient: PatientId, ctx: &mut StationContext<'_>) {
        if !self.policy.reassessment_enabled || ctx.patients[patient].reassessment().reassessed {
            return;
        }
        let fire_time = ctx.now + self.policy.reassessment_delay_minutes;
        let handle = ctx
            .calendar
            .schedule(fire_time, EventKind::ReassessmentCheck, Some(patient));
        let previous = ctx.patients[patient]
            .reassessment_mut()
            .pending_check
            .replace(handle);
        assert!(
            previous.is_none(),
            "{} already had a pending reassessment check",
            patient
        );
        ctx.log.log(Event::ReassessmentScheduled {
            time: ctx.now,
            patient,
            fire_time,
        });
    }

    fn on_service_start(&mut self, patient: PatientId, ctx: &mut StationContext<'_>) -> f64 {
        if let Some(handle) = ctx.patients[patient].reassessment_mut().pending_check.take() {
            if ctx.calendar.cancel(handle) {
                ctx.log.log(Event::ReassessmentCancelled {
                    time: ctx.now,
                    patient,
                });
                debug!(time = ctx.now, %patient, zone = ?self.zone, "reassessment cancelled");
            }
        }
        misdiagnosis_penalty(&ctx.patients[patient])
    }

    fn next_destination(&mut self, patient: PatientId, ctx: &mut StationContext<'_>) -> Departure {
        let Some(risk) = self.mortality_risk(&ctx.patients[patient], ctx.now) else {
            return Departure::Discharged;
        };
        if ctx.rng.chance(risk) {
            self.deaths.push(patient);
            info!(time = ctx.now, %patient, zone = ?self.zone, risk, "death in treatment");
            Departure::Died { risk }
        } else {
            Departure::Discharged
        }
    }
}
