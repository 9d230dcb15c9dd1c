//! Station state machine
//!
//! Every station in the department (sort, registration, triage, the four
//! treatment zones and the reassessment zone) runs the same admission and
//! service-completion protocol over a [`StationCore`]. Concrete stations
//! plug into the protocol through the hooks on [`ServiceStation`]: which
//! departure event to schedule, what to do on admission and at service
//! start, and where a departing patient goes next.
//!
//! # Resource model
//!
//! - **Single-bed** stations (sort, registration): a bed and the staff
//!   member attending it are one slot. Taking the slot increments both
//!   counters.
//! - **Multi-resource** stations (triage, zones, reassessment): a patient
//!   first takes a bed and waits in the staff-wait queue; service starts
//!   only when a staff slot is also free.
//!
//! # Critical Invariants
//!
//! 1. `0 <= active_treatments <= busy_beds <= num_beds` at every event
//!    boundary
//! 2. A patient is in at most one of {waiting area, staff-wait queue, in
//!    service} here, and its [`PatientLocation`] says which
//! 3. Stations never touch another station's counters; routing decisions
//!    are returned to the engine as a [`Departure`]

pub mod reassessment;
pub mod registration;
pub mod sort;
pub mod triage;
pub mod zone;

pub use reassessment::{ReassessmentCounters, ReassessmentStation};
pub use registration::RegistrationStation;
pub use sort::SortStation;
pub use triage::{route_by_assigned_esi, MisdiagnosisCounters, TriageStation};
pub use zone::{ZoneStation, ZonePolicy};

use crate::arrivals::{sample_service_time, ServiceTime};
use crate::events::{EventCalendar, EventKind};
use crate::models::event::{Event, EventLog};
use crate::models::location::{PatientLocation, StationKind, StationName};
use crate::models::patient::{PatientError, PatientId, PatientRegistry};
use crate::models::waiting_area::{PrioritizationPolicy, WaitingArea};
use crate::orchestrator::engine::SimulationError;
use crate::rng::RngManager;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Everything a station may touch while handling one event.
///
/// Built by the engine for the duration of a single dispatch.
pub struct StationContext<'a> {
    /// Current simulation time (fire time of the event being handled)
    pub now: f64,
    pub calendar: &'a mut EventCalendar,
    pub rng: &'a mut RngManager,
    pub patients: &'a mut PatientRegistry,
    pub log: &'a mut EventLog,
    /// Re-evaluation interval for the leave-without-being-seen chain
    pub lwbs_reevaluation_minutes: f64,
}

/// What happens to a patient whose service just completed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Departure {
    /// Continue to another station
    Route(StationName),
    /// Treated and discharged from the department
    Discharged,
    /// Died at the scheduled end of treatment
    Died { risk: f64 },
}

/// Capacity, counters and collections shared by every station kind
#[derive(Debug, Clone)]
pub struct StationCore {
    name: StationName,
    kind: StationKind,
    multi_resource: bool,
    num_beds: usize,
    max_staff: usize,
    busy_beds: usize,
    active_treatments: usize,
    service: ServiceTime,
    queue: WaitingArea,
    staff_wait: VecDeque<PatientId>,
    departed: Vec<PatientId>,
    lwbs: Vec<PatientId>,
    /// Arrival stamps in arrival order (the clock never moves backward,
    /// so pushing keeps this sorted)
    arrival_times: Vec<f64>,
    total_arrivals: usize,
}

impl StationCore {
    /// Single-bed station: bed and staff are one slot
    pub fn single_bed(
        name: StationName,
        num_beds: usize,
        service: ServiceTime,
        policy: PrioritizationPolicy,
    ) -> Self {
        Self::build(name, false, num_beds, num_beds, service, policy)
    }

    /// Station with separate bed and staff capacity
    pub fn multi_resource(
        name: StationName,
        num_beds: usize,
        max_staff: usize,
        service: ServiceTime,
        policy: PrioritizationPolicy,
    ) -> Self {
        Self::build(name, true, num_beds, max_staff, service, policy)
    }

    fn build(
        name: StationName,
        multi_resource: bool,
        num_beds: usize,
        max_staff: usize,
        service: ServiceTime,
        policy: PrioritizationPolicy,
    ) -> Self {
        let kind = name
            .kind()
            .unwrap_or_else(|| panic!("{} owns no capacity and cannot be a station", name));
        Self {
            name,
            kind,
            multi_resource,
            num_beds,
            max_staff,
            busy_beds: 0,
            active_treatments: 0,
            service,
            queue: WaitingArea::new(policy),
            staff_wait: VecDeque::new(),
            departed: Vec::new(),
            lwbs: Vec::new(),
            arrival_times: Vec::new(),
            total_arrivals: 0,
        }
    }

    pub fn name(&self) -> StationName {
        self.name
    }

    pub fn kind(&self) -> StationKind {
        self.kind
    }

    pub fn is_multi_resource(&self) -> bool {
        self.multi_resource
    }

    pub fn num_beds(&self) -> usize {
        self.num_beds
    }

    pub fn max_staff(&self) -> usize {
        self.max_staff
    }

    pub fn busy_beds(&self) -> usize {
        self.busy_beds
    }

    pub fn active_treatments(&self) -> usize {
        self.active_treatments
    }

    pub fn service(&self) -> ServiceTime {
        self.service
    }

    pub fn queue(&self) -> &WaitingArea {
        &self.queue
    }

    /// Patients holding a bed but not yet seen, in arrival order
    pub fn staff_wait(&self) -> impl Iterator<Item = PatientId> + '_ {
        self.staff_wait.iter().copied()
    }

    pub fn departed(&self) -> &[PatientId] {
        &self.departed
    }

    pub fn lwbs(&self) -> &[PatientId] {
        &self.lwbs
    }

    pub fn arrival_times(&self) -> &[f64] {
        &self.arrival_times
    }

    pub fn total_arrivals(&self) -> usize {
        self.total_arrivals
    }

    /// Queue plus staff-wait
    pub fn waiting_count(&self) -> usize {
        self.queue.len() + self.staff_wait.len()
    }

    /// No bed, or no staff, is free
    pub fn is_full(&self) -> bool {
        self.busy_beds >= self.num_beds || self.active_treatments >= self.max_staff
    }

    /// True if the patient sits in this station's waiting area or staff-wait
    pub fn is_waiting_here(&self, patient: PatientId) -> bool {
        self.queue.contains(patient) || self.staff_wait.contains(&patient)
    }

    pub fn change_policy(&mut self, policy: PrioritizationPolicy) {
        self.queue.change_policy(policy);
    }

    /// Capacity invariant, reported rather than asserted
    pub fn check_capacity(&self) -> Result<(), SimulationError> {
        if self.active_treatments > self.busy_beds || self.busy_beds > self.num_beds {
            return Err(SimulationError::InvariantViolation(format!(
                "{}: active {} / busy {} / beds {}",
                self.name, self.active_treatments, self.busy_beds, self.num_beds
            )));
        }
        Ok(())
    }

    fn has_free_bed(&self) -> bool {
        self.busy_beds < self.num_beds
    }

    fn has_free_staff(&self) -> bool {
        self.active_treatments < self.max_staff
    }

    fn register_arrival(&mut self, now: f64) {
        self.arrival_times.push(now);
        self.total_arrivals += 1;
    }

    fn take_bed(&mut self) {
        assert!(self.has_free_bed(), "{} has no free bed", self.name);
        self.busy_beds += 1;
    }

    fn take_staff(&mut self) {
        assert!(
            self.active_treatments < self.busy_beds,
            "{} started service without a bed",
            self.name
        );
        self.active_treatments += 1;
    }

    fn release_slot(&mut self) {
        assert!(
            self.active_treatments > 0 && self.busy_beds > 0,
            "{} released a slot it never held",
            self.name
        );
        self.active_treatments -= 1;
        self.busy_beds -= 1;
    }
}

/// Move a patient the engine believes is alive; a disposed patient in a
/// station collection means the state machine is broken.
pub(crate) fn relocate(patients: &mut PatientRegistry, patient: PatientId, to: PatientLocation) {
    if let Err(err) = patients[patient].move_to(to) {
        panic!("{}", err);
    }
}

/// Start the patient's leave-without-being-seen chain unless one is
/// already running.
pub(crate) fn schedule_lwbs_check(patient: PatientId, ctx: &mut StationContext<'_>) {
    let record = &mut ctx.patients[patient];
    if record.lwbs_check_pending() {
        return;
    }
    record.set_lwbs_check_pending(true);
    ctx.calendar.schedule(
        ctx.now + ctx.lwbs_reevaluation_minutes,
        EventKind::DecideToLwbs,
        Some(patient),
    );
}

/// Shared admission / service / departure protocol.
///
/// Implementors provide the core and the hooks; the protocol itself lives
/// in the provided methods and is not meant to be overridden.
pub trait ServiceStation {
    fn core(&self) -> &StationCore;

    fn core_mut(&mut self) -> &mut StationCore;

    /// Calendar event marking the end of service here
    fn departure_kind(&self) -> EventKind;

    /// Called after a patient has joined the waiting area, before any
    /// attempt to start service
    fn on_admit(&mut self, _patient: PatientId, _ctx: &mut StationContext<'_>) {}

    /// Called when service begins. Returns a multiplier on the drawn
    /// service duration.
    fn on_service_start(&mut self, _patient: PatientId, _ctx: &mut StationContext<'_>) -> f64 {
        1.0
    }

    /// Decide where a patient goes once its service is over. Called before
    /// the slot is released, so counters still include this patient.
    fn next_destination(&mut self, patient: PatientId, ctx: &mut StationContext<'_>)
        -> Departure;

    fn name(&self) -> StationName {
        self.core().name()
    }

    /// Queue a patient at this station and start service if capacity allows.
    ///
    /// Rejects a patient that has already been disposed.
    fn admit(
        &mut self,
        patient: PatientId,
        ctx: &mut StationContext<'_>,
    ) -> Result<(), PatientError> {
        let name = self.name();
        let kind = self.core().kind();
        let now = ctx.now;
        {
            let record = &mut ctx.patients[patient];
            record.move_to(PatientLocation::Queued(name))?;
            let visit = record.visit_mut(kind);
            visit.arrival = Some(now);
            visit.departure = None;
        }

        let core = self.core_mut();
        core.register_arrival(now);
        let added = core.queue.add(&ctx.patients[patient]);
        assert!(added, "{} admitted twice to {}", patient, name);

        schedule_lwbs_check(patient, ctx);
        ctx.log.log(Event::Admitted {
            time: now,
            patient,
            station: name,
        });
        debug!(time = now, %patient, station = %name, "admitted");

        self.on_admit(patient, ctx);
        self.start_service_if_capacity(ctx);
        Ok(())
    }

    /// Fill free beds from the waiting area, then free staff slots from the
    /// staff-wait queue.
    fn start_service_if_capacity(&mut self, ctx: &mut StationContext<'_>) {
        let name = self.name();
        if !self.core().is_multi_resource() {
            while self.core().has_free_bed() {
                let Ok(next) = self.core_mut().queue.poll_highest_priority() else {
                    break;
                };
                self.core_mut().take_bed();
                self.begin_service(next, ctx);
            }
            return;
        }

        while self.core().has_free_bed() {
            let Ok(next) = self.core_mut().queue.poll_highest_priority() else {
                break;
            };
            let core = self.core_mut();
            core.take_bed();
            core.staff_wait.push_back(next);
            relocate(ctx.patients, next, PatientLocation::AwaitingStaff(name));
            trace!(time = ctx.now, patient = %next, station = %name, "bed assigned");
        }

        while self.core().has_free_staff() {
            let Some(next) = self.core_mut().staff_wait.pop_front() else {
                break;
            };
            self.begin_service(next, ctx);
        }
    }

    /// Take a staff slot and schedule the departure. The bed is already held.
    fn begin_service(&mut self, patient: PatientId, ctx: &mut StationContext<'_>) {
        let name = self.name();
        let kind = self.core().kind();
        self.core_mut().take_staff();
        relocate(ctx.patients, patient, PatientLocation::InService(name));
        ctx.patients[patient].visit_mut(kind).processing = Some(ctx.now);

        let multiplier = self.on_service_start(patient, ctx);
        let duration = sample_service_time(&self.core().service(), ctx.rng) * multiplier;
        ctx.calendar
            .schedule(ctx.now + duration, self.departure_kind(), Some(patient));

        ctx.log.log(Event::TreatmentStarted {
            time: ctx.now,
            patient,
            station: name,
            duration,
        });
        trace!(time = ctx.now, %patient, station = %name, duration, "service started");
    }

    /// Finish service for a patient: decide its destination, release the
    /// slot, and pull the next waiting patient in.
    ///
    /// # Panics
    /// Panics if the patient is not in service at this station.
    fn complete_service(&mut self, patient: PatientId, ctx: &mut StationContext<'_>) -> Departure {
        let name = self.name();
        let kind = self.core().kind();
        let location = ctx.patients[patient].location();
        assert_eq!(
            location,
            PatientLocation::InService(name),
            "departure from {} for {} which is not in service there",
            name,
            patient
        );

        let departure = self.next_destination(patient, ctx);
        self.core_mut().release_slot();

        if !matches!(departure, Departure::Died { .. }) {
            ctx.patients[patient].visit_mut(kind).departure = Some(ctx.now);
            self.core_mut().departed.push(patient);
            ctx.log.log(Event::Departed {
                time: ctx.now,
                patient,
                station: name,
            });
        }
        debug!(time = ctx.now, %patient, station = %name, ?departure, "service complete");

        self.start_service_if_capacity(ctx);
        departure
    }

    /// Remove a patient from wherever it waits at this station. A patient
    /// holding a bed gives it up, and the bed goes to the next in line.
    ///
    /// Returns false if the patient is not waiting here.
    fn remove_waiting(&mut self, patient: PatientId, ctx: &mut StationContext<'_>) -> bool {
        let core = self.core_mut();
        if core.queue.remove(patient) {
            return true;
        }
        let Some(pos) = core.staff_wait.iter().position(|&p| p == patient) else {
            return false;
        };
        core.staff_wait.remove(pos);
        assert!(core.busy_beds > core.active_treatments, "{} bed count out of sync", core.name);
        core.busy_beds -= 1;
        self.start_service_if_capacity(ctx);
        true
    }

    /// Record a patient who left this station without being seen
    fn record_lwbs(&mut self, patient: PatientId) {
        self.core_mut().lwbs.push(patient);
    }

    /// Change staff capacity and start any service it unblocks. Returns the
    /// previous capacity if it changed.
    fn set_staff(&mut self, staff: usize, ctx: &mut StationContext<'_>) -> Option<usize> {
        let core = self.core_mut();
        if !core.multi_resource || core.max_staff == staff {
            return None;
        }
        let previous = core.max_staff;
        core.max_staff = staff;
        self.start_service_if_capacity(ctx);
        Some(previous)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Owned pieces a `StationContext` borrows from, for station unit tests
    pub struct Harness {
        pub now: f64,
        pub calendar: EventCalendar,
        pub rng: RngManager,
        pub patients: PatientRegistry,
        pub log: EventLog,
    }

    impl Harness {
        pub fn new(seed: u64) -> Self {
            Self {
                now: 0.0,
                calendar: EventCalendar::new(),
                rng: RngManager::new(seed),
                patients: PatientRegistry::new(),
                log: EventLog::new(),
            }
        }

        pub fn ctx(&mut self) -> StationContext<'_> {
            StationContext {
                now: self.now,
                calendar: &mut self.calendar,
                rng: &mut self.rng,
                patients: &mut self.patients,
                log: &mut self.log,
                lwbs_reevaluation_minutes: 30.0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::Harness;
    use super::*;
    use crate::models::patient::{Esi, PatientProfile};

    #[test]
    fn test_single_bed_station_serves_one_at_a_time() {
        let mut h = Harness::new(3);
        let mut station = SortStation::new(1, ServiceTime::new(4.0, 2.0), PrioritizationPolicy::default());
        let a = h.patients.create(PatientProfile::with_esi(Esi::Urgent));
        let b = h.patients.create(PatientProfile::with_esi(Esi::Urgent));

        station.admit(a, &mut h.ctx()).unwrap();
        station.admit(b, &mut h.ctx()).unwrap();

        let core = station.core();
        assert_eq!(core.busy_beds(), 1);
        assert_eq!(core.active_treatments(), 1);
        assert_eq!(core.queue().len(), 1);
        assert_eq!(h.patients[a].location(), PatientLocation::InService(StationName::Sort));
        assert_eq!(h.patients[b].location(), PatientLocation::Queued(StationName::Sort));
    }

    #[test]
    fn test_admit_rejects_disposed_patient() {
        let mut h = Harness::new(3);
        let mut station = SortStation::new(1, ServiceTime::new(4.0, 2.0), PrioritizationPolicy::default());
        let p = h.patients.create(PatientProfile::with_esi(Esi::Urgent));
        h.patients[p]
            .set_outcome(crate::models::patient::Outcome::LeftWithoutBeingSeen, 1.0)
            .unwrap();

        assert!(station.admit(p, &mut h.ctx()).is_err());
        assert_eq!(station.core().total_arrivals(), 0);
    }

    #[test]
    fn test_lwbs_chain_scheduled_once() {
        let mut h = Harness::new(3);
        let mut station = SortStation::new(1, ServiceTime::new(4.0, 2.0), PrioritizationPolicy::default());
        let p = h.patients.create(PatientProfile::with_esi(Esi::Urgent));
        station.admit(p, &mut h.ctx()).unwrap();

        let lwbs_checks = h
            .calendar
            .iter()
            .filter(|e| e.kind == EventKind::DecideToLwbs)
            .count();
        assert_eq!(lwbs_checks, 1);
        assert!(h.patients[p].lwbs_check_pending());
    }
}
