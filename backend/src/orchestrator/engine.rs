//! Simulator Engine
//!
//! Main event loop integrating all components:
//! - ED arrivals (generated from the hourly rate table, or injected)
//! - Station admission, service and departure
//! - Time-of-day staffing
//! - Reassessment cycle (pull a waiting zone patient, re-triage, re-route)
//! - Leave-without-being-seen re-evaluation chain
//! - Event logging (complete patient-flow history)
//!
//! # Architecture
//!
//! ```text
//! Loop:
//! 1. Pop the earliest event from the calendar
//! 2. Advance the clock to its fire time
//! 3. Apply the staffing band for the current hour (may start service)
//! 4. Dispatch:
//!    - EdArrival           -> admit to sort, schedule next arrival
//!    - *Departure          -> station completes service, engine routes
//!    - ReassessmentCheck   -> reassessment cycle
//!    - DecideToLwbs        -> LWBS decision for the patient
//! ```
//!
//! Handlers run to completion; the pop is the only suspension point.
//!
//! # Example
//!
//! ```rust
//! use ed_simulator_core_rs::orchestrator::{Simulator, SimulatorConfig};
//!
//! let config = SimulatorConfig {
//!     rng_seed: 12345,
//!     ..SimulatorConfig::default()
//! };
//!
//! let mut sim = Simulator::new(config).unwrap();
//! sim.run_for_days(1.0).unwrap();
//!
//! assert!(sim.total_arrivals() > 0);
//! sim.verify_invariants().unwrap();
//! ```

use crate::arrivals::sample_interarrival;
use crate::core::time::{hour_of_day, TimeManager, MINUTES_PER_DAY};
use crate::events::{EventCalendar, EventKind, ScheduledEvent};
use crate::lwbs::{acuity_modifier, LogisticLwbsModel, LwbsModel};
use crate::models::event::{Event, EventLog};
use crate::models::location::{PatientLocation, StationKind, StationName, ZoneId};
use crate::models::patient::{
    Outcome, Patient, PatientError, PatientId, PatientProfile, PatientRegistry,
};
use crate::models::waiting_area::PrioritizationPolicy;
use crate::orchestrator::config::SimulatorConfig;
use crate::rng::RngManager;
use crate::stations::{
    schedule_lwbs_check, Departure, ReassessmentStation, RegistrationStation, ServiceStation,
    SortStation, StationContext, TriageStation, ZonePolicy, ZoneStation,
};
use crate::statistics::Property;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

// ============================================================================
// Errors and results
// ============================================================================

/// Simulation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Unknown station: {0}")]
    UnknownStation(StationName),

    #[error("Station {station} does not support {property:?}")]
    UnsupportedProperty {
        station: StationName,
        property: Property,
    },

    #[error("Patient not found: {0}")]
    PatientNotFound(PatientId),

    #[error("Patient {0} has already been disposed")]
    PatientAlreadyDisposed(PatientId),

    #[error("Waiting area at {0} is empty")]
    EmptyWaitingArea(StationName),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl From<PatientError> for SimulationError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::AlreadyDisposed(id) | PatientError::OutcomeAlreadySet { id, .. } => {
                SimulationError::PatientAlreadyDisposed(id)
            }
        }
    }
}

/// Result of a single step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// Fire time of the dispatched event
    pub time: f64,
    pub kind: EventKind,
    pub patient: Option<PatientId>,
}

// ============================================================================
// Shared state
// ============================================================================

/// Calendar, random stream, patients and log: the pieces every station
/// handler borrows through a [`StationContext`].
struct FlowState {
    calendar: EventCalendar,
    rng: RngManager,
    patients: PatientRegistry,
    log: EventLog,
}

impl FlowState {
    fn context(&mut self, now: f64, lwbs_reevaluation_minutes: f64) -> StationContext<'_> {
        StationContext {
            now,
            calendar: &mut self.calendar,
            rng: &mut self.rng,
            patients: &mut self.patients,
            log: &mut self.log,
            lwbs_reevaluation_minutes,
        }
    }
}

/// Every station in the department
struct Stations {
    sort: SortStation,
    registration: RegistrationStation,
    triage: TriageStation,
    reassessment: ReassessmentStation,
    /// Indexed by [`ZoneId::index`]
    zones: [ZoneStation; 4],
}

impl Stations {
    fn build(config: &SimulatorConfig) -> Self {
        let settings = &config.stations;
        let policy = config.queue_policy;
        let zone_policy = ZonePolicy {
            reassessment_enabled: config.reassessment_enabled,
            reassessment_delay_minutes: config.reassessment_delay_minutes,
        };

        let mut triage = TriageStation::new(
            settings.triage.beds,
            settings.triage.staff,
            settings.triage.service(),
            policy,
        );
        if config.misdiagnosis_enabled {
            triage = triage.with_misdiagnosis(
                config.misdiagnosis_rates,
                config.severity_noise_multiplier,
            );
        }

        let zone = |id: ZoneId| {
            let s = settings.get(id.station_name()).copied().unwrap_or(settings.green);
            ZoneStation::new(id, s.beds, s.staff, s.service(), policy, zone_policy)
        };

        Self {
            sort: SortStation::new(settings.sort.beds, settings.sort.service(), policy),
            registration: RegistrationStation::new(
                settings.registration.beds,
                settings.registration.service(),
                policy,
            ),
            triage,
            reassessment: ReassessmentStation::new(
                settings.reassessment.beds,
                settings.reassessment.staff,
                settings.reassessment.service(),
                policy,
                config.reassessment_accuracy,
            ),
            zones: ZoneId::ALL.map(zone),
        }
    }

    fn get(&self, name: StationName) -> Result<&dyn ServiceStation, SimulationError> {
        Ok(match name {
            StationName::Sort => &self.sort,
            StationName::Registration => &self.registration,
            StationName::Triage => &self.triage,
            StationName::Reassessment => &self.reassessment,
            StationName::Eru | StationName::Red | StationName::Green | StationName::FastTrack => {
                let zone = name.zone().ok_or(SimulationError::UnknownStation(name))?;
                &self.zones[zone.index()]
            }
            StationName::Ed => return Err(SimulationError::UnknownStation(name)),
        })
    }

    fn get_mut(&mut self, name: StationName) -> Result<&mut dyn ServiceStation, SimulationError> {
        Ok(match name {
            StationName::Sort => &mut self.sort,
            StationName::Registration => &mut self.registration,
            StationName::Triage => &mut self.triage,
            StationName::Reassessment => &mut self.reassessment,
            StationName::Eru | StationName::Red | StationName::Green | StationName::FastTrack => {
                let zone = name.zone().ok_or(SimulationError::UnknownStation(name))?;
                &mut self.zones[zone.index()]
            }
            StationName::Ed => return Err(SimulationError::UnknownStation(name)),
        })
    }

    fn iter(&self) -> impl Iterator<Item = &dyn ServiceStation> {
        let intake: [&dyn ServiceStation; 4] = [
            &self.sort,
            &self.registration,
            &self.triage,
            &self.reassessment,
        ];
        intake
            .into_iter()
            .chain(self.zones.iter().map(|z| z as &dyn ServiceStation))
    }
}

fn station_for_departure(kind: EventKind) -> Option<StationName> {
    match kind {
        EventKind::SortDeparture => Some(StationName::Sort),
        EventKind::RegistrationDeparture => Some(StationName::Registration),
        EventKind::TriageDeparture => Some(StationName::Triage),
        EventKind::ReassessmentDeparture => Some(StationName::Reassessment),
        _ => None,
    }
}

// ============================================================================
// Simulator
// ============================================================================

/// Emergency department simulator owning the clock, the calendar, every
/// station and every patient of one run.
///
/// # Determinism
///
/// All randomness goes through one seeded xorshift64* stream. Same seed +
/// same config = identical run, event for event.
pub struct Simulator {
    config: SimulatorConfig,
    time: TimeManager,
    state: FlowState,
    stations: Stations,
    lwbs_model: Box<dyn LwbsModel>,

    /// Every disposed patient, in disposal order
    disposed: Vec<PatientId>,

    /// Disposals at or after the warm-up cutoff
    steady_state_disposed: Vec<PatientId>,

    warm_up_end: f64,
    events_processed: u64,
}

impl Simulator {
    /// Create a simulator from configuration and schedule the first arrival.
    ///
    /// # Errors
    ///
    /// * `InvalidConfig` - configuration validation failed
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let log = if config.record_event_log {
            EventLog::new()
        } else {
            EventLog::disabled()
        };
        let state = FlowState {
            calendar: EventCalendar::new(),
            rng: RngManager::new(config.rng_seed),
            patients: PatientRegistry::new(),
            log,
        };
        let stations = Stations::build(&config);
        let warm_up_end = config.warm_up_days as f64 * MINUTES_PER_DAY;

        let mut sim = Self {
            config,
            time: TimeManager::new(),
            state,
            stations,
            lwbs_model: Box::new(LogisticLwbsModel::default()),
            disposed: Vec::new(),
            steady_state_disposed: Vec::new(),
            warm_up_end,
            events_processed: 0,
        };
        sim.apply_staffing(0.0)?;
        sim.schedule_next_arrival();
        info!(seed = sim.config.rng_seed, "simulator initialized");
        Ok(sim)
    }

    /// Replace the leave-without-being-seen model
    pub fn with_lwbs_model(mut self, model: impl LwbsModel + 'static) -> Self {
        self.lwbs_model = Box::new(model);
        self
    }

    // ========================================================================
    // Main loop
    // ========================================================================

    /// Pop and dispatch one event. Returns `None` once the calendar is empty.
    pub fn step(&mut self) -> Result<Option<StepResult>, SimulationError> {
        let Some(event) = self.state.calendar.pop_earliest() else {
            return Ok(None);
        };
        let now = event.time();
        self.time.advance_to(now);
        trace!(time = now, kind = %event.kind, patient = ?event.patient, "dispatch");

        self.apply_staffing(now)?;
        self.dispatch(event)?;
        self.events_processed += 1;

        Ok(Some(StepResult {
            time: now,
            kind: event.kind,
            patient: event.patient,
        }))
    }

    /// Process events until the next one is at or after `end`, or none are
    /// left. Returns the number of events dispatched.
    pub fn run_until(&mut self, end: f64) -> Result<u64, SimulationError> {
        let start = self.events_processed;
        while let Some(next) = self.state.calendar.peek_time() {
            if next >= end {
                break;
            }
            self.step()?;
        }
        let processed = self.events_processed - start;
        info!(end, processed, now = self.now(), "run complete");
        Ok(processed)
    }

    /// Run from time zero through the end of `days` simulated days
    pub fn run_for_days(&mut self, days: f64) -> Result<u64, SimulationError> {
        self.run_until(days * MINUTES_PER_DAY)
    }

    /// Schedule an ED arrival for a caller-specified patient at `time`.
    ///
    /// # Errors
    ///
    /// * `InvalidConfig` - `time` is not finite or lies in the past
    pub fn inject_patient(
        &mut self,
        time: f64,
        profile: PatientProfile,
    ) -> Result<PatientId, SimulationError> {
        if !time.is_finite() || time < self.now() {
            return Err(SimulationError::InvalidConfig(format!(
                "cannot inject a patient at {} (now {})",
                time,
                self.now()
            )));
        }
        let id = self.state.patients.create(profile);
        self.state
            .calendar
            .schedule(time, EventKind::EdArrival, Some(id));
        debug!(time, patient = %id, "patient injected");
        Ok(id)
    }

    fn dispatch(&mut self, event: ScheduledEvent) -> Result<(), SimulationError> {
        match event.kind {
            EventKind::EdArrival => self.handle_arrival(event.patient),
            EventKind::SortDeparture
            | EventKind::RegistrationDeparture
            | EventKind::TriageDeparture
            | EventKind::ReassessmentDeparture
            | EventKind::ZoneDeparture => {
                let patient = self.event_patient(&event)?;
                self.handle_departure(event.kind, patient)
            }
            EventKind::ReassessmentCheck => self.run_reassessment_cycle(event),
            EventKind::DecideToLwbs => {
                let patient = self.event_patient(&event)?;
                self.process_lwbs_decision(patient)
            }
        }
    }

    fn event_patient(&self, event: &ScheduledEvent) -> Result<PatientId, SimulationError> {
        let id = event
            .patient
            .unwrap_or_else(|| panic!("{} event without a patient", event.kind));
        self.state
            .patients
            .get(id)
            .map(|p| p.id())
            .ok_or(SimulationError::PatientNotFound(id))
    }

    // ========================================================================
    // Arrivals and routing
    // ========================================================================

    fn schedule_next_arrival(&mut self) {
        let now = self.now();
        let rate = self.config.arrivals.rate_per_minute(now);
        let gap = sample_interarrival(rate, &mut self.state.rng);
        self.state
            .calendar
            .schedule(now + gap, EventKind::EdArrival, None);
    }

    fn handle_arrival(&mut self, injected: Option<PatientId>) -> Result<(), SimulationError> {
        let now = self.now();
        let id = match injected {
            Some(id) => id,
            None => {
                let profile = PatientProfile::sample(&mut self.state.rng);
                self.state.patients.create(profile)
            }
        };
        let esi = self.state.patients[id].esi();
        self.state.log.log(Event::Arrival {
            time: now,
            patient: id,
            esi,
        });
        debug!(time = now, patient = %id, ?esi, "ED arrival");

        self.admit_to(StationName::Sort, id)?;
        if injected.is_none() {
            self.schedule_next_arrival();
        }
        Ok(())
    }

    fn admit_to(&mut self, station: StationName, patient: PatientId) -> Result<(), SimulationError> {
        let mut ctx = self
            .state
            .context(self.time.current_time(), self.config.lwbs_reevaluation_minutes);
        self.stations.get_mut(station)?.admit(patient, &mut ctx)?;
        Ok(())
    }

    fn handle_departure(&mut self, kind: EventKind, patient: PatientId) -> Result<(), SimulationError> {
        let now = self.now();
        let station = match station_for_departure(kind) {
            Some(name) => name,
            None => self.state.patients[patient]
                .location()
                .station()
                .filter(|s| s.zone().is_some())
                .unwrap_or_else(|| panic!("zone departure for {} outside any zone", patient)),
        };

        let departure = {
            let mut ctx = self
                .state
                .context(now, self.config.lwbs_reevaluation_minutes);
            self.stations.get_mut(station)?.complete_service(patient, &mut ctx)
        };

        match departure {
            Departure::Route(next) => {
                self.state.log.log(Event::Routed {
                    time: now,
                    patient,
                    from: station,
                    to: next,
                });
                self.admit_to(next, patient)
            }
            Departure::Discharged => {
                self.state.log.log(Event::Discharged {
                    time: now,
                    patient,
                    station,
                });
                self.dispose(patient, Outcome::Discharged)
            }
            Departure::Died { risk } => {
                self.state.log.log(Event::Death {
                    time: now,
                    patient,
                    station,
                    risk,
                });
                self.dispose(patient, Outcome::Died)
            }
        }
    }

    /// Record the terminal outcome. Each patient is disposed exactly once.
    fn dispose(&mut self, patient: PatientId, outcome: Outcome) -> Result<(), SimulationError> {
        let now = self.now();
        let record = &mut self.state.patients[patient];
        record.set_outcome(outcome, now)?;
        record.set_lwbs_check_pending(false);

        self.disposed.push(patient);
        if now >= self.warm_up_end {
            self.steady_state_disposed.push(patient);
        }
        debug!(time = now, %patient, ?outcome, "disposed");
        Ok(())
    }

    // ========================================================================
    // Staffing
    // ========================================================================

    /// Set staff capacity for the current hour's band and start any service
    /// it unblocks
    fn apply_staffing(&mut self, now: f64) -> Result<(), SimulationError> {
        let hour = hour_of_day(now);
        let levels = *self
            .config
            .staffing
            .levels_at_hour(hour)
            .ok_or_else(|| {
                SimulationError::InvalidConfig(format!("no staffing band covers hour {}", hour))
            })?;

        for (name, staff) in levels.entries() {
            let mut ctx = self
                .state
                .context(now, self.config.lwbs_reevaluation_minutes);
            if let Some(previous) = self.stations.get_mut(name)?.set_staff(staff, &mut ctx) {
                ctx.log.log(Event::StaffingChanged {
                    time: now,
                    station: name,
                    previous,
                    staff,
                });
                debug!(time = now, station = %name, previous, staff, "staffing changed");
            }
        }
        Ok(())
    }

    // ========================================================================
    // Reassessment
    // ========================================================================

    /// Pull a still-waiting zone patient into the reassessment station.
    ///
    /// A patient who has already started treatment should have had its
    /// check cancelled; finding one here is logged and otherwise ignored.
    fn run_reassessment_cycle(&mut self, event: ScheduledEvent) -> Result<(), SimulationError> {
        let patient = self.event_patient(&event)?;
        let now = self.now();

        let record = &mut self.state.patients[patient];
        if record.reassessment().pending_check == Some(event.handle) {
            record.reassessment_mut().pending_check = None;
        }

        let zone_name = match record.location() {
            PatientLocation::Queued(s) | PatientLocation::AwaitingStaff(s)
                if s.zone().is_some() =>
            {
                s
            }
            location => {
                warn!(time = now, %patient, ?location, "reassessment check for patient not waiting in a zone");
                return Ok(());
            }
        };

        let zone_arrival = record.visit(StationKind::Zone).arrival.unwrap_or(now);
        let reassessment = record.reassessment_mut();
        reassessment.time_in_queue_before += now - zone_arrival;
        reassessment.origin_zone = zone_name.zone();

        let mut ctx = self
            .state
            .context(now, self.config.lwbs_reevaluation_minutes);
        let removed = self
            .stations
            .get_mut(zone_name)?
            .remove_waiting(patient, &mut ctx);
        assert!(removed, "{} not waiting at {} as its location claims", patient, zone_name);

        ctx.log.log(Event::ReassessmentTriggered {
            time: now,
            patient,
            zone: zone_name,
        });
        info!(time = now, %patient, zone = %zone_name, "reassessment triggered");

        self.stations.reassessment.admit(patient, &mut ctx)?;
        Ok(())
    }

    // ========================================================================
    // Leave without being seen
    // ========================================================================

    /// One link of a patient's LWBS chain.
    ///
    /// - disposed: chain dropped
    /// - in zone treatment (seen by a provider): chain ends
    /// - in service at an intake station: rescheduled without a draw
    /// - waiting anywhere: draw, then leave or reschedule
    fn process_lwbs_decision(&mut self, patient: PatientId) -> Result<(), SimulationError> {
        let now = self.now();
        let interval = self.config.lwbs_reevaluation_minutes;
        let record = &self.state.patients[patient];
        if record.is_disposed() {
            return Ok(());
        }

        let station = match record.location() {
            PatientLocation::Queued(s) | PatientLocation::AwaitingStaff(s) => s,
            PatientLocation::InService(s) if s.zone().is_none() => {
                self.state.patients[patient].set_lwbs_check_pending(false);
                let mut ctx = self.state.context(now, interval);
                schedule_lwbs_check(patient, &mut ctx);
                return Ok(());
            }
            PatientLocation::InService(_) | PatientLocation::NotArrived | PatientLocation::Disposed => {
                self.state.patients[patient].set_lwbs_check_pending(false);
                return Ok(());
            }
        };

        let probability = self.lwbs_probability(record, now);
        self.state.patients[patient].set_lwbs_probability(probability);

        if !self.state.rng.chance(probability) {
            self.state.patients[patient].set_lwbs_check_pending(false);
            let mut ctx = self.state.context(now, interval);
            schedule_lwbs_check(patient, &mut ctx);
            return Ok(());
        }

        if let Some(handle) = self.state.patients[patient]
            .reassessment_mut()
            .pending_check
            .take()
        {
            if self.state.calendar.cancel(handle) {
                self.state.log.log(Event::ReassessmentCancelled {
                    time: now,
                    patient,
                });
            }
        }

        {
            let mut ctx = self.state.context(now, interval);
            let host = self.stations.get_mut(station)?;
            let removed = host.remove_waiting(patient, &mut ctx);
            assert!(removed, "{} not waiting at {} as its location claims", patient, station);
            host.record_lwbs(patient);
            ctx.log.log(Event::LeftWithoutBeingSeen {
                time: now,
                patient,
                station,
                probability,
            });
        }
        info!(time = now, %patient, station = %station, probability, "left without being seen");
        self.dispose(patient, Outcome::LeftWithoutBeingSeen)
    }

    /// Model output scaled by acuity and toughness, clamped to [0, 1]
    fn lwbs_probability(&self, patient: &Patient, now: f64) -> f64 {
        let waiting = self.total_waiting();
        let rate = self.config.arrivals.rate_per_minute(now);
        let door_to_provider = now - patient.ed_arrival_time().unwrap_or(now);
        let base = self
            .lwbs_model
            .predict(patient, waiting, rate, door_to_provider, hour_of_day(now));
        let p = base.clamp(0.0, 1.0) * acuity_modifier(patient.esi()) * self.config.lwbs_toughness_factor;
        if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Check capacity and single-collection membership across every
    /// station. Reports the first violation found.
    pub fn verify_invariants(&self) -> Result<(), SimulationError> {
        let mut seen = BTreeSet::new();
        for station in self.stations.iter() {
            let core = station.core();
            let name = core.name();
            core.check_capacity()?;

            let queued = core.queue().iter().map(|id| (id, PatientLocation::Queued(name)));
            let in_beds = core
                .staff_wait()
                .map(|id| (id, PatientLocation::AwaitingStaff(name)));
            for (id, expected) in queued.chain(in_beds) {
                if !seen.insert(id) {
                    return Err(SimulationError::InvariantViolation(format!(
                        "{} held by more than one collection",
                        id
                    )));
                }
                let actual = self.state.patients[id].location();
                if actual != expected {
                    return Err(SimulationError::InvariantViolation(format!(
                        "{} at {} but location says {:?}",
                        id, name, actual
                    )));
                }
            }

            let in_service = self
                .state
                .patients
                .iter()
                .filter(|p| p.location() == PatientLocation::InService(name))
                .count();
            if in_service != core.active_treatments() {
                return Err(SimulationError::InvariantViolation(format!(
                    "{}: {} patients in service but {} active treatments",
                    name,
                    in_service,
                    core.active_treatments()
                )));
            }
        }

        for patient in self.state.patients.iter() {
            if patient.location().is_waiting() && !seen.contains(&patient.id()) {
                return Err(SimulationError::InvariantViolation(format!(
                    "{} claims {:?} but no station holds it",
                    patient.id(),
                    patient.location()
                )));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current simulation time (fire time of the last dispatched event)
    pub fn now(&self) -> f64 {
        self.time.current_time()
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn time(&self) -> &TimeManager {
        &self.time
    }

    pub fn calendar(&self) -> &EventCalendar {
        &self.state.calendar
    }

    pub fn event_log(&self) -> &EventLog {
        &self.state.log
    }

    pub fn patients(&self) -> &PatientRegistry {
        &self.state.patients
    }

    pub fn patient(&self, id: PatientId) -> Result<&Patient, SimulationError> {
        self.state
            .patients
            .get(id)
            .ok_or(SimulationError::PatientNotFound(id))
    }

    /// Any station by name. `Ed` is not a station.
    pub fn station(&self, name: StationName) -> Result<&dyn ServiceStation, SimulationError> {
        self.stations.get(name)
    }

    pub fn stations(&self) -> impl Iterator<Item = &dyn ServiceStation> {
        self.stations.iter()
    }

    pub fn sort(&self) -> &SortStation {
        &self.stations.sort
    }

    pub fn registration(&self) -> &RegistrationStation {
        &self.stations.registration
    }

    pub fn triage(&self) -> &TriageStation {
        &self.stations.triage
    }

    pub fn reassessment(&self) -> &ReassessmentStation {
        &self.stations.reassessment
    }

    pub fn zone(&self, zone: ZoneId) -> &ZoneStation {
        &self.stations.zones[zone.index()]
    }

    /// Highest-priority patient waiting for a bed at `station`
    pub fn next_in_line(&self, station: StationName) -> Result<PatientId, SimulationError> {
        self.stations
            .get(station)?
            .core()
            .queue()
            .peek()
            .ok_or(SimulationError::EmptyWaitingArea(station))
    }

    /// Reorder every waiting area under a new policy, keeping membership
    pub fn change_queue_policy(&mut self, policy: PrioritizationPolicy) {
        self.config.queue_policy = policy;
        for name in StationName::STATIONS {
            if let Ok(station) = self.stations.get_mut(name) {
                station.core_mut().change_policy(policy);
            }
        }
    }

    /// Patients waiting anywhere in the department (queues and staff-wait)
    pub fn total_waiting(&self) -> usize {
        self.stations.iter().map(|s| s.core().waiting_count()).sum()
    }

    /// Patients who have walked through the door so far
    pub fn total_arrivals(&self) -> usize {
        self.stations.sort.core().total_arrivals()
    }

    pub fn disposed(&self) -> &[PatientId] {
        &self.disposed
    }

    pub fn steady_state_disposed(&self) -> &[PatientId] {
        &self.steady_state_disposed
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }
}
