//! Calendar event types
//!
//! A scheduled event is (fire time, kind, target patient). The calendar
//! hands out an [`EventHandle`] for every insertion; the handle is the only
//! way to cancel an event before it fires.

use crate::core::time::SimTime;
use crate::models::patient::PatientId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happens when an event fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A new patient walks through the door
    EdArrival,
    SortDeparture,
    RegistrationDeparture,
    TriageDeparture,
    ReassessmentDeparture,
    /// Scheduled end of zone treatment (mortality is checked here)
    ZoneDeparture,
    /// Pull a still-waiting zone patient for reassessment. Cancellable.
    ReassessmentCheck,
    /// Periodic leave-without-being-seen re-evaluation
    DecideToLwbs,
}

impl EventKind {
    /// Only reassessment checks may be removed before they fire
    pub fn is_cancellable(self) -> bool {
        matches!(self, EventKind::ReassessmentCheck)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::EdArrival => "ED_ARRIVAL",
            EventKind::SortDeparture => "SORT_DEPARTURE",
            EventKind::RegistrationDeparture => "REGISTRATION_DEPARTURE",
            EventKind::TriageDeparture => "TRIAGE_DEPARTURE",
            EventKind::ReassessmentDeparture => "REASSESSMENT_DEPARTURE",
            EventKind::ZoneDeparture => "ZONE_DEPARTURE",
            EventKind::ReassessmentCheck => "REASSESSMENT_CHECK",
            EventKind::DecideToLwbs => "DECIDE_TO_LWBS",
        };
        f.write_str(name)
    }
}

/// Opaque token identifying one scheduled event.
///
/// Handles are never reused within a calendar, so a stale handle (event
/// already fired or cancelled) simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventHandle {
    pub(crate) time: SimTime,
    pub(crate) seq: u64,
}

impl EventHandle {
    /// Fire time of the event this handle refers to
    pub fn time(&self) -> f64 {
        self.time.as_minutes()
    }

    /// Insertion sequence number (same-time tie-break)
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// An event sitting in (or just popped from) the calendar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub handle: EventHandle,
    pub kind: EventKind,
    pub patient: Option<PatientId>,
}

impl ScheduledEvent {
    pub fn time(&self) -> f64 {
        self.handle.time()
    }

    pub fn time_key(&self) -> SimTime {
        self.handle.time
    }
}
