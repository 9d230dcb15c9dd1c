//! Event logging for simulation replay and auditing.
//!
//! The `Event` enum records every significant patient-flow state change in
//! the department, stamped with the simulated time at which it happened.
//! These are domain records, distinct from the calendar entries in
//! [`crate::events`] that drive the loop.
//!
//! # Event Types
//!
//! - **Flow**: arrival, queue admission, treatment start, departure, routing
//! - **Triage**: misdiagnosis
//! - **Reassessment**: scheduled, cancelled, triggered, completed
//! - **Outcome**: LWBS, death, discharge
//! - **Staffing**: staff capacity change at a station
//!
//! # Example
//!
//! ```rust
//! use ed_simulator_core_rs::models::{Event, EventLog, PatientId};
//! use ed_simulator_core_rs::models::location::StationName;
//!
//! let mut log = EventLog::new();
//! log.log(Event::Admitted {
//!     time: 12.5,
//!     patient: PatientId(3),
//!     station: StationName::Triage,
//! });
//!
//! assert_eq!(log.events_for_patient(PatientId(3)).len(), 1);
//! assert_eq!(log.events()[0].event_type(), "Admitted");
//! ```

use crate::models::location::StationName;
use crate::models::patient::{Esi, PatientId};
use serde::{Deserialize, Serialize};

/// Simulation event capturing a state change.
///
/// Events are logged in the order they happen; within one simulated instant
/// that is dispatch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Patient walked in (generated or injected)
    Arrival {
        time: f64,
        patient: PatientId,
        esi: Esi,
    },

    /// Patient joined a station (waiting area, or straight into a bed)
    Admitted {
        time: f64,
        patient: PatientId,
        station: StationName,
    },

    /// Staff began service; departure scheduled at `time + duration`
    TreatmentStarted {
        time: f64,
        patient: PatientId,
        station: StationName,
        duration: f64,
    },

    /// Service completed and resources released
    Departed {
        time: f64,
        patient: PatientId,
        station: StationName,
    },

    /// Patient sent on to the next station
    Routed {
        time: f64,
        patient: PatientId,
        from: StationName,
        to: StationName,
    },

    /// Triage assigned a severity different from the true one
    Misdiagnosed {
        time: f64,
        patient: PatientId,
        true_esi: Esi,
        assigned_esi: Esi,
    },

    ReassessmentScheduled {
        time: f64,
        patient: PatientId,
        fire_time: f64,
    },

    /// Pending reassessment check removed before it fired
    ReassessmentCancelled { time: f64, patient: PatientId },

    /// Waiting zone patient pulled out for reassessment
    ReassessmentTriggered {
        time: f64,
        patient: PatientId,
        zone: StationName,
    },

    ReassessmentCompleted {
        time: f64,
        patient: PatientId,
        previous_esi: Esi,
        assigned_esi: Esi,
    },

    /// Patient left without being seen
    LeftWithoutBeingSeen {
        time: f64,
        patient: PatientId,
        station: StationName,
        probability: f64,
    },

    /// Patient died during zone treatment
    Death {
        time: f64,
        patient: PatientId,
        station: StationName,
        risk: f64,
    },

    /// Patient completed zone treatment and left the department
    Discharged {
        time: f64,
        patient: PatientId,
        station: StationName,
    },

    /// Staff capacity at a station changed with the time-of-day schedule
    StaffingChanged {
        time: f64,
        station: StationName,
        previous: usize,
        staff: usize,
    },
}

impl Event {
    /// Simulated time at which the event happened
    pub fn time(&self) -> f64 {
        match self {
            Event::Arrival { time, .. }
            | Event::Admitted { time, .. }
            | Event::TreatmentStarted { time, .. }
            | Event::Departed { time, .. }
            | Event::Routed { time, .. }
            | Event::Misdiagnosed { time, .. }
            | Event::ReassessmentScheduled { time, .. }
            | Event::ReassessmentCancelled { time, .. }
            | Event::ReassessmentTriggered { time, .. }
            | Event::ReassessmentCompleted { time, .. }
            | Event::LeftWithoutBeingSeen { time, .. }
            | Event::Death { time, .. }
            | Event::Discharged { time, .. }
            | Event::StaffingChanged { time, .. } => *time,
        }
    }

    /// Get event type as string
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Arrival { .. } => "Arrival",
            Event::Admitted { .. } => "Admitted",
            Event::TreatmentStarted { .. } => "TreatmentStarted",
            Event::Departed { .. } => "Departed",
            Event::Routed { .. } => "Routed",
            Event::Misdiagnosed { .. } => "Misdiagnosed",
            Event::ReassessmentScheduled { .. } => "ReassessmentScheduled",
            Event::ReassessmentCancelled { .. } => "ReassessmentCancelled",
            Event::ReassessmentTriggered { .. } => "ReassessmentTriggered",
            Event::ReassessmentCompleted { .. } => "ReassessmentCompleted",
            Event::LeftWithoutBeingSeen { .. } => "LeftWithoutBeingSeen",
            Event::Death { .. } => "Death",
            Event::Discharged { .. } => "Discharged",
            Event::StaffingChanged { .. } => "StaffingChanged",
        }
    }

    /// Get patient ID if event relates to a specific patient
    pub fn patient(&self) -> Option<PatientId> {
        match self {
            Event::Arrival { patient, .. }
            | Event::Admitted { patient, .. }
            | Event::TreatmentStarted { patient, .. }
            | Event::Departed { patient, .. }
            | Event::Routed { patient, .. }
            | Event::Misdiagnosed { patient, .. }
            | Event::ReassessmentScheduled { patient, .. }
            | Event::ReassessmentCancelled { patient, .. }
            | Event::ReassessmentTriggered { patient, .. }
            | Event::ReassessmentCompleted { patient, .. }
            | Event::LeftWithoutBeingSeen { patient, .. }
            | Event::Death { patient, .. }
            | Event::Discharged { patient, .. } => Some(*patient),
            Event::StaffingChanged { .. } => None,
        }
    }

    /// Get station if event happened at a specific station
    pub fn station(&self) -> Option<StationName> {
        match self {
            Event::Admitted { station, .. }
            | Event::TreatmentStarted { station, .. }
            | Event::Departed { station, .. }
            | Event::LeftWithoutBeingSeen { station, .. }
            | Event::Death { station, .. }
            | Event::Discharged { station, .. }
            | Event::StaffingChanged { station, .. } => Some(*station),
            Event::Routed { from, .. } => Some(*from),
            Event::ReassessmentTriggered { zone, .. } => Some(*zone),
            _ => None,
        }
    }
}

/// Event log for storing and querying simulation events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods. A
/// disabled log drops everything it is given.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Vec<Event>,
    enabled: bool,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Create a new empty, recording event log
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            enabled: true,
        }
    }

    /// Create a log that records nothing (long batch runs)
    pub fn disabled() -> Self {
        Self {
            events: Vec::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        if self.enabled {
            self.events.push(event);
        }
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific patient, in order
    pub fn events_for_patient(&self, patient: PatientId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.patient() == Some(patient))
            .collect()
    }

    /// Get events that happened at a specific station
    pub fn events_at_station(&self, station: StationName) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.station() == Some(station))
            .collect()
    }

    /// Get events in the half-open window [from, to)
    pub fn events_between(&self, from: f64, to: f64) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.time() >= from && e.time() < to)
            .collect()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_time_and_type() {
        let event = Event::Death {
            time: 300.0,
            patient: PatientId(4),
            station: StationName::Eru,
            risk: 0.01,
        };

        assert_eq!(event.time(), 300.0);
        assert_eq!(event.event_type(), "Death");
        assert_eq!(event.patient(), Some(PatientId(4)));
        assert_eq!(event.station(), Some(StationName::Eru));
    }

    #[test]
    fn test_staffing_change_has_no_patient() {
        let event = Event::StaffingChanged {
            time: 420.0,
            station: StationName::Red,
            previous: 3,
            staff: 4,
        };
        assert_eq!(event.patient(), None);
    }

    #[test]
    fn test_event_log_query_by_patient_and_type() {
        let mut log = EventLog::new();

        log.log(Event::Arrival {
            time: 1.0,
            patient: PatientId(0),
            esi: Esi::Urgent,
        });
        log.log(Event::Admitted {
            time: 1.0,
            patient: PatientId(0),
            station: StationName::Sort,
        });
        log.log(Event::Arrival {
            time: 2.0,
            patient: PatientId(1),
            esi: Esi::Emergent,
        });

        assert_eq!(log.events_for_patient(PatientId(0)).len(), 2);
        assert_eq!(log.events_of_type("Arrival").len(), 2);
        assert_eq!(log.events_at_station(StationName::Sort).len(), 1);
        assert_eq!(log.events_between(0.0, 2.0).len(), 2);
    }

    #[test]
    fn test_disabled_log_records_nothing() {
        let mut log = EventLog::disabled();
        log.log(Event::ReassessmentCancelled {
            time: 5.0,
            patient: PatientId(0),
        });
        assert!(log.is_empty());
        assert!(!log.is_enabled());
    }

    #[test]
    fn test_event_log_clear() {
        let mut log = EventLog::new();
        log.log(Event::Discharged {
            time: 90.0,
            patient: PatientId(2),
            station: StationName::Green,
        });
        assert_eq!(log.len(), 1);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = Event::Routed {
            time: 10.0,
            patient: PatientId(1),
            from: StationName::Triage,
            to: StationName::Red,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Routed\""));
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
