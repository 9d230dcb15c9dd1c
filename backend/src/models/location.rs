//! Station identifiers and the patient location tag.
//!
//! A patient's `PatientLocation` is the single authoritative record of
//! which collection holds it. Every transfer goes through
//! [`crate::models::Patient::move_to`], which refuses to move a patient
//! that has already been disposed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Treatment zones, each with its own beds, staff and service time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZoneId {
    /// Emergency resuscitation unit (acute)
    Eru,
    /// Secondary acute
    Red,
    /// Lower acuity
    Green,
    /// Fast track
    FastTrack,
}

impl ZoneId {
    pub const ALL: [ZoneId; 4] = [ZoneId::Eru, ZoneId::Red, ZoneId::Green, ZoneId::FastTrack];

    pub fn station_name(self) -> StationName {
        match self {
            ZoneId::Eru => StationName::Eru,
            ZoneId::Red => StationName::Red,
            ZoneId::Green => StationName::Green,
            ZoneId::FastTrack => StationName::FastTrack,
        }
    }

    /// Position in [`ZoneId::ALL`]
    pub fn index(self) -> usize {
        match self {
            ZoneId::Eru => 0,
            ZoneId::Red => 1,
            ZoneId::Green => 2,
            ZoneId::FastTrack => 3,
        }
    }
}

/// Every station in the department, plus `Ed` for department-wide
/// reporting (it owns no queue and cannot admit patients).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StationName {
    Sort,
    Registration,
    Triage,
    Reassessment,
    Eru,
    Red,
    Green,
    FastTrack,
    Ed,
}

impl StationName {
    /// All stations that own capacity, in pipeline order
    pub const STATIONS: [StationName; 8] = [
        StationName::Sort,
        StationName::Registration,
        StationName::Triage,
        StationName::Reassessment,
        StationName::Eru,
        StationName::Red,
        StationName::Green,
        StationName::FastTrack,
    ];

    pub fn zone(self) -> Option<ZoneId> {
        match self {
            StationName::Eru => Some(ZoneId::Eru),
            StationName::Red => Some(ZoneId::Red),
            StationName::Green => Some(ZoneId::Green),
            StationName::FastTrack => Some(ZoneId::FastTrack),
            _ => None,
        }
    }

    /// Which timestamp slot on the patient record this station writes
    pub fn kind(self) -> Option<StationKind> {
        match self {
            StationName::Sort => Some(StationKind::Sort),
            StationName::Registration => Some(StationKind::Registration),
            StationName::Triage => Some(StationKind::Triage),
            StationName::Reassessment => Some(StationKind::Reassessment),
            StationName::Eru | StationName::Red | StationName::Green | StationName::FastTrack => {
                Some(StationKind::Zone)
            }
            StationName::Ed => None,
        }
    }
}

impl fmt::Display for StationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StationName::Sort => "SORT",
            StationName::Registration => "REGISTRATION",
            StationName::Triage => "TRIAGE",
            StationName::Reassessment => "REASSESSMENT",
            StationName::Eru => "ERU",
            StationName::Red => "RED",
            StationName::Green => "GREEN",
            StationName::FastTrack => "FAST_TRACK",
            StationName::Ed => "ED",
        };
        f.write_str(name)
    }
}

/// Timestamp slot on the patient record. All zones share one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationKind {
    Sort,
    Registration,
    Triage,
    Reassessment,
    Zone,
}

impl StationKind {
    pub fn index(self) -> usize {
        match self {
            StationKind::Sort => 0,
            StationKind::Registration => 1,
            StationKind::Triage => 2,
            StationKind::Reassessment => 3,
            StationKind::Zone => 4,
        }
    }
}

/// Where a patient is right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientLocation {
    /// Arrival scheduled but not yet fired
    NotArrived,
    /// In the station's priority waiting area, no bed yet
    Queued(StationName),
    /// Holds a bed, waiting for staff
    AwaitingStaff(StationName),
    /// Being served; tracked only by the station's counters
    InService(StationName),
    /// Left the department (discharged, died or LWBS)
    Disposed,
}

impl PatientLocation {
    /// Station currently responsible for the patient, if any
    pub fn station(&self) -> Option<StationName> {
        match *self {
            PatientLocation::Queued(s)
            | PatientLocation::AwaitingStaff(s)
            | PatientLocation::InService(s) => Some(s),
            PatientLocation::NotArrived | PatientLocation::Disposed => None,
        }
    }

    /// True while sitting in a queue or staff-wait set
    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            PatientLocation::Queued(_) | PatientLocation::AwaitingStaff(_)
        )
    }
}
