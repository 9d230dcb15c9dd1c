//! Domain models for the emergency department simulator

pub mod event;
pub mod location;
pub mod patient;
pub mod waiting_area;

// Re-exports
pub use event::{Event, EventLog};
pub use location::{PatientLocation, StationKind, StationName, ZoneId};
pub use patient::{
    Acuity, ArrivalMode, DiagnosisDirection, Disposition, Esi, MisdiagnosisRecord, Outcome,
    Patient, PatientError, PatientId, PatientProfile, PatientRegistry, ReassessmentRecord,
    StationVisit,
};
pub use waiting_area::{PrioritizationPolicy, WaitingArea, WaitingAreaError};
