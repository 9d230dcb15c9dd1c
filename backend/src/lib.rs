//! Emergency Department Simulator Core - Rust Engine
//!
//! Discrete-event simulation of patient flow through an emergency
//! department with deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Simulation clock
//! - **rng**: Deterministic random number generation
//! - **arrivals**: Inter-arrival and service-time generators, hourly tables
//! - **models**: Domain types (Patient, WaitingArea, EventLog)
//! - **events**: Event calendar
//! - **stations**: Sort, registration, triage, treatment zones, reassessment
//! - **lwbs**: Leave-without-being-seen probability model
//! - **orchestrator**: Configuration and main simulation loop
//! - **statistics**: Read-only reporting over finished patients
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG)
//! 2. Every patient is in at most one station collection at a time
//! 3. Every patient is disposed at most once

// Module declarations
pub mod arrivals;
pub mod core;
pub mod events;
pub mod lwbs;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod stations;
pub mod statistics;

// Re-exports for convenience
pub use arrivals::{ArrivalConfig, HourlyTable, ServiceTime};
pub use core::time::TimeManager;
pub use events::{EventCalendar, EventHandle, EventKind};
pub use lwbs::{FixedLwbsModel, LogisticLwbsModel, LwbsModel};
pub use models::{
    event::{Event, EventLog},
    location::{PatientLocation, StationName, ZoneId},
    patient::{Esi, Outcome, Patient, PatientId, PatientProfile},
    waiting_area::{PrioritizationPolicy, WaitingArea},
};
pub use orchestrator::{SimulationError, Simulator, SimulatorConfig, StepResult};
pub use rng::RngManager;
pub use statistics::{calculate_mean, Property, RunSummary, StationMetrics};
