//! Orchestrator - main simulation loop
//!
//! Configuration, staffing schedule and the event-driven engine that ties
//! arrivals, stations, reassessment and LWBS together.
//!
//! See `engine.rs` for the loop itself.

pub mod config;
pub mod engine;

// Re-export main types for convenience
pub use config::{
    SimulatorConfig, StaffLevels, StaffingBand, StaffingSchedule, StationSettings, StationsConfig,
};
pub use engine::{SimulationError, Simulator, StepResult};
