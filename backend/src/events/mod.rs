//! Event calendar and event types
//!
//! The calendar is the only suspension point of the simulation: the engine
//! pops the earliest event, advances the clock, and dispatches it.

pub mod calendar;
pub mod types;

pub use calendar::EventCalendar;
pub use types::{EventHandle, EventKind, ScheduledEvent};
