//! Time management for the simulation
//!
//! The simulation runs in continuous time measured in minutes since the
//! start of the run. The clock only ever moves forward: it is set to the
//! fire time of each event popped from the calendar.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Minutes in one hour
pub const MINUTES_PER_HOUR: f64 = 60.0;

/// Minutes in one simulated day
pub const MINUTES_PER_DAY: f64 = 24.0 * MINUTES_PER_HOUR;

/// Hour of day (0-23) for an absolute simulation time in minutes.
///
/// # Example
/// ```
/// use ed_simulator_core_rs::core::time::hour_of_day;
///
/// assert_eq!(hour_of_day(0.0), 0);
/// assert_eq!(hour_of_day(61.0), 1);
/// assert_eq!(hour_of_day(1440.0 + 13.0 * 60.0), 13);
/// ```
pub fn hour_of_day(minutes: f64) -> usize {
    if !minutes.is_finite() || minutes <= 0.0 {
        return 0;
    }
    ((minutes / MINUTES_PER_HOUR) % 24.0) as usize
}

/// A point in simulated time, totally ordered so it can key the calendar.
///
/// Construction rejects NaN and infinities: an event that can never fire
/// has no place on the calendar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimTime(f64);

impl SimTime {
    /// Wrap a finite number of minutes
    ///
    /// # Panics
    /// Panics if `minutes` is NaN or infinite
    pub fn new(minutes: f64) -> Self {
        assert!(minutes.is_finite(), "simulation time must be finite, got {}", minutes);
        Self(minutes)
    }

    /// Raw minutes since simulation start
    pub fn as_minutes(&self) -> f64 {
        self.0
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Manages the global simulation clock
///
/// # Example
/// ```
/// use ed_simulator_core_rs::TimeManager;
///
/// let mut time = TimeManager::new();
/// assert_eq!(time.current_time(), 0.0);
///
/// time.advance_to(90.0);
/// assert_eq!(time.hour_of_day(), 1);
/// assert_eq!(time.current_day(), 0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeManager {
    /// Minutes elapsed since simulation start (fire time of the last event)
    current_time: f64,
}

impl TimeManager {
    /// Create a clock positioned at time zero
    pub fn new() -> Self {
        Self { current_time: 0.0 }
    }

    /// Move the clock to `time`.
    ///
    /// # Panics
    /// Panics if `time` is earlier than the current time. Events are popped
    /// in non-decreasing order, so a backward step means the calendar is
    /// broken.
    pub fn advance_to(&mut self, time: f64) {
        assert!(
            time >= self.current_time,
            "simulation clock cannot move backward: {} -> {}",
            self.current_time,
            time
        );
        self.current_time = time;
    }

    /// Current time in minutes
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Current day (0-indexed)
    pub fn current_day(&self) -> usize {
        (self.current_time / MINUTES_PER_DAY) as usize
    }

    /// Current hour of day (0-23)
    pub fn hour_of_day(&self) -> usize {
        hour_of_day(self.current_time)
    }

    /// Minutes elapsed since the start of the current day
    pub fn minute_within_day(&self) -> f64 {
        self.current_time % MINUTES_PER_DAY
    }
}
