//! Global event calendar
//!
//! Events are keyed by (fire time, insertion sequence) in an ordered map, so
//! popping the earliest event and cancelling an arbitrary one are both
//! O(log n). Same-time events come out in the order they were scheduled,
//! which makes a run replay identically for a fixed seed.

use crate::core::time::SimTime;
use crate::events::types::{EventHandle, EventKind, ScheduledEvent};
use crate::models::patient::PatientId;
use std::collections::BTreeMap;
use tracing::trace;

/// Time-ordered queue of pending events
///
/// # Example
/// ```
/// use ed_simulator_core_rs::events::{EventCalendar, EventKind};
/// use ed_simulator_core_rs::models::PatientId;
///
/// let mut calendar = EventCalendar::new();
/// let late = calendar.schedule(10.0, EventKind::ReassessmentCheck, Some(PatientId(0)));
/// calendar.schedule(5.0, EventKind::EdArrival, None);
///
/// assert!(calendar.cancel(late));
/// assert!(!calendar.cancel(late)); // second cancel is a no-op
///
/// let first = calendar.pop_earliest().unwrap();
/// assert_eq!(first.time(), 5.0);
/// assert!(calendar.pop_earliest().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventCalendar {
    queue: BTreeMap<(SimTime, u64), ScheduledEvent>,
    next_seq: u64,
}

impl EventCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event and return its handle
    ///
    /// # Panics
    /// Panics if `time` is not finite.
    pub fn schedule(
        &mut self,
        time: f64,
        kind: EventKind,
        patient: Option<PatientId>,
    ) -> EventHandle {
        let handle = EventHandle {
            time: SimTime::new(time),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        trace!(time, seq = handle.seq, %kind, ?patient, "schedule event");
        self.queue.insert(
            (handle.time, handle.seq),
            ScheduledEvent {
                handle,
                kind,
                patient,
            },
        );
        handle
    }

    /// Remove and return the earliest event, or `None` if nothing is left
    pub fn pop_earliest(&mut self) -> Option<ScheduledEvent> {
        self.queue.pop_first().map(|(_, event)| event)
    }

    /// Fire time of the earliest pending event
    pub fn peek_time(&self) -> Option<f64> {
        self.queue.keys().next().map(|(time, _)| time.as_minutes())
    }

    /// Remove a pending event. Returns false if the handle no longer refers
    /// to a pending event (already fired or already cancelled).
    pub fn cancel(&mut self, handle: EventHandle) -> bool {
        match self.queue.remove(&(handle.time, handle.seq)) {
            Some(event) => {
                debug_assert!(
                    event.kind.is_cancellable(),
                    "cancelled a non-cancellable {} event",
                    event.kind
                );
                trace!(time = handle.time(), seq = handle.seq, kind = %event.kind, "cancel event");
                true
            }
            None => false,
        }
    }

    /// True if the handle still refers to a pending event
    pub fn contains(&self, handle: EventHandle) -> bool {
        self.queue.contains_key(&(handle.time, handle.seq))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending events in firing order
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.queue.values()
    }
}
