//! Standard simulation events.

use std::cmp::Ordering;
use serde::Serialize;

use crate::task::{Scope, TaskClass};

pub type EventId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum EventKind {
    /// A new task of the event class enters the system.
    Arrival,
    /// A task finishes in `scope` (Cloudlet or Cloud).
    Completion {
        scope: Scope,
        /// Time the task originally entered the system.
        arrival_time: f64,
        /// Whether the task was evicted from the Cloudlet and restarted in the Cloud.
        switched: bool,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Event {
    pub id: EventId,
    pub time: f64,
    pub class: TaskClass,
    pub kind: EventKind,
}

impl Event {
    /// Creates an arrival event. The identifier is assigned by the calendar.
    pub fn arrival(class: TaskClass, time: f64) -> Self {
        Self {
            id: 0,
            time,
            class,
            kind: EventKind::Arrival,
        }
    }

    pub fn completion(class: TaskClass, scope: Scope, time: f64, arrival_time: f64, switched: bool) -> Self {
        Self {
            id: 0,
            time,
            class,
            kind: EventKind::Completion { scope, arrival_time, switched },
        }
    }

    pub fn is_arrival(&self) -> bool {
        matches!(self.kind, EventKind::Arrival)
    }
}

impl Eq for Event {}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Reversed so that `BinaryHeap` pops the earliest event first, then the earliest scheduled one.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.total_cmp(&self.time).then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
