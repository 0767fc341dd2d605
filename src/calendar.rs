//! Event calendar: time-ordered schedule with lazy cancellation.

use std::collections::{BinaryHeap, HashSet};
use log::trace;

use crate::events::{Event, EventId};

/// Events with equal times are returned in the order they were scheduled.
#[derive(Clone)]
pub struct Calendar {
    clock: f64,
    stop_time: f64,
    events: BinaryHeap<Event>,
    canceled_events: HashSet<EventId>,
    event_count: u64,
}

impl Calendar {
    /// Arrivals at or after `stop_time` are rejected by [`Calendar::schedule`].
    pub fn new(stop_time: f64) -> Self {
        Self {
            clock: 0.0,
            stop_time,
            events: BinaryHeap::new(),
            canceled_events: HashSet::new(),
            event_count: 0,
        }
    }

    pub fn time(&self) -> f64 {
        self.clock
    }

    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    /// Closes the admission window at `time`; arrivals already scheduled stay in place.
    pub fn set_stop_time(&mut self, time: f64) {
        self.stop_time = time;
    }

    /// Total number of events accepted so far.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Inserts `event` and returns its identifier, or `None` for an arrival past the stop time.
    pub fn schedule(&mut self, mut event: Event) -> Option<EventId> {
        if event.is_arrival() && event.time >= self.stop_time {
            trace!("[{:.3}] arrival of {} at {:.3} rejected, admission closed", self.clock, event.class, event.time);
            return None;
        }
        let event_id = self.event_count;
        event.id = event_id;
        self.events.push(event);
        self.event_count += 1;
        Some(event_id)
    }

    /// Marks the event for removal. It is discarded when it reaches the head of the calendar.
    pub fn unschedule(&mut self, id: EventId) {
        self.canceled_events.insert(id);
    }

    /// Pops the earliest live event and moves the clock to its time.
    pub fn next(&mut self) -> Option<Event> {
        while let Some(event) = self.events.pop() {
            if !self.canceled_events.remove(&event.id) {
                self.clock = self.clock.max(event.time);
                return Some(event);
            }
        }
        None
    }

    pub fn peek_time(&mut self) -> Option<f64> {
        while let Some(event) = self.events.peek() {
            if self.canceled_events.contains(&event.id) {
                let id = event.id;
                self.events.pop();
                self.canceled_events.remove(&id);
            } else {
                return Some(event.time);
            }
        }
        None
    }

    /// Number of pending events that are not canceled.
    pub fn len(&self) -> usize {
        self.events.len().saturating_sub(self.canceled_events.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
