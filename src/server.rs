//! Representation of a single Cloudlet server

use std::fmt::{Display, Formatter};
use serde::Serialize;

use crate::error::{Result, SimulationError};
use crate::events::EventId;
use crate::task::TaskClass;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ServerState {
    Idle,
    Busy,
}

impl Display for ServerState {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            ServerState::Idle => write!(f, "idle"),
            ServerState::Busy => write!(f, "busy"),
        }
    }
}

/// Task evicted from a server before completing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interruption {
    pub server: usize,
    pub class: TaskClass,
    pub arrival_time: f64,
    /// Completion time the evicted task had been scheduled for.
    pub completion_time: f64,
    /// Calendar entry of the completion that is no longer valid.
    pub completion_event: Option<EventId>,
}

impl Interruption {
    /// Fraction of the service requirement that was still outstanding at `now`.
    pub fn remaining_ratio(&self, now: f64) -> f64 {
        let service = self.completion_time - self.arrival_time;
        if service <= 0.0 {
            return 0.0;
        }
        ((self.completion_time - now) / service).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Server {
    pub id: usize,
    pub state: ServerState,
    pub class: Option<TaskClass>,
    pub arrival_time: f64,
    pub service_time: f64,
    pub completion_time: f64,
    pub interruption_time: f64,
    #[serde(skip)]
    pub completion_event: Option<EventId>,

    idle_since: f64,
    idle_time: f64,
    served: [u64; 2],
    busy_time: [f64; 2],
    interrupted: [u64; 2],
    interrupted_time: [f64; 2],
}

impl Server {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            state: ServerState::Idle,
            class: None,
            arrival_time: 0.0,
            service_time: 0.0,
            completion_time: 0.0,
            interruption_time: 0.0,
            completion_event: None,
            idle_since: 0.0,
            idle_time: 0.0,
            served: [0; 2],
            busy_time: [0.0; 2],
            interrupted: [0; 2],
            interrupted_time: [0.0; 2],
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == ServerState::Idle
    }

    /// Whether the server runs a task of `class` that may still be evicted at `now`.
    pub fn is_interruptible(&self, class: TaskClass, now: f64) -> bool {
        self.state == ServerState::Busy && self.class == Some(class) && now <= self.completion_time
    }

    /// Accumulated idle time, including the current idle period.
    pub fn idle_time(&self, now: f64) -> f64 {
        match self.state {
            ServerState::Idle => self.idle_time + (now - self.idle_since).max(0.0),
            ServerState::Busy => self.idle_time,
        }
    }

    /// Service already consumed by the current task.
    pub fn elapsed_service(&self, now: f64) -> f64 {
        match self.state {
            ServerState::Busy => (now - self.arrival_time).max(0.0),
            ServerState::Idle => 0.0,
        }
    }

    /// Starts serving a task and returns its completion time.
    pub fn submit_arrival(&mut self, class: TaskClass, now: f64, service_time: f64) -> Result<f64> {
        if self.state != ServerState::Idle {
            return Err(SimulationError::invariant(now, format!("server {} is {}, cannot accept {}", self.id, self.state, class)));
        }
        self.idle_time += (now - self.idle_since).max(0.0);
        self.state = ServerState::Busy;
        self.class = Some(class);
        self.arrival_time = now;
        self.service_time = service_time;
        self.completion_time = now + service_time;
        self.completion_event = None;
        Ok(self.completion_time)
    }

    /// Evicts the running task of `class` before its scheduled completion.
    pub fn submit_interruption(&mut self, class: TaskClass, now: f64) -> Result<Interruption> {
        if !self.is_interruptible(class, now) {
            return Err(SimulationError::invariant(now, format!(
                "server {} ({}, {:?}, completion {:.6}) cannot be interrupted for {}",
                self.id, self.state, self.class, self.completion_time, class)));
        }
        let interruption = Interruption {
            server: self.id,
            class,
            arrival_time: self.arrival_time,
            completion_time: self.completion_time,
            completion_event: self.completion_event.take(),
        };
        let consumed = now - self.arrival_time;
        self.interrupted[class.index()] += 1;
        self.interrupted_time[class.index()] += consumed;
        self.busy_time[class.index()] += consumed;
        self.interruption_time = now;
        self.release(now);
        Ok(interruption)
    }

    /// Finishes the running task and returns the service time it received.
    pub fn submit_completion(&mut self, now: f64) -> Result<f64> {
        let class = match (self.state, self.class) {
            (ServerState::Busy, Some(class)) => class,
            _ => return Err(SimulationError::invariant(now, format!("server {} completed while {}", self.id, self.state))),
        };
        let service_time = now - self.arrival_time;
        self.served[class.index()] += 1;
        self.busy_time[class.index()] += service_time;
        self.release(now);
        Ok(service_time)
    }

    fn release(&mut self, now: f64) {
        self.state = ServerState::Idle;
        self.class = None;
        self.completion_event = None;
        self.idle_since = now;
    }

    pub fn served(&self, class: TaskClass) -> u64 {
        self.served[class.index()]
    }

    pub fn busy_time(&self, class: TaskClass) -> f64 {
        self.busy_time[class.index()]
    }

    pub fn interrupted(&self, class: TaskClass) -> u64 {
        self.interrupted[class.index()]
    }

    /// Service time lost by tasks of `class` evicted from this server.
    pub fn interrupted_time(&self, class: TaskClass) -> f64 {
        self.interrupted_time[class.index()]
    }

    /// Fraction of `elapsed` the server spent busy.
    pub fn utilization(&self, elapsed: f64) -> f64 {
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.busy_time[0] + self.busy_time[1]) / elapsed
    }
}
