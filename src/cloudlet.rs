//! Representation of the Cloudlet, the bounded near tier

use log::debug;

use crate::controller::{Controller, Verdict};
use crate::counters::RawCounters;
use crate::distribution::Distribution;
use crate::error::{Result, SimulationError};
use crate::events::EventId;
use crate::random::{RandomStreams, StreamId};
use crate::server::{Interruption, Server};
use crate::server_selector::ServerSelector;
use crate::task::TaskClass;

pub struct Cloudlet {
    servers: Vec<Server>,
    controller: Controller,
    selector: ServerSelector,
    service: [Distribution; 2],

    occupancy: [usize; 2],
    counters: [RawCounters; 2],
    last_event_time: [f64; 2],
}

impl Cloudlet {
    /// The server pool is sized by `controller`, which has already checked its threshold.
    pub fn new(controller: Controller, selector: ServerSelector, service: [Distribution; 2]) -> Self {
        Self {
            servers: (0..controller.servers()).map(Server::new).collect(),
            controller,
            selector,
            service,
            occupancy: [0; 2],
            counters: [RawCounters::default(); 2],
            last_event_time: [0.0; 2],
        }
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn threshold(&self) -> usize {
        self.controller.threshold()
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn occupancy(&self, class: TaskClass) -> usize {
        self.occupancy[class.index()]
    }

    /// Occupancy indexed by [`TaskClass::index`].
    pub fn occupancies(&self) -> [usize; 2] {
        self.occupancy
    }

    pub fn total_occupancy(&self) -> usize {
        self.occupancy[0] + self.occupancy[1]
    }

    /// Asks the admission controller where a task of `class` goes.
    pub fn route(&self, class: TaskClass) -> Verdict {
        self.controller.decide(class, self.occupancy)
    }

    /// Counters of `class` with the population integral brought up to `now`.
    pub fn counters(&self, class: TaskClass, now: f64) -> RawCounters {
        let i = class.index();
        let mut counters = self.counters[i];
        counters.population_integral += (now - self.last_event_time[i]).max(0.0) * self.occupancy[i] as f64;
        counters
    }

    fn advance(&mut self, class: TaskClass, now: f64) {
        let i = class.index();
        self.counters[i].population_integral += (now - self.last_event_time[i]) * self.occupancy[i] as f64;
        self.last_event_time[i] = now;
    }

    /// Places a task on an idle server, returns the server index and the completion time.
    pub fn submit_arrival(&mut self, class: TaskClass, now: f64, streams: &mut RandomStreams) -> Result<(usize, f64)> {
        if self.total_occupancy() >= self.servers.len() {
            return Err(SimulationError::invariant(now, format!(
                "arrival of {} at a full Cloudlet (occupancy {:?})", class, self.occupancy)));
        }
        let index = self.selector.select_idle(&self.servers, now, streams).ok_or_else(|| {
            SimulationError::invariant(now, format!("no idle server with occupancy {:?}", self.occupancy))
        })?;
        let service_time = streams.sample(StreamId::CloudletService(class), &self.service[class.index()])?;
        let completion_time = self.servers[index].submit_arrival(class, now, service_time)?;

        self.advance(class, now);
        self.occupancy[class.index()] += 1;
        self.counters[class.index()].arrived += 1;
        debug!("[{:.3}] cloudlet: {} started on server {}, completion at {:.3}", now, class, index, completion_time);
        Ok((index, completion_time))
    }

    /// Remembers the calendar entry of the completion scheduled for `server`.
    pub fn attach_completion(&mut self, server: usize, event: EventId) {
        if let Some(server) = self.servers.get_mut(server) {
            server.completion_event = Some(event);
        }
    }

    /// Evicts a running task of `class` and returns what is needed to relocate it.
    pub fn submit_interruption(&mut self, class: TaskClass, now: f64, streams: &mut RandomStreams) -> Result<Interruption> {
        if self.occupancy[class.index()] == 0 {
            return Err(SimulationError::invariant(now, format!("no {} task to interrupt in the Cloudlet", class)));
        }
        let index = self.selector.select_interruptible(&self.servers, class, now, streams).ok_or_else(|| {
            SimulationError::invariant(now, format!(
                "no interruptible {} server with occupancy {:?}", class, self.occupancy))
        })?;
        let interruption = self.servers[index].submit_interruption(class, now)?;

        self.advance(class, now);
        self.occupancy[class.index()] -= 1;
        let counters = &mut self.counters[class.index()];
        counters.switched += 1;
        counters.switched_lost_time += now - interruption.arrival_time;
        debug!("[{:.3}] cloudlet: {} interrupted on server {}", now, class, index);
        Ok(interruption)
    }

    /// Releases the server whose task of `class` completes at `now`, returns the service time.
    pub fn submit_completion(&mut self, class: TaskClass, now: f64, arrival_time: f64) -> Result<f64> {
        // linear scan, completions do not carry a server handle
        let index = self.servers.iter()
            .position(|server| {
                !server.is_idle() && server.class == Some(class)
                    && server.completion_time == now && server.arrival_time == arrival_time
            })
            .ok_or_else(|| SimulationError::invariant(now, format!(
                "no server completes {} arrived at {:.6}", class, arrival_time)))?;
        if self.occupancy[class.index()] == 0 {
            return Err(SimulationError::invariant(now, format!("{} occupancy underflow in the Cloudlet", class)));
        }
        let service_time = self.servers[index].submit_completion(now)?;

        self.advance(class, now);
        self.occupancy[class.index()] -= 1;
        let counters = &mut self.counters[class.index()];
        counters.completed += 1;
        counters.serviced_time += service_time;
        Ok(service_time)
    }
}
