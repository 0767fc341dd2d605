//! Representation of the Cloud, the unbounded remote tier

use std::fmt::{Display, Formatter};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::counters::RawCounters;
use crate::distribution::Distribution;
use crate::error::{Result, SimulationError};
use crate::random::{RandomStreams, StreamId};
use crate::task::TaskClass;

/// How much service a task evicted from the Cloudlet still needs in the Cloud.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    /// Remaining ratio times a fresh Cloud service draw, plus setup.
    ScaledResample,
    /// A full fresh Cloud service draw, plus setup.
    FullResample,
}

impl Display for RestartPolicy {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            RestartPolicy::ScaledResample => write!(f, "scaled_resample"),
            RestartPolicy::FullResample => write!(f, "full_resample"),
        }
    }
}

pub struct Cloud {
    service: [Distribution; 2],
    setup: Distribution,
    restart_policy: RestartPolicy,

    occupancy: [usize; 2],
    counters: [RawCounters; 2],
    restarted: [u64; 2],
    last_event_time: [f64; 2],
}

impl Cloud {
    pub fn new(service: [Distribution; 2], setup: Distribution, restart_policy: RestartPolicy) -> Self {
        Self {
            service,
            setup,
            restart_policy,
            occupancy: [0; 2],
            counters: [RawCounters::default(); 2],
            restarted: [0; 2],
            last_event_time: [0.0; 2],
        }
    }

    pub fn occupancy(&self, class: TaskClass) -> usize {
        self.occupancy[class.index()]
    }

    pub fn total_occupancy(&self) -> usize {
        self.occupancy[0] + self.occupancy[1]
    }

    /// Number of tasks of `class` relocated here from the Cloudlet.
    pub fn restarted(&self, class: TaskClass) -> u64 {
        self.restarted[class.index()]
    }

    pub fn restart_policy(&self) -> RestartPolicy {
        self.restart_policy
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

    /// Accepts a new task and returns its completion time.
    pub fn submit_arrival(&mut self, class: TaskClass, now: f64, streams: &mut RandomStreams) -> Result<f64> {
        let service_time = streams.sample(StreamId::CloudService(class), &self.service[class.index()])?;
        self.advance(class, now);
        self.occupancy[class.index()] += 1;
        self.counters[class.index()].arrived += 1;
        Ok(now + service_time)
    }

    /// Accepts a task evicted from the Cloudlet and returns its new completion time.
    ///
    /// The residual service is re-sampled rather than resumed: with
    /// [`RestartPolicy::ScaledResample`] it is `remaining_ratio` times a fresh draw,
    /// with [`RestartPolicy::FullResample`] the whole draw. A setup time is always added.
    pub fn submit_restart(&mut self, class: TaskClass, now: f64, remaining_ratio: f64,
                          streams: &mut RandomStreams) -> Result<f64> {
        let service_time = streams.sample(StreamId::CloudService(class), &self.service[class.index()])?;
        let setup_time = streams.sample(StreamId::Setup, &self.setup)?;
        let residual = match self.restart_policy {
            RestartPolicy::ScaledResample => remaining_ratio.clamp(0.0, 1.0) * service_time,
            RestartPolicy::FullResample => service_time,
        };
        self.advance(class, now);
        self.occupancy[class.index()] += 1;
        self.restarted[class.index()] += 1;
        debug!("[{:.3}] cloud: {} restarted, residual {:.3} + setup {:.3}", now, class, residual, setup_time);
        Ok(now + residual + setup_time)
    }

    /// Closes the bookkeeping of a task of `class` that entered the system at `arrival_time`.
    pub fn submit_completion(&mut self, class: TaskClass, now: f64, arrival_time: f64, switched: bool) -> Result<f64> {
        if self.occupancy[class.index()] == 0 {
            return Err(SimulationError::invariant(now, format!("{} occupancy underflow in the Cloud", class)));
        }
        self.advance(class, now);
        self.occupancy[class.index()] -= 1;
        let response = now - arrival_time;
        let counters = &mut self.counters[class.index()];
        counters.completed += 1;
        counters.serviced_time += response;
        if switched {
            counters.switched_completed += 1;
            counters.switched_serviced_time += response;
        }
        Ok(response)
    }
}
