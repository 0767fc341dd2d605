use log::{debug, info};

use crate::calendar::Calendar;
use crate::cloud::Cloud;
use crate::cloudlet::Cloudlet;
use crate::controller::Controller;
use crate::error::{Result, SimulationError};
use crate::events::{Event, EventKind};
use crate::metrics::{MetricKey, Metrics};
use crate::random::{RandomStreams, StreamId};
use crate::server_selector::ServerSelector;
use crate::simulation_config::SimulationConfig;
use crate::simulation_metrics::{MetricsLogger, SummaryRecord};
use crate::statistics::Statistic;
use crate::system::System;
use crate::task::TaskClass;

pub struct CloudletSimulation {
    calendar: Calendar,
    streams: RandomStreams,
    system: System,
    metrics: Metrics,
    sim_config: SimulationConfig,

    arrivals: [u64; 2],
}

impl CloudletSimulation {
    /// Creates a simulation with specified config and schedules the first arrival of each class.
    pub fn new(sim_config: SimulationConfig, metrics_logger: Box<dyn MetricsLogger>) -> Result<Self> {
        sim_config.validate()?;
        let controller = Controller::new(sim_config.controller, sim_config.servers, sim_config.threshold)?;
        let cloudlet = Cloudlet::new(controller, ServerSelector::new(sim_config.selector),
                                     sim_config.cloudlet_service.to_array());
        let cloud = Cloud::new(sim_config.cloud_service.to_array(), sim_config.setup.clone(),
                               sim_config.restart_policy);
        let metrics = Metrics::new(sim_config.batch_size, sim_config.batch_count, sim_config.confidence,
                                   metrics_logger);

        let mut sim = Self {
            calendar: Calendar::new(sim_config.stop_time.unwrap_or(f64::INFINITY)),
            streams: RandomStreams::new(sim_config.seed),
            system: System::new(cloudlet, cloud),
            metrics,
            sim_config,
            arrivals: [0; 2],
        };
        for class in TaskClass::ALL {
            sim.schedule_arrival(class)?;
        }
        info!("simulation created: {} servers, threshold {}, {} controller, {} selector, seed {}",
              sim.sim_config.servers, sim.sim_config.threshold, sim.sim_config.controller,
              sim.sim_config.selector, sim.sim_config.seed);
        Ok(sim)
    }

    fn schedule_arrival(&mut self, class: TaskClass) -> Result<()> {
        let interarrival = self.streams.sample(StreamId::Arrival(class), self.sim_config.arrival.get(class))?;
        self.calendar.schedule(Event::arrival(class, self.calendar.time() + interarrival));
        Ok(())
    }

    /// Processes the next event. Returns false when the calendar is exhausted.
    pub fn step(&mut self) -> Result<bool> {
        let event = match self.calendar.next() {
            Some(event) => event,
            None if self.system.is_empty() => return Ok(false),
            None => return Err(SimulationError::invariant(self.calendar.time(), format!(
                "calendar is empty with {} Cloudlet and {} Cloud tasks in service",
                self.system.cloudlet().total_occupancy(), self.system.cloud().total_occupancy()))),
        };
        let now = event.time;
        match event.kind {
            EventKind::Arrival => {
                self.arrivals[event.class.index()] += 1;
                self.schedule_arrival(event.class)?;
                self.system.submit_arrival(event.class, now, &mut self.calendar, &mut self.streams)?;
            }
            EventKind::Completion { scope, arrival_time, switched } => {
                let service_time = self.system.submit_completion(event.class, scope, now, arrival_time, switched)?;
                debug!("[{:.3}] {} completed in {} after {:.3}", now, event.class, scope, service_time);
                self.metrics.sample(now, &self.system);
            }
        }
        Ok(true)
    }

    /// Performs the specified number of steps. Returns false if the calendar ran out first.
    pub fn steps(&mut self, step_count: u64) -> Result<bool> {
        for _ in 0..step_count {
            if !self.step()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Steps through the simulation until there are no pending events left.
    pub fn step_until_no_events(&mut self) -> Result<()> {
        while self.step()? {}
        Ok(())
    }

    /// Steps through the simulation until the next event lies after `time`.
    pub fn step_until_time(&mut self, time: f64) -> Result<()> {
        while let Some(next) = self.calendar.peek_time() {
            if next > time {
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    /// Runs until the configured number of batches is collected or the calendar is exhausted.
    pub fn run(&mut self) -> Result<()> {
        while !self.metrics.is_complete() {
            if !self.step()? {
                break;
            }
        }
        info!("[{:.3}] run finished: {} events, {} samples, {} batches",
              self.current_time(), self.event_count(), self.metrics.samples(), self.metrics.closed_batches());
        Ok(())
    }

    /// Saves the batch log of the metrics logger to `path`.
    pub fn finish_simulation(&mut self, path: &str) -> Result<()> {
        self.metrics.save_log(path)
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.sim_config
    }

    /// Arrivals of `class` generated so far.
    pub fn arrivals(&self, class: TaskClass) -> u64 {
        self.arrivals[class.index()]
    }

    pub fn statistic(&self, key: MetricKey) -> Statistic {
        self.metrics.statistic(key)
    }

    pub fn summary(&self) -> Vec<SummaryRecord> {
        self.metrics.summary()
    }

    /// Returns the number of pending events.
    pub fn pending_events(&self) -> usize {
        self.calendar.len()
    }

    /// Returns the total number of created events.
    pub fn event_count(&self) -> u64 {
        self.calendar.event_count()
    }

    /// Returns the current simulation time.
    pub fn current_time(&self) -> f64 {
        self.calendar.time()
    }
}
