//! Two-tier system: admission control, Cloudlet, Cloud and the preempt-restart flow.

use log::debug;

use crate::calendar::Calendar;
use crate::cloud::Cloud;
use crate::cloudlet::Cloudlet;
use crate::controller::Verdict;
use crate::counters::RawCounters;
use crate::error::{Result, SimulationError};
use crate::events::{Event, EventId};
use crate::random::RandomStreams;
use crate::task::{MetricClass, Scope, TaskClass};

pub struct System {
    cloudlet: Cloudlet,
    cloud: Cloud,
}

impl System {
    pub fn new(cloudlet: Cloudlet, cloud: Cloud) -> Self {
        Self { cloudlet, cloud }
    }

    pub fn cloudlet(&self) -> &Cloudlet {
        &self.cloudlet
    }

    pub fn cloud(&self) -> &Cloud {
        &self.cloud
    }

    /// Whether no task is in service in either tier.
    pub fn is_empty(&self) -> bool {
        self.cloudlet.total_occupancy() == 0 && self.cloud.total_occupancy() == 0
    }

    /// Admits a task of `class` arriving at `now` and schedules its completion.
    pub fn submit_arrival(&mut self, class: TaskClass, now: f64, calendar: &mut Calendar,
                          streams: &mut RandomStreams) -> Result<Verdict> {
        let verdict = self.cloudlet.route(class);
        debug!("[{:.3}] {} arrived, occupancy {:?}, routed to {}", now, class, self.cloudlet.occupancies(), verdict);
        match verdict {
            Verdict::AdmitCloud => {
                let completion_time = self.cloud.submit_arrival(class, now, streams)?;
                schedule_completion(calendar, Event::completion(class, Scope::Cloud, completion_time, now, false))?;
            }
            Verdict::AdmitCloudlet => {
                self.admit_cloudlet(class, now, calendar, streams)?;
            }
            Verdict::AdmitCloudletWithPreemption => {
                self.preempt(TaskClass::Class2, now, calendar, streams)?;
                self.admit_cloudlet(class, now, calendar, streams)?;
            }
        }
        Ok(verdict)
    }

    fn admit_cloudlet(&mut self, class: TaskClass, now: f64, calendar: &mut Calendar,
                      streams: &mut RandomStreams) -> Result<()> {
        let (server, completion_time) = self.cloudlet.submit_arrival(class, now, streams)?;
        let event_id = schedule_completion(calendar, Event::completion(class, Scope::Cloudlet, completion_time, now, false))?;
        self.cloudlet.attach_completion(server, event_id);
        Ok(())
    }

    /// Evicts a task of `victim` class from the Cloudlet and restarts it in the Cloud.
    fn preempt(&mut self, victim: TaskClass, now: f64, calendar: &mut Calendar,
               streams: &mut RandomStreams) -> Result<()> {
        let interruption = self.cloudlet.submit_interruption(victim, now, streams)?;
        let stale = interruption.completion_event.ok_or_else(|| SimulationError::invariant(now, format!(
            "interrupted server {} has no scheduled completion", interruption.server)))?;
        calendar.unschedule(stale);

        let remaining_ratio = interruption.remaining_ratio(now);
        let completion_time = self.cloud.submit_restart(victim, now, remaining_ratio, streams)?;
        schedule_completion(calendar, Event::completion(
            victim, Scope::Cloud, completion_time, interruption.arrival_time, true))?;
        Ok(())
    }

    /// Closes the bookkeeping of a task of `class` finishing in `scope`, returns its service time.
    pub fn submit_completion(&mut self, class: TaskClass, scope: Scope, now: f64, arrival_time: f64,
                             switched: bool) -> Result<f64> {
        match scope {
            Scope::Cloudlet => self.cloudlet.submit_completion(class, now, arrival_time),
            Scope::Cloud => self.cloud.submit_completion(class, now, arrival_time, switched),
            Scope::System => Err(SimulationError::invariant(now, "completion addressed to the whole system")),
        }
    }

    /// Raw counters of a (scope, class) pair at `now`. System and Global are sums of their parts.
    pub fn counters(&self, scope: Scope, class: MetricClass, now: f64) -> RawCounters {
        class.classes().iter()
            .map(|&class| match scope {
                Scope::Cloudlet => self.cloudlet.counters(class, now),
                Scope::Cloud => self.cloud.counters(class, now),
                Scope::System => self.cloudlet.counters(class, now) + self.cloud.counters(class, now),
            })
            .sum()
    }
}

fn schedule_completion(calendar: &mut Calendar, event: Event) -> Result<EventId> {
    let time = calendar.time();
    calendar.schedule(event).ok_or_else(|| SimulationError::invariant(time, "completion rejected by the calendar"))
}
