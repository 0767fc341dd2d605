//! Metrics engine: derives performance measures from raw counters and keeps batch means.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use log::info;
use serde::{Deserialize, Serialize};

use crate::counters::RawCounters;
use crate::error::Result;
use crate::simulation_metrics::{BatchRecord, MetricsLogger, SummaryRecord};
use crate::statistics::{BatchAccumulator, Statistic};
use crate::system::System;
use crate::task::{MetricClass, Scope};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Response,
    Throughput,
    Population,
    SwitchRatio,
    SwitchResponse,
    ServiceLostRatio,
}

impl Measure {
    pub const ALL: [Measure; 6] = [
        Measure::Response,
        Measure::Throughput,
        Measure::Population,
        Measure::SwitchRatio,
        Measure::SwitchResponse,
        Measure::ServiceLostRatio,
    ];

    pub fn evaluate(self, counters: &RawCounters, elapsed: f64) -> f64 {
        match self {
            Measure::Response => counters.response(),
            Measure::Throughput => counters.throughput(elapsed),
            Measure::Population => counters.population(elapsed),
            Measure::SwitchRatio => counters.switch_ratio(),
            Measure::SwitchResponse => counters.switch_response(),
            Measure::ServiceLostRatio => counters.service_lost_ratio(),
        }
    }
}

impl Display for Measure {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Measure::Response => write!(f, "response"),
            Measure::Throughput => write!(f, "throughput"),
            Measure::Population => write!(f, "population"),
            Measure::SwitchRatio => write!(f, "switch_ratio"),
            Measure::SwitchResponse => write!(f, "switch_response"),
            Measure::ServiceLostRatio => write!(f, "service_lost_ratio"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MetricKey {
    pub scope: Scope,
    pub class: MetricClass,
    pub measure: Measure,
}

impl MetricKey {
    pub fn new(scope: Scope, class: MetricClass, measure: Measure) -> Self {
        Self { scope, class, measure }
    }

    /// Every (scope × class × measure) combination, in reporting order.
    pub fn all() -> Vec<MetricKey> {
        let mut keys = Vec::new();
        for scope in Scope::ALL {
            for class in MetricClass::ALL {
                for measure in Measure::ALL {
                    keys.push(MetricKey::new(scope, class, measure));
                }
            }
        }
        keys
    }
}

pub struct Metrics {
    batch_size: usize,
    batch_count: usize,
    confidence: f64,
    start_time: f64,
    samples: u64,
    accumulators: BTreeMap<MetricKey, BatchAccumulator>,
    metrics_logger: Box<dyn MetricsLogger>,
}

impl Metrics {
    /// A `batch_count` of 0 keeps closing batches for as long as samples arrive.
    pub fn new(batch_size: usize, batch_count: usize, confidence: f64,
               metrics_logger: Box<dyn MetricsLogger>) -> Self {
        let accumulators = MetricKey::all().into_iter()
            .map(|key| (key, BatchAccumulator::new(batch_size)))
            .collect();
        Self {
            batch_size,
            batch_count,
            confidence,
            start_time: 0.0,
            samples: 0,
            accumulators,
            metrics_logger,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn closed_batches(&self) -> usize {
        self.accumulators.values().next().map_or(0, |acc| acc.closed_batches())
    }

    /// Whether the configured number of batches has been collected.
    pub fn is_complete(&self) -> bool {
        self.batch_count > 0 && self.closed_batches() >= self.batch_count
    }

    /// Derives every measure from the current counters of `system` and feeds the accumulators.
    /// Returns the index of the batch this sample closed, if any.
    pub fn sample(&mut self, now: f64, system: &System) -> Option<usize> {
        if self.is_complete() {
            return None;
        }
        self.samples += 1;
        let elapsed = now - self.start_time;

        let mut closed = Vec::new();
        for scope in Scope::ALL {
            for class in MetricClass::ALL {
                let counters = system.counters(scope, class, now);
                for measure in Measure::ALL {
                    let key = MetricKey::new(scope, class, measure);
                    let value = measure.evaluate(&counters, elapsed);
                    if let Some(acc) = self.accumulators.get_mut(&key) {
                        if let Some(batch_mean) = acc.add(value) {
                            closed.push((key, batch_mean));
                        }
                    }
                }
            }
        }
        if closed.is_empty() {
            return None;
        }

        let batch = self.closed_batches() - 1;
        let records: Vec<BatchRecord> = closed.into_iter()
            .map(|(key, value)| BatchRecord::new(batch, key, value))
            .collect();
        info!("[{:.3}] batch {} closed after {} samples", now, batch, self.samples);
        self.metrics_logger.log_batch(&records);
        Some(batch)
    }

    pub fn accumulator(&self, key: MetricKey) -> Option<&BatchAccumulator> {
        self.accumulators.get(&key)
    }

    /// Run-level estimate for one metric over the closed batches.
    pub fn statistic(&self, key: MetricKey) -> Statistic {
        self.accumulators.get(&key)
            .map(|acc| acc.statistic(self.confidence))
            .unwrap_or_default()
    }

    pub fn summary(&self) -> Vec<SummaryRecord> {
        self.accumulators.iter()
            .map(|(&key, acc)| SummaryRecord::new(key, acc.statistic(self.confidence)))
            .collect()
    }

    pub fn save_log(&mut self, path: &str) -> Result<()> {
        self.metrics_logger.save_log(path)
    }
}
