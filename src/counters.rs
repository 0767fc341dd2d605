//! Raw per-class counters kept by the Cloudlet and the Cloud.

use std::iter::Sum;
use std::ops::{Add, AddAssign};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RawCounters {
    pub arrived: u64,
    pub completed: u64,
    /// Sum of response times of completed tasks.
    pub serviced_time: f64,
    /// Tasks evicted from the Cloudlet.
    pub switched: u64,
    /// Evicted tasks that completed after their restart in the Cloud.
    pub switched_completed: u64,
    /// Sum of response times of evicted tasks, measured from their original arrival.
    pub switched_serviced_time: f64,
    /// Service consumed on the Cloudlet by tasks before their eviction.
    pub switched_lost_time: f64,
    /// Integral of the occupancy over time.
    pub population_integral: f64,
}

impl RawCounters {
    pub fn response(&self) -> f64 {
        ratio(self.serviced_time, self.completed as f64)
    }

    pub fn throughput(&self, elapsed: f64) -> f64 {
        ratio(self.completed as f64, elapsed)
    }

    pub fn population(&self, elapsed: f64) -> f64 {
        ratio(self.population_integral, elapsed)
    }

    pub fn switch_ratio(&self) -> f64 {
        ratio(self.switched as f64, self.arrived as f64)
    }

    pub fn switch_response(&self) -> f64 {
        ratio(self.switched_serviced_time, self.switched_completed as f64)
    }

    /// Mean service lost per eviction.
    pub fn service_lost_ratio(&self) -> f64 {
        ratio(self.switched_lost_time, self.switched as f64)
    }
}

/// Division that yields 0 when the denominator is 0.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

impl AddAssign for RawCounters {
    fn add_assign(&mut self, other: Self) {
        self.arrived += other.arrived;
        self.completed += other.completed;
        self.serviced_time += other.serviced_time;
        self.switched += other.switched;
        self.switched_completed += other.switched_completed;
        self.switched_serviced_time += other.switched_serviced_time;
        self.switched_lost_time += other.switched_lost_time;
        self.population_integral += other.population_integral;
    }
}

impl Add for RawCounters {
    type Output = RawCounters;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Sum for RawCounters {
    fn sum<I: Iterator<Item = RawCounters>>(iter: I) -> Self {
        iter.fold(RawCounters::default(), Add::add)
    }
}
