//! Admission controller deciding which tier takes an arriving task.

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::task::TaskClass;

/// Controller algorithm as it appears in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerAlgorithm {
    /// Offload only when every Cloudlet server is busy.
    #[serde(alias = "algorithm1")]
    CapacityOnly,
    /// Offload Class2 above the threshold; Class1 may evict Class2 tasks.
    #[serde(alias = "algorithm2")]
    ThresholdPriority,
}

impl Display for ControllerAlgorithm {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            ControllerAlgorithm::CapacityOnly => write!(f, "capacity_only"),
            ControllerAlgorithm::ThresholdPriority => write!(f, "threshold_priority"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Verdict {
    AdmitCloudlet,
    AdmitCloudletWithPreemption,
    AdmitCloud,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Verdict::AdmitCloudlet => write!(f, "cloudlet"),
            Verdict::AdmitCloudletWithPreemption => write!(f, "cloudlet with preemption"),
            Verdict::AdmitCloud => write!(f, "cloud"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Controller {
    CapacityOnly { servers: usize },
    ThresholdPriority { servers: usize, threshold: usize },
}

impl Controller {
    pub fn new(algorithm: ControllerAlgorithm, servers: usize, threshold: usize) -> Result<Self> {
        if servers == 0 {
            return Err(SimulationError::configuration("the Cloudlet needs at least one server"));
        }
        if threshold > servers {
            return Err(SimulationError::configuration(format!(
                "threshold {} exceeds the number of servers {}", threshold, servers)));
        }
        Ok(match algorithm {
            ControllerAlgorithm::CapacityOnly => Controller::CapacityOnly { servers },
            ControllerAlgorithm::ThresholdPriority => Controller::ThresholdPriority { servers, threshold },
        })
    }

    pub fn servers(&self) -> usize {
        match *self {
            Controller::CapacityOnly { servers } | Controller::ThresholdPriority { servers, .. } => servers,
        }
    }

    /// Occupancy above which Class2 tasks are offloaded. The whole pool under [`Controller::CapacityOnly`].
    pub fn threshold(&self) -> usize {
        match *self {
            Controller::CapacityOnly { servers } => servers,
            Controller::ThresholdPriority { threshold, .. } => threshold,
        }
    }

    pub fn algorithm(&self) -> ControllerAlgorithm {
        match self {
            Controller::CapacityOnly { .. } => ControllerAlgorithm::CapacityOnly,
            Controller::ThresholdPriority { .. } => ControllerAlgorithm::ThresholdPriority,
        }
    }

    /// Routes a task of `class` given the Cloudlet occupancy indexed by class.
    pub fn decide(&self, class: TaskClass, occupancy: [usize; 2]) -> Verdict {
        let total = occupancy[0] + occupancy[1];
        match *self {
            Controller::CapacityOnly { servers } => {
                if total >= servers {
                    Verdict::AdmitCloud
                } else {
                    Verdict::AdmitCloudlet
                }
            }
            Controller::ThresholdPriority { servers, threshold } => match class {
                TaskClass::Class1 => {
                    if occupancy[TaskClass::Class1.index()] >= servers {
                        Verdict::AdmitCloud
                    } else if total < threshold {
                        Verdict::AdmitCloudlet
                    } else if occupancy[TaskClass::Class2.index()] > 0 {
                        Verdict::AdmitCloudletWithPreemption
                    } else {
                        Verdict::AdmitCloudlet
                    }
                }
                TaskClass::Class2 => {
                    if total >= threshold {
                        Verdict::AdmitCloud
                    } else {
                        Verdict::AdmitCloudlet
                    }
                }
            },
        }
    }
}
