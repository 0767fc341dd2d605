//! Simulation configuration.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::cloud::RestartPolicy;
use crate::controller::{Controller, ControllerAlgorithm};
use crate::distribution::Distribution;
use crate::error::{Result, SimulationError};
use crate::server_selector::SelectionStrategy;
use crate::task::TaskClass;

/// A distribution for each task class.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ClassDistributions {
    pub class_1: Distribution,
    pub class_2: Distribution,
}

impl ClassDistributions {
    pub fn new(class_1: Distribution, class_2: Distribution) -> Self {
        Self { class_1, class_2 }
    }

    /// Exponential distributions with the given rates.
    pub fn exponential(rate_1: f64, rate_2: f64) -> Self {
        Self::new(Distribution::exponential(rate_1), Distribution::exponential(rate_2))
    }

    pub fn get(&self, class: TaskClass) -> &Distribution {
        match class {
            TaskClass::Class1 => &self.class_1,
            TaskClass::Class2 => &self.class_2,
        }
    }

    /// Distributions indexed by [`TaskClass::index`].
    pub fn to_array(&self) -> [Distribution; 2] {
        [self.class_1.clone(), self.class_2.clone()]
    }

    fn validate(&self, name: &str) -> Result<()> {
        self.class_1.validate(&format!("{} of {}", name, TaskClass::Class1))?;
        self.class_2.validate(&format!("{} of {}", name, TaskClass::Class2))
    }

    fn validate_interarrival(&self, name: &str) -> Result<()> {
        self.class_1.validate_interarrival(&format!("{} of {}", name, TaskClass::Class1))?;
        self.class_2.validate_interarrival(&format!("{} of {}", name, TaskClass::Class2))
    }
}

/// Holds raw simulation config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
struct RawSimulationConfig {
    pub servers: Option<usize>,
    pub threshold: Option<usize>,
    pub controller: Option<ControllerAlgorithm>,
    pub selector: Option<SelectionStrategy>,
    pub arrival: Option<ClassDistributions>,
    pub cloudlet_service: Option<ClassDistributions>,
    pub cloud_service: Option<ClassDistributions>,
    pub setup: Option<Distribution>,
    pub restart_policy: Option<RestartPolicy>,
    pub batch_size: Option<usize>,
    pub batch_count: Option<usize>,
    pub confidence: Option<f64>,
    pub seed: Option<u64>,
    pub stop_time: Option<f64>,
}

/// Represents simulation configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of Cloudlet servers.
    pub servers: usize,
    /// Cloudlet occupancy above which Class2 tasks are offloaded (threshold controller only).
    pub threshold: usize,
    /// Admission controller algorithm.
    pub controller: ControllerAlgorithm,
    /// Cloudlet server selection strategy.
    pub selector: SelectionStrategy,
    /// Inter-arrival time distributions.
    pub arrival: ClassDistributions,
    /// Service time distributions on a Cloudlet server.
    pub cloudlet_service: ClassDistributions,
    /// Service time distributions in the Cloud.
    pub cloud_service: ClassDistributions,
    /// Setup time paid by tasks restarted in the Cloud.
    pub setup: Distribution,
    /// Residual service model of restarted tasks.
    pub restart_policy: RestartPolicy,
    /// Samples per batch.
    pub batch_size: usize,
    /// Batches to collect, 0 for no limit.
    pub batch_count: usize,
    /// Confidence level of the reported intervals.
    pub confidence: f64,
    /// Seed of the random streams.
    pub seed: u64,
    /// Arrivals at or after this time are not admitted.
    pub stop_time: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            servers: 20,
            threshold: 20,
            controller: ControllerAlgorithm::CapacityOnly,
            selector: SelectionStrategy::Order,
            arrival: ClassDistributions::exponential(4.0, 6.25),
            cloudlet_service: ClassDistributions::exponential(0.45, 0.27),
            cloud_service: ClassDistributions::exponential(0.25, 0.22),
            setup: Distribution::exponential(1.25),
            restart_policy: RestartPolicy::ScaledResample,
            batch_size: 512,
            batch_count: 64,
            confidence: 0.95,
            seed: 123456789,
            stop_time: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_file(file_name: &str) -> Result<Self> {
        let content = std::fs::read_to_string(file_name)?;
        Self::from_yaml(&content)
    }

    /// Parses a YAML document. Missing fields take their default values.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let raw: RawSimulationConfig = serde_yaml::from_str(content)
            .map_err(|e| SimulationError::configuration(e.to_string()))?;
        let default = Self::default();

        let servers = raw.servers.unwrap_or(default.servers);
        let config = Self {
            servers,
            // an omitted threshold means "no threshold": the whole pool
            threshold: raw.threshold.unwrap_or(servers),
            controller: raw.controller.unwrap_or(default.controller),
            selector: raw.selector.unwrap_or(default.selector),
            arrival: raw.arrival.unwrap_or(default.arrival),
            cloudlet_service: raw.cloudlet_service.unwrap_or(default.cloudlet_service),
            cloud_service: raw.cloud_service.unwrap_or(default.cloud_service),
            setup: raw.setup.unwrap_or(default.setup),
            restart_policy: raw.restart_policy.unwrap_or(default.restart_policy),
            batch_size: raw.batch_size.unwrap_or(default.batch_size),
            batch_count: raw.batch_count.unwrap_or(default.batch_count),
            confidence: raw.confidence.unwrap_or(default.confidence),
            seed: raw.seed.unwrap_or(default.seed),
            stop_time: raw.stop_time.or(default.stop_time),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Controller::new(self.controller, self.servers, self.threshold)?;
        if self.batch_size == 0 {
            return Err(SimulationError::configuration("batch_size must be positive"));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(SimulationError::configuration(format!(
                "confidence {} must lie strictly between 0 and 1", self.confidence)));
        }
        if let Some(stop_time) = self.stop_time {
            if !(stop_time > 0.0) {
                return Err(SimulationError::configuration(format!("stop_time {} must be positive", stop_time)));
            }
        }
        if self.stop_time.is_none() && self.batch_count == 0 {
            return Err(SimulationError::configuration("either stop_time or batch_count must bound the run"));
        }
        self.arrival.validate_interarrival("arrival")?;
        self.cloudlet_service.validate("cloudlet service")?;
        self.cloud_service.validate("cloud service")?;
        self.setup.validate("setup")?;

        if self.controller == ControllerAlgorithm::ThresholdPriority && self.threshold == 0 {
            warn!("threshold 0 sends every Class2 task to the Cloud");
        }
        Ok(())
    }
}
