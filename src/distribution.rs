//! Random variate distributions used for inter-arrival, service and setup times.

use rand::Rng;
use rand_distr::{Distribution as _, Exp, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Distribution of a time value, tagged by `type` in configuration files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Distribution {
    /// Always returns `value`.
    Deterministic { value: f64 },
    /// Exponential distribution with the given rate (mean `1 / rate`).
    Exponential { rate: f64 },
    /// Uniform distribution on `[min, max)`.
    Uniform { min: f64, max: f64 },
}

impl Distribution {
    pub fn deterministic(value: f64) -> Self {
        Distribution::Deterministic { value }
    }

    pub fn exponential(rate: f64) -> Self {
        Distribution::Exponential { rate }
    }

    pub fn mean(&self) -> f64 {
        match self {
            Distribution::Deterministic { value } => *value,
            Distribution::Exponential { rate } => 1.0 / rate,
            Distribution::Uniform { min, max } => (min + max) / 2.0,
        }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        let valid = match self {
            Distribution::Deterministic { value } => value.is_finite() && *value >= 0.0,
            Distribution::Exponential { rate } => rate.is_finite() && *rate > 0.0,
            Distribution::Uniform { min, max } => min.is_finite() && max.is_finite() && 0.0 <= *min && min < max,
        };
        if valid {
            Ok(())
        } else {
            Err(SimulationError::configuration(format!("invalid distribution for {}: {:?}", name, self)))
        }
    }

    /// Inter-arrival times must also advance the clock on average.
    pub fn validate_interarrival(&self, name: &str) -> Result<()> {
        self.validate(name)?;
        if self.mean() > 0.0 {
            Ok(())
        } else {
            Err(SimulationError::configuration(format!(
                "inter-arrival distribution for {} has zero mean: {:?}", name, self)))
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64> {
        self.validate("sampling")?;
        let value = match self {
            Distribution::Deterministic { value } => *value,
            Distribution::Exponential { rate } => Exp::new(*rate)
                .map_err(|e| SimulationError::configuration(format!("exponential rate {}: {}", rate, e)))?
                .sample(rng),
            Distribution::Uniform { min, max } => Uniform::new(*min, *max).sample(rng),
        };
        Ok(value)
    }
}
