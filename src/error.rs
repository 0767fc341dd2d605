//! Error types of the simulator.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    /// Invalid configuration, detected before any event is executed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Kernel state became inconsistent. The run is void.
    #[error("Invariant violation at t={time:.6}: {message}")]
    InvariantViolation { time: f64, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl SimulationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        SimulationError::Configuration(message.into())
    }

    pub fn invariant(time: f64, message: impl Into<String>) -> Self {
        SimulationError::InvariantViolation { time, message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
