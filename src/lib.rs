//! Discrete-event simulation of a two-tier Cloudlet/Cloud system serving two task classes.

pub mod calendar;
pub mod cloud;
pub mod cloudlet;
pub mod controller;
pub mod counters;
pub mod distribution;
pub mod error;
pub mod events;
pub mod metrics;
pub mod random;
pub mod server;
pub mod server_selector;
pub mod simulation;
pub mod simulation_config;
pub mod simulation_metrics;
pub mod state_space;
pub mod statistics;
pub mod system;
pub mod task;
