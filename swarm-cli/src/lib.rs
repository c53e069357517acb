//! Headless driver for the swarm engine: loads settings and a target point
//! cloud, runs a fixed number of ticks and reports the outcome as JSON.

pub mod config;
pub mod runner;

pub use config::{Args, RunConfig};
pub use runner::{run, RunReport};
