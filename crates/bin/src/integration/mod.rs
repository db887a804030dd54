//! Integration module for the benchmark pipeline.
//!
//! Loads the configured sources into a panel and runs the model benchmark
//! over every requested (mineral, horizon) pair.

pub(crate) mod pipeline;
pub(crate) mod runner;
