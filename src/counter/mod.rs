//! Fan-out/fan-in counting pipeline.
//!
//! - [`Counter`] - Runs one generator, N parsing workers and one aggregator
//! - [`RunResult`] - Unique count plus every failure reported by workers

mod engine;
mod generator;
mod worker;

pub use engine::{Counter, RunResult};
