//! Parallel coin-flip sampler.
//!
//! A total sample count is split evenly across a fixed number of worker
//! threads. Each worker draws from its own xorshift64* generator, counts low
//! bits locally, and folds its two counters into the shared tally once at
//! the end.

pub mod bit_source;
pub mod cli;
pub mod collector;
pub mod config;
pub mod console;
pub mod engine;
mod engine_async;
pub mod error;
pub mod partition;
pub mod progress;
pub mod report;
pub mod seed;
pub mod tally;
pub mod worker;

pub use bit_source::{BitSource, XorShift64Star};
pub use config::{Aggregation, AppConfig, EngineConfig, Runtime};
pub use engine::Engine;
pub use error::{EngineError, InputError, Result};
pub use partition::Plan;
pub use report::RunReport;
pub use worker::WorkerResult;
