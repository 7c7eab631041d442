use std::env;
use std::str::FromStr;

use crate::error::{EngineError, Result};

pub const DEFAULT_WORKER_COUNT: usize = 32;
pub const DEFAULT_BATCH_SIZE: u64 = 5000;

/// How worker results are folded into the global tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    /// Two lock-free adds per worker.
    #[default]
    Atomic,
    /// One mutex acquisition per worker guarding both counters.
    Locked,
}

impl FromStr for Aggregation {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(Aggregation::Atomic),
            "locked" | "mutex" => Ok(Aggregation::Locked),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown aggregation '{}', expected 'atomic' or 'locked'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Runtime {
    #[default]
    Threads,
    Tokio,
}

impl FromStr for Runtime {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "threads" | "thread" => Ok(Runtime::Threads),
            "tokio" | "async" => Ok(Runtime::Tokio),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown runtime '{}', expected 'threads' or 'tokio'",
                other
            ))),
        }
    }
}

/// Partition shape and aggregation strategy of the sampling engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub worker_count: usize,
    pub batch_size: u64,
    pub aggregation: Aggregation,
    /// Publish per-batch progress to a shared counter.
    pub progress: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            aggregation: Aggregation::Atomic,
            progress: false,
        }
    }
}

impl EngineConfig {
    pub fn new(worker_count: usize, batch_size: u64) -> Self {
        Self {
            worker_count,
            batch_size,
            ..Self::default()
        }
    }

    /// `worker_count × batch_size`; every valid total is a multiple of it.
    /// Only meaningful on a validated config.
    pub fn unit(&self) -> u64 {
        self.worker_count as u64 * self.batch_size
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(EngineError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(EngineError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        if (self.worker_count as u64).checked_mul(self.batch_size).is_none() {
            return Err(EngineError::InvalidConfig(format!(
                "unit {} x {} overflows 64 bits",
                self.worker_count, self.batch_size
            )));
        }
        Ok(())
    }
}

/// Binary-level settings layered on top of the engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub runtime: Runtime,
    pub pause: bool,
    pub color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            runtime: Runtime::Threads,
            pause: true,
            color: true,
        }
    }
}

impl AppConfig {
    /// Load from `.env` and the process environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let config = AppConfig {
            engine: EngineConfig {
                worker_count: parse_or(&lookup, "COINFLIP_WORKER_COUNT", DEFAULT_WORKER_COUNT)?,
                batch_size: parse_or(&lookup, "COINFLIP_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
                aggregation: parse_or(&lookup, "COINFLIP_AGGREGATION", Aggregation::Atomic)?,
                progress: parse_flag(&lookup, "COINFLIP_PROGRESS", false)?,
            },
            runtime: parse_or(&lookup, "COINFLIP_RUNTIME", defaults.runtime)?,
            pause: parse_flag(&lookup, "COINFLIP_PAUSE", defaults.pause)?,
            color: lookup("NO_COLOR").map_or(defaults.color, |v| v.is_empty()),
        };

        config.engine.validate()?;
        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| EngineError::InvalidConfig(format!("{}={}: {}", key, raw, e))),
    }
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None => Ok(default),
        Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
        Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
        Some(other) => Err(EngineError::InvalidConfig(format!(
            "{}={}: expected a boolean",
            key, other
        ))),
    }
}
