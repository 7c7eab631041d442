use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::bit_source::{BitSource, XorShift64Star};
use crate::config::{Aggregation, EngineConfig};
use crate::error::{EngineError, Result};
use crate::partition::Plan;
use crate::progress::Progress;
use crate::report::RunReport;
use crate::seed::{EntropySource, OsEntropy, SeedDistributor};
use crate::tally::{AtomicTally, LockedTally, Tally};
use crate::worker::{self, WorkerResult};

/// Lifecycle of one run. Only `Running` is concurrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Planning,
    Seeding,
    Running,
    Joined,
    Aggregated,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Planning => "planning",
            Stage::Seeding => "seeding",
            Stage::Running => "running",
            Stage::Joined => "joined",
            Stage::Aggregated => "aggregated",
        };
        f.write_str(name)
    }
}

/// Fork-join coin-flip engine: one thread per worker, one combine per worker.
///
/// Every run gets a fresh tally, so overlapping or repeated runs never share
/// counters.
#[derive(Debug, Clone)]
pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) progress: Option<Arc<Progress>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            progress: None,
        })
    }

    /// Publish per-batch progress to `progress` during runs.
    pub fn with_progress(mut self, progress: Arc<Progress>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn plan(&self, total_samples: u64) -> Plan {
        let plan = Plan::new(total_samples, &self.config);
        tracing::debug!(
            stage = %Stage::Planning,
            total_samples,
            iterations_per_worker = plan.iterations_per_worker,
            batches_per_worker = plan.batches_per_worker,
            "Workload partitioned"
        );
        if !plan.is_exact() {
            tracing::warn!(
                total_samples,
                planned = plan.planned_samples(),
                unit = self.config.unit(),
                "Total is not a multiple of the unit; remainder will not be sampled"
            );
        }
        plan
    }

    /// Sample `total_samples` coin flips seeded from OS entropy.
    ///
    /// Callers must pass a multiple of the unit. Zero returns an empty report
    /// without spawning anything.
    pub fn run(&self, total_samples: u64) -> Result<RunReport> {
        self.run_with_entropy(total_samples, OsEntropy)
    }

    pub fn run_with_entropy<E: EntropySource>(
        &self,
        total_samples: u64,
        entropy: E,
    ) -> Result<RunReport> {
        if total_samples == 0 {
            tracing::debug!("Zero samples requested, skipping run");
            return Ok(RunReport::empty());
        }

        let plan = self.plan(total_samples);
        let seeds = self.seed(&plan, entropy)?;
        self.run_seeded(&plan, seeds, XorShift64Star::new)
    }

    pub(crate) fn seed<E: EntropySource>(&self, plan: &Plan, entropy: E) -> Result<Vec<u64>> {
        let seeds = SeedDistributor::new(entropy).distribute(plan.worker_count)?;
        tracing::debug!(stage = %Stage::Seeding, workers = seeds.len(), "Worker seeds drawn");
        Ok(seeds)
    }

    /// Run `plan` with one worker per seed; each worker builds its own bit
    /// source from its seed inside its thread.
    pub fn run_seeded<S, F>(
        &self,
        plan: &Plan,
        seeds: Vec<u64>,
        make_source: F,
    ) -> Result<RunReport>
    where
        S: BitSource + 'static,
        F: Fn(u64) -> S + Copy + Send + 'static,
    {
        self.run_seeded_with(plan, seeds, make_source, spawn_named)
    }

    fn run_seeded_with<S, F, Sp>(
        &self,
        plan: &Plan,
        seeds: Vec<u64>,
        make_source: F,
        spawn: Sp,
    ) -> Result<RunReport>
    where
        S: BitSource + 'static,
        F: Fn(u64) -> S + Copy + Send + 'static,
        Sp: FnMut(usize, Job) -> io::Result<JoinHandle<WorkerResult>>,
    {
        debug_assert_eq!(seeds.len(), plan.worker_count);
        match self.config.aggregation {
            Aggregation::Atomic => {
                self.fork_join::<AtomicTally, _, _, _>(plan, seeds, make_source, spawn)
            }
            Aggregation::Locked => {
                self.fork_join::<LockedTally, _, _, _>(plan, seeds, make_source, spawn)
            }
        }
    }

    fn fork_join<T, S, F, Sp>(
        &self,
        plan: &Plan,
        seeds: Vec<u64>,
        make_source: F,
        mut spawn: Sp,
    ) -> Result<RunReport>
    where
        T: Tally + Default + 'static,
        S: BitSource + 'static,
        F: Fn(u64) -> S + Copy + Send + 'static,
        Sp: FnMut(usize, Job) -> io::Result<JoinHandle<WorkerResult>>,
    {
        let tally = Arc::new(T::default());
        let batches = plan.batches_per_worker;
        let batch_size = plan.batch_size;

        tracing::debug!(stage = %Stage::Running, workers = seeds.len(), "Spawning workers");
        let start = Instant::now();

        let mut handles = Vec::with_capacity(seeds.len());
        for (worker_id, seed) in seeds.into_iter().enumerate() {
            let tally = Arc::clone(&tally);
            let progress = self.progress.clone();

            let job: Job = Box::new(move || {
                let mut source = make_source(seed);
                let result =
                    worker::sample(&mut source, batches, batch_size, progress.as_deref());
                tally.combine(&result);
                result
            });

            match spawn(worker_id, job) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::error!(worker = worker_id, error = %e, "Failed to spawn worker");
                    // workers already running must finish before the error is returned
                    let _ = join_all(handles);
                    return Err(EngineError::Spawn(e));
                }
            }
        }

        let per_worker = join_all(handles)?;
        let elapsed = start.elapsed();
        tracing::debug!(
            stage = %Stage::Joined,
            elapsed_ms = elapsed.as_millis() as u64,
            "Workers joined"
        );

        Ok(finish(tally.totals(), per_worker, elapsed))
    }
}

/// One worker's whole run, handed to a spawner.
type Job = Box<dyn FnOnce() -> WorkerResult + Send + 'static>;

fn spawn_named(worker_id: usize, job: Job) -> io::Result<JoinHandle<WorkerResult>> {
    thread::Builder::new()
        .name(format!("coinflip-worker-{}", worker_id))
        .spawn(job)
}

/// Join every handle, even after a failure, so no worker outlives the run.
fn join_all(handles: Vec<JoinHandle<WorkerResult>>) -> Result<Vec<WorkerResult>> {
    let mut per_worker = Vec::with_capacity(handles.len());
    let mut failed = None;

    for (worker_id, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(result) => per_worker.push(result),
            Err(_) => {
                tracing::error!(worker = worker_id, "Worker panicked");
                failed.get_or_insert(worker_id);
            }
        }
    }

    match failed {
        Some(worker) => Err(EngineError::WorkerPanicked { worker }),
        None => Ok(per_worker),
    }
}

pub(crate) fn finish(
    totals: WorkerResult,
    per_worker: Vec<WorkerResult>,
    elapsed: std::time::Duration,
) -> RunReport {
    for (worker_id, result) in per_worker.iter().enumerate() {
        tracing::trace!(
            worker = worker_id,
            true_count = result.true_count,
            false_count = result.false_count,
            "Worker result"
        );
    }

    let report = RunReport {
        totals,
        per_worker,
        elapsed,
    };

    tracing::info!(
        stage = %Stage::Aggregated,
        true_count = report.true_count(),
        false_count = report.false_count(),
        elapsed_secs = report.elapsed_seconds(),
        samples_per_sec = report.samples_per_second(),
        "Run complete"
    );

    report
}
