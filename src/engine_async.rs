use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::{Builder, Runtime};
use tokio::task;

use crate::bit_source::{BitSource, XorShift64Star};
use crate::config::Aggregation;
use crate::engine::{finish, Engine, Stage};
use crate::error::{EngineError, Result};
use crate::partition::Plan;
use crate::report::RunReport;
use crate::seed::{EntropySource, OsEntropy};
use crate::tally::{AtomicTally, LockedTally, Tally};
use crate::worker;

impl Engine {
    /// Multi-threaded runtime whose blocking pool fits one task per worker.
    pub fn runtime(&self) -> Result<Runtime> {
        Builder::new_multi_thread()
            .max_blocking_threads(self.config.worker_count)
            .enable_all()
            .build()
            .map_err(EngineError::Runtime)
    }

    /// Same run as [`Engine::run`], with each worker on Tokio's blocking pool.
    pub async fn run_async(&self, total_samples: u64) -> Result<RunReport> {
        self.run_async_with_entropy(total_samples, OsEntropy).await
    }

    pub async fn run_async_with_entropy<E: EntropySource>(
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
        self.run_async_seeded(&plan, seeds, XorShift64Star::new).await
    }

    /// Async counterpart of [`Engine::run_seeded`].
    pub async fn run_async_seeded<S, F>(
        &self,
        plan: &Plan,
        seeds: Vec<u64>,
        make_source: F,
    ) -> Result<RunReport>
    where
        S: BitSource + 'static,
        F: Fn(u64) -> S + Copy + Send + 'static,
    {
        debug_assert_eq!(seeds.len(), plan.worker_count);
        match self.config.aggregation {
            Aggregation::Atomic => {
                self.spawn_blocking_all::<AtomicTally, _, _>(plan, seeds, make_source)
                    .await
            }
            Aggregation::Locked => {
                self.spawn_blocking_all::<LockedTally, _, _>(plan, seeds, make_source)
                    .await
            }
        }
    }

    async fn spawn_blocking_all<T, S, F>(
        &self,
        plan: &Plan,
        seeds: Vec<u64>,
        make_source: F,
    ) -> Result<RunReport>
    where
        T: Tally + Default + 'static,
        S: BitSource + 'static,
        F: Fn(u64) -> S + Copy + Send + 'static,
    {
        let tally = Arc::new(T::default());
        let batches = plan.batches_per_worker;
        let batch_size = plan.batch_size;

        tracing::debug!(stage = %Stage::Running, tasks = seeds.len(), "Spawning blocking tasks");
        let start = Instant::now();

        let mut handles = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let tally = Arc::clone(&tally);
            let progress = self.progress.clone();

            let handle = task::spawn_blocking(move || {
                let mut source = make_source(seed);
                let result =
                    worker::sample(&mut source, batches, batch_size, progress.as_deref());
                tally.combine(&result);
                result
            });

            handles.push(handle);
        }

        let mut per_worker = Vec::with_capacity(handles.len());
        let mut failed = None;
        for (task_id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(result) => per_worker.push(result),
                Err(e) => {
                    tracing::error!(worker = task_id, error = %e, "Blocking task failed");
                    failed.get_or_insert(task_id);
                }
            }
        }

        let elapsed = start.elapsed();
        if let Some(worker) = failed {
            return Err(EngineError::WorkerPanicked { worker });
        }
        tracing::debug!(
            stage = %Stage::Joined,
            elapsed_ms = elapsed.as_millis() as u64,
            "Tasks joined"
        );

        Ok(finish(tally.totals(), per_worker, elapsed))
    }
}
