use crate::config::EngineConfig;

/// Per-worker share of a run, fixed before any worker starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub total_samples: u64,
    pub worker_count: usize,
    pub batch_size: u64,
    pub iterations_per_worker: u64,
    pub batches_per_worker: u64,
}

impl Plan {
    /// Split `total_samples` evenly across the configured workers.
    ///
    /// The caller guarantees `total_samples` is a multiple of the unit; if it
    /// is not, both divisions truncate and the remainder is never sampled.
    pub fn new(total_samples: u64, config: &EngineConfig) -> Self {
        let iterations_per_worker = total_samples / config.worker_count as u64;
        let batches_per_worker = iterations_per_worker / config.batch_size;

        Self {
            total_samples,
            worker_count: config.worker_count,
            batch_size: config.batch_size,
            iterations_per_worker,
            batches_per_worker,
        }
    }

    /// Draws each worker will actually perform.
    pub fn samples_per_worker(&self) -> u64 {
        self.batches_per_worker * self.batch_size
    }

    /// Draws the whole run will perform; equals `total_samples` whenever the
    /// divisibility precondition holds.
    pub fn planned_samples(&self) -> u64 {
        self.samples_per_worker() * self.worker_count as u64
    }

    pub fn is_exact(&self) -> bool {
        self.planned_samples() == self.total_samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_plan() {
        let plan = Plan::new(16, &EngineConfig::new(4, 2));
        assert_eq!(plan.iterations_per_worker, 4);
        assert_eq!(plan.batches_per_worker, 2);
        assert_eq!(plan.samples_per_worker(), 4);
        assert!(plan.is_exact());
    }

    #[test]
    fn test_reference_shape() {
        let config = EngineConfig::default();
        let plan = Plan::new(config.unit() * 3, &config);
        assert_eq!(plan.iterations_per_worker, 15_000);
        assert_eq!(plan.batches_per_worker, 3);
        assert_eq!(plan.planned_samples(), 480_000);
    }

    #[test]
    fn test_inexact_total_truncates() {
        let plan = Plan::new(17, &EngineConfig::new(4, 2));
        assert_eq!(plan.iterations_per_worker, 4);
        assert_eq!(plan.batches_per_worker, 2);
        assert_eq!(plan.planned_samples(), 16);
        assert!(!plan.is_exact());

        // not a multiple of the batch size either
        let plan = Plan::new(12, &EngineConfig::new(4, 2));
        assert_eq!(plan.iterations_per_worker, 3);
        assert_eq!(plan.batches_per_worker, 1);
        assert_eq!(plan.planned_samples(), 8);
    }
}
