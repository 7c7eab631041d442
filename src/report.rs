use std::fmt;
use std::time::Duration;

use crate::worker::WorkerResult;

const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const BLUE: &str = "\x1b[94m";
const RESET: &str = "\x1b[0m";

/// Final tally of a run plus the wall time of its parallel phase.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub totals: WorkerResult,
    /// Each worker's local counts, in worker order.
    pub per_worker: Vec<WorkerResult>,
    pub elapsed: Duration,
}

impl RunReport {
    /// Report for a zero-sample run: nothing spawned, nothing timed.
    pub fn empty() -> Self {
        Self {
            totals: WorkerResult::default(),
            per_worker: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn true_count(&self) -> u64 {
        self.totals.true_count
    }

    pub fn false_count(&self) -> u64 {
        self.totals.false_count
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn samples_per_second(&self) -> f64 {
        let seconds = self.elapsed_seconds();
        if seconds > 0.0 {
            self.totals.total() as f64 / seconds
        } else {
            0.0
        }
    }

    /// Console rendering, optionally with ANSI colors.
    pub fn render(&self, color: bool) -> String {
        let (green, red, blue, reset) = if color {
            (GREEN, RED, BLUE, RESET)
        } else {
            ("", "", "", "")
        };

        format!(
            "Result: true `{green}{}{reset}`, false `{red}{}{reset}`\n\
             Elapsed: {blue}{:.6}{reset}s\n\
             Throughput: {:.0} samples/s\n",
            self.true_count(),
            self.false_count(),
            self.elapsed_seconds(),
            self.samples_per_second(),
        )
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}
