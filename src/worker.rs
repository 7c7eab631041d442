use crate::bit_source::BitSource;
use crate::progress::Progress;

/// Local outcome counts of one worker, or the combined totals of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerResult {
    pub true_count: u64,
    pub false_count: u64,
}

impl WorkerResult {
    pub fn new(true_count: u64, false_count: u64) -> Self {
        Self {
            true_count,
            false_count,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_count + self.false_count
    }
}

/// Draw `batches × batch_size` words from `source` and count low bits.
///
/// Counters are plain locals; nothing here is shared with other workers
/// except the optional progress counter, touched once per batch.
pub fn sample<S: BitSource>(
    source: &mut S,
    batches: u64,
    batch_size: u64,
    progress: Option<&Progress>,
) -> WorkerResult {
    let mut true_count = 0u64;
    let mut false_count = 0u64;

    match progress {
        None => {
            for _ in 0..batches * batch_size {
                if source.next_word() & 1 == 1 {
                    true_count += 1;
                } else {
                    false_count += 1;
                }
            }
        }
        Some(progress) => {
            for _ in 0..batches {
                for _ in 0..batch_size {
                    if source.next_word() & 1 == 1 {
                        true_count += 1;
                    } else {
                        false_count += 1;
                    }
                }
                progress.record(batch_size);
            }
        }
    }

    WorkerResult {
        true_count,
        false_count,
    }
}
