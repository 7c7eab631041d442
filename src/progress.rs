//! Batch-granular progress counter and a console reporter thread.
//!
//! Workers add one batch at a time, never one sample, so the counter costs
//! one relaxed add per batch.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct Progress {
    completed: AtomicU64,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&self, samples: u64) {
        self.completed.fetch_add(samples, Ordering::Relaxed);
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

/// Polls a [`Progress`] counter and rewrites one console line until stopped.
pub struct ProgressReporter {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    pub fn spawn<W>(progress: Arc<Progress>, total: u64, interval: Duration, mut out: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let mut last = u64::MAX;
            loop {
                let stopping = stop_flag.load(Ordering::Acquire);
                let done = progress.completed();
                if done != last {
                    // Console write failures only lose a progress line.
                    let _ = write!(out, "Completed {} / {} samples\r", done, total);
                    let _ = out.flush();
                    last = done;
                }
                if stopping {
                    break;
                }
                thread::park_timeout(interval);
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Print the final count and join the reporter thread.
    pub fn finish(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                tracing::warn!("Progress reporter thread panicked");
            }
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_record_accumulates() {
        let progress = Progress::new();
        progress.record(5000);
        progress.record(5000);
        assert_eq!(progress.completed(), 10_000);
    }

    #[test]
    fn test_concurrent_records() {
        let progress = Arc::new(Progress::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let progress = Arc::clone(&progress);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        progress.record(2);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(progress.completed(), 16_000);
    }

    #[test]
    fn test_reporter_prints_final_count() {
        let progress = Arc::new(Progress::new());
        let buf = SharedBuf::default();
        let reporter = ProgressReporter::spawn(
            Arc::clone(&progress),
            100,
            Duration::from_secs(60),
            buf.clone(),
        );
        progress.record(100);
        reporter.finish();

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(text.ends_with("Completed 100 / 100 samples\r"), "{:?}", text);
    }
}
