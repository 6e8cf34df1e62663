//! Runs segment tasks on a worker pool.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::task::{SegmentTask, TaskOutcome};
use crate::error::Result;

/// Executes one task per segment concurrently.
///
/// Every task runs to completion before any result is inspected; the first
/// failure in index order is then returned.
pub struct Scheduler {
    pool: Option<ThreadPool>,
}

impl Scheduler {
    /// A scheduler on rayon's global pool, or on a dedicated pool of `jobs`
    /// threads. `Some(0)` sizes the dedicated pool to the CPU count.
    pub fn new(jobs: Option<usize>) -> Result<Self> {
        let pool = match jobs {
            Some(n) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("slidereel-worker-{i}"))
                    .build()?,
            ),
            None => None,
        };
        Ok(Self { pool })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    pub fn run(&self, tasks: &[SegmentTask<'_>]) -> Result<Vec<TaskOutcome>> {
        tracing::info!(
            "Running {} segment task(s) on {} worker(s)",
            tasks.len(),
            self.threads()
        );

        let execute = || -> Vec<Result<TaskOutcome>> {
            tasks.par_iter().map(|task| task.run()).collect()
        };
        let results = match &self.pool {
            Some(pool) => pool.install(execute),
            None => execute(),
        };

        for (task, result) in tasks.iter().zip(&results) {
            if let Err(e) = result {
                tracing::error!(segment = task.number(), "Segment failed: {}", e);
            }
        }

        results.into_iter().collect()
    }
}
