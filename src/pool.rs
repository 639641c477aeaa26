//! Bounded worker pool for per-file I/O.
//!
//! A dedicated rayon pool caps how many files are read at once. Results
//! come back in completion order; callers sort them.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Mutex;

use crate::error::{DocGraphError, Result};

/// Default cap on concurrent file reads.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

pub struct WorkerPool {
    pool: ThreadPool,
    size: usize,
}

impl WorkerPool {
    pub fn new(max_concurrency: usize) -> Result<Self> {
        let size = max_concurrency.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|i| format!("docgraph-worker-{i}"))
            .build()
            .map_err(|e| DocGraphError::Pool(e.to_string()))?;
        Ok(Self { pool, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `job` once per item on the pool. Output order is unspecified.
    pub fn run<T, R, F>(&self, items: &[T], job: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        let results: Mutex<Vec<R>> = Mutex::new(Vec::with_capacity(items.len()));

        self.pool.install(|| {
            items.par_iter().for_each(|item| {
                let result = job(item);
                if let Ok(mut out) = results.lock() {
                    out.push(result);
                }
            });
        });

        results.into_inner().unwrap_or_default()
    }
}
