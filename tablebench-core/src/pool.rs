use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tokio::runtime::{Builder, Handle, Runtime};

use crate::error::Result;

/// Fixed-size pool of named worker threads.
///
/// The controlling thread only ever blocks in [`WorkerPool::block_on`] waiting for a
/// whole phase; workers never block it individually.
#[derive(Debug)]
pub struct WorkerPool {
    name: &'static str,
    threads: usize,
    runtime: Runtime,
}

impl WorkerPool {
    /// Threads are named `{name}-thread-{n}`.
    pub fn new(name: &'static str, threads: usize) -> Result<Self> {
        let threads = threads.max(1);
        let next_id = Arc::new(AtomicUsize::new(1));
        let runtime = Builder::new_multi_thread()
            .worker_threads(threads)
            .thread_name_fn(move || {
                let id = next_id.fetch_add(1, Ordering::Relaxed);
                format!("{name}-thread-{id}")
            })
            .enable_time()
            .build()?;

        Ok(Self {
            name,
            threads,
            runtime,
        })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn handle(&self) -> &Handle {
        self.runtime.handle()
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Stops the pool, waiting at most `grace` for tasks still in flight.
    ///
    /// Running past the grace period is logged, not escalated.
    pub fn shutdown(self, grace: Duration) {
        tracing::info!(pool = self.name, "shutdown workload pool");
        let started = Instant::now();
        self.runtime.shutdown_timeout(grace);
        if started.elapsed() >= grace {
            tracing::error!(
                pool = self.name,
                grace_ms = grace.as_millis() as u64,
                "pool did not terminate within grace period"
            );
        }
    }
}
