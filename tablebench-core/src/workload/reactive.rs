use std::sync::Arc;
use std::time::{Duration, Instant};

use tablebench_metrics::{Merge, MetricSet, PerThread, ReadStat, RunTimer};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use super::cycle::{ReadTarget, acquire_session, read_and_verify};
use super::warmup::warmup;
use crate::config::RunConfig;
use crate::error::Result;
use crate::pool::WorkerPool;
use crate::storage::Storage;

/// Point reads driven by `threads` logical lanes over a shared pool.
///
/// Every lane cycle is a separate task that resubmits its successor until the deadline
/// passes, then signals the lane done. Samples are folded into one accumulator per pool
/// thread, so the number of lanes is independent of the number of threads.
pub struct ReactiveWorkload {
    config: RunConfig,
    storage: Arc<dyn Storage>,
    stat: ReadStat,
    contributing_threads: usize,
    timer: RunTimer,
}

impl ReactiveWorkload {
    pub fn new(config: RunConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            config,
            storage,
            stat: ReadStat::default(),
            contributing_threads: 0,
            timer: RunTimer::start(),
        }
    }

    pub fn stat(&self) -> &ReadStat {
        &self.stat
    }

    /// Pool threads that recorded at least one cycle in the last run.
    pub fn contributing_threads(&self) -> usize {
        self.contributing_threads
    }

    pub fn run(&mut self) -> Result<()> {
        let pool = WorkerPool::new("reactive", self.config.reactive_pool_size())?;
        self.run_on(&pool);
        pool.shutdown(self.config.shutdown_grace);
        Ok(())
    }

    fn run_on(&mut self, pool: &WorkerPool) {
        if self.config.warmup {
            pool.block_on(warmup(&self.storage, self.config.threads));
        }

        tracing::info!(
            lanes = self.config.threads,
            pool_threads = pool.threads(),
            "run reactive read workload"
        );

        let accumulators: Arc<PerThread<ReadStat>> = Arc::new(PerThread::new());
        let target = ReadTarget::new(&self.config);
        let deadline = Instant::now() + self.config.duration;
        self.timer.restart();

        let mut signals = Vec::with_capacity(self.config.threads);
        for id in 0..self.config.threads {
            let (done, signal) = oneshot::channel();
            Lane {
                id,
                storage: self.storage.clone(),
                target,
                deadline,
                accumulators: accumulators.clone(),
                handle: pool.handle().clone(),
                done: Some(done),
            }
            .submit();
            signals.push((id, signal));
        }

        tracing::info!(
            "wait {}s to finish all lanes...",
            self.config.duration.as_secs()
        );
        pool.block_on(async move {
            for (id, signal) in signals {
                if signal.await.is_err() {
                    tracing::warn!(lane = id, "lane dropped without completing");
                }
            }
        });

        self.timer.finish();
        self.contributing_threads = accumulators.threads();
        self.stat.merge(&accumulators.merged());
    }

    pub fn metrics(&self) -> MetricSet {
        self.stat.to_named_metrics(self.timer.elapsed_ms())
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }
}

/// One logical reader. Owned by whichever cycle task is currently in flight.
struct Lane {
    id: usize,
    storage: Arc<dyn Storage>,
    target: ReadTarget,
    deadline: Instant,
    accumulators: Arc<PerThread<ReadStat>>,
    handle: Handle,
    done: Option<oneshot::Sender<()>>,
}

impl Lane {
    fn submit(self) {
        let handle = self.handle.clone();
        handle.spawn(self.cycle());
    }

    async fn cycle(mut self) {
        let mut stat = ReadStat::default();

        if let Some(session) = acquire_session(self.storage.as_ref(), &mut stat).await {
            let expected = self.target.random_record(&mut rand::rng());
            if read_and_verify(&session, &expected, &mut stat).await {
                stat.request_completed();
            }
            self.accumulators.merge_local(&stat);
            session.close();
        } else {
            self.accumulators.merge_local(&stat);
        }

        if Instant::now() < self.deadline {
            self.submit();
        } else if let Some(done) = self.done.take() {
            tracing::debug!(lane = self.id, "lane finished");
            let _ = done.send(());
        }
    }
}
