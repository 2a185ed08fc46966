use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tablebench_metrics::{Merge, MetricSet, ReadStat, RunTimer};
use tokio::task::JoinSet;

use super::cycle::{ReadTarget, acquire_session, read_and_verify};
use super::warmup::warmup;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::pool::WorkerPool;
use crate::storage::Storage;

/// Point reads issued per session by the batched variant.
pub const READS_PER_SESSION: usize = 10;

/// Duration-bounded point reads, one request/response loop per worker thread.
///
/// The blocking variant opens a session for every read and counts a request per
/// successful read; the batched variant reuses each session for [`READS_PER_SESSION`]
/// reads and counts the whole session as one request. The deadline is only checked between
/// session cycles, so a cycle in flight always completes.
pub struct ReadWorkload {
    config: RunConfig,
    storage: Arc<dyn Storage>,
    reads_per_session: usize,
    pool_name: &'static str,
    stat: ReadStat,
    timer: RunTimer,
}

impl ReadWorkload {
    pub fn blocking(config: RunConfig, storage: Arc<dyn Storage>) -> Self {
        Self::with_reads_per_session(config, storage, 1, "read")
    }

    pub fn batched(config: RunConfig, storage: Arc<dyn Storage>) -> Self {
        Self::with_reads_per_session(config, storage, READS_PER_SESSION, "mread")
    }

    fn with_reads_per_session(
        config: RunConfig,
        storage: Arc<dyn Storage>,
        reads_per_session: usize,
        pool_name: &'static str,
    ) -> Self {
        Self {
            config,
            storage,
            reads_per_session,
            pool_name,
            stat: ReadStat::default(),
            timer: RunTimer::start(),
        }
    }

    pub fn reads_per_session(&self) -> usize {
        self.reads_per_session
    }

    pub fn stat(&self) -> &ReadStat {
        &self.stat
    }

    pub fn run(&mut self) -> Result<()> {
        let pool = WorkerPool::new(self.pool_name, self.config.threads)?;
        let res = self.run_on(&pool);
        pool.shutdown(self.config.shutdown_grace);
        res
    }

    fn run_on(&mut self, pool: &WorkerPool) -> Result<()> {
        if self.config.warmup {
            pool.block_on(warmup(&self.storage, self.config.threads));
        }

        tracing::info!(
            threads = self.config.threads,
            reads_per_session = self.reads_per_session,
            "run read workload"
        );

        let target = ReadTarget::new(&self.config);
        let deadline = Instant::now() + self.config.duration;
        self.timer.restart();

        let mut tasks = JoinSet::new();
        for _ in 0..self.config.threads {
            let worker = ReadWorker {
                storage: self.storage.clone(),
                target,
                reads_per_session: self.reads_per_session,
                deadline,
            };
            tasks.spawn_on(worker.run(), pool.handle());
        }

        tracing::info!(
            "wait {}s to finish all threads...",
            self.config.duration.as_secs()
        );
        let stat = pool.block_on(async move {
            let mut acc = ReadStat::default();
            while let Some(res) = tasks.join_next().await {
                acc.merge(&res?);
            }
            Ok::<_, Error>(acc)
        })?;

        self.timer.finish();
        self.stat.merge(&stat);
        Ok(())
    }

    pub fn metrics(&self) -> MetricSet {
        self.stat.to_named_metrics(self.timer.elapsed_ms())
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }
}

struct ReadWorker {
    storage: Arc<dyn Storage>,
    target: ReadTarget,
    reads_per_session: usize,
    deadline: Instant,
}

impl ReadWorker {
    async fn run(self) -> ReadStat {
        let mut rng = SmallRng::from_rng(&mut rand::rng());
        let mut stat = ReadStat::default();

        while Instant::now() < self.deadline {
            let Some(session) = acquire_session(self.storage.as_ref(), &mut stat).await else {
                tokio::task::yield_now().await;
                continue;
            };

            let mut succeeded = 0;
            for _ in 0..self.reads_per_session {
                let expected = self.target.random_record(&mut rng);
                if read_and_verify(&session, &expected, &mut stat).await {
                    succeeded += 1;
                }
            }

            session.close();

            // A batched session is one request whatever its reads returned.
            if self.reads_per_session > 1 || succeeded > 0 {
                stat.request_completed();
            }
        }

        stat
    }
}
