use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tablebench_metrics::{Counter, Merge, MetricSet, Outcome, RequestStat, RunTimer};
use tokio::task::JoinSet;

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::partition::{chunks, split};
use crate::pool::WorkerPool;
use crate::record::Record;
use crate::storage::Storage;

pub const LOAD: &str = "LOAD";
pub const RECORDS_PREFIX: &str = "RECORDS_";

/// Per-worker result of the load workload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadTally {
    /// One sample per bulk upsert.
    pub batches: RequestStat,
    /// Records in successfully written batches.
    pub records: Counter,
}

impl Merge for LoadTally {
    fn merge(&mut self, other: &Self) {
        self.batches.merge(&other.batches);
        self.records.merge(&other.records);
    }
}

/// Finite, write-only workload: partitions `[0, record_count)` across the workers and
/// bulk-upserts each partition in `batch_size` chunks.
pub struct LoadWorkload {
    config: RunConfig,
    storage: Arc<dyn Storage>,
    tally: LoadTally,
    timer: RunTimer,
}

impl LoadWorkload {
    pub fn new(config: RunConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            config,
            storage,
            tally: LoadTally::default(),
            timer: RunTimer::start(),
        }
    }

    pub fn tally(&self) -> &LoadTally {
        &self.tally
    }

    pub fn run(&mut self) -> Result<()> {
        let pool = WorkerPool::new("load", self.config.threads)?;
        let res = self.run_on(&pool);
        pool.shutdown(self.config.shutdown_grace);
        res
    }

    fn run_on(&mut self, pool: &WorkerPool) -> Result<()> {
        tracing::info!(table = %self.config.table_name, "create table...");
        pool.block_on(self.storage.create_table())
            .map_err(Error::CreateTable)?;

        let ranges = split(self.config.record_count, self.config.threads);
        let batch_size = self.config.batch_size.max(1) as u64;
        let total_batches: u64 = ranges
            .iter()
            .map(|r| (r.end - r.start).div_ceil(batch_size))
            .sum();
        let written = Arc::new(AtomicU64::new(0));

        tracing::info!(threads = self.config.threads, "run load workload");
        self.timer.restart();

        let mut tasks = JoinSet::new();
        for range in ranges {
            let task = LoadTask {
                storage: self.storage.clone(),
                range,
                batch_size: self.config.batch_size,
                record_size: self.config.record_size,
                written: written.clone(),
                total_batches,
            };
            tasks.spawn_on(task.run(), pool.handle());
        }

        tracing::info!("wait all tasks...");
        let tally = pool.block_on(async move {
            let mut acc = LoadTally::default();
            while let Some(res) = tasks.join_next().await {
                acc.merge(&res?);
            }
            Ok::<_, Error>(acc)
        })?;

        self.timer.finish();
        self.tally.merge(&tally);
        Ok(())
    }

    /// `LOAD_*` over every batch, `LOAD_OK_*`/`LOAD_ERROR_*` by outcome, and the
    /// `RECORDS_*` write rate.
    pub fn metrics(&self) -> MetricSet {
        let prefix = format!("{LOAD}_");
        let mut out = self.tally.batches.combined().to_named_metrics(&prefix);
        out.append(self.tally.batches.to_named_metrics(LOAD));
        out.append(
            self.tally
                .records
                .to_named_metrics(RECORDS_PREFIX, self.timer.elapsed_ms()),
        );
        out
    }
}

struct LoadTask {
    storage: Arc<dyn Storage>,
    range: Range<u64>,
    batch_size: usize,
    record_size: usize,
    written: Arc<AtomicU64>,
    total_batches: u64,
}

impl LoadTask {
    async fn run(self) -> LoadTally {
        let mut tally = LoadTally::default();

        for chunk in chunks(self.range.clone(), self.batch_size) {
            let len = chunk.end - chunk.start;
            let batch: Vec<Record> = chunk
                .map(|idx| Record::generate(idx, self.record_size))
                .collect();

            let started = Instant::now();
            let res = self.storage.bulk_upsert(batch).await;
            let elapsed = started.elapsed();

            let ok = match res {
                Ok(ok) => ok,
                Err(err) => {
                    tracing::warn!(error = %err, "bulk upsert failed");
                    false
                }
            };
            tally.batches.record(Outcome::from(ok), elapsed);
            if ok {
                tally.records.add(len);
            }

            let done = self.written.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::info!("written {done}/{} batches", self.total_batches);
        }

        tally
    }
}
