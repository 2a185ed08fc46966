use std::time::Duration;

use crate::error::{Error, Result};

/// Workload kind (the string form used by the CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum WorkloadKind {
    /// Bulk-load `record_count` records.
    #[strum(serialize = "load")]
    Load,

    /// One session per point read, one blocking loop per worker.
    #[strum(serialize = "read")]
    Read,

    /// Several point reads per session.
    #[strum(serialize = "multiread", serialize = "multi-read")]
    MultiRead,

    /// Continuation-chained reads on a shared pool.
    #[strum(serialize = "react", serialize = "reactive")]
    React,
}

impl WorkloadKind {
    #[must_use]
    pub fn is_read(self) -> bool {
        !matches!(self, Self::Load)
    }
}

/// Immutable parameters of one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub endpoint: String,
    pub table_name: String,
    pub threads: usize,
    pub record_count: u64,
    /// Payload size in bytes.
    pub record_size: usize,
    /// Records per bulk upsert.
    pub batch_size: usize,
    pub duration: Duration,
    pub warmup: bool,

    /// Pool size of the reactive workload; defaults to available parallelism.
    pub reactive_threads: Option<usize>,

    /// How long pool teardown waits for in-flight tasks.
    pub shutdown_grace: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            table_name: "app_record".to_string(),
            threads: 1,
            record_count: 1_000_000,
            record_size: 2000,
            batch_size: 500,
            duration: Duration::from_secs(120),
            warmup: true,
            reactive_threads: None,
            shutdown_grace: Duration::from_secs(60),
        }
    }
}

impl RunConfig {
    pub fn validate(&self, kind: WorkloadKind) -> Result<()> {
        if self.threads == 0 {
            return Err(Error::InvalidThreads);
        }
        if self.record_size == 0 {
            return Err(Error::InvalidRecordSize);
        }
        match kind {
            WorkloadKind::Load => {
                if self.batch_size == 0 {
                    return Err(Error::InvalidBatchSize);
                }
            }
            WorkloadKind::Read | WorkloadKind::MultiRead | WorkloadKind::React => {
                if self.record_count == 0 {
                    return Err(Error::InvalidRecordCount);
                }
            }
        }
        if self.reactive_threads == Some(0) {
            return Err(Error::InvalidThreads);
        }
        Ok(())
    }

    /// Worker count of the reactive pool.
    #[must_use]
    pub fn reactive_pool_size(&self) -> usize {
        self.reactive_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
