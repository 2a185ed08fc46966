use std::sync::Arc;

use tablebench_metrics::MetricSet;

use crate::config::{RunConfig, WorkloadKind};
use crate::error::Result;
use crate::storage::Storage;

mod cycle;
mod load;
mod reactive;
mod read;
mod warmup;

pub use load::{LOAD, LoadTally, LoadWorkload, RECORDS_PREFIX};
pub use reactive::ReactiveWorkload;
pub use read::{READS_PER_SESSION, ReadWorkload};

/// A runnable workload, chosen once from [`WorkloadKind`].
pub enum Workload {
    Load(LoadWorkload),
    Read(ReadWorkload),
    MultiRead(ReadWorkload),
    React(ReactiveWorkload),
}

impl Workload {
    /// Validates `config` for `kind` and builds the matching workload.
    pub fn new(kind: WorkloadKind, config: RunConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        config.validate(kind)?;

        Ok(match kind {
            WorkloadKind::Load => Self::Load(LoadWorkload::new(config, storage)),
            WorkloadKind::Read => Self::Read(ReadWorkload::blocking(config, storage)),
            WorkloadKind::MultiRead => Self::MultiRead(ReadWorkload::batched(config, storage)),
            WorkloadKind::React => Self::React(ReactiveWorkload::new(config, storage)),
        })
    }

    pub fn kind(&self) -> WorkloadKind {
        match self {
            Self::Load(_) => WorkloadKind::Load,
            Self::Read(_) => WorkloadKind::Read,
            Self::MultiRead(_) => WorkloadKind::MultiRead,
            Self::React(_) => WorkloadKind::React,
        }
    }

    /// Runs to completion. Only setup failures are returned; per-operation failures
    /// end up in [`Workload::metrics`].
    pub fn run(&mut self) -> Result<()> {
        match self {
            Self::Load(w) => w.run(),
            Self::Read(w) | Self::MultiRead(w) => w.run(),
            Self::React(w) => w.run(),
        }
    }

    pub fn metrics(&self) -> MetricSet {
        match self {
            Self::Load(w) => w.metrics(),
            Self::Read(w) | Self::MultiRead(w) => w.metrics(),
            Self::React(w) => w.metrics(),
        }
    }

    /// Reads whose result did not match the expected record. Always zero for loads.
    pub fn integrity_mismatches(&self) -> u64 {
        match self {
            Self::Load(_) => 0,
            Self::Read(w) | Self::MultiRead(w) => w.stat().mismatches(),
            Self::React(w) => w.stat().mismatches(),
        }
    }
}

/// Builds, runs and reports one workload.
pub fn run_workload(
    kind: WorkloadKind,
    config: RunConfig,
    storage: Arc<dyn Storage>,
) -> Result<MetricSet> {
    let mut workload = Workload::new(kind, config, storage)?;
    workload.run()?;

    let mismatches = workload.integrity_mismatches();
    if mismatches > 0 {
        tracing::error!(workload = %kind, mismatches, "reads returned unexpected records");
    }
    Ok(workload.metrics())
}
