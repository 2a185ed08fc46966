mod config;
mod error;
mod partition;
mod pool;
mod record;
mod storage;
mod workload;

pub use config::{RunConfig, WorkloadKind};
pub use error::{Error, Result};
pub use partition::{chunks, split};
pub use pool::WorkerPool;
pub use record::Record;
pub use storage::{BoxFuture, ScopedSession, Session, Storage, StorageError, StorageResult};
pub use workload::{
    LOAD, LoadTally, LoadWorkload, READS_PER_SESSION, RECORDS_PREFIX, ReactiveWorkload,
    ReadWorkload, Workload, run_workload,
};
