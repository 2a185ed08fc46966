use crate::storage::StorageError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("can't create table: {0}")]
    CreateTable(#[source] StorageError),

    #[error("`threads` must be a positive integer")]
    InvalidThreads,

    #[error("`batch_size` must be a positive integer")]
    InvalidBatchSize,

    #[error("`record_size` must be a positive integer")]
    InvalidRecordSize,

    #[error("`record_count` must be a positive integer for read workloads")]
    InvalidRecordCount,
}
