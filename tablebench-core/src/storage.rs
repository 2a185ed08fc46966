//! Capability contract the workloads drive.
//!
//! Implementations live outside the engine; every call is fallible and may suspend.

use std::future::Future;
use std::pin::Pin;

use crate::record::Record;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("operation timed out")]
    Timeout,

    #[error("table `{0}` does not exist")]
    TableNotFound(String),

    #[error("session is closed")]
    SessionClosed,

    #[error("backend error: {0}")]
    Backend(String),
}

/// A table store the harness can load and read.
pub trait Storage: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Creates the test table; succeeds if it already exists.
    fn create_table(&self) -> BoxFuture<'_, StorageResult<()>>;

    fn create_session(&self) -> BoxFuture<'_, StorageResult<Box<dyn Session>>>;

    /// Writes `records` in one bulk operation. `Ok(false)` is a rejected batch.
    fn bulk_upsert(&self, records: Vec<Record>) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Backend handle required to issue reads. Must be released with [`Session::close`].
pub trait Session: Send + Sync {
    fn read<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<Option<Record>>>;

    fn close(&mut self);
}

/// Closes the wrapped session when dropped, on success and error paths alike.
pub struct ScopedSession {
    inner: Option<Box<dyn Session>>,
}

impl ScopedSession {
    pub fn new(session: Box<dyn Session>) -> Self {
        Self {
            inner: Some(session),
        }
    }

    pub async fn read(&self, key: &str) -> StorageResult<Option<Record>> {
        match &self.inner {
            Some(session) => session.read(key).await,
            None => Err(StorageError::SessionClosed),
        }
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut session) = self.inner.take() {
            session.close();
        }
    }
}

impl Drop for ScopedSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ScopedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedSession")
            .field("open", &self.inner.is_some())
            .finish()
    }
}
