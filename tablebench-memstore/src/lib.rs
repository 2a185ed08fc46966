//! In-process table store implementing the harness storage capability.
//!
//! Two client versions share one data model: [`BackendVersion::V1`] hands out an
//! independent session per request, [`BackendVersion::V2`] leases sessions from a
//! bounded pool and times out when it stays exhausted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use dashmap::DashMap;
use tablebench_core::{BoxFuture, Record, Session, Storage, StorageError, StorageResult};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Endpoint scheme answered by this backend.
pub const SCHEME: &str = "memory://";

pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum BackendVersion {
    #[strum(serialize = "v1")]
    V1,
    #[default]
    #[strum(serialize = "v2")]
    V2,
}

#[derive(Debug, Clone, Default)]
pub struct MemStoreStats {
    sessions_opened: Arc<AtomicU64>,
    sessions_closed: Arc<AtomicU64>,
    bulk_upserts: Arc<AtomicU64>,
    reads: Arc<AtomicU64>,
}

impl MemStoreStats {
    fn inc_sessions_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_sessions_closed(&self) {
        self.sessions_closed.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_bulk_upserts(&self) {
        self.bulk_upserts.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_reads(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sessions_opened(&self) -> u64 {
        self.sessions_opened.load(Ordering::Relaxed)
    }

    pub fn sessions_closed(&self) -> u64 {
        self.sessions_closed.load(Ordering::Relaxed)
    }

    pub fn bulk_upserts(&self) -> u64 {
        self.bulk_upserts.load(Ordering::Relaxed)
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

type Table = DashMap<String, Bytes>;

/// Table data, shareable between clients of the same endpoint.
#[derive(Debug, Clone, Default)]
pub struct MemTables {
    tables: Arc<DashMap<String, Arc<Table>>>,
}

impl MemTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records stored in `table`, zero if it does not exist.
    pub fn records(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |t| t.len())
    }

    fn create(&self, table: &str) {
        self.tables.entry(table.to_string()).or_default();
    }

    fn get(&self, table: &str) -> StorageResult<Arc<Table>> {
        self.tables
            .get(table)
            .map(|t| t.value().clone())
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))
    }
}

#[derive(Debug)]
struct Shared {
    table_name: String,
    tables: MemTables,
    latency: Option<Duration>,
    stats: MemStoreStats,
}

impl Shared {
    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn table(&self) -> StorageResult<Arc<Table>> {
        self.tables.get(&self.table_name)
    }
}

#[derive(Debug, Clone)]
pub struct MemStoreBuilder {
    version: BackendVersion,
    table_name: String,
    threads: usize,
    latency: Option<Duration>,
    session_timeout: Duration,
    tables: MemTables,
}

impl MemStoreBuilder {
    pub fn version(mut self, version: BackendVersion) -> Self {
        self.version = version;
        self
    }

    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Sizes the V2 session pool as `max(2, threads)`.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Delay injected before every session, upsert and read.
    pub fn latency(mut self, latency: Option<Duration>) -> Self {
        self.latency = latency;
        self
    }

    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Serves existing table data instead of starting empty.
    pub fn tables(mut self, tables: MemTables) -> Self {
        self.tables = tables;
        self
    }

    pub fn build(self) -> MemStore {
        let pool = match self.version {
            BackendVersion::V1 => None,
            BackendVersion::V2 => Some(Arc::new(Semaphore::new(self.threads.max(2)))),
        };

        MemStore {
            version: self.version,
            pool,
            session_timeout: self.session_timeout,
            shared: Arc::new(Shared {
                table_name: self.table_name,
                tables: self.tables,
                latency: self.latency,
                stats: MemStoreStats::default(),
            }),
        }
    }
}

impl Default for MemStoreBuilder {
    fn default() -> Self {
        Self {
            version: BackendVersion::default(),
            table_name: "app_record".to_string(),
            threads: 1,
            latency: None,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            tables: MemTables::default(),
        }
    }
}

#[derive(Debug)]
pub struct MemStore {
    version: BackendVersion,
    pool: Option<Arc<Semaphore>>,
    session_timeout: Duration,
    shared: Arc<Shared>,
}

impl MemStore {
    pub fn builder() -> MemStoreBuilder {
        MemStoreBuilder::default()
    }

    pub fn version(&self) -> BackendVersion {
        self.version
    }

    pub fn stats(&self) -> MemStoreStats {
        self.shared.stats.clone()
    }

    /// Records stored in the test table, zero if it does not exist.
    pub fn len(&self) -> usize {
        self.shared.tables.records(&self.shared.table_name)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn lease(&self) -> StorageResult<Option<OwnedSemaphorePermit>> {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };

        match tokio::time::timeout(self.session_timeout, pool.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Ok(Some(permit)),
            Ok(Err(_)) => Err(StorageError::SessionClosed),
            Err(_) => Err(StorageError::Timeout),
        }
    }
}

impl Storage for MemStore {
    fn name(&self) -> &str {
        match self.version {
            BackendVersion::V1 => "memstore-v1",
            BackendVersion::V2 => "memstore-v2",
        }
    }

    fn create_table(&self) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            self.shared.delay().await;
            self.shared.tables.create(&self.shared.table_name);
            tracing::debug!(table = %self.shared.table_name, "table ready");
            Ok(())
        })
    }

    fn create_session(&self) -> BoxFuture<'_, StorageResult<Box<dyn Session>>> {
        Box::pin(async move {
            let permit = self.lease().await?;
            self.shared.delay().await;
            self.shared.stats.inc_sessions_opened();

            Ok(Box::new(MemSession {
                shared: self.shared.clone(),
                permit,
                open: true,
            }) as Box<dyn Session>)
        })
    }

    fn bulk_upsert(&self, records: Vec<Record>) -> BoxFuture<'_, StorageResult<bool>> {
        Box::pin(async move {
            self.shared.delay().await;
            let table = self.shared.table()?;
            self.shared.stats.inc_bulk_upserts();

            for record in records {
                table.insert(record.key, record.payload);
            }
            Ok(true)
        })
    }
}

struct MemSession {
    shared: Arc<Shared>,
    permit: Option<OwnedSemaphorePermit>,
    open: bool,
}

impl Session for MemSession {
    fn read<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<Option<Record>>> {
        Box::pin(async move {
            if !self.open {
                return Err(StorageError::SessionClosed);
            }
            self.shared.delay().await;
            self.shared.stats.inc_reads();

            let table = self.shared.table()?;
            Ok(table
                .get(key)
                .map(|payload| Record::new(key, payload.value().clone())))
        })
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.permit.take();
            self.shared.stats.inc_sessions_closed();
        }
    }
}

#[cfg(test)]
mod tests {
    use tablebench_core::ScopedSession;

    use super::*;

    async fn session(store: &MemStore) -> ScopedSession {
        ScopedSession::new(
            store
                .create_session()
                .await
                .unwrap_or_else(|e| panic!("session: {e}")),
        )
    }

    #[test]
    fn backend_version_parses_cli_names() {
        assert_eq!("v1".parse::<BackendVersion>(), Ok(BackendVersion::V1));
        assert_eq!("V2".parse::<BackendVersion>(), Ok(BackendVersion::V2));
        assert!("v3".parse::<BackendVersion>().is_err());
        assert_eq!(BackendVersion::default().to_string(), "v2");
    }

    #[tokio::test]
    async fn upserted_records_read_back() -> anyhow::Result<()> {
        let store = MemStore::builder().build();
        store.create_table().await?;

        let records: Vec<Record> = (0..5).map(|i| Record::generate(i, 32)).collect();
        assert!(store.bulk_upsert(records.clone()).await?);
        assert_eq!(store.len(), 5);

        let session = session(&store).await;
        assert_eq!(session.read(&records[3].key).await?, Some(records[3].clone()));
        assert_eq!(session.read("missing").await?, None);
        session.close();

        let stats = store.stats();
        assert_eq!(stats.reads(), 2);
        assert_eq!(stats.sessions_opened(), stats.sessions_closed());
        Ok(())
    }

    #[tokio::test]
    async fn create_table_is_idempotent() -> anyhow::Result<()> {
        let store = MemStore::builder().build();
        store.create_table().await?;
        assert!(store.bulk_upsert(vec![Record::generate(1, 8)]).await?);

        store.create_table().await?;
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn clients_sharing_tables_see_each_other_writes() -> anyhow::Result<()> {
        let tables = MemTables::new();
        let writer = MemStore::builder()
            .version(BackendVersion::V1)
            .tables(tables.clone())
            .build();
        writer.create_table().await?;
        let record = Record::generate(42, 16);
        assert!(writer.bulk_upsert(vec![record.clone()]).await?);

        let reader = MemStore::builder().tables(tables.clone()).build();
        let session = session(&reader).await;
        assert_eq!(session.read(&record.key).await?, Some(record));
        assert_eq!(tables.records("app_record"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn upsert_without_table_fails() {
        let store = MemStore::builder().table_name("nope").build();

        let res = store.bulk_upsert(vec![Record::generate(1, 8)]).await;
        assert_eq!(res, Err(StorageError::TableNotFound("nope".to_string())));
    }

    #[tokio::test]
    async fn exhausted_v2_pool_times_out() -> anyhow::Result<()> {
        let store = MemStore::builder()
            .version(BackendVersion::V2)
            .threads(1)
            .session_timeout(Duration::from_millis(50))
            .build();

        let first = session(&store).await;
        let second = session(&store).await;
        let res = store.create_session().await;
        assert!(matches!(res, Err(StorageError::Timeout)));

        first.close();
        let third = session(&store).await;
        third.close();
        second.close();
        Ok(())
    }

    #[tokio::test]
    async fn v1_sessions_are_unbounded() -> anyhow::Result<()> {
        let store = MemStore::builder().version(BackendVersion::V1).build();

        let mut held = Vec::new();
        for _ in 0..16 {
            held.push(session(&store).await);
        }
        assert_eq!(store.stats().sessions_opened(), 16);

        drop(held);
        assert_eq!(store.stats().sessions_closed(), 16);
        Ok(())
    }

    #[tokio::test]
    async fn closed_session_rejects_reads() {
        let store = MemStore::builder().build();
        let mut raw = store
            .create_session()
            .await
            .unwrap_or_else(|e| panic!("session: {e}"));

        raw.close();
        let res = raw.read("any").await;
        assert_eq!(res, Err(StorageError::SessionClosed));
    }
}
