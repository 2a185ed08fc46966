#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tablebench_core::{
    BoxFuture, Record, RunConfig, Session, Storage, StorageError, StorageResult,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .with_test_writer()
        .try_init();
}

/// Small config that keeps the worker pools and durations test-sized.
pub fn config(threads: usize, duration: Duration) -> RunConfig {
    RunConfig {
        endpoint: "stub://".to_string(),
        threads,
        record_count: 100,
        record_size: 16,
        batch_size: 30,
        duration,
        warmup: false,
        reactive_threads: Some(2),
        shutdown_grace: Duration::from_secs(5),
        ..RunConfig::default()
    }
}

/// What a stub session answers to reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reads {
    /// The stored record for the key.
    Echo,
    /// Nothing, for every key.
    Absent,
    /// A backend error.
    Fail,
}

#[derive(Debug, Default)]
pub struct Calls {
    pub create_table: AtomicUsize,
    pub sessions_opened: AtomicUsize,
    pub sessions_closed: AtomicUsize,
    pub reads: AtomicUsize,
    pub batch_sizes: Mutex<Vec<usize>>,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        let mut sizes = self
            .batch_sizes
            .lock()
            .unwrap_or_else(|e| panic!("batch sizes poisoned: {e}"))
            .clone();
        sizes.sort_unstable();
        sizes
    }
}

/// In-test backend that records every call.
pub struct StubStorage {
    reads: Reads,
    fail_create_table: bool,
    fail_sessions: bool,
    reject_batches: bool,
    latency: Option<Duration>,
    records: Arc<HashMap<String, Record>>,
    pub calls: Arc<Calls>,
}

impl StubStorage {
    /// Knows the records `[0, record_count)` of `record_size` bytes.
    pub fn new(cfg: &RunConfig, reads: Reads) -> Self {
        let records = (0..cfg.record_count)
            .map(|idx| {
                let record = Record::generate(idx, cfg.record_size);
                (record.key.clone(), record)
            })
            .collect();

        Self {
            reads,
            fail_create_table: false,
            fail_sessions: false,
            reject_batches: false,
            latency: None,
            records: Arc::new(records),
            calls: Arc::new(Calls::default()),
        }
    }

    pub fn failing_create_table(mut self) -> Self {
        self.fail_create_table = true;
        self
    }

    pub fn failing_sessions(mut self) -> Self {
        self.fail_sessions = true;
        self
    }

    pub fn rejecting_batches(mut self) -> Self {
        self.reject_batches = true;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn into_shared(self) -> (Arc<dyn Storage>, Arc<Calls>) {
        let calls = self.calls.clone();
        (Arc::new(self), calls)
    }
}

impl Storage for StubStorage {
    fn name(&self) -> &str {
        "stub"
    }

    fn create_table(&self) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            self.calls.create_table.fetch_add(1, Ordering::SeqCst);
            if self.fail_create_table {
                return Err(StorageError::Backend("create table refused".to_string()));
            }
            Ok(())
        })
    }

    fn create_session(&self) -> BoxFuture<'_, StorageResult<Box<dyn Session>>> {
        Box::pin(async move {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            if self.fail_sessions {
                return Err(StorageError::Timeout);
            }

            self.calls.sessions_opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubSession {
                reads: self.reads,
                latency: self.latency,
                records: self.records.clone(),
                calls: self.calls.clone(),
            }) as Box<dyn Session>)
        })
    }

    fn bulk_upsert(&self, records: Vec<Record>) -> BoxFuture<'_, StorageResult<bool>> {
        Box::pin(async move {
            self.calls
                .batch_sizes
                .lock()
                .unwrap_or_else(|e| panic!("batch sizes poisoned: {e}"))
                .push(records.len());
            Ok(!self.reject_batches)
        })
    }
}

struct StubSession {
    reads: Reads,
    latency: Option<Duration>,
    records: Arc<HashMap<String, Record>>,
    calls: Arc<Calls>,
}

impl Session for StubSession {
    fn read<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<Option<Record>>> {
        Box::pin(async move {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            self.calls.reads.fetch_add(1, Ordering::SeqCst);

            match self.reads {
                Reads::Echo => Ok(self.records.get(key).cloned()),
                Reads::Absent => Ok(None),
                Reads::Fail => Err(StorageError::Backend("read refused".to_string())),
            }
        })
    }

    fn close(&mut self) {
        self.calls.sessions_closed.fetch_add(1, Ordering::SeqCst);
    }
}
