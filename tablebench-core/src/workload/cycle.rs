use std::time::Instant;

use rand::Rng;
use tablebench_metrics::{Outcome, ReadStat};

use crate::config::RunConfig;
use crate::record::Record;
use crate::storage::{ScopedSession, Storage};

/// Where random point reads land: uniformly over `[0, record_count)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReadTarget {
    record_count: u64,
    record_size: usize,
}

impl ReadTarget {
    pub(crate) fn new(config: &RunConfig) -> Self {
        Self {
            record_count: config.record_count,
            record_size: config.record_size,
        }
    }

    /// Regenerates the record expected at a random index.
    pub(crate) fn random_record<R: Rng + ?Sized>(&self, rng: &mut R) -> Record {
        Record::generate(rng.random_range(0..self.record_count), self.record_size)
    }
}

/// Acquires a session and times the attempt into `stat`.
///
/// Failures are recorded and logged; the caller just moves on to its next cycle.
pub(crate) async fn acquire_session(
    storage: &dyn Storage,
    stat: &mut ReadStat,
) -> Option<ScopedSession> {
    let started = Instant::now();
    match storage.create_session().await {
        Ok(session) => {
            stat.record_get_session(Outcome::Ok, started.elapsed());
            Some(ScopedSession::new(session))
        }
        Err(err) => {
            stat.record_get_session(Outcome::Error, started.elapsed());
            tracing::warn!(error = %err, "can't create session");
            None
        }
    }
}

/// Reads `expected.key`, times the call into `stat` and checks the returned record.
/// Returns whether the read call itself succeeded.
///
/// An absent record counts as a successful read that fails verification. Mismatches
/// are logged as errors and counted, but never turn the read into a failure.
pub(crate) async fn read_and_verify(
    session: &ScopedSession,
    expected: &Record,
    stat: &mut ReadStat,
) -> bool {
    let started = Instant::now();
    match session.read(&expected.key).await {
        Ok(found) => {
            stat.record_read_data(Outcome::Ok, started.elapsed());

            if found.as_ref() != Some(expected) {
                stat.record_mismatch();
                tracing::error!(
                    key = %expected.key,
                    absent = found.is_none(),
                    "read wrong record"
                );
            }
            true
        }
        Err(err) => {
            stat.record_read_data(Outcome::Error, started.elapsed());
            tracing::warn!(key = %expected.key, error = %err, "can't read record");
            false
        }
    }
}
