use std::time::Duration;

use crate::counter::Counter;
use crate::merge::Merge;
use crate::metric::MetricSet;
use crate::timing::{Outcome, RequestStat};

pub const REQUESTS_PREFIX: &str = "REQUESTS_";
pub const GET_SESSION: &str = "GET_SESSION";
pub const READ_DATA: &str = "READ_DATA";

/// Aggregate of a point-read pipeline: completed requests plus the timings of the
/// session-acquisition and read phases.
///
/// Integrity mismatches are tracked for diagnostics only and are never part of the
/// named metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStat {
    requests: Counter,
    get_session: RequestStat,
    read_data: RequestStat,
    mismatches: u64,
}

impl ReadStat {
    pub fn request_completed(&mut self) {
        self.requests.inc();
    }

    pub fn record_get_session(&mut self, outcome: impl Into<Outcome>, duration: Duration) {
        self.get_session.record(outcome, duration);
    }

    pub fn record_read_data(&mut self, outcome: impl Into<Outcome>, duration: Duration) {
        self.read_data.record(outcome, duration);
    }

    pub fn record_mismatch(&mut self) {
        self.mismatches = self.mismatches.saturating_add(1);
    }

    pub fn requests(&self) -> u64 {
        self.requests.count()
    }

    pub fn mismatches(&self) -> u64 {
        self.mismatches
    }

    pub fn get_session(&self) -> &RequestStat {
        &self.get_session
    }

    pub fn read_data(&self) -> &RequestStat {
        &self.read_data
    }

    /// `REQUESTS_*` (with the per-second rate over `elapsed_ms`), then `GET_SESSION_*`
    /// and `READ_DATA_*`.
    pub fn to_named_metrics(&self, elapsed_ms: u64) -> MetricSet {
        let mut out = self.requests.to_named_metrics(REQUESTS_PREFIX, elapsed_ms);
        out.append(self.get_session.to_named_metrics(GET_SESSION));
        out.append(self.read_data.to_named_metrics(READ_DATA));
        out
    }
}

impl Merge for ReadStat {
    fn merge(&mut self, other: &Self) {
        self.requests.merge(&other.requests);
        self.get_session.merge(&other.get_session);
        self.read_data.merge(&other.read_data);
        self.mismatches = self.mismatches.saturating_add(other.mismatches);
    }
}
