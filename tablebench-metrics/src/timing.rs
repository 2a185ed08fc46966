use std::time::Duration;

use crate::merge::Merge;
use crate::metric::MetricSet;

const NANOS_PER_MS: f64 = 1_000_000.0;

/// Count, total, min and max over a stream of durations.
///
/// The empty stat is `{0, 0, +inf, 0}`; `min` is stored as `u64::MAX` nanoseconds until
/// the first sample arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingStat {
    count: u64,
    total_ns: u64,
    min_ns: u64,
    max_ns: u64,
}

impl Default for TimingStat {
    fn default() -> Self {
        Self {
            count: 0,
            total_ns: 0,
            min_ns: u64::MAX,
            max_ns: 0,
        }
    }
}

impl TimingStat {
    pub fn record(&mut self, duration: Duration) {
        let ns: u64 = duration.as_nanos().try_into().unwrap_or(u64::MAX);
        self.count = self.count.saturating_add(1);
        self.total_ns = self.total_ns.saturating_add(ns);
        self.min_ns = self.min_ns.min(ns);
        self.max_ns = self.max_ns.max(ns);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.total_ns)
    }

    pub fn min(&self) -> Option<Duration> {
        (self.count > 0).then(|| Duration::from_nanos(self.min_ns))
    }

    pub fn max(&self) -> Option<Duration> {
        (self.count > 0).then(|| Duration::from_nanos(self.max_ns))
    }

    /// Emits `TOTAL_COUNT`, `TOTAL_MS`, `AVG_MS`, `MIN_MS` and `MAX_MS` under `prefix`.
    ///
    /// With no samples, `AVG_MS` and `MIN_MS` are `NaN`.
    pub fn to_named_metrics(&self, prefix: &str) -> MetricSet {
        let total_ms = self.total_ns as f64 / NANOS_PER_MS;
        let (avg_ms, min_ms) = if self.count == 0 {
            (f64::NAN, f64::NAN)
        } else {
            (
                total_ms / self.count as f64,
                self.min_ns as f64 / NANOS_PER_MS,
            )
        };

        let mut out = MetricSet::new();
        out.push(format!("{prefix}TOTAL_COUNT"), self.count as f64);
        out.push(format!("{prefix}TOTAL_MS"), total_ms);
        out.push(format!("{prefix}AVG_MS"), avg_ms);
        out.push(format!("{prefix}MIN_MS"), min_ms);
        out.push(format!("{prefix}MAX_MS"), self.max_ns as f64 / NANOS_PER_MS);
        out
    }
}

impl Merge for TimingStat {
    fn merge(&mut self, other: &Self) {
        self.count = self.count.saturating_add(other.count);
        self.total_ns = self.total_ns.saturating_add(other.total_ns);
        self.min_ns = self.min_ns.min(other.min_ns);
        self.max_ns = self.max_ns.max(other.max_ns);
    }
}

/// Outcome of a single timed backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum Outcome {
    #[strum(serialize = "OK")]
    Ok,
    #[strum(serialize = "ERROR")]
    Error,
}

impl From<bool> for Outcome {
    fn from(ok: bool) -> Self {
        if ok { Self::Ok } else { Self::Error }
    }
}

/// Pair of [`TimingStat`]s split by [`Outcome`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestStat {
    ok: TimingStat,
    error: TimingStat,
}

impl RequestStat {
    pub fn record(&mut self, outcome: impl Into<Outcome>, duration: Duration) {
        match outcome.into() {
            Outcome::Ok => self.ok.record(duration),
            Outcome::Error => self.error.record(duration),
        }
    }

    pub fn get(&self, outcome: Outcome) -> &TimingStat {
        match outcome {
            Outcome::Ok => &self.ok,
            Outcome::Error => &self.error,
        }
    }

    /// Both outcomes folded together.
    pub fn combined(&self) -> TimingStat {
        TimingStat::merged([&self.ok, &self.error])
    }

    /// Emits the timing metrics of each outcome as `{name}_OK_*` and `{name}_ERROR_*`.
    pub fn to_named_metrics(&self, name: &str) -> MetricSet {
        let mut out = MetricSet::new();
        for outcome in [Outcome::Ok, Outcome::Error] {
            out.append(
                self.get(outcome)
                    .to_named_metrics(&format!("{name}_{outcome}_")),
            );
        }
        out
    }
}

impl Merge for RequestStat {
    fn merge(&mut self, other: &Self) {
        self.ok.merge(&other.ok);
        self.error.merge(&other.error);
    }
}
