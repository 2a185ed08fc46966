use crate::merge::Merge;
use crate::metric::MetricSet;

/// Monotonic event count owned by one worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counter {
    count: u64,
}

impl Counter {
    #[inline]
    pub fn inc(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    #[inline]
    pub fn add(&mut self, n: u64) {
        self.count = self.count.saturating_add(n);
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Emits `{prefix}TOTAL_COUNT`, `{prefix}TOTAL_MS` and `{prefix}COUNT_PER_SECOND`.
    ///
    /// `elapsed_ms` is the wall-clock span the count was collected over; zero is clamped
    /// to one millisecond.
    pub fn to_named_metrics(&self, prefix: &str, elapsed_ms: u64) -> MetricSet {
        let ms = elapsed_ms.max(1);
        let mut out = MetricSet::new();
        out.push(format!("{prefix}TOTAL_COUNT"), self.count as f64);
        out.push(format!("{prefix}TOTAL_MS"), ms as f64);
        out.push(
            format!("{prefix}COUNT_PER_SECOND"),
            self.count as f64 / ms as f64 * 1000.0,
        );
        out
    }
}

impl Merge for Counter {
    fn merge(&mut self, other: &Self) {
        self.add(other.count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_counts() {
        let mut a = Counter::default();
        a.inc();
        a.inc();
        let mut b = Counter::default();
        b.inc();

        a.merge(&b);
        assert_eq!(a.count(), 3);
    }

    #[test]
    fn rate_is_per_second_of_elapsed() {
        let mut c = Counter::default();
        c.add(50);

        let m = c.to_named_metrics("REQUESTS_", 2_000);
        assert_eq!(m.get("REQUESTS_TOTAL_COUNT"), Some(50.0));
        assert_eq!(m.get("REQUESTS_TOTAL_MS"), Some(2_000.0));
        assert_eq!(m.get("REQUESTS_COUNT_PER_SECOND"), Some(25.0));
    }

    #[test]
    fn zero_elapsed_is_clamped() {
        let mut c = Counter::default();
        c.inc();

        let m = c.to_named_metrics("R_", 0);
        assert_eq!(m.get("R_TOTAL_MS"), Some(1.0));
        assert_eq!(m.get("R_COUNT_PER_SECOND"), Some(1000.0));
    }
}
