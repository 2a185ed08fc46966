use std::time::{Duration, Instant};

/// Wall-clock span of a whole run, used for rate metrics.
#[derive(Debug, Clone, Copy)]
pub struct RunTimer {
    started: Instant,
    finished: Option<Instant>,
}

impl Default for RunTimer {
    fn default() -> Self {
        Self::start()
    }
}

impl RunTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            finished: None,
        }
    }

    pub fn restart(&mut self) {
        *self = Self::start();
    }

    pub fn finish(&mut self) {
        self.finished = Some(Instant::now());
    }

    /// Elapsed time up to `finish`, or up to now while still running.
    pub fn elapsed(&self) -> Duration {
        let end = self.finished.unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.started)
    }

    /// Elapsed whole milliseconds, never less than one.
    pub fn elapsed_ms(&self) -> u64 {
        let ms: u64 = self.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
        ms.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_finish_reports_at_least_one_ms() {
        let mut t = RunTimer::start();
        t.finish();
        assert!(t.elapsed_ms() >= 1);
    }

    #[test]
    fn finished_timer_is_frozen() {
        let mut t = RunTimer::start();
        std::thread::sleep(Duration::from_millis(5));
        t.finish();
        let first = t.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(t.elapsed(), first);
        assert!(t.elapsed_ms() >= 5);
    }
}
