use std::thread;
use std::time::{Duration, Instant};

/// Monotonic clock used to pace the polling loop.
///
/// - now(): returns a monotonic Instant
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - sleep_until(): sleeps until `deadline`, returning immediately if it passed
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Sleep until `deadline`. Returns how late the clock already was (zero
    /// when the deadline was still ahead).
    fn sleep_until(&self, deadline: Instant) -> Duration {
        let now = self.now();
        if deadline > now {
            self.sleep(deadline - now);
            Duration::ZERO
        } else {
            now - deadline
        }
    }

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Default, real-time monotonic clock backed by std::time::Instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Deterministic clock whose time only moves when told to.
    ///
    /// now() = origin + offset
    /// sleep(d) advances internal time by d without actually sleeping.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset: Arc<Mutex<Duration>>,
        slept: Arc<Mutex<Duration>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
                slept: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        /// Advance the clock by the given duration.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Total time spent inside `sleep`.
        pub fn total_slept(&self) -> Duration {
            self.slept.lock().map(|g| *g).unwrap_or(Duration::ZERO)
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
            self.origin + off
        }

        fn sleep(&self, d: Duration) {
            if let Ok(mut s) = self.slept.lock() {
                *s = s.saturating_add(d);
            }
            self.advance(d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_clock::TestClock;
    use super::*;

    #[test]
    fn sleep_until_future_deadline_advances_clock() {
        let clock = TestClock::new();
        let deadline = clock.now() + Duration::from_millis(100);
        let late = clock.sleep_until(deadline);
        assert_eq!(late, Duration::ZERO);
        assert_eq!(clock.now(), deadline);
        assert_eq!(clock.total_slept(), Duration::from_millis(100));
    }

    #[test]
    fn sleep_until_past_deadline_reports_lateness() {
        let clock = TestClock::new();
        let deadline = clock.now();
        clock.advance(Duration::from_millis(7));
        let late = clock.sleep_until(deadline);
        assert_eq!(late, Duration::from_millis(7));
        assert_eq!(clock.total_slept(), Duration::ZERO);
    }

    #[test]
    fn ms_since_counts_from_epoch() {
        let clock = TestClock::new();
        let epoch = clock.now();
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.ms_since(epoch), 250);
    }
}
