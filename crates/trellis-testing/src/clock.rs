use std::sync::atomic::{AtomicU64, Ordering};

use trellis_runtime::Clock;

/// A clock that only moves when the test tells it to.
///
/// Share it as `Arc<TestClock>` between the test and the code under
/// test, then step time with [`TestClock::advance`].
#[derive(Debug, Default)]
pub struct TestClock {
    now: AtomicU64,
}

impl TestClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            now: AtomicU64::new(start_millis),
        }
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn uptime_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
