use std::time::Instant;

/// Monotonic time in milliseconds since some fixed origin.
///
/// `Send + Sync` because the input reader thread consults the same clock
/// for its stuck-gesture watchdog.
pub trait Clock: Send + Sync {
    fn uptime_millis(&self) -> u64;
}

/// Wall-clock backed [`Clock`] anchored at construction time.
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn uptime_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_clock_is_monotonic() {
        let clock = StdClock::new();
        let a = clock.uptime_millis();
        let b = clock.uptime_millis();
        assert!(b >= a);
    }
}
