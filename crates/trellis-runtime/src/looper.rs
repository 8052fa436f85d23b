use std::time::Duration;

use log::warn;

/// Ceiling for one idle wait inside [`Looper::poll_once`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A producer of work the looper drains on the UI thread.
///
/// `check` must be cheap and side-effect free enough to call every poll;
/// `handle` does the actual work and is only called after `check` returned
/// true in the same poll.
pub trait EventSource {
    fn check(&mut self) -> bool;
    fn handle(&mut self);
}

/// Polls a set of [`EventSource`]s from a single thread.
///
/// There is no wakeup machinery: when nothing is ready the looper sleeps
/// its bounded poll interval and tries again, so the worst-case latency
/// for cross-thread work is one interval.
pub struct Looper {
    sources: Vec<Box<dyn EventSource>>,
    poll_interval: Duration,
}

impl Default for Looper {
    fn default() -> Self {
        Self::new()
    }
}

impl Looper {
    pub fn new() -> Self {
        Self::with_poll_interval(DEFAULT_POLL_INTERVAL)
    }

    /// Tests pass `Duration::ZERO` to poll without sleeping.
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            sources: Vec::new(),
            poll_interval,
        }
    }

    pub fn add_source(&mut self, source: Box<dyn EventSource>) {
        self.sources.push(source);
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Checks every source once and handles the ready ones. Returns how
    /// many were handled; sleeps the poll interval when none were.
    pub fn poll_once(&mut self) -> usize {
        let mut handled = 0;
        for source in &mut self.sources {
            if source.check() {
                source.handle();
                handled += 1;
            }
        }
        if handled == 0 && !self.poll_interval.is_zero() {
            std::thread::sleep(self.poll_interval);
        }
        handled
    }

    /// Polls until `done` returns true, giving up after `max_polls`.
    pub fn run_until(&mut self, max_polls: usize, mut done: impl FnMut() -> bool) -> bool {
        for _ in 0..max_polls {
            if done() {
                return true;
            }
            self.poll_once();
        }
        if !done() {
            warn!("looper gave up after {max_polls} polls");
            return false;
        }
        true
    }
}
