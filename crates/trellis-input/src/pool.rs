use crate::events::{KeyEvent, MotionEvent};

/// Events above this many sitting in a pool get dropped instead of
/// recycled.
pub const DEFAULT_POOL_CAPACITY: usize = 20;

/// An event type that can be wiped and reissued.
pub trait Reusable: Default {
    /// Resets per-dispatch state and stamps the new sequence number.
    fn prepare_for_reuse(&mut self, seq: u32);
}

impl Reusable for KeyEvent {
    fn prepare_for_reuse(&mut self, seq: u32) {
        *self = KeyEvent::default();
        self.set_seq(seq);
    }
}

impl Reusable for MotionEvent {
    fn prepare_for_reuse(&mut self, seq: u32) {
        *self = MotionEvent::default();
        self.set_seq(seq);
    }
}

/// A bounded free list of boxed events.
///
/// `obtain` hands out a recycled instance when one is available and
/// allocates otherwise; either way the event is freshly prepared and
/// carries a sequence number strictly greater than any issued before it.
/// `recycle` keeps at most the capacity and drops the rest, so a burst of
/// events never grows the pool permanently.
pub struct EventPool<T: Reusable> {
    free: Vec<Box<T>>,
    capacity: usize,
    next_seq: u32,
}

impl<T: Reusable> Default for EventPool<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }
}

impl<T: Reusable> EventPool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Vec::new(),
            capacity,
            next_seq: 0,
        }
    }

    pub fn obtain(&mut self) -> Box<T> {
        self.next_seq = self.next_seq.wrapping_add(1);
        let mut event = self.free.pop().unwrap_or_default();
        event.prepare_for_reuse(self.next_seq);
        event
    }

    pub fn recycle(&mut self, event: Box<T>) {
        if self.free.len() < self.capacity {
            self.free.push(event);
        }
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
