/// Opaque handle identifying one posted callback; the only way to remove
/// a pending callback again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackToken(u64);

struct Entry<T> {
    token: CallbackToken,
    deadline: u64,
    run: Box<dyn FnOnce(&mut T)>,
}

/// A deadline-ordered queue of one-shot callbacks against a context `T`.
///
/// The handler never runs anything itself; the owner calls
/// [`Handler::take_due`] with the current time and invokes the returned
/// closures. Taking first and running second keeps the owner free to hand
/// itself to the callbacks mutably.
pub struct Handler<T> {
    entries: Vec<Entry<T>>,
    next_token: u64,
}

impl<T> Default for Handler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Handler<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_token: 0,
        }
    }

    /// Posts a callback due immediately.
    pub fn post(&mut self, now: u64, run: impl FnOnce(&mut T) + 'static) -> CallbackToken {
        self.post_delayed(now, 0, run)
    }

    /// Posts a callback due `delay_millis` from `now`. Callbacks with equal
    /// deadlines run in posting order.
    pub fn post_delayed(
        &mut self,
        now: u64,
        delay_millis: u64,
        run: impl FnOnce(&mut T) + 'static,
    ) -> CallbackToken {
        let token = CallbackToken(self.next_token);
        self.next_token += 1;
        let deadline = now + delay_millis;
        let at = self
            .entries
            .iter()
            .position(|e| e.deadline > deadline)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            at,
            Entry {
                token,
                deadline,
                run: Box::new(run),
            },
        );
        token
    }

    /// Removes a pending callback. False when it already ran or was
    /// removed before.
    pub fn remove(&mut self, token: CallbackToken) -> bool {
        match self.entries.iter().position(|e| e.token == token) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn has_due(&self, now: u64) -> bool {
        self.entries.first().is_some_and(|e| e.deadline <= now)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.first().map(|e| e.deadline)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Detaches every callback due at `now`, in deadline order.
    pub fn take_due(&mut self, now: u64) -> Vec<Box<dyn FnOnce(&mut T)>> {
        let due = self
            .entries
            .iter()
            .take_while(|e| e.deadline <= now)
            .count();
        self.entries.drain(..due).map(|e| e.run).collect()
    }
}
