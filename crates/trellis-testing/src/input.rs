use std::time::Duration;

use trellis_input::{RawInputSource, RawRecord};

/// Raw input source that plays back a script, one batch per poll.
pub struct ScriptedInput {
    batches: Vec<Vec<RawRecord>>,
    next: usize,
}

impl ScriptedInput {
    /// Delivers every record in the first poll.
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self::batches(vec![records])
    }

    /// Delivers one batch per poll, then goes quiet.
    pub fn batches(batches: Vec<Vec<RawRecord>>) -> Self {
        Self { batches, next: 0 }
    }
}

impl RawInputSource for ScriptedInput {
    fn poll(&mut self, out: &mut Vec<RawRecord>, timeout: Duration) {
        if self.next < self.batches.len() {
            out.append(&mut self.batches[self.next]);
            self.next += 1;
        } else {
            // An exhausted script behaves like an idle device.
            std::thread::sleep(timeout);
        }
    }
}
