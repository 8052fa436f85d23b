//! Plain-text recording and playback of input streams.
//!
//! One event per line: `K device action keycode repeat time` for keys,
//! `M device action x y time` for motion. The format is a debugging aid
//! for capturing a session in the field and replaying it against a test
//! build; it is not a stability surface.

use std::time::Duration;

use crate::events::{InputEvent, KeyAction};
use crate::reader::{RawInputSource, RawRecord};

/// Renders a dispatched event as one trace line.
pub fn record(event: &InputEvent) -> String {
    match event {
        InputEvent::Key(key) => format!(
            "K {} {} {} {} {}",
            key.device_id(),
            key.action() as u32,
            key.keycode(),
            key.repeat_count(),
            key.event_time()
        ),
        InputEvent::Motion(motion) => format!(
            "M {} {} {} {} {}",
            motion.device_id(),
            motion.raw_action(),
            motion.x(),
            motion.y(),
            motion.event_time()
        ),
    }
}

/// Parses one trace line back into a raw record. Unknown prefixes,
/// malformed numbers and short lines yield `None`; extra trailing fields
/// are ignored so the format can grow.
pub fn parse_line(line: &str) -> Option<RawRecord> {
    let mut fields = line.split_whitespace();
    match fields.next()? {
        "K" => {
            let device_id = fields.next()?.parse().ok()?;
            let action = KeyAction::from_raw(fields.next()?.parse().ok()?)?;
            let keycode = fields.next()?.parse().ok()?;
            let repeat = fields.next()?.parse().ok()?;
            let time = fields.next()?.parse().ok()?;
            Some(RawRecord::Key {
                device_id,
                action,
                keycode,
                repeat,
                meta_state: 0,
                time,
            })
        }
        "M" => {
            let device_id = fields.next()?.parse().ok()?;
            let action = fields.next()?.parse().ok()?;
            let x = fields.next()?.parse().ok()?;
            let y = fields.next()?.parse().ok()?;
            let time = fields.next()?.parse().ok()?;
            Some(RawRecord::Pointer {
                device_id,
                action,
                x,
                y,
                time,
            })
        }
        _ => None,
    }
}

/// Parses a whole trace, skipping comment (`#`) and malformed lines.
pub fn parse_trace(text: &str) -> Vec<RawRecord> {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(parse_line)
        .collect()
}

/// A [`RawInputSource`] that replays a parsed trace once, then goes
/// silent.
pub struct TracePlayback {
    records: Vec<RawRecord>,
    cursor: usize,
}

impl TracePlayback {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records, cursor: 0 }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(parse_trace(text))
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.records.len()
    }
}

impl RawInputSource for TracePlayback {
    fn poll(&mut self, out: &mut Vec<RawRecord>, _timeout: Duration) {
        if self.cursor < self.records.len() {
            out.extend_from_slice(&self.records[self.cursor..]);
            self.cursor = self.records.len();
        }
    }
}
