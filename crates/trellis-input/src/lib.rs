//! Input events and the machinery that carries them to the UI thread.
//!
//! Key and motion events are plain value objects recycled through small
//! free-list pools. A dedicated reader thread polls a [`RawInputSource`]
//! and pushes decoded events into per-device queues behind one mutex;
//! the UI thread drains those queues through its looper. This crate is
//! deliberately ignorant of views; routing into a tree lives upstream.

mod dispatcher;
mod events;
mod pool;
mod reader;
pub mod trace;

pub use dispatcher::{DispatcherState, KeyEventReceiver};
pub use events::{
    keycodes, InputEvent, KeyAction, KeyEvent, MotionAction, MotionEvent, Pointer, ACTION_MASK,
    ACTION_POINTER_INDEX_MASK, ACTION_POINTER_INDEX_SHIFT, FLAG_CANCELED,
    FLAG_CANCELED_LONG_PRESS, FLAG_LONG_PRESS, FLAG_START_TRACKING, FLAG_TRACKING, META_ALT_ON,
    META_CTRL_ON, META_NONE, META_SHIFT_ON,
};
pub use pool::{EventPool, Reusable, DEFAULT_POOL_CAPACITY};
pub use reader::{DeviceQueues, InputConfig, InputReader, RawInputSource, RawRecord};
