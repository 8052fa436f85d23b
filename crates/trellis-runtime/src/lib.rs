//! The single-threaded heartbeat of the toolkit: a monotonic [`Clock`],
//! a deadline-ordered callback [`Handler`], and a [`Looper`] that polls
//! [`EventSource`]s with a bounded timeout.
//!
//! Everything here runs on the UI thread. The only other thread in a
//! Trellis process is the input reader, which never touches these types.

mod clock;
mod handler;
mod looper;

pub use clock::{Clock, StdClock};
pub use handler::{CallbackToken, Handler};
pub use looper::{EventSource, Looper, DEFAULT_POLL_INTERVAL};
