//! Shared fixtures for testing the Trellis crates.
//!
//! Nothing here touches real hardware: the clock is hand-cranked, the
//! surface records draw calls instead of painting and the input source
//! plays back a script.

mod clock;
mod input;
mod surface;

pub use clock::TestClock;
pub use input::ScriptedInput;
pub use surface::{CanvasOp, RecordingCanvas, SurfaceProbe, TestSurface};
