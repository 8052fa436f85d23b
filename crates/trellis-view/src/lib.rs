//! The retained view tree at the heart of Trellis.
//!
//! Views live in an arena owned by [`ViewTree`] and are addressed by
//! [`ViewId`]; behavior hangs off each node as a boxed [`Widget`].
//! The tree owns the whole pipeline between input and pixels: the
//! two-phase measure/layout pass, damage tracking, the draw walk,
//! pointer dispatch with capture and interception, key dispatch with
//! long-press tracking, focus bookkeeping and navigation, and nested
//! scroll sessions. [`Window`] binds one tree to a surface and a clock
//! and turns all of that into frames.

mod draw;
mod focus;
mod invalidate;
mod key;
mod layout;
mod policy;
mod scroll;
mod touch;
mod tree;
mod widget;
mod window;

pub use focus::{FocusDirection, SoundEffect};
pub use policy::{
    frame, linear_column, linear_row, ContainerPolicy, ContainerWidget, FramePolicy, LinearPolicy,
    Orientation,
};
pub use scroll::{SCROLL_AXIS_HORIZONTAL, SCROLL_AXIS_NONE, SCROLL_AXIS_VERTICAL};
pub use tree::{
    DescendantFocusability, ListenerToken, ViewError, ViewId, ViewTree, Visibility,
};
pub use widget::{EmptyWidget, ViewScope, Widget};
pub use window::{Window, WindowConfig, WindowEventSource};
