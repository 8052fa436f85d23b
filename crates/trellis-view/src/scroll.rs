//! Nested scrolling sessions between a scrolling child and an ancestor.
//!
//! The child opens a session with `start_nested_scroll`; the first
//! ancestor whose widget accepts becomes the cooperating parent. From
//! then on every delta is offered to the parent before the child
//! consumes it and reported again afterwards, until `stop_nested_scroll`
//! closes the session.

use crate::tree::{ViewId, ViewTree};
use crate::widget::ViewScope;

pub const SCROLL_AXIS_NONE: u32 = 0;
pub const SCROLL_AXIS_HORIZONTAL: u32 = 1 << 0;
pub const SCROLL_AXIS_VERTICAL: u32 = 1 << 1;

impl ViewTree {
    /// Offers a scrolling session over `axes` to the ancestors of
    /// `child`, nearest first. Returns whether any accepted.
    pub fn start_nested_scroll(&mut self, child: ViewId, axes: u32) -> bool {
        let mut current = self.parent(child);
        while let Some(ancestor) = current {
            let accepted = crate::widget::with_widget(self, ancestor, |widget, tree| {
                widget.on_start_nested_scroll(&mut ViewScope::new(tree, ancestor), child, axes)
            })
            .unwrap_or(false);
            if accepted {
                if let Some(node) = self.node_mut(child) {
                    node.nested.parent = Some(ancestor);
                    node.nested.axes = axes;
                }
                return true;
            }
            current = self.parent(ancestor);
        }
        false
    }

    pub fn has_nested_scroll_parent(&self, child: ViewId) -> bool {
        self.node(child)
            .map(|n| n.nested.parent.is_some())
            .unwrap_or(false)
    }

    /// The axes the child's current session covers, `SCROLL_AXIS_NONE`
    /// outside a session.
    pub fn nested_scroll_axes(&self, child: ViewId) -> u32 {
        self.node(child)
            .filter(|n| n.nested.parent.is_some())
            .map(|n| n.nested.axes)
            .unwrap_or(SCROLL_AXIS_NONE)
    }

    /// Lets the session parent take its share of a delta before the child
    /// consumes it. Returns what the parent took as `(dx, dy)`.
    pub fn dispatch_nested_pre_scroll(&mut self, child: ViewId, dx: i32, dy: i32) -> (i32, i32) {
        let Some(parent) = self.nested_parent(child) else {
            return (0, 0);
        };
        let mut consumed = [0i32; 2];
        crate::widget::with_widget(self, parent, |widget, tree| {
            widget.on_nested_pre_scroll(
                &mut ViewScope::new(tree, parent),
                child,
                dx,
                dy,
                &mut consumed,
            );
        });
        (consumed[0], consumed[1])
    }

    /// Reports a finished scroll step to the session parent: what the
    /// child consumed and what was left over.
    pub fn dispatch_nested_scroll(
        &mut self,
        child: ViewId,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
    ) {
        let Some(parent) = self.nested_parent(child) else {
            return;
        };
        crate::widget::with_widget(self, parent, |widget, tree| {
            widget.on_nested_scroll(
                &mut ViewScope::new(tree, parent),
                child,
                dx_consumed,
                dy_consumed,
                dx_unconsumed,
                dy_unconsumed,
            );
        });
    }

    /// Closes the child's session, notifying the parent.
    pub fn stop_nested_scroll(&mut self, child: ViewId) {
        let Some(parent) = self.nested_parent(child) else {
            return;
        };
        crate::widget::with_widget(self, parent, |widget, tree| {
            widget.on_stop_nested_scroll(&mut ViewScope::new(tree, parent), child);
        });
        if let Some(node) = self.node_mut(child) {
            node.nested.parent = None;
            node.nested.axes = SCROLL_AXIS_NONE;
        }
    }

    fn nested_parent(&self, child: ViewId) -> Option<ViewId> {
        self.node(child).and_then(|n| n.nested.parent)
    }
}
