//! The measure and layout half of the frame pipeline.
//!
//! Measurement is memoized per view: a view whose cached specs match the
//! incoming ones and that has no pending layout request is skipped
//! entirely, so an idle subtree costs two comparisons per pass.

use trellis_geometry::Rect;
use trellis_layout::{
    child_measure_spec, resolve_size_and_state, MeasureSpec, MEASURED_SIZE_MASK,
    MEASURED_STATE_MASK,
};

use crate::tree::{NodeFlags, ViewId, ViewTree};
use crate::widget::ViewScope;

impl ViewTree {
    /// Runs the view's measure hook under the given constraints, unless
    /// the cached result from the previous pass is still valid.
    ///
    /// Panics when the hook returns without reporting a size; that is a
    /// widget bug and measuring cannot continue on garbage.
    pub fn measure(&mut self, id: ViewId, width_spec: MeasureSpec, height_spec: MeasureSpec) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let force = node.flags.contains(NodeFlags::FORCE_LAYOUT);
        let specs_match =
            node.old_width_spec == Some(width_spec) && node.old_height_spec == Some(height_spec);
        if !force && specs_match {
            return;
        }
        node.flags.remove(NodeFlags::MEASURED_DIMENSION_SET);
        node.old_width_spec = Some(width_spec);
        node.old_height_spec = Some(height_spec);

        crate::widget::with_widget(self, id, |widget, tree| {
            widget.on_measure(&mut ViewScope::new(tree, id), width_spec, height_spec);
        });

        let Some(node) = self.node_mut(id) else {
            return;
        };
        if !node.flags.contains(NodeFlags::MEASURED_DIMENSION_SET) {
            panic!("on_measure() of view {id} did not call set_measured_dimension()");
        }
        node.flags.insert(NodeFlags::LAYOUT_REQUIRED);
    }

    pub(crate) fn record_measured_dimension(
        &mut self,
        id: ViewId,
        measured_width: i32,
        measured_height: i32,
    ) {
        if let Some(node) = self.node_mut(id) {
            node.measured_width = measured_width;
            node.measured_height = measured_height;
            node.flags.insert(NodeFlags::MEASURED_DIMENSION_SET);
        }
    }

    /// Measured width with the state bits stripped.
    pub fn measured_width(&self, id: ViewId) -> i32 {
        self.node(id)
            .map(|n| n.measured_width & MEASURED_SIZE_MASK)
            .unwrap_or(0)
    }

    pub fn measured_height(&self, id: ViewId) -> i32 {
        self.node(id)
            .map(|n| n.measured_height & MEASURED_SIZE_MASK)
            .unwrap_or(0)
    }

    /// State bits of both axes folded into one word.
    pub fn measured_state(&self, id: ViewId) -> i32 {
        self.node(id)
            .map(|n| (n.measured_width | n.measured_height) & MEASURED_STATE_MASK)
            .unwrap_or(0)
    }

    /// Positions the view at the given edges in its parent's coordinate
    /// space and lets it place its children.
    ///
    /// The layout hook runs only when the bounds changed or a layout was
    /// explicitly requested; registered layout-change listeners observe
    /// every call. Repaints are scheduled only for actual movement, which
    /// [`ViewTree::set_frame`] takes care of.
    pub fn layout(&mut self, id: ViewId, left: i32, top: i32, right: i32, bottom: i32) {
        let Some(node) = self.node(id) else {
            return;
        };
        let old = node.frame;
        let new = Rect::from_edges(left, top, right, bottom);
        let changed = self.set_frame(id, new);

        let needs_layout = changed
            || self
                .node(id)
                .map(|n| n.flags.contains(NodeFlags::LAYOUT_REQUIRED))
                .unwrap_or(false);
        if needs_layout {
            crate::widget::with_widget(self, id, |widget, tree| {
                widget.on_layout(&mut ViewScope::new(tree, id), changed, new.width, new.height);
            });
            if let Some(node) = self.node_mut(id) {
                node.flags.remove(NodeFlags::LAYOUT_REQUIRED);
            }
        }

        self.fire_layout_change_listeners(id, old, new);
        if let Some(node) = self.node_mut(id) {
            node.flags.remove(NodeFlags::FORCE_LAYOUT);
        }
    }

    /// Stores new bounds, scheduling repaints of both the vacated and the
    /// newly covered area. Returns whether the bounds actually changed.
    fn set_frame(&mut self, id: ViewId, new: Rect) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if node.frame == new {
            return false;
        }
        self.invalidate(id);
        if let Some(node) = self.node_mut(id) {
            node.frame = new;
        }
        self.invalidate(id);
        true
    }

    /// Marks the path from this view to the root as needing layout and
    /// records the original requester for the next pass.
    ///
    /// The upward walk stops at the first ancestor already marked; its own
    /// earlier walk reached the root, so the rest of the path is marked
    /// already. Requesters are deduplicated in arrival order.
    pub fn request_layout(&mut self, id: ViewId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.flags.insert(NodeFlags::FORCE_LAYOUT);
        let mut current = node.parent;
        self.layout_requesters.insert(id);
        while let Some(ancestor) = current {
            let Some(node) = self.node_mut(ancestor) else {
                break;
            };
            if node.flags.contains(NodeFlags::FORCE_LAYOUT) {
                break;
            }
            node.flags.insert(NodeFlags::FORCE_LAYOUT);
            current = node.parent;
        }
    }

    pub fn is_layout_requested(&self, id: ViewId) -> bool {
        self.node(id)
            .map(|n| n.flags.contains(NodeFlags::FORCE_LAYOUT))
            .unwrap_or(false)
    }

    pub fn has_pending_layout(&self) -> bool {
        !self.layout_requesters.is_empty()
    }

    /// Views whose `request_layout` calls triggered the coming pass, in
    /// arrival order. Draining resets the set for the next frame.
    pub fn take_layout_requesters(&mut self) -> Vec<ViewId> {
        self.layout_requesters.drain(..).collect()
    }

    /// Measures `child` against the parent's specs minus the parent's
    /// padding, honoring the child's layout parameters.
    pub fn measure_child(
        &mut self,
        parent: ViewId,
        child: ViewId,
        parent_width_spec: MeasureSpec,
        parent_height_spec: MeasureSpec,
    ) {
        let (pl, pt, pr, pb) = self.padding(parent);
        let lp = self.layout_params(child);
        let child_width = child_measure_spec(parent_width_spec, pl + pr, lp.width);
        let child_height = child_measure_spec(parent_height_spec, pt + pb, lp.height);
        self.measure(child, child_width, child_height);
    }

    /// Like [`ViewTree::measure_child`] but also subtracts the child's own
    /// margins and any space the parent has already handed out.
    pub fn measure_child_with_margins(
        &mut self,
        parent: ViewId,
        child: ViewId,
        parent_width_spec: MeasureSpec,
        width_used: i32,
        parent_height_spec: MeasureSpec,
        height_used: i32,
    ) {
        let (pl, pt, pr, pb) = self.padding(parent);
        let lp = self.layout_params(child);
        let child_width = child_measure_spec(
            parent_width_spec,
            pl + pr + lp.margins.horizontal() + width_used,
            lp.width,
        );
        let child_height = child_measure_spec(
            parent_height_spec,
            pt + pb + lp.margins.vertical() + height_used,
            lp.height,
        );
        self.measure(child, child_width, child_height);
    }

    /// Smallest width the view should get: its explicit minimum or its
    /// background's natural width, whichever is larger.
    pub fn suggested_minimum_width(&self, id: ViewId) -> i32 {
        let Some(node) = self.node(id) else {
            return 0;
        };
        let background = node
            .background
            .as_ref()
            .map(|b| b.intrinsic_width().max(0))
            .unwrap_or(0);
        node.min_width.max(background)
    }

    pub fn suggested_minimum_height(&self, id: ViewId) -> i32 {
        let Some(node) = self.node(id) else {
            return 0;
        };
        let background = node
            .background
            .as_ref()
            .map(|b| b.intrinsic_height().max(0))
            .unwrap_or(0);
        node.min_height.max(background)
    }
}

/// Measure behavior of a view whose widget does not override the hook:
/// the suggested minimum, stretched or capped by the incoming spec.
pub(crate) fn default_on_measure(
    view: &mut ViewScope<'_>,
    width_spec: MeasureSpec,
    height_spec: MeasureSpec,
) {
    let min_width = view.suggested_minimum_width();
    let min_height = view.suggested_minimum_height();
    view.set_measured_dimension(
        resolve_size_and_state(min_width, width_spec, 0),
        resolve_size_and_state(min_height, height_spec, 0),
    );
}
