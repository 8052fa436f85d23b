use trellis_geometry::Rect;
use trellis_input::{KeyEvent, MotionEvent};
use trellis_layout::{LayoutParams, MeasureSpec};
use trellis_render::Canvas;

use crate::tree::{ViewId, ViewTree, Visibility};

/// Per-view behavior, plugged into a tree node instead of subclassed
/// onto it.
///
/// Every hook receives a [`ViewScope`] giving it mutable access to the
/// tree it lives in; the widget itself is lifted out of its slot for the
/// duration of the call, so hooks may freely add children, request
/// layout or invalidate without aliasing themselves.
#[allow(unused_variables)]
pub trait Widget: 'static {
    /// Must report a size through [`ViewScope::set_measured_dimension`]
    /// before returning; the measure pass treats anything else as a
    /// programming error and panics.
    fn on_measure(&mut self, view: &mut ViewScope<'_>, width_spec: MeasureSpec, height_spec: MeasureSpec) {
        crate::layout::default_on_measure(view, width_spec, height_spec);
    }

    /// Containers position their children here with
    /// [`ViewScope::layout_child`]. `width`/`height` are the view's new
    /// size; `changed` says whether the bounds moved this pass.
    fn on_layout(&mut self, view: &mut ViewScope<'_>, changed: bool, width: i32, height: i32) {}

    /// Paints content above the background and below the children. The
    /// canvas origin is the view's top-left corner.
    fn on_draw(&mut self, view: &mut ViewScope<'_>, canvas: &mut dyn Canvas) {}

    /// Raw pointer events in local coordinates. Return true to consume.
    fn on_touch_event(&mut self, view: &mut ViewScope<'_>, event: &MotionEvent) -> bool {
        false
    }

    /// Gives a container the chance to steal the gesture from its
    /// children; see the touch dispatch rules.
    fn on_intercept_touch_event(&mut self, view: &mut ViewScope<'_>, event: &MotionEvent) -> bool {
        false
    }

    fn on_key_down(&mut self, view: &mut ViewScope<'_>, keycode: i32, event: &mut KeyEvent) -> bool {
        false
    }

    fn on_key_up(&mut self, view: &mut ViewScope<'_>, keycode: i32, event: &KeyEvent) -> bool {
        false
    }

    fn on_key_long_press(&mut self, view: &mut ViewScope<'_>, keycode: i32, event: &KeyEvent) -> bool {
        false
    }

    fn on_attached(&mut self, view: &mut ViewScope<'_>) {}

    fn on_detached(&mut self, view: &mut ViewScope<'_>) {}

    fn on_focus_changed(&mut self, view: &mut ViewScope<'_>, gained: bool) {}

    /// A descendant started a nested scroll; return true to become its
    /// nested-scroll parent for the gesture.
    fn on_start_nested_scroll(&mut self, view: &mut ViewScope<'_>, child: ViewId, axes: u32) -> bool {
        false
    }

    /// Offered the delta before the scrolling child consumes it; write
    /// what this view takes into `consumed` as `[dx, dy]`.
    fn on_nested_pre_scroll(
        &mut self,
        view: &mut ViewScope<'_>,
        target: ViewId,
        dx: i32,
        dy: i32,
        consumed: &mut [i32; 2],
    ) {
    }

    /// Receives what the child consumed and what is left over, after the
    /// child scrolled.
    fn on_nested_scroll(
        &mut self,
        view: &mut ViewScope<'_>,
        target: ViewId,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
    ) {
    }

    fn on_stop_nested_scroll(&mut self, view: &mut ViewScope<'_>, target: ViewId) {}
}

/// A leaf with no behavior of its own; backgrounds and listeners still
/// work.
pub struct EmptyWidget;

impl Widget for EmptyWidget {}

/// Lifts the widget out of its node, runs `f` with it and the tree, and
/// puts it back. Returns `None` when the view is gone or its widget is
/// already lifted further up the stack.
pub(crate) fn with_widget<R>(
    tree: &mut ViewTree,
    id: ViewId,
    f: impl FnOnce(&mut Box<dyn Widget>, &mut ViewTree) -> R,
) -> Option<R> {
    let mut widget = tree.node_mut(id)?.widget.take()?;
    let result = f(&mut widget, tree);
    if let Some(node) = tree.node_mut(id) {
        node.widget = Some(widget);
    }
    Some(result)
}

/// The window a widget hook gets onto its own tree: the tree plus the id
/// of the view the hook runs for.
pub struct ViewScope<'a> {
    tree: &'a mut ViewTree,
    id: ViewId,
}

impl<'a> ViewScope<'a> {
    pub(crate) fn new(tree: &'a mut ViewTree, id: ViewId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn tree(&mut self) -> &mut ViewTree {
        self.tree
    }

    pub fn width(&self) -> i32 {
        self.tree.width(self.id)
    }

    pub fn height(&self) -> i32 {
        self.tree.height(self.id)
    }

    pub fn padding(&self) -> (i32, i32, i32, i32) {
        self.tree.padding(self.id)
    }

    pub fn child_ids(&self) -> Vec<ViewId> {
        self.tree.children(self.id).to_vec()
    }

    pub fn child_visibility(&self, child: ViewId) -> Visibility {
        self.tree.visibility(child)
    }

    pub fn child_layout_params(&self, child: ViewId) -> LayoutParams {
        self.tree.layout_params(child)
    }

    pub fn set_measured_dimension(&mut self, measured_width: i32, measured_height: i32) {
        self.tree
            .record_measured_dimension(self.id, measured_width, measured_height);
    }

    pub fn measured_width(&self) -> i32 {
        self.tree.measured_width(self.id)
    }

    pub fn measured_height(&self) -> i32 {
        self.tree.measured_height(self.id)
    }

    pub fn child_measured_width(&self, child: ViewId) -> i32 {
        self.tree.measured_width(child)
    }

    pub fn child_measured_height(&self, child: ViewId) -> i32 {
        self.tree.measured_height(child)
    }

    pub fn child_measured_state(&self, child: ViewId) -> i32 {
        self.tree.measured_state(child)
    }

    pub fn suggested_minimum_width(&self) -> i32 {
        self.tree.suggested_minimum_width(self.id)
    }

    pub fn suggested_minimum_height(&self) -> i32 {
        self.tree.suggested_minimum_height(self.id)
    }

    pub fn measure_child(
        &mut self,
        child: ViewId,
        parent_width_spec: MeasureSpec,
        parent_height_spec: MeasureSpec,
    ) {
        self.tree
            .measure_child(self.id, child, parent_width_spec, parent_height_spec);
    }

    pub fn measure_child_with_margins(
        &mut self,
        child: ViewId,
        parent_width_spec: MeasureSpec,
        width_used: i32,
        parent_height_spec: MeasureSpec,
        height_used: i32,
    ) {
        self.tree.measure_child_with_margins(
            self.id,
            child,
            parent_width_spec,
            width_used,
            parent_height_spec,
            height_used,
        );
    }

    pub fn layout_child(&mut self, child: ViewId, left: i32, top: i32, right: i32, bottom: i32) {
        self.tree.layout(child, left, top, right, bottom);
    }

    pub fn request_layout(&mut self) {
        self.tree.request_layout(self.id);
    }

    pub fn invalidate(&mut self) {
        self.tree.invalidate(self.id);
    }

    pub fn invalidate_rect(&mut self, rect: Rect) {
        self.tree.invalidate_rect(self.id, rect);
    }

    pub fn is_pressed(&self) -> bool {
        self.tree.is_pressed(self.id)
    }

    pub fn scroll_to(&mut self, x: i32, y: i32) {
        self.tree.scroll_to(self.id, x, y);
    }

    pub fn scroll_offset(&self) -> (i32, i32) {
        self.tree.scroll_offset(self.id)
    }

    pub fn start_nested_scroll(&mut self, axes: u32) -> bool {
        self.tree.start_nested_scroll(self.id, axes)
    }

    pub fn dispatch_nested_pre_scroll(&mut self, dx: i32, dy: i32) -> (i32, i32) {
        self.tree.dispatch_nested_pre_scroll(self.id, dx, dy)
    }

    pub fn dispatch_nested_scroll(
        &mut self,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
    ) {
        self.tree.dispatch_nested_scroll(
            self.id,
            dx_consumed,
            dy_consumed,
            dx_unconsumed,
            dy_unconsumed,
        );
    }

    pub fn stop_nested_scroll(&mut self) {
        self.tree.stop_nested_scroll(self.id);
    }

    pub fn request_disallow_intercept_touch_event(&mut self, disallow: bool) {
        self.tree
            .request_disallow_intercept_touch_event(self.id, disallow);
    }
}
