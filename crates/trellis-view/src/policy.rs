//! Container layout strategies.
//!
//! A container is an ordinary view whose widget delegates measurement
//! and child placement to a [`ContainerPolicy`]. Two policies ship here:
//! a linear stack in either orientation and a frame that overlays its
//! children, enough to exercise the whole measure/layout protocol.

use trellis_layout::{combine_measured_states, resolve_size_and_state, MeasureSpec};

use crate::tree::{ViewId, Visibility};
use crate::widget::{ViewScope, Widget};

/// How a container turns incoming constraints into child measurements
/// and laid-out positions.
pub trait ContainerPolicy: 'static {
    fn measure(
        &mut self,
        view: &mut ViewScope<'_>,
        width_spec: MeasureSpec,
        height_spec: MeasureSpec,
    );

    fn layout(&mut self, view: &mut ViewScope<'_>, width: i32, height: i32);
}

/// A view driven entirely by a layout policy. Touch, key and draw
/// behavior stay at their defaults.
pub struct ContainerWidget<P: ContainerPolicy> {
    policy: P,
}

impl<P: ContainerPolicy> ContainerWidget<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }
}

impl<P: ContainerPolicy> Widget for ContainerWidget<P> {
    fn on_measure(
        &mut self,
        view: &mut ViewScope<'_>,
        width_spec: MeasureSpec,
        height_spec: MeasureSpec,
    ) {
        self.policy.measure(view, width_spec, height_spec);
    }

    fn on_layout(&mut self, view: &mut ViewScope<'_>, _changed: bool, width: i32, height: i32) {
        self.policy.layout(view, width, height);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Stacks children one after another along one axis, honoring margins.
/// Cross-axis size wraps the widest child. Children marked gone take no
/// part in either pass.
pub struct LinearPolicy {
    orientation: Orientation,
}

impl LinearPolicy {
    pub fn vertical() -> Self {
        Self {
            orientation: Orientation::Vertical,
        }
    }

    pub fn horizontal() -> Self {
        Self {
            orientation: Orientation::Horizontal,
        }
    }
}

impl ContainerPolicy for LinearPolicy {
    fn measure(
        &mut self,
        view: &mut ViewScope<'_>,
        width_spec: MeasureSpec,
        height_spec: MeasureSpec,
    ) {
        let (pl, pt, pr, pb) = view.padding();
        let mut along = 0;
        let mut across = 0;
        let mut state = 0;
        for child in view.child_ids() {
            if view.child_visibility(child) == Visibility::Gone {
                continue;
            }
            let margins = view.child_layout_params(child).margins;
            // The running total is space already spoken for, so later
            // children see only what remains.
            match self.orientation {
                Orientation::Vertical => {
                    view.measure_child_with_margins(child, width_spec, 0, height_spec, along);
                    along += view.child_measured_height(child) + margins.vertical();
                    across = across.max(view.child_measured_width(child) + margins.horizontal());
                }
                Orientation::Horizontal => {
                    view.measure_child_with_margins(child, width_spec, along, height_spec, 0);
                    along += view.child_measured_width(child) + margins.horizontal();
                    across = across.max(view.child_measured_height(child) + margins.vertical());
                }
            }
            state = combine_measured_states(state, view.child_measured_state(child));
        }
        let (content_width, content_height) = match self.orientation {
            Orientation::Vertical => (across + pl + pr, along + pt + pb),
            Orientation::Horizontal => (along + pl + pr, across + pt + pb),
        };
        let width = content_width.max(view.suggested_minimum_width());
        let height = content_height.max(view.suggested_minimum_height());
        view.set_measured_dimension(
            resolve_size_and_state(width, width_spec, state),
            resolve_size_and_state(height, height_spec, state),
        );
    }

    fn layout(&mut self, view: &mut ViewScope<'_>, _width: i32, _height: i32) {
        let (pl, pt, _, _) = view.padding();
        let mut along = match self.orientation {
            Orientation::Vertical => pt,
            Orientation::Horizontal => pl,
        };
        for child in view.child_ids() {
            if view.child_visibility(child) == Visibility::Gone {
                continue;
            }
            let margins = view.child_layout_params(child).margins;
            let w = view.child_measured_width(child);
            let h = view.child_measured_height(child);
            match self.orientation {
                Orientation::Vertical => {
                    let left = pl + margins.left;
                    let top = along + margins.top;
                    view.layout_child(child, left, top, left + w, top + h);
                    along = top + h + margins.bottom;
                }
                Orientation::Horizontal => {
                    let left = along + margins.left;
                    let top = pt + margins.top;
                    view.layout_child(child, left, top, left + w, top + h);
                    along = left + w + margins.right;
                }
            }
        }
    }
}

/// Overlays every child at the padded origin; the container wraps the
/// largest one.
pub struct FramePolicy;

impl ContainerPolicy for FramePolicy {
    fn measure(
        &mut self,
        view: &mut ViewScope<'_>,
        width_spec: MeasureSpec,
        height_spec: MeasureSpec,
    ) {
        let (pl, pt, pr, pb) = view.padding();
        let mut max_width = 0;
        let mut max_height = 0;
        let mut state = 0;
        for child in view.child_ids() {
            if view.child_visibility(child) == Visibility::Gone {
                continue;
            }
            view.measure_child_with_margins(child, width_spec, 0, height_spec, 0);
            let margins = view.child_layout_params(child).margins;
            max_width = max_width.max(view.child_measured_width(child) + margins.horizontal());
            max_height = max_height.max(view.child_measured_height(child) + margins.vertical());
            state = combine_measured_states(state, view.child_measured_state(child));
        }
        let width = (max_width + pl + pr).max(view.suggested_minimum_width());
        let height = (max_height + pt + pb).max(view.suggested_minimum_height());
        view.set_measured_dimension(
            resolve_size_and_state(width, width_spec, state),
            resolve_size_and_state(height, height_spec, state),
        );
    }

    fn layout(&mut self, view: &mut ViewScope<'_>, _width: i32, _height: i32) {
        let (pl, pt, _, _) = view.padding();
        for child in view.child_ids() {
            if view.child_visibility(child) == Visibility::Gone {
                continue;
            }
            let margins = view.child_layout_params(child).margins;
            let left = pl + margins.left;
            let top = pt + margins.top;
            view.layout_child(
                child,
                left,
                top,
                left + view.child_measured_width(child),
                top + view.child_measured_height(child),
            );
        }
    }
}

/// A vertical stack container view, ready to add children to.
pub fn linear_column(tree: &mut crate::tree::ViewTree) -> ViewId {
    tree.create_view(Box::new(ContainerWidget::new(LinearPolicy::vertical())))
}

/// A horizontal row container view.
pub fn linear_row(tree: &mut crate::tree::ViewTree) -> ViewId {
    tree.create_view(Box::new(ContainerWidget::new(LinearPolicy::horizontal())))
}

/// An overlay container view.
pub fn frame(tree: &mut crate::tree::ViewTree) -> ViewId {
    tree.create_view(Box::new(ContainerWidget::new(FramePolicy)))
}
