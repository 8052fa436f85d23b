//! Pointer dispatch: capture, interception and per-target routing.
//!
//! A container owning children runs the full capture protocol; a leaf
//! goes straight to its listeners, widget and default click handling.
//! Coordinates are rewritten level by level, so every handler sees the
//! event in its own local space.

use trellis_input::{MotionAction, MotionEvent};

use crate::tree::{TouchTarget, ViewId, ViewTree, Visibility};
use crate::widget::ViewScope;

impl ViewTree {
    /// Entry point for a pointer stream in window coordinates.
    pub fn dispatch_pointer_event(&mut self, event: &MotionEvent) -> bool {
        let Some(root) = self.root() else {
            return false;
        };
        let frame = self.frame(root);
        let mut local = event.clone();
        local.offset_location(-(frame.left as f32), -(frame.top as f32));
        let transform = self.transform(root);
        if !transform.is_identity() {
            match transform.to_matrix().invert() {
                Some(inverse) => local.transform(&inverse),
                None => return false,
            }
        }
        self.dispatch_touch_event(root, &local)
    }

    /// Routes an event already in the view's local coordinates.
    ///
    /// Containers consult interception, offer new pointers to children in
    /// reverse z-order and forward the rest of the gesture to whoever
    /// captured it; everything unclaimed falls through to the view's own
    /// handling.
    pub fn dispatch_touch_event(&mut self, id: ViewId, event: &MotionEvent) -> bool {
        if !self.contains(id) {
            return false;
        }
        if self.child_count(id) == 0 {
            return self.dispatch_to_view(id, event);
        }
        self.dispatch_to_group(id, event)
    }

    fn dispatch_to_group(&mut self, id: ViewId, event: &MotionEvent) -> bool {
        let action = event.action_masked();

        // A fresh gesture first cancels whatever the previous one left
        // captured, then starts from a clean slate.
        if action == MotionAction::Down {
            self.cancel_and_clear_touch_targets(id, event);
            self.reset_touch_state(id);
        }

        let canceled = action == MotionAction::Cancel;
        let (disallow, split, had_targets) = match self.node(id) {
            Some(node) => (
                node.group.disallow_intercept,
                node.group.split_motion_events,
                !node.group.touch_targets.is_empty(),
            ),
            None => return false,
        };

        let intercepted = if action == MotionAction::Down || had_targets {
            if disallow {
                false
            } else {
                crate::widget::with_widget(self, id, |widget, tree| {
                    widget.on_intercept_touch_event(&mut ViewScope::new(tree, id), event)
                })
                .unwrap_or(false)
            }
        } else {
            // No one owns the gesture and this is not a start: the group
            // keeps it for itself.
            true
        };

        let mut handled = false;
        let mut new_target: Option<ViewId> = None;
        let mut dispatched_to_new_target = false;

        if !canceled && !intercepted {
            let starts_pointer = action == MotionAction::Down
                || (split && action == MotionAction::PointerDown);
            if starts_pointer {
                let action_index = event.action_index();
                let id_bits = if split {
                    1u32 << event.pointer_id(action_index)
                } else {
                    u32::MAX
                };
                // A stale target still holding this pointer id is out.
                self.remove_pointers_from_targets(id, id_bits);

                let x = event.x_at(action_index);
                let y = event.y_at(action_index);
                for child in self.children(id).iter().rev().copied().collect::<Vec<_>>() {
                    if !self.can_receive_pointer(child) {
                        continue;
                    }
                    if !self.is_point_in_child(id, child, x, y) {
                        continue;
                    }
                    if self.dispatch_transformed(id, Some(child), event, false, id_bits) {
                        if let Some(node) = self.node_mut(id) {
                            node.group.touch_targets.insert(
                                0,
                                TouchTarget {
                                    child,
                                    pointer_id_bits: id_bits,
                                },
                            );
                        }
                        new_target = Some(child);
                        dispatched_to_new_target = true;
                        handled = true;
                        break;
                    }
                }
                if new_target.is_none() {
                    // Nobody claimed the new pointer; it rides along with
                    // the least recently added target, if any.
                    if let Some(node) = self.node_mut(id) {
                        if let Some(last) = node.group.touch_targets.last_mut() {
                            last.pointer_id_bits |= id_bits;
                            new_target = Some(last.child);
                        }
                    }
                }
            }
        }

        let targets: Vec<TouchTarget> = self
            .node(id)
            .map(|n| n.group.touch_targets.clone())
            .unwrap_or_default();
        if targets.is_empty() {
            // No captures: the group behaves like a plain view.
            handled = self.dispatch_transformed(id, None, event, canceled, u32::MAX);
        } else {
            for target in &targets {
                if dispatched_to_new_target && new_target == Some(target.child) {
                    handled = true;
                    continue;
                }
                let cancel_child = intercepted;
                if self.dispatch_transformed(
                    id,
                    Some(target.child),
                    event,
                    cancel_child,
                    target.pointer_id_bits,
                ) {
                    handled = true;
                }
                if cancel_child {
                    if let Some(node) = self.node_mut(id) {
                        node.group.touch_targets.retain(|t| t.child != target.child);
                    }
                }
            }
        }

        if canceled || action == MotionAction::Up {
            self.reset_touch_state(id);
        } else if split && action == MotionAction::PointerUp {
            let bit = 1u32 << event.pointer_id(event.action_index());
            self.remove_pointers_from_targets(id, bit);
        }
        handled
    }

    /// The leaf half of dispatch: listeners, then the widget hook, then
    /// the built-in press/click behavior. The first taker wins.
    fn dispatch_to_view(&mut self, id: ViewId, event: &MotionEvent) -> bool {
        if self.is_enabled(id) {
            let listeners: Vec<crate::tree::TouchListener> = match self.node(id) {
                Some(node) => node.listeners.touch.iter().map(|(_, l)| l.clone()).collect(),
                None => return false,
            };
            for listener in listeners {
                if (listener.borrow_mut())(self, id, event) {
                    return true;
                }
            }
        }
        let widget_handled = crate::widget::with_widget(self, id, |widget, tree| {
            widget.on_touch_event(&mut ViewScope::new(tree, id), event)
        })
        .unwrap_or(false);
        if widget_handled {
            return true;
        }
        self.default_touch_behavior(id, event)
    }

    /// Press tracking and click synthesis for clickable views. A disabled
    /// clickable view still consumes the stream, it just reacts to
    /// nothing.
    fn default_touch_behavior(&mut self, id: ViewId, event: &MotionEvent) -> bool {
        if !self.is_clickable(id) {
            return false;
        }
        if !self.is_enabled(id) {
            return true;
        }
        match event.action_masked() {
            MotionAction::Down => self.set_pressed(id, true),
            MotionAction::Move => {
                let frame = self.frame(id);
                let inside = event.x() >= 0.0
                    && event.y() >= 0.0
                    && event.x() < frame.width as f32
                    && event.y() < frame.height as f32;
                if !inside {
                    self.set_pressed(id, false);
                }
            }
            MotionAction::Up => {
                if self.is_pressed(id) {
                    self.set_pressed(id, false);
                    self.perform_click(id);
                }
            }
            MotionAction::Cancel => self.set_pressed(id, false),
            MotionAction::PointerDown | MotionAction::PointerUp => {}
        }
        true
    }

    /// Fires the view's click listeners. Returns whether any were bound.
    pub fn perform_click(&mut self, id: ViewId) -> bool {
        let had_listeners = self
            .node(id)
            .map(|n| !n.listeners.click.is_empty())
            .unwrap_or(false);
        self.fire_click_listeners(id);
        had_listeners
    }

    /// Forwards (a subset of) the event to `child`, or to the group's own
    /// view handling when `child` is `None`.
    ///
    /// With `cancel` set the child sees an ActionCancel regardless of the
    /// incoming action; coordinates are irrelevant to a cancel and stay
    /// untouched. Otherwise the event is narrowed to `desired_id_bits`
    /// (dropped entirely when no pointer remains) and shifted through the
    /// child's frame, the group's scroll and the child's inverse render
    /// transform.
    fn dispatch_transformed(
        &mut self,
        parent: ViewId,
        child: Option<ViewId>,
        event: &MotionEvent,
        cancel: bool,
        desired_id_bits: u32,
    ) -> bool {
        if cancel || event.action_masked() == MotionAction::Cancel {
            let mut canceled = event.clone();
            canceled.set_action(MotionAction::Cancel as u32);
            return match child {
                None => self.dispatch_to_view(parent, &canceled),
                Some(child) => self.dispatch_touch_event(child, &canceled),
            };
        }

        let old_bits = event.id_bits();
        let new_bits = old_bits & desired_id_bits;
        if new_bits == 0 {
            return false;
        }
        let mut transformed = if new_bits == old_bits {
            event.clone()
        } else {
            event.split(new_bits)
        };
        match child {
            None => self.dispatch_to_view(parent, &transformed),
            Some(child) => {
                self.transform_into_child(parent, child, &mut transformed);
                self.dispatch_touch_event(child, &transformed)
            }
        }
    }

    fn transform_into_child(&self, parent: ViewId, child: ViewId, event: &mut MotionEvent) {
        let (scroll_x, scroll_y) = self.scroll_offset(parent);
        let frame = self.frame(child);
        event.offset_location(
            (scroll_x - frame.left) as f32,
            (scroll_y - frame.top) as f32,
        );
        let transform = self.transform(child);
        if !transform.is_identity() {
            if let Some(inverse) = transform.to_matrix().invert() {
                event.transform(&inverse);
            }
        }
    }

    /// Whether `(x, y)` in the parent's coordinates lands inside `child`,
    /// honoring scroll and the child's render transform. A singular
    /// transform makes the child unhittable.
    fn is_point_in_child(&self, parent: ViewId, child: ViewId, x: f32, y: f32) -> bool {
        let (scroll_x, scroll_y) = self.scroll_offset(parent);
        let frame = self.frame(child);
        let mut local = (
            x + scroll_x as f32 - frame.left as f32,
            y + scroll_y as f32 - frame.top as f32,
        );
        let transform = self.transform(child);
        if !transform.is_identity() {
            match transform.to_matrix().invert() {
                Some(inverse) => local = inverse.map(local.0, local.1),
                None => return false,
            }
        }
        local.0 >= 0.0
            && local.1 >= 0.0
            && local.0 < frame.width as f32
            && local.1 < frame.height as f32
    }

    fn can_receive_pointer(&self, child: ViewId) -> bool {
        self.visibility(child) == Visibility::Visible
    }

    fn cancel_and_clear_touch_targets(&mut self, id: ViewId, event: &MotionEvent) {
        let targets: Vec<TouchTarget> = self
            .node(id)
            .map(|n| n.group.touch_targets.clone())
            .unwrap_or_default();
        for target in targets {
            self.dispatch_transformed(id, Some(target.child), event, true, u32::MAX);
        }
        if let Some(node) = self.node_mut(id) {
            node.group.touch_targets.clear();
        }
    }

    fn reset_touch_state(&mut self, id: ViewId) {
        if let Some(node) = self.node_mut(id) {
            node.group.touch_targets.clear();
            node.group.disallow_intercept = false;
        }
    }

    fn remove_pointers_from_targets(&mut self, id: ViewId, bits: u32) {
        if let Some(node) = self.node_mut(id) {
            for target in &mut node.group.touch_targets {
                target.pointer_id_bits &= !bits;
            }
            node.group.touch_targets.retain(|t| t.pointer_id_bits != 0);
        }
    }

    /// Asks every ancestor to keep its hands off the current gesture (or
    /// releases them again). Reset automatically when the next gesture
    /// starts.
    pub fn request_disallow_intercept_touch_event(&mut self, id: ViewId, disallow: bool) {
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            let Some(node) = self.node_mut(ancestor) else {
                break;
            };
            if node.group.disallow_intercept == disallow {
                break;
            }
            node.group.disallow_intercept = disallow;
            current = node.parent;
        }
    }

    /// The children currently capturing a pointer, most recent first.
    pub fn touch_target_children(&self, id: ViewId) -> Vec<ViewId> {
        self.node(id)
            .map(|n| n.group.touch_targets.iter().map(|t| t.child).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use trellis_geometry::Rect;
    use trellis_input::{MotionAction, MotionEvent, Pointer, ACTION_POINTER_INDEX_SHIFT};

    use crate::tree::{ViewId, ViewTree};
    use crate::widget::{EmptyWidget, ViewScope, Widget};

    #[derive(Debug, Clone, PartialEq)]
    struct Seen {
        view: &'static str,
        action: MotionAction,
        x: f32,
        y: f32,
    }

    type Log = Rc<RefCell<Vec<Seen>>>;

    struct RecordingWidget {
        name: &'static str,
        log: Log,
        consume: bool,
        intercept_on_move: bool,
    }

    impl RecordingWidget {
        fn new(name: &'static str, log: &Log, consume: bool) -> Self {
            Self {
                name,
                log: log.clone(),
                consume,
                intercept_on_move: false,
            }
        }
    }

    impl Widget for RecordingWidget {
        fn on_touch_event(&mut self, _view: &mut ViewScope<'_>, event: &MotionEvent) -> bool {
            self.log.borrow_mut().push(Seen {
                view: self.name,
                action: event.action_masked(),
                x: event.x(),
                y: event.y(),
            });
            self.consume
        }

        fn on_intercept_touch_event(
            &mut self,
            _view: &mut ViewScope<'_>,
            event: &MotionEvent,
        ) -> bool {
            self.intercept_on_move && event.action_masked() == MotionAction::Move
        }
    }

    fn place(tree: &mut ViewTree, id: ViewId, frame: Rect) {
        tree.node_mut(id).unwrap().frame = frame;
    }

    /// root(400x300) > panel(50,50,200x200) > button(25,25,100x100).
    fn nested_tree(log: &Log, button_consumes: bool) -> (ViewTree, ViewId, ViewId, ViewId) {
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(RecordingWidget::new("root", log, false)));
        let panel = tree.create_view(Box::new(RecordingWidget::new("panel", log, false)));
        let button =
            tree.create_view(Box::new(RecordingWidget::new("button", log, button_consumes)));
        tree.set_root(root).unwrap();
        tree.add_child(root, panel).unwrap();
        tree.add_child(panel, button).unwrap();
        place(&mut tree, root, Rect::new(0, 0, 400, 300));
        place(&mut tree, panel, Rect::new(50, 50, 200, 200));
        place(&mut tree, button, Rect::new(25, 25, 100, 100));
        (tree, root, panel, button)
    }

    fn down_at(x: f32, y: f32) -> MotionEvent {
        MotionEvent::down(x, y)
    }

    #[test]
    fn down_descends_to_deepest_hit_child_with_local_coordinates() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let (mut tree, _, _, _) = nested_tree(&log, true);

        assert!(tree.dispatch_pointer_event(&down_at(100.0, 100.0)));
        assert_eq!(
            &*log.borrow(),
            &[Seen {
                view: "button",
                action: MotionAction::Down,
                x: 25.0,
                y: 25.0,
            }]
        );
    }

    #[test]
    fn unclaimed_down_bubbles_to_ancestors() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let (mut tree, _, _, _) = nested_tree(&log, false);

        assert!(!tree.dispatch_pointer_event(&down_at(100.0, 100.0)));
        let views: Vec<&str> = log.borrow().iter().map(|s| s.view).collect();
        assert_eq!(views, vec!["button", "panel", "root"]);
    }

    #[test]
    fn capture_routes_the_rest_of_the_gesture() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let (mut tree, root, panel, button) = nested_tree(&log, true);

        tree.dispatch_pointer_event(&down_at(100.0, 100.0));
        assert_eq!(tree.touch_target_children(root), vec![panel]);
        assert_eq!(tree.touch_target_children(panel), vec![button]);

        // The move lands outside the button but still goes to it.
        tree.dispatch_pointer_event(&MotionEvent::move_to(300.0, 100.0));
        tree.dispatch_pointer_event(&MotionEvent::up(300.0, 100.0));
        let actions: Vec<(_, _)> = log.borrow().iter().map(|s| (s.view, s.action)).collect();
        assert_eq!(
            actions,
            vec![
                ("button", MotionAction::Down),
                ("button", MotionAction::Move),
                ("button", MotionAction::Up),
            ]
        );
        // x maps through panel (50) and button (25) offsets.
        assert_eq!(log.borrow()[1].x, 225.0);
        assert!(tree.touch_target_children(root).is_empty());
    }

    #[test]
    fn mid_gesture_interception_cancels_the_child_and_takes_over() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(RecordingWidget {
            name: "root",
            log: log.clone(),
            consume: true,
            intercept_on_move: true,
        }));
        let child = tree.create_view(Box::new(RecordingWidget::new("child", &log, true)));
        tree.set_root(root).unwrap();
        tree.add_child(root, child).unwrap();
        place(&mut tree, root, Rect::new(0, 0, 400, 300));
        place(&mut tree, child, Rect::new(0, 0, 400, 300));

        tree.dispatch_pointer_event(&down_at(10.0, 10.0));
        tree.dispatch_pointer_event(&MotionEvent::move_to(20.0, 10.0));
        tree.dispatch_pointer_event(&MotionEvent::move_to(30.0, 10.0));
        tree.dispatch_pointer_event(&MotionEvent::up(30.0, 10.0));

        let actions: Vec<(_, _)> = log.borrow().iter().map(|s| (s.view, s.action)).collect();
        assert_eq!(
            actions,
            vec![
                ("child", MotionAction::Down),
                // Interception turns the first move into the child's
                // cancel; the group keeps the rest.
                ("child", MotionAction::Cancel),
                ("root", MotionAction::Move),
                ("root", MotionAction::Up),
            ]
        );
    }

    #[test]
    fn middle_group_interception_leaves_the_outer_chain_intact() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = ViewTree::new();
        let outer = tree.create_view(Box::new(RecordingWidget::new("outer", &log, false)));
        let middle = tree.create_view(Box::new(RecordingWidget {
            name: "middle",
            log: log.clone(),
            consume: true,
            intercept_on_move: true,
        }));
        let leaf = tree.create_view(Box::new(RecordingWidget::new("leaf", &log, true)));
        tree.set_root(outer).unwrap();
        tree.add_child(outer, middle).unwrap();
        tree.add_child(middle, leaf).unwrap();
        place(&mut tree, outer, Rect::new(0, 0, 400, 300));
        place(&mut tree, middle, Rect::new(0, 0, 400, 300));
        place(&mut tree, leaf, Rect::new(0, 0, 400, 300));

        tree.dispatch_pointer_event(&down_at(10.0, 10.0));
        tree.dispatch_pointer_event(&MotionEvent::move_to(20.0, 10.0));
        // Only the middle group dropped its capture; the outer one still
        // routes to the middle.
        assert_eq!(tree.touch_target_children(outer), vec![middle]);
        assert!(tree.touch_target_children(middle).is_empty());

        tree.dispatch_pointer_event(&MotionEvent::move_to(30.0, 10.0));
        tree.dispatch_pointer_event(&MotionEvent::up(30.0, 10.0));

        let actions: Vec<(_, _)> = log.borrow().iter().map(|s| (s.view, s.action)).collect();
        assert_eq!(
            actions,
            vec![
                ("leaf", MotionAction::Down),
                ("leaf", MotionAction::Cancel),
                ("middle", MotionAction::Move),
                ("middle", MotionAction::Up),
            ]
        );
        assert!(tree.touch_target_children(outer).is_empty());
    }

    #[test]
    fn disallow_intercept_blocks_the_parent() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(RecordingWidget {
            name: "root",
            log: log.clone(),
            consume: true,
            intercept_on_move: true,
        }));
        let child = tree.create_view(Box::new(RecordingWidget::new("child", &log, true)));
        tree.set_root(root).unwrap();
        tree.add_child(root, child).unwrap();
        place(&mut tree, root, Rect::new(0, 0, 400, 300));
        place(&mut tree, child, Rect::new(0, 0, 400, 300));

        tree.dispatch_pointer_event(&down_at(10.0, 10.0));
        tree.request_disallow_intercept_touch_event(child, true);
        tree.dispatch_pointer_event(&MotionEvent::move_to(20.0, 10.0));

        let actions: Vec<(_, _)> = log.borrow().iter().map(|s| (s.view, s.action)).collect();
        assert_eq!(
            actions,
            vec![
                ("child", MotionAction::Down),
                ("child", MotionAction::Move),
            ]
        );

        // The next gesture resets the disallow flag.
        tree.dispatch_pointer_event(&MotionEvent::up(20.0, 10.0));
        tree.dispatch_pointer_event(&down_at(10.0, 10.0));
        tree.dispatch_pointer_event(&MotionEvent::move_to(20.0, 10.0));
        let last = log.borrow().last().cloned().unwrap();
        assert_eq!((last.view, last.action), ("child", MotionAction::Cancel));
    }

    #[test]
    fn reverse_z_order_hit_testing_prefers_the_top_child() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        let below = tree.create_view(Box::new(RecordingWidget::new("below", &log, true)));
        let above = tree.create_view(Box::new(RecordingWidget::new("above", &log, true)));
        tree.set_root(root).unwrap();
        tree.add_child(root, below).unwrap();
        tree.add_child(root, above).unwrap();
        place(&mut tree, root, Rect::new(0, 0, 400, 300));
        place(&mut tree, below, Rect::new(0, 0, 100, 100));
        place(&mut tree, above, Rect::new(0, 0, 100, 100));

        tree.dispatch_pointer_event(&down_at(50.0, 50.0));
        assert_eq!(log.borrow()[0].view, "above");
    }

    #[test]
    fn split_events_route_each_pointer_to_its_own_child() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        let left = tree.create_view(Box::new(RecordingWidget::new("left", &log, true)));
        let right = tree.create_view(Box::new(RecordingWidget::new("right", &log, true)));
        tree.set_root(root).unwrap();
        tree.add_child(root, left).unwrap();
        tree.add_child(root, right).unwrap();
        place(&mut tree, root, Rect::new(0, 0, 400, 300));
        place(&mut tree, left, Rect::new(0, 0, 200, 300));
        place(&mut tree, right, Rect::new(200, 0, 200, 300));
        tree.set_split_motion_events(root, true);

        tree.dispatch_pointer_event(&down_at(100.0, 100.0));

        let mut second = MotionEvent::default();
        second.init(
            0,
            (MotionAction::PointerDown as u32) | (1 << ACTION_POINTER_INDEX_SHIFT),
            vec![
                Pointer {
                    id: 0,
                    x: 100.0,
                    y: 100.0,
                },
                Pointer {
                    id: 1,
                    x: 300.0,
                    y: 100.0,
                },
            ],
            0,
            10,
        );
        tree.dispatch_pointer_event(&second);

        let seen: Vec<(_, _)> = log.borrow().iter().map(|s| (s.view, s.action)).collect();
        assert_eq!(
            seen,
            vec![
                ("left", MotionAction::Down),
                // The second pointer arrives at the right child as a
                // primary down of its own; the left child sees its slice
                // of the same sample as a plain move.
                ("right", MotionAction::Down),
                ("left", MotionAction::Move),
            ]
        );
        assert_eq!(log.borrow()[1].x, 100.0);
    }

    #[test]
    fn clickable_view_presses_clicks_and_unpresses() {
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        let button = tree.create_view(Box::new(EmptyWidget));
        tree.set_root(root).unwrap();
        tree.add_child(root, button).unwrap();
        place(&mut tree, root, Rect::new(0, 0, 400, 300));
        place(&mut tree, button, Rect::new(0, 0, 100, 100));

        let clicks = Rc::new(RefCell::new(0));
        let sink = clicks.clone();
        tree.add_click_listener(button, move |_, _| *sink.borrow_mut() += 1);

        tree.dispatch_pointer_event(&down_at(50.0, 50.0));
        assert!(tree.is_pressed(button));
        tree.dispatch_pointer_event(&MotionEvent::up(50.0, 50.0));
        assert!(!tree.is_pressed(button));
        assert_eq!(*clicks.borrow(), 1);
    }

    #[test]
    fn cancel_suppresses_the_click() {
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        let button = tree.create_view(Box::new(EmptyWidget));
        tree.set_root(root).unwrap();
        tree.add_child(root, button).unwrap();
        place(&mut tree, root, Rect::new(0, 0, 400, 300));
        place(&mut tree, button, Rect::new(0, 0, 100, 100));

        let clicks = Rc::new(RefCell::new(0));
        let sink = clicks.clone();
        tree.add_click_listener(button, move |_, _| *sink.borrow_mut() += 1);

        tree.dispatch_pointer_event(&down_at(50.0, 50.0));
        tree.dispatch_pointer_event(&MotionEvent::cancel());
        assert!(!tree.is_pressed(button));
        tree.dispatch_pointer_event(&MotionEvent::up(50.0, 50.0));
        assert_eq!(*clicks.borrow(), 0);
    }

    #[test]
    fn touch_listener_outranks_widget_and_default() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        let view = tree.create_view(Box::new(RecordingWidget::new("widget", &log, true)));
        tree.set_root(root).unwrap();
        tree.add_child(root, view).unwrap();
        place(&mut tree, root, Rect::new(0, 0, 400, 300));
        place(&mut tree, view, Rect::new(0, 0, 100, 100));

        let listener_hits = Rc::new(RefCell::new(0));
        let sink = listener_hits.clone();
        tree.add_touch_listener(view, move |_, _, _| {
            *sink.borrow_mut() += 1;
            true
        });

        tree.dispatch_pointer_event(&down_at(10.0, 10.0));
        assert_eq!(*listener_hits.borrow(), 1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn scrolled_parent_offsets_the_hit_test() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        let child = tree.create_view(Box::new(RecordingWidget::new("child", &log, true)));
        tree.set_root(root).unwrap();
        tree.add_child(root, child).unwrap();
        place(&mut tree, root, Rect::new(0, 0, 400, 300));
        place(&mut tree, child, Rect::new(0, 200, 100, 100));
        tree.scroll_to(root, 0, 200);

        // The child sits at y=200 but the root is scrolled down by 200,
        // so it is hit at the top of the window.
        tree.dispatch_pointer_event(&down_at(50.0, 10.0));
        assert_eq!(
            &*log.borrow(),
            &[Seen {
                view: "child",
                action: MotionAction::Down,
                x: 50.0,
                y: 10.0,
            }]
        );
    }
}
