use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexSet;
use trellis_geometry::{Rect, Region};
use trellis_input::{KeyEvent, MotionEvent};
use trellis_layout::{LayoutParams, MeasureSpec};
use trellis_render::{Drawable, StateSet, Transform};

use crate::widget::Widget;

/// Identifies one view for the lifetime of its tree. Ids are handed out
/// monotonically and never reused, so a stale id reliably misses instead
/// of aliasing a newer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub(crate) usize);

impl ViewId {
    /// Stable token for APIs that track views without holding ids.
    pub fn token(self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Failure modes of tree mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    /// The id names a view that was never created or has been removed.
    Missing(ViewId),
    /// The view already sits under another parent.
    AlreadyParented(ViewId),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::Missing(id) => write!(f, "view {id} does not exist"),
            ViewError::AlreadyParented(id) => write!(f, "view {id} already has a parent"),
        }
    }
}

impl std::error::Error for ViewError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    /// Not drawn, still occupies its laid-out space.
    Invisible,
    /// Not drawn and skipped by layout.
    Gone,
}

/// Whether a container offers focus to itself or its children first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DescendantFocusability {
    #[default]
    BeforeDescendants,
    AfterDescendants,
    BlockDescendants,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct NodeFlags(u32);

impl NodeFlags {
    pub const FORCE_LAYOUT: NodeFlags = NodeFlags(1 << 0);
    pub const MEASURED_DIMENSION_SET: NodeFlags = NodeFlags(1 << 1);
    pub const LAYOUT_REQUIRED: NodeFlags = NodeFlags(1 << 2);
    pub const DIRTY: NodeFlags = NodeFlags(1 << 3);

    pub fn contains(self, other: NodeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: NodeFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: NodeFlags) {
        self.0 &= !other.0;
    }
}

/// One child currently capturing part of a pointer gesture.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TouchTarget {
    pub child: ViewId,
    pub pointer_id_bits: u32,
}

/// Container-only state.
#[derive(Default)]
pub(crate) struct GroupState {
    pub descendant_focusability: DescendantFocusability,
    pub focused_child: Option<ViewId>,
    pub disallow_intercept: bool,
    pub split_motion_events: bool,
    pub clip_children: bool,
    /// Front entry is the most recently captured target.
    pub touch_targets: Vec<TouchTarget>,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NestedScrollState {
    pub parent: Option<ViewId>,
    pub axes: u32,
}

/// Opaque handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(u64);

pub(crate) type ClickListener = Rc<RefCell<dyn FnMut(&mut ViewTree, ViewId)>>;
pub(crate) type LayoutChangeListener = Rc<RefCell<dyn FnMut(&mut ViewTree, ViewId, Rect, Rect)>>;
pub(crate) type FocusChangeListener = Rc<RefCell<dyn FnMut(&mut ViewTree, ViewId, bool)>>;
pub(crate) type HierarchyListener = Rc<RefCell<dyn FnMut(&mut ViewTree, ViewId, ViewId, bool)>>;
pub(crate) type TouchListener =
    Rc<RefCell<dyn FnMut(&mut ViewTree, ViewId, &MotionEvent) -> bool>>;
pub(crate) type KeyListener = Rc<RefCell<dyn FnMut(&mut ViewTree, ViewId, &mut KeyEvent) -> bool>>;

#[derive(Default)]
pub(crate) struct Listeners {
    pub click: Vec<(ListenerToken, ClickListener)>,
    pub layout_change: Vec<(ListenerToken, LayoutChangeListener)>,
    pub focus_change: Vec<(ListenerToken, FocusChangeListener)>,
    pub hierarchy: Vec<(ListenerToken, HierarchyListener)>,
    pub touch: Vec<(ListenerToken, TouchListener)>,
    pub key: Vec<(ListenerToken, KeyListener)>,
}

impl Listeners {
    fn remove(&mut self, token: ListenerToken) -> bool {
        fn drop_from<T>(list: &mut Vec<(ListenerToken, T)>, token: ListenerToken) -> bool {
            match list.iter().position(|(t, _)| *t == token) {
                Some(i) => {
                    list.remove(i);
                    true
                }
                None => false,
            }
        }
        drop_from(&mut self.click, token)
            || drop_from(&mut self.layout_change, token)
            || drop_from(&mut self.focus_change, token)
            || drop_from(&mut self.hierarchy, token)
            || drop_from(&mut self.touch, token)
            || drop_from(&mut self.key, token)
    }
}

/// One slot of the view arena.
pub(crate) struct ViewNode {
    pub id: ViewId,
    pub parent: Option<ViewId>,
    pub children: Vec<ViewId>,
    /// Taken out while one of its hooks runs; see `with_widget`.
    pub widget: Option<Box<dyn Widget>>,
    /// Laid-out bounds in the parent's coordinate space.
    pub frame: Rect,
    /// Packed measured size plus state bits, one per axis.
    pub measured_width: i32,
    pub measured_height: i32,
    pub old_width_spec: Option<MeasureSpec>,
    pub old_height_spec: Option<MeasureSpec>,
    pub flags: NodeFlags,
    pub visibility: Visibility,
    pub layout_params: LayoutParams,
    pub padding: (i32, i32, i32, i32),
    pub min_width: i32,
    pub min_height: i32,
    pub scroll_x: i32,
    pub scroll_y: i32,
    pub transform: Transform,
    pub background: Option<Box<dyn Drawable>>,
    pub state: StateSet,
    pub clickable: bool,
    pub focusable: bool,
    pub attached: bool,
    pub group: GroupState,
    pub nested: NestedScrollState,
    pub listeners: Listeners,
}

impl ViewNode {
    fn new(id: ViewId, widget: Box<dyn Widget>) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            widget: Some(widget),
            frame: Rect::default(),
            measured_width: 0,
            measured_height: 0,
            old_width_spec: None,
            old_height_spec: None,
            flags: NodeFlags::FORCE_LAYOUT,
            visibility: Visibility::Visible,
            layout_params: LayoutParams::wrap(),
            padding: (0, 0, 0, 0),
            min_width: 0,
            min_height: 0,
            scroll_x: 0,
            scroll_y: 0,
            transform: Transform::default(),
            background: None,
            state: StateSet::ENABLED,
            clickable: false,
            focusable: false,
            attached: false,
            group: GroupState {
                clip_children: true,
                ..GroupState::default()
            },
            nested: NestedScrollState::default(),
            listeners: Listeners::default(),
        }
    }
}

/// The arena owning every view of a window, together with the window-wide
/// damage and layout bookkeeping the views feed.
///
/// Slots are retired in place when a view is removed and never reused.
/// Parents own their children; parent links are plain ids, so nothing
/// here is self-referential.
pub struct ViewTree {
    nodes: Vec<Option<ViewNode>>,
    root: Option<ViewId>,
    pub(crate) damage: Region,
    pub(crate) layout_requesters: IndexSet<ViewId>,
    pub(crate) pending_redraws: IndexSet<ViewId>,
    pub(crate) in_draw: bool,
    next_listener_token: u64,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            damage: Region::new(),
            layout_requesters: IndexSet::new(),
            pending_redraws: IndexSet::new(),
            in_draw: false,
            next_listener_token: 0,
        }
    }

    /// Creates a detached view driven by `widget`.
    pub fn create_view(&mut self, widget: Box<dyn Widget>) -> ViewId {
        let id = ViewId(self.nodes.len());
        self.nodes.push(Some(ViewNode::new(id, widget)));
        id
    }

    pub(crate) fn node(&self, id: ViewId) -> Option<&ViewNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn node_mut(&mut self, id: ViewId) -> Option<&mut ViewNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub(crate) fn try_node(&self, id: ViewId) -> Result<&ViewNode, ViewError> {
        self.node(id).ok_or(ViewError::Missing(id))
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.node(id).is_some()
    }

    pub fn root(&self) -> Option<ViewId> {
        self.root
    }

    /// Installs the root view and attaches its subtree.
    pub fn set_root(&mut self, id: ViewId) -> Result<(), ViewError> {
        let node = self.try_node(id)?;
        if node.parent.is_some() {
            return Err(ViewError::AlreadyParented(id));
        }
        if let Some(old) = self.root.take() {
            self.dispatch_detached(old);
        }
        self.root = Some(id);
        self.dispatch_attached(id);
        self.request_layout(id);
        self.invalidate(id);
        Ok(())
    }

    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: ViewId) -> &[ViewId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn child_count(&self, id: ViewId) -> usize {
        self.children(id).len()
    }

    /// Appends `child` at the top of `parent`'s z-order. The child keeps
    /// the layout parameters it already carries.
    pub fn add_child(&mut self, parent: ViewId, child: ViewId) -> Result<(), ViewError> {
        self.try_node(parent)?;
        let child_node = self.try_node(child)?;
        if child_node.parent.is_some() {
            return Err(ViewError::AlreadyParented(child));
        }
        self.node_mut(child)
            .expect("child just checked")
            .parent = Some(parent);
        let parent_attached = {
            let parent_node = self.node_mut(parent).expect("parent just checked");
            parent_node.children.push(child);
            parent_node.attached
        };
        if parent_attached {
            self.dispatch_attached(child);
        }
        self.request_layout(parent);
        self.invalidate(parent);
        self.fire_hierarchy_listeners(parent, child, true);
        Ok(())
    }

    pub fn add_child_with_params(
        &mut self,
        parent: ViewId,
        child: ViewId,
        params: LayoutParams,
    ) -> Result<(), ViewError> {
        if let Some(node) = self.node_mut(child) {
            node.layout_params = params;
        }
        self.add_child(parent, child)
    }

    /// Detaches `child` from `parent` and destroys its whole subtree.
    /// The freed slots are retired, never reissued.
    pub fn remove_child(&mut self, parent: ViewId, child: ViewId) -> Result<(), ViewError> {
        if !self.try_node(parent)?.children.contains(&child) {
            return Err(ViewError::Missing(child));
        }

        if self.focus_is_within(child) {
            if let Some(focused) = self.focused_view() {
                self.clear_focus(focused);
            }
        }
        self.dispatch_detached(child);
        self.fire_hierarchy_listeners(parent, child, false);

        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|c| *c != child);
            parent_node
                .group
                .touch_targets
                .retain(|t| t.child != child);
            if parent_node.group.focused_child == Some(child) {
                parent_node.group.focused_child = None;
            }
        }
        self.destroy_subtree(child);
        self.request_layout(parent);
        self.invalidate(parent);
        Ok(())
    }

    /// Moves `child` to the end of the parent's child list, the top of
    /// the z-order, and schedules a fresh layout pass.
    pub fn bring_child_to_front(&mut self, parent: ViewId, child: ViewId) -> Result<(), ViewError> {
        let parent_node = self.try_node(parent)?;
        if !parent_node.children.contains(&child) {
            return Err(ViewError::Missing(child));
        }
        let parent_node = self.node_mut(parent).expect("parent just checked");
        parent_node.children.retain(|c| *c != child);
        parent_node.children.push(child);
        self.request_layout(parent);
        self.invalidate(parent);
        Ok(())
    }

    fn destroy_subtree(&mut self, id: ViewId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.destroy_subtree(child);
        }
        self.layout_requesters.shift_remove(&id);
        self.pending_redraws.shift_remove(&id);
        if let Some(slot) = self.nodes.get_mut(id.0) {
            *slot = None;
        }
    }

    pub(crate) fn dispatch_attached(&mut self, id: ViewId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.attached = true;
        node.state.insert(StateSet::WINDOW_FOCUSED);
        crate::widget::with_widget(self, id, |widget, tree| {
            widget.on_attached(&mut crate::widget::ViewScope::new(tree, id));
        });
        self.refresh_drawable_state(id);
        for child in self.children(id).to_vec() {
            self.dispatch_attached(child);
        }
    }

    pub(crate) fn dispatch_detached(&mut self, id: ViewId) {
        for child in self.children(id).to_vec() {
            self.dispatch_detached(child);
        }
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.attached = false;
        node.state.remove(StateSet::WINDOW_FOCUSED);
        crate::widget::with_widget(self, id, |widget, tree| {
            widget.on_detached(&mut crate::widget::ViewScope::new(tree, id));
        });
        self.layout_requesters.shift_remove(&id);
        self.pending_redraws.shift_remove(&id);
    }

    pub fn is_attached(&self, id: ViewId) -> bool {
        self.node(id).map(|n| n.attached).unwrap_or(false)
    }

    // --- plain accessors -------------------------------------------------

    pub fn frame(&self, id: ViewId) -> Rect {
        self.node(id).map(|n| n.frame).unwrap_or_default()
    }

    pub fn width(&self, id: ViewId) -> i32 {
        self.frame(id).width
    }

    pub fn height(&self, id: ViewId) -> i32 {
        self.frame(id).height
    }

    pub fn visibility(&self, id: ViewId) -> Visibility {
        self.node(id).map(|n| n.visibility).unwrap_or_default()
    }

    pub fn layout_params(&self, id: ViewId) -> LayoutParams {
        self.node(id).map(|n| n.layout_params).unwrap_or_default()
    }

    pub fn padding(&self, id: ViewId) -> (i32, i32, i32, i32) {
        self.node(id).map(|n| n.padding).unwrap_or_default()
    }

    pub fn scroll_offset(&self, id: ViewId) -> (i32, i32) {
        self.node(id)
            .map(|n| (n.scroll_x, n.scroll_y))
            .unwrap_or_default()
    }

    pub fn transform(&self, id: ViewId) -> Transform {
        self.node(id).map(|n| n.transform).unwrap_or_default()
    }

    pub fn state(&self, id: ViewId) -> StateSet {
        self.node(id).map(|n| n.state).unwrap_or_default()
    }

    pub fn is_clickable(&self, id: ViewId) -> bool {
        self.node(id).map(|n| n.clickable).unwrap_or(false)
    }

    pub fn is_focusable(&self, id: ViewId) -> bool {
        self.node(id).map(|n| n.focusable).unwrap_or(false)
    }

    pub fn is_enabled(&self, id: ViewId) -> bool {
        self.state(id).contains(StateSet::ENABLED)
    }

    // --- mutators with their side effects --------------------------------

    pub fn set_visibility(&mut self, id: ViewId, visibility: Visibility) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let old = node.visibility;
        if old == visibility {
            return;
        }
        if old == Visibility::Visible {
            // Becoming hidden: the old pixels must be repainted over.
            self.invalidate(id);
        }
        let node = self.node_mut(id).expect("checked above");
        node.visibility = visibility;
        let was_or_is_gone = old == Visibility::Gone || visibility == Visibility::Gone;
        if visibility == Visibility::Visible {
            self.invalidate(id);
        }
        if was_or_is_gone {
            // Gone changes the space the view takes, not just its pixels.
            if let Some(parent) = self.parent(id) {
                self.request_layout(parent);
            } else {
                self.request_layout(id);
            }
        }
        if visibility != Visibility::Visible && self.focus_is_within(id) {
            if let Some(focused) = self.focused_view() {
                self.clear_focus(focused);
            }
        }
    }

    pub fn set_layout_params(&mut self, id: ViewId, params: LayoutParams) {
        if let Some(node) = self.node_mut(id) {
            node.layout_params = params;
            self.request_layout(id);
        }
    }

    pub fn set_padding(&mut self, id: ViewId, left: i32, top: i32, right: i32, bottom: i32) {
        if let Some(node) = self.node_mut(id) {
            node.padding = (left, top, right, bottom);
            self.request_layout(id);
        }
    }

    pub fn set_min_size(&mut self, id: ViewId, min_width: i32, min_height: i32) {
        if let Some(node) = self.node_mut(id) {
            node.min_width = min_width;
            node.min_height = min_height;
            self.request_layout(id);
        }
    }

    pub fn set_background(&mut self, id: ViewId, background: Option<Box<dyn Drawable>>) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.background = background;
        self.refresh_drawable_state(id);
        self.request_layout(id);
        self.invalidate(id);
    }

    pub fn set_clickable(&mut self, id: ViewId, clickable: bool) {
        if let Some(node) = self.node_mut(id) {
            node.clickable = clickable;
        }
    }

    pub fn set_focusable(&mut self, id: ViewId, focusable: bool) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.focusable = focusable;
        if !focusable && self.is_focused(id) {
            self.clear_focus(id);
        }
    }

    pub fn set_enabled(&mut self, id: ViewId, enabled: bool) {
        if let Some(node) = self.node_mut(id) {
            node.state.set(StateSet::ENABLED, enabled);
            self.refresh_drawable_state(id);
        }
    }

    pub fn set_selected(&mut self, id: ViewId, selected: bool) {
        if let Some(node) = self.node_mut(id) {
            node.state.set(StateSet::SELECTED, selected);
            self.refresh_drawable_state(id);
        }
    }

    pub fn set_checked(&mut self, id: ViewId, checked: bool) {
        if let Some(node) = self.node_mut(id) {
            node.state.set(StateSet::CHECKED, checked);
            self.refresh_drawable_state(id);
        }
    }

    pub(crate) fn set_pressed(&mut self, id: ViewId, pressed: bool) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if node.state.contains(StateSet::PRESSED) == pressed {
            return;
        }
        node.state.set(StateSet::PRESSED, pressed);
        self.refresh_drawable_state(id);
    }

    pub fn is_pressed(&self, id: ViewId) -> bool {
        self.state(id).contains(StateSet::PRESSED)
    }

    pub fn set_transform(&mut self, id: ViewId, transform: Transform) {
        self.invalidate(id);
        if let Some(node) = self.node_mut(id) {
            node.transform = transform;
        }
        self.invalidate(id);
    }

    pub fn scroll_to(&mut self, id: ViewId, x: i32, y: i32) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if node.scroll_x == x && node.scroll_y == y {
            return;
        }
        node.scroll_x = x;
        node.scroll_y = y;
        self.invalidate(id);
    }

    pub fn set_clip_children(&mut self, id: ViewId, clip: bool) {
        if let Some(node) = self.node_mut(id) {
            node.group.clip_children = clip;
            self.invalidate(id);
        }
    }

    pub fn set_split_motion_events(&mut self, id: ViewId, split: bool) {
        if let Some(node) = self.node_mut(id) {
            node.group.split_motion_events = split;
        }
    }

    pub fn set_descendant_focusability(&mut self, id: ViewId, focusability: DescendantFocusability) {
        if let Some(node) = self.node_mut(id) {
            node.group.descendant_focusability = focusability;
        }
    }

    pub fn descendant_focusability(&self, id: ViewId) -> DescendantFocusability {
        self.node(id)
            .map(|n| n.group.descendant_focusability)
            .unwrap_or_default()
    }

    /// Pushes the view's current interaction state into its background
    /// drawable, invalidating when the appearance changed.
    pub fn refresh_drawable_state(&mut self, id: ViewId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let state = node.state;
        let changed = match node.background.as_mut() {
            Some(background) if background.is_stateful() => background.set_state(state),
            _ => false,
        };
        if changed {
            self.invalidate(id);
        }
    }

    // --- listeners --------------------------------------------------------

    fn next_token(&mut self) -> ListenerToken {
        let token = ListenerToken(self.next_listener_token);
        self.next_listener_token += 1;
        token
    }

    pub fn add_click_listener(
        &mut self,
        id: ViewId,
        listener: impl FnMut(&mut ViewTree, ViewId) + 'static,
    ) -> ListenerToken {
        let token = self.next_token();
        if let Some(node) = self.node_mut(id) {
            node.clickable = true;
            node.listeners
                .click
                .push((token, Rc::new(RefCell::new(listener))));
        }
        token
    }

    pub fn add_layout_change_listener(
        &mut self,
        id: ViewId,
        listener: impl FnMut(&mut ViewTree, ViewId, Rect, Rect) + 'static,
    ) -> ListenerToken {
        let token = self.next_token();
        if let Some(node) = self.node_mut(id) {
            node.listeners
                .layout_change
                .push((token, Rc::new(RefCell::new(listener))));
        }
        token
    }

    pub fn add_focus_change_listener(
        &mut self,
        id: ViewId,
        listener: impl FnMut(&mut ViewTree, ViewId, bool) + 'static,
    ) -> ListenerToken {
        let token = self.next_token();
        if let Some(node) = self.node_mut(id) {
            node.listeners
                .focus_change
                .push((token, Rc::new(RefCell::new(listener))));
        }
        token
    }

    pub fn add_hierarchy_listener(
        &mut self,
        id: ViewId,
        listener: impl FnMut(&mut ViewTree, ViewId, ViewId, bool) + 'static,
    ) -> ListenerToken {
        let token = self.next_token();
        if let Some(node) = self.node_mut(id) {
            node.listeners
                .hierarchy
                .push((token, Rc::new(RefCell::new(listener))));
        }
        token
    }

    pub fn add_touch_listener(
        &mut self,
        id: ViewId,
        listener: impl FnMut(&mut ViewTree, ViewId, &MotionEvent) -> bool + 'static,
    ) -> ListenerToken {
        let token = self.next_token();
        if let Some(node) = self.node_mut(id) {
            node.listeners
                .touch
                .push((token, Rc::new(RefCell::new(listener))));
        }
        token
    }

    pub fn add_key_listener(
        &mut self,
        id: ViewId,
        listener: impl FnMut(&mut ViewTree, ViewId, &mut KeyEvent) -> bool + 'static,
    ) -> ListenerToken {
        let token = self.next_token();
        if let Some(node) = self.node_mut(id) {
            node.listeners
                .key
                .push((token, Rc::new(RefCell::new(listener))));
        }
        token
    }

    /// Unregisters whichever listener the token belongs to. False when it
    /// was already gone (or the view is).
    pub fn remove_listener(&mut self, id: ViewId, token: ListenerToken) -> bool {
        self.node_mut(id)
            .map(|n| n.listeners.remove(token))
            .unwrap_or(false)
    }

    pub(crate) fn fire_click_listeners(&mut self, id: ViewId) {
        let listeners: Vec<ClickListener> = match self.node(id) {
            Some(node) => node.listeners.click.iter().map(|(_, l)| l.clone()).collect(),
            None => return,
        };
        for listener in listeners {
            (listener.borrow_mut())(self, id);
        }
    }

    pub(crate) fn fire_layout_change_listeners(&mut self, id: ViewId, old: Rect, new: Rect) {
        let listeners: Vec<LayoutChangeListener> = match self.node(id) {
            Some(node) => node
                .listeners
                .layout_change
                .iter()
                .map(|(_, l)| l.clone())
                .collect(),
            None => return,
        };
        for listener in listeners {
            (listener.borrow_mut())(self, id, old, new);
        }
    }

    pub(crate) fn fire_focus_change_listeners(&mut self, id: ViewId, gained: bool) {
        let listeners: Vec<FocusChangeListener> = match self.node(id) {
            Some(node) => node
                .listeners
                .focus_change
                .iter()
                .map(|(_, l)| l.clone())
                .collect(),
            None => return,
        };
        for listener in listeners {
            (listener.borrow_mut())(self, id, gained);
        }
    }

    fn fire_hierarchy_listeners(&mut self, parent: ViewId, child: ViewId, added: bool) {
        let listeners: Vec<HierarchyListener> = match self.node(parent) {
            Some(node) => node
                .listeners
                .hierarchy
                .iter()
                .map(|(_, l)| l.clone())
                .collect(),
            None => return,
        };
        for listener in listeners {
            (listener.borrow_mut())(self, parent, child, added);
        }
    }

    // --- geometry helpers -------------------------------------------------

    /// The view's bounds in window coordinates, ignoring render
    /// transforms. Scroll offsets of ancestors are honored.
    pub fn bounds_in_window(&self, id: ViewId) -> Rect {
        let Some(node) = self.node(id) else {
            return Rect::default();
        };
        let mut rect = node.frame;
        let mut current = node.parent;
        while let Some(parent_id) = current {
            let Some(parent) = self.node(parent_id) else {
                break;
            };
            rect = rect.offset(
                parent.frame.left - parent.scroll_x,
                parent.frame.top - parent.scroll_y,
            );
            current = parent.parent;
        }
        rect
    }

    pub(crate) fn focus_is_within(&self, id: ViewId) -> bool {
        match self.focused_view() {
            Some(mut focused) => loop {
                if focused == id {
                    return true;
                }
                match self.parent(focused) {
                    Some(p) => focused = p,
                    None => return false,
                }
            },
            None => false,
        }
    }
}
