//! Focus ownership and directional navigation.
//!
//! At most one view holds focus. Containers remember the path to it in
//! their focused-child links, so finding the holder is a single walk
//! down from the root. Directional search compares candidate rectangles
//! in window space; tab order is plain tree order.

use trellis_geometry::Rect;
use trellis_render::StateSet;

use crate::tree::{DescendantFocusability, ViewId, ViewTree, Visibility};
use crate::widget::ViewScope;

/// Where focus should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Feedback cue for a completed focus move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Click,
    NavigationLeft,
    NavigationUp,
    NavigationRight,
    NavigationDown,
}

impl SoundEffect {
    /// The navigation cue matching a focus move. Forward reads as down,
    /// backward as up.
    pub fn for_focus_direction(direction: FocusDirection) -> SoundEffect {
        match direction {
            FocusDirection::Right => SoundEffect::NavigationRight,
            FocusDirection::Forward | FocusDirection::Down => SoundEffect::NavigationDown,
            FocusDirection::Left => SoundEffect::NavigationLeft,
            FocusDirection::Backward | FocusDirection::Up => SoundEffect::NavigationUp,
        }
    }
}

impl ViewTree {
    /// The view currently holding focus, reached through the
    /// focused-child links from the root.
    pub fn focused_view(&self) -> Option<ViewId> {
        let mut current = self.root()?;
        loop {
            let node = self.node(current)?;
            if node.state.contains(StateSet::FOCUSED) {
                return Some(current);
            }
            current = node.group.focused_child?;
        }
    }

    pub fn is_focused(&self, id: ViewId) -> bool {
        self.state(id).contains(StateSet::FOCUSED)
    }

    /// True when `id` or one of its descendants holds focus.
    pub fn has_focus(&self, id: ViewId) -> bool {
        self.focus_is_within(id)
    }

    /// Tries to move focus to `id`, or into its subtree as its
    /// descendant-focusability directs. Returns whether focus landed
    /// anywhere under the request.
    pub fn request_focus(&mut self, id: ViewId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if node.children.is_empty() {
            return self.take_focus(id);
        }
        match node.group.descendant_focusability {
            DescendantFocusability::BlockDescendants => self.take_focus(id),
            DescendantFocusability::BeforeDescendants => {
                self.take_focus(id) || self.request_focus_in_descendants(id)
            }
            DescendantFocusability::AfterDescendants => {
                self.request_focus_in_descendants(id) || self.take_focus(id)
            }
        }
    }

    fn request_focus_in_descendants(&mut self, id: ViewId) -> bool {
        for child in self.children(id).to_vec() {
            if self.request_focus(child) {
                return true;
            }
        }
        false
    }

    fn take_focus(&mut self, id: ViewId) -> bool {
        if !self.can_take_focus(id) {
            return false;
        }
        if self.is_focused(id) {
            return true;
        }
        if let Some(old) = self.focused_view() {
            self.drop_focus(old);
        }
        if let Some(node) = self.node_mut(id) {
            node.state.insert(StateSet::FOCUSED);
        }
        // Point every ancestor at the path down to the new holder.
        let mut child = id;
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            let Some(node) = self.node_mut(ancestor) else {
                break;
            };
            node.group.focused_child = Some(child);
            current = node.parent;
            child = ancestor;
        }
        self.refresh_drawable_state(id);
        self.invalidate(id);
        crate::widget::with_widget(self, id, |widget, tree| {
            widget.on_focus_changed(&mut ViewScope::new(tree, id), true);
        });
        self.fire_focus_change_listeners(id, true);
        true
    }

    fn can_take_focus(&self, id: ViewId) -> bool {
        self.is_focusable(id)
            && self.visibility(id) == Visibility::Visible
            && self.is_enabled(id)
    }

    /// Gives up focus held by `id` or anything under it. Focus then rests
    /// nowhere until the next `request_focus`.
    pub fn clear_focus(&mut self, id: ViewId) {
        if !self.focus_is_within(id) {
            return;
        }
        if let Some(focused) = self.focused_view() {
            self.drop_focus(focused);
        }
    }

    fn drop_focus(&mut self, id: ViewId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if !node.state.contains(StateSet::FOCUSED) {
            return;
        }
        node.state.remove(StateSet::FOCUSED);
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            let Some(node) = self.node_mut(ancestor) else {
                break;
            };
            if node.group.focused_child.take().is_none() {
                break;
            }
            current = node.parent;
        }
        self.refresh_drawable_state(id);
        self.invalidate(id);
        crate::widget::with_widget(self, id, |widget, tree| {
            widget.on_focus_changed(&mut ViewScope::new(tree, id), false);
        });
        self.fire_focus_change_listeners(id, false);
    }

    /// Finds where focus should go when leaving `from` in `direction`.
    ///
    /// Directional moves pick the geometric best among candidates in that
    /// direction, preferring views inside the source's beam. Forward and
    /// backward step through tree order, wrapping at the ends.
    pub fn focus_search(&self, from: ViewId, direction: FocusDirection) -> Option<ViewId> {
        match direction {
            FocusDirection::Forward => self.next_in_tree_order(from, true),
            FocusDirection::Backward => self.next_in_tree_order(from, false),
            _ => self.nearest_in_direction(from, direction),
        }
    }

    fn next_in_tree_order(&self, from: ViewId, forward: bool) -> Option<ViewId> {
        let order = self.focus_targets();
        if order.is_empty() {
            return None;
        }
        let next = match (order.iter().position(|v| *v == from), forward) {
            (Some(i), true) => order[(i + 1) % order.len()],
            (Some(i), false) => order[(i + order.len() - 1) % order.len()],
            (None, true) => order[0],
            (None, false) => *order.last().unwrap(),
        };
        if next == from {
            None
        } else {
            Some(next)
        }
    }

    fn nearest_in_direction(&self, from: ViewId, direction: FocusDirection) -> Option<ViewId> {
        let source = self.bounds_in_window(from);
        let mut best: Option<(ViewId, Rect)> = None;
        for candidate in self.focus_targets() {
            if candidate == from {
                continue;
            }
            let rect = self.bounds_in_window(candidate);
            if !is_candidate(direction, source, rect) {
                continue;
            }
            best = Some(match best {
                None => (candidate, rect),
                Some(champion) if is_better_candidate(direction, source, rect, champion.1) => {
                    (candidate, rect)
                }
                Some(champion) => champion,
            });
        }
        best.map(|(id, _)| id)
    }

    /// Every view focus may land on, in tree order; containers slot
    /// themselves before or after their children as configured.
    fn focus_targets(&self) -> Vec<ViewId> {
        let mut out = Vec::new();
        if let Some(root) = self.root() {
            self.collect_focus_targets(root, &mut out);
        }
        out
    }

    fn collect_focus_targets(&self, id: ViewId, out: &mut Vec<ViewId>) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.visibility != Visibility::Visible {
            return;
        }
        match node.group.descendant_focusability {
            DescendantFocusability::BlockDescendants => {
                if self.can_take_focus(id) {
                    out.push(id);
                }
            }
            DescendantFocusability::BeforeDescendants => {
                if self.can_take_focus(id) {
                    out.push(id);
                }
                for child in &node.children {
                    self.collect_focus_targets(*child, out);
                }
            }
            DescendantFocusability::AfterDescendants => {
                for child in &node.children {
                    self.collect_focus_targets(*child, out);
                }
                if self.can_take_focus(id) {
                    out.push(id);
                }
            }
        }
    }
}

/// Whether `dest` lies at all in `direction` from `source`. Partial
/// overlap counts as long as the far edge makes progress.
fn is_candidate(direction: FocusDirection, source: Rect, dest: Rect) -> bool {
    match direction {
        FocusDirection::Left => {
            (source.right() > dest.right() || source.left >= dest.right())
                && source.left > dest.left
        }
        FocusDirection::Right => {
            (source.left < dest.left || source.right() <= dest.left)
                && source.right() < dest.right()
        }
        FocusDirection::Up => {
            (source.bottom() > dest.bottom() || source.top >= dest.bottom())
                && source.top > dest.top
        }
        FocusDirection::Down => {
            (source.top < dest.top || source.bottom() <= dest.top)
                && source.bottom() < dest.bottom()
        }
        FocusDirection::Forward | FocusDirection::Backward => false,
    }
}

/// Whether `other` overlaps the axis-aligned strip `source` projects in
/// the travel direction.
fn beams_overlap(direction: FocusDirection, source: Rect, other: Rect) -> bool {
    match direction {
        FocusDirection::Left | FocusDirection::Right => {
            other.bottom() > source.top && other.top < source.bottom()
        }
        FocusDirection::Up | FocusDirection::Down => {
            other.right() > source.left && other.left < source.right()
        }
        FocusDirection::Forward | FocusDirection::Backward => false,
    }
}

fn major_axis_distance(direction: FocusDirection, source: Rect, dest: Rect) -> i64 {
    let raw = match direction {
        FocusDirection::Left => source.left - dest.right(),
        FocusDirection::Right => dest.left - source.right(),
        FocusDirection::Up => source.top - dest.bottom(),
        FocusDirection::Down => dest.top - source.bottom(),
        FocusDirection::Forward | FocusDirection::Backward => 0,
    };
    raw.max(0) as i64
}

fn minor_axis_distance(direction: FocusDirection, source: Rect, dest: Rect) -> i64 {
    let delta = match direction {
        FocusDirection::Left | FocusDirection::Right => center_y(source) - center_y(dest),
        FocusDirection::Up | FocusDirection::Down => center_x(source) - center_x(dest),
        FocusDirection::Forward | FocusDirection::Backward => 0,
    };
    delta.unsigned_abs() as i64
}

/// Fault-weighted distance: being off to the side costs far more than
/// being further along the travel axis.
fn weighted_distance(direction: FocusDirection, source: Rect, dest: Rect) -> i64 {
    let major = major_axis_distance(direction, source, dest);
    let minor = minor_axis_distance(direction, source, dest);
    13 * major * major + minor * minor
}

/// True when `contender` should displace `champion`. Both are assumed to
/// have passed `is_candidate` already. Beam membership trumps distance.
fn is_better_candidate(
    direction: FocusDirection,
    source: Rect,
    contender: Rect,
    champion: Rect,
) -> bool {
    let contender_in_beam = beams_overlap(direction, source, contender);
    let champion_in_beam = beams_overlap(direction, source, champion);
    if contender_in_beam != champion_in_beam {
        return contender_in_beam;
    }
    weighted_distance(direction, source, contender) < weighted_distance(direction, source, champion)
}

fn center_x(rect: Rect) -> i32 {
    rect.left + rect.width / 2
}

fn center_y(rect: Rect) -> i32 {
    rect.top + rect.height / 2
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use trellis_geometry::Rect;

    use super::{FocusDirection, SoundEffect};
    use crate::tree::{DescendantFocusability, ViewId, ViewTree, Visibility};
    use crate::widget::EmptyWidget;

    fn focusable(tree: &mut ViewTree) -> ViewId {
        let id = tree.create_view(Box::new(EmptyWidget));
        tree.set_focusable(id, true);
        id
    }

    fn place(tree: &mut ViewTree, id: ViewId, frame: Rect) {
        tree.node_mut(id).unwrap().frame = frame;
    }

    /// Root with four focusable tiles laid out in a 2x2 grid.
    fn grid() -> (ViewTree, [ViewId; 4]) {
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        tree.set_root(root).unwrap();
        place(&mut tree, root, Rect::new(0, 0, 300, 300));
        let mut tiles = [root; 4];
        for (i, tile) in tiles.iter_mut().enumerate() {
            *tile = focusable(&mut tree);
            tree.add_child(root, *tile).unwrap();
            let x = (i % 2) as i32 * 150;
            let y = (i / 2) as i32 * 150;
            place(&mut tree, *tile, Rect::new(x, y, 50, 50));
        }
        (tree, tiles)
    }

    #[test]
    fn request_focus_moves_focus_and_notifies_both_sides() {
        let (mut tree, tiles) = grid();
        let events: Rc<RefCell<Vec<(ViewId, bool)>>> = Rc::new(RefCell::new(Vec::new()));
        for tile in tiles {
            let sink = events.clone();
            tree.add_focus_change_listener(tile, move |_, id, gained| {
                sink.borrow_mut().push((id, gained));
            });
        }

        assert!(tree.request_focus(tiles[0]));
        assert_eq!(tree.focused_view(), Some(tiles[0]));
        assert!(tree.is_focused(tiles[0]));

        assert!(tree.request_focus(tiles[3]));
        assert_eq!(tree.focused_view(), Some(tiles[3]));
        assert!(!tree.is_focused(tiles[0]));
        assert_eq!(
            &*events.borrow(),
            &[(tiles[0], true), (tiles[0], false), (tiles[3], true)]
        );
    }

    #[test]
    fn request_focus_fails_on_unfocusable_and_invisible_views() {
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        tree.set_root(root).unwrap();
        let plain = tree.create_view(Box::new(EmptyWidget));
        tree.add_child(root, plain).unwrap();
        assert!(!tree.request_focus(plain));

        let hidden = focusable(&mut tree);
        tree.add_child(root, hidden).unwrap();
        tree.set_visibility(hidden, Visibility::Invisible);
        assert!(!tree.request_focus(hidden));
        assert_eq!(tree.focused_view(), None);
    }

    #[test]
    fn descendant_focusability_steers_container_requests() {
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        tree.set_root(root).unwrap();
        let container = focusable(&mut tree);
        tree.add_child(root, container).unwrap();
        let inner = focusable(&mut tree);
        tree.add_child(container, inner).unwrap();

        tree.set_descendant_focusability(container, DescendantFocusability::AfterDescendants);
        assert!(tree.request_focus(container));
        assert_eq!(tree.focused_view(), Some(inner));

        tree.set_descendant_focusability(container, DescendantFocusability::BlockDescendants);
        assert!(tree.request_focus(container));
        assert_eq!(tree.focused_view(), Some(container));
    }

    #[test]
    fn clearing_an_ancestor_clears_the_focused_descendant() {
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        tree.set_root(root).unwrap();
        let panel = tree.create_view(Box::new(EmptyWidget));
        tree.add_child(root, panel).unwrap();
        let leaf = focusable(&mut tree);
        tree.add_child(panel, leaf).unwrap();

        tree.request_focus(leaf);
        assert!(tree.has_focus(panel));
        tree.clear_focus(panel);
        assert_eq!(tree.focused_view(), None);
        assert!(!tree.is_focused(leaf));
    }

    #[test]
    fn removing_the_focused_subtree_drops_focus() {
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        tree.set_root(root).unwrap();
        let panel = tree.create_view(Box::new(EmptyWidget));
        tree.add_child(root, panel).unwrap();
        let leaf = focusable(&mut tree);
        tree.add_child(panel, leaf).unwrap();

        tree.request_focus(leaf);
        tree.remove_child(root, panel).unwrap();
        assert_eq!(tree.focused_view(), None);
    }

    #[test]
    fn directional_search_moves_through_the_grid() {
        let (mut tree, tiles) = grid();
        tree.request_focus(tiles[0]);

        assert_eq!(
            tree.focus_search(tiles[0], FocusDirection::Right),
            Some(tiles[1])
        );
        assert_eq!(
            tree.focus_search(tiles[0], FocusDirection::Down),
            Some(tiles[2])
        );
        assert_eq!(
            tree.focus_search(tiles[3], FocusDirection::Left),
            Some(tiles[2])
        );
        assert_eq!(
            tree.focus_search(tiles[3], FocusDirection::Up),
            Some(tiles[1])
        );
        assert_eq!(tree.focus_search(tiles[1], FocusDirection::Right), None);
    }

    #[test]
    fn beam_membership_beats_raw_distance() {
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        tree.set_root(root).unwrap();
        place(&mut tree, root, Rect::new(0, 0, 400, 400));
        let source = focusable(&mut tree);
        let aligned = focusable(&mut tree);
        let nearer = focusable(&mut tree);
        for id in [source, aligned, nearer] {
            tree.add_child(root, id).unwrap();
        }
        place(&mut tree, source, Rect::new(0, 0, 50, 50));
        // Horizontally aligned but further away than the diagonal one.
        place(&mut tree, aligned, Rect::new(100, 0, 50, 50));
        place(&mut tree, nearer, Rect::new(60, 60, 50, 50));

        assert_eq!(
            tree.focus_search(source, FocusDirection::Right),
            Some(aligned)
        );
    }

    #[test]
    fn tab_order_wraps_and_respects_after_descendants() {
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        tree.set_root(root).unwrap();
        let container = focusable(&mut tree);
        tree.add_child(root, container).unwrap();
        tree.set_descendant_focusability(container, DescendantFocusability::AfterDescendants);
        let first = focusable(&mut tree);
        let second = focusable(&mut tree);
        tree.add_child(container, first).unwrap();
        tree.add_child(container, second).unwrap();

        assert_eq!(
            tree.focus_search(first, FocusDirection::Forward),
            Some(second)
        );
        assert_eq!(
            tree.focus_search(second, FocusDirection::Forward),
            Some(container)
        );
        assert_eq!(
            tree.focus_search(container, FocusDirection::Forward),
            Some(first)
        );
        assert_eq!(
            tree.focus_search(first, FocusDirection::Backward),
            Some(container)
        );
    }

    #[test]
    fn hidden_subtrees_are_not_searched() {
        let (mut tree, tiles) = grid();
        tree.set_visibility(tiles[1], Visibility::Gone);
        // The diagonal tile is the only rightward candidate left.
        assert_eq!(
            tree.focus_search(tiles[0], FocusDirection::Right),
            Some(tiles[3])
        );
        assert_eq!(
            tree.focus_search(tiles[0], FocusDirection::Forward),
            Some(tiles[2])
        );
    }

    #[test]
    fn navigation_sounds_follow_the_direction() {
        assert_eq!(
            SoundEffect::for_focus_direction(FocusDirection::Forward),
            SoundEffect::NavigationDown
        );
        assert_eq!(
            SoundEffect::for_focus_direction(FocusDirection::Backward),
            SoundEffect::NavigationUp
        );
        assert_eq!(
            SoundEffect::for_focus_direction(FocusDirection::Left),
            SoundEffect::NavigationLeft
        );
    }
}
