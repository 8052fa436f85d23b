//! Damage tracking: which pixels the next frame has to repaint.
//!
//! An invalidation starts as a rect in the view's own coordinates and is
//! mapped upward level by level: through the view's render transform,
//! into the parent's space (honoring position and scroll), clipped to the
//! parent when it clips children. What survives at the root lands in the
//! window damage region.

use trellis_geometry::{Rect, Region};

use crate::tree::{NodeFlags, ViewId, ViewTree, Visibility};

impl ViewTree {
    /// Schedules a repaint of the view's whole bounds.
    pub fn invalidate(&mut self, id: ViewId) {
        let Some(node) = self.node(id) else {
            return;
        };
        let local = Rect::new(0, 0, node.frame.width, node.frame.height);
        self.invalidate_rect(id, local);
    }

    /// Schedules a repaint of `rect`, given in the view's own coordinate
    /// space. Anything outside the view's bounds is dropped.
    ///
    /// Calls arriving while a draw pass is running are deferred: the view
    /// is queued and re-invalidated after the frame, so a widget animating
    /// from its draw hook repaints once per frame instead of recursing.
    pub fn invalidate_rect(&mut self, id: ViewId, rect: Rect) {
        if self.in_draw {
            if self.contains(id) {
                self.pending_redraws.insert(id);
            }
            return;
        }
        let Some(node) = self.node(id) else {
            return;
        };
        if node.visibility != Visibility::Visible {
            return;
        }
        let own = Rect::new(0, 0, node.frame.width, node.frame.height);
        let mut dirty = rect.intersection(&own);
        if dirty.is_empty() {
            return;
        }
        if let Some(node) = self.node_mut(id) {
            node.flags.insert(NodeFlags::DIRTY);
        }

        let mut current = id;
        loop {
            let (transform, frame, parent_id) = match self.node(current) {
                Some(n) => (n.transform, n.frame, n.parent),
                None => return,
            };
            if !transform.is_identity() {
                dirty = transform.to_matrix().map_rect(dirty);
            }
            let Some(parent_id) = parent_id else {
                // Detached subtrees have no pixels on screen.
                if self.root() == Some(current) {
                    self.damage.add(dirty.offset(frame.left, frame.top));
                }
                return;
            };
            let (p_visible, p_clips, p_bounds, p_scroll) = match self.node(parent_id) {
                Some(p) => (
                    p.visibility == Visibility::Visible,
                    p.group.clip_children,
                    Rect::new(0, 0, p.frame.width, p.frame.height),
                    (p.scroll_x, p.scroll_y),
                ),
                None => return,
            };
            if !p_visible {
                return;
            }
            dirty = dirty.offset(frame.left - p_scroll.0, frame.top - p_scroll.1);
            if p_clips {
                dirty = dirty.intersection(&p_bounds);
                if dirty.is_empty() {
                    return;
                }
            }
            current = parent_id;
        }
    }

    /// Whether the view or anything under it awaits a repaint.
    pub fn is_dirty(&self, id: ViewId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        node.flags.contains(NodeFlags::DIRTY) || node.children.iter().any(|c| self.is_dirty(*c))
    }

    pub fn damage(&self) -> &Region {
        &self.damage
    }

    pub fn has_damage(&self) -> bool {
        !self.damage.is_empty()
    }

    /// Hands the accumulated damage to the caller, leaving the tree
    /// clean for the next round of invalidations.
    pub fn take_damage(&mut self) -> Region {
        std::mem::take(&mut self.damage)
    }

    /// Queues a repaint of the view for the frame after the current one,
    /// leaving this frame's damage untouched. The deferred-invalidate
    /// path taken by draw hooks lands here too, so a caller scheduling
    /// an animation step gets the same once-per-frame limit.
    pub fn request_redraw_on_next_frame(&mut self, id: ViewId) {
        if self.contains(id) {
            self.pending_redraws.insert(id);
        }
    }

    pub fn has_pending_redraws(&self) -> bool {
        !self.pending_redraws.is_empty()
    }

    /// Views whose draw-time invalidations were deferred, in arrival
    /// order, each at most once.
    pub fn take_pending_redraws(&mut self) -> Vec<ViewId> {
        self.pending_redraws.drain(..).collect()
    }

    /// Re-issues the invalidations deferred during the last draw pass.
    /// The frame loop calls this after presenting, so the repaints land
    /// in the following frame.
    pub fn flush_deferred_invalidates(&mut self) {
        for id in self.take_pending_redraws() {
            self.invalidate(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use trellis_geometry::Rect;
    use trellis_render::Transform;

    use crate::tree::{ViewId, ViewTree, Visibility};
    use crate::widget::EmptyWidget;

    fn tree_with_child(child_frame: Rect) -> (ViewTree, ViewId, ViewId) {
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        let child = tree.create_view(Box::new(EmptyWidget));
        tree.set_root(root).unwrap();
        tree.add_child(root, child).unwrap();
        tree.node_mut(root).unwrap().frame = Rect::new(0, 0, 400, 300);
        tree.node_mut(child).unwrap().frame = child_frame;
        tree.take_damage();
        (tree, root, child)
    }

    #[test]
    fn child_damage_lands_in_window_coordinates() {
        let (mut tree, _, child) = tree_with_child(Rect::new(50, 60, 100, 80));
        tree.invalidate(child);
        assert_eq!(tree.damage().bounds(), Rect::new(50, 60, 100, 80));
        assert!(tree.is_dirty(child));
    }

    #[test]
    fn ancestor_scroll_shifts_damage() {
        let (mut tree, root, child) = tree_with_child(Rect::new(50, 60, 100, 80));
        tree.node_mut(root).unwrap().scroll_y = 25;
        tree.invalidate(child);
        assert_eq!(tree.damage().bounds(), Rect::new(50, 35, 100, 80));
    }

    #[test]
    fn clipping_parent_trims_overhanging_damage() {
        let (mut tree, _, child) = tree_with_child(Rect::new(350, 0, 100, 50));
        tree.invalidate(child);
        // Only the 50px inside the root survive.
        assert_eq!(tree.damage().bounds(), Rect::new(350, 0, 50, 50));
    }

    #[test]
    fn non_clipping_parent_keeps_overhang() {
        let (mut tree, root, child) = tree_with_child(Rect::new(350, 0, 100, 50));
        tree.set_clip_children(root, false);
        tree.take_damage();
        tree.invalidate(child);
        assert_eq!(tree.damage().bounds(), Rect::new(350, 0, 100, 50));
    }

    #[test]
    fn transform_scales_the_damaged_area() {
        let (mut tree, _, child) = tree_with_child(Rect::new(10, 10, 20, 20));
        tree.node_mut(child).unwrap().transform = Transform {
            scale_x: 2.0,
            scale_y: 2.0,
            ..Transform::default()
        };
        tree.invalidate(child);
        // Scaled about the origin, then offset by the frame position.
        assert_eq!(tree.damage().bounds(), Rect::new(10, 10, 40, 40));
    }

    #[test]
    fn sibling_damage_stays_disjoint() {
        let mut tree = ViewTree::new();
        let root = tree.create_view(Box::new(EmptyWidget));
        let a = tree.create_view(Box::new(EmptyWidget));
        let b = tree.create_view(Box::new(EmptyWidget));
        tree.set_root(root).unwrap();
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.node_mut(root).unwrap().frame = Rect::new(0, 0, 400, 300);
        tree.node_mut(a).unwrap().frame = Rect::new(0, 0, 50, 50);
        tree.node_mut(b).unwrap().frame = Rect::new(200, 200, 50, 50);
        tree.take_damage();

        tree.invalidate(a);
        tree.invalidate(b);
        assert_eq!(tree.damage().len(), 2);
        assert_eq!(tree.damage().area(), 5000);
    }

    #[test]
    fn invisible_views_produce_no_damage() {
        let (mut tree, _, child) = tree_with_child(Rect::new(0, 0, 50, 50));
        tree.set_visibility(child, Visibility::Invisible);
        tree.take_damage();
        tree.invalidate(child);
        assert!(!tree.has_damage());
    }

    #[test]
    fn draw_time_invalidation_is_deferred_and_deduplicated() {
        let (mut tree, _, child) = tree_with_child(Rect::new(10, 10, 30, 30));
        tree.in_draw = true;
        tree.invalidate(child);
        tree.invalidate(child);
        assert!(!tree.has_damage());
        assert!(tree.has_pending_redraws());

        tree.in_draw = false;
        tree.flush_deferred_invalidates();
        assert!(!tree.has_pending_redraws());
        assert_eq!(tree.damage().bounds(), Rect::new(10, 10, 30, 30));
        assert_eq!(tree.damage().len(), 1);
    }
}
