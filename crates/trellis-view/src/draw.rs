//! The draw walk: paints every view overlapping the frame's damage into
//! the window canvas, front of the child list first so later children
//! cover earlier ones.

use trellis_geometry::{Point, Rect, Region};
use trellis_render::Canvas;

use crate::tree::{NodeFlags, ViewId, ViewTree, Visibility};
use crate::widget::ViewScope;

impl ViewTree {
    /// Paints everything under the root that overlaps `damage`.
    ///
    /// Pixels outside the damage are left untouched, so the canvas keeps
    /// the previous frame there. Invalidations issued by draw hooks are
    /// queued instead of mutating the damage mid-walk; see
    /// [`ViewTree::flush_deferred_invalidates`].
    pub fn draw(&mut self, canvas: &mut dyn Canvas, damage: &Region) {
        let Some(root) = self.root() else {
            return;
        };
        if damage.is_empty() {
            return;
        }
        self.in_draw = true;
        self.draw_view(root, canvas, damage, Point::new(0, 0), true);
        self.in_draw = false;
    }

    /// `origin` is the window position of the parent's content space;
    /// `cull` is false once any ancestor carried a render transform, at
    /// which point frame rects stop predicting window coverage.
    fn draw_view(
        &mut self,
        id: ViewId,
        canvas: &mut dyn Canvas,
        damage: &Region,
        origin: Point,
        cull: bool,
    ) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.visibility != Visibility::Visible {
            return;
        }
        let frame = node.frame;
        let transform = node.transform;
        let clip_children = node.group.clip_children;
        let has_children = !node.children.is_empty();
        let (scroll_x, scroll_y) = (node.scroll_x, node.scroll_y);

        // A clipping view (or a childless one) covers exactly its frame,
        // so a frame outside the damage means the whole subtree is clean.
        let subtree_bounded = clip_children || !has_children;
        if frame.is_empty() && subtree_bounded {
            return;
        }
        let window_rect = frame.offset(origin.x, origin.y);
        if cull && transform.is_identity() && subtree_bounded && !damage.intersects(&window_rect) {
            return;
        }
        let child_cull = cull && transform.is_identity();

        canvas.save();
        canvas.translate(frame.left as f32, frame.top as f32);
        if !transform.is_identity() {
            canvas.translate(transform.translation_x, transform.translation_y);
            if transform.rotation != 0.0 || transform.scale_x != 1.0 || transform.scale_y != 1.0 {
                canvas.translate(transform.pivot_x, transform.pivot_y);
                canvas.rotate(transform.rotation);
                canvas.scale(transform.scale_x, transform.scale_y);
                canvas.translate(-transform.pivot_x, -transform.pivot_y);
            }
        }

        let bounds = Rect::new(0, 0, frame.width, frame.height);
        if let Some(mut background) = self.node_mut(id).and_then(|n| n.background.take()) {
            background.draw(canvas, bounds);
            if let Some(node) = self.node_mut(id) {
                node.background = Some(background);
            }
        }

        crate::widget::with_widget(self, id, |widget, tree| {
            widget.on_draw(&mut ViewScope::new(tree, id), canvas);
        });

        if has_children {
            canvas.save();
            if clip_children {
                canvas.clip_rect(bounds);
            }
            canvas.translate(-(scroll_x as f32), -(scroll_y as f32));
            let child_origin = Point::new(
                origin.x + frame.left - scroll_x,
                origin.y + frame.top - scroll_y,
            );
            for child in self.children(id).to_vec() {
                self.draw_view(child, canvas, damage, child_origin, child_cull);
            }
            canvas.restore();
        }
        canvas.restore();

        if let Some(node) = self.node_mut(id) {
            node.flags.remove(NodeFlags::DIRTY);
        }
    }
}
