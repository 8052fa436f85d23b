//! Integer geometry shared by the layout, render and view crates.
//!
//! Everything here is a plain value type. Coordinates are pixels with the
//! origin at the top-left corner; `right`/`bottom` edges are exclusive.

/// A point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// An axis-aligned rectangle stored as origin plus extent.
///
/// A rect with non-positive width or height is empty; empty rects are
/// absorbing for [`Rect::intersect`] and neutral for [`Rect::union`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Builds a rect from two edges instead of an extent.
    pub const fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub const fn center_x(&self) -> i32 {
        self.left + self.width / 2
    }

    pub const fn center_y(&self) -> i32 {
        self.top + self.height / 2
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        !other.is_empty()
            && other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// True when the interiors overlap. Rects sharing only an edge do not
    /// intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    /// Overlap of the two rects; empty when they are disjoint.
    pub fn intersection(&self, other: &Rect) -> Rect {
        if !self.intersects(other) {
            return Rect::default();
        }
        Rect::from_edges(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        )
    }

    /// Smallest rect covering both inputs; an empty side is ignored.
    pub fn union(&self, other: Rect) -> Rect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::from_edges(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.width, self.height)
    }

    /// Shrinks (positive insets) or grows (negative) every edge.
    pub fn inset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.left + dx,
            self.top + dy,
            self.width - 2 * dx,
            self.height - 2 * dy,
        )
    }
}

/// An accumulated dirty area: a set of pairwise non-overlapping rects.
///
/// Adding a rect that overlaps existing spans merges them into their
/// bounding box, so the region always covers at least everything added to
/// it while keeping the span count bounded.
#[derive(Debug, Clone, Default)]
pub struct Region {
    spans: Vec<Rect>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// Unions `rect` into the region, coalescing with every span it
    /// overlaps. Empty rects are ignored.
    pub fn add(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let mut pending = rect;
        loop {
            let overlap = self.spans.iter().position(|s| s.intersects(&pending));
            match overlap {
                Some(i) => pending = self.spans.swap_remove(i).union(pending),
                None => break,
            }
        }
        self.spans.push(pending);
    }

    pub fn add_region(&mut self, other: &Region) {
        for span in &other.spans {
            self.add(*span);
        }
    }

    /// True when any span overlaps `rect`.
    pub fn intersects(&self, rect: &Rect) -> bool {
        self.spans.iter().any(|s| s.intersects(rect))
    }

    /// True when a single span fully covers `rect`.
    pub fn contains_rect(&self, rect: &Rect) -> bool {
        self.spans.iter().any(|s| s.contains_rect(rect))
    }

    /// Bounding box of the whole region; empty when the region is empty.
    pub fn bounds(&self) -> Rect {
        self.spans
            .iter()
            .fold(Rect::default(), |acc, s| acc.union(*s))
    }

    /// Total covered area. Spans never overlap, so this is exact.
    pub fn area(&self) -> i64 {
        self.spans.iter().map(Rect::area).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        self.spans.iter()
    }

    pub fn offset(&mut self, dx: i32, dy: i32) {
        for span in &mut self.spans {
            *span = span.offset(dx, dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_and_emptiness() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
        assert!(!r.is_empty());
        assert!(Rect::new(0, 0, 0, 10).is_empty());
        assert!(Rect::new(0, 0, 10, -1).is_empty());
    }

    #[test]
    fn contains_is_exclusive_on_far_edges() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains(0, 0));
        assert!(r.contains(9, 9));
        assert!(!r.contains(10, 9));
        assert!(!r.contains(9, 10));
    }

    #[test]
    fn intersection_of_disjoint_is_empty() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 0, 10, 10);
        assert!(!a.intersects(&b));
        assert!(a.intersection(&b).is_empty());
    }

    #[test]
    fn edge_adjacent_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn union_ignores_empty_side() {
        let a = Rect::new(5, 5, 10, 10);
        assert_eq!(a.union(Rect::default()), a);
        assert_eq!(Rect::default().union(a), a);
    }

    #[test]
    fn region_keeps_disjoint_spans_separate() {
        let mut region = Region::new();
        region.add(Rect::new(0, 0, 10, 10));
        region.add(Rect::new(50, 50, 10, 10));
        assert_eq!(region.len(), 2);
        assert_eq!(region.area(), 200);
        assert!(region.contains_rect(&Rect::new(0, 0, 10, 10)));
        assert!(region.contains_rect(&Rect::new(50, 50, 10, 10)));
    }

    #[test]
    fn region_coalesces_overlapping_spans() {
        let mut region = Region::new();
        region.add(Rect::new(0, 0, 10, 10));
        region.add(Rect::new(5, 5, 10, 10));
        assert_eq!(region.len(), 1);
        let merged = region.bounds();
        assert_eq!(merged, Rect::new(0, 0, 15, 15));
    }

    #[test]
    fn region_chain_merge_collapses_transitively() {
        let mut region = Region::new();
        region.add(Rect::new(0, 0, 10, 10));
        region.add(Rect::new(20, 0, 10, 10));
        assert_eq!(region.len(), 2);
        // Bridges both existing spans, so all three collapse into one.
        region.add(Rect::new(5, 0, 20, 10));
        assert_eq!(region.len(), 1);
        assert_eq!(region.bounds(), Rect::new(0, 0, 30, 10));
    }

    #[test]
    fn region_area_covers_every_added_rect() {
        let mut region = Region::new();
        let rects = [
            Rect::new(0, 0, 8, 8),
            Rect::new(4, 4, 8, 8),
            Rect::new(30, 30, 5, 5),
        ];
        for r in rects {
            region.add(r);
        }
        for r in rects {
            assert!(region.area() >= r.area());
            assert!(region.intersects(&r));
        }
    }

    #[test]
    fn region_ignores_empty_rects() {
        let mut region = Region::new();
        region.add(Rect::default());
        region.add(Rect::new(3, 3, 0, 5));
        assert!(region.is_empty());
    }
}
