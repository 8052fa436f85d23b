use std::cell::RefCell;
use std::rc::Rc;

use trellis_geometry::{Rect, Region, Size};
use trellis_render::{Canvas, Color, Surface};

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Save,
    Restore,
    Translate(f32, f32),
    Scale(f32, f32),
    Rotate(f32),
    Clip(Rect),
    Fill(Rect, Color),
}

/// Canvas that records every call instead of painting.
///
/// Clones share one log, which is how a test keeps a handle on the
/// canvas after moving it into the code under test.
#[derive(Clone, Default)]
pub struct RecordingCanvas {
    ops: Rc<RefCell<Vec<CanvasOp>>>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<CanvasOp> {
        self.ops.borrow().clone()
    }

    /// Just the fills, in draw order.
    pub fn fills(&self) -> Vec<(Rect, Color)> {
        self.ops
            .borrow()
            .iter()
            .filter_map(|op| match op {
                CanvasOp::Fill(rect, color) => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.ops.borrow_mut().clear();
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.ops.borrow_mut().push(CanvasOp::Save);
    }

    fn restore(&mut self) {
        self.ops.borrow_mut().push(CanvasOp::Restore);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.ops.borrow_mut().push(CanvasOp::Translate(dx, dy));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.ops.borrow_mut().push(CanvasOp::Scale(sx, sy));
    }

    fn rotate(&mut self, degrees: f32) {
        self.ops.borrow_mut().push(CanvasOp::Rotate(degrees));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.ops.borrow_mut().push(CanvasOp::Clip(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.borrow_mut().push(CanvasOp::Fill(rect, color));
    }
}

/// In-memory surface for pipeline tests. Draws collect in a
/// [`RecordingCanvas`]; every flip keeps its damage region.
pub struct TestSurface {
    size: Size,
    canvas: RecordingCanvas,
    flips: Rc<RefCell<Vec<Region>>>,
}

impl TestSurface {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            size: Size::new(width, height),
            canvas: RecordingCanvas::new(),
            flips: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Handle that stays usable after the surface moves into a window.
    pub fn probe(&self) -> SurfaceProbe {
        SurfaceProbe {
            canvas: self.canvas.clone(),
            flips: self.flips.clone(),
        }
    }
}

impl Surface for TestSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn canvas(&mut self) -> &mut dyn Canvas {
        &mut self.canvas
    }

    fn flip(&mut self, damage: &Region) {
        self.flips.borrow_mut().push(damage.clone());
    }
}

/// What a [`TestSurface`] saw: the draw log plus one region per flip.
#[derive(Clone)]
pub struct SurfaceProbe {
    canvas: RecordingCanvas,
    flips: Rc<RefCell<Vec<Region>>>,
}

impl SurfaceProbe {
    pub fn ops(&self) -> Vec<CanvasOp> {
        self.canvas.ops()
    }

    pub fn fills(&self) -> Vec<(Rect, Color)> {
        self.canvas.fills()
    }

    pub fn flips(&self) -> Vec<Region> {
        self.flips.borrow().clone()
    }

    pub fn clear(&self) {
        self.canvas.clear();
        self.flips.borrow_mut().clear();
    }
}
