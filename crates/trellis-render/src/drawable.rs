use std::rc::Rc;

use trellis_geometry::Rect;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::state::StateSet;

/// Something that can paint itself into given bounds.
///
/// Drawables created from the same [`ConstantState`] share their immutable
/// configuration through an `Rc`; per-instance bits (current color choice,
/// bounds) stay in the drawable itself.
pub trait Drawable {
    fn draw(&mut self, canvas: &mut dyn Canvas, bounds: Rect);

    /// Reacts to the owning view's interaction state. Returns true when
    /// the appearance changed and the owner should repaint.
    fn set_state(&mut self, _state: StateSet) -> bool {
        false
    }

    fn is_stateful(&self) -> bool {
        false
    }

    /// Natural width in pixels, or -1 when the drawable scales to any.
    fn intrinsic_width(&self) -> i32 {
        -1
    }

    fn intrinsic_height(&self) -> i32 {
        -1
    }

    fn constant_state(&self) -> Option<Rc<dyn ConstantState>> {
        None
    }
}

/// Shared immutable configuration behind one or more drawables.
pub trait ConstantState {
    fn new_drawable(self: Rc<Self>) -> Box<dyn Drawable>;
}

struct ColorState {
    color: Color,
}

impl ConstantState for ColorState {
    fn new_drawable(self: Rc<Self>) -> Box<dyn Drawable> {
        Box::new(ColorDrawable { state: self })
    }
}

/// Fills its bounds with a single color.
pub struct ColorDrawable {
    state: Rc<ColorState>,
}

impl ColorDrawable {
    pub fn new(color: Color) -> Self {
        Self {
            state: Rc::new(ColorState { color }),
        }
    }

    pub fn color(&self) -> Color {
        self.state.color
    }
}

impl Drawable for ColorDrawable {
    fn draw(&mut self, canvas: &mut dyn Canvas, bounds: Rect) {
        if self.state.color.alpha() != 0 {
            canvas.fill_rect(bounds, self.state.color);
        }
    }

    fn constant_state(&self) -> Option<Rc<dyn ConstantState>> {
        Some(self.state.clone())
    }
}

struct StateColorState {
    entries: Vec<(StateSet, Color)>,
    fallback: Color,
}

impl StateColorState {
    fn select(&self, state: StateSet) -> Color {
        self.entries
            .iter()
            .find(|(required, _)| state.contains(*required))
            .map(|(_, color)| *color)
            .unwrap_or(self.fallback)
    }
}

impl ConstantState for StateColorState {
    fn new_drawable(self: Rc<Self>) -> Box<dyn Drawable> {
        let current = self.fallback;
        Box::new(StateColorDrawable {
            state: self,
            current,
        })
    }
}

/// Picks a fill color by interaction state: the first entry whose required
/// bits are all present wins, so more specific entries go first.
pub struct StateColorDrawable {
    state: Rc<StateColorState>,
    current: Color,
}

impl StateColorDrawable {
    pub fn new(entries: Vec<(StateSet, Color)>, fallback: Color) -> Self {
        Self {
            state: Rc::new(StateColorState { entries, fallback }),
            current: fallback,
        }
    }

    pub fn current_color(&self) -> Color {
        self.current
    }
}

impl Drawable for StateColorDrawable {
    fn draw(&mut self, canvas: &mut dyn Canvas, bounds: Rect) {
        if self.current.alpha() != 0 {
            canvas.fill_rect(bounds, self.current);
        }
    }

    fn set_state(&mut self, state: StateSet) -> bool {
        let next = self.state.select(state);
        let changed = next != self.current;
        self.current = next;
        changed
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn constant_state(&self) -> Option<Rc<dyn ConstantState>> {
        Some(self.state.clone())
    }
}
