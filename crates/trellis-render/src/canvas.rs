use trellis_geometry::Rect;

use crate::color::Color;

/// The painting surface handed down the view tree during a draw pass.
///
/// Implementations keep a state stack: `save` snapshots the current
/// transform and clip, `restore` pops back to the matching snapshot. All
/// coordinates are in the canvas's current local space.
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn scale(&mut self, sx: f32, sy: f32);
    /// Rotates about the current origin, degrees clockwise.
    fn rotate(&mut self, degrees: f32);
    /// Intersects the clip with `rect`; later draws outside it are
    /// discarded.
    fn clip_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Color);
}
