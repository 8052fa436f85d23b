use trellis_geometry::{Region, Size};

use crate::canvas::Canvas;

/// The presentation target a window draws into.
///
/// One frame is: paint through [`Surface::canvas`], then [`Surface::flip`]
/// with the damage that was painted. Backends with a separate composition
/// step report it through [`Surface::needs_compose`] and get
/// [`Surface::compose`] called from the frame loop.
pub trait Surface {
    fn size(&self) -> Size;

    fn canvas(&mut self) -> &mut dyn Canvas;

    /// Presents the painted damage. The region is in surface coordinates.
    fn flip(&mut self, damage: &Region);

    fn needs_compose(&self) -> bool {
        false
    }

    fn compose(&mut self) {}
}
