//! Rendering contracts the view tree draws through.
//!
//! The toolkit core never touches pixels. It paints into a [`Canvas`]
//! implementation, presents through a [`Surface`], and delegates styled
//! painting to [`Drawable`] objects. Renderer backends implement these
//! traits; everything in this crate besides the two small concrete
//! drawables is interface.

mod canvas;
mod color;
mod drawable;
mod state;
mod surface;
mod transform;

pub use canvas::Canvas;
pub use color::Color;
pub use drawable::{ColorDrawable, ConstantState, Drawable, StateColorDrawable};
pub use state::StateSet;
pub use surface::Surface;
pub use transform::{Matrix, Transform};
