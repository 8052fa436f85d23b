//! The measurement vocabulary of the toolkit: packed measure specs handed
//! from parent to child, the packed measured-size results handed back, and
//! the layout parameters a child attaches to request a size from its parent.

mod measure;
mod params;

pub use measure::{
    child_measure_spec, combine_measured_states, resolve_size, resolve_size_and_state,
    MeasureMode, MeasureSpec, MEASURED_SIZE_MASK, MEASURED_STATE_MASK, MEASURED_STATE_TOO_SMALL,
};
pub use params::{
    LayoutDirection, LayoutParams, Margins, MATCH_PARENT, UNDEFINED_MARGIN, WRAP_CONTENT,
};
