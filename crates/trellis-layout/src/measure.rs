use crate::params::{MATCH_PARENT, WRAP_CONTENT};

const MODE_SHIFT: u32 = 30;
const MODE_MASK: u32 = 0x3 << MODE_SHIFT;

/// How a parent constrains one axis of a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureMode {
    /// The parent imposes nothing; the child may be any size it wants.
    Unspecified = 0,
    /// The parent has decided the exact size.
    Exactly = 1,
    /// The child may be any size up to the given bound.
    AtMost = 2,
}

/// A `(mode, size)` pair packed into one word: the two high bits carry the
/// mode, the low 30 bits the size.
///
/// Sizes wider than 30 bits are silently truncated by the packing, the same
/// way oversized requests degrade on the platforms this models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureSpec(u32);

impl MeasureSpec {
    pub fn new(mode: MeasureMode, size: i32) -> Self {
        Self(((mode as u32) << MODE_SHIFT) | (size as u32 & !MODE_MASK))
    }

    pub fn unspecified(size: i32) -> Self {
        Self::new(MeasureMode::Unspecified, size)
    }

    pub fn exactly(size: i32) -> Self {
        Self::new(MeasureMode::Exactly, size)
    }

    pub fn at_most(size: i32) -> Self {
        Self::new(MeasureMode::AtMost, size)
    }

    pub fn mode(self) -> MeasureMode {
        match self.0 >> MODE_SHIFT {
            1 => MeasureMode::Exactly,
            2 => MeasureMode::AtMost,
            _ => MeasureMode::Unspecified,
        }
    }

    pub fn size(self) -> i32 {
        (self.0 & !MODE_MASK) as i32
    }
}

/// Bits of a packed measured dimension that carry the size.
pub const MEASURED_SIZE_MASK: i32 = 0x00ff_ffff;
/// Bits of a packed measured dimension that carry state flags.
pub const MEASURED_STATE_MASK: i32 = 0xff00_0000u32 as i32;
/// Set when the parent's bound forced the child smaller than it wanted.
pub const MEASURED_STATE_TOO_SMALL: i32 = 0x0100_0000;

/// Reconciles a view's desired size with the spec its parent imposed.
///
/// `Exactly` always wins; `AtMost` caps the desired size and flags
/// [`MEASURED_STATE_TOO_SMALL`] when the cap bites; `Unspecified` passes
/// the desired size through. State bits from already-measured children are
/// carried along in the result.
pub fn resolve_size_and_state(size: i32, spec: MeasureSpec, child_measured_state: i32) -> i32 {
    let result = match spec.mode() {
        MeasureMode::AtMost => {
            if spec.size() < size {
                spec.size() | MEASURED_STATE_TOO_SMALL
            } else {
                size
            }
        }
        MeasureMode::Exactly => spec.size(),
        MeasureMode::Unspecified => size,
    };
    result | (child_measured_state & MEASURED_STATE_MASK)
}

/// [`resolve_size_and_state`] with the state bits stripped.
pub fn resolve_size(size: i32, spec: MeasureSpec) -> i32 {
    resolve_size_and_state(size, spec, 0) & MEASURED_SIZE_MASK
}

/// Folds one measured state word into an accumulator.
pub fn combine_measured_states(current: i32, new_state: i32) -> i32 {
    current | new_state
}

/// Derives the spec a parent passes to a child for one axis.
///
/// `padding` is everything already spoken for on that axis (parent padding,
/// the child's margins, space used by siblings); `child_dimension` is the
/// child's layout parameter: a fixed pixel value, [`MATCH_PARENT`] or
/// [`WRAP_CONTENT`].
pub fn child_measure_spec(spec: MeasureSpec, padding: i32, child_dimension: i32) -> MeasureSpec {
    let size = (spec.size() - padding).max(0);
    match spec.mode() {
        MeasureMode::Exactly => {
            if child_dimension >= 0 {
                MeasureSpec::exactly(child_dimension)
            } else if child_dimension == MATCH_PARENT {
                MeasureSpec::exactly(size)
            } else {
                debug_assert_eq!(child_dimension, WRAP_CONTENT);
                MeasureSpec::at_most(size)
            }
        }
        MeasureMode::AtMost => {
            if child_dimension >= 0 {
                MeasureSpec::exactly(child_dimension)
            } else {
                // MATCH_PARENT and WRAP_CONTENT both get the remaining
                // space as an upper bound; the parent's own size is not
                // yet final.
                MeasureSpec::at_most(size)
            }
        }
        MeasureMode::Unspecified => {
            if child_dimension >= 0 {
                MeasureSpec::exactly(child_dimension)
            } else {
                MeasureSpec::unspecified(size)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_SIZE: i32 = (1 << 30) - 1;

    #[test]
    fn spec_round_trips_all_modes() {
        for mode in [
            MeasureMode::Unspecified,
            MeasureMode::Exactly,
            MeasureMode::AtMost,
        ] {
            for size in [0, 1, 240, MAX_SIZE] {
                let spec = MeasureSpec::new(mode, size);
                assert_eq!(spec.mode(), mode);
                assert_eq!(spec.size(), size);
            }
        }
    }

    #[test]
    fn oversized_size_truncates_silently() {
        let spec = MeasureSpec::exactly(MAX_SIZE + 1);
        assert_eq!(spec.mode(), MeasureMode::Exactly);
        assert_eq!(spec.size(), 0);
    }

    #[test]
    fn exact_parent_with_fixed_child() {
        let spec = child_measure_spec(MeasureSpec::exactly(400), 20, 100);
        assert_eq!(spec, MeasureSpec::exactly(100));
    }

    #[test]
    fn exact_parent_with_wrap_content_child() {
        let spec = child_measure_spec(MeasureSpec::exactly(400), 20, WRAP_CONTENT);
        assert_eq!(spec, MeasureSpec::at_most(380));
    }

    #[test]
    fn exact_parent_with_match_parent_child() {
        let spec = child_measure_spec(MeasureSpec::exactly(400), 20, MATCH_PARENT);
        assert_eq!(spec, MeasureSpec::exactly(380));
    }

    #[test]
    fn bounded_parent_rows() {
        let parent = MeasureSpec::at_most(300);
        assert_eq!(child_measure_spec(parent, 0, 50), MeasureSpec::exactly(50));
        assert_eq!(
            child_measure_spec(parent, 10, MATCH_PARENT),
            MeasureSpec::at_most(290)
        );
        assert_eq!(
            child_measure_spec(parent, 10, WRAP_CONTENT),
            MeasureSpec::at_most(290)
        );
    }

    #[test]
    fn unspecified_parent_rows() {
        let parent = MeasureSpec::unspecified(300);
        assert_eq!(child_measure_spec(parent, 0, 50), MeasureSpec::exactly(50));
        assert_eq!(
            child_measure_spec(parent, 0, MATCH_PARENT),
            MeasureSpec::unspecified(300)
        );
        assert_eq!(
            child_measure_spec(parent, 0, WRAP_CONTENT),
            MeasureSpec::unspecified(300)
        );
    }

    #[test]
    fn padding_never_drives_size_negative() {
        let spec = child_measure_spec(MeasureSpec::exactly(10), 50, MATCH_PARENT);
        assert_eq!(spec, MeasureSpec::exactly(0));
    }

    #[test]
    fn resolve_respects_exact_spec() {
        assert_eq!(
            resolve_size_and_state(500, MeasureSpec::exactly(120), 0),
            120
        );
    }

    #[test]
    fn resolve_flags_too_small_under_at_most() {
        let packed = resolve_size_and_state(500, MeasureSpec::at_most(120), 0);
        assert_eq!(packed & MEASURED_SIZE_MASK, 120);
        assert_ne!(packed & MEASURED_STATE_TOO_SMALL, 0);

        let fits = resolve_size_and_state(80, MeasureSpec::at_most(120), 0);
        assert_eq!(fits, 80);
    }

    #[test]
    fn resolve_keeps_child_state_bits() {
        let packed =
            resolve_size_and_state(80, MeasureSpec::unspecified(0), MEASURED_STATE_TOO_SMALL);
        assert_eq!(packed & MEASURED_SIZE_MASK, 80);
        assert_ne!(packed & MEASURED_STATE_TOO_SMALL, 0);
    }

    #[test]
    fn combine_ors_states() {
        let combined = combine_measured_states(0, MEASURED_STATE_TOO_SMALL);
        assert_eq!(combined, MEASURED_STATE_TOO_SMALL);
        assert_eq!(
            combine_measured_states(combined, 0),
            MEASURED_STATE_TOO_SMALL
        );
    }
}
