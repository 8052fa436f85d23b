/// Requests the parent's full extent on that axis.
pub const MATCH_PARENT: i32 = -1;
/// Requests just enough space for the content on that axis.
pub const WRAP_CONTENT: i32 = -2;
/// Sentinel for a relative margin the caller never set.
pub const UNDEFINED_MARGIN: i32 = i32::MIN;

/// Horizontal text/layout direction a tree is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Space demanded around a child, on top of its own size.
///
/// `start`/`end` are relative to the layout direction and fold into
/// `left`/`right` during [`LayoutParams::resolve_layout_direction`]; until
/// then they hold [`UNDEFINED_MARGIN`] if never set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    start: i32,
    end: i32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
            start: UNDEFINED_MARGIN,
            end: UNDEFINED_MARGIN,
        }
    }
}

impl Margins {
    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

/// How a child asks its parent to size and space it.
///
/// `width`/`height` are a fixed pixel count, [`MATCH_PARENT`] or
/// [`WRAP_CONTENT`]. Every view carries one of these; views added without
/// explicit parameters get `wrap()` defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub width: i32,
    pub height: i32,
    pub margins: Margins,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::wrap()
    }
}

impl LayoutParams {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            margins: Margins::default(),
        }
    }

    pub fn wrap() -> Self {
        Self::new(WRAP_CONTENT, WRAP_CONTENT)
    }

    pub fn fill() -> Self {
        Self::new(MATCH_PARENT, MATCH_PARENT)
    }

    pub fn with_margins(mut self, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        self.set_margins(left, top, right, bottom);
        self
    }

    pub fn set_margins(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        self.margins.left = left;
        self.margins.top = top;
        self.margins.right = right;
        self.margins.bottom = bottom;
    }

    /// Sets direction-relative margins; they override the absolute
    /// left/right values once the layout direction is resolved.
    pub fn set_relative_margins(&mut self, start: i32, end: i32) {
        self.margins.start = start;
        self.margins.end = end;
    }

    pub fn margin_start(&self) -> i32 {
        if self.margins.start != UNDEFINED_MARGIN {
            self.margins.start
        } else {
            self.margins.left
        }
    }

    pub fn margin_end(&self) -> i32 {
        if self.margins.end != UNDEFINED_MARGIN {
            self.margins.end
        } else {
            self.margins.right
        }
    }

    /// Folds start/end margins into left/right for the given direction.
    /// Absolute margins that were set directly survive when the relative
    /// ones are undefined.
    pub fn resolve_layout_direction(&mut self, direction: LayoutDirection) {
        match direction {
            LayoutDirection::Ltr => {
                if self.margins.start != UNDEFINED_MARGIN {
                    self.margins.left = self.margins.start;
                }
                if self.margins.end != UNDEFINED_MARGIN {
                    self.margins.right = self.margins.end;
                }
            }
            LayoutDirection::Rtl => {
                if self.margins.end != UNDEFINED_MARGIN {
                    self.margins.left = self.margins.end;
                }
                if self.margins.start != UNDEFINED_MARGIN {
                    self.margins.right = self.margins.start;
                }
            }
        }
    }
}
