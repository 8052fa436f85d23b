use trellis_geometry::{Point, Rect};

/// A view's render transform, decomposed the way callers set it:
/// translation, scale and rotation applied about a pivot point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation_x: f32,
    pub translation_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Degrees clockwise about the pivot.
    pub rotation: f32,
    pub pivot_x: f32,
    pub pivot_y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation_x: 0.0,
            translation_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
        }
    }
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        self.translation_x == 0.0
            && self.translation_y == 0.0
            && self.scale_x == 1.0
            && self.scale_y == 1.0
            && self.rotation == 0.0
    }

    /// Collapses the decomposed form into an affine matrix.
    pub fn to_matrix(&self) -> Matrix {
        let radians = self.rotation.to_radians();
        let (sin, cos) = radians.sin_cos();
        let a = cos * self.scale_x;
        let b = sin * self.scale_x;
        let c = -sin * self.scale_y;
        let d = cos * self.scale_y;
        // Pivot-relative: p' = pivot + translation + M * (p - pivot).
        let tx = self.translation_x + self.pivot_x - a * self.pivot_x - c * self.pivot_y;
        let ty = self.translation_y + self.pivot_y - b * self.pivot_x - d * self.pivot_y;
        Matrix { a, b, c, d, tx, ty }
    }
}

/// A 2D affine map: `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    pub fn map_point(&self, p: Point) -> (f32, f32) {
        self.map(p.x as f32, p.y as f32)
    }

    /// Axis-aligned bounding box of the mapped rect, rounded outward.
    pub fn map_rect(&self, rect: Rect) -> Rect {
        let corners = [
            self.map(rect.left as f32, rect.top as f32),
            self.map(rect.right() as f32, rect.top as f32),
            self.map(rect.left as f32, rect.bottom() as f32),
            self.map(rect.right() as f32, rect.bottom() as f32),
        ];
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        for (x, y) in corners {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Rect::from_edges(
            min_x.floor() as i32,
            min_y.floor() as i32,
            max_x.ceil() as i32,
            max_y.ceil() as i32,
        )
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// `None` when the matrix is singular (zero scale).
    pub fn invert(&self) -> Option<Matrix> {
        let det = self.determinant();
        if det.abs() < f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Matrix {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            tx: (self.c * self.ty - self.d * self.tx) * inv,
            ty: (self.b * self.tx - self.a * self.ty) * inv,
        })
    }
}
