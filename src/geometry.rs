//! Geometric primitives for figure layout.
//!
//! Positions come in two spaces: layout data coordinates (y up) and figure
//! pixel coordinates (y down). `Rect` is always top-left anchored.

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Origin point (0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate the distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation between two points.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// A rectangle defined by position and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle of the given size centred on `center`.
    #[must_use]
    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }

    /// Check if a point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Get the center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Largest rectangle with aspect ratio `content_w : content_h` that fits
    /// inside `self`, centred.
    #[must_use]
    pub fn fit(&self, content_w: f32, content_h: f32) -> Self {
        if content_w <= 0.0 || content_h <= 0.0 {
            return Self::centered(self.center(), 0.0, 0.0);
        }
        let s = (self.width / content_w).min(self.height / content_h);
        Self::centered(self.center(), content_w * s, content_h * s)
    }

    /// Point where the segment from `from` to the centre of `self` crosses the
    /// border. Returns the centre when `from` lies inside.
    #[must_use]
    pub fn entry_point(&self, from: Point) -> Point {
        let c = self.center();
        if self.contains(from) {
            return c;
        }
        let dx = from.x - c.x;
        let dy = from.y - c.y;
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        let tx = if dx.abs() > f32::EPSILON { hw / dx.abs() } else { f32::INFINITY };
        let ty = if dy.abs() > f32::EPSILON { hh / dy.abs() } else { f32::INFINITY };
        let t = tx.min(ty).min(1.0);
        Point::new(c.x + dx * t, c.y + dy * t)
    }
}
