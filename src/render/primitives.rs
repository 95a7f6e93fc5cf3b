//! Primitive rendering functions.
//!
//! Implements rasterization for edge lines and arrowheads.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::Point;

/// Trait for drawable primitives.
pub trait Drawable {
    /// Draw this primitive to a framebuffer.
    fn draw(&self, fb: &mut Framebuffer, color: Rgba);
}

// ============================================================================
// Line Drawing
// ============================================================================

/// Draw an anti-aliased line using Wu's algorithm.
///
/// Two pixels are plotted at each step along the major axis, their
/// intensities split by the fractional distance to the ideal line.
///
/// # References
///
/// Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
pub fn draw_line_aa(fb: &mut Framebuffer, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
    let steep = (y1 - y0).abs() > (x1 - x0).abs();

    let (x0, y0, x1, y1) = if steep { (y0, x0, y1, x1) } else { (x0, y0, x1, y1) };

    let (x0, y0, x1, y1) = if x0 > x1 { (x1, y1, x0, y0) } else { (x0, y0, x1, y1) };

    let dx = x1 - x0;
    let dy = y1 - y0;
    let gradient = if dx.abs() < f32::EPSILON { 1.0 } else { dy / dx };

    // First endpoint
    let xend = x0.round();
    let yend = y0 + gradient * (xend - x0);
    let xgap = rfpart(x0 + 0.5);
    let xpxl1 = xend as i32;
    let ypxl1 = yend.floor() as i32;

    if steep {
        plot(fb, ypxl1, xpxl1, color, rfpart(yend) * xgap);
        plot(fb, ypxl1 + 1, xpxl1, color, fpart(yend) * xgap);
    } else {
        plot(fb, xpxl1, ypxl1, color, rfpart(yend) * xgap);
        plot(fb, xpxl1, ypxl1 + 1, color, fpart(yend) * xgap);
    }

    let mut intery = yend + gradient;

    // Second endpoint
    let xend = x1.round();
    let yend = y1 + gradient * (xend - x1);
    let xgap = fpart(x1 + 0.5);
    let xpxl2 = xend as i32;
    let ypxl2 = yend.floor() as i32;

    if steep {
        plot(fb, ypxl2, xpxl2, color, rfpart(yend) * xgap);
        plot(fb, ypxl2 + 1, xpxl2, color, fpart(yend) * xgap);
    } else {
        plot(fb, xpxl2, ypxl2, color, rfpart(yend) * xgap);
        plot(fb, xpxl2, ypxl2 + 1, color, fpart(yend) * xgap);
    }

    for x in (xpxl1 + 1)..xpxl2 {
        let ipart = intery.floor() as i32;
        if steep {
            plot(fb, ipart, x, color, rfpart(intery));
            plot(fb, ipart + 1, x, color, fpart(intery));
        } else {
            plot(fb, x, ipart, color, rfpart(intery));
            plot(fb, x, ipart + 1, color, fpart(intery));
        }
        intery += gradient;
    }
}

/// Draw an anti-aliased line of the given width as parallel Wu lines.
pub fn draw_thick_line(fb: &mut Framebuffer, from: Point, to: Point, width: f32, color: Rgba) {
    let len = from.distance(to);
    if len < f32::EPSILON {
        return;
    }
    // Unit normal
    let nx = -(to.y - from.y) / len;
    let ny = (to.x - from.x) / len;

    let strands = width.max(1.0).round() as i32;
    for k in 0..strands {
        let off = k as f32 - (strands - 1) as f32 / 2.0;
        draw_line_aa(
            fb,
            from.x + nx * off,
            from.y + ny * off,
            to.x + nx * off,
            to.y + ny * off,
            color,
        );
    }
}

/// Plot a pixel with intensity (for anti-aliased drawing).
#[inline]
fn plot(fb: &mut Framebuffer, x: i32, y: i32, color: Rgba, intensity: f32) {
    if x >= 0 && y >= 0 && x < fb.width() as i32 && y < fb.height() as i32 {
        let alpha = (f32::from(color.a) * intensity) as u8;
        fb.blend_pixel(x as u32, y as u32, color.with_alpha(alpha));
    }
}

/// Fractional part of a float.
#[inline]
fn fpart(x: f32) -> f32 {
    x - x.floor()
}

/// Reverse fractional part.
#[inline]
fn rfpart(x: f32) -> f32 {
    1.0 - fpart(x)
}

// ============================================================================
// Triangle / Arrow Drawing
// ============================================================================

/// Fill a triangle with horizontal scan lines.
///
/// A pixel is filled when its centre lies inside or on the triangle.
pub fn fill_triangle(fb: &mut Framebuffer, a: Point, b: Point, c: Point, color: Rgba) {
    let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as i32;
    let max_y = a.y.max(b.y).max(c.y).ceil().min(fb.height() as f32) as i32;

    for y in min_y..max_y {
        let sy = y as f32 + 0.5;
        let mut xs: Vec<f32> = Vec::with_capacity(3);
        for (p, q) in [(a, b), (b, c), (c, a)] {
            let (lo, hi) = if p.y <= q.y { (p, q) } else { (q, p) };
            if sy >= lo.y && sy < hi.y {
                let t = (sy - lo.y) / (hi.y - lo.y);
                xs.push(lo.x + (hi.x - lo.x) * t);
            }
        }
        if xs.len() < 2 {
            continue;
        }
        let x_min = xs.iter().copied().fold(f32::INFINITY, f32::min);
        let x_max = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        let start = (x_min - 0.5).ceil().max(0.0) as u32;
        let end = (x_max - 0.5).floor() as i32;
        if end < start as i32 {
            continue;
        }
        fb.fill_rect(start, y as u32, end as u32 - start + 1, 1, color);
    }
}

/// A directed edge drawn as a shaft plus a filled arrowhead at `tip`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    /// Tail position in pixels.
    pub tail: Point,
    /// Head position in pixels (arrow tip).
    pub tip: Point,
    /// Shaft width in pixels.
    pub width: f32,
    /// Arrowhead length in pixels.
    pub head: f32,
}

impl Arrow {
    /// Create an arrow from `tail` to `tip`.
    #[must_use]
    pub const fn new(tail: Point, tip: Point, width: f32, head: f32) -> Self {
        Self {
            tail,
            tip,
            width,
            head,
        }
    }

    /// Corners of the arrowhead triangle: tip, left barb, right barb.
    ///
    /// The head is shortened to the shaft length for very short arrows.
    #[must_use]
    pub fn head_points(&self) -> [Point; 3] {
        let len = self.tail.distance(self.tip);
        if len < f32::EPSILON {
            return [self.tip; 3];
        }
        let head = self.head.min(len);
        let ux = (self.tip.x - self.tail.x) / len;
        let uy = (self.tip.y - self.tail.y) / len;
        let half = head * 0.35;

        let base = Point::new(self.tip.x - ux * head, self.tip.y - uy * head);
        [
            self.tip,
            Point::new(base.x - uy * half, base.y + ux * half),
            Point::new(base.x + uy * half, base.y - ux * half),
        ]
    }

    /// Point where the shaft meets the arrowhead base.
    #[must_use]
    pub fn shaft_end(&self) -> Point {
        let len = self.tail.distance(self.tip);
        if len < f32::EPSILON {
            return self.tip;
        }
        self.tip.lerp(self.tail, self.head.min(len) / len)
    }
}

impl Drawable for Arrow {
    fn draw(&self, fb: &mut Framebuffer, color: Rgba) {
        draw_thick_line(fb, self.tail, self.shaft_end(), self.width, color);
        let [tip, left, right] = self.head_points();
        fill_triangle(fb, tip, left, right, color);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_draw_line_aa() {
        let mut fb = Framebuffer::new(100, 100).expect("framebuffer creation should succeed");
        fb.clear(Rgba::WHITE);

        draw_line_aa(&mut fb, 10.0, 50.0, 90.0, 50.0, Rgba::BLACK);

        let on = fb.get_pixel(50, 50).unwrap();
        assert!(on.r < 128, "pixel on the line should be dark: {on:?}");
        assert_eq!(fb.get_pixel(50, 10), Some(Rgba::WHITE));
    }

    #[test]
    fn test_draw_line_aa_steep() {
        let mut fb = Framebuffer::new(100, 100).expect("framebuffer creation should succeed");
        fb.clear(Rgba::WHITE);

        draw_line_aa(&mut fb, 30.0, 5.0, 30.0, 95.0, Rgba::BLACK);

        assert!(fb.get_pixel(30, 50).unwrap().r < 128);
    }

    #[test]
    fn test_line_out_of_bounds() {
        let mut fb = Framebuffer::new(100, 100).expect("framebuffer creation should succeed");
        fb.clear(Rgba::WHITE);

        draw_line_aa(&mut fb, -10.0, -10.0, 110.0, 110.0, Rgba::BLACK);

        assert!(fb.get_pixel(50, 50).unwrap().r < 255);
    }

    #[test]
    fn test_fill_triangle() {
        let mut fb = Framebuffer::new(50, 50).expect("framebuffer creation should succeed");
        fb.clear(Rgba::WHITE);

        fill_triangle(
            &mut fb,
            Point::new(10.0, 10.0),
            Point::new(40.0, 10.0),
            Point::new(10.0, 40.0),
            Rgba::RED,
        );

        assert_eq!(fb.get_pixel(15, 15), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(38, 38), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::WHITE));
    }

    #[test]
    fn test_arrow_head_geometry() {
        let arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 1.0, 20.0);
        let [tip, left, right] = arrow.head_points();
        assert_eq!(tip, Point::new(100.0, 0.0));
        assert_relative_eq!(left.x, 80.0);
        assert_relative_eq!(right.x, 80.0);
        assert_relative_eq!((left.y - right.y).abs(), 14.0, epsilon = 1e-4);
        assert_relative_eq!(arrow.shaft_end().x, 80.0);
    }

    #[test]
    fn test_arrow_draws_head_near_tip() {
        let mut fb = Framebuffer::new(120, 40).expect("framebuffer creation should succeed");
        fb.clear(Rgba::WHITE);

        let arrow = Arrow::new(Point::new(5.0, 20.0), Point::new(100.0, 20.0), 2.0, 20.0);
        arrow.draw(&mut fb, Rgba::BLACK);

        // Inside the head, off the shaft
        assert_eq!(fb.get_pixel(85, 22), Some(Rgba::BLACK));
        // Beyond the tip
        assert_eq!(fb.get_pixel(110, 20), Some(Rgba::WHITE));
    }

    #[test]
    fn test_degenerate_arrow_does_not_panic() {
        let mut fb = Framebuffer::new(10, 10).expect("framebuffer creation should succeed");
        let p = Point::new(5.0, 5.0);
        Arrow::new(p, p, 1.0, 4.0).draw(&mut fb, Rgba::BLACK);
    }
}
