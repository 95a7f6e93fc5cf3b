//! Explicit figure canvas.
//!
//! A [`Figure`] collects marks (node insets with optional captions, directed
//! edge arrows) in pixel coordinates and is presented by writing it to a file.
//! Layout positions are mapped onto the figure through a [`FigureTransform`],
//! which works in figure fractions (origin bottom-left, `[0, 1]` on both axes).

use std::path::{Path, PathBuf};

use crate::color::Rgba;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Point, Rect};
use crate::graph::NodeId;
use crate::output::{PngEncoder, SvgEncoder, TextAnchor};
use crate::render::{Arrow, Drawable};
use crate::scale::{LinearScale, Scale};

/// Fraction of the data extent added on each side before fitting.
const DATA_MARGIN: f32 = 0.05;

/// Half extent used when every position shares one coordinate.
const DEGENERATE_HALF_EXTENT: f32 = 1.0;

/// Default caption font size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Plotting area in figure fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axes {
    /// Left edge
    pub left: f32,
    /// Bottom edge
    pub bottom: f32,
    /// Right edge
    pub right: f32,
    /// Top edge
    pub top: f32,
}

impl Axes {
    /// The default subplot box.
    pub const DEFAULT: Self = Self {
        left: 0.125,
        bottom: 0.11,
        right: 0.9,
        top: 0.88,
    };

    fn width(&self) -> f32 {
        self.right - self.left
    }

    fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

impl Default for Axes {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Maps layout data coordinates to figure fractions.
///
/// Data bounds are padded, expanded to equal aspect and centred in the axes.
#[derive(Debug, Clone, Copy)]
pub struct FigureTransform {
    x: LinearScale,
    y: LinearScale,
}

impl FigureTransform {
    /// Fit `positions` into `axes`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ScaleDomain`] if the fitted extent is degenerate.
    pub fn fit(positions: &[Point], axes: Axes) -> Result<Self> {
        let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for p in positions {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        if positions.is_empty() {
            (min_x, max_x, min_y, max_y) = (0.0, 0.0, 0.0, 0.0);
        }

        let cx = (min_x + max_x) / 2.0;
        let cy = (min_y + max_y) / 2.0;
        let mut half_x = (max_x - min_x) / 2.0 * (1.0 + 2.0 * DATA_MARGIN);
        let mut half_y = (max_y - min_y) / 2.0 * (1.0 + 2.0 * DATA_MARGIN);
        if half_x <= f32::EPSILON && half_y <= f32::EPSILON {
            half_x = DEGENERATE_HALF_EXTENT;
            half_y = DEGENERATE_HALF_EXTENT;
        }

        // Equal aspect: one data unit covers the same fraction on both axes.
        let unit = (axes.width() / (2.0 * half_x)).min(axes.height() / (2.0 * half_y));
        half_x = axes.width() / (2.0 * unit);
        half_y = axes.height() / (2.0 * unit);

        Ok(Self {
            x: LinearScale::new((cx - half_x, cx + half_x), (axes.left, axes.right))?,
            y: LinearScale::new((cy - half_y, cy + half_y), (axes.bottom, axes.top))?,
        })
    }

    /// Data point to figure fraction.
    #[must_use]
    pub fn to_figure(&self, p: Point) -> Point {
        Point::new(self.x.scale(p.x), self.y.scale(p.y))
    }
}

/// Where a caption sits relative to its inset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptionPlacement {
    /// Centred just above the inset.
    Above,
    /// Left-aligned below the inset, `offset` inset heights under its bottom edge.
    BelowLeft {
        /// Distance below the bottom edge, in inset heights.
        offset: f32,
    },
}

/// Text attached to an inset.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    /// Caption text
    pub text: String,
    /// Placement relative to the inset
    pub placement: CaptionPlacement,
    /// Font size in pixels
    pub font_size: f32,
}

impl Caption {
    /// Caption centred above its inset.
    #[must_use]
    pub fn above(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            placement: CaptionPlacement::Above,
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// Caption below-left of its inset.
    #[must_use]
    pub fn below_left(text: impl Into<String>, offset: f32) -> Self {
        Self {
            text: text.into(),
            placement: CaptionPlacement::BelowLeft { offset },
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// Set font size.
    #[must_use]
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Text anchor point and alignment next to the image drawn in `frame`.
    ///
    /// Pass [`Inset::image_rect`], not the square frame, so the caption hugs
    /// the visible image.
    #[must_use]
    pub fn anchor(&self, frame: Rect) -> (Point, TextAnchor) {
        match self.placement {
            CaptionPlacement::Above => (
                Point::new(frame.x + frame.width / 2.0, frame.y - self.font_size * 0.5),
                TextAnchor::Middle,
            ),
            CaptionPlacement::BelowLeft { offset } => (
                Point::new(frame.x, frame.y + frame.height * (1.0 + offset)),
                TextAnchor::Start,
            ),
        }
    }
}

/// A node image drawn in its own frame, without axis decoration.
#[derive(Debug, Clone)]
pub struct Inset {
    /// Node the inset belongs to
    pub node: NodeId,
    /// Frame in pixels
    pub frame: Rect,
    /// Image, fitted into the frame preserving aspect ratio
    pub image: Framebuffer,
    /// Optional caption
    pub caption: Option<Caption>,
}

impl Inset {
    /// Rectangle the image actually covers inside the frame.
    #[must_use]
    pub fn image_rect(&self) -> Rect {
        self.frame
            .fit(self.image.width() as f32, self.image.height() as f32)
    }
}

/// Where to present a figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Vector output with embedded images and text captions.
    Svg(PathBuf),
    /// Raster output (captions are not rasterized).
    Png(PathBuf),
}

impl Output {
    /// Pick the format from the file extension; anything but `.png` is SVG.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if is_png {
            Self::Png(path.to_path_buf())
        } else {
            Self::Svg(path.to_path_buf())
        }
    }

    /// Whether captions are drawn in this format.
    #[must_use]
    pub const fn renders_captions(&self) -> bool {
        matches!(self, Self::Svg(_))
    }

    /// Destination path.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Svg(p) | Self::Png(p) => p,
        }
    }
}

/// Canvas holding every mark of a rendered split or tree.
#[derive(Debug, Clone)]
pub struct Figure {
    width: u32,
    height: u32,
    background: Rgba,
    edge_color: Rgba,
    insets: Vec<Inset>,
    arrows: Vec<Arrow>,
}

impl Figure {
    /// Create an empty figure of `width` x `height` pixels.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Rgba::WHITE,
            edge_color: Rgba::EDGE,
            insets: Vec::new(),
            arrows: Vec::new(),
        }
    }

    /// Set edge colour.
    #[must_use]
    pub fn edge_color(mut self, color: Rgba) -> Self {
        self.edge_color = color;
        self
    }

    /// Set background colour.
    #[must_use]
    pub fn background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    /// Figure width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Figure height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Figure fraction to pixel position (y flipped).
    #[must_use]
    pub fn to_pixels(&self, frac: Point) -> Point {
        Point::new(
            frac.x * self.width as f32,
            (1.0 - frac.y) * self.height as f32,
        )
    }

    /// Figure-fraction square of side `size`, centred on `center`, in pixels.
    #[must_use]
    pub fn inset_frame(&self, center: Point, size: f32) -> Rect {
        let c = self.to_pixels(center);
        Rect::centered(c, size * self.width as f32, size * self.height as f32)
    }

    /// Add a directed edge.
    pub fn add_arrow(&mut self, arrow: Arrow) {
        self.arrows.push(arrow);
    }

    /// Add a node inset.
    pub fn add_inset(&mut self, inset: Inset) {
        self.insets.push(inset);
    }

    /// Insets in paint order.
    #[must_use]
    pub fn insets(&self) -> &[Inset] {
        &self.insets
    }

    /// Arrows in paint order.
    #[must_use]
    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    /// Captions in inset order.
    pub fn captions(&self) -> impl Iterator<Item = &Caption> {
        self.insets.iter().filter_map(|i| i.caption.as_ref())
    }

    /// Vector rendering: arrows under insets, captions on top.
    ///
    /// # Errors
    ///
    /// Returns an error if an inset image cannot be PNG-encoded.
    pub fn to_svg(&self) -> Result<SvgEncoder> {
        let mut svg = SvgEncoder::new(self.width, self.height).background(Some(self.background));

        for arrow in &self.arrows {
            let end = arrow.shaft_end();
            let [tip, left, right] = arrow.head_points();
            svg = svg
                .line(
                    arrow.tail.x,
                    arrow.tail.y,
                    end.x,
                    end.y,
                    self.edge_color,
                    arrow.width,
                )
                .polygon(
                    &[(tip.x, tip.y), (left.x, left.y), (right.x, right.y)],
                    self.edge_color,
                );
        }

        for inset in &self.insets {
            let r = inset.image_rect();
            svg = svg.image(r.x, r.y, r.width, r.height, &inset.image)?;
        }

        for inset in &self.insets {
            if let Some(caption) = &inset.caption {
                let (at, anchor) = caption.anchor(inset.image_rect());
                svg = svg.text_anchored(
                    at.x,
                    at.y,
                    &caption.text,
                    caption.font_size,
                    Rgba::BLACK,
                    anchor,
                );
            }
        }

        Ok(svg)
    }

    /// Raster rendering of arrows and insets. Captions are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidDimensions`] for a zero-sized figure.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        let mut fb = Framebuffer::new(self.width, self.height)?;
        fb.clear(self.background);

        for arrow in &self.arrows {
            arrow.draw(&mut fb, self.edge_color);
        }

        for inset in &self.insets {
            let r = inset.image_rect();
            let w = r.width.round() as u32;
            let h = r.height.round() as u32;
            if w == 0 || h == 0 {
                log::trace!("inset for node {} too small to rasterize", inset.node.index());
                continue;
            }
            let scaled = inset.image.resize(w, h)?;
            fb.paste(&scaled, r.x.round() as i32, r.y.round() as i32);
        }

        Ok(fb)
    }

    /// Write the figure to `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing the file fails.
    pub fn present(&self, output: &Output) -> Result<()> {
        let captions = self.captions().count();
        if captions > 0 && !output.renders_captions() {
            log::warn!(
                "{} has no text layer, {captions} captions omitted; write .svg to keep them",
                output.path().display()
            );
        }
        match output {
            Output::Svg(path) => self.to_svg()?.write_to_file(path)?,
            Output::Png(path) => PngEncoder::write_to_file(&self.to_framebuffer()?, path)?,
        }
        log::info!(
            "wrote {}x{} figure with {} nodes to {}",
            self.width,
            self.height,
            self.insets.len(),
            output.path().display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solid(w: u32, h: u32, color: Rgba) -> Framebuffer {
        let mut fb = Framebuffer::new(w, h).unwrap();
        fb.clear(color);
        fb
    }

    #[test]
    fn test_transform_stays_inside_axes() {
        let pts = [Point::new(-1.0, 0.0), Point::new(0.5, -0.87), Point::new(0.5, 0.87)];
        let t = FigureTransform::fit(&pts, Axes::DEFAULT).unwrap();
        for p in pts {
            let f = t.to_figure(p);
            assert!(f.x >= Axes::DEFAULT.left && f.x <= Axes::DEFAULT.right);
            assert!(f.y >= Axes::DEFAULT.bottom && f.y <= Axes::DEFAULT.top);
        }
    }

    #[test]
    fn test_transform_equal_aspect() {
        let pts = [Point::new(0.0, 0.0), Point::new(2.0, 1.0)];
        let t = FigureTransform::fit(&pts, Axes::DEFAULT).unwrap();
        let o = t.to_figure(Point::new(0.0, 0.0));
        let dx = t.to_figure(Point::new(1.0, 0.0)).x - o.x;
        let dy = t.to_figure(Point::new(0.0, 1.0)).y - o.y;
        assert_relative_eq!(dx, dy, epsilon = 1e-5);
    }

    #[test]
    fn test_transform_single_point_is_centred() {
        let t = FigureTransform::fit(&[Point::ORIGIN], Axes::DEFAULT).unwrap();
        let f = t.to_figure(Point::ORIGIN);
        assert_relative_eq!(f.x, (0.125 + 0.9) / 2.0, epsilon = 1e-6);
        assert_relative_eq!(f.y, (0.11 + 0.88) / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_to_pixels_flips_y() {
        let fig = Figure::new(200, 100);
        assert_eq!(fig.to_pixels(Point::new(0.0, 0.0)), Point::new(0.0, 100.0));
        assert_eq!(fig.to_pixels(Point::new(0.5, 1.0)), Point::new(100.0, 0.0));
    }

    #[test]
    fn test_caption_anchors() {
        let frame = Rect::new(10.0, 20.0, 40.0, 30.0);
        let (above, a) = Caption::above("x").anchor(frame);
        assert_eq!(a, TextAnchor::Middle);
        assert_relative_eq!(above.x, 30.0);
        assert!(above.y < frame.y);

        let (below, b) = Caption::below_left("x", 0.8).anchor(frame);
        assert_eq!(b, TextAnchor::Start);
        assert_relative_eq!(below.x, 10.0);
        assert_relative_eq!(below.y, 20.0 + 30.0 * 1.8);
    }

    #[test]
    fn test_output_from_extension() {
        assert!(matches!(Output::from_path("a/b.png"), Output::Png(_)));
        assert!(matches!(Output::from_path("a/b.PNG"), Output::Png(_)));
        assert!(matches!(Output::from_path("a/b.svg"), Output::Svg(_)));
        assert!(matches!(Output::from_path("figure"), Output::Svg(_)));
    }

    #[test]
    fn test_only_svg_renders_captions() {
        assert!(Output::from_path("a.svg").renders_captions());
        assert!(!Output::from_path("a.png").renders_captions());
    }

    #[test]
    fn test_raster_pastes_inset() {
        let mut fig = Figure::new(100, 100);
        fig.add_inset(Inset {
            node: NodeId(0),
            frame: Rect::new(20.0, 20.0, 40.0, 40.0),
            image: solid(4, 4, Rgba::RED),
            caption: None,
        });
        let fb = fig.to_framebuffer().unwrap();
        assert_eq!(fb.get_pixel(40, 40), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::WHITE));
    }

    #[test]
    fn test_svg_contains_marks() {
        let mut fig = Figure::new(100, 100);
        fig.add_arrow(Arrow::new(Point::new(10.0, 10.0), Point::new(90.0, 90.0), 1.0, 10.0));
        fig.add_inset(Inset {
            node: NodeId(0),
            frame: Rect::new(20.0, 20.0, 40.0, 40.0),
            image: solid(4, 2, Rgba::BLUE),
            caption: Some(Caption::above("Splitting on Solitary")),
        });
        let svg = fig.to_svg().unwrap().render();
        assert!(svg.contains("<line"));
        assert!(svg.contains("<polygon"));
        assert!(svg.contains("<image"));
        assert!(svg.contains("Splitting on Solitary"));
        assert_eq!(fig.captions().count(), 1);
    }

    #[test]
    fn test_svg_caption_sits_on_image_not_frame() {
        let mut fig = Figure::new(100, 100);
        fig.add_inset(Inset {
            node: NodeId(0),
            frame: Rect::new(20.0, 20.0, 40.0, 40.0),
            image: solid(4, 2, Rgba::BLUE),
            caption: Some(Caption::above("root")),
        });
        // 40x20 image centred in the frame: top edge at y = 30
        assert_relative_eq!(fig.insets()[0].image_rect().y, 30.0);
        let svg = fig.to_svg().unwrap().render();
        assert!(svg.contains(r#"<text x="40" y="24""#), "{svg}");
    }

    #[test]
    fn test_present_writes_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let mut fig = Figure::new(50, 40);
        fig.add_inset(Inset {
            node: NodeId(0),
            frame: Rect::new(5.0, 5.0, 20.0, 20.0),
            image: solid(2, 2, Rgba::RED),
            caption: Some(Caption::above("root")),
        });

        let svg = dir.path().join("f.svg");
        let png = dir.path().join("f.png");
        fig.present(&Output::Svg(svg.clone())).unwrap();
        fig.present(&Output::Png(png.clone())).unwrap();

        assert!(std::fs::read_to_string(svg).unwrap().contains("root"));
        let decoded = crate::source::decode_png(std::fs::File::open(png).unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (50, 40));
    }
}
