//! Core framebuffer for pixel rendering.
//!
//! Provides a SIMD-aligned RGBA pixel buffer used both for composite node
//! images and for the rasterized figure. Uses trueno for SIMD-accelerated row
//! interpolation when resizing.

use crate::color::Rgba;
use crate::error::{Error, Result};
use trueno::Vector;

/// Alignment for SIMD operations (64 bytes for AVX-512).
const SIMD_ALIGNMENT: usize = 64;

/// SIMD-aligned framebuffer for efficient pixel operations.
///
/// Rows are padded to a multiple of 64 bytes. Use [`Framebuffer::to_compact_pixels`]
/// to get tightly packed data for encoders and comparisons.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// RGBA pixels in row-major order.
    /// Each pixel is 4 bytes: [R, G, B, A].
    pixels: Vec<u8>,
    /// Stride in bytes (may include padding for alignment).
    stride: usize,
}

impl Framebuffer {
    /// Create a new framebuffer with the given dimensions, cleared to
    /// transparent black.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero, or if the pixel buffer
    /// would not fit in memory addressable by `isize`.
    ///
    /// # Example
    ///
    /// ```
    /// use splitviz::framebuffer::Framebuffer;
    ///
    /// let fb = Framebuffer::new(800, 600).unwrap();
    /// assert_eq!(fb.width(), 800);
    /// assert_eq!(fb.height(), 600);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        let stride = (width as usize)
            .checked_mul(4)
            .and_then(|row| row.checked_next_multiple_of(SIMD_ALIGNMENT));
        let size = stride
            .and_then(|stride| stride.checked_mul(height as usize))
            .filter(|&size| size <= isize::MAX as usize);
        let (Some(stride), Some(size)) = (stride, size) else {
            return Err(Error::InvalidDimensions { width, height });
        };
        let pixels = vec![0; size];

        Ok(Self {
            width,
            height,
            pixels,
            stride,
        })
    }

    /// Create a framebuffer from tightly packed RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is zero or `rgba` is not exactly
    /// `width * height * 4` bytes long.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        let mut fb = Self::new(width, height)?;
        let row_bytes = (width as usize) * 4;
        if rgba.len() != row_bytes * height as usize {
            return Err(Error::InvalidDimensions { width, height });
        }

        for (y, src) in rgba.chunks_exact(row_bytes).enumerate() {
            let start = y * fb.stride;
            fb.pixels[start..start + row_bytes].copy_from_slice(src);
        }
        Ok(fb)
    }

    /// Get the width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Get the stride (row width in bytes, including any padding).
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Get a row of pixels as a slice.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = (y as usize) * self.stride;
        let end = start + (self.width as usize) * 4;
        Some(&self.pixels[start..end])
    }

    /// Get a row of pixels as a mutable slice.
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        if y >= self.height {
            return None;
        }
        let start = (y as usize) * self.stride;
        let end = start + (self.width as usize) * 4;
        Some(&mut self.pixels[start..end])
    }

    /// Clear the framebuffer to a solid color.
    pub fn clear(&mut self, color: Rgba) {
        let [r, g, b, a] = color.to_array();

        for y in 0..self.height {
            let row_start = (y as usize) * self.stride;
            let row_end = row_start + (self.width as usize) * 4;
            for chunk in self.pixels[row_start..row_end].chunks_exact_mut(4) {
                chunk[0] = r;
                chunk[1] = g;
                chunk[2] = b;
                chunk[3] = a;
            }
        }
    }

    /// Fill a rectangular region with a solid color.
    ///
    /// Coordinates are clamped to framebuffer bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let x1 = x.min(self.width);
        let y1 = y.min(self.height);
        let x2 = x.saturating_add(w).min(self.width);
        let y2 = y.saturating_add(h).min(self.height);

        if x1 >= x2 || y1 >= y2 {
            return;
        }

        let [r, g, b, a] = color.to_array();
        let rect_width = (x2 - x1) as usize;

        for row_y in y1..y2 {
            let row_start = (row_y as usize) * self.stride + (x1 as usize) * 4;
            let row = &mut self.pixels[row_start..row_start + rect_width * 4];

            for chunk in row.chunks_exact_mut(4) {
                chunk[0] = r;
                chunk[1] = g;
                chunk[2] = b;
                chunk[3] = a;
            }
        }
    }

    /// Get the color at a specific pixel coordinate.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let idx = self.pixel_index(x, y);
        Some(Rgba::from_array([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]))
    }

    /// Set the color at a specific pixel coordinate.
    ///
    /// Does nothing if the coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = self.pixel_index(x, y);
        let [r, g, b, a] = color.to_array();
        self.pixels[idx] = r;
        self.pixels[idx + 1] = g;
        self.pixels[idx + 2] = b;
        self.pixels[idx + 3] = a;
    }

    /// Blend a color at a specific pixel coordinate using alpha blending.
    ///
    /// Uses the standard "over" compositing operation:
    /// `out = src * src_alpha + dst * dst_alpha * (1 - src_alpha)`
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = self.pixel_index(x, y);
        let src_a = f32::from(color.a) / 255.0;
        let dst_a = f32::from(self.pixels[idx + 3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        if out_a > 0.0 {
            let blend = |src: u8, dst: u8| -> u8 {
                let src_f = f32::from(src) / 255.0;
                let dst_f = f32::from(dst) / 255.0;
                let out = (src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a;
                (out * 255.0) as u8
            };

            self.pixels[idx] = blend(color.r, self.pixels[idx]);
            self.pixels[idx + 1] = blend(color.g, self.pixels[idx + 1]);
            self.pixels[idx + 2] = blend(color.b, self.pixels[idx + 2]);
            self.pixels[idx + 3] = (out_a * 255.0) as u8;
        }
    }

    /// Copy `src` into this framebuffer with its top-left corner at `(x, y)`.
    ///
    /// Pixels are copied verbatim (no blending). Parts of `src` outside the
    /// destination are clipped.
    pub fn paste(&mut self, src: &Framebuffer, x: i32, y: i32) {
        let x_start = x.max(0);
        let x_end = (x + src.width as i32).min(self.width as i32);
        if x_start >= x_end {
            return;
        }
        let span = (x_end - x_start) as usize * 4;
        let src_x = (x_start - x) as usize * 4;

        for src_y in 0..src.height {
            let dst_y = y + src_y as i32;
            if dst_y < 0 {
                continue;
            }
            if dst_y >= self.height as i32 {
                break;
            }
            let src_start = src_y as usize * src.stride + src_x;
            let dst_start = dst_y as usize * self.stride + x_start as usize * 4;
            self.pixels[dst_start..dst_start + span]
                .copy_from_slice(&src.pixels[src_start..src_start + span]);
        }
    }

    /// Resample to `width` x `height` with bilinear filtering.
    ///
    /// Every source row is first resampled horizontally; output rows are then
    /// interpolated between adjacent source rows using trueno vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if either target dimension is zero.
    pub fn resize(&self, width: u32, height: u32) -> Result<Framebuffer> {
        let mut out = Framebuffer::new(width, height)?;
        if width == self.width && height == self.height {
            out.pixels.copy_from_slice(&self.pixels);
            return Ok(out);
        }

        let columns: Vec<(usize, usize, f32)> =
            (0..width).map(|x| sample_coord(x, width, self.width)).collect();

        let rows: Vec<Vec<f32>> = (0..self.height)
            .filter_map(|y| self.row(y))
            .map(|row| {
                let mut resampled = Vec::with_capacity(width as usize * 4);
                for &(x0, x1, t) in &columns {
                    for c in 0..4 {
                        let a = f32::from(row[x0 * 4 + c]);
                        let b = f32::from(row[x1 * 4 + c]);
                        resampled.push(a + (b - a) * t);
                    }
                }
                resampled
            })
            .collect();

        for y in 0..height {
            let (y0, y1, t) = sample_coord(y, height, self.height);
            let blended = lerp_rows(&rows[y0], &rows[y1], t);
            if let Some(dst) = out.row_mut(y) {
                for (d, v) in dst.iter_mut().zip(blended) {
                    *d = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        Ok(out)
    }

    /// Calculate the byte index for a pixel coordinate.
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * self.stride + (x as usize) * 4
    }

    /// Get pixel data as a compact buffer without stride padding.
    ///
    /// This is useful for encoding to formats like PNG that expect
    /// tightly-packed pixel data.
    #[must_use]
    pub fn to_compact_pixels(&self) -> Vec<u8> {
        let row_bytes = (self.width as usize) * 4;

        if self.stride == row_bytes {
            return self.pixels[..row_bytes * (self.height as usize)].to_vec();
        }

        let mut compact = Vec::with_capacity(row_bytes * (self.height as usize));
        for y in 0..self.height {
            let start = (y as usize) * self.stride;
            compact.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }
        compact
    }
}

/// Map destination pixel `dst` onto the source axis using pixel centres.
///
/// Returns the two neighbouring source indices and the weight of the second.
fn sample_coord(dst: u32, dst_len: u32, src_len: u32) -> (usize, usize, f32) {
    let last = src_len as usize - 1;
    let pos = ((dst as f32 + 0.5) * (src_len as f32 / dst_len as f32) - 0.5).max(0.0);
    let i0 = (pos.floor() as usize).min(last);
    let i1 = (i0 + 1).min(last);
    (i0, i1, (pos - i0 as f32).clamp(0.0, 1.0))
}

/// `a * (1 - t) + b * t`, element-wise.
fn lerp_rows(a: &[f32], b: &[f32], t: f32) -> Vec<f32> {
    if t <= 0.0 {
        return a.to_vec();
    }
    let n = a.len();
    let va = Vector::from_vec(a.to_vec());
    let vb = Vector::from_vec(b.to_vec());

    if let (Ok(sa), Ok(sb)) = (
        va.mul(&Vector::from_vec(vec![1.0 - t; n])),
        vb.mul(&Vector::from_vec(vec![t; n])),
    ) {
        if let Ok(sum) = sa.add(&sb) {
            return sum.as_slice().to_vec();
        }
    }

    a.iter().zip(b).map(|(x, y)| x * (1.0 - t) + y * t).collect()
}
