//! Thumbnail compositor.
//!
//! Tiles one image per sample left-to-right into a single strip, then shrinks
//! the strip in proportion to the sample count so that larger nodes read as
//! larger thumbnails.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::source::ImageSource;

/// Default divisor applied to `n` when scaling a composite of `n` samples.
pub const DEFAULT_SCALE_DIVISOR: f32 = 10.0;

/// Builds composite node images from per-sample thumbnails.
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    scale_divisor: f32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    /// Create a compositor with the default scale divisor of 10.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scale_divisor: DEFAULT_SCALE_DIVISOR,
        }
    }

    /// Set the divisor: a strip of `n` samples is scaled by `n / divisor`.
    #[must_use]
    pub fn scale_divisor(mut self, divisor: f32) -> Self {
        self.scale_divisor = divisor;
        self
    }

    /// Tile the images for `indices` left-to-right without scaling.
    ///
    /// Width is the sum of image widths, height the max of image heights.
    /// Uncovered area below shorter images is opaque black.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyIndices`] for an empty list, or the first load
    /// error from `source`.
    pub fn unscaled<S: ImageSource + ?Sized>(
        &self,
        source: &S,
        indices: &[usize],
    ) -> Result<Framebuffer> {
        if indices.is_empty() {
            return Err(Error::EmptyIndices);
        }

        let images = indices
            .iter()
            .map(|&i| source.load(i))
            .collect::<Result<Vec<_>>>()?;

        let total_width: u32 = images.iter().map(Framebuffer::width).sum();
        let max_height = images.iter().map(Framebuffer::height).max().unwrap_or(0);

        let mut strip = Framebuffer::new(total_width, max_height)?;
        strip.clear(Rgba::BLACK);

        let mut x_offset = 0i32;
        for image in &images {
            strip.paste(image, x_offset, 0);
            x_offset += image.width() as i32;
        }

        Ok(strip)
    }

    /// Tile the images for `indices` and scale the strip by
    /// `indices.len() / divisor` on both axes (floored).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScaleDomain`] if the divisor is not finite and
    /// positive, [`Error::EmptyIndices`] for an empty list, the first load
    /// error from `source`, or [`Error::InvalidDimensions`] if a scaled side
    /// rounds down to zero.
    pub fn build<S: ImageSource + ?Sized>(
        &self,
        source: &S,
        indices: &[usize],
    ) -> Result<Framebuffer> {
        if !self.scale_divisor.is_finite() || self.scale_divisor <= 0.0 {
            return Err(Error::ScaleDomain(format!(
                "composite scale divisor must be finite and positive, got {}",
                self.scale_divisor
            )));
        }
        let strip = self.unscaled(source, indices)?;
        let (width, height) = self.scaled_size(strip.width(), strip.height(), indices.len());
        log::debug!(
            "composite of {} samples: {}x{} -> {}x{}",
            indices.len(),
            strip.width(),
            strip.height(),
            width,
            height
        );
        strip.resize(width, height)
    }

    /// Size of a strip of `samples` images after scaling.
    #[must_use]
    pub fn scaled_size(&self, width: u32, height: u32, samples: usize) -> (u32, u32) {
        let n = samples as f64;
        let divisor = f64::from(self.scale_divisor);
        (
            (f64::from(width) * n / divisor).floor() as u32,
            (f64::from(height) * n / divisor).floor() as u32,
        )
    }
}

/// Build a composite image with the default compositor.
///
/// # Errors
///
/// See [`Compositor::build`].
pub fn build_composite<S: ImageSource + ?Sized>(
    source: &S,
    indices: &[usize],
) -> Result<Framebuffer> {
    Compositor::new().build(source, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Image `i` is `(i + 4)` wide, `(i % 3 + 5)` tall, filled with grey `i * 10`.
    fn synthetic(i: usize) -> Result<Framebuffer> {
        let mut fb = Framebuffer::new(i as u32 + 4, (i % 3) as u32 + 5)?;
        let v = (i * 10) as u8;
        fb.clear(Rgba::rgb(v, v, v));
        Ok(fb)
    }

    #[test]
    fn test_empty_indices_fail_fast() {
        let calls = std::cell::Cell::new(0);
        let source = |i: usize| {
            calls.set(calls.get() + 1);
            synthetic(i)
        };
        assert!(matches!(build_composite(&source, &[]), Err(Error::EmptyIndices)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_unscaled_sum_and_max() {
        let strip = Compositor::new().unscaled(&synthetic, &[0, 1, 2]).unwrap();
        assert_eq!(strip.width(), 4 + 5 + 6);
        assert_eq!(strip.height(), 7);
    }

    #[test]
    fn test_unscaled_offsets_and_black_fill() {
        let strip = Compositor::new().unscaled(&synthetic, &[1, 2]).unwrap();
        // image 1 occupies x 0..5, 6 rows tall
        assert_eq!(strip.get_pixel(0, 0), Some(Rgba::rgb(10, 10, 10)));
        assert_eq!(strip.get_pixel(4, 5), Some(Rgba::rgb(10, 10, 10)));
        assert_eq!(strip.get_pixel(4, 6), Some(Rgba::BLACK));
        // image 2 starts at x = 5
        assert_eq!(strip.get_pixel(5, 6), Some(Rgba::rgb(20, 20, 20)));
    }

    #[test]
    fn test_scaled_dimensions() {
        // 20 images of 4..23 width -> total 270, max height 7; n/10 = 2
        let indices: Vec<usize> = (0..20).collect();
        let fb = build_composite(&synthetic, &indices).unwrap();
        assert_eq!(fb.width(), 270 * 2);
        assert_eq!(fb.height(), 7 * 2);
    }

    #[test]
    fn test_scaled_dimensions_floor() {
        // 3 images: widths 4+5+6 = 15, heights max 7; factor 0.3
        let fb = build_composite(&synthetic, &[0, 1, 2]).unwrap();
        assert_eq!(fb.width(), 4); // floor(4.5)
        assert_eq!(fb.height(), 2); // floor(2.1)
    }

    #[test]
    fn test_scaled_to_zero_is_error() {
        let result = build_composite(&synthetic, &[0]);
        assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn test_load_failure_aborts() {
        let source = |i: usize| {
            if i == 2 {
                Err(Error::EmptyIndices)
            } else {
                synthetic(i)
            }
        };
        assert!(build_composite(&source, &[0, 1, 2, 3]).is_err());
    }

    #[test]
    fn test_custom_divisor() {
        let c = Compositor::new().scale_divisor(1.0);
        assert_eq!(c.scaled_size(10, 4, 2), (20, 8));
    }

    #[test]
    fn test_non_positive_divisor_is_rejected() {
        for divisor in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            let result = Compositor::new().scale_divisor(divisor).build(&synthetic, &[0, 1]);
            assert!(matches!(result, Err(Error::ScaleDomain(_))), "divisor {divisor}");
        }
    }

    #[test]
    fn test_deterministic() {
        let indices = [3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];
        let a = build_composite(&synthetic, &indices).unwrap();
        let b = build_composite(&synthetic, &indices).unwrap();
        assert_eq!(a.to_compact_pixels(), b.to_compact_pixels());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_composite_dimensions(
                sizes in prop::collection::vec((1u32..40, 1u32..40), 1..24)
            ) {
                let source = |i: usize| -> Result<Framebuffer> {
                    let (w, h) = sizes[i];
                    Framebuffer::new(w, h)
                };
                let indices: Vec<usize> = (0..sizes.len()).collect();
                let total_w: u32 = sizes.iter().map(|s| s.0).sum();
                let max_h = sizes.iter().map(|s| s.1).max().unwrap();

                let strip = Compositor::new().unscaled(&source, &indices).unwrap();
                prop_assert_eq!((strip.width(), strip.height()), (total_w, max_h));

                let n = indices.len() as u64;
                let expected = (
                    (u64::from(total_w) * n / 10) as u32,
                    (u64::from(max_h) * n / 10) as u32,
                );
                match build_composite(&source, &indices) {
                    Ok(fb) => prop_assert_eq!((fb.width(), fb.height()), expected),
                    Err(Error::InvalidDimensions { .. }) => {
                        prop_assert!(expected.0 == 0 || expected.1 == 0);
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {}", e),
                }
            }
        }
    }
}
