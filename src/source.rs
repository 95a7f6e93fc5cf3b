//! Per-sample thumbnail sources.
//!
//! A sample index resolves to a single raster image. [`DirectorySource`] reads
//! `{root}/{index}.png`; any closure `Fn(usize) -> Result<Framebuffer>` is also
//! a source, which keeps rendering code testable without touching the disk.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;

/// Loads the thumbnail image for one sample index.
pub trait ImageSource {
    /// Load the image for `index` as an opaque RGB framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is missing or cannot be decoded.
    fn load(&self, index: usize) -> Result<Framebuffer>;
}

impl<F> ImageSource for F
where
    F: Fn(usize) -> Result<Framebuffer>,
{
    fn load(&self, index: usize) -> Result<Framebuffer> {
        self(index)
    }
}

/// Reads `{root}/{index}.png` from the filesystem.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl Default for DirectorySource {
    fn default() -> Self {
        Self::new("images")
    }
}

impl DirectorySource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the images are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the image for `index`.
    #[must_use]
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.root.join(format!("{index}.png"))
    }
}

impl ImageSource for DirectorySource {
    fn load(&self, index: usize) -> Result<Framebuffer> {
        let path = self.path_for(index);
        let file = File::open(&path).map_err(|source| Error::ImageLoad {
            index,
            path: path.clone(),
            source,
        })?;
        log::trace!("decoding {}", path.display());
        decode_png(BufReader::new(file))
    }
}

/// Decode a PNG stream into an opaque RGB framebuffer.
///
/// Palette and low bit-depth images are expanded, 16-bit channels are
/// stripped to 8 bits, grayscale is replicated across RGB and any alpha
/// channel is discarded.
///
/// # Errors
///
/// Returns an error if the stream is not a valid PNG.
pub fn decode_png<R: Read>(reader: R) -> Result<Framebuffer> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let data = &buf[..info.buffer_size()];

    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        png::ColorType::Indexed => {
            return Err(Error::UnsupportedColorType(format!("{:?}", info.color_type)));
        }
    };
    if info.bit_depth != png::BitDepth::Eight {
        return Err(Error::UnsupportedColorType(format!(
            "{:?} at {:?}",
            info.color_type, info.bit_depth
        )));
    }

    let width = info.width as usize;
    let mut rgba = Vec::with_capacity(width * info.height as usize * 4);
    for row in data.chunks_exact(info.line_size).take(info.height as usize) {
        for px in row[..width * channels].chunks_exact(channels) {
            let (r, g, b) = if channels < 3 {
                (px[0], px[0], px[0])
            } else {
                (px[0], px[1], px[2])
            };
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }

    Framebuffer::from_rgba(info.width, info.height, &rgba)
}
