//! Raster rendering of figure primitives.
//!
//! # Algorithms
//!
//! - **Wu's Anti-aliased Line**: Smooth edge shafts with sub-pixel accuracy
//! - **Scanline triangle fill**: Arrowheads
//!
//! # References
//!
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.

mod primitives;

pub use primitives::{draw_line_aa, draw_thick_line, fill_triangle, Arrow, Drawable};
