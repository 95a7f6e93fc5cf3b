//! # splitviz
//!
//! Decision-tree split visualization built on [trueno](https://crates.io/crates/trueno).
//!
//! Every tree node is drawn as a composite of the thumbnail images of the
//! samples that reach it, tiled left-to-right and scaled by the sample count.
//! Nodes are laid out as a directed graph and placed on an explicit
//! [`figure::Figure`], which is written to SVG or PNG.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use splitviz::prelude::*;
//!
//! let viz = SplitVisualizer::new(DirectorySource::new("images"), VizConfig::default());
//! let scene = viz.render(&[1, 2], &[1], &[2], 0)?;
//! scene.figure().present(&Output::Svg("split.svg".into()))?;
//! # Ok::<(), splitviz::Error>(())
//! ```
//!
//! ## References
//!
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
//! - Fruchterman, T. M. J., & Reingold, E. M. (1991). Force-directed graph layout.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code (Cloudflare incident 2025-11-18)
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color type.
pub mod color;

/// RGBA pixel buffer.
pub mod framebuffer;

/// Geometric primitives (points, rectangles).
pub mod geometry;

/// Scale functions for data-to-figure mappings.
pub mod scale;

// ============================================================================
// Data Modules
// ============================================================================

/// Per-sample thumbnail sources.
pub mod source;

/// Composite node images.
pub mod composite;

/// Directed split graph.
pub mod graph;

/// Node layout algorithms.
pub mod layout;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Explicit figure canvas.
pub mod figure;

/// Raster primitives.
pub mod render;

/// Output encoders (PNG, SVG).
pub mod output;

/// Split and tree visualizers.
pub mod viz;

// ============================================================================
// Configuration and Errors
// ============================================================================

/// YAML configuration.
pub mod config;

/// Error types for splitviz operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use splitviz::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::color::Rgba;
    pub use crate::composite::{build_composite, Compositor};
    pub use crate::config::{FeatureNames, LabelNames, TreeJob, VizConfig};
    pub use crate::error::{Error, Result};
    pub use crate::figure::{Figure, Output};
    pub use crate::framebuffer::Framebuffer;
    pub use crate::geometry::{Point, Rect};
    pub use crate::graph::{NodeId, SplitGraph};
    pub use crate::layout::{ForceLayout, Layout, LayoutKind, ShellLayout};
    pub use crate::source::{DirectorySource, ImageSource};
    pub use crate::viz::{
        ParentLinking, SplitLevel, SplitScene, SplitVisualizer, TreeScene, TreeVisualizer,
    };
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
