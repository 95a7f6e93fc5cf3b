//! Error types for splitviz operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compositing or rendering split figures.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// PNG decoding error.
    #[error("PNG decoding error: {0}")]
    PngDecoding(#[from] png::DecodingError),

    /// The image for a sample index could not be opened.
    #[error("Cannot load image for sample {index} from {}: {source}", path.display())]
    ImageLoad {
        /// Sample index that was requested.
        index: usize,
        /// Path the image was expected at.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Decoded image has a pixel layout that cannot be converted to RGB.
    #[error("Unsupported color type: {0}")]
    UnsupportedColorType(String),

    /// Invalid dimensions for a framebuffer or composite.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Scale domain error (e.g., zero-width data extent).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// A composite was requested for an empty index list.
    #[error("Cannot build a composite image from an empty index list")]
    EmptyIndices,

    /// Feature id does not name an entry in the feature table.
    #[error("Feature id {feature} out of range ({available} feature names available)")]
    FeatureOutOfRange {
        /// Requested feature id.
        feature: usize,
        /// Number of entries in the feature table.
        available: usize,
    },

    /// Label value does not name an entry in the label table.
    #[error("Label {label} out of range ({available} label names available)")]
    LabelOutOfRange {
        /// Label value found in the label array.
        label: usize,
        /// Number of entries in the label table.
        available: usize,
    },

    /// Sample index is beyond the end of the label array.
    #[error("Sample {index} has no label ({len} labels provided)")]
    SampleOutOfRange {
        /// Offending sample index.
        index: usize,
        /// Length of the label array.
        len: usize,
    },

    /// Edge or parent refers to a node that does not exist.
    #[error("Unknown node {node} (graph has {num_nodes} nodes)")]
    UnknownNode {
        /// Requested node id.
        node: usize,
        /// Number of nodes currently in the graph.
        num_nodes: usize,
    },

    /// A tree level has no parent id while parents are linked explicitly.
    #[error("Tree level {level} has no parent node")]
    MissingParent {
        /// Index of the level.
        level: usize,
    },

    /// Configuration file could not be read.
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    /// Configuration file could not be parsed.
    #[error("Config parse error at line {line}: {message}")]
    ConfigParse {
        /// Line number of the failure (0 when unknown).
        line: usize,
        /// Parser message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidDimensions {
            width: 0,
            height: 100,
        };
        assert!(err.to_string().contains("Invalid dimensions"));
    }

    #[test]
    fn test_feature_out_of_range_display() {
        let err = Error::FeatureOutOfRange {
            feature: 5,
            available: 3,
        };
        assert!(err.to_string().contains('5'));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_image_load_names_path() {
        let err = Error::ImageLoad {
            index: 7,
            path: PathBuf::from("images/7.png"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("sample 7"));
        assert!(msg.contains("images/7.png"));
    }
}
