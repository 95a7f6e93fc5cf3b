//! YAML configuration.
//!
//! Every field has a default, so an empty document is a valid config that
//! reproduces the classic mushroom-dataset figures.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::layout::LayoutKind;
use crate::viz::{ParentLinking, SplitLevel};

/// Human-readable feature names, indexed by feature id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureNames(Vec<String>);

impl Default for FeatureNames {
    fn default() -> Self {
        Self::new(["Brown Cap", "Tapering Stalk Shape", "Solitary"])
    }
}

impl FeatureNames {
    /// Build a table from names in feature-id order.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Name of `feature`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeatureOutOfRange`] if the table has no such entry.
    pub fn get(&self, feature: usize) -> Result<&str> {
        self.0
            .get(feature)
            .map(String::as_str)
            .ok_or(Error::FeatureOutOfRange {
                feature,
                available: self.0.len(),
            })
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Human-readable class names, indexed by label value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelNames(Vec<String>);

impl Default for LabelNames {
    fn default() -> Self {
        Self::new(["Poisonous", "Edible"])
    }
}

impl LabelNames {
    /// Build a table from names in label order.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Name of `label`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LabelOutOfRange`] if the table has no such entry.
    pub fn get(&self, label: usize) -> Result<&str> {
        self.0
            .get(label)
            .map(String::as_str)
            .ok_or(Error::LabelOutOfRange {
                label,
                available: self.0.len(),
            })
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Figure size and inset scaling for one visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureConfig {
    /// Figure width in pixels.
    pub width: u32,
    /// Figure height in pixels.
    pub height: u32,
    /// A node with `n` samples gets an inset of side `n / inset_divisor`
    /// figure fractions.
    pub inset_divisor: f32,
}

impl FigureConfig {
    /// Defaults for the single-split figure.
    pub const SPLIT: Self = Self {
        width: 640,
        height: 480,
        inset_divisor: 9.0,
    };

    /// Defaults for the full-tree figure.
    pub const TREE: Self = Self {
        width: 1400,
        height: 1000,
        inset_divisor: 25.0,
    };
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_scale_divisor() -> f32 {
    crate::composite::DEFAULT_SCALE_DIVISOR
}

fn default_split() -> FigureConfig {
    FigureConfig::SPLIT
}

fn default_tree() -> FigureConfig {
    FigureConfig::TREE
}

fn default_arrow_size() -> f32 {
    15.0
}

fn default_edge_color() -> Rgba {
    Rgba::EDGE
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizConfig {
    /// Directory holding `{index}.png` thumbnails.
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Feature names, indexed by feature id.
    #[serde(default)]
    pub feature_names: FeatureNames,

    /// Class names, indexed by label value.
    #[serde(default)]
    pub label_names: LabelNames,

    /// Divisor applied to the sample count when scaling composites.
    #[serde(default = "default_scale_divisor")]
    pub composite_scale_divisor: f32,

    /// Single-split figure.
    #[serde(default = "default_split")]
    pub split: FigureConfig,

    /// Full-tree figure.
    #[serde(default = "default_tree")]
    pub tree: FigureConfig,

    /// Node layout algorithm.
    #[serde(default)]
    pub layout: LayoutKind,

    /// How tree levels find their parent node.
    #[serde(default)]
    pub parent_linking: ParentLinking,

    /// Arrowhead length in pixels.
    #[serde(default = "default_arrow_size")]
    pub arrow_size: f32,

    /// Edge colour.
    #[serde(default = "default_edge_color")]
    pub edge_color: Rgba,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            feature_names: FeatureNames::default(),
            label_names: LabelNames::default(),
            composite_scale_divisor: default_scale_divisor(),
            split: default_split(),
            tree: default_tree(),
            layout: LayoutKind::default(),
            parent_linking: ParentLinking::default(),
            arrow_size: default_arrow_size(),
            edge_color: default_edge_color(),
        }
    }
}

impl VizConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with the offending line if the YAML is invalid, or
    /// [`Error::ConfigParse`] with line 0 if a value fails [`Self::validate`].
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = parse_yaml(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the YAML types cannot express: every divisor must be
    /// finite and positive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let divisors = [
            ("composite_scale_divisor", self.composite_scale_divisor),
            ("split.inset_divisor", self.split.inset_divisor),
            ("tree.inset_divisor", self.tree.inset_divisor),
        ];
        for (key, value) in divisors {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::ConfigParse {
                    line: 0,
                    message: format!("{key} must be finite and positive, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Loads configuration from a file, falling back to defaults when the
    /// file is missing or invalid.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("using default configuration: {e}");
            Self::default()
        })
    }
}

/// A full-tree rendering job: the root sample list, labels and split levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeJob {
    /// Samples reaching the root.
    pub root: Vec<usize>,
    /// Class label per sample index.
    pub labels: Vec<usize>,
    /// Split levels in order.
    #[serde(default)]
    pub levels: Vec<SplitLevel>,
}

impl TreeJob {
    /// Loads a job from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;
        parse_yaml(&content)
    }
}

fn parse_yaml<T: serde::de::DeserializeOwned>(yaml: &str) -> Result<T> {
    serde_yaml_ng::from_str(yaml).map_err(|e| {
        let line = e.location().map_or(0, |l| l.line());
        Error::ConfigParse {
            line,
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = VizConfig::new();

        assert_eq!(config.image_dir, PathBuf::from("images"));
        assert_eq!(config.feature_names.len(), 3);
        assert_eq!(config.label_names.get(1).unwrap(), "Edible");
        assert_eq!(config.split.inset_divisor, 9.0);
        assert_eq!(config.tree.inset_divisor, 25.0);
        assert_eq!((config.tree.width, config.tree.height), (1400, 1000));
        assert_eq!(config.parent_linking, ParentLinking::Sequential);
    }

    #[test]
    fn test_config_parse_empty_is_default() {
        let config = VizConfig::parse("{}").unwrap();
        assert_eq!(config, VizConfig::default());
    }

    #[test]
    fn test_config_parse_full() {
        let yaml = r#"
image_dir: thumbs
feature_names: [Odor, Ring Type]
label_names: [Bad, Good]
composite_scale_divisor: 5.0
split:
  width: 800
  height: 600
  inset_divisor: 6.0
layout: force
parent_linking: explicit
arrow_size: 10.0
edge_color: {r: 0, g: 0, b: 255, a: 255}
"#;

        let config = VizConfig::parse(yaml).unwrap();

        assert_eq!(config.image_dir, PathBuf::from("thumbs"));
        assert_eq!(config.feature_names.get(1).unwrap(), "Ring Type");
        assert_eq!(config.label_names.get(0).unwrap(), "Bad");
        assert_eq!(config.composite_scale_divisor, 5.0);
        assert_eq!(config.split.width, 800);
        assert_eq!(config.tree, FigureConfig::TREE);
        assert_eq!(config.layout, LayoutKind::Force);
        assert_eq!(config.parent_linking, ParentLinking::Explicit);
        assert_eq!(config.edge_color, Rgba::BLUE);
    }

    #[test]
    fn test_config_parse_error_includes_line() {
        let yaml = r#"
image_dir: images
split:
  width: not_a_number
"#;

        let err = VizConfig::parse(yaml).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { line: 4, .. }), "{err}");
    }

    #[test]
    fn test_config_rejects_non_positive_divisors() {
        for yaml in [
            "composite_scale_divisor: 0.0",
            "composite_scale_divisor: -1.5",
            "split: {width: 640, height: 480, inset_divisor: 0.0}",
            "tree: {width: 1400, height: 1000, inset_divisor: .nan}",
        ] {
            let err = VizConfig::parse(yaml).unwrap_err();
            assert!(matches!(err, Error::ConfigParse { line: 0, .. }), "{yaml}: {err}");
        }
    }

    #[test]
    fn test_config_load_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("splitviz.yaml");
        std::fs::write(&path, "composite_scale_divisor: 0\n").unwrap();

        let err = VizConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("composite_scale_divisor"), "{err}");
    }

    #[test]
    fn test_config_load_not_found() {
        let err = VizConfig::load("/nonexistent/splitviz.yaml").unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn test_config_load_or_default() {
        let config = VizConfig::load_or_default("/nonexistent/path");
        assert_eq!(config.feature_names, FeatureNames::default());
    }

    #[test]
    fn test_name_tables_out_of_range() {
        let features = FeatureNames::default();
        assert_eq!(features.get(2).unwrap(), "Solitary");
        assert!(matches!(
            features.get(5),
            Err(Error::FeatureOutOfRange {
                feature: 5,
                available: 3
            })
        ));
        assert!(matches!(
            LabelNames::default().get(2),
            Err(Error::LabelOutOfRange { label: 2, .. })
        ));
    }

    #[test]
    fn test_name_tables_from_strings() {
        let features = FeatureNames::new(vec!["Odor".to_string(), "Gill Size".to_string()]);
        assert_eq!(features.len(), 2);
        assert_eq!(features.get(1).unwrap(), "Gill Size");

        let labels = LabelNames::new(["Bad"]);
        assert!(!labels.is_empty());
        assert!(matches!(
            labels.get(1),
            Err(Error::LabelOutOfRange {
                label: 1,
                available: 1
            })
        ));
    }

    #[test]
    fn test_tree_job_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.yaml");
        std::fs::write(
            &path,
            r#"
root: [0, 1, 2, 3]
labels: [0, 1, 1, 0]
levels:
  - left: [0, 1]
    right: [2, 3]
    feature: 1
  - left: [0]
    right: [1]
    feature: 2
    parent: 1
"#,
        )
        .unwrap();

        let job = TreeJob::load(&path).unwrap();
        assert_eq!(job.root, vec![0, 1, 2, 3]);
        assert_eq!(job.levels.len(), 2);
        assert_eq!(job.levels[0].parent, None);
        assert_eq!(job.levels[1].parent, Some(1));
    }
}
