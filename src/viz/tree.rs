//! Full-tree visualizer: one node per composite, two children per split level.

use batuta_common::display::WithDimensions;
use serde::{Deserialize, Serialize};

use super::{caption_text, draw_graph, SceneStyle};
use crate::composite::Compositor;
use crate::config::VizConfig;
use crate::error::{Error, Result};
use crate::figure::{Caption, Figure};
use crate::graph::{NodeId, SplitGraph};
use crate::layout::Layout;
use crate::source::ImageSource;

/// Leaf captions sit this many inset heights below their inset.
const LEAF_CAPTION_OFFSET: f32 = 0.8;

/// Font size of leaf captions.
const LEAF_CAPTION_FONT_SIZE: f32 = 13.0;

/// One decision: the samples sent left and right, and the feature tested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitLevel {
    /// Samples where the feature is present.
    pub left: Vec<usize>,
    /// Samples where the feature is absent.
    pub right: Vec<usize>,
    /// Feature id tested at this level.
    pub feature: usize,
    /// Parent node id, used with [`ParentLinking::Explicit`].
    #[serde(default)]
    pub parent: Option<usize>,
}

impl SplitLevel {
    /// Level without an explicit parent.
    #[must_use]
    pub fn new(left: Vec<usize>, right: Vec<usize>, feature: usize) -> Self {
        Self {
            left,
            right,
            feature,
            parent: None,
        }
    }

    /// Attach the level to node `parent`.
    #[must_use]
    pub fn parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// How each level's parent node is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentLinking {
    /// Level `i` hangs off node `i`.
    #[default]
    Sequential,
    /// Level hangs off [`SplitLevel::parent`].
    Explicit,
}

/// Renders a multi-level tree.
pub struct TreeVisualizer<S> {
    source: S,
    config: VizConfig,
    layout: Box<dyn Layout>,
}

impl<S: ImageSource> TreeVisualizer<S> {
    /// Create a visualizer reading thumbnails from `source`.
    pub fn new(source: S, config: VizConfig) -> Self {
        let layout = config.layout.build();
        Self {
            source,
            config,
            layout,
        }
    }

    /// Replace the configured layout.
    #[must_use]
    pub fn layout(mut self, layout: impl Layout + 'static) -> Self {
        self.layout = Box::new(layout);
        self
    }

    /// Select how levels find their parent.
    #[must_use]
    pub fn parent_linking(mut self, linking: ParentLinking) -> Self {
        self.config.parent_linking = linking;
        self
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    /// Build the tree scene.
    ///
    /// Node 0 is the root; level `i` adds its left child as node `2i + 1` and
    /// its right child as node `2i + 2`. Names, labels and parents are all
    /// validated before any image is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeatureOutOfRange`], [`Error::SampleOutOfRange`],
    /// [`Error::LabelOutOfRange`], [`Error::MissingParent`] or
    /// [`Error::UnknownNode`] for invalid input, or any compositing error.
    pub fn render(
        &self,
        root: &[usize],
        labels: &[usize],
        levels: &[SplitLevel],
    ) -> Result<TreeScene> {
        let decision_captions = levels
            .iter()
            .map(|level| {
                let name = self.config.feature_names.get(level.feature)?;
                Ok(format!("Split on: {name}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut leaf_captions = Vec::new();
        for level in levels.iter().skip(1) {
            for child in [&level.left, &level.right] {
                let label = self.config.label_names.get(leaf_label(child, labels)?)?;
                leaf_captions.push(format!("Leaf node: {label}"));
            }
        }

        let parents = levels
            .iter()
            .enumerate()
            .map(|(i, level)| self.parent_of(i, level))
            .collect::<Result<Vec<_>>>()?;

        let compositor = Compositor::new().scale_divisor(self.config.composite_scale_divisor);
        let mut graph = SplitGraph::new();
        graph.add_node(compositor.build(&self.source, root)?, root.len());
        for (level, parent) in levels.iter().zip(parents) {
            for child in [&level.left, &level.right] {
                let id = graph.add_node(compositor.build(&self.source, child)?, child.len());
                graph.add_edge(parent, id)?;
            }
        }

        let captions = decision_captions
            .iter()
            .map(|t| Some(Caption::above(t.as_str())))
            .chain(leaf_captions.iter().map(|t| {
                Some(
                    Caption::below_left(t.as_str(), LEAF_CAPTION_OFFSET)
                        .font_size(LEAF_CAPTION_FONT_SIZE),
                )
            }))
            .collect();

        let figure = draw_graph(
            &graph,
            self.layout.as_ref(),
            captions,
            SceneStyle {
                width: self.config.tree.width,
                height: self.config.tree.height,
                inset_divisor: self.config.tree.inset_divisor,
                arrow_size: self.config.arrow_size,
                edge_color: self.config.edge_color,
            },
        )?;

        Ok(TreeScene {
            graph,
            decision_captions,
            leaf_captions,
            figure,
        })
    }

    /// Parent node of level `i`. Only nodes created by earlier levels qualify.
    fn parent_of(&self, i: usize, level: &SplitLevel) -> Result<NodeId> {
        match self.config.parent_linking {
            ParentLinking::Sequential => Ok(NodeId(i)),
            ParentLinking::Explicit => {
                let parent = level.parent.ok_or(Error::MissingParent { level: i })?;
                let existing = 1 + 2 * i;
                if parent >= existing {
                    return Err(Error::UnknownNode {
                        node: parent,
                        num_nodes: existing,
                    });
                }
                Ok(NodeId(parent))
            }
        }
    }
}

impl<S> WithDimensions for TreeVisualizer<S> {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.config.tree.width = width;
        self.config.tree.height = height;
    }
}

/// Largest label among `samples`.
fn leaf_label(samples: &[usize], labels: &[usize]) -> Result<usize> {
    let mut max = None;
    for &s in samples {
        let label = *labels.get(s).ok_or(Error::SampleOutOfRange {
            index: s,
            len: labels.len(),
        })?;
        max = Some(max.map_or(label, |m: usize| m.max(label)));
    }
    max.ok_or(Error::EmptyIndices)
}

/// Result of [`TreeVisualizer::render`].
#[derive(Debug, Clone)]
pub struct TreeScene {
    graph: SplitGraph,
    decision_captions: Vec<String>,
    leaf_captions: Vec<String>,
    figure: Figure,
}

impl TreeScene {
    /// The tree graph.
    #[must_use]
    pub fn graph(&self) -> &SplitGraph {
        &self.graph
    }

    /// One `"Split on: ..."` caption per level.
    #[must_use]
    pub fn decision_captions(&self) -> &[String] {
        &self.decision_captions
    }

    /// Two `"Leaf node: ..."` captions per level after the first.
    #[must_use]
    pub fn leaf_captions(&self) -> &[String] {
        &self.leaf_captions
    }

    /// Decision captions followed by leaf captions; entry `i` labels node `i`.
    pub fn captions(&self) -> impl Iterator<Item = &str> {
        self.decision_captions
            .iter()
            .chain(&self.leaf_captions)
            .map(String::as_str)
    }

    /// Caption attached to `node` on the figure.
    #[must_use]
    pub fn node_caption(&self, node: NodeId) -> Option<&str> {
        caption_text(&self.figure, node)
    }

    /// The drawn figure.
    #[must_use]
    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    /// Take ownership of the figure.
    #[must_use]
    pub fn into_figure(self) -> Figure {
        self.figure
    }
}
