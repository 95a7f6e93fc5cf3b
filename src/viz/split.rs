//! Single-split visualizer: a parent node and its two children.

use batuta_common::display::WithDimensions;

use super::{caption_text, draw_graph, SceneStyle};
use crate::composite::Compositor;
use crate::config::VizConfig;
use crate::error::Result;
use crate::figure::{Caption, Figure};
use crate::graph::{NodeId, SplitGraph};
use crate::layout::Layout;
use crate::source::ImageSource;

/// Renders one split: node 0 is the parent, node 1 the left child (feature
/// present) and node 2 the right child (feature absent).
pub struct SplitVisualizer<S> {
    source: S,
    config: VizConfig,
    layout: Box<dyn Layout>,
}

impl<S: ImageSource> SplitVisualizer<S> {
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

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    /// Build the three-node split scene.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FeatureOutOfRange`] before any image is loaded
    /// if `feature` has no name, or any compositing error.
    pub fn render(
        &self,
        parent: &[usize],
        left: &[usize],
        right: &[usize],
        feature: usize,
    ) -> Result<SplitScene> {
        let name = self.config.feature_names.get(feature)?;
        let compositor = Compositor::new().scale_divisor(self.config.composite_scale_divisor);

        let mut graph = SplitGraph::new();
        let mut ids = [NodeId(0); 3];
        for (id, indices) in ids.iter_mut().zip([parent, left, right]) {
            *id = graph.add_node(compositor.build(&self.source, indices)?, indices.len());
        }
        graph.add_edge(ids[0], ids[1])?;
        graph.add_edge(ids[0], ids[2])?;

        let captions = [
            format!("Splitting on {name}"),
            format!("Left: {name} = 1"),
            format!("Right: {name} = 0"),
        ];
        let figure = draw_graph(
            &graph,
            self.layout.as_ref(),
            captions.iter().map(|t| Some(Caption::above(t.as_str()))).collect(),
            SceneStyle {
                width: self.config.split.width,
                height: self.config.split.height,
                inset_divisor: self.config.split.inset_divisor,
                arrow_size: self.config.arrow_size,
                edge_color: self.config.edge_color,
            },
        )?;

        Ok(SplitScene {
            graph,
            captions: captions.to_vec(),
            figure,
        })
    }
}

impl<S> WithDimensions for SplitVisualizer<S> {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.config.split.width = width;
        self.config.split.height = height;
    }
}

/// Result of [`SplitVisualizer::render`].
#[derive(Debug, Clone)]
pub struct SplitScene {
    graph: SplitGraph,
    captions: Vec<String>,
    figure: Figure,
}

impl SplitScene {
    /// The three-node graph.
    #[must_use]
    pub fn graph(&self) -> &SplitGraph {
        &self.graph
    }

    /// Captions of nodes 0, 1 and 2.
    #[must_use]
    pub fn captions(&self) -> &[String] {
        &self.captions
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::error::Error;
    use crate::figure::DEFAULT_FONT_SIZE;
    use crate::framebuffer::Framebuffer;
    use crate::graph::GraphEdge;
    use crate::layout::ForceLayout;
    use std::cell::Cell;

    fn thumb(i: usize) -> Result<Framebuffer> {
        let mut fb = Framebuffer::new(20, 16)?;
        let v = (i * 40) as u8;
        fb.clear(Rgba::rgb(v, 255 - v, 128));
        Ok(fb)
    }

    fn visualizer() -> SplitVisualizer<fn(usize) -> Result<Framebuffer>> {
        SplitVisualizer::new(thumb as fn(usize) -> Result<Framebuffer>, VizConfig::default())
    }

    #[test]
    fn test_split_graph_shape() {
        let scene = visualizer().render(&[1, 2], &[1], &[2], 0).unwrap();
        let g = scene.graph();

        assert_eq!(g.num_nodes(), 3);
        assert_eq!(
            g.edges(),
            &[
                GraphEdge {
                    source: NodeId(0),
                    target: NodeId(1)
                },
                GraphEdge {
                    source: NodeId(0),
                    target: NodeId(2)
                },
            ]
        );
        assert_eq!(g.node(NodeId(0)).unwrap().samples, 2);
        assert_eq!(g.node(NodeId(2)).unwrap().samples, 1);
    }

    #[test]
    fn test_split_captions() {
        let scene = visualizer().render(&[1, 2], &[1], &[2], 0).unwrap();

        assert_eq!(
            scene.captions(),
            &[
                "Splitting on Brown Cap".to_string(),
                "Left: Brown Cap = 1".to_string(),
                "Right: Brown Cap = 0".to_string(),
            ]
        );
        assert_eq!(scene.node_caption(NodeId(1)), Some("Left: Brown Cap = 1"));
    }

    #[test]
    fn test_split_feature_out_of_range_before_io() {
        let calls = Cell::new(0);
        let source = |i: usize| -> Result<Framebuffer> {
            calls.set(calls.get() + 1);
            thumb(i)
        };
        let viz = SplitVisualizer::new(source, VizConfig::default());

        let err = viz.render(&[1, 2], &[1], &[2], 5).unwrap_err();
        assert!(matches!(
            err,
            Error::FeatureOutOfRange {
                feature: 5,
                available: 3
            }
        ));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_split_inset_sides_follow_sample_count() {
        let indices: Vec<usize> = (0..10).collect();
        let scene = visualizer()
            .render(&indices, &indices[..6], &indices[6..], 2)
            .unwrap();
        let fig = scene.figure();
        let insets = fig.insets();

        assert_eq!(insets.len(), 3);
        let expected = 10.0 / 9.0 * fig.width() as f32;
        assert!((insets[0].frame.width - expected).abs() < 1e-3);
        assert!(insets[1].frame.width > insets[2].frame.width);
    }

    #[test]
    fn test_split_arrows_end_at_child_border() {
        let scene = visualizer().render(&[1, 2], &[1], &[2], 1).unwrap();
        let fig = scene.figure();

        assert_eq!(fig.arrows().len(), 2);
        for (arrow, inset) in fig.arrows().iter().zip(&fig.insets()[1..]) {
            assert_eq!(arrow.tail, fig.insets()[0].image_rect().center());
            let f = inset.image_rect();
            let on_x = (arrow.tip.x - f.x).abs() < 1e-3 || (arrow.tip.x - f.x - f.width).abs() < 1e-3;
            let on_y = (arrow.tip.y - f.y).abs() < 1e-3 || (arrow.tip.y - f.y - f.height).abs() < 1e-3;
            assert!(on_x || on_y, "tip {:?} not on border of {:?}", arrow.tip, f);
        }
    }

    #[test]
    fn test_split_captions_hug_wide_images() {
        let square = |_: usize| -> Result<Framebuffer> {
            let mut fb = Framebuffer::new(64, 64)?;
            fb.clear(Rgba::BLUE);
            Ok(fb)
        };
        let indices: Vec<usize> = (0..10).collect();
        let scene = SplitVisualizer::new(square, VizConfig::default())
            .render(&indices, &indices[..6], &indices[6..], 0)
            .unwrap();
        let fig = scene.figure();

        for inset in fig.insets() {
            let caption = inset.caption.as_ref().unwrap();
            let image = inset.image_rect();
            let (at, _) = caption.anchor(image);
            assert!(at.x >= 0.0 && at.x <= fig.width() as f32, "{at:?}");
            assert!(at.y >= 0.0 && at.y <= fig.height() as f32, "{at:?}");
            let gap = image.y - at.y;
            assert!(gap > 0.0 && gap <= caption.font_size, "gap {gap}");
        }

        let svg = fig.to_svg().unwrap().render();
        let root = fig.insets()[0].image_rect();
        let y = root.y - DEFAULT_FONT_SIZE * 0.5;
        assert!(svg.contains(&format!(r#"y="{y}" font-size"#)), "caption not at {y}");
    }

    #[test]
    fn test_split_zero_divisors_are_errors() {
        let mut config = VizConfig::default();
        config.composite_scale_divisor = 0.0;
        let viz = SplitVisualizer::new(thumb as fn(usize) -> Result<Framebuffer>, config);
        assert!(matches!(
            viz.render(&[1, 2], &[1], &[2], 0),
            Err(Error::ScaleDomain(_))
        ));

        let mut config = VizConfig::default();
        config.split.inset_divisor = 0.0;
        let viz = SplitVisualizer::new(thumb as fn(usize) -> Result<Framebuffer>, config);
        assert!(matches!(
            viz.render(&[1, 2], &[1], &[2], 0),
            Err(Error::ScaleDomain(_))
        ));
    }

    #[test]
    fn test_split_custom_layout_and_dimensions() {
        let scene = visualizer()
            .layout(ForceLayout::new().iterations(20))
            .dimensions(300, 200)
            .render(&[1, 2], &[1], &[2], 0)
            .unwrap();

        assert_eq!((scene.figure().width(), scene.figure().height()), (300, 200));
        assert_eq!(scene.figure().insets().len(), 3);
    }

    #[test]
    fn test_split_load_failure_propagates() {
        let source = |i: usize| -> Result<Framebuffer> {
            if i == 2 {
                Err(Error::EmptyIndices)
            } else {
                thumb(i)
            }
        };
        let viz = SplitVisualizer::new(source, VizConfig::default());
        assert!(viz.render(&[1, 2], &[1], &[2], 0).is_err());
    }
}
