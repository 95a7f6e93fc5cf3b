//! Split and tree visualizers.
//!
//! Both visualizers build a [`SplitGraph`] of composite node images, lay it out
//! once and place every node image as a captioned inset on a [`Figure`].
//! Edges are arrows from the parent image centre to the border of the child
//! image, which sits fitted inside its square inset frame.

mod split;
mod tree;

pub use split::{SplitScene, SplitVisualizer};
pub use tree::{ParentLinking, SplitLevel, TreeScene, TreeVisualizer};

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::figure::{Axes, Caption, Figure, FigureTransform, Inset};
use crate::graph::{NodeId, SplitGraph};
use crate::layout::Layout;
use crate::render::Arrow;

/// Shaft width of edge arrows in pixels.
const EDGE_WIDTH: f32 = 1.0;

/// Figure-level drawing parameters shared by both visualizers.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SceneStyle {
    pub width: u32,
    pub height: u32,
    pub inset_divisor: f32,
    pub arrow_size: f32,
    pub edge_color: Rgba,
}

/// Lay out `graph` and draw it. `captions[i]` belongs to node `i`.
pub(crate) fn draw_graph(
    graph: &SplitGraph,
    layout: &dyn Layout,
    mut captions: Vec<Option<Caption>>,
    style: SceneStyle,
) -> Result<Figure> {
    if !style.inset_divisor.is_finite() || style.inset_divisor <= 0.0 {
        return Err(Error::ScaleDomain(format!(
            "inset divisor must be finite and positive, got {}",
            style.inset_divisor
        )));
    }

    let positions = layout.positions(graph);
    log::debug!("laid out {} nodes", positions.len());

    let transform = FigureTransform::fit(&positions, Axes::DEFAULT)?;
    let mut figure = Figure::new(style.width, style.height).edge_color(style.edge_color);

    let frames: Vec<_> = graph
        .nodes()
        .iter()
        .zip(&positions)
        .map(|(node, &p)| {
            let side = node.samples as f32 / style.inset_divisor;
            figure.inset_frame(transform.to_figure(p), side)
        })
        .collect();
    let image_rects: Vec<_> = graph
        .nodes()
        .iter()
        .zip(&frames)
        .map(|(node, frame)| frame.fit(node.image.width() as f32, node.image.height() as f32))
        .collect();

    for edge in graph.edges() {
        let tail = image_rects[edge.source.index()].center();
        let tip = image_rects[edge.target.index()].entry_point(tail);
        figure.add_arrow(Arrow::new(tail, tip, EDGE_WIDTH, style.arrow_size));
    }

    captions.resize(graph.num_nodes(), None);
    for ((node, frame), caption) in graph.nodes().iter().zip(frames).zip(captions) {
        figure.add_inset(Inset {
            node: node.id,
            frame,
            image: node.image.clone(),
            caption,
        });
    }

    Ok(figure)
}

/// Caption text attached to `node`, if any.
pub(crate) fn caption_text(figure: &Figure, node: NodeId) -> Option<&str> {
    figure
        .insets()
        .iter()
        .find(|i| i.node == node)
        .and_then(|i| i.caption.as_ref())
        .map(|c| c.text.as_str())
}
