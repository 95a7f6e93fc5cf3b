//! Directed graph of split nodes.
//!
//! Nodes are numbered in insertion order. Each carries the composite image of
//! its samples and the sample count used for inset sizing. Nodes are never
//! removed or mutated once added.

use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;

/// Identifier of a node, equal to its insertion index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Position of the node in insertion order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A node in the split graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Node identifier
    pub id: NodeId,
    /// Composite image of the node's samples
    pub image: Framebuffer,
    /// Number of samples that reached this node
    pub samples: usize,
}

/// A directed edge from parent to child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
}

/// Directed graph whose nodes carry composite images.
#[derive(Debug, Clone, Default)]
pub struct SplitGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl SplitGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id.
    pub fn add_node(&mut self, image: Framebuffer, samples: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(GraphNode { id, image, samples });
        id
    }

    /// Add a directed edge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if either endpoint has not been added.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<()> {
        for node in [source, target] {
            if node.0 >= self.nodes.len() {
                return Err(Error::UnknownNode {
                    node: node.0,
                    num_nodes: self.nodes.len(),
                });
            }
        }
        self.edges.push(GraphEdge { source, target });
        Ok(())
    }

    /// Get number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0)
    }

    /// Nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Children of `id`, in edge insertion order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.source == id)
            .map(|e| e.target)
    }
}
