//! Node layout algorithms.
//!
//! A layout assigns every node of a [`SplitGraph`] a position in data
//! coordinates (y up). Any algorithm works as long as it is deterministic for a
//! given graph shape; the figure rescales positions to fit its axes.
//!
//! - [`ShellLayout`]: all nodes evenly spaced on one circle.
//! - [`ForceLayout`]: Fruchterman-Reingold force-directed placement.
//!
//! Reference: Fruchterman & Reingold (1991), "Graph Drawing by Force-directed Placement"

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::graph::SplitGraph;

/// Assigns positions to graph nodes.
pub trait Layout {
    /// One position per node, indexed by node id.
    fn positions(&self, graph: &SplitGraph) -> Vec<Point>;
}

/// Layout algorithm selector, as used in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// [`ShellLayout`]
    #[default]
    Shell,
    /// [`ForceLayout`]
    Force,
}

impl LayoutKind {
    /// Instantiate the layout with default parameters.
    #[must_use]
    pub fn build(self) -> Box<dyn Layout> {
        match self {
            Self::Shell => Box::new(ShellLayout::new()),
            Self::Force => Box::new(ForceLayout::new()),
        }
    }
}

/// Places nodes on a single circle.
///
/// Node `i` of `n` sits at angle `π + 2π·i / n` on a circle of radius
/// `scale`. A lone node sits at the origin.
#[derive(Debug, Clone, Copy)]
pub struct ShellLayout {
    scale: f32,
}

impl Default for ShellLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellLayout {
    /// Create a shell layout with radius 1.
    #[must_use]
    pub fn new() -> Self {
        Self { scale: 1.0 }
    }

    /// Set the circle radius.
    #[must_use]
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

impl Layout for ShellLayout {
    fn positions(&self, graph: &SplitGraph) -> Vec<Point> {
        let n = graph.num_nodes();
        if n == 1 {
            return vec![Point::ORIGIN];
        }
        (0..n)
            .map(|i| {
                let theta = PI + 2.0 * PI * i as f32 / n as f32;
                Point::new(self.scale * theta.cos(), self.scale * theta.sin())
            })
            .collect()
    }
}

/// Force-directed layout using the Fruchterman-Reingold algorithm.
///
/// Initial positions come from a fixed linear congruential sequence, so the
/// result depends only on the graph shape. Output is normalized to `[-1, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct ForceLayout {
    /// Number of simulation iterations
    iterations: usize,
    /// Repulsion strength (k² term)
    repulsion: f32,
    /// Attraction strength
    attraction: f32,
    /// Initial temperature (max displacement per step)
    temperature: f32,
}

/// Side of the square simulation area.
const FORCE_AREA: f32 = 400.0;

impl Default for ForceLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceLayout {
    /// Create a force layout with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            iterations: 100,
            repulsion: 10000.0,
            attraction: 0.01,
            temperature: 100.0,
        }
    }

    /// Set number of simulation iterations.
    #[must_use]
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set repulsion strength.
    #[must_use]
    pub fn repulsion(mut self, repulsion: f32) -> Self {
        self.repulsion = repulsion;
        self
    }

    /// Set attraction strength.
    #[must_use]
    pub fn attraction(mut self, attraction: f32) -> Self {
        self.attraction = attraction;
        self
    }

    fn simulate(&self, graph: &SplitGraph) -> Vec<Point> {
        let n = graph.num_nodes();
        let mut pos: Vec<Point> = (0..n)
            .map(|i| {
                let seed = i.wrapping_mul(1103515245).wrapping_add(12345);
                Point::new(
                    (seed % 1000) as f32 / 1000.0 * FORCE_AREA,
                    ((seed / 1000) % 1000) as f32 / 1000.0 * FORCE_AREA,
                )
            })
            .collect();
        let mut disp = vec![Point::ORIGIN; n];
        let mut temp = self.temperature;

        for _ in 0..self.iterations {
            // Repulsion between all pairs
            for i in 0..n {
                disp[i] = Point::ORIGIN;
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dx = pos[i].x - pos[j].x;
                    let dy = pos[i].y - pos[j].y;
                    let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                    let force = self.repulsion / dist;
                    disp[i].x += dx / dist * force;
                    disp[i].y += dy / dist * force;
                }
            }

            // Attraction along edges
            for edge in graph.edges() {
                let (s, t) = (edge.source.index(), edge.target.index());
                let dx = pos[t].x - pos[s].x;
                let dy = pos[t].y - pos[s].y;
                let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                let force = dist * self.attraction;

                let fx = dx / dist * force;
                let fy = dy / dist * force;
                disp[s].x += fx;
                disp[s].y += fy;
                disp[t].x -= fx;
                disp[t].y -= fy;
            }

            for (p, d) in pos.iter_mut().zip(&disp) {
                let len = (d.x * d.x + d.y * d.y).sqrt().max(0.01);
                let capped = len.min(temp);
                p.x = (p.x + d.x / len * capped).clamp(0.0, FORCE_AREA);
                p.y = (p.y + d.y / len * capped).clamp(0.0, FORCE_AREA);
            }

            temp *= 0.95;
        }

        pos
    }
}

impl Layout for ForceLayout {
    fn positions(&self, graph: &SplitGraph) -> Vec<Point> {
        let pos = self.simulate(graph);
        if pos.len() <= 1 {
            return vec![Point::ORIGIN; pos.len()];
        }
        normalize(&pos)
    }
}

/// Rescale positions so the larger extent spans `[-1, 1]`, centred on 0.
fn normalize(pos: &[Point]) -> Vec<Point> {
    let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
    for p in pos {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    let half = ((max_x - min_x).max(max_y - min_y) / 2.0).max(f32::EPSILON);
    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;
    pos.iter()
        .map(|p| Point::new((p.x - cx) / half, (p.y - cy) / half))
        .collect()
}
