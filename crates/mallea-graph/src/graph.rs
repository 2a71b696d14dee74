//! Control graph construction.
//!
//! Nodes are laid out on a near-uniform grid whose `rows × cols` is close to
//! the requested node count. Interior nodes get a small seeded jitter so the
//! deformation does not pick up grid-aligned artifacts; border nodes stay on
//! the image boundary. Every node pair closer than
//! `spacing × max_edge_distance_ratio` is connected.

use mallea_math::{DMat2, DVec2};
use mallea_types::constants::{
    DEFAULT_JITTER_RATIO, DEFAULT_MAX_EDGE_DISTANCE_RATIO, DEFAULT_NODE_COUNT,
};
use mallea_types::{NodeId, WarpError, WarpResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::node::{ControlNode, GraphEdge};

/// Parameters for building a control graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// Target number of nodes. The grid lands within ±20% of it for
    /// `node_count ≥ 4`; smaller requests still get the 2 × 2 minimum.
    pub node_count: usize,
    /// Interior jitter amplitude as a fraction of grid spacing, in `[0, 1)`.
    pub jitter_ratio: f64,
    /// Edge radius as a multiple of grid spacing.
    pub max_edge_distance_ratio: f64,
    /// Seed for the jitter RNG.
    pub seed: u64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            node_count: DEFAULT_NODE_COUNT,
            jitter_ratio: DEFAULT_JITTER_RATIO,
            max_edge_distance_ratio: DEFAULT_MAX_EDGE_DISTANCE_RATIO,
            seed: 0x5EED_CAFE,
        }
    }
}

impl GraphOptions {
    /// Options with a given node count and jitter, defaults elsewhere.
    pub fn with_nodes(node_count: usize, jitter_ratio: f64) -> Self {
        Self {
            node_count,
            jitter_ratio,
            ..Default::default()
        }
    }

    /// Checks ranges.
    pub fn validate(&self) -> WarpResult<()> {
        if self.node_count == 0 {
            return Err(WarpError::InvalidGraph("node_count must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.jitter_ratio) {
            return Err(WarpError::InvalidGraph(format!(
                "jitter_ratio must be in [0, 1), got {}",
                self.jitter_ratio
            )));
        }
        if !(self.max_edge_distance_ratio.is_finite() && self.max_edge_distance_ratio > 0.0) {
            return Err(WarpError::InvalidGraph(format!(
                "max_edge_distance_ratio must be positive, got {}",
                self.max_edge_distance_ratio
            )));
        }
        Ok(())
    }
}

/// Sparse set of solver nodes covering an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlGraph {
    /// Node arena. Edges refer to nodes by index.
    pub nodes: Vec<ControlNode>,
    /// Image width the graph was built for.
    pub width: f64,
    /// Image height the graph was built for.
    pub height: f64,
    /// Grid columns.
    pub cols: usize,
    /// Grid rows.
    pub rows: usize,
    /// Grid spacing (larger of the two axis spacings).
    pub spacing: f64,
    /// Bumped whenever pin, stiffness or seam data changes.
    revision: u64,
}

/// Builds a control graph with default edge radius and seed.
pub fn create_control_graph(
    width: f64,
    height: f64,
    node_count: usize,
    jitter_ratio: f64,
) -> WarpResult<ControlGraph> {
    ControlGraph::new(width, height, &GraphOptions::with_nodes(node_count, jitter_ratio))
}

impl ControlGraph {
    /// Lays out nodes over a `width × height` image and connects neighbours.
    pub fn new(width: f64, height: f64, options: &GraphOptions) -> WarpResult<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(WarpError::InvalidGraph(format!(
                "image size must be positive, got {width}×{height}"
            )));
        }
        options.validate()?;

        let (cols, rows) = grid_shape(width, height, options.node_count);
        let step_x = width / (cols - 1) as f64;
        let step_y = height / (rows - 1) as f64;
        let spacing = step_x.max(step_y);
        let amplitude = 0.5 * options.jitter_ratio * step_x.min(step_y);

        let mut rng = StdRng::seed_from_u64(options.seed);
        let mut nodes = Vec::with_capacity(cols * rows);
        for r in 0..rows {
            for c in 0..cols {
                let border = r == 0 || c == 0 || r == rows - 1 || c == cols - 1;
                let mut p = DVec2::new(c as f64 * step_x, r as f64 * step_y);
                if !border && amplitude > 0.0 {
                    p.x += rng.random_range(-1.0..=1.0) * amplitude;
                    p.y += rng.random_range(-1.0..=1.0) * amplitude;
                }
                nodes.push(ControlNode::new(p, border));
            }
        }

        let mut graph = Self {
            nodes,
            width,
            height,
            cols,
            rows,
            spacing,
            revision: 0,
        };
        graph.build_edges(spacing * options.max_edge_distance_ratio);

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            cols,
            rows,
            spacing,
            "control graph built"
        );
        Ok(graph)
    }

    /// Connects every node pair within `radius` (O(n²) scan).
    fn build_edges(&mut self, radius: f64) {
        let n = self.nodes.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.nodes[j].rest - self.nodes[i].rest;
                let dist = d.length();
                if dist > radius {
                    continue;
                }
                let weight = 1.0 / (dist + 1.0);
                self.nodes[i].edges.push(GraphEdge {
                    neighbor: j,
                    base_weight: weight,
                    weight,
                    rest_vector: d,
                });
                self.nodes[j].edges.push(GraphEdge {
                    neighbor: i,
                    base_weight: weight,
                    weight,
                    rest_vector: -d,
                });
            }
        }
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum::<usize>() / 2
    }

    /// Symmetric coupling of edge `edge` leaving node `i`:
    /// the edge weight scaled by the mean stiffness of its endpoints.
    #[inline]
    pub fn coupling(&self, i: usize, edge: &GraphEdge) -> f64 {
        edge.weight * 0.5 * (self.nodes[i].stiffness + self.nodes[edge.neighbor].stiffness)
    }

    /// Current node positions.
    pub fn positions(&self) -> Vec<DVec2> {
        self.nodes.iter().map(|n| n.position).collect()
    }

    /// Rest positions.
    pub fn rest_positions(&self) -> Vec<DVec2> {
        self.nodes.iter().map(|n| n.rest).collect()
    }

    /// Node whose rest position is closest to `point`.
    pub fn nearest_node(&self, point: DVec2) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .min_by(|a, b| {
                a.1.rest
                    .distance_squared(point)
                    .total_cmp(&b.1.rest.distance_squared(point))
            })
            .map(|(i, _)| NodeId::from(i))
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> Option<&ControlNode> {
        self.nodes.get(id.index())
    }

    /// Moves every node back to rest with identity rotation.
    pub fn reset_positions(&mut self) {
        for node in &mut self.nodes {
            node.position = node.rest;
            node.rotation = DMat2::IDENTITY;
        }
    }

    /// Largest distance between any node's current and rest position.
    pub fn max_displacement(&self) -> f64 {
        self.nodes
            .iter()
            .map(|n| n.displacement().length())
            .fold(0.0, f64::max)
    }

    /// Counter identifying the current constraint set.
    ///
    /// Solver state records it when the system matrix is built; a mismatch
    /// means the matrix is stale.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Picks `(cols, rows)` with `cols / rows ≈ width / height` and
/// `cols × rows ≈ node_count`, at least 2 × 2.
///
/// The short side is sized first and the long side is derived from it, so
/// rounding error is bounded by half the short side and the product stays
/// within ±20% of `node_count` for any aspect ratio once `node_count ≥ 4`.
fn grid_shape(width: f64, height: f64, node_count: usize) -> (usize, usize) {
    let n = node_count as f64;
    let wide = width >= height;
    let ratio = if wide { height / width } else { width / height };
    let short = ((n * ratio).sqrt().round() as usize).max(2);
    let long = ((n / short as f64).round() as usize).max(2);
    if wide {
        (long, short)
    } else {
        (short, long)
    }
}
