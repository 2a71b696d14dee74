//! Render mesh with SoA (Structure of Arrays) layout.
//!
//! Each coordinate channel is stored contiguously (`pos_x: [x0, x1, ...]`).
//! Rest positions, UVs and indices are fixed once generated; the deformed
//! buffer is overwritten on every update and skin data is filled in once per
//! graph pairing.

use mallea_math::DVec2;
use mallea_types::{WarpError, WarpResult};
use serde::{Deserialize, Serialize};

/// Dense triangle mesh deformed by skinning against a control graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderMesh {
    // --- Rest data ---
    /// Rest X coordinates in image space.
    pub pos_x: Vec<f64>,
    /// Rest Y coordinates in image space.
    pub pos_y: Vec<f64>,
    /// U texture coordinates.
    pub uv_u: Vec<f32>,
    /// V texture coordinates.
    pub uv_v: Vec<f32>,
    /// Triangle indices, flat: `[t0v0, t0v1, t0v2, t1v0, ...]`.
    pub indices: Vec<u32>,
    /// Quads along X.
    pub cols: usize,
    /// Quads along Y.
    pub rows: usize,

    // --- Deformed data ---
    /// Deformed X coordinates.
    pub deformed_x: Vec<f64>,
    /// Deformed Y coordinates.
    pub deformed_y: Vec<f64>,

    // --- Skin ---
    /// Influences per vertex (0 until skin weights are computed).
    pub skin_k: usize,
    /// Control node indices, `skin_k` per vertex.
    pub skin_nodes: Vec<u32>,
    /// Normalized weights matching `skin_nodes`.
    pub skin_weights: Vec<f64>,
}

impl RenderMesh {
    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, triangle_capacity: usize) -> Self {
        Self {
            pos_x: Vec::with_capacity(vertex_capacity),
            pos_y: Vec::with_capacity(vertex_capacity),
            uv_u: Vec::with_capacity(vertex_capacity),
            uv_v: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(triangle_capacity * 3),
            deformed_x: Vec::with_capacity(vertex_capacity),
            deformed_y: Vec::with_capacity(vertex_capacity),
            ..Default::default()
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos_x.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Rest position of vertex `i`.
    #[inline]
    pub fn rest_position(&self, i: usize) -> DVec2 {
        DVec2::new(self.pos_x[i], self.pos_y[i])
    }

    /// Deformed position of vertex `i`.
    #[inline]
    pub fn deformed_position(&self, i: usize) -> DVec2 {
        DVec2::new(self.deformed_x[i], self.deformed_y[i])
    }

    /// Three vertex indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        let base = t * 3;
        [self.indices[base], self.indices[base + 1], self.indices[base + 2]]
    }

    /// Whether skin weights have been computed for the current vertices.
    #[inline]
    pub fn is_skinned(&self) -> bool {
        self.skin_k > 0 && self.skin_nodes.len() == self.vertex_count() * self.skin_k
    }

    /// Skin entries `(node index, weight)` of vertex `i`.
    pub fn skin(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = i * self.skin_k..(i + 1) * self.skin_k;
        self.skin_nodes[range.clone()]
            .iter()
            .zip(&self.skin_weights[range])
            .map(|(&n, &w)| (n as usize, w))
    }

    /// Copies rest positions into the deformed buffer.
    pub fn reset_deformed(&mut self) {
        self.deformed_x.clone_from(&self.pos_x);
        self.deformed_y.clone_from(&self.pos_y);
    }

    /// Deformed positions interleaved as `[x0, y0, x1, y1, ...]` in f32,
    /// ready for upload to a vertex buffer.
    pub fn deformed_interleaved(&self) -> Vec<f32> {
        self.deformed_x
            .iter()
            .zip(&self.deformed_y)
            .flat_map(|(&x, &y)| [x as f32, y as f32])
            .collect()
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - All per-vertex arrays have the same length
    /// - Triangle indices are within bounds and not degenerate
    /// - Skin arrays, if present, hold `skin_k` entries per vertex
    pub fn validate(&self) -> WarpResult<()> {
        let n = self.pos_x.len();

        if self.pos_y.len() != n {
            return Err(WarpError::InvalidMesh(
                "Position arrays have inconsistent lengths".into(),
            ));
        }
        if self.uv_u.len() != n || self.uv_v.len() != n {
            return Err(WarpError::InvalidMesh(
                "UV arrays have inconsistent lengths".into(),
            ));
        }
        if self.deformed_x.len() != n || self.deformed_y.len() != n {
            return Err(WarpError::InvalidMesh(
                "Deformed arrays have inconsistent lengths".into(),
            ));
        }

        if self.indices.len() % 3 != 0 {
            return Err(WarpError::InvalidMesh(
                "Index count is not divisible by 3".into(),
            ));
        }
        for (i, &idx) in self.indices.iter().enumerate() {
            if idx as usize >= n {
                return Err(WarpError::InvalidMesh(format!(
                    "Index {} at position {} is out of range (vertex count: {})",
                    idx, i, n
                )));
            }
        }
        for t in 0..self.triangle_count() {
            let [a, b, c] = self.triangle(t);
            if a == b || b == c || a == c {
                return Err(WarpError::InvalidMesh(format!(
                    "Triangle {} has repeated vertex indices: [{}, {}, {}]",
                    t, a, b, c
                )));
            }
        }

        if self.skin_k > 0 {
            let expected = n * self.skin_k;
            if self.skin_nodes.len() != expected || self.skin_weights.len() != expected {
                return Err(WarpError::DimensionMismatch {
                    expected,
                    actual: self.skin_nodes.len().min(self.skin_weights.len()),
                });
            }
        }

        Ok(())
    }
}
