//! Render mesh generation.

use mallea_types::{WarpError, WarpResult};

use crate::mesh::RenderMesh;

/// Generates a uniform vertex grid over a `width × height` image.
///
/// Vertices are spaced roughly `resolution` pixels apart; the spacing is
/// stretched slightly so the last row and column land on the image edge.
/// UVs run from 0 to 1 across the image. The grid does not depend on the
/// control graph's density.
///
/// # Example
/// ```
/// use mallea_mesh::generate_render_mesh;
/// let mesh = generate_render_mesh(100.0, 50.0, 25.0).unwrap();
/// assert_eq!(mesh.vertex_count(), 15);  // 5×3 vertices
/// assert_eq!(mesh.triangle_count(), 16); // 4×2 quads × 2 tris each
/// ```
pub fn generate_render_mesh(width: f64, height: f64, resolution: f64) -> WarpResult<RenderMesh> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(WarpError::InvalidMesh(format!(
            "image size must be positive, got {width}×{height}"
        )));
    }
    if !(resolution.is_finite() && resolution > 0.0) {
        return Err(WarpError::InvalidMesh(format!(
            "mesh resolution must be positive, got {resolution}"
        )));
    }

    let cols = ((width / resolution).ceil() as usize).max(1);
    let rows = ((height / resolution).ceil() as usize).max(1);
    let verts_x = cols + 1;
    let verts_y = rows + 1;

    let mut mesh = RenderMesh::with_capacity(verts_x * verts_y, cols * rows * 2);
    mesh.cols = cols;
    mesh.rows = rows;

    for j in 0..verts_y {
        for i in 0..verts_x {
            let u = i as f64 / cols as f64;
            let v = j as f64 / rows as f64;
            mesh.pos_x.push(u * width);
            mesh.pos_y.push(v * height);
            mesh.uv_u.push(u as f32);
            mesh.uv_v.push(v as f32);
        }
    }
    mesh.reset_deformed();

    for j in 0..rows {
        for i in 0..cols {
            let top_left = (j * verts_x + i) as u32;
            let top_right = top_left + 1;
            let bot_left = top_left + verts_x as u32;
            let bot_right = bot_left + 1;

            mesh.indices.extend_from_slice(&[top_left, bot_left, top_right]);
            mesh.indices.extend_from_slice(&[top_right, bot_left, bot_right]);
        }
    }

    tracing::debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        resolution,
        "render mesh generated"
    );
    Ok(mesh)
}
