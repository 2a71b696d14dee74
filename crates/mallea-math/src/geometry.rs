//! Point-to-segment and point-to-polyline queries.

use glam::DVec2;

/// Returns the point on segment `[a, b]` closest to `p`.
#[must_use]
pub fn closest_point_on_segment(p: DVec2, a: DVec2, b: DVec2) -> DVec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return a;
    }

    // Project onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Returns the closest point on an open polyline and its distance to `p`.
///
/// A single-point polyline degenerates to that point. Returns `None` for an
/// empty polyline.
#[must_use]
pub fn closest_point_on_polyline(p: DVec2, points: &[DVec2]) -> Option<(DVec2, f64)> {
    match points {
        [] => None,
        [only] => Some((*only, p.distance(*only))),
        _ => points
            .windows(2)
            .map(|w| {
                let q = closest_point_on_segment(p, w[0], w[1]);
                (q, p.distance(q))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1)),
    }
}
