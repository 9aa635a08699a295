use super::{Point3, Vector3, TOLERANCE};

/// Area of the triangle `(a, b, c)`.
#[must_use]
pub fn triangle_area(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    (b - a).cross(&(c - a)).norm() * 0.5
}

/// Unit normal of the triangle `(a, b, c)` following its winding, or
/// `None` for a degenerate triangle.
#[must_use]
pub fn triangle_normal(a: &Point3, b: &Point3, c: &Point3) -> Option<Vector3> {
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len < TOLERANCE {
        None
    } else {
        Some(n / len)
    }
}

/// Arithmetic mean of a set of points. Returns `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(points: &[Point3]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}
