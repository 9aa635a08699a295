pub mod disjoint_set;
pub mod triangle;

pub use disjoint_set::DisjointSet;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Dynamically sized vector used for attribute values.
pub type VectorN = nalgebra::DVector<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns `true` if `value` should be treated as non-zero.
#[must_use]
pub fn nonzero(value: f64) -> bool {
    value.abs() > TOLERANCE
}
