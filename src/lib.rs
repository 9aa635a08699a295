pub mod attributes;
pub mod error;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod topology;

pub use error::{Result, SurfError};
pub use mesh::{Mesh, MeshOutput, MeshTarget};
