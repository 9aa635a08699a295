mod mesh_info;

pub use mesh_info::{Aabb, MeshInfo};
