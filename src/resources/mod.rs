//! CPU and GPU resource types: geometry, materials, textures.

pub mod material;
pub mod mesh;
pub mod texture;

pub use material::{MapFlags, MapSet, Material};
pub use mesh::{Mesh, MeshGroup, MeshPart, Vertex};
pub use texture::Texture;
