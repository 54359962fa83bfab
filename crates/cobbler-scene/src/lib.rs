//! Cobbler Scene - Renderer-agnostic scene graph
//!
//! Holds the node hierarchy of a loaded model, the per-surface materials a
//! renderer uploads, and CPU ray casting used for pointer picking.

pub mod bounds;
pub mod graph;
pub mod material;
pub mod mesh;
pub mod raycast;

pub use bounds::Aabb;
pub use graph::{NodeId, SceneGraph, SceneNode, Surface};
pub use material::{Material, MaterialKind, MaterialRef, MaterialSlots, ResolvedSlot, SurfaceMaterial};
pub use mesh::MeshGeometry;
pub use raycast::{intersect_all, nearest_hit, Ray, RayHit};
