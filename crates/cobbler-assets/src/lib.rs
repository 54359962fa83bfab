//! Cobbler Assets - Model loading and material normalization
//!
//! Loads a glTF 2.0 model into a [`cobbler_scene::SceneGraph`], rewrites its
//! materials to the configurator's fixed shading parameters, and runs loads
//! on a background thread so the render loop never blocks.

mod error;
mod gltf_loader;
mod normalize;
mod pending;
mod server;

pub use error::AssetError;
pub use gltf_loader::{load_gltf_scene, LoadOptions, TRIANGLES_PER_SLOT_KEY};
pub use normalize::{normalize, NormalizeParams, NormalizeReport};
pub use pending::PendingLoad;
pub use server::AssetServer;
