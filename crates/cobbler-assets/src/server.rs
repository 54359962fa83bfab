use std::path::{Path, PathBuf};

use cobbler_scene::SceneGraph;
use tracing::info;

use crate::error::AssetError;
use crate::gltf_loader::{self, LoadOptions};
use crate::pending::PendingLoad;

/// Resolves model paths and loads them into scene graphs, either inline or
/// on a background thread.
#[derive(Debug, Clone)]
pub struct AssetServer {
    base_path: PathBuf,
    options: LoadOptions,
}

impl AssetServer {
    /// Create a new AssetServer rooted at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        info!("AssetServer created with base path: {}", base_path.display());
        Self {
            base_path,
            options: LoadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Resolve a relative asset path against the base path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    /// Load a glTF file synchronously
    pub fn load_scene(&self, path: &Path) -> Result<SceneGraph, AssetError> {
        let full_path = self.resolve(path);
        load_resolved(&full_path, &self.options)
    }

    /// Start loading a glTF file on a background thread
    pub fn spawn_load(&self, path: &Path) -> PendingLoad {
        let full_path = self.resolve(path);
        let options = self.options.clone();
        info!("Loading model '{}' in the background", full_path.display());
        PendingLoad::spawn(full_path, move |path| load_resolved(path, &options))
    }

    /// The base path this server resolves relative paths against.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

fn load_resolved(path: &Path, options: &LoadOptions) -> Result<SceneGraph, AssetError> {
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }
    gltf_loader::load_gltf_scene(path, options)
}
