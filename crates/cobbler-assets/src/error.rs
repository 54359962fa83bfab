use std::path::PathBuf;

/// Errors that can occur while loading a model.
///
/// All of these are fatal to the view that requested the load; nothing is
/// retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to load glTF file '{0}': {1}")]
    GltfLoadFailed(PathBuf, String),

    #[error("I/O error loading '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("glTF file '{0}' contains no renderable surfaces")]
    EmptyScene(PathBuf),

    #[error("load was cancelled")]
    Cancelled,
}
