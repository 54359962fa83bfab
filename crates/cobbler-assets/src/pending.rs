use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use cobbler_scene::SceneGraph;
use tracing::debug;

use crate::error::AssetError;

/// A non-blocking handle to a model load running on a background thread.
/// Call `try_recv()` each frame to check for the result without blocking
/// the render loop.
///
/// Cancelling (or dropping) the handle suppresses the completion: the worker
/// still finishes parsing, but its result is discarded and never reaches the
/// view that asked for it.
pub struct PendingLoad {
    path: PathBuf,
    receiver: mpsc::Receiver<Result<SceneGraph, AssetError>>,
    cancelled: Arc<AtomicBool>,
}

impl PendingLoad {
    /// Run `job` on a named background thread
    pub fn spawn<F>(path: PathBuf, job: F) -> Self
    where
        F: FnOnce(&Path) -> Result<SceneGraph, AssetError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);
        let worker_path = path.clone();

        let spawned = std::thread::Builder::new()
            .name("cobbler-asset-load".into())
            .spawn({
                let tx = tx.clone();
                move || {
                    let result = job(&worker_path);
                    if worker_cancelled.load(Ordering::Acquire) {
                        debug!("Discarding result of cancelled load '{}'", worker_path.display());
                        return;
                    }
                    let _ = tx.send(result);
                }
            });

        if let Err(e) = spawned {
            let _ = tx.send(Err(AssetError::Io(path.clone(), e)));
        }

        Self {
            path,
            receiver: rx,
            cancelled,
        }
    }

    /// Handle that is already resolved (synchronous loaders, tests)
    pub fn ready(path: PathBuf, result: Result<SceneGraph, AssetError>) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(result);
        Self {
            path,
            receiver: rx,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Path being loaded
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking check for the result. Returns `None` while still pending.
    pub fn try_recv(&self) -> Option<Result<SceneGraph, AssetError>> {
        if self.is_cancelled() {
            return Some(Err(AssetError::Cancelled));
        }
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(self.worker_lost())),
        }
    }

    /// Blocking wait for the result. Only use outside the render loop.
    pub fn wait(self) -> Result<SceneGraph, AssetError> {
        if self.is_cancelled() {
            return Err(AssetError::Cancelled);
        }
        self.receiver.recv().map_err(|_| self.worker_lost())?
    }

    /// Suppress the completion of this load
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            debug!("Cancelled load '{}'", self.path.display());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn worker_lost(&self) -> AssetError {
        AssetError::GltfLoadFailed(self.path.clone(), "loader thread stopped without a result".into())
    }
}

impl Drop for PendingLoad {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::time::Duration;

    #[test]
    fn test_pending_load_try_recv_none_then_result() {
        let (release_tx, release_rx) = channel::<()>();
        let pending = PendingLoad::spawn(PathBuf::from("shoe.glb"), move |_| {
            release_rx.recv().ok();
            Ok(SceneGraph::new())
        });

        // The worker is parked until released
        assert!(pending.try_recv().is_none());

        release_tx.send(()).unwrap();
        let result = pending.wait();
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_pending_load_error() {
        let pending = PendingLoad::spawn(PathBuf::from("missing.glb"), |path| {
            Err(AssetError::NotFound(path.to_path_buf()))
        });
        match pending.wait() {
            Err(AssetError::NotFound(p)) => assert_eq!(p, PathBuf::from("missing.glb")),
            other => panic!("expected NotFound, got: {:?}", other.map(|g| g.len())),
        }
    }

    #[test]
    fn test_cancel_suppresses_completion() {
        let (release_tx, release_rx) = channel::<()>();
        let (done_tx, done_rx) = channel::<()>();
        let pending = PendingLoad::spawn(PathBuf::from("shoe.glb"), move |_| {
            release_rx.recv().ok();
            done_tx.send(()).ok();
            Ok(SceneGraph::new())
        });

        pending.cancel();
        release_tx.send(()).unwrap();
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(matches!(pending.try_recv(), Some(Err(AssetError::Cancelled))));
    }

    #[test]
    fn test_ready_handle() {
        let pending = PendingLoad::ready(PathBuf::from("a.glb"), Ok(SceneGraph::new()));
        assert_eq!(pending.path(), Path::new("a.glb"));
        assert!(pending.try_recv().unwrap().is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = AssetError::NotFound(PathBuf::from("models/custom.glb"));
        assert!(err.to_string().contains("models/custom.glb"));
        assert!(AssetError::Cancelled.to_string().contains("cancelled"));
    }
}
