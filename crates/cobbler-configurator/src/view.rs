//! The configurator view: load, normalize, then paint and orbit
//!
//! A view starts in `Loading` with a background load in flight. Polling it
//! in `update` moves it to `Ready` (normalized scene, camera at its initial
//! pose, ready callback fired once) or `Failed` (error kept, no retry).
//! Unmounting drops the pending load, which discards its result.

use std::path::Path;

use cobbler_assets::{normalize, AssetError, AssetServer, NormalizeParams, PendingLoad};
use cobbler_core::Color;
use cobbler_scene::{MaterialRef, SceneGraph};
use tracing::{debug, error, info, warn};

use crate::camera::{CameraConfig, OrbitCamera};
use crate::input::{CameraCommand, CommandQueue, PointerEvent};
use crate::paint::{PaintController, PaintOutcome, PaintStats};

/// Everything a view needs besides the model itself
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub camera: CameraConfig,
    pub normalize: NormalizeParams,
    /// Color painted until the palette selects another
    pub selected_color: Color,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            normalize: NormalizeParams::default(),
            selected_color: Color::RED,
        }
    }
}

/// Coarse lifecycle state, for hosts that only need to pick an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    Loading,
    Ready,
    Failed,
    Unmounted,
}

type ReadyCallback = Box<dyn FnOnce(&SceneGraph)>;

struct ReadyScene {
    graph: SceneGraph,
    /// Post-normalization color of every material, for design resets
    baseline: Vec<(MaterialRef, Color)>,
}

enum ViewState {
    Loading(PendingLoad),
    Ready(ReadyScene),
    Failed(AssetError),
    Unmounted,
}

pub struct ConfiguratorView {
    state: ViewState,
    camera: OrbitCamera,
    painter: PaintController,
    commands: CommandQueue,
    normalize: NormalizeParams,
    selected: Color,
    on_ready: Option<ReadyCallback>,
    ready_fired: bool,
}

impl ConfiguratorView {
    /// Start loading `path` through `server` and return the loading view
    pub fn mount(server: &AssetServer, path: &Path, config: ViewConfig) -> Self {
        Self::from_pending(server.spawn_load(path), config)
    }

    /// Wrap an already started load
    pub fn from_pending(pending: PendingLoad, config: ViewConfig) -> Self {
        info!("Mounting configurator view for '{}'", pending.path().display());
        Self {
            state: ViewState::Loading(pending),
            camera: OrbitCamera::new(config.camera),
            painter: PaintController::new(),
            commands: CommandQueue::new(),
            normalize: config.normalize,
            selected: config.selected_color,
            on_ready: None,
            ready_fired: false,
        }
    }

    /// Register the callback fired once the scene is ready. Fires right
    /// away if it already is. A view holds one callback and fires at most
    /// once, so later registrations are dropped.
    pub fn on_ready(&mut self, callback: impl FnOnce(&SceneGraph) + 'static) {
        if self.ready_fired {
            warn!("Ready callback already fired, ignoring registration");
            return;
        }
        match &self.state {
            ViewState::Ready(ready) => {
                self.ready_fired = true;
                callback(&ready.graph);
            }
            ViewState::Loading(_) if self.on_ready.is_some() => {
                warn!("Ready callback already registered, ignoring registration");
            }
            ViewState::Loading(_) => self.on_ready = Some(Box::new(callback)),
            ViewState::Failed(_) | ViewState::Unmounted => {}
        }
    }

    /// Advance one frame. Returns whether the camera pose changed.
    pub fn update(&mut self, dt: f32) -> bool {
        self.poll_load();
        if !self.is_ready() {
            return false;
        }

        for command in self.commands.drain() {
            match command {
                CameraCommand::RotateLeft => self.camera.rotate_left(),
                CameraCommand::RotateRight => self.camera.rotate_right(),
                CameraCommand::ToggleAutoRotate => self.camera.toggle_auto_rotate(),
                CameraCommand::SetAutoRotate(enabled) => self.camera.set_auto_rotate(enabled),
            }
        }
        self.camera.update(dt)
    }

    fn poll_load(&mut self) {
        let ViewState::Loading(pending) = &self.state else {
            return;
        };
        let Some(result) = pending.try_recv() else {
            return;
        };

        match result {
            Ok(mut graph) => {
                let report = normalize(&mut graph, &self.normalize);
                let baseline = graph
                    .material_refs()
                    .into_iter()
                    .filter_map(|r| graph.material(r).map(|m| (r, m.color)))
                    .collect();
                self.camera.reset();
                info!(
                    "Scene ready: {} nodes, {} surfaces, {} materials",
                    graph.len(),
                    report.surfaces,
                    report.materials
                );
                self.state = ViewState::Ready(ReadyScene { graph, baseline });
                if let (Some(callback), ViewState::Ready(ready)) = (self.on_ready.take(), &self.state) {
                    self.ready_fired = true;
                    callback(&ready.graph);
                }
            }
            Err(e) => {
                error!("Failed to load model: {}", e);
                self.on_ready = None;
                self.state = ViewState::Failed(e);
            }
        }
    }

    /// Palette selection. Read at click time, never copied into materials
    /// ahead of a click.
    pub fn select_color(&mut self, color: Color) {
        debug!("Selected color {}", color);
        self.selected = color;
    }

    pub fn selected_color(&self) -> Color {
        self.selected
    }

    /// Queue a camera action; applied on the next ready frame
    pub fn push_command(&mut self, command: CameraCommand) {
        self.commands.push(command);
    }

    /// Paint the surface under the pointer with the selected color
    pub fn click(&mut self, event: &PointerEvent) -> PaintOutcome {
        match &mut self.state {
            ViewState::Ready(ready) => {
                self.painter
                    .handle_click(event, self.selected, &mut ready.graph, &mut self.camera)
            }
            _ => PaintOutcome::NotReady,
        }
    }

    /// Put every material back to its color right after normalization.
    /// Returns how many materials changed.
    pub fn reset_design(&mut self) -> usize {
        let ViewState::Ready(ready) = &mut self.state else {
            return 0;
        };
        let mut restored = 0;
        for &(target, color) in &ready.baseline {
            if let Some(material) = ready.graph.material_mut(target) {
                if material.color != color {
                    material.set_color(color);
                    restored += 1;
                }
            }
        }
        info!("Design reset, {} materials restored", restored);
        restored
    }

    /// Materials whose color changed since the last call
    pub fn take_dirty_materials(&mut self) -> Vec<MaterialRef> {
        match &mut self.state {
            ViewState::Ready(ready) => ready.graph.take_dirty_materials(),
            _ => Vec::new(),
        }
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        match &self.state {
            ViewState::Ready(ready) => Some(&ready.graph),
            _ => None,
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn paint_stats(&self) -> PaintStats {
        self.painter.stats()
    }

    pub fn status(&self) -> ViewStatus {
        match self.state {
            ViewState::Loading(_) => ViewStatus::Loading,
            ViewState::Ready(_) => ViewStatus::Ready,
            ViewState::Failed(_) => ViewStatus::Failed,
            ViewState::Unmounted => ViewStatus::Unmounted,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status() == ViewStatus::Ready
    }

    pub fn error(&self) -> Option<&AssetError> {
        match &self.state {
            ViewState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Tear the view down. A load still in flight is cancelled and its
    /// completion never reaches this view.
    pub fn unmount(&mut self) {
        if let ViewState::Loading(pending) = &self.state {
            pending.cancel();
        }
        self.on_ready = None;
        self.state = ViewState::Unmounted;
        debug!("Configurator view unmounted");
    }
}
