//! Pointer and camera-command input
//!
//! Raw window events are reduced to two things the configurator cares
//! about: clicks (as [`PointerEvent`]s) and discrete camera commands.

use std::collections::{HashMap, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// A click in viewport pixel coordinates (origin top-left, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// `None` when the host could not supply coordinates
    pub position: Option<Vec2>,
    /// Viewport size in pixels
    pub viewport: Vec2,
}

impl PointerEvent {
    pub fn new(position: Vec2, viewport: Vec2) -> Self {
        Self {
            position: Some(position),
            viewport,
        }
    }

    /// Normalized device coordinates: x right and y up, both in -1..1.
    /// `None` for missing or non-finite coordinates or an empty viewport.
    pub fn to_ndc(&self) -> Option<Vec2> {
        let position = self.position?;
        if !position.is_finite() || !self.viewport.is_finite() {
            return None;
        }
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            2.0 * position.x / self.viewport.x - 1.0,
            1.0 - 2.0 * position.y / self.viewport.y,
        ))
    }

    /// Viewport width over height, if the viewport is non-empty
    pub fn aspect(&self) -> Option<f32> {
        (self.viewport.x > 0.0 && self.viewport.y > 0.0).then(|| self.viewport.x / self.viewport.y)
    }
}

/// Discrete camera actions issued by the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraCommand {
    RotateLeft,
    RotateRight,
    ToggleAutoRotate,
    SetAutoRotate(bool),
}

/// Commands queued between frames, applied in arrival order
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: VecDeque<CameraCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: CameraCommand) {
        self.pending.push_back(command);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = CameraCommand> + '_ {
        self.pending.drain(..)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Keyboard shortcuts for camera commands
#[derive(Debug, Clone)]
pub struct CameraKeyBindings {
    keys: HashMap<KeyCode, CameraCommand>,
}

impl Default for CameraKeyBindings {
    fn default() -> Self {
        let mut bindings = Self::new();
        bindings.bind(KeyCode::ArrowLeft, CameraCommand::RotateLeft);
        bindings.bind(KeyCode::ArrowRight, CameraCommand::RotateRight);
        bindings.bind(KeyCode::Space, CameraCommand::ToggleAutoRotate);
        bindings
    }
}

impl CameraKeyBindings {
    /// Create bindings with nothing bound
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key: KeyCode, command: CameraCommand) {
        self.keys.insert(key, command);
    }

    pub fn unbind(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn command_for(&self, key: KeyCode) -> Option<CameraCommand> {
        self.keys.get(&key).copied()
    }
}

/// Turns winit window events into clicks.
///
/// A click is a left-button press followed by a release; it is reported at
/// the cursor position of the release. Leaving the window clears the cursor
/// position, so a release outside the window yields a click without
/// coordinates.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    cursor: Option<Vec2>,
    viewport: Vec2,
    pressed: bool,
}

impl PointerTracker {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Feed one window event; returns a click when one completes
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor_moved(*position);
                None
            }
            WindowEvent::CursorLeft { .. } => {
                self.handle_cursor_left();
                None
            }
            WindowEvent::Resized(size) => {
                self.handle_resized(*size);
                None
            }
            WindowEvent::MouseInput { state, button, .. } => self.handle_mouse_button(*button, *state),
            _ => None,
        }
    }

    pub fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
    }

    pub fn handle_cursor_left(&mut self) {
        self.cursor = None;
    }

    pub fn handle_resized(&mut self, size: PhysicalSize<u32>) {
        self.viewport = Vec2::new(size.width as f32, size.height as f32);
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) -> Option<PointerEvent> {
        if button != MouseButton::Left {
            return None;
        }
        match state {
            ElementState::Pressed => {
                self.pressed = true;
                None
            }
            ElementState::Released => {
                if !std::mem::take(&mut self.pressed) {
                    return None;
                }
                Some(PointerEvent {
                    position: self.cursor,
                    viewport: self.viewport,
                })
            }
        }
    }
}

/// Map a keyboard event to a camera command (on press only)
pub fn key_command(
    bindings: &CameraKeyBindings,
    physical_key: PhysicalKey,
    state: ElementState,
) -> Option<CameraCommand> {
    match (physical_key, state) {
        (PhysicalKey::Code(code), ElementState::Pressed) => bindings.command_for(code),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndc_corners_and_center() {
        let viewport = Vec2::new(800.0, 600.0);
        let center = PointerEvent::new(Vec2::new(400.0, 300.0), viewport);
        assert_eq!(center.to_ndc(), Some(Vec2::ZERO));

        let top_left = PointerEvent::new(Vec2::ZERO, viewport);
        assert_eq!(top_left.to_ndc(), Some(Vec2::new(-1.0, 1.0)));

        let bottom_right = PointerEvent::new(viewport, viewport);
        assert_eq!(bottom_right.to_ndc(), Some(Vec2::new(1.0, -1.0)));
    }

    #[test]
    fn test_ndc_rejects_missing_or_bad_input() {
        let viewport = Vec2::new(800.0, 600.0);
        let missing = PointerEvent {
            position: None,
            viewport,
        };
        assert!(missing.to_ndc().is_none());
        assert!(PointerEvent::new(Vec2::new(f32::NAN, 1.0), viewport).to_ndc().is_none());
        assert!(PointerEvent::new(Vec2::ONE, Vec2::new(0.0, 600.0)).to_ndc().is_none());
        assert!(PointerEvent::new(Vec2::ONE, Vec2::ZERO).aspect().is_none());
    }

    #[test]
    fn test_command_queue_preserves_order() {
        let mut queue = CommandQueue::new();
        queue.push(CameraCommand::RotateLeft);
        queue.push(CameraCommand::SetAutoRotate(true));
        assert_eq!(queue.len(), 2);

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained, vec![CameraCommand::RotateLeft, CameraCommand::SetAutoRotate(true)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_tracker_click_after_press_release() {
        let mut tracker = PointerTracker::new(Vec2::new(100.0, 100.0));
        tracker.handle_cursor_moved(PhysicalPosition::new(25.0, 75.0));

        assert!(tracker.handle_mouse_button(MouseButton::Left, ElementState::Pressed).is_none());
        let click = tracker
            .handle_mouse_button(MouseButton::Left, ElementState::Released)
            .unwrap();
        assert_eq!(click.position, Some(Vec2::new(25.0, 75.0)));
        assert_eq!(click.to_ndc(), Some(Vec2::new(-0.5, -0.5)));

        // A stray release is not a click
        assert!(tracker.handle_mouse_button(MouseButton::Left, ElementState::Released).is_none());
    }

    #[test]
    fn test_tracker_ignores_other_buttons_and_tracks_resize() {
        let mut tracker = PointerTracker::default();
        tracker.handle_resized(PhysicalSize::new(640, 480));
        assert_eq!(tracker.viewport(), Vec2::new(640.0, 480.0));

        tracker.handle_mouse_button(MouseButton::Right, ElementState::Pressed);
        assert!(tracker.handle_mouse_button(MouseButton::Right, ElementState::Released).is_none());
    }

    #[test]
    fn test_release_outside_window_has_no_position() {
        let mut tracker = PointerTracker::new(Vec2::new(100.0, 100.0));
        tracker.handle_cursor_moved(PhysicalPosition::new(10.0, 10.0));
        tracker.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
        tracker.handle_cursor_left();
        let click = tracker
            .handle_mouse_button(MouseButton::Left, ElementState::Released)
            .unwrap();
        assert!(click.to_ndc().is_none());
    }

    #[test]
    fn test_default_key_bindings() {
        let bindings = CameraKeyBindings::default();
        assert_eq!(
            key_command(&bindings, PhysicalKey::Code(KeyCode::ArrowLeft), ElementState::Pressed),
            Some(CameraCommand::RotateLeft)
        );
        assert_eq!(
            key_command(&bindings, PhysicalKey::Code(KeyCode::ArrowLeft), ElementState::Released),
            None
        );
        assert_eq!(bindings.command_for(KeyCode::KeyQ), None);
    }
}
