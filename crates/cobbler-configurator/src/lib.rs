//! Cobbler Configurator - Interactive core of the product configurator
//!
//! Ties a loaded scene to an orbit camera and pointer input: clicking a
//! region recolors its material with the selected palette color and frames
//! the camera on it.

pub mod camera;
pub mod input;
pub mod paint;
pub mod view;

pub use camera::{CameraConfig, CameraPose, OrbitCamera};
pub use input::{key_command, CameraCommand, CameraKeyBindings, CommandQueue, PointerEvent, PointerTracker};
pub use paint::{PaintController, PaintOutcome, PaintStats};
pub use view::{ConfiguratorView, ViewConfig, ViewStatus};
