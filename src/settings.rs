//! Configurator settings with persistence
//!
//! Settings are saved to `~/.config/cobbler/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use cobbler_assets::{LoadOptions, NormalizeParams};
use cobbler_configurator::{CameraConfig, ViewConfig};
use cobbler_core::Color;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All configurator settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CobblerSettings {
    pub asset: AssetSettings,
    pub material: NormalizeParams,
    pub camera: CameraConfig,
    pub session: SessionSettings,
}

impl CobblerSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cobbler"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Whether a settings file is present on disk
    pub fn exists() -> bool {
        Self::settings_path().is_some_and(|path| path.exists())
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::settings_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&path)
    }

    fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// View configuration for a session
    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            camera: self.camera.clone(),
            normalize: self.material,
            selected_color: self.session.selected_color(),
        }
    }
}

/// Where models come from and how they are interpreted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directory relative model paths are resolved against
    pub base_path: PathBuf,
    /// Model shown when no path is given on the command line
    pub model: PathBuf,
    /// Mesh names treated as multi-material surfaces when the file itself
    /// does not say so
    pub multi_material_meshes: Vec<String>,
    pub default_triangles_per_slot: u32,
}

impl Default for AssetSettings {
    fn default() -> Self {
        let load = LoadOptions::default();
        Self {
            base_path: PathBuf::from("assets"),
            model: PathBuf::from("models/shoe.glb"),
            multi_material_meshes: load.multi_material_meshes,
            default_triangles_per_slot: load.default_triangles_per_slot,
        }
    }
}

impl AssetSettings {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            multi_material_meshes: self.multi_material_meshes.clone(),
            default_triangles_per_slot: self.default_triangles_per_slot,
        }
    }
}

/// Headless preview session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Palette color selected at start, as `#RRGGBB`
    pub selected_color: String,
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Frames to run after the center click
    pub preview_frames: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            selected_color: "#FF0000".into(),
            width: 1280,
            height: 720,
            preview_frames: 240,
        }
    }
}

impl SessionSettings {
    /// The starting color; malformed values fall back to red
    pub fn selected_color(&self) -> Color {
        match self.selected_color.parse() {
            Ok(color) => color,
            Err(e) => {
                warn!("Invalid selected color '{}': {}, using red", self.selected_color, e);
                Color::RED
            }
        }
    }

    /// Get the viewport size as a tuple
    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
