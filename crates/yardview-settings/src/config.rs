//! Scene configuration for YardView
//!
//! Supports JSON and TOML files. Every section has defaults, so a config
//! file only needs the values it wants to override.
//!
//! Configuration is organized into logical sections:
//! - Auto-framing constants
//! - Outline styles for selection and hover
//! - Color palettes and the "not applicable" convention
//! - Camera and orbit-control defaults
//! - Undo history depth
//! - Terrain and label layout

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use yardview_core::{CameraState, Rgb};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Constants used when placing the camera around a set of bounding boxes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FramingConfig {
    /// Multiplier on the distance that exactly fits the largest dimension.
    pub padding: f32,
    /// Lower bound on the eye-to-center distance.
    pub min_distance: f32,
    /// Height/largest-dimension ratio below which a set counts as flat.
    pub flatness_ratio: f32,
    /// Eye height above center as a fraction of the vertical extent.
    pub height_extent_factor: f32,
    /// Eye height above center as a fraction of the largest dimension.
    pub height_max_dim_factor: f32,
    /// Eye height above center as a fraction of the distance, for flat sets.
    pub flat_height_factor: f32,
    /// The eye never sits lower than this above the center.
    pub min_height_above_center: f32,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            padding: 1.5,
            min_distance: 5.0,
            flatness_ratio: 0.2,
            height_extent_factor: 0.5,
            height_max_dim_factor: 0.3,
            flat_height_factor: 0.5,
            min_height_above_center: 2.0,
        }
    }
}

/// Edge-detection outline parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutlineStyle {
    pub color: Rgb,
    /// Overall intensity; 0 disables the outline.
    pub edge_strength: f32,
    /// Edge width in pixels.
    pub edge_thickness: f32,
    /// Additional blurred halo, 0..1.
    pub edge_glow: f32,
}

/// Outline styles for the two highlight states
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutlineConfig {
    pub selected: OutlineStyle,
    pub hover: OutlineStyle,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            selected: OutlineStyle {
                color: Rgb::from_bytes(0xFF, 0xD5, 0x4F),
                edge_strength: 5.0,
                edge_thickness: 2.0,
                edge_glow: 0.5,
            },
            hover: OutlineStyle {
                color: Rgb::WHITE,
                edge_strength: 2.5,
                edge_thickness: 1.0,
                edge_glow: 0.0,
            },
        }
    }
}

/// Palettes used by the color modes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorConfig {
    /// Marker for "not applicable" in state and product fields.
    pub inapplicable_marker: String,
    /// Opacity of equipment whose state is not applicable.
    pub inapplicable_opacity: f32,
    /// Clear color behind the scene.
    pub background: Rgb,
    /// Operational state (lowercase) to color.
    pub state_palette: BTreeMap<String, Rgb>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        let mut state_palette = BTreeMap::new();
        for (state, hex) in [
            ("operando", (0x66, 0xBB, 0x6A)),
            ("parado", (0xFF, 0xA7, 0x26)),
            ("manutenção", (0xEF, 0x53, 0x50)),
            ("alarme", (0xD5, 0x00, 0xF9)),
            ("aberta", (0x29, 0xB6, 0xF6)),
            ("fechada", (0x78, 0x90, 0x9C)),
        ] {
            state_palette.insert(state.to_string(), Rgb::from_bytes(hex.0, hex.1, hex.2));
        }

        Self {
            inapplicable_marker: "N/A".to_string(),
            inapplicable_opacity: 0.35,
            background: Rgb::from_bytes(0x10, 0x14, 0x1A),
            state_palette,
        }
    }
}

/// Camera projection and orbit-control defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Fraction of the remaining orbit velocity removed per frame.
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per pixel of pointer drag.
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Camera placement at startup.
    pub initial: CameraState,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 50.0,
            near: 0.1,
            far: 5000.0,
            damping_factor: 0.08,
            min_distance: 2.0,
            max_distance: 2000.0,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            initial: CameraState::default(),
        }
    }
}

/// Undo history limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of entries kept; 0 keeps everything.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: 200 }
    }
}

/// Ground plane and label overlay layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabelConfig {
    /// World-space gap between the top of the equipment and its label.
    pub vertical_offset: f32,
    /// Side length of the square ground plane.
    pub terrain_size: f32,
    pub terrain_color: Rgb,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            vertical_offset: 1.0,
            terrain_size: 400.0,
            terrain_color: Rgb::from_bytes(0x37, 0x47, 0x4F),
        }
    }
}

/// Complete scene configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub framing: FramingConfig,
    pub outline: OutlineConfig,
    pub colors: ColorConfig,
    pub camera: CameraConfig,
    pub history: HistoryConfig,
    pub labels: LabelConfig,
}

impl SceneConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/yardview/scene.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("yardview").join("scene.toml"))
            .ok_or_else(|| SettingsError::ConfigDirectory("no config directory".to_string()))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise defaults. Invalid files are
    /// reported and replaced by defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no scene config, using defaults");
            return Self::default();
        }
        match Self::load_from_file(path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "scene config loaded");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "scene config rejected, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.framing;
        if !(f.padding > 0.0) {
            return Err(ConfigError::out_of_range("framing.padding", f.padding));
        }
        if !(f.min_distance > 0.0) {
            return Err(ConfigError::out_of_range("framing.min_distance", f.min_distance));
        }
        if !(f.flatness_ratio >= 0.0) {
            return Err(ConfigError::out_of_range(
                "framing.flatness_ratio",
                f.flatness_ratio,
            ));
        }

        let c = &self.camera;
        if !(c.fov > 0.0 && c.fov < 180.0) {
            return Err(ConfigError::out_of_range("camera.fov", c.fov));
        }
        if !(c.near > 0.0 && c.far > c.near) {
            return Err(ConfigError::out_of_range(
                "camera.near/far",
                format!("{}..{}", c.near, c.far),
            ));
        }
        if !(0.0..=1.0).contains(&c.damping_factor) {
            return Err(ConfigError::out_of_range(
                "camera.damping_factor",
                c.damping_factor,
            ));
        }
        if !(c.min_distance > 0.0 && c.max_distance >= c.min_distance) {
            return Err(ConfigError::out_of_range(
                "camera.min_distance/max_distance",
                format!("{}..{}", c.min_distance, c.max_distance),
            ));
        }
        if !c.initial.is_finite() {
            return Err(ConfigError::out_of_range("camera.initial", "non-finite"));
        }

        if !(0.0..=1.0).contains(&self.colors.inapplicable_opacity) {
            return Err(ConfigError::out_of_range(
                "colors.inapplicable_opacity",
                self.colors.inapplicable_opacity,
            ));
        }

        for (key, style) in [
            ("outline.selected", &self.outline.selected),
            ("outline.hover", &self.outline.hover),
        ] {
            if !(style.edge_strength >= 0.0 && style.edge_thickness >= 0.0) {
                return Err(ConfigError::out_of_range(key, style.edge_strength));
            }
        }

        if !(self.labels.terrain_size > 0.0) {
            return Err(ConfigError::out_of_range(
                "labels.terrain_size",
                self.labels.terrain_size,
            ));
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
