//! YardView Settings Crate
//!
//! Scene engine configuration: framing constants, outline styles, color
//! palettes, camera and controls defaults. Loaded once at startup from JSON
//! or TOML; the engine never writes it back.

pub mod config;
pub mod error;

pub use config::{
    CameraConfig, ColorConfig, FramingConfig, HistoryConfig, LabelConfig, OutlineConfig,
    OutlineStyle, SceneConfig,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
