//! Equipment coloring rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use yardview_core::{Equipment, Rgb};
use yardview_settings::ColorConfig;

use crate::geometry::MeshMaterial;

/// How equipment is colored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// Stored base color
    #[default]
    Base,
    /// Palette keyed by operational state
    OperationalState,
    /// Derived from the first three characters of the product code
    Product,
}

impl ColorMode {
    pub const ALL: [ColorMode; 3] = [
        ColorMode::Base,
        ColorMode::OperationalState,
        ColorMode::Product,
    ];

    /// Label shown in the mode selector.
    pub fn label(&self) -> &'static str {
        match self {
            ColorMode::Base => "Equipamento",
            ColorMode::OperationalState => "Estado",
            ColorMode::Product => "Produto",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Color derived from a product code: each of the first three characters
/// read as a base-36 digit and scaled into 0..=1.
///
/// `None` for codes shorter than three characters or with a non-alphanumeric
/// character among the first three.
pub fn product_color(code: &str) -> Option<Rgb> {
    let mut digits = code.trim().chars().map(|c| c.to_digit(36));
    let mut channel = || -> Option<f32> { Some(digits.next()?? as f32 / 35.0) };
    Some(Rgb::new(channel()?, channel()?, channel()?))
}

/// Resolves the display material of equipment under a color mode.
#[derive(Debug, Clone)]
pub struct ColorResolver {
    config: ColorConfig,
}

impl ColorResolver {
    pub fn new(config: ColorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ColorConfig {
        &self.config
    }

    pub fn is_inapplicable(&self, value: &str) -> bool {
        value
            .trim()
            .eq_ignore_ascii_case(self.config.inapplicable_marker.trim())
    }

    pub fn color(&self, equipment: &Equipment, mode: ColorMode) -> Rgb {
        match mode {
            ColorMode::Base => equipment.base_color,
            ColorMode::OperationalState => {
                let state = equipment.operational_state.trim();
                if state.is_empty() || self.is_inapplicable(state) {
                    return equipment.base_color;
                }
                self.config
                    .state_palette
                    .get(&state.to_lowercase())
                    .copied()
                    .unwrap_or(equipment.base_color)
            }
            ColorMode::Product => {
                if self.is_inapplicable(&equipment.product) {
                    return equipment.base_color;
                }
                product_color(&equipment.product).unwrap_or(equipment.base_color)
            }
        }
    }

    /// Translucent when the operational state is not applicable.
    pub fn opacity(&self, equipment: &Equipment) -> f32 {
        if self.is_inapplicable(&equipment.operational_state) {
            self.config.inapplicable_opacity
        } else {
            1.0
        }
    }

    pub fn material(&self, equipment: &Equipment, mode: ColorMode) -> MeshMaterial {
        MeshMaterial::solid(
            self.color(equipment, mode).to_array(),
            self.opacity(equipment),
        )
    }
}

impl Default for ColorResolver {
    fn default() -> Self {
        Self::new(ColorConfig::default())
    }
}
