//! Container-level configuration
//!
//! Per-child placement comes in as typed [`LayoutParams`](crate::params::LayoutParams);
//! this is the configuration of the coordinator itself. It can be built in
//! code or loaded from TOML:
//!
//! ```toml
//! keylines = [16.0, 72.0]
//! density = 2.0
//! layout_direction = "rtl"
//! preview_mode = false
//!
//! [padding]
//! left = 8.0
//! right = 8.0
//! ```

use serde::{Deserialize, Serialize};
use tether_core::{Insets, LayoutDirection};

use crate::error::{CoordinatorError, Result};

/// Coordinator configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Keyline offsets from the starting edge, in density-independent units
    pub keylines: Vec<f32>,
    /// Scale from density-independent units to logical pixels
    pub density: f32,
    /// Horizontal layout direction
    pub layout_direction: LayoutDirection,
    /// Non-interactive preview/editing context: anchor errors degrade to
    /// "no anchor" instead of failing the pass
    pub preview_mode: bool,
    /// Container padding
    pub padding: Insets,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            keylines: Vec::new(),
            density: 1.0,
            layout_direction: LayoutDirection::Ltr,
            preview_mode: false,
            padding: Insets::ZERO,
        }
    }
}

impl CoordinatorConfig {
    /// Parse from a TOML string
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| CoordinatorError::Config(e.to_string()))
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CoordinatorError::Config(e.to_string()))
    }

    /// Keylines converted to logical pixels
    pub fn scaled_keylines(&self) -> Vec<f32> {
        self.keylines.iter().map(|k| k * self.density).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_with_defaults() {
        let config = CoordinatorConfig::from_toml(
            r#"
            keylines = [16.0, 72.0]
            density = 2.0
            layout_direction = "rtl"

            [padding]
            left = 8.0
            "#,
        )
        .unwrap();

        assert_eq!(config.scaled_keylines(), vec![32.0, 144.0]);
        assert_eq!(config.layout_direction, LayoutDirection::Rtl);
        assert_eq!(config.padding, Insets::new(8.0, 0.0, 0.0, 0.0));
        assert!(!config.preview_mode);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = CoordinatorConfig::from_toml("density = \"dense\"").unwrap_err();
        assert!(matches!(err, CoordinatorError::Config(_)));
    }

    #[test]
    fn test_toml_roundtrip_keeps_direction() {
        let config = CoordinatorConfig {
            layout_direction: LayoutDirection::Rtl,
            ..Default::default()
        };
        let parsed = CoordinatorConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
