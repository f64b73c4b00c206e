//! Top-level configuration.
//!
//! Every option has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! {
//!   "grid": { "rows": 12, "cols": 16, "bounds": { "kind": "centered", "width_fraction": 0.95, "height_fraction": 0.85 } },
//!   "links": { "particle_count": 200, "distance_threshold": 2.5 }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fallback::FallbackConfig;
use crate::grid::GridConfig;
use crate::links::LinkConfig;

/// Complete backdrop configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BackdropConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub links: LinkConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Skip the capability probe and always use the static field.
    #[serde(default)]
    pub force_fallback: bool,
}

impl BackdropConfig {
    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.links.validate()?;
        self.fallback.validate()
    }

    /// Parse and validate a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridBounds, GridStyle};

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = BackdropConfig::from_json("{}").unwrap();
        assert_eq!(config, BackdropConfig::default());
        assert_eq!(config.grid.rows, 20);
        assert_eq!(config.grid.cols, 30);
        assert_eq!(config.grid.trail_length, 8);
        assert_eq!(config.grid.decay_interval_ms, 150);
        assert_eq!(config.links.particle_count, 150);
    }

    #[test]
    fn test_partial_sections() {
        let config = BackdropConfig::from_json(
            r#"{
                "grid": { "rows": 3, "cols": 4, "bounds": { "kind": "centered", "width_fraction": 0.95, "height_fraction": 0.85 } },
                "links": { "neighbor_window": 8 },
                "force_fallback": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.grid.rows, 3);
        assert_eq!(config.grid.trail_length, 8);
        assert_eq!(config.grid.bounds, GridBounds::contained());
        assert_eq!(config.links.neighbor_window, 8);
        assert!(config.force_fallback);
    }

    #[test]
    fn test_contained_grid_and_light_links() {
        let config = BackdropConfig::from_json(
            r#"{
                "grid": { "style": "bounded", "trail_color": [224, 226, 219] },
                "links": { "particle_count": 60, "distance_threshold": 2.0, "speed": 0.2, "orb_count": 3 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.grid.style, GridStyle::Bounded);
        assert_eq!(config.grid.bounds, GridBounds::Viewport);
        assert_eq!(config.links, LinkConfig::light());
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let err = BackdropConfig::from_json(r#"{ "grid": { "rows": 4096, "cols": 4096 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { .. }));
    }

    #[test]
    fn test_zero_rows_rejected() {
        let err = BackdropConfig::from_json(r#"{ "grid": { "rows": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "grid.rows" }));
    }

    #[test]
    fn test_negative_count_is_parse_error() {
        let err = BackdropConfig::from_json(r#"{ "links": { "particle_count": -5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("backdrop-config-{}.json", std::process::id()));
        let mut config = BackdropConfig::default();
        config.grid.rows = 7;
        config.links.seed = Some(5);
        config.save(&path).unwrap();

        let loaded = BackdropConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let err = BackdropConfig::load("/nonexistent/backdrop.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
