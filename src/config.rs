use crate::tile::TileCoordinate;
use anyhow::Context;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Config file looked up in the working directory at startup.
pub const DEFAULT_CONFIG_PATH: &str = "Terratile.ron";

/// Viewer settings, read from [`DEFAULT_CONFIG_PATH`] when present.
///
/// Every field has a default, so a config file only needs to name the
/// fields it overrides.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// The tile to display.
    pub tile: TileCoordinate,
    /// Root directory of the `{zoom}/{x}/{y}.png` tile pyramid.
    pub tiles_root: String,
    /// Divisor shrinking real-world meters to display units.
    pub scale_factor: f64,
    /// Scroll zoom speed multiplier.
    pub zoom_speed: f32,
    /// Initial camera position; the rig orbits the scene origin.
    pub camera_position: [f32; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            tile: TileCoordinate::new(11, 330, 815),
            tiles_root: "assets/tiles".into(),
            scale_factor: 10.0,
            zoom_speed: 1.5,
            camera_position: [6.0, 8.0, 14.0],
        }
    }
}

impl ViewerConfig {
    /// Reads the config file, falling back to defaults when it is missing.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        ron::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_the_remaining_defaults() {
        let config: ViewerConfig =
            ron::from_str("(tile: (zoom: 12, x: 654, y: 1582), scale_factor: 25.0)").unwrap();

        assert_eq!(config.tile, TileCoordinate::new(12, 654, 1582));
        assert_eq!(config.scale_factor, 25.0);
        assert_eq!(config.zoom_speed, 1.5);
        assert_eq!(config.tiles_root, "assets/tiles");
    }

    #[test]
    fn config_round_trip() {
        let config = ViewerConfig::default();

        let serialized = ron::to_string(&config).unwrap();
        let deserialized: ViewerConfig = ron::from_str(&serialized).unwrap();

        assert_eq!(deserialized.tile, config.tile);
        assert_eq!(deserialized.camera_position, config.camera_position);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ViewerConfig::load("does/not/exist.ron").unwrap();

        assert_eq!(config.tile, ViewerConfig::default().tile);
    }
}
