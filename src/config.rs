//! Pipeline Configuration
//!
//! Serializable render settings: output size, depth testing, clear color and
//! an optional viewport restriction. Persisted as JSON so a setup can be
//! saved and reloaded between runs.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::rasterizer::Viewport;

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub width: u32,
    pub height: u32,
    /// Depth testing on by default; painter's order when off
    #[serde(default = "default_depth_enabled")]
    pub depth_enabled: bool,
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
    /// Restrict drawing to a sub-rectangle; None means the full target
    #[serde(default)]
    pub viewport: Option<Viewport>,
}

fn default_depth_enabled() -> bool {
    true
}

fn default_clear_color() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            depth_enabled: true,
            clear_color: default_clear_color(),
            viewport: None,
        }
    }
}

impl PipelineConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let config: Self = serde_json::from_str(&json).map_err(|e| e.to_string())?;
        info!(
            "loaded pipeline config: {}x{}, depth {}",
            config.width, config.height, config.depth_enabled
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert!(config.depth_enabled);
        assert!(config.viewport.is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = PipelineConfig::new(320, 240);
        config.viewport = Some(Viewport {
            x: 10,
            y: 20,
            width: 100,
            height: 50,
        });
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.width, 320);
        assert_eq!(back.height, 240);
        let vp = back.viewport.unwrap();
        assert_eq!((vp.x, vp.y, vp.width, vp.height), (10, 20, 100, 50));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"width":64,"height":32}"#).unwrap();
        assert!(config.depth_enabled);
        assert_eq!(config.clear_color, [0.0, 0.0, 0.0, 1.0]);
        assert!(config.viewport.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir();
        let path = dir.join("rastral_config_test.json");
        let config = PipelineConfig::new(128, 96);
        config.save(&path).unwrap();
        let back = PipelineConfig::load(&path).unwrap();
        assert_eq!(back.width, 128);
        assert_eq!(back.height, 96);
        let _ = std::fs::remove_file(&path);
    }
}
