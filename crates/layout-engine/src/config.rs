//! Editor configuration
//!
//! All fields have defaults, so a configuration file only needs to name the
//! settings it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutEngineError, Result};
use crate::export::ExportOptions;
use crate::types::Position;

/// Default values for configuration fields
pub mod defaults {
    /// zstd level used for history snapshots
    pub const COMPRESSION_LEVEL: i32 = 3;
    /// Offset applied to pasted and duplicated nodes
    pub const PASTE_OFFSET: f64 = 20.0;
    /// Grid unit dividing X positions on export
    pub const GRID_X_UNIT: f64 = 25.0;
    /// Grid unit dividing Y positions on export
    pub const GRID_Y_UNIT: f64 = 10.0;
}

/// Undo/redo history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum retained snapshots; `None` keeps the whole session
    pub max_snapshots: Option<usize>,
    /// zstd compression level for snapshots
    pub compression_level: i32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_snapshots: None,
            compression_level: defaults::COMPRESSION_LEVEL,
        }
    }
}

/// Clipboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Shift applied to pasted and duplicated nodes
    pub paste_offset: Position,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            paste_offset: Position::new(defaults::PASTE_OFFSET, defaults::PASTE_OFFSET),
        }
    }
}

/// Configuration for an editor session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub clipboard: ClipboardConfig,
    pub export: ExportOptions,
}

impl EditorConfig {
    /// Read a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: EditorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!("Loaded editor configuration from {:?}", path);
        Ok(config)
    }

    /// Read a configuration file, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config from {:?}, using defaults: {}", path, e);
                Self::default()
            }
        }
    }

    /// Reject settings that would make the engine misbehave
    pub fn validate(&self) -> Result<()> {
        if self.history.max_snapshots == Some(0) {
            return Err(LayoutEngineError::config("history.max_snapshots must be at least 1"));
        }
        if !zstd::compression_level_range().contains(&self.history.compression_level) {
            return Err(LayoutEngineError::config(format!(
                "history.compression_level {} is out of range",
                self.history.compression_level
            )));
        }
        let offset = self.clipboard.paste_offset;
        if !offset.x.is_finite() || !offset.y.is_finite() {
            return Err(LayoutEngineError::config("clipboard.paste_offset must be finite"));
        }
        self.export.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::CoordinateMode;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history.max_snapshots, None);
        assert_eq!(config.clipboard.paste_offset, Position::new(20.0, 20.0));
        assert_eq!(
            config.export.coordinates,
            CoordinateMode::Grid { x_unit: 25.0, y_unit: 10.0 }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.json");
        std::fs::write(
            &path,
            r#"{"history": {"max_snapshots": 50}, "export": {"coordinates": {"mode": "raw"}}}"#,
        )
        .unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.history.max_snapshots, Some(50));
        assert_eq!(config.history.compression_level, defaults::COMPRESSION_LEVEL);
        assert_eq!(config.export.coordinates, CoordinateMode::Raw);
        assert_eq!(config.clipboard, ClipboardConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = EditorConfig::default();
        config.history.max_snapshots = Some(0);
        assert!(matches!(config.validate(), Err(LayoutEngineError::Config(_))));

        let mut config = EditorConfig::default();
        config.export.coordinates = CoordinateMode::Grid { x_unit: 0.0, y_unit: 10.0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load_or_default(dir.path().join("absent.json"));
        assert_eq!(config, EditorConfig::default());
    }
}
