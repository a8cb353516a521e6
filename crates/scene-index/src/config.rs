//! Index settings and their on-disk formats.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::InsertHeuristic;

/// Settings that can be loaded from and saved to a `.toml` or `.ron` file.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match format_of(path)? {
            Format::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match format_of(path)? {
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Format::Ron => ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

enum Format {
    Toml,
    Ron,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(Format::Toml),
        Some("ron") => Ok(Format::Ron),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

/// The scene grid used by `raycast_closest`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub enabled: bool,
    /// World Y of the grid plane.
    pub height: f32,
    pub cell_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            height: 0.0,
            cell_size: 1.0,
        }
    }
}

/// Settings of a [`PluginScene`](crate::scene::PluginScene).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub insert_heuristic: InsertHeuristic,
    /// World size of the box standing in for lights, particle systems,
    /// cameras and empty objects.
    pub volumeless_object_size: [f32; 3],
    pub grid: GridConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            insert_heuristic: InsertHeuristic::default(),
            volumeless_object_size: [1.0; 3],
            grid: GridConfig::default(),
        }
    }
}

impl Config for IndexConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn make_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("scene-index-{}-{name}", std::process::id()))
    }

    fn make_config() -> IndexConfig {
        IndexConfig {
            insert_heuristic: InsertHeuristic::LeastEnlargement,
            volumeless_object_size: [0.5, 2.0, 0.5],
            grid: GridConfig {
                enabled: false,
                height: -3.0,
                cell_size: 0.25,
            },
        }
    }

    #[test]
    fn toml_round_trip() {
        let path = make_path("config.toml");
        make_config().save_to_file(&path).unwrap();
        let loaded = IndexConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, make_config());
    }

    #[test]
    fn ron_round_trip() {
        let path = make_path("config.ron");
        make_config().save_to_file(&path).unwrap();
        let loaded = IndexConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, make_config());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: IndexConfig = toml::from_str("insert_heuristic = \"LeastEnlargement\"\n").unwrap();
        assert_eq!(config.insert_heuristic, InsertHeuristic::LeastEnlargement);
        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(config.volumeless_object_size, [1.0; 3]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = make_config().save_to_file(make_path("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
        assert!(matches!(
            IndexConfig::load_from_file(make_path("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
