//! Scene configuration.

use crate::store::DEFAULT_MAX_OBJECTS;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Viewport assumed until the host reports its real size.
pub const DEFAULT_VIEWPORT: Size = Size::new(1280.0, 800.0);

/// Storage key the scene is saved under.
pub const DEFAULT_STORAGE_KEY: &str = "scene";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables for a scene. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    /// Capacity bound on stored objects.
    pub max_objects: usize,
    /// Initial viewport size.
    pub viewport: Size,
    pub storage_key: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_objects: DEFAULT_MAX_OBJECTS,
            viewport: DEFAULT_VIEWPORT,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl SceneConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &std::path::Path) -> ConfigResult<Self> {
        let json =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_objects == 0 {
            return Err(ConfigError::Invalid("maxObjects must be at least 1".to_string()));
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "viewport must be positive, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storageKey must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.max_objects, 100);
        assert_eq!(config.viewport, Size::new(1280.0, 800.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = SceneConfig::from_json(r#"{"maxObjects": 5}"#).unwrap();
        assert_eq!(config.max_objects, 5);
        assert_eq!(config.viewport, DEFAULT_VIEWPORT);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);

        let config = SceneConfig::from_json(r#"{"viewport": {"width": 640.0, "height": 480.0}}"#).unwrap();
        assert_eq!(config.viewport, Size::new(640.0, 480.0));
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(SceneConfig::from_json("{"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            SceneConfig::from_json(r#"{"maxObjects": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SceneConfig::from_json(r#"{"viewport": {"width": 0.0, "height": 480.0}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SceneConfig::from_json(r#"{"storageKey": " "}"#),
            Err(ConfigError::Invalid(_))
        ));
    }
}
