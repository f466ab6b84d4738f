//! Layer definitions loaded from YAML.
//!
//! A layer file lists one or more layers; anything omitted falls back to
//! the [`KdeConfig`] and [`AccumulatorConfig`] defaults:
//!
//! ```yaml
//! layers:
//!   - id: recycling
//!     title: Recycling drop-off density
//!     kde:
//!       grid_size: 0.002
//!       bandwidth: 0.004
//!     accumulator:
//!       value_field: weight
//!   - id: defaults
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kde_common::{AccumulatorConfig, KdeConfig, KdeError, KdeResult};

/// Configuration for one density layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub kde: KdeConfig,

    #[serde(default)]
    pub accumulator: AccumulatorConfig,
}

impl LayerConfig {
    /// A layer with default kde and accumulator settings.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            kde: KdeConfig::default(),
            accumulator: AccumulatorConfig::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_kde(mut self, kde: KdeConfig) -> Self {
        self.kde = kde;
        self
    }

    pub fn with_accumulator(mut self, accumulator: AccumulatorConfig) -> Self {
        self.accumulator = accumulator;
        self
    }

    /// Title if set, otherwise the id.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    pub fn validate(&self) -> KdeResult<()> {
        if self.id.trim().is_empty() {
            return Err(KdeError::Config("layer id must not be empty".to_string()));
        }
        self.kde.validate()
    }

    /// Parse every layer in a YAML layer document.
    pub fn from_yaml_str(yaml: &str) -> KdeResult<Vec<LayerConfig>> {
        let file: YamlLayerFile = serde_yaml::from_str(yaml)?;

        for layer in &file.layers {
            layer.validate()?;
        }

        Ok(file.layers)
    }
}

// ============================================================================
// YAML Parsing Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct YamlLayerFile {
    #[serde(default)]
    layers: Vec<LayerConfig>,
}

/// Load the layers defined in one YAML file.
pub fn load_layer_file<P: AsRef<Path>>(path: P) -> KdeResult<Vec<LayerConfig>> {
    let path = path.as_ref();

    let contents = fs::read_to_string(path).map_err(|e| {
        warn!(error = %e, path = ?path, "Failed to read layer file");
        KdeError::from(e)
    })?;

    let layers = LayerConfig::from_yaml_str(&contents).map_err(|e| {
        warn!(error = %e, path = ?path, "Failed to parse layer file");
        e
    })?;

    info!(path = ?path, layers = layers.len(), "Loaded layer config");
    Ok(layers)
}

/// Load every `.yaml` file in a directory.
///
/// Unreadable or invalid files are logged and skipped.
pub fn load_layer_directory<P: AsRef<Path>>(dir: P) -> Vec<LayerConfig> {
    let dir = dir.as_ref();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, path = ?dir, "Failed to read layers directory");
            return Vec::new();
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("yaml"))
        .collect();
    paths.sort();

    let layers: Vec<LayerConfig> = paths
        .iter()
        .filter_map(|path| load_layer_file(path).ok())
        .flatten()
        .collect();

    info!(path = ?dir, files = paths.len(), total_layers = layers.len(), "Layer configs loaded");
    layers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_layer_uses_defaults() {
        let layers = LayerConfig::from_yaml_str("layers:\n  - id: a\n").unwrap();
        assert_eq!(layers, vec![LayerConfig::new("a")]);
        assert_eq!(layers[0].display_name(), "a");
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = LayerConfig::from_yaml_str("layers:\n  - id: ''\n").unwrap_err();
        assert!(matches!(err, KdeError::Config(_)));
    }

    #[test]
    fn test_invalid_kde_rejected() {
        let yaml = "layers:\n  - id: a\n    kde:\n      bandwidth: -1\n";
        let err = LayerConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_malformed_yaml() {
        let err = LayerConfig::from_yaml_str("layers: [").unwrap_err();
        assert!(matches!(err, KdeError::Yaml(_)));
    }
}
