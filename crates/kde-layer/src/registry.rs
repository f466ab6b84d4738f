//! Named density layers.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use kde_common::{KdeError, KdeResult};

use crate::config::{load_layer_directory, LayerConfig};
use crate::layer::DensityLayer;

/// Owner of every density layer, keyed by id.
///
/// Removing a layer drops it along with its accumulated samples.
#[derive(Debug, Default)]
pub struct LayerRegistry {
    layers: HashMap<String, DensityLayer>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a layer for each configuration; duplicate ids are an error.
    pub fn from_configs<I>(configs: I) -> KdeResult<Self>
    where
        I: IntoIterator<Item = LayerConfig>,
    {
        let mut registry = Self::new();
        for config in configs {
            registry.add_layer(DensityLayer::from_config(config)?)?;
        }
        Ok(registry)
    }

    /// Load layers from every YAML file in a directory.
    ///
    /// Invalid files and duplicate ids are logged and skipped.
    pub fn load_from_directory<P: AsRef<Path>>(dir: P) -> Self {
        let mut registry = Self::new();

        for config in load_layer_directory(dir) {
            let id = config.id.clone();
            let result = DensityLayer::from_config(config).and_then(|layer| registry.add_layer(layer));
            if let Err(e) = result {
                warn!(layer = %id, error = %e, "Skipping layer");
            }
        }

        info!(layers = registry.len(), "Layer registry loaded");
        registry
    }

    pub fn add_layer(&mut self, layer: DensityLayer) -> KdeResult<()> {
        if self.layers.contains_key(layer.id()) {
            return Err(KdeError::LayerExists(layer.id().to_string()));
        }
        self.layers.insert(layer.id().to_string(), layer);
        Ok(())
    }

    pub fn layer(&self, id: &str) -> Option<&DensityLayer> {
        self.layers.get(id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut DensityLayer> {
        self.layers.get_mut(id)
    }

    /// Like [`LayerRegistry::layer_mut`], but missing ids are an error.
    pub fn require_mut(&mut self, id: &str) -> KdeResult<&mut DensityLayer> {
        self.layers
            .get_mut(id)
            .ok_or_else(|| KdeError::LayerNotFound(id.to_string()))
    }

    pub fn remove_layer(&mut self, id: &str) -> KdeResult<()> {
        match self.layers.remove(id) {
            Some(layer) => {
                info!(layer = %id, samples = layer.len(), "Removed layer");
                Ok(())
            }
            None => Err(KdeError::LayerNotFound(id.to_string())),
        }
    }

    /// Layer ids in sorted order.
    pub fn layer_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.layers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }
}
