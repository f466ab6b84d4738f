//! Density layers built on the accumulator and contour pipeline.
//!
//! Each [`DensityLayer`] owns its own accumulator; a [`LayerRegistry`]
//! owns the layers. Layer definitions can be loaded from YAML files.

pub mod config;
pub mod ingest;
pub mod layer;
pub mod registry;

pub use config::{load_layer_directory, load_layer_file, LayerConfig};
pub use ingest::{samples_from_feature_collection, DENSITY_PROPERTY};
pub use layer::DensityLayer;
pub use registry::LayerRegistry;
