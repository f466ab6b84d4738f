//! Tests for density layers, the layer registry and YAML loading.

use std::fs;

use serde_json::{json, Value};

use density::{Extrema, ExtremaSignal};
use kde_common::{KdeConfig, KdeError, Sample};
use kde_layer::{
    load_layer_file, samples_from_feature_collection, DensityLayer, LayerConfig, LayerRegistry,
};
use test_utils::{samples, temp_file_with, LAYERS_YAML, POINT_FEATURE_COLLECTION};

fn taipei_layer() -> DensityLayer {
    let mut layer = DensityLayer::new("drop-offs", LayerConfig::new("ignored")).unwrap();
    layer.add_samples(
        samples::TAIPEI_DROP_OFFS
            .iter()
            .map(|&(lng, lat, w)| Sample::new(lng, lat).with_value(w)),
    );
    layer
}

// ============================================================================
// YAML configuration
// ============================================================================

#[test]
fn test_load_layer_file() {
    let file = temp_file_with(LAYERS_YAML, ".yaml");
    let layers = load_layer_file(file.path()).unwrap();

    assert_eq!(layers.len(), 2);

    let recycling = &layers[0];
    assert_eq!(recycling.id, "recycling");
    assert_eq!(recycling.display_name(), "Recycling drop-off density");
    assert_eq!(recycling.kde.grid_size, 0.002);
    assert_eq!(recycling.kde.bandwidth, 0.004);
    assert_eq!(recycling.kde.threshold, 0.5);
    assert_eq!(recycling.accumulator.x_field, "longitude");
    assert_eq!(recycling.accumulator.value_field, "weight");

    assert_eq!(layers[1], LayerConfig::new("defaults"));
}

#[test]
fn test_load_missing_file() {
    let err = load_layer_file("/nonexistent/layers.yaml").unwrap_err();
    assert!(matches!(err, KdeError::Io(_)));
}

#[test]
fn test_load_directory_skips_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.yaml"), LAYERS_YAML).unwrap();
    fs::write(dir.path().join("b.yaml"), "layers:\n  - id: extra\n").unwrap();
    fs::write(dir.path().join("broken.yaml"), "layers: [").unwrap();
    fs::write(dir.path().join("notes.txt"), "layers:\n  - id: ignored\n").unwrap();

    let registry = LayerRegistry::load_from_directory(dir.path());
    assert_eq!(registry.layer_ids(), vec!["defaults", "extra", "recycling"]);
}

#[test]
fn test_load_directory_skips_duplicate_ids() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.yaml"), "layers:\n  - id: same\n    title: first\n").unwrap();
    fs::write(dir.path().join("b.yaml"), "layers:\n  - id: same\n    title: second\n").unwrap();

    let registry = LayerRegistry::load_from_directory(dir.path());
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.layer("same").unwrap().config().display_name(), "first");
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_duplicate_layer_rejected() {
    let mut registry = LayerRegistry::new();
    registry
        .add_layer(DensityLayer::from_config(LayerConfig::new("a")).unwrap())
        .unwrap();

    let err = registry
        .add_layer(DensityLayer::from_config(LayerConfig::new("a")).unwrap())
        .unwrap_err();
    assert!(matches!(err, KdeError::LayerExists(ref id) if id == "a"));
}

#[test]
fn test_remove_destroys_samples() {
    let mut registry = LayerRegistry::new();
    registry.add_layer(taipei_layer()).unwrap();
    assert_eq!(registry.layer("drop-offs").unwrap().len(), 5);

    registry.remove_layer("drop-offs").unwrap();
    assert!(registry.layer("drop-offs").is_none());

    registry
        .add_layer(DensityLayer::from_config(LayerConfig::new("drop-offs")).unwrap())
        .unwrap();
    assert!(registry.layer("drop-offs").unwrap().is_empty());
}

#[test]
fn test_remove_missing_layer() {
    let mut registry = LayerRegistry::new();
    let err = registry.remove_layer("nope").unwrap_err();
    assert!(matches!(err, KdeError::LayerNotFound(ref id) if id == "nope"));
    assert!(registry.require_mut("nope").is_err());
}

#[test]
fn test_from_configs_and_clear() {
    let mut registry =
        LayerRegistry::from_configs(LayerConfig::from_yaml_str(LAYERS_YAML).unwrap()).unwrap();
    assert_eq!(registry.layer_ids(), vec!["defaults", "recycling"]);

    registry
        .layer_mut("defaults")
        .unwrap()
        .add_sample(Sample::new(1.0, 1.0));
    assert_eq!(registry.layer("defaults").unwrap().len(), 1);

    registry.clear();
    assert!(registry.is_empty());
}

#[test]
fn test_from_configs_rejects_duplicates() {
    let configs = vec![LayerConfig::new("x"), LayerConfig::new("x")];
    assert!(matches!(
        LayerRegistry::from_configs(configs),
        Err(KdeError::LayerExists(_))
    ));
}

// ============================================================================
// Ingestion
// ============================================================================

#[test]
fn test_feature_collection_samples() {
    let fc: Value = serde_json::from_str(POINT_FEATURE_COLLECTION).unwrap();
    let samples = samples_from_feature_collection(&fc).unwrap();

    assert_eq!(
        samples,
        vec![
            Sample::new(121.5173, 25.0478).with_value(3.0),
            Sample::new(121.5654, 25.0330).with_value(2.5),
            Sample::new(121.5011, 25.0375).with_value(0.0),
        ]
    );
}

#[test]
fn test_layer_add_feature_collection() {
    let fc: Value = serde_json::from_str(POINT_FEATURE_COLLECTION).unwrap();
    let mut layer = DensityLayer::from_config(LayerConfig::new("points")).unwrap();

    let signal = layer.add_feature_collection(&fc).unwrap();
    assert_eq!(signal, ExtremaSignal::RecomputeRequired);
    assert_eq!(layer.len(), 3);
    assert_eq!(layer.extrema(), Extrema { min: 0.0, max: 3.0 });
}

#[test]
fn test_layer_records_use_configured_fields() {
    let configs = LayerConfig::from_yaml_str(LAYERS_YAML).unwrap();
    let mut layer = DensityLayer::from_config(configs[0].clone()).unwrap();

    layer.add_record(&json!({"longitude": 121.5, "latitude": 25.0, "weight": 3}));
    layer.add_record(&json!({"x": 121.6, "y": 25.1}));

    let snapshot = layer.snapshot();
    assert_eq!(snapshot.points.len(), 1);
    assert_eq!(snapshot.points[0].value, 3.0);
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_polygons_match_contours() {
    let mut layer = taipei_layer();
    let contours = layer.contours().unwrap();
    assert!(!contours.is_empty());

    let polygons = layer.polygons().unwrap();
    assert_eq!(polygons.len(), contours.len());
    for (feature, contour) in polygons.features.iter().zip(&contours) {
        assert_eq!(feature.ring().len(), 2 * contour.segments.len());
    }
}

#[test]
fn test_mutation_invalidates_polygons() {
    let mut layer = taipei_layer();
    assert!(layer.is_stale());

    let before = layer.polygons().unwrap().clone();
    assert!(!layer.is_stale());

    layer.add_sample(Sample::new(121.54, 25.04).with_value(8.0));
    assert!(layer.is_stale());

    let after = layer.polygons().unwrap().clone();
    assert_ne!(before, after);

    layer.set_max(100.0);
    assert!(layer.is_stale());
}

#[test]
fn test_set_samples_replaces_everything() {
    let mut layer = taipei_layer();
    layer.polygons().unwrap();

    let signal = layer.set_samples(vec![Sample::new(0.0, 0.0)], None, Some(4.0));
    assert_eq!(signal, ExtremaSignal::RecomputeRequired);
    assert_eq!(layer.len(), 1);
    assert_eq!(layer.extrema(), Extrema { min: 0.0, max: 4.0 });

    // A single sample has degenerate bounds: no contours in lenient mode.
    assert!(layer.polygons().unwrap().is_empty());
}

#[test]
fn test_strict_layer_reports_degenerate_bounds() {
    let config = LayerConfig::new("strict").with_kde(KdeConfig::default().with_strict_bounds(true));
    let mut layer = DensityLayer::from_config(config).unwrap();
    layer.add_sample(Sample::new(0.0, 0.0).with_value(10.0));

    assert!(matches!(layer.polygons(), Err(KdeError::DegenerateBounds(_))));
    assert!(layer.is_stale());
}

#[test]
fn test_empty_layer_has_no_polygons() {
    let mut layer = DensityLayer::from_config(LayerConfig::new("empty")).unwrap();
    assert!(layer.density_field().unwrap().is_empty());
    assert!(layer.polygons().unwrap().is_empty());
}

#[test]
fn test_invalid_config_rejected() {
    let config = LayerConfig::new("bad").with_kde(KdeConfig::default().with_grid_size(-1.0));
    assert!(DensityLayer::from_config(config).is_err());
}
