//! Common test fixtures.
//!
//! Pre-defined inputs for scenarios that recur across the test suites.

use std::io::Write;

use tempfile::NamedTempFile;

/// Common bounding box definitions for testing, as `(min_x, min_y, max_x, max_y)`.
pub mod bbox {
    /// Unit square around the origin.
    pub const UNIT: (f64, f64, f64, f64) = (-1.0, -1.0, 1.0, 1.0);

    /// Taipei city extent (lng/lat degrees).
    pub const TAIPEI: (f64, f64, f64, f64) = (121.45, 24.96, 121.67, 25.21);

    /// Single point (degenerate bbox)
    pub const POINT: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 0.0);

    /// Zero-height strip (degenerate on latitude only)
    pub const STRIP: (f64, f64, f64, f64) = (0.0, 1.0, 5.0, 1.0);
}

/// Point samples used by end-to-end tests.
pub mod samples {
    /// `(lng, lat, weight)` drop-off points inside Taipei.
    pub const TAIPEI_DROP_OFFS: [(f64, f64, f64); 6] = [
        (121.5173, 25.0478, 4.0),
        (121.5180, 25.0481, 2.0),
        (121.5654, 25.0330, 7.0),
        (121.5437, 25.0260, 1.0),
        (121.5011, 25.0375, 3.0),
        (121.5173, 25.0478, 5.0),
    ];
}

/// GeoJSON point collection with a `density` property on most features.
///
/// Contains one feature without geometry and one without a density.
pub const POINT_FEATURE_COLLECTION: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"density": 3}, "geometry": {"type": "Point", "coordinates": [121.5173, 25.0478]}},
    {"type": "Feature", "properties": {"density": 2.5}, "geometry": {"type": "Point", "coordinates": [121.5654, 25.0330]}},
    {"type": "Feature", "properties": {"density": 1}, "geometry": null},
    {"type": "Feature", "properties": {"name": "no density"}, "geometry": {"type": "Point", "coordinates": [121.5011, 25.0375]}}
  ]
}"#;

/// YAML file describing two density layers.
pub const LAYERS_YAML: &str = r#"
layers:
  - id: recycling
    title: Recycling drop-off density
    kde:
      grid_size: 0.002
      bandwidth: 0.004
      threshold: 0.5
    accumulator:
      x_field: longitude
      y_field: latitude
      value_field: weight
  - id: defaults
"#;

/// Writes `contents` to a fresh temporary file with the given suffix.
pub fn temp_file_with(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes())
        .expect("write temp file");
    file
}
