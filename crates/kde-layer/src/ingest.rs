//! Samples from GeoJSON point features.

use serde_json::Value;

use kde_common::{KdeError, KdeResult, Sample};

/// Property holding a feature's sample value.
pub const DENSITY_PROPERTY: &str = "density";

/// Convert a GeoJSON FeatureCollection of points into samples.
///
/// Features without geometry are skipped, as are features whose
/// coordinates are not two numbers. The `density` property gives the
/// sample value, 0 when absent or not a number.
pub fn samples_from_feature_collection(collection: &Value) -> KdeResult<Vec<Sample>> {
    let features = collection
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| KdeError::Json("expected a FeatureCollection with a features array".to_string()))?;

    let samples: Vec<Sample> = features.iter().filter_map(sample_from_feature).collect();

    tracing::debug!(
        features = features.len(),
        samples = samples.len(),
        "Converted point features"
    );

    Ok(samples)
}

fn sample_from_feature(feature: &Value) -> Option<Sample> {
    let geometry = feature.get("geometry").filter(|g| !g.is_null())?;

    let coords = geometry.get("coordinates").and_then(Value::as_array)?;
    let (x, y) = match coords.as_slice() {
        [x, y, ..] => (x.as_f64()?, y.as_f64()?),
        _ => return None,
    };

    let density = feature
        .get("properties")
        .and_then(|p| p.get(DENSITY_PROPERTY))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    Some(Sample::new(x, y).with_value(density))
}
