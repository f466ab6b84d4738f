//! GeoJSON Polygon encoding of extracted contours.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use kde_common::KdeResult;

use crate::marching::Contour;

/// GeoJSON Polygon geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonGeometry {
    /// Always "Polygon".
    #[serde(rename = "type")]
    pub geometry_type: String,

    /// Rings of `[longitude, latitude]` positions.
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

/// GeoJSON Feature wrapping one contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonFeature {
    /// Always "Feature".
    #[serde(rename = "type")]
    pub feature_type: String,

    /// Always empty.
    pub properties: Map<String, Value>,

    pub geometry: PolygonGeometry,
}

impl PolygonFeature {
    /// The single ring of this feature.
    pub fn ring(&self) -> &[[f64; 2]] {
        self.geometry
            .coordinates
            .first()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl From<&Contour> for PolygonFeature {
    fn from(contour: &Contour) -> Self {
        // Endpoints flattened in emission order; the ring is not closed or repaired.
        let ring: Vec<[f64; 2]> = contour
            .segments
            .iter()
            .flat_map(|s| [[s.start.lng, s.start.lat], [s.end.lng, s.end.lat]])
            .collect();

        Self {
            feature_type: "Feature".to_string(),
            properties: Map::new(),
            geometry: PolygonGeometry {
                geometry_type: "Polygon".to_string(),
                coordinates: vec![ring],
            },
        }
    }
}

/// GeoJSON FeatureCollection of contour polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonFeatureCollection {
    /// Always "FeatureCollection".
    #[serde(rename = "type")]
    pub collection_type: String,

    pub features: Vec<PolygonFeature>,
}

impl Default for PolygonFeatureCollection {
    fn default() -> Self {
        Self {
            collection_type: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }
}

impl PolygonFeatureCollection {
    /// One feature per contour, in contour order.
    pub fn from_contours(contours: &[Contour]) -> Self {
        Self {
            features: contours.iter().map(PolygonFeature::from).collect(),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_value(&self) -> KdeResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialize as compact GeoJSON.
    pub fn to_json_string(&self) -> KdeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Encode contours as a Polygon FeatureCollection.
pub fn encode_polygons(contours: &[Contour]) -> PolygonFeatureCollection {
    PolygonFeatureCollection::from_contours(contours)
}
