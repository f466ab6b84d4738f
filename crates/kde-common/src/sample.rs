//! Sample and point types passed between the accumulator and the
//! density field builder.

use serde::{Deserialize, Serialize};

/// A weighted sample offered to the accumulator.
///
/// `value` defaults to 1 and `radius` to the accumulator's configured
/// default when left unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_value")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

fn default_value() -> f64 {
    1.0
}

impl Sample {
    /// A unit-valued sample at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            value: 1.0,
            radius: None,
        }
    }

    /// Set the sample value.
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    /// Set an explicit radius for the sample.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }
}

/// A merged bucket as reported by an accumulator snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredPoint {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub value: f64,
}

/// Input triple for the density field builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedPoint {
    pub lng: f64,
    pub lat: f64,
    pub weight: f64,
}

impl WeightedPoint {
    pub fn new(lng: f64, lat: f64, weight: f64) -> Self {
        Self { lng, lat, weight }
    }

    /// True when both coordinates and the weight are finite.
    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite() && self.weight.is_finite()
    }
}

impl From<&StoredPoint> for WeightedPoint {
    fn from(point: &StoredPoint) -> Self {
        Self {
            lng: point.x,
            lat: point.y,
            weight: point.value,
        }
    }
}

impl From<StoredPoint> for WeightedPoint {
    fn from(point: StoredPoint) -> Self {
        Self::from(&point)
    }
}
