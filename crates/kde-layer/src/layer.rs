//! A named density layer: one accumulator plus the pipeline that turns
//! its samples into contour polygons.

use serde_json::Value;

use contour::{encode_polygons, extract_contours, Contour, PolygonFeatureCollection};
use density::{Accumulator, DensityGrid, Extrema, ExtremaSignal, FieldBuilder, Snapshot};
use kde_common::{KdeResult, Sample, WeightedPoint};

use crate::config::LayerConfig;
use crate::ingest::samples_from_feature_collection;

/// Samples for one logical layer and the outputs derived from them.
///
/// Outputs are always rebuilt from the full sample set. The polygon
/// collection is cached until the next mutation.
#[derive(Debug)]
pub struct DensityLayer {
    config: LayerConfig,
    accumulator: Accumulator,
    polygons: Option<PolygonFeatureCollection>,
}

impl DensityLayer {
    /// Create a layer named `id`; the id in `config` is replaced.
    pub fn new(id: impl Into<String>, mut config: LayerConfig) -> KdeResult<Self> {
        config.id = id.into();
        Self::from_config(config)
    }

    pub fn from_config(config: LayerConfig) -> KdeResult<Self> {
        config.validate()?;

        Ok(Self {
            accumulator: Accumulator::new(config.accumulator.clone()),
            config,
            polygons: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.accumulator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulator.is_empty()
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    pub fn add_sample(&mut self, sample: Sample) -> ExtremaSignal {
        self.invalidate();
        self.accumulator.add_one(sample)
    }

    pub fn add_samples<I>(&mut self, samples: I) -> ExtremaSignal
    where
        I: IntoIterator<Item = Sample>,
    {
        self.invalidate();
        self.accumulator.add_many(samples)
    }

    /// Add one record keyed by the layer's configured field names.
    pub fn add_record(&mut self, record: &Value) -> ExtremaSignal {
        self.invalidate();
        self.accumulator.add_record(record)
    }

    /// Add every point of a GeoJSON FeatureCollection.
    pub fn add_feature_collection(&mut self, collection: &Value) -> KdeResult<ExtremaSignal> {
        let samples = samples_from_feature_collection(collection)?;
        Ok(self.add_samples(samples))
    }

    /// Replace all samples.
    pub fn set_samples<I>(&mut self, samples: I, min: Option<f64>, max: Option<f64>) -> ExtremaSignal
    where
        I: IntoIterator<Item = Sample>,
    {
        self.invalidate();
        self.accumulator.set_all(samples, min, max)
    }

    pub fn set_max(&mut self, max: f64) -> ExtremaSignal {
        self.invalidate();
        self.accumulator.set_max(max)
    }

    pub fn set_min(&mut self, min: f64) -> ExtremaSignal {
        self.invalidate();
        self.accumulator.set_min(min)
    }

    pub fn reset(&mut self) {
        self.invalidate();
        self.accumulator.reset();
    }

    fn invalidate(&mut self) {
        self.polygons = None;
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn snapshot(&self) -> Snapshot {
        self.accumulator.snapshot()
    }

    pub fn extrema(&self) -> Extrema {
        self.accumulator.extrema()
    }

    /// Density grid over the current samples.
    pub fn density_field(&self) -> KdeResult<DensityGrid> {
        let points: Vec<WeightedPoint> = self
            .accumulator
            .snapshot()
            .points
            .iter()
            .map(WeightedPoint::from)
            .collect();

        FieldBuilder::from_config(&self.config.kde).build(&points)
    }

    /// Contours at the layer's configured threshold.
    pub fn contours(&self) -> KdeResult<Vec<Contour>> {
        let field = self.density_field()?;
        Ok(extract_contours(&field, self.config.kde.threshold))
    }

    /// Polygon features for the current samples.
    pub fn polygons(&mut self) -> KdeResult<&PolygonFeatureCollection> {
        if self.polygons.is_none() {
            let contours = self.contours()?;
            tracing::debug!(
                layer = %self.config.id,
                samples = self.accumulator.len(),
                contours = contours.len(),
                "Rebuilt layer polygons"
            );
            self.polygons = Some(encode_polygons(&contours));
        }

        let polygons: &PolygonFeatureCollection =
            self.polygons.get_or_insert_with(PolygonFeatureCollection::default);
        Ok(polygons)
    }

    /// Whether [`DensityLayer::polygons`] will rebuild on the next call.
    pub fn is_stale(&self) -> bool {
        self.polygons.is_none()
    }
}
