//! Incremental point accumulator.
//!
//! Samples are merged into buckets keyed by their exact `(x, y)`
//! coordinates. A bucket's value only ever grows by addition; the first
//! sample at a coordinate fixes the bucket's radius.
//!
//! The accumulator also tracks the extrema of the bucket values. Whenever
//! an operation moves either bound the caller receives
//! [`ExtremaSignal::RecomputeRequired`] and must rebuild any derived
//! field from scratch before the next query.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{btree_map, BTreeMap, HashMap};

use kde_common::{AccumulatorConfig, Sample, StoredPoint};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a mutating accumulator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremaSignal {
    /// Extrema are unchanged.
    Unchanged,
    /// Extrema moved (or were overridden); derived output must be rebuilt.
    RecomputeRequired,
}

impl ExtremaSignal {
    pub fn requires_recompute(self) -> bool {
        matches!(self, ExtremaSignal::RecomputeRequired)
    }

    /// Combine two signals; recompute wins.
    pub fn merge(self, other: ExtremaSignal) -> ExtremaSignal {
        if self.requires_recompute() || other.requires_recompute() {
            ExtremaSignal::RecomputeRequired
        } else {
            ExtremaSignal::Unchanged
        }
    }
}

/// Current minimum and maximum of the bucket values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extrema {
    pub min: f64,
    pub max: f64,
}

/// Contents of an accumulator at a point in time.
///
/// The order of `points` is unspecified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub min: f64,
    pub max: f64,
    pub points: Vec<StoredPoint>,
}

/// Bucket key built from the bit patterns of both coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CoordKey(u64, u64);

impl CoordKey {
    fn new(x: f64, y: f64) -> Self {
        Self(canonical_bits(x), canonical_bits(y))
    }
}

/// `-0.0` and `0.0` compare equal, so they share a bucket.
fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 {
        0f64.to_bits()
    } else {
        v.to_bits()
    }
}

/// Bucket value ordered with `total_cmp`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrdValue(f64);

impl Eq for OrdValue {}

impl PartialOrd for OrdValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Multiset of bucket values; the first and last keys are the exact extrema.
#[derive(Debug, Clone, Default)]
struct ValueIndex {
    counts: BTreeMap<OrdValue, usize>,
}

impl ValueIndex {
    fn insert(&mut self, value: f64) {
        *self.counts.entry(OrdValue(value)).or_insert(0) += 1;
    }

    fn remove(&mut self, value: f64) {
        if let btree_map::Entry::Occupied(mut slot) = self.counts.entry(OrdValue(value)) {
            if *slot.get() > 1 {
                *slot.get_mut() -= 1;
            } else {
                slot.remove();
            }
        }
    }

    fn min(&self) -> Option<f64> {
        self.counts.keys().next().map(|k| k.0)
    }

    fn max(&self) -> Option<f64> {
        self.counts.keys().next_back().map(|k| k.0)
    }

    fn clear(&mut self) {
        self.counts.clear();
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    x: f64,
    y: f64,
    value: f64,
    radius: f64,
}

/// Accumulates weighted samples for a single layer.
#[derive(Debug, Clone)]
pub struct Accumulator {
    config: AccumulatorConfig,
    buckets: HashMap<CoordKey, Bucket>,
    values: ValueIndex,
    min: f64,
    max: f64,
    /// Extrema have been initialised (by a first sample or an override).
    seeded: bool,
    /// Extrema follow the bucket values exactly. Cleared by explicit
    /// overrides, after which bounds only widen.
    tracking: bool,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new(AccumulatorConfig::default())
    }
}

impl Accumulator {
    /// Create an empty accumulator.
    pub fn new(config: AccumulatorConfig) -> Self {
        Self {
            config,
            buckets: HashMap::new(),
            values: ValueIndex::default(),
            min: 0.0,
            max: 0.0,
            seeded: false,
            tracking: true,
        }
    }

    pub fn config(&self) -> &AccumulatorConfig {
        &self.config
    }

    /// Number of distinct coordinates stored.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn extrema(&self) -> Extrema {
        Extrema {
            min: self.min,
            max: self.max,
        }
    }

    /// Merged value stored at exactly `(x, y)`.
    pub fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        self.buckets.get(&CoordKey::new(x, y)).map(|b| b.value)
    }

    /// Merge one sample.
    ///
    /// Samples with a non-finite coordinate are ignored. A non-finite value
    /// falls back to 1 and a missing or non-positive radius to the
    /// configured default.
    pub fn add_one(&mut self, sample: Sample) -> ExtremaSignal {
        if !sample.x.is_finite() || !sample.y.is_finite() {
            tracing::debug!(x = sample.x, y = sample.y, "Skipping sample with non-finite coordinate");
            return ExtremaSignal::Unchanged;
        }

        let value = if sample.value.is_finite() {
            sample.value
        } else {
            1.0
        };
        let radius = self.resolve_radius(sample.radius);

        let (previous, merged) = match self.buckets.entry(CoordKey::new(sample.x, sample.y)) {
            Entry::Vacant(slot) => {
                slot.insert(Bucket {
                    x: sample.x,
                    y: sample.y,
                    value,
                    radius,
                });
                (None, value)
            }
            Entry::Occupied(mut slot) => {
                let bucket = slot.get_mut();
                let previous = bucket.value;
                bucket.value += value;
                (Some(previous), bucket.value)
            }
        };

        if let Some(previous) = previous {
            self.values.remove(previous);
        }
        self.values.insert(merged);

        self.update_extrema(merged)
    }

    /// Merge every sample in order.
    pub fn add_many<I>(&mut self, samples: I) -> ExtremaSignal
    where
        I: IntoIterator<Item = Sample>,
    {
        samples
            .into_iter()
            .fold(ExtremaSignal::Unchanged, |signal, sample| {
                signal.merge(self.add_one(sample))
            })
    }

    /// Merge a loosely typed record using the configured field names.
    ///
    /// Numeric strings are accepted for every field. A record without
    /// usable coordinates is skipped.
    pub fn add_record(&mut self, record: &Value) -> ExtremaSignal {
        match self.sample_from_record(record) {
            Some(sample) => self.add_one(sample),
            None => {
                tracing::debug!(
                    x_field = %self.config.x_field,
                    y_field = %self.config.y_field,
                    "Skipping record without numeric coordinates"
                );
                ExtremaSignal::Unchanged
            }
        }
    }

    /// Replace every bucket with `samples` and set the extrema explicitly.
    ///
    /// Unset bounds become 0. Always requires a recompute.
    pub fn set_all<I>(&mut self, samples: I, min: Option<f64>, max: Option<f64>) -> ExtremaSignal
    where
        I: IntoIterator<Item = Sample>,
    {
        self.buckets.clear();
        self.values.clear();
        self.seeded = true;
        self.tracking = false;
        for sample in samples {
            self.add_one(sample);
        }

        self.min = min.unwrap_or(0.0);
        self.max = max.unwrap_or(0.0);

        tracing::debug!(
            buckets = self.buckets.len(),
            min = self.min,
            max = self.max,
            "Accumulator replaced"
        );

        ExtremaSignal::RecomputeRequired
    }

    /// Override the maximum without touching stored samples.
    pub fn set_max(&mut self, max: f64) -> ExtremaSignal {
        self.max = max;
        self.seeded = true;
        self.tracking = false;
        ExtremaSignal::RecomputeRequired
    }

    /// Override the minimum without touching stored samples.
    pub fn set_min(&mut self, min: f64) -> ExtremaSignal {
        self.min = min;
        self.seeded = true;
        self.tracking = false;
        ExtremaSignal::RecomputeRequired
    }

    /// Drop every bucket and forget the extrema.
    pub fn reset(&mut self) {
        self.buckets.clear();
        self.values.clear();
        self.min = 0.0;
        self.max = 0.0;
        self.seeded = false;
        self.tracking = true;
    }

    /// Copy out the extrema and every bucket.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            min: self.min,
            max: self.max,
            points: self
                .buckets
                .values()
                .map(|b| StoredPoint {
                    x: b.x,
                    y: b.y,
                    radius: b.radius,
                    value: b.value,
                })
                .collect(),
        }
    }

    fn resolve_radius(&self, radius: Option<f64>) -> f64 {
        match radius {
            Some(r) if r.is_finite() && r > 0.0 => r,
            _ => self.config.default_radius,
        }
    }

    fn sample_from_record(&self, record: &Value) -> Option<Sample> {
        let x = numeric_field(record, &self.config.x_field)?;
        let y = numeric_field(record, &self.config.y_field)?;
        let value = numeric_field(record, &self.config.value_field).unwrap_or(1.0);

        Some(Sample {
            x,
            y,
            value,
            radius: numeric_field(record, "radius"),
        })
    }

    fn update_extrema(&mut self, merged: f64) -> ExtremaSignal {
        if !self.seeded {
            self.min = merged;
            self.max = merged;
            self.seeded = true;
            return ExtremaSignal::RecomputeRequired;
        }

        let before = (self.min, self.max);

        if self.tracking {
            // A bucket holding a bound may have moved inward.
            self.min = self.values.min().unwrap_or(merged);
            self.max = self.values.max().unwrap_or(merged);
        } else if merged > self.max {
            self.max = merged;
        } else if merged < self.min {
            self.min = merged;
        }

        if (self.min, self.max) != before {
            ExtremaSignal::RecomputeRequired
        } else {
            ExtremaSignal::Unchanged
        }
    }
}

fn numeric_field(record: &Value, key: &str) -> Option<f64> {
    let value = match record.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}
