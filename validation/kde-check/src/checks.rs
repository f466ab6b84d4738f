//! Pruning tolerance and pipeline timing checks.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use contour::{encode_polygons, extract_contours};
use density::{truncation_bound, FieldBuilder};
use kde_common::{KdeConfig, KdeResult, WeightedPoint};

/// Random points inside `[0, extent]` on both axes with weights in `[1, 10)`.
pub fn random_points(count: usize, extent: f64, seed: u64) -> Vec<WeightedPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            WeightedPoint::new(
                rng.gen_range(0.0..extent),
                rng.gen_range(0.0..extent),
                rng.gen_range(1.0..10.0),
            )
        })
        .collect()
}

/// Largest per-cell difference between a pruned and an unpruned field.
#[derive(Debug, Clone, Serialize)]
pub struct ToleranceResult {
    pub cutoff_sigmas: f64,
    pub max_abs_diff: f64,
    pub bound: f64,
    pub cells: usize,
}

impl ToleranceResult {
    pub fn passed(&self) -> bool {
        self.max_abs_diff <= self.bound
    }
}

/// Compare the unpruned field against one pruned field per cutoff.
pub fn check_tolerance(
    points: &[WeightedPoint],
    grid_size: f64,
    bandwidth: f64,
    cutoffs: &[f64],
) -> KdeResult<Vec<ToleranceResult>> {
    let full = FieldBuilder::new(grid_size, bandwidth).build(points)?;
    let total_abs: f64 = points.iter().map(|p| p.weight.abs()).sum();

    cutoffs
        .iter()
        .map(|&sigmas| {
            let pruned = FieldBuilder::new(grid_size, bandwidth)
                .with_cutoff_sigmas(sigmas)
                .build(points)?;

            let max_abs_diff = full
                .cells
                .iter()
                .zip(&pruned.cells)
                .map(|(a, b)| (a.density - b.density).abs())
                .fold(0.0, f64::max);

            let result = ToleranceResult {
                cutoff_sigmas: sigmas,
                max_abs_diff,
                bound: truncation_bound(total_abs, bandwidth, sigmas),
                cells: full.len(),
            };

            tracing::debug!(
                sigmas = sigmas,
                max_abs_diff = result.max_abs_diff,
                bound = result.bound,
                "Tolerance checked"
            );

            Ok(result)
        })
        .collect()
}

/// Wall-clock statistics for one pipeline stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageTiming {
    pub stage: &'static str,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl StageTiming {
    fn from_samples(stage: &'static str, samples: &[Duration]) -> Self {
        let total: Duration = samples.iter().sum();
        let runs = samples.len().max(1) as u32;
        Self {
            stage,
            mean: total / runs,
            min: samples.iter().min().copied().unwrap_or_default(),
            max: samples.iter().max().copied().unwrap_or_default(),
        }
    }
}

/// Time field construction, contour extraction and polygon encoding.
pub fn time_pipeline(
    points: &[WeightedPoint],
    config: &KdeConfig,
    repeats: usize,
) -> KdeResult<Vec<StageTiming>> {
    let builder = FieldBuilder::from_config(config);
    let mut field_times = Vec::with_capacity(repeats);
    let mut contour_times = Vec::with_capacity(repeats);
    let mut encode_times = Vec::with_capacity(repeats);

    for _ in 0..repeats.max(1) {
        let start = Instant::now();
        let grid = builder.build(points)?;
        field_times.push(start.elapsed());

        let start = Instant::now();
        let contours = extract_contours(&grid, config.threshold);
        contour_times.push(start.elapsed());

        let start = Instant::now();
        let polygons = encode_polygons(&contours);
        encode_times.push(start.elapsed());

        tracing::debug!(
            cells = grid.len(),
            contours = contours.len(),
            features = polygons.len(),
            "Pipeline run complete"
        );
    }

    Ok(vec![
        StageTiming::from_samples("density_field", &field_times),
        StageTiming::from_samples("extract_contours", &contour_times),
        StageTiming::from_samples("encode_polygons", &encode_times),
    ])
}
