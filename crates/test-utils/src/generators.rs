//! Deterministic generators for samples and grid values.
//!
//! Every generator is reproducible from its arguments so tests can
//! assert exact values without storing data files.

use kde_common::{Sample, WeightedPoint};

/// Creates weighted points scattered around a center.
///
/// Offsets are pseudo-random in `[-spread, spread]` on both axes and
/// weights in `[1, 10]`; the same `seed` always yields the same points.
pub fn create_cluster_points(
    center: (f64, f64),
    spread: f64,
    count: usize,
    seed: u32,
) -> Vec<WeightedPoint> {
    (0..count)
        .map(|k| {
            let hx = simple_hash(k as u32, 0, seed);
            let hy = simple_hash(k as u32, 1, seed);
            let hw = simple_hash(k as u32, 2, seed);
            WeightedPoint::new(
                center.0 + unit(hx) * spread,
                center.1 + unit(hy) * spread,
                1.0 + (hw % 10) as f64,
            )
        })
        .collect()
}

/// Creates one point per lattice node, all with the same weight.
pub fn create_lattice_points(
    origin: (f64, f64),
    step: f64,
    nx: usize,
    ny: usize,
    weight: f64,
) -> Vec<WeightedPoint> {
    let mut points = Vec::with_capacity(nx * ny);
    for i in 0..nx {
        for j in 0..ny {
            points.push(WeightedPoint::new(
                origin.0 + i as f64 * step,
                origin.1 + j as f64 * step,
                weight,
            ));
        }
    }
    points
}

/// Creates a pseudo-random sample sequence over a small set of
/// coordinates so that many samples collide and merge.
///
/// Values fall in `[-5, 5)` when `allow_negative` is set, `[0.5, 10.5)`
/// otherwise.
pub fn create_colliding_samples(
    count: usize,
    distinct_coords: u32,
    allow_negative: bool,
    seed: u32,
) -> Vec<Sample> {
    let distinct = distinct_coords.max(1);
    (0..count)
        .map(|k| {
            let slot = simple_hash(k as u32, 7, seed) % distinct;
            let hv = simple_hash(k as u32, 8, seed);
            let value = if allow_negative {
                (hv % 1000) as f64 / 100.0 - 5.0
            } else {
                0.5 + (hv % 1000) as f64 / 100.0
            };
            Sample::new((slot % 8) as f64, (slot / 8) as f64).with_value(value)
        })
        .collect()
}

/// Creates grid values with a single peak of height `peak` at the
/// center node, falling off linearly to 0 at the edges.
///
/// Layout is `values[i * ny + j]`.
pub fn create_peak_values(nx: usize, ny: usize, peak: f64) -> Vec<f64> {
    let ci = (nx.max(1) - 1) as f64 / 2.0;
    let cj = (ny.max(1) - 1) as f64 / 2.0;
    let reach = ci.max(cj).max(1.0);
    let mut values = Vec::with_capacity(nx * ny);
    for i in 0..nx {
        for j in 0..ny {
            let d = (i as f64 - ci).abs().max((j as f64 - cj).abs());
            values.push(peak * (1.0 - d / reach).max(0.0));
        }
    }
    values
}

/// Creates grid values alternating between `low` and `high`.
pub fn create_checkerboard_values(nx: usize, ny: usize, low: f64, high: f64) -> Vec<f64> {
    let mut values = Vec::with_capacity(nx * ny);
    for i in 0..nx {
        for j in 0..ny {
            values.push(if (i + j) % 2 == 0 { high } else { low });
        }
    }
    values
}

/// Creates grid values filled with a constant.
pub fn create_constant_values(nx: usize, ny: usize, value: f64) -> Vec<f64> {
    vec![value; nx * ny]
}

/// Maps a hash onto `[-1, 1]`.
fn unit(hash: u32) -> f64 {
    (hash as f64 / u32::MAX as f64) * 2.0 - 1.0
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
