//! Iso-density boundaries using the marching squares algorithm.
//!
//! Every 2x2 block of adjacent grid nodes is classified on its own. The
//! boundary crosses a block edge at that edge's geometric midpoint; values
//! are not interpolated. Segments from neighbouring blocks are never joined
//! into rings, so each crossing block yields its own [`Contour`].
//!
//! Saddle blocks (indices 5 and 10) always resolve through the fixed
//! table, without looking at the block's center value.

use density::DensityGrid;
use serde::{Deserialize, Serialize};

pub use kde_common::DEFAULT_THRESHOLD;

/// Corner bit for the west/north node of a block.
pub const TOP_LEFT: u8 = 1;
/// Corner bit for the east/north node of a block.
pub const TOP_RIGHT: u8 = 2;
/// Corner bit for the east/south node of a block.
pub const BOTTOM_RIGHT: u8 = 4;
/// Corner bit for the west/south node of a block.
pub const BOTTOM_LEFT: u8 = 8;

/// A point in grid coordinates (longitude, latitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lng: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// A line segment between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// Boundary segments emitted by a single crossing block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Row (longitude step) of the block's west/south node.
    pub i: usize,
    /// Column (latitude step) of the block's west/south node.
    pub j: usize,
    /// Corner classification, 1..=14.
    pub case_index: u8,
    /// One segment, or two for a saddle.
    pub segments: Vec<Segment>,
}

impl Contour {
    pub fn is_saddle(&self) -> bool {
        matches!(self.case_index, 5 | 10)
    }
}

/// Edge of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Between the top-left and top-right corners.
    Top,
    /// Between the top-right and bottom-right corners.
    Right,
    /// Between the bottom-right and bottom-left corners.
    Bottom,
    /// Between the bottom-left and top-left corners.
    Left,
}

use Edge::{Bottom, Left, Right, Top};

/// Segments per corner classification, as `(start edge, end edge)`.
const EDGE_TABLE: [&[(Edge, Edge)]; 16] = [
    &[],                            // 0
    &[(Left, Top)],                 // 1
    &[(Top, Right)],                // 2
    &[(Left, Right)],               // 3
    &[(Right, Bottom)],             // 4
    &[(Left, Top), (Right, Bottom)], // 5
    &[(Top, Bottom)],               // 6
    &[(Left, Bottom)],              // 7
    &[(Left, Bottom)],              // 8
    &[(Top, Bottom)],               // 9
    &[(Top, Right), (Left, Bottom)], // 10
    &[(Right, Bottom)],             // 11
    &[(Left, Right)],               // 12
    &[(Top, Right)],                // 13
    &[(Left, Top)],                 // 14
    &[],                            // 15
];

/// Edge pairs connected for a corner classification.
///
/// Indices above 15 have no segments.
pub fn edge_pairs(case_index: u8) -> &'static [(Edge, Edge)] {
    EDGE_TABLE.get(case_index as usize).copied().unwrap_or(&[])
}

/// Classify a block's corners against `threshold` (`>=` counts as above).
pub fn cell_index(tl: f64, tr: f64, br: f64, bl: f64, threshold: f64) -> u8 {
    let mut index = 0;
    if tl >= threshold {
        index |= TOP_LEFT;
    }
    if tr >= threshold {
        index |= TOP_RIGHT;
    }
    if br >= threshold {
        index |= BOTTOM_RIGHT;
    }
    if bl >= threshold {
        index |= BOTTOM_LEFT;
    }
    index
}

/// Segments for one block whose west/south corner is at `(west, south)`.
pub fn cell_segments(case_index: u8, west: f64, south: f64, grid_size: f64) -> Vec<Segment> {
    let half = grid_size / 2.0;
    let midpoint = |edge: Edge| match edge {
        Top => Point::new(west + half, south + grid_size),
        Right => Point::new(west + grid_size, south + half),
        Bottom => Point::new(west + half, south),
        Left => Point::new(west, south + half),
    };

    edge_pairs(case_index)
        .iter()
        .map(|&(a, b)| Segment {
            start: midpoint(a),
            end: midpoint(b),
        })
        .collect()
}

/// Marching squares over raw values.
///
/// # Arguments
/// * `values` - Node values laid out as `values[i * ny + j]`
/// * `nx` - Number of longitude steps
/// * `ny` - Number of latitude steps
/// * `origin_lng` - Longitude of node `(0, 0)`
/// * `origin_lat` - Latitude of node `(0, 0)`
/// * `grid_size` - Spacing between nodes
/// * `threshold` - Iso-density level
///
/// # Returns
/// One contour per crossing block, in scan order.
pub fn march_squares(
    values: &[f64],
    nx: usize,
    ny: usize,
    origin_lng: f64,
    origin_lat: f64,
    grid_size: f64,
    threshold: f64,
) -> Vec<Contour> {
    if nx < 2 || ny < 2 || values.len() != nx * ny {
        return vec![];
    }

    let mut contours = Vec::new();

    for i in 0..(nx - 1) {
        for j in 0..(ny - 1) {
            let bl = values[i * ny + j];
            let tl = values[i * ny + j + 1];
            let br = values[(i + 1) * ny + j];
            let tr = values[(i + 1) * ny + j + 1];

            if !(tl.is_finite() && tr.is_finite() && br.is_finite() && bl.is_finite()) {
                continue;
            }

            let case_index = cell_index(tl, tr, br, bl, threshold);
            if case_index == 0 || case_index == 15 {
                continue;
            }

            let west = origin_lng + i as f64 * grid_size;
            let south = origin_lat + j as f64 * grid_size;

            contours.push(Contour {
                i,
                j,
                case_index,
                segments: cell_segments(case_index, west, south, grid_size),
            });
        }
    }

    contours
}

/// Extract iso-density contours from a density grid.
///
/// An empty grid produces no contours.
pub fn extract_contours(grid: &DensityGrid, threshold: f64) -> Vec<Contour> {
    let Some(bounds) = grid.bounds else {
        return vec![];
    };

    let values = grid.densities();
    let (data_min, data_max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    tracing::debug!(
        nx = grid.nx,
        ny = grid.ny,
        data_min = data_min,
        data_max = data_max,
        threshold = threshold,
        "extract_contours input"
    );

    let contours = march_squares(
        &values,
        grid.nx,
        grid.ny,
        bounds.min_x,
        bounds.min_y,
        grid.grid_size,
        threshold,
    );

    tracing::debug!(
        num_contours = contours.len(),
        total_segments = contours.iter().map(|c| c.segments.len()).sum::<usize>(),
        "Extracted contours"
    );

    contours
}

/// Contours extracted at one threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelContours {
    pub level: f64,
    pub contours: Vec<Contour>,
}

/// Extract one contour set per level.
pub fn extract_contour_levels(grid: &DensityGrid, levels: &[f64]) -> Vec<LevelContours> {
    levels
        .iter()
        .map(|&level| LevelContours {
            level,
            contours: extract_contours(grid, level),
        })
        .collect()
}

/// Upper bound on the number of levels [`generate_threshold_levels`] returns.
pub const MAX_THRESHOLD_LEVELS: usize = 10_000;

/// Evenly spaced thresholds: every multiple of `interval` in `[min, max]`.
///
/// Empty when the range holds more than [`MAX_THRESHOLD_LEVELS`] levels.
pub fn generate_threshold_levels(min_value: f64, max_value: f64, interval: f64) -> Vec<f64> {
    if !(interval > 0.0) || !(max_value >= min_value) {
        return vec![];
    }

    let first = (min_value / interval).ceil();
    let last = (max_value / interval).floor();
    let span = last - first;
    if !span.is_finite() || span < 0.0 {
        return vec![];
    }
    if span >= MAX_THRESHOLD_LEVELS as f64 {
        tracing::warn!(
            min = min_value,
            max = max_value,
            interval = interval,
            limit = MAX_THRESHOLD_LEVELS,
            "Too many threshold levels requested"
        );
        return vec![];
    }

    (0..=(span as usize))
        .map(|k| (first + k as f64) * interval)
        .collect()
}

/// Threshold at `fraction` of the grid's peak density.
pub fn threshold_at_fraction(grid: &DensityGrid, fraction: f64) -> Option<f64> {
    grid.peak().map(|(_, _, cell)| cell.density * fraction)
}
