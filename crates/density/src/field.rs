//! Kernel density grids.
//!
//! A [`DensityGrid`] is a regular lattice over a bounding box. Rows run
//! along longitude (`i`) and columns along latitude (`j`); cell `(i, j)`
//! sits at `(min_lng + i·grid_size, min_lat + j·grid_size)` and is stored
//! at `cells[i * ny + j]`.
//!
//! Both axes are scanned inclusively: a coordinate is part of the grid as
//! long as it does not exceed the max bound, so the last row/column lands
//! on `max` whenever the extent is a multiple of `grid_size`.

use kde_common::{BoundingBox, KdeConfig, KdeError, KdeResult, WeightedPoint};
use serde::{Deserialize, Serialize};

use crate::kernel::gaussian_kernel;

/// Slack applied when counting steps so an extent that is an exact
/// multiple of the spacing keeps its final row despite rounding.
const STEP_EPSILON: f64 = 1e-9;

/// Largest grid the builder will allocate.
pub const MAX_GRID_CELLS: usize = 1 << 26;

/// One evaluated grid node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub lng: f64,
    pub lat: f64,
    pub density: f64,
}

/// A regular grid of density values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityGrid {
    /// Region the grid was scanned over. `None` for an empty grid.
    pub bounds: Option<BoundingBox>,
    /// Spacing between adjacent cells on both axes.
    pub grid_size: f64,
    /// Number of rows (longitude steps).
    pub nx: usize,
    /// Number of columns (latitude steps).
    pub ny: usize,
    /// Cells in row-major order, `cells[i * ny + j]`.
    pub cells: Vec<GridCell>,
}

impl DensityGrid {
    /// A grid with no cells.
    pub fn empty(grid_size: f64) -> Self {
        Self {
            bounds: None,
            grid_size,
            nx: 0,
            ny: 0,
            cells: Vec::new(),
        }
    }

    /// Wrap precomputed densities laid out as `values[i * ny + j]`.
    pub fn from_values(
        min_lng: f64,
        min_lat: f64,
        grid_size: f64,
        nx: usize,
        ny: usize,
        values: &[f64],
    ) -> KdeResult<Self> {
        if values.len() != nx * ny {
            return Err(KdeError::invalid_parameter(
                "values",
                format!("expected {} values for a {}x{} grid, got {}", nx * ny, nx, ny, values.len()),
            ));
        }
        if nx == 0 || ny == 0 {
            return Ok(Self::empty(grid_size));
        }

        let cells = (0..nx)
            .flat_map(|i| {
                (0..ny).map(move |j| GridCell {
                    lng: min_lng + i as f64 * grid_size,
                    lat: min_lat + j as f64 * grid_size,
                    density: values[i * ny + j],
                })
            })
            .collect();

        Ok(Self {
            bounds: Some(BoundingBox::new(
                min_lng,
                min_lat,
                min_lng + (nx - 1) as f64 * grid_size,
                min_lat + (ny - 1) as f64 * grid_size,
            )),
            grid_size,
            nx,
            ny,
            cells,
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, i: usize, j: usize) -> Option<&GridCell> {
        if i >= self.nx || j >= self.ny {
            return None;
        }
        self.cells.get(i * self.ny + j)
    }

    pub fn value(&self, i: usize, j: usize) -> Option<f64> {
        self.cell(i, j).map(|c| c.density)
    }

    /// Densities in storage order.
    pub fn densities(&self) -> Vec<f64> {
        self.cells.iter().map(|c| c.density).collect()
    }

    /// Indices and cell of the highest density; the first one on ties.
    pub fn peak(&self) -> Option<(usize, usize, GridCell)> {
        let mut best: Option<(usize, GridCell)> = None;
        for (idx, cell) in self.cells.iter().enumerate() {
            match best {
                Some((_, b)) if b.density >= cell.density => {}
                _ => best = Some((idx, *cell)),
            }
        }
        best.map(|(idx, cell)| (idx / self.ny, idx % self.ny, cell))
    }

    /// Grid indices of the node closest to `(lng, lat)`, clamped to the grid.
    pub fn nearest_index(&self, lng: f64, lat: f64) -> Option<(usize, usize)> {
        let bounds = self.bounds?;
        if !lng.is_finite() || !lat.is_finite() {
            return None;
        }
        let i = ((lng - bounds.min_x) / self.grid_size).round();
        let j = ((lat - bounds.min_y) / self.grid_size).round();
        let i = i.clamp(0.0, (self.nx - 1) as f64) as usize;
        let j = j.clamp(0.0, (self.ny - 1) as f64) as usize;
        Some((i, j))
    }
}

/// Builds [`DensityGrid`]s from weighted points.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBuilder {
    grid_size: f64,
    bandwidth: f64,
    cutoff_sigmas: Option<f64>,
    strict_bounds: bool,
    bounds: Option<BoundingBox>,
}

impl FieldBuilder {
    pub fn new(grid_size: f64, bandwidth: f64) -> Self {
        Self {
            grid_size,
            bandwidth,
            cutoff_sigmas: None,
            strict_bounds: false,
            bounds: None,
        }
    }

    pub fn from_config(config: &KdeConfig) -> Self {
        Self {
            grid_size: config.grid_size,
            bandwidth: config.bandwidth,
            cutoff_sigmas: config.cutoff_sigmas,
            strict_bounds: config.strict_bounds,
            bounds: None,
        }
    }

    /// Scan this region instead of the sample bounding box.
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Ignore samples further than `sigmas` bandwidths from a cell.
    ///
    /// See [`crate::kernel::truncation_bound`] for the resulting error.
    pub fn with_cutoff_sigmas(mut self, sigmas: f64) -> Self {
        self.cutoff_sigmas = Some(sigmas);
        self
    }

    pub fn with_strict_bounds(mut self, strict: bool) -> Self {
        self.strict_bounds = strict;
        self
    }

    /// Evaluate the density field for `points`.
    pub fn build(&self, points: &[WeightedPoint]) -> KdeResult<DensityGrid> {
        self.validate()?;

        let points = self.usable_points(points)?;
        if points.is_empty() {
            return Ok(DensityGrid::empty(self.grid_size));
        }

        let bounds = match self.bounds {
            Some(bounds) => bounds,
            None => match BoundingBox::from_points(points.iter().map(|p| (p.lng, p.lat))) {
                Some(bounds) => bounds,
                None => return Ok(DensityGrid::empty(self.grid_size)),
            },
        };

        if !bounds.is_finite() {
            return Err(KdeError::invalid_parameter(
                "bounds",
                format!("must be finite, got {:?}", bounds),
            ));
        }
        if self.strict_bounds && bounds.is_degenerate() {
            return Err(KdeError::DegenerateBounds(format!(
                "[{}, {}, {}, {}]",
                bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
            )));
        }

        let too_large = || {
            KdeError::invalid_parameter(
                "grid_size",
                format!(
                    "grid size {} over bounds [{}, {}, {}, {}] exceeds the {} cell limit",
                    self.grid_size,
                    bounds.min_x,
                    bounds.min_y,
                    bounds.max_x,
                    bounds.max_y,
                    MAX_GRID_CELLS
                ),
            )
        };
        let nx = axis_steps(bounds.min_x, bounds.max_x, self.grid_size).ok_or_else(too_large)?;
        let ny = axis_steps(bounds.min_y, bounds.max_y, self.grid_size).ok_or_else(too_large)?;
        if nx == 0 || ny == 0 {
            return Ok(DensityGrid::empty(self.grid_size));
        }

        match nx.checked_mul(ny) {
            Some(total) if total <= MAX_GRID_CELLS => {}
            _ => return Err(too_large()),
        }

        let cells = self.evaluate(&points, &bounds, nx, ny);

        tracing::debug!(
            samples = points.len(),
            nx = nx,
            ny = ny,
            grid_size = self.grid_size,
            bandwidth = self.bandwidth,
            cutoff_sigmas = self.cutoff_sigmas.unwrap_or(0.0),
            "Built density grid"
        );

        Ok(DensityGrid {
            bounds: Some(bounds),
            grid_size: self.grid_size,
            nx,
            ny,
            cells,
        })
    }

    fn validate(&self) -> KdeResult<()> {
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return Err(KdeError::invalid_parameter(
                "grid_size",
                format!("must be finite and > 0, got {}", self.grid_size),
            ));
        }
        if !(self.bandwidth.is_finite() && self.bandwidth > 0.0) {
            return Err(KdeError::invalid_parameter(
                "bandwidth",
                format!("must be finite and > 0, got {}", self.bandwidth),
            ));
        }
        if let Some(sigmas) = self.cutoff_sigmas {
            if !(sigmas.is_finite() && sigmas > 0.0) {
                return Err(KdeError::invalid_parameter(
                    "cutoff_sigmas",
                    format!("must be finite and > 0, got {}", sigmas),
                ));
            }
        }
        Ok(())
    }

    /// Lenient mode drops non-finite points; strict mode rejects them.
    fn usable_points(&self, points: &[WeightedPoint]) -> KdeResult<Vec<WeightedPoint>> {
        if self.strict_bounds {
            for p in points {
                if !p.lng.is_finite() || !p.lat.is_finite() {
                    return Err(KdeError::NonFiniteCoordinate { x: p.lng, y: p.lat });
                }
                if !p.weight.is_finite() {
                    return Err(KdeError::invalid_parameter(
                        "weight",
                        format!("non-finite weight at ({}, {})", p.lng, p.lat),
                    ));
                }
            }
            return Ok(points.to_vec());
        }

        let usable: Vec<WeightedPoint> = points.iter().copied().filter(|p| p.is_finite()).collect();
        if usable.len() != points.len() {
            tracing::warn!(
                dropped = points.len() - usable.len(),
                total = points.len(),
                "Dropped non-finite samples from density field"
            );
        }
        Ok(usable)
    }

    fn evaluate(
        &self,
        points: &[WeightedPoint],
        bounds: &BoundingBox,
        nx: usize,
        ny: usize,
    ) -> Vec<GridCell> {
        let row = |i: usize| -> Vec<GridCell> {
            let lng = bounds.min_x + i as f64 * self.grid_size;
            (0..ny)
                .map(|j| {
                    let lat = bounds.min_y + j as f64 * self.grid_size;
                    GridCell {
                        lng,
                        lat,
                        density: self.density_at(points, lng, lat),
                    }
                })
                .collect()
        };

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<GridCell>> = {
            use rayon::prelude::*;
            (0..nx).into_par_iter().map(row).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<GridCell>> = (0..nx).map(row).collect();

        rows.into_iter().flatten().collect()
    }

    fn density_at(&self, points: &[WeightedPoint], lng: f64, lat: f64) -> f64 {
        match self.cutoff_sigmas {
            None => points
                .iter()
                .map(|p| p.weight * gaussian_kernel(p.lng - lng, p.lat - lat, self.bandwidth))
                .sum(),
            Some(sigmas) => {
                let reach = sigmas * self.bandwidth;
                let reach2 = reach * reach;
                points
                    .iter()
                    .filter_map(|p| {
                        let dx = p.lng - lng;
                        let dy = p.lat - lat;
                        (dx * dx + dy * dy <= reach2)
                            .then(|| p.weight * gaussian_kernel(dx, dy, self.bandwidth))
                    })
                    .sum()
            }
        }
    }
}

/// Build a density field over the sample bounding box without pruning.
pub fn build_density_field(
    points: &[WeightedPoint],
    grid_size: f64,
    bandwidth: f64,
) -> KdeResult<DensityGrid> {
    FieldBuilder::new(grid_size, bandwidth).build(points)
}

/// Number of inclusive steps from `min` to `max`.
///
/// `None` when a single axis would already exceed [`MAX_GRID_CELLS`].
fn axis_steps(min: f64, max: f64, step: f64) -> Option<usize> {
    if max < min {
        return Some(0);
    }
    let steps = ((max - min) / step + STEP_EPSILON).floor() + 1.0;
    if !steps.is_finite() || steps > MAX_GRID_CELLS as f64 {
        return None;
    }
    Some(steps as usize)
}
