//! Weighted point accumulation and Gaussian kernel density estimation.
//!
//! - [`accumulator`]: merges co-located samples and tracks value extrema
//! - [`field`]: evaluates a kernel density sum on a regular grid
//! - [`kernel`]: the 2-D Gaussian kernel and its truncation bound

pub mod accumulator;
pub mod field;
pub mod kernel;

pub use accumulator::{Accumulator, Extrema, ExtremaSignal, Snapshot};
pub use field::{build_density_field, DensityGrid, FieldBuilder, GridCell, MAX_GRID_CELLS};
pub use kernel::{gaussian_kernel, kernel_peak, truncation_bound};
