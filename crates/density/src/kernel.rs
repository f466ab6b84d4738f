//! Isotropic 2-D Gaussian kernel.
//!
//! `K(dx, dy, b) = 1 / (2πb²) · exp(−(dx² + dy²) / (2b²))`
//!
//! The kernel integrates to 1 over the plane, so a field built from
//! samples of weight `w` integrates to `Σw`.

use std::f64::consts::PI;

/// Peak value of the kernel (at zero distance) for bandwidth `b`.
#[inline]
pub fn kernel_peak(bandwidth: f64) -> f64 {
    1.0 / (2.0 * PI * bandwidth * bandwidth)
}

/// Evaluate the kernel for an offset `(dx, dy)`.
#[inline]
pub fn gaussian_kernel(dx: f64, dy: f64, bandwidth: f64) -> f64 {
    let two_b2 = 2.0 * bandwidth * bandwidth;
    kernel_peak(bandwidth) * (-(dx * dx + dy * dy) / two_b2).exp()
}

/// Upper bound on the absolute per-cell error introduced by skipping
/// every sample further than `sigmas · bandwidth` from a cell.
///
/// Each skipped sample contributes at most `|w| · peak · exp(−k²/2)`.
pub fn truncation_bound(total_abs_weight: f64, bandwidth: f64, sigmas: f64) -> f64 {
    total_abs_weight * kernel_peak(bandwidth) * (-0.5 * sigmas * sigmas).exp()
}
