//! Spherical binning: shortest of the per-direction longest rays.
//!
//! Bin layout
//! - θ (polar) over `[0, π]`, φ (azimuth) over `[0, 2π)`, regular edges.
//! - Intervals are left-closed/right-open; the last bin on each axis also takes
//!   its upper edge (θ = π lands in the last θ bin).
//! - Points with `r < NEAR_ZERO` have no direction and are skipped.

use std::f64::consts::{PI, TAU};

use nalgebra::{DMatrix, Vector3};

use super::RadiusError;

/// Radius below which a point is treated as the origin.
pub const NEAR_ZERO: f64 = 1e-12;

/// `(r, θ, φ)` with θ ∈ [0, π] and φ ∈ [0, 2π). Angles are 0 for near-zero `r`.
pub fn to_spherical(p: Vector3<f64>) -> (f64, f64, f64) {
    let r = p.norm();
    if r < NEAR_ZERO {
        return (r, 0.0, 0.0);
    }
    let theta = (p.z / r).clamp(-1.0, 1.0).acos();
    let mut phi = p.y.atan2(p.x);
    if phi < 0.0 {
        phi += TAU;
    }
    (r, theta, phi)
}

/// Bin index of `value` on `bins` regular intervals over `[0, upper]`.
///
/// Edges are `k * (upper / bins)`. A value equal to an interior edge lands in
/// the bin that edge opens.
#[inline]
pub(super) fn bin_of(value: f64, upper: f64, bins: usize) -> usize {
    let step = upper / bins as f64;
    let edge = |k: usize| step * k as f64;
    // Saturating cast maps tiny negatives to 0; the clamp folds the upper edge in.
    let mut k = ((value / step).floor() as usize).min(bins - 1);
    // The division can be off by one ulp at an edge; settle against the edges.
    if k > 0 && value < edge(k) {
        k -= 1;
    } else if k + 1 < bins && value >= edge(k + 1) {
        k += 1;
    }
    k
}

/// Longest ray per (θ, φ) bin; `-inf` marks a bin no point reached.
#[derive(Clone, Debug, PartialEq)]
pub struct SphericalBins {
    cells: DMatrix<f64>,
}

impl SphericalBins {
    pub fn accumulate(
        points: &[Vector3<f64>],
        theta_bins: usize,
        phi_bins: usize,
    ) -> Result<Self, RadiusError> {
        let invalid = RadiusError::InvalidBins {
            theta_bins,
            phi_bins,
        };
        if theta_bins == 0 || phi_bins == 0 {
            return Err(invalid);
        }
        let len = theta_bins.checked_mul(phi_bins).ok_or_else(|| invalid.clone())?;
        let mut data: Vec<f64> = Vec::new();
        data.try_reserve_exact(len).map_err(|_| invalid)?;
        data.resize(len, f64::NEG_INFINITY);
        let mut cells = DMatrix::from_vec(theta_bins, phi_bins, data);
        for &p in points {
            let (r, theta, phi) = to_spherical(p);
            if r < NEAR_ZERO {
                continue;
            }
            let i = bin_of(theta, PI, theta_bins);
            let j = bin_of(phi, TAU, phi_bins);
            let cell = &mut cells[(i, j)];
            if r > *cell {
                *cell = r;
            }
        }
        Ok(Self { cells })
    }

    pub fn theta_bins(&self) -> usize {
        self.cells.nrows()
    }

    pub fn phi_bins(&self) -> usize {
        self.cells.ncols()
    }

    /// Longest ray in bin `(i, j)`, `None` when the bin is empty.
    pub fn longest_ray(&self, i: usize, j: usize) -> Option<f64> {
        let r = self.cells[(i, j)];
        (r != f64::NEG_INFINITY).then_some(r)
    }

    pub fn populated(&self) -> usize {
        self.cells.iter().filter(|&&r| r != f64::NEG_INFINITY).count()
    }

    /// Fraction of bins that received at least one point.
    pub fn coverage(&self) -> f64 {
        self.populated() as f64 / self.cells.len() as f64
    }

    /// Shortest longest-ray over populated bins. Empty bins are skipped.
    pub fn min_longest_ray(&self) -> Result<f64, RadiusError> {
        self.cells
            .iter()
            .copied()
            .filter(|&r| r != f64::NEG_INFINITY)
            .min_by(f64::total_cmp)
            .ok_or(RadiusError::NoPopulatedBins {
                theta_bins: self.theta_bins(),
                phi_bins: self.phi_bins(),
            })
    }
}

pub fn binned_radius(
    points: &[Vector3<f64>],
    theta_bins: usize,
    phi_bins: usize,
) -> Result<f64, RadiusError> {
    if points.is_empty() {
        return Err(RadiusError::EmptyCloud);
    }
    let bins = SphericalBins::accumulate(points, theta_bins, phi_bins)?;
    let populated = bins.populated();
    let total = bins.cells.len();
    if populated > 0 && populated < total {
        // Unsampled directions drop out of the minimum.
        tracing::warn!(
            populated,
            total,
            coverage = bins.coverage(),
            "spherical bins left directions unsampled"
        );
    }
    bins.min_longest_ray()
}
