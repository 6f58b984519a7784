//! Inscribed-radius estimation: reduce a point cloud to one "safe sphere" radius.
//!
//! Both methods aim at a lower bound on the distance from the origin to the
//! envelope boundary in every direction.
//!
//! - `HullVertices`: nearest convex-hull vertex. Assumes the origin is inside
//!   the hull; loose for markedly non-spherical envelopes.
//! - `SphericalBins`: bin directions on a (θ, φ) grid, keep the longest ray per
//!   bin, return the shortest of those. Shape-aware, but resolution dependent;
//!   bins that receive no point drop their direction from the minimum.
//!
//! Failure is never reported as a zero or NaN radius.

mod bins;
mod hull;

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;
use thiserror::Error;

use crate::config::BinCfg;

pub use bins::{binned_radius, to_spherical, SphericalBins, NEAR_ZERO};
pub use hull::hull_vertex_radius;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RadiusError {
    #[error("point cloud is empty")]
    EmptyCloud,
    #[error("convex hull failed: {reason}")]
    DegenerateHull { reason: String },
    #[error("unusable bin grid {theta_bins}x{phi_bins}: counts must be >= 1 and the grid must fit in memory")]
    InvalidBins { theta_bins: usize, phi_bins: usize },
    #[error("no populated bin in a {theta_bins}x{phi_bins} spherical grid")]
    NoPopulatedBins { theta_bins: usize, phi_bins: usize },
}

/// Estimator variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadiusMethod {
    HullVertices,
    SphericalBins { theta_bins: usize, phi_bins: usize },
}

impl RadiusMethod {
    pub fn binned(bins: BinCfg) -> Self {
        Self::SphericalBins {
            theta_bins: bins.theta,
            phi_bins: bins.phi,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::HullVertices => "hull",
            Self::SphericalBins { .. } => "bins",
        }
    }
}

impl fmt::Display for RadiusMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HullVertices => f.write_str("hull"),
            Self::SphericalBins {
                theta_bins,
                phi_bins,
            } => write!(f, "bins({theta_bins}x{phi_bins})"),
        }
    }
}

/// Parses `hull` or `bins`; `bins` uses the default grid.
impl FromStr for RadiusMethod {
    type Err = crate::config::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hull" => Ok(Self::HullVertices),
            "bins" => Ok(Self::binned(BinCfg::default())),
            other => Err(crate::config::ConfigError::UnknownTag {
                field: "radius method",
                value: other.to_string(),
            }),
        }
    }
}

pub fn inscribed_radius(points: &[Vector3<f64>], method: RadiusMethod) -> Result<f64, RadiusError> {
    match method {
        RadiusMethod::HullVertices => hull_vertex_radius(points),
        RadiusMethod::SphericalBins {
            theta_bins,
            phi_bins,
        } => binned_radius(points, theta_bins, phi_bins),
    }
}
