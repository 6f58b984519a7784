//! Curated surface for bindings and the CLI.
//!
//! Prefer these re-exports over reaching into submodules from outside the crate.

// Settings and tags
pub use crate::config::{
    BinCfg, ClusterCombination, ClusterStyle, ConfigError, EnvelopeCfg, SpeedType,
};
// Geometry transform
pub use crate::geometry::{orthogonal, DeviceState, Mount, Slot};
// Enumeration and sweep
pub use crate::envelope::{
    generate, generate_with_progress, plan, Axis, Envelope, Extents, SurfaceGrid, SweepError,
    SweepProgress,
};
#[cfg(feature = "parallel")]
pub use crate::envelope::generate_par;
pub use crate::grid::{angle_grid, linspace, SweepGrid, SweepMode, SweepPlan};
// Radius estimation
pub use crate::radius::{
    binned_radius, hull_vertex_radius, inscribed_radius, to_spherical, RadiusError, RadiusMethod,
    SphericalBins,
};
pub use crate::{run, RunError};

use nalgebra::Vector3;

/// Flatten a cloud into `(x, y, z)` tuples for callers without nalgebra.
pub fn to_tuples(points: &[Vector3<f64>]) -> Vec<(f64, f64, f64)> {
    points.iter().map(|p| (p.x, p.y, p.z)).collect()
}

/// Inverse of `to_tuples`.
pub fn from_tuples(points: &[(f64, f64, f64)]) -> Vec<Vector3<f64>> {
    points.iter().map(|&(x, y, z)| Vector3::new(x, y, z)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuples_keep_order() {
        let pts = vec![Vector3::new(1.0, 2.0, 3.0), Vector3::new(-1.0, 0.0, 0.5)];
        let t = to_tuples(&pts);
        assert_eq!(t, vec![(1.0, 2.0, 3.0), (-1.0, 0.0, 0.5)]);
        assert_eq!(from_tuples(&t), pts);
    }
}
