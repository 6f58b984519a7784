//! Nearest convex-hull vertex.

use chull::ConvexHullWrapper;
use nalgebra::{Matrix3, SymmetricEigen, Vector3};

use super::RadiusError;

/// Relative eigenvalue floor below which the cloud counts as flat.
const FLAT_RATIO: f64 = 1e-12;

/// Minimum origin distance over the vertices of the 3D convex hull.
///
/// Coplanar, collinear and single-point clouds are rejected before the hull is
/// built, so a degenerate input never yields a silent radius.
pub fn hull_vertex_radius(points: &[Vector3<f64>]) -> Result<f64, RadiusError> {
    if points.is_empty() {
        return Err(RadiusError::EmptyCloud);
    }
    check_full_rank(points)?;

    let rows: Vec<Vec<f64>> = points.iter().map(|p| vec![p.x, p.y, p.z]).collect();
    let hull = ConvexHullWrapper::try_new(&rows, None).map_err(|err| {
        RadiusError::DegenerateHull {
            reason: format!("{err:?}"),
        }
    })?;
    let (vertices, _indices) = hull.vertices_indices();
    tracing::debug!(
        points = points.len(),
        hull_vertices = vertices.len(),
        "convex hull"
    );

    vertices
        .iter()
        .map(|v| Vector3::new(v[0], v[1], v[2]).norm())
        .min_by(f64::total_cmp)
        .ok_or_else(|| RadiusError::DegenerateHull {
            reason: "hull has no vertices".into(),
        })
}

/// The cloud must span R³: smallest covariance eigenvalue well above zero.
fn check_full_rank(points: &[Vector3<f64>]) -> Result<(), RadiusError> {
    let n = points.len() as f64;
    let centroid = points.iter().fold(Vector3::zeros(), |acc, p| acc + p) / n;
    let cov = points.iter().fold(Matrix3::zeros(), |acc, p| {
        let d = p - centroid;
        acc + d * d.transpose()
    }) / n;
    let eig = SymmetricEigen::new(cov).eigenvalues;
    let max = eig.max();
    let min = eig.min();
    if max.is_nan() || max <= 0.0 || min <= FLAT_RATIO * max {
        return Err(RadiusError::DegenerateHull {
            reason: format!(
                "point cloud does not span 3D (covariance eigenvalues {min:.3e}..{max:.3e})"
            ),
        });
    }
    Ok(())
}
