//! Angular-momentum envelopes of CMG and reaction-wheel clusters.
//!
//! Pipeline
//! - `config::EnvelopeCfg` (caller-built settings) →
//!   `grid` (angle/magnitude grids, `SweepMode`) →
//!   `envelope` (row-major sweep through `geometry::Mount`) →
//!   `radius` (inscribed "safe sphere" estimate).
//! - The point cloud, surface grids, per-axis extents and the radius are the
//!   outputs. Rendering lives outside this crate.
//!
//! Features
//! - `parallel`: `envelope::generate_par` (rayon), bit-identical to the serial sweep.

pub mod api;
pub mod config;
pub mod envelope;
pub mod geometry;
pub mod grid;
pub mod radius;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use nalgebra::Vector3 as Vec3;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::config::{BinCfg, ClusterCombination, ClusterStyle, EnvelopeCfg, SpeedType};
    pub use crate::envelope::{generate, generate_with_progress, plan, Envelope, Extents};
    pub use crate::radius::{inscribed_radius, RadiusMethod};
    pub use nalgebra::Vector3 as Vec3;
}

/// Sweep `cfg` and reduce the cloud with `method` in one call.
pub fn run(
    cfg: &config::EnvelopeCfg,
    method: radius::RadiusMethod,
) -> Result<(envelope::Envelope, f64), RunError> {
    let env = envelope::generate(cfg)?;
    let r = radius::inscribed_radius(&env.points, method)?;
    Ok((env, r))
}

/// Either stage of `run` failed.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Sweep(#[from] envelope::SweepError),
    #[error(transparent)]
    Radius(#[from] radius::RadiusError),
}
