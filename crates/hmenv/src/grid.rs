//! Configuration enumerator: discretized parameter grids and sweep modes.
//!
//! Purpose
//! - Turn resolution settings into the three 1D grids every sweep draws from
//!   (gimbal angles, unsigned rotor momenta, signed wheel momenta).
//! - Resolve `(combination, speed)` into one of six `SweepMode`s and describe the
//!   sweep axes in their fixed outer-to-inner order.
//!
//! Why this design
//! - A sweep is a row-major walk over a list of axes. Keeping the axis list
//!   explicit lets the generator and the planner share one source of truth for
//!   ordering and cardinality.
//! - Cardinality uses checked arithmetic so a caller can reject a run before
//!   anything is allocated.

use serde::Serialize;

use crate::config::{ClusterCombination, ConfigError, EnvelopeCfg, SpeedType};

/// Deepest sweep (pyramid, variable speed): 4 angles + 4 magnitudes.
pub const MAX_AXES: usize = 8;

/// `n` angles evenly spaced over `[0°, 360°)`; 360° itself is never emitted.
pub fn angle_grid(n: usize) -> Vec<f64> {
    (0..n).map(|i| 360.0 * i as f64 / n as f64).collect()
}

/// `n` values evenly spaced over `[lo, hi]`, both endpoints included.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| lo + step * i as f64).collect();
            out[n - 1] = hi;
            out
        }
    }
}

/// Discretized parameter grids for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepGrid {
    /// Gimbal angles in degrees.
    pub angles: Vec<f64>,
    /// Rotor momenta over `[0, max_h]`.
    pub magnitudes: Vec<f64>,
    /// Wheel momenta over `[-max_h, max_h]`, `2 * magnitude_segments` samples.
    pub signed: Vec<f64>,
}

impl SweepGrid {
    pub fn from_cfg(cfg: &EnvelopeCfg) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            angles: angle_grid(cfg.angle_segments),
            magnitudes: linspace(0.0, cfg.max_h, cfg.magnitude_segments),
            signed: linspace(-cfg.max_h, cfg.max_h, 2 * cfg.magnitude_segments),
        })
    }
}

/// Closed set of sweeps; one per supported `(combination, speed)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SweepMode {
    /// `[θ1, θ4]`, both rotors at `max_h`.
    AdjacentConstant,
    /// `[θ1, h1, θ4, h4]`.
    AdjacentVariable,
    /// `[θ1, θ2, θ3, θ4]`, all rotors at `max_h`.
    PyramidConstant,
    /// `[θ1, h1, θ2, h2, θ3, h3, θ4, h4]`.
    PyramidVariable,
    /// `[h1, h2, h3]` signed, on orthogonal axes.
    TriReactionWheel,
    /// `[h1, h2, h3, h4]` signed, gimbals frozen at 90°, Hanspeter tilt.
    QuadReactionWheel,
}

impl SweepMode {
    /// Reaction-wheel clusters ignore the speed tag.
    pub fn resolve(combination: ClusterCombination, speed: SpeedType) -> Self {
        match (combination, speed) {
            (ClusterCombination::AdjacentPair, SpeedType::Constant) => Self::AdjacentConstant,
            (ClusterCombination::AdjacentPair, SpeedType::Variable) => Self::AdjacentVariable,
            (ClusterCombination::Pyramid, SpeedType::Constant) => Self::PyramidConstant,
            (ClusterCombination::Pyramid, SpeedType::Variable) => Self::PyramidVariable,
            (ClusterCombination::TriReactionWheel, _) => Self::TriReactionWheel,
            (ClusterCombination::QuadReactionWheel, _) => Self::QuadReactionWheel,
        }
    }

    pub fn of(cfg: &EnvelopeCfg) -> Self {
        Self::resolve(cfg.combination, cfg.speed)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AdjacentConstant => "adj/CS",
            Self::AdjacentVariable => "adj/VS",
            Self::PyramidConstant => "pyr/CS",
            Self::PyramidVariable => "pyr/VS",
            Self::TriReactionWheel => "3RW",
            Self::QuadReactionWheel => "4RW",
        }
    }

    /// Sweep axes, outermost first.
    pub fn axes(self, grid: &SweepGrid) -> Vec<&[f64]> {
        let a = grid.angles.as_slice();
        let h = grid.magnitudes.as_slice();
        let s = grid.signed.as_slice();
        match self {
            Self::AdjacentConstant => vec![a, a],
            Self::AdjacentVariable => vec![a, h, a, h],
            Self::PyramidConstant => vec![a, a, a, a],
            Self::PyramidVariable => vec![a, h, a, h, a, h, a, h],
            Self::TriReactionWheel => vec![s, s, s],
            Self::QuadReactionWheel => vec![s, s, s, s],
        }
    }

    /// Product of the axis lengths; `None` on `usize` overflow.
    pub fn point_count(self, grid: &SweepGrid) -> Option<usize> {
        self.axes(grid)
            .iter()
            .try_fold(1usize, |acc, axis| acc.checked_mul(axis.len()))
    }

    /// Gimbal sweeps are reshaped into a square surface grid for rendering.
    pub const fn has_surface(self) -> bool {
        !matches!(self, Self::TriReactionWheel | Self::QuadReactionWheel)
    }
}

/// Size of a run, known before anything is allocated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SweepPlan {
    pub mode: SweepMode,
    pub axis_lens: Vec<usize>,
    pub point_count: usize,
    /// Bytes of the flat point buffer.
    pub buffer_bytes: usize,
    pub surface_side: Option<usize>,
}

impl SweepPlan {
    /// `None` when the point count or byte size overflows `usize`.
    pub fn new(mode: SweepMode, grid: &SweepGrid) -> Option<Self> {
        let axis_lens: Vec<usize> = mode.axes(grid).iter().map(|a| a.len()).collect();
        let point_count = mode.point_count(grid)?;
        let buffer_bytes =
            point_count.checked_mul(std::mem::size_of::<nalgebra::Vector3<f64>>())?;
        let surface_side = if mode.has_surface() {
            Some(square_side(point_count)?)
        } else {
            None
        };
        Some(Self {
            mode,
            axis_lens,
            point_count,
            buffer_bytes,
            surface_side,
        })
    }
}

/// Exact integer square root, if `n` is a perfect square.
pub fn square_side(n: usize) -> Option<usize> {
    let guess = (n as f64).sqrt().round() as usize;
    // Float sqrt may be off by one for very large `n`.
    [guess.saturating_sub(1), guess, guess + 1]
        .into_iter()
        .find(|&s| s.checked_mul(s) == Some(n))
}
