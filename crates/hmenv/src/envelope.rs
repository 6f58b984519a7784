//! Envelope generator: exhaustive row-major sweep over the parameter grid.
//!
//! Purpose
//! - Map every combination of the resolved sweep axes through the geometry
//!   transform and collect the momentum vectors in a preallocated flat buffer.
//! - Reshape gimbal sweeps into a square surface grid for rendering.
//!
//! Why this design
//! - The envelope boundary of composed gimbal rotations has no closed form, so
//!   dense sampling is the method; resolution trades accuracy for runtime.
//! - The buffer is split into blocks, one per value of the outermost axis. A
//!   block is filled by an odometer over the inner axes, so serial and parallel
//!   sweeps write identical bytes at identical indices.
//! - Size is planned (checked arithmetic, optional budget) before allocation.
//!
//! Invariants
//! - `points.len()` equals the product of the axis lengths.
//! - Order is row-major over the axes returned by `SweepMode::axes`; no
//!   reordering, no dedup.

use nalgebra::{DMatrix, Vector3};
use serde::Serialize;
use thiserror::Error;

use crate::config::{ClusterStyle, ConfigError, EnvelopeCfg};
use crate::geometry::{orthogonal, DeviceState, Mount};
use crate::grid::{square_side, SweepGrid, SweepMode, SweepPlan, MAX_AXES};

/// Gimbal angle at which the quad reaction-wheel cluster is frozen.
const RW_GIMBAL_DEG: f64 = 90.0;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("sweep of {required} points exceeds the budget of {limit}")]
    BudgetExceeded { required: usize, limit: usize },
    #[error("sweep size overflows usize")]
    SizeOverflow,
    #[error("cannot allocate {bytes} bytes for the point buffer")]
    Alloc { bytes: usize },
    #[error("cannot reshape {len} points into a square grid")]
    ShapeMismatch { len: usize },
}

/// Emitted after each outermost-axis step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepProgress {
    pub done: usize,
    pub total: usize,
}

/// Coordinate axis selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Largest coordinate reached along each body axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Extents {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Per-axis surface grids, `x[(i, j)] = points[j * side + i].x`.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceGrid {
    pub side: usize,
    pub x: DMatrix<f64>,
    pub y: DMatrix<f64>,
    pub z: DMatrix<f64>,
}

impl SurfaceGrid {
    /// Transpose of the row-major `side × side` reshape. Fails on a non-square count.
    pub fn from_points(points: &[Vector3<f64>]) -> Result<Self, SweepError> {
        let len = points.len();
        let side = square_side(len).ok_or(SweepError::ShapeMismatch { len })?;
        // Column-major storage of the transpose is exactly the flat order.
        let channel = |k: usize| {
            let data: Vec<f64> = points.iter().map(|p| p[k]).collect();
            DMatrix::from_column_slice(side, side, &data)
        };
        Ok(Self {
            side,
            x: channel(0),
            y: channel(1),
            z: channel(2),
        })
    }
}

/// Result of one sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub mode: SweepMode,
    pub points: Vec<Vector3<f64>>,
    pub surface: Option<SurfaceGrid>,
}

impl Envelope {
    /// Per-axis maxima. Components are `-inf` for an empty cloud.
    pub fn extents(&self) -> Extents {
        let mut ext = Extents {
            x: f64::NEG_INFINITY,
            y: f64::NEG_INFINITY,
            z: f64::NEG_INFINITY,
        };
        for p in &self.points {
            ext.x = ext.x.max(p.x);
            ext.y = ext.y.max(p.y);
            ext.z = ext.z.max(p.z);
        }
        ext
    }

    /// Points strictly on the positive side of `axis` (cut-away half).
    pub fn sliced(&self, axis: Axis) -> Vec<Vector3<f64>> {
        let k = axis.index();
        self.points.iter().copied().filter(|p| p[k] > 0.0).collect()
    }
}

/// Validate, resolve the mode and size the run without allocating.
pub fn plan(cfg: &EnvelopeCfg) -> Result<SweepPlan, SweepError> {
    prepare(cfg).map(|(plan, _)| plan)
}

/// `plan` plus the grids the sweep reads from.
fn prepare(cfg: &EnvelopeCfg) -> Result<(SweepPlan, SweepGrid), SweepError> {
    let grid = SweepGrid::from_cfg(cfg)?;
    let mode = SweepMode::of(cfg);
    let plan = SweepPlan::new(mode, &grid).ok_or(SweepError::SizeOverflow)?;
    if let Some(limit) = cfg.max_points {
        if plan.point_count > limit {
            return Err(SweepError::BudgetExceeded {
                required: plan.point_count,
                limit,
            });
        }
    }
    Ok((plan, grid))
}

pub fn generate(cfg: &EnvelopeCfg) -> Result<Envelope, SweepError> {
    generate_with_progress(cfg, |_| {})
}

/// Serial sweep; `progress` is called once per outermost-axis value.
pub fn generate_with_progress<F>(cfg: &EnvelopeCfg, mut progress: F) -> Result<Envelope, SweepError>
where
    F: FnMut(SweepProgress),
{
    let (plan, grid) = prepare(cfg)?;
    let sweep = Sweep::new(cfg, &grid);
    let mut points = alloc_points(&plan)?;
    tracing::debug!(
        mode = plan.mode.label(),
        points = plan.point_count,
        "sweep start"
    );

    let total = sweep.outer_len();
    let block = sweep.block_len();
    for (outer, chunk) in points.chunks_mut(block).enumerate() {
        sweep.fill_block(outer, chunk);
        progress(SweepProgress {
            done: outer + 1,
            total,
        });
    }

    finish(plan, points)
}

/// Parallel sweep over disjoint outer-axis blocks; output equals `generate`.
#[cfg(feature = "parallel")]
pub fn generate_par(cfg: &EnvelopeCfg) -> Result<Envelope, SweepError> {
    use rayon::prelude::*;

    let (plan, grid) = prepare(cfg)?;
    let sweep = Sweep::new(cfg, &grid);
    let mut points = alloc_points(&plan)?;
    tracing::debug!(
        mode = plan.mode.label(),
        points = plan.point_count,
        "parallel sweep start"
    );

    let block = sweep.block_len();
    points
        .par_chunks_mut(block)
        .enumerate()
        .for_each(|(outer, chunk)| sweep.fill_block(outer, chunk));

    finish(plan, points)
}

fn alloc_points(plan: &SweepPlan) -> Result<Vec<Vector3<f64>>, SweepError> {
    let mut points: Vec<Vector3<f64>> = Vec::new();
    points
        .try_reserve_exact(plan.point_count)
        .map_err(|_| SweepError::Alloc {
            bytes: plan.buffer_bytes,
        })?;
    points.resize(plan.point_count, Vector3::zeros());
    Ok(points)
}

fn finish(plan: SweepPlan, points: Vec<Vector3<f64>>) -> Result<Envelope, SweepError> {
    debug_assert_eq!(points.len(), plan.point_count);
    let surface = if plan.mode.has_surface() {
        Some(SurfaceGrid::from_points(&points)?)
    } else {
        None
    };
    tracing::debug!(mode = plan.mode.label(), points = points.len(), "sweep done");
    Ok(Envelope {
        mode: plan.mode,
        points,
        surface,
    })
}

/// Read-only sweep description shared by all blocks.
struct Sweep<'g> {
    mode: SweepMode,
    mount: Mount,
    max_h: f64,
    axes: Vec<&'g [f64]>,
}

impl<'g> Sweep<'g> {
    fn new(cfg: &EnvelopeCfg, grid: &'g SweepGrid) -> Self {
        let mode = SweepMode::of(cfg);
        let style = match mode {
            SweepMode::QuadReactionWheel => {
                if cfg.style != ClusterStyle::Hanspeter {
                    tracing::debug!(configured = %cfg.style, "4RW forces the hans tilt");
                }
                ClusterStyle::Hanspeter
            }
            _ => cfg.style,
        };
        let axes = mode.axes(grid);
        debug_assert!(axes.len() >= 2 && axes.len() <= MAX_AXES);
        Self {
            mode,
            mount: Mount::new(style, cfg.skew_deg),
            max_h: cfg.max_h,
            axes,
        }
    }

    fn outer_len(&self) -> usize {
        self.axes[0].len()
    }

    fn block_len(&self) -> usize {
        self.axes[1..].iter().map(|a| a.len()).product()
    }

    /// Fill the block where the outermost axis sits at index `outer`.
    fn fill_block(&self, outer: usize, out: &mut [Vector3<f64>]) {
        let depth = self.axes.len();
        let mut digits = [0usize; MAX_AXES];
        let mut values = [0.0f64; MAX_AXES];
        values[0] = self.axes[0][outer];
        for d in 1..depth {
            values[d] = self.axes[d][0];
        }
        for slot in out.iter_mut() {
            *slot = self.compose(&values[..depth]);
            // Advance the inner odometer, innermost axis fastest.
            let mut d = depth;
            while d > 1 {
                d -= 1;
                digits[d] += 1;
                if digits[d] < self.axes[d].len() {
                    values[d] = self.axes[d][digits[d]];
                    break;
                }
                digits[d] = 0;
                values[d] = self.axes[d][0];
            }
        }
    }

    #[inline]
    fn compose(&self, v: &[f64]) -> Vector3<f64> {
        let h = self.max_h;
        let m = &self.mount;
        match self.mode {
            SweepMode::AdjacentConstant => {
                m.pair(DeviceState::new(v[0], h), DeviceState::new(v[1], h))
            }
            SweepMode::AdjacentVariable => {
                m.pair(DeviceState::new(v[0], v[1]), DeviceState::new(v[2], v[3]))
            }
            SweepMode::PyramidConstant => m.quad([
                DeviceState::new(v[0], h),
                DeviceState::new(v[1], h),
                DeviceState::new(v[2], h),
                DeviceState::new(v[3], h),
            ]),
            SweepMode::PyramidVariable => m.quad([
                DeviceState::new(v[0], v[1]),
                DeviceState::new(v[2], v[3]),
                DeviceState::new(v[4], v[5]),
                DeviceState::new(v[6], v[7]),
            ]),
            SweepMode::TriReactionWheel => orthogonal([v[0], v[1], v[2]]),
            SweepMode::QuadReactionWheel => m.quad([
                DeviceState::new(RW_GIMBAL_DEG, v[0]),
                DeviceState::new(RW_GIMBAL_DEG, v[1]),
                DeviceState::new(RW_GIMBAL_DEG, v[2]),
                DeviceState::new(RW_GIMBAL_DEG, v[3]),
            ]),
        }
    }
}
