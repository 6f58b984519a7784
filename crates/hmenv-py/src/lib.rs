//! PyO3 bindings for the `hmenv` sweep and radius estimators.
//!
//! Notes
//! - Plotting stays in Python; these bindings hand back flat `(x, y, z)` tuples
//!   and let the caller reshape them with NumPy.
//! - Every core error surfaces as `ValueError` with the core message.

use hmenv::api::{from_tuples, to_tuples};
use hmenv::config::{BinCfg, EnvelopeCfg};
use hmenv::radius::RadiusMethod;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

type Point = (f64, f64, f64);

fn value_error(err: impl ToString) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Sweep the envelope described by a settings JSON string.
///
/// Returns `(points, (max_x, max_y, max_z))` with points in sweep order.
#[pyfunction]
fn simulate(settings_json: &str) -> PyResult<(Vec<Point>, Point)> {
    let cfg: EnvelopeCfg = serde_json::from_str(settings_json).map_err(value_error)?;
    let env = hmenv::envelope::generate(&cfg).map_err(value_error)?;
    let ext = env.extents();
    Ok((to_tuples(&env.points), (ext.x, ext.y, ext.z)))
}

/// Safe-sphere radius of a cloud; `method` is `"hull"` or `"bins"`.
#[pyfunction]
#[pyo3(signature = (points, method = "bins", theta_bins = 18, phi_bins = 36))]
fn inscribed_radius(
    points: Vec<Point>,
    method: &str,
    theta_bins: usize,
    phi_bins: usize,
) -> PyResult<f64> {
    let method = match method.parse::<RadiusMethod>().map_err(value_error)? {
        RadiusMethod::SphericalBins { .. } => RadiusMethod::binned(BinCfg {
            theta: theta_bins,
            phi: phi_bins,
        }),
        hull => hull,
    };
    hmenv::radius::inscribed_radius(&from_tuples(&points), method).map_err(value_error)
}

#[pymodule]
fn hmenv_native(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(simulate, m)?)?;
    m.add_function(wrap_pyfunction!(inscribed_radius, m)?)?;
    Ok(())
}
