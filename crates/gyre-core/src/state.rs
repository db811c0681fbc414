//! Owned simulation state advanced by the integrator.

use ndarray::Array2;
use num_complex::Complex64;

/// The spectral vorticity field, the simulation clock, and the current
/// step size.
///
/// `scratch` is the single low-storage Runge–Kutta stage buffer; its
/// contents are reused across the four stages of one step and carry no
/// meaning between steps.
#[derive(Debug, Clone)]
pub struct FieldState {
    /// Spectral-space vorticity, shape `(nx, ny)`.
    pub omega_hat: Array2<Complex64>,
    /// Stage buffer, same shape as `omega_hat`.
    pub scratch: Array2<Complex64>,
    /// Simulation time, starts at zero.
    pub t: f64,
    /// Step size accepted by the last step; zero before the first step.
    pub dt: f64,
}

impl FieldState {
    pub fn new(nx: usize, ny: usize) -> Self {
        Self {
            omega_hat: Array2::zeros((nx, ny)),
            scratch: Array2::zeros((nx, ny)),
            t: 0.0,
            dt: 0.0,
        }
    }
}
