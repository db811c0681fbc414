//! RHS-evaluator trait, operator bundle, and backend selection.
//!
//! The time integrator in `gyre-core` operates against the
//! [`RhsEvaluator`] trait so the evaluation engine can be swapped at
//! construction time without touching the integration scheme.

use ndarray::Array2;
use num_complex::Complex64;
use thiserror::Error;

/// Errors originating from RHS evaluation backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    /// The velocity field picked up a NaN or infinity: the explicit
    /// scheme has left its stability region and the run is lost.
    #[error("non-finite velocity encountered during RHS evaluation")]
    NonFiniteVelocity,

    #[error("spectral field has shape {got:?}, evaluator expects {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
}

/// Which RHS evaluation engine to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Everything in the calling thread.
    Serial,
    /// Rayon-parallel batched transforms and pointwise kernels.
    Parallel,
}

/// The pointwise spectral operators an evaluator is built from.
///
/// Every array here derives deterministically from
/// `(nx, ny, Lx, Ly, Re)`; the bundle is computed once by the grid and
/// never mutated afterwards. All arrays share the `(nx, ny)` shape.
#[derive(Debug, Clone)]
pub struct SpectralOperators {
    /// Reynolds number scaling the viscous term.
    pub re: f64,
    /// x-wavenumbers, already scaled by `2π/Lx`.
    pub kx: Array2<f64>,
    /// y-wavenumbers, already scaled by `2π/Ly`.
    pub ky: Array2<f64>,
    /// `−(kx² + ky²)`.
    pub laplacian: Array2<f64>,
    /// Laplacian with the zero mode pinned to `1` for the Poisson solve.
    pub poisson: Array2<f64>,
    /// 2/3-rule low-pass mask, `true` where a mode is kept.
    pub dealias: Array2<bool>,
}

impl SpectralOperators {
    pub fn dim(&self) -> (usize, usize) {
        self.kx.dim()
    }
}

/// Output of one RHS evaluation.
pub struct Rhs {
    /// Spectral right-hand side `laplacian·f̂/Re − dealias(conv̂)`.
    pub rhs_hat: Array2<Complex64>,
    /// Physical-space x-velocity.
    pub u: Array2<f64>,
    /// Physical-space y-velocity.
    pub v: Array2<f64>,
}

/// Abstraction over RHS evaluation engines.
///
/// Given a spectral vorticity field (the current field or an
/// intermediate Runge–Kutta stage value), an implementation solves the
/// streamfunction Poisson equation, recovers the velocity, forms the
/// dealiased convective term in physical space, and returns the full
/// right-hand side together with the velocity components.
///
/// The call is blocking and synchronous; implementations may
/// parallelise internally but must not alias or retain the caller's
/// buffers beyond the call.
pub trait RhsEvaluator: Send {
    /// Human-readable backend name.
    fn label(&self) -> &'static str;

    /// Evaluate the right-hand side at `f_hat`.
    fn evaluate(&mut self, f_hat: &Array2<Complex64>) -> Result<Rhs, ComputeError>;
}

/// Construct the evaluator for the requested backend.
pub fn build_evaluator(backend: Backend, ops: SpectralOperators) -> Box<dyn RhsEvaluator> {
    match backend {
        Backend::Serial => Box::new(crate::serial::SerialEvaluator::new(ops)),
        Backend::Parallel => Box::new(crate::parallel::ParallelEvaluator::new(ops)),
    }
}

/// Reject velocity fields containing NaN or infinity.
pub(crate) fn ensure_finite(u: &Array2<f64>, v: &Array2<f64>) -> Result<(), ComputeError> {
    if u.iter().chain(v.iter()).all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(ComputeError::NonFiniteVelocity)
    }
}
