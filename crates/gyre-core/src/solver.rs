//! The public solver: construction, seeding, time stepping, and
//! derived-quantity accessors.
//!
//! One call to [`Solver::step`] advances the vorticity field by a
//! single four-stage low-storage Runge–Kutta step. The step size is
//! re-derived at the first stage of every step from the instantaneous
//! maximum flow speed, `dt = min(dtv, CFL·dl/vmax, ½)`, which is what
//! keeps the explicit scheme inside its stability region as the flow
//! evolves. All four stages complete before `step` returns, so a
//! partially advanced field is never observable.

use ndarray::{Array2, ArrayView2, Zip};
use num_complex::Complex64;
use thiserror::Error;

use gyre_compute::{build_evaluator, Backend, ComputeError, Fft2d, RhsEvaluator};

use crate::grid::SpectralGrid;
use crate::state::FieldState;
use crate::types::SolverParams;

/// Low-storage RK4 stage coefficients.
const RK_A: [f64; 4] = [0.0, 0.5, 0.5, 1.0];
const RK_B: [f64; 5] = [0.0, 1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0];

/// Hard ceiling on the adaptive step size.
const DT_CEILING: f64 = 0.5;

/// Relative mean-vorticity magnitude above which seeding warns before
/// projecting the mean mode out.
const MEAN_WARN_TOL: f64 = 1e-10;

/// Errors surfaced by the solver. None are recovered internally: a
/// diverged integration has no safe automatic remedy, so every variant
/// propagates to the caller.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A construction argument was non-positive or otherwise unusable.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The seeded field does not match the derived grid shape.
    #[error("initial field has shape {got:?}, grid expects {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// The integration went numerically unstable. The field is left in
    /// its last pre-divergence state plus the failed update; treat the
    /// whole run as failed rather than resuming.
    #[error("solution diverged: {0}")]
    DivergedSolution(#[from] ComputeError),
}

/// Pseudo-spectral solver for 2D incompressible flow in the
/// vorticity–streamfunction formulation.
pub struct Solver {
    params: SolverParams,
    grid: SpectralGrid,
    state: FieldState,
    evaluator: Box<dyn RhsEvaluator>,
    fft: Fft2d,
}

impl Solver {
    /// Construct a solver for the given parameters with the requested
    /// RHS evaluation backend.
    pub fn new(params: SolverParams, backend: Backend) -> Result<Self, SolverError> {
        let grid = SpectralGrid::new(&params)?;
        let evaluator = build_evaluator(backend, grid.operators(params.re));
        let fft = Fft2d::new(grid.nx, grid.ny);
        let state = FieldState::new(grid.nx, grid.ny);
        Ok(Self {
            params,
            grid,
            state,
            evaluator,
            fft,
        })
    }

    /// Seed the solver with a physical-space vorticity field shaped
    /// `(nx, ny)`.
    ///
    /// The field is forward-transformed and dealiased; the simulation
    /// clock and step size reset to zero. A nonzero mean vorticity has
    /// no streamfunction on a periodic box, so the mean mode is
    /// projected out to keep the Poisson solve well-posed (with a
    /// warning when the discarded mean is non-negligible).
    pub fn set_initial(&mut self, omega: ArrayView2<f64>) -> Result<(), SolverError> {
        let expected = (self.grid.nx, self.grid.ny);
        if omega.dim() != expected {
            return Err(SolverError::ShapeMismatch {
                expected,
                got: omega.dim(),
            });
        }

        let mut omega_hat = omega.mapv(|w| Complex64::new(w, 0.0));
        self.fft.forward(&mut omega_hat);
        self.grid.apply_dealias(&mut omega_hat);

        let mean = omega_hat[[0, 0]].norm() / (self.grid.nx * self.grid.ny) as f64;
        if mean > MEAN_WARN_TOL {
            log::warn!("seeded vorticity has nonzero mean {mean:.3e}; projecting it out");
        }
        omega_hat[[0, 0]] = Complex64::default();

        self.state.omega_hat = omega_hat;
        self.state.scratch.fill(Complex64::default());
        self.state.t = 0.0;
        self.state.dt = 0.0;
        Ok(())
    }

    /// Advance one adaptive Runge–Kutta step.
    ///
    /// The first stage re-derives the step size; the remaining stages
    /// reuse it. On a [`SolverError::DivergedSolution`] the run is lost
    /// and stepping must not resume.
    pub fn step(&mut self) -> Result<(), SolverError> {
        let state = &mut self.state;

        // Stage 0: rebuild the stage buffer with the previous step's
        // dt and RHS, evaluate, and re-derive the step size.
        stage_field(
            &mut state.scratch,
            &state.omega_hat,
            (RK_A[0] - RK_B[0]) * state.dt,
        );
        let out = self.evaluator.evaluate(&state.scratch)?;
        state.scratch = out.rhs_hat;

        let vmax = max_speed(&out.u, &out.v);
        state.dt = self
            .grid
            .dtv
            .min(self.params.cfl * self.grid.dl / vmax)
            .min(DT_CEILING);
        accumulate(&mut state.omega_hat, &state.scratch, RK_B[1] * state.dt);

        // Stages 1..3 keep only the spectral RHS term.
        for i in 1..4 {
            stage_field(
                &mut state.scratch,
                &state.omega_hat,
                (RK_A[i] - RK_B[i]) * state.dt,
            );
            let out = self.evaluator.evaluate(&state.scratch)?;
            state.scratch = out.rhs_hat;
            accumulate(&mut state.omega_hat, &state.scratch, RK_B[i + 1] * state.dt);
        }

        state.t += state.dt;
        Ok(())
    }

    /// Physical-space vorticity (real part of the inverse transform).
    pub fn vorticity(&self) -> Array2<f64> {
        let mut omega = self.state.omega_hat.clone();
        self.fft.inverse(&mut omega);
        omega.mapv(|c| c.re)
    }

    /// Physical-space velocity components recovered from the current
    /// vorticity via the streamfunction: `u = ∂ψ/∂y`, `v = −∂ψ/∂x`.
    pub fn velocities(&self) -> (Array2<f64>, Array2<f64>) {
        let g = &self.grid;
        let mut u_hat = Array2::<Complex64>::zeros((g.nx, g.ny));
        let mut v_hat = Array2::<Complex64>::zeros((g.nx, g.ny));
        Zip::from(&mut u_hat)
            .and(&mut v_hat)
            .and(&self.state.omega_hat)
            .and(&g.poisson)
            .and(&g.kx)
            .and(&g.ky)
            .for_each(|uh, vh, &w, &p, &kx, &ky| {
                let psi = -w / p;
                *uh = Complex64::new(0.0, ky) * psi;
                *vh = Complex64::new(0.0, -kx) * psi;
            });
        self.fft.inverse(&mut u_hat);
        self.fft.inverse(&mut v_hat);
        (u_hat.mapv(|c| c.re), v_hat.mapv(|c| c.re))
    }

    /// Normalised spatial autocorrelation of the vorticity field, a
    /// diagnostic only. An all-zero field yields an all-zero array
    /// rather than dividing by a zero peak.
    pub fn autocorrelation(&self) -> Array2<f64> {
        let mut corr_hat = self.state.omega_hat.mapv(|w| w.conj() * w);
        self.fft.inverse(&mut corr_hat);
        let corr = corr_hat.mapv(|c| c.re);
        let peak = corr.iter().fold(0.0f64, |m, &c| m.max(c));
        if peak > 0.0 {
            corr / peak
        } else {
            corr
        }
    }

    /// Simulation time: the sum of all accepted step sizes.
    pub fn time(&self) -> f64 {
        self.state.t
    }

    /// Step size accepted by the most recent step (zero before the
    /// first step).
    pub fn dt(&self) -> f64 {
        self.state.dt
    }

    /// Derived mode counts `(nx, ny)`.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.grid.nx, self.grid.ny)
    }

    /// Physical mesh spacings `(dx, dy)`.
    pub fn mesh_spacing(&self) -> (f64, f64) {
        (self.grid.dx, self.grid.dy)
    }

    pub fn grid(&self) -> &SpectralGrid {
        &self.grid
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Name of the RHS backend chosen at construction.
    pub fn backend_label(&self) -> &'static str {
        self.evaluator.label()
    }
}

/// `scratch ← omega + c·scratch`, the low-storage stage recurrence.
fn stage_field(scratch: &mut Array2<Complex64>, omega: &Array2<Complex64>, c: f64) {
    Zip::from(scratch).and(omega).for_each(|s, &w| *s = w + *s * c);
}

/// `omega ← omega + c·rhs`.
fn accumulate(omega: &mut Array2<Complex64>, rhs: &Array2<Complex64>, c: f64) {
    omega.scaled_add(Complex64::from(c), rhs);
}

/// Largest pointwise flow speed over the whole field. Returns zero for
/// a quiescent field, which sends the convective bound to infinity and
/// leaves `dt` governed by the diffusive bound and the hard ceiling.
fn max_speed(u: &Array2<f64>, v: &Array2<f64>) -> f64 {
    u.iter()
        .zip(v.iter())
        .fold(0.0f64, |m, (&u, &v)| m.max((u * u + v * v).sqrt()))
}
