//! # Gyre Core
//!
//! The numerical backbone of the gyre framework. This crate advances a
//! two-dimensional incompressible flow on a doubly-periodic box under
//! the vorticity–streamfunction formulation of the Navier–Stokes
//! equations, using a Fourier pseudo-spectral discretisation and an
//! explicit low-storage Runge–Kutta integrator with a CFL-based
//! adaptive step.
//!
//! ## Architecture
//!
//! The [`solver::Solver`] owns the grid and field state and delegates
//! right-hand-side evaluation to a [`gyre_compute::RhsEvaluator`]
//! chosen at construction time, so the serial and parallel engines are
//! interchangeable behind the same numerical contract.
//!
//! ## Modules
//!
//! - [`types`] — Simulation parameters and their validation.
//! - [`grid`] — Spectral grid, wavenumber axes, and pointwise operators.
//! - [`state`] — The spectral vorticity field and simulation clock.
//! - [`solver`] — Construction, seeding, time stepping, accessors.
//! - [`diagnostics`] — Scalar reductions (energy, enstrophy, extrema).

pub mod diagnostics;
pub mod grid;
pub mod solver;
pub mod state;
pub mod types;

pub use gyre_compute::Backend;
pub use solver::{Solver, SolverError};
pub use types::SolverParams;
