//! # Gyre Compute
//!
//! RHS evaluation backends for the gyre vorticity solver. This crate
//! provides a [`RhsEvaluator`](evaluator::RhsEvaluator) trait that isolates
//! the time integrator in `gyre-core` from the execution engine used to
//! evaluate the nonlinear right-hand side.
//!
//! ## Available backends
//!
//! | Backend | Selector | Execution |
//! |---------|----------|-----------|
//! | Serial | [`Backend::Serial`] | single thread, cached FFT plans |
//! | Parallel | [`Backend::Parallel`] | Rayon-batched FFTs and pointwise kernels |
//!
//! Both backends satisfy the identical numerical contract; the parallel
//! evaluator is a performance substitution, not a behavioural variant.

pub mod evaluator;
pub mod fft;
pub mod parallel;
pub mod serial;

pub use evaluator::{
    build_evaluator, Backend, ComputeError, Rhs, RhsEvaluator, SpectralOperators,
};
pub use fft::Fft2d;
pub use parallel::ParallelEvaluator;
pub use serial::SerialEvaluator;
