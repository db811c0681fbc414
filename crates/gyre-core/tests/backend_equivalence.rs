//! The serial and parallel RHS evaluators are performance
//! substitutions for one another: same spectral field in, same
//! numbers out, to floating-point association tolerance.

mod common;

use gyre_compute::{build_evaluator, Backend, Fft2d};
use gyre_core::grid::SpectralGrid;
use gyre_core::{Solver, SolverParams};
use num_complex::Complex64;

#[test]
fn evaluators_agree_pointwise() {
    let params = SolverParams::new(2.0, 2.0, 2_000.0, 0.2).unwrap();
    let grid = SpectralGrid::new(&params).unwrap();
    let (nx, ny) = (grid.nx, grid.ny);

    let omega0 = common::gaussian_vortex(nx, ny, 2.0, 2.0, 1.0, 0.25);
    let fft = Fft2d::new(nx, ny);
    let mut f_hat = omega0.mapv(|w| Complex64::new(w, 0.0));
    fft.forward(&mut f_hat);
    grid.apply_dealias(&mut f_hat);
    f_hat[[0, 0]] = Complex64::default();

    let mut serial = build_evaluator(Backend::Serial, grid.operators(params.re));
    let mut parallel = build_evaluator(Backend::Parallel, grid.operators(params.re));

    let a = serial.evaluate(&f_hat).unwrap();
    let b = parallel.evaluate(&f_hat).unwrap();

    for (x, y) in a.rhs_hat.iter().zip(b.rhs_hat.iter()) {
        assert!(
            (x - y).norm() <= 1e-10 * (1.0 + x.norm()),
            "rhs mismatch: {x} vs {y}"
        );
    }
    for (x, y) in a.u.iter().zip(b.u.iter()) {
        assert!((x - y).abs() <= 1e-10 * (1.0 + x.abs()), "u mismatch");
    }
    for (x, y) in a.v.iter().zip(b.v.iter()) {
        assert!((x - y).abs() <= 1e-10 * (1.0 + x.abs()), "v mismatch");
    }
}

#[test]
fn solvers_agree_after_several_steps() {
    let params = SolverParams::new(2.0, 2.0, 2_000.0, 0.2).unwrap();
    let mut serial = Solver::new(params, Backend::Serial).unwrap();
    let mut parallel = Solver::new(params, Backend::Parallel).unwrap();
    let (nx, ny) = serial.grid_size();

    let omega0 = common::gaussian_vortex(nx, ny, 2.0, 2.0, 1.0, 0.25);
    serial.set_initial(omega0.view()).unwrap();
    parallel.set_initial(omega0.view()).unwrap();

    for _ in 0..5 {
        serial.step().unwrap();
        parallel.step().unwrap();
    }

    assert!((serial.time() - parallel.time()).abs() < 1e-12);
    let a = serial.vorticity();
    let b = parallel.vorticity();
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x - y).abs() <= 1e-8 * (1.0 + x.abs()), "{x} != {y}");
    }
}
