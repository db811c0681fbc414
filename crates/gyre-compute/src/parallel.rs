//! Delegated high-throughput RHS evaluator.
//!
//! Same mathematical contract as [`SerialEvaluator`](crate::serial::SerialEvaluator),
//! different execution engine: the batched 1D transforms run across
//! Rayon worker threads with per-thread scratch, the pointwise stages
//! use parallel `Zip` kernels, and the spectral stage buffers are
//! preallocated and reused across calls. The evaluator never aliases or
//! retains the caller's field beyond the call.

use std::sync::Arc;

use ndarray::parallel::prelude::*;
use ndarray::{Array2, Axis, Zip};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::evaluator::{ensure_finite, ComputeError, Rhs, RhsEvaluator, SpectralOperators};

pub struct ParallelEvaluator {
    ops: SpectralOperators,
    forward_x: Arc<dyn Fft<f64>>,
    forward_y: Arc<dyn Fft<f64>>,
    inverse_x: Arc<dyn Fft<f64>>,
    inverse_y: Arc<dyn Fft<f64>>,
    u_hat: Array2<Complex64>,
    v_hat: Array2<Complex64>,
    omega_x: Array2<Complex64>,
    omega_y: Array2<Complex64>,
}

impl ParallelEvaluator {
    pub fn new(ops: SpectralOperators) -> Self {
        let (nx, ny) = ops.dim();
        let mut planner = FftPlanner::new();
        Self {
            forward_x: planner.plan_fft_forward(nx),
            forward_y: planner.plan_fft_forward(ny),
            inverse_x: planner.plan_fft_inverse(nx),
            inverse_y: planner.plan_fft_inverse(ny),
            u_hat: Array2::zeros((nx, ny)),
            v_hat: Array2::zeros((nx, ny)),
            omega_x: Array2::zeros((nx, ny)),
            omega_y: Array2::zeros((nx, ny)),
            ops,
        }
    }

    fn forward(&self, field: &mut Array2<Complex64>) {
        par_transform_axis(field, Axis(0), &self.forward_x);
        par_transform_axis(field, Axis(1), &self.forward_y);
    }

    fn inverse(&self, field: &mut Array2<Complex64>) {
        par_transform_axis(field, Axis(0), &self.inverse_x);
        par_transform_axis(field, Axis(1), &self.inverse_y);
        let (nx, ny) = field.dim();
        let norm = 1.0 / (nx * ny) as f64;
        field.par_mapv_inplace(|c| c * norm);
    }
}

/// Run a 1D plan over every subview of `field` orthogonal to `axis`,
/// one Rayon task per subview with thread-local gather and scratch
/// buffers.
fn par_transform_axis(field: &mut Array2<Complex64>, axis: Axis, plan: &Arc<dyn Fft<f64>>) {
    let len = plan.len();
    let scratch_len = plan.get_inplace_scratch_len();
    // Iterating over the *other* axis yields lanes along `axis`.
    let outer = Axis(1 - axis.index());
    field
        .axis_iter_mut(outer)
        .into_par_iter()
        .for_each_init(
            || {
                (
                    vec![Complex64::default(); len],
                    vec![Complex64::default(); scratch_len],
                )
            },
            |(lane_buf, scratch), mut lane| {
                for (b, v) in lane_buf.iter_mut().zip(lane.iter()) {
                    *b = *v;
                }
                plan.process_with_scratch(lane_buf, scratch);
                for (v, b) in lane.iter_mut().zip(lane_buf.iter()) {
                    *v = *b;
                }
            },
        );
}

impl RhsEvaluator for ParallelEvaluator {
    fn label(&self) -> &'static str {
        "parallel"
    }

    fn evaluate(&mut self, f_hat: &Array2<Complex64>) -> Result<Rhs, ComputeError> {
        let expected = self.ops.dim();
        if f_hat.dim() != expected {
            return Err(ComputeError::ShapeMismatch {
                expected,
                got: f_hat.dim(),
            });
        }

        let ops = &self.ops;
        Zip::from(&mut self.u_hat)
            .and(&mut self.v_hat)
            .and(f_hat)
            .and(&ops.poisson)
            .and(&ops.kx)
            .and(&ops.ky)
            .par_for_each(|uh, vh, &f, &p, &kx, &ky| {
                let psi = -f / p;
                *uh = Complex64::new(0.0, ky) * psi;
                *vh = Complex64::new(0.0, -kx) * psi;
            });
        Zip::from(&mut self.omega_x)
            .and(&mut self.omega_y)
            .and(f_hat)
            .and(&ops.kx)
            .and(&ops.ky)
            .par_for_each(|wx, wy, &f, &kx, &ky| {
                *wx = Complex64::new(0.0, kx) * f;
                *wy = Complex64::new(0.0, ky) * f;
            });

        let mut u_hat = std::mem::take(&mut self.u_hat);
        let mut v_hat = std::mem::take(&mut self.v_hat);
        let mut omega_x = std::mem::take(&mut self.omega_x);
        let mut omega_y = std::mem::take(&mut self.omega_y);
        self.inverse(&mut u_hat);
        self.inverse(&mut v_hat);
        self.inverse(&mut omega_x);
        self.inverse(&mut omega_y);

        let mut u = Array2::<f64>::zeros(expected);
        let mut v = Array2::<f64>::zeros(expected);
        Zip::from(&mut u)
            .and(&u_hat)
            .par_for_each(|r, &c| *r = c.re);
        Zip::from(&mut v)
            .and(&v_hat)
            .par_for_each(|r, &c| *r = c.re);

        let mut rhs_hat = Array2::<Complex64>::zeros(expected);
        Zip::from(&mut rhs_hat)
            .and(&u)
            .and(&v)
            .and(&omega_x)
            .and(&omega_y)
            .par_for_each(|c, &u, &v, &wx, &wy| {
                *c = Complex64::new(u * wx.re + v * wy.re, 0.0);
            });

        // Return the stage buffers before the early-exit check below.
        self.u_hat = u_hat;
        self.v_hat = v_hat;
        self.omega_x = omega_x;
        self.omega_y = omega_y;

        ensure_finite(&u, &v)?;

        self.forward(&mut rhs_hat);

        let ops = &self.ops;
        let re = ops.re;
        Zip::from(&mut rhs_hat)
            .and(f_hat)
            .and(&ops.laplacian)
            .and(&ops.dealias)
            .par_for_each(|r, &f, &lap, &keep| {
                let conv = if keep { *r } else { Complex64::default() };
                *r = lap * f / re - conv;
            });

        Ok(Rhs { rhs_hat, u, v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::test_support::operators;
    use crate::serial::SerialEvaluator;

    fn smooth_spectral_field(nx: usize, ny: usize) -> Array2<Complex64> {
        let fft = crate::fft::Fft2d::new(nx, ny);
        let mut f_hat = Array2::from_shape_fn((nx, ny), |(i, j)| {
            let x = std::f64::consts::TAU * i as f64 / nx as f64;
            let y = std::f64::consts::TAU * j as f64 / ny as f64;
            Complex64::new(x.sin() * y.cos() + 0.3 * (2.0 * x).cos() * (3.0 * y).sin(), 0.0)
        });
        fft.forward(&mut f_hat);
        f_hat
    }

    #[test]
    fn parallel_transforms_match_serial() {
        let (nx, ny) = (24, 20);
        let eval = ParallelEvaluator::new(operators(nx, ny, 2.0, 2.0, 100.0));
        let serial = crate::fft::Fft2d::new(nx, ny);

        let original = Array2::from_shape_fn((nx, ny), |(i, j)| {
            Complex64::new(((5 * i + 3 * j) as f64).sin(), ((2 * i) as f64 - j as f64).cos())
        });

        let mut a = original.clone();
        let mut b = original.clone();
        eval.forward(&mut a);
        serial.forward(&mut b);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < 1e-10, "{x} != {y}");
        }

        eval.inverse(&mut a);
        serial.inverse(&mut b);
        for (x, y) in a.iter().zip(original.iter()) {
            assert!((x - y).norm() < 1e-10, "{x} != {y}");
        }
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < 1e-12, "{x} != {y}");
        }
    }

    #[test]
    fn agrees_with_serial_evaluator() {
        let (nx, ny) = (32, 32);
        let ops = operators(nx, ny, 2.0, 2.0, 1000.0);
        let mut serial = SerialEvaluator::new(ops.clone());
        let mut parallel = ParallelEvaluator::new(ops);

        let f_hat = smooth_spectral_field(nx, ny);
        let a = serial.evaluate(&f_hat).unwrap();
        let b = parallel.evaluate(&f_hat).unwrap();

        for (x, y) in a.rhs_hat.iter().zip(b.rhs_hat.iter()) {
            assert!((x - y).norm() <= 1e-10 * (1.0 + x.norm()), "{x} != {y}");
        }
        for (x, y) in a.u.iter().zip(b.u.iter()) {
            assert!((x - y).abs() <= 1e-10 * (1.0 + x.abs()), "{x} != {y}");
        }
        for (x, y) in a.v.iter().zip(b.v.iter()) {
            assert!((x - y).abs() <= 1e-10 * (1.0 + x.abs()), "{x} != {y}");
        }
    }

    #[test]
    fn repeated_calls_reuse_buffers_consistently() {
        let (nx, ny) = (16, 16);
        let mut eval = ParallelEvaluator::new(operators(nx, ny, 2.0, 2.0, 500.0));
        let f_hat = smooth_spectral_field(nx, ny);
        let first = eval.evaluate(&f_hat).unwrap();
        let second = eval.evaluate(&f_hat).unwrap();
        for (x, y) in first.rhs_hat.iter().zip(second.rhs_hat.iter()) {
            assert_eq!(x, y);
        }
    }
}
