//! In-process RHS evaluator.
//!
//! Implements the full evaluation in the calling thread with a single
//! cached FFT plan pair:
//!
//! 1. Solve the streamfunction Poisson relation `ψ̂ = −f̂ / poisson`.
//! 2. Recover velocity in spectral space: `û = i·ky·ψ̂`, `v̂ = −i·kx·ψ̂`.
//! 3. Inverse-transform `û`, `v̂` and the vorticity gradients
//!    `i·kx·f̂`, `i·ky·f̂`, keeping the real parts.
//! 4. Form `conv = u·ωx + v·ωy` pointwise, forward-transform it and
//!    apply the 2/3-rule mask.
//! 5. Return `laplacian·f̂/Re − conv̂` together with `u` and `v`.

use ndarray::{Array2, Zip};
use num_complex::Complex64;

use crate::evaluator::{ensure_finite, ComputeError, Rhs, RhsEvaluator, SpectralOperators};
use crate::fft::Fft2d;

pub struct SerialEvaluator {
    ops: SpectralOperators,
    fft: Fft2d,
}

impl SerialEvaluator {
    pub fn new(ops: SpectralOperators) -> Self {
        let (nx, ny) = ops.dim();
        Self {
            ops,
            fft: Fft2d::new(nx, ny),
        }
    }
}

impl RhsEvaluator for SerialEvaluator {
    fn label(&self) -> &'static str {
        "serial"
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

        // Velocity from the streamfunction, assembled directly from f_hat.
        let mut u_hat = Array2::<Complex64>::zeros(expected);
        let mut v_hat = Array2::<Complex64>::zeros(expected);
        Zip::from(&mut u_hat)
            .and(&mut v_hat)
            .and(f_hat)
            .and(&ops.poisson)
            .and(&ops.kx)
            .and(&ops.ky)
            .for_each(|uh, vh, &f, &p, &kx, &ky| {
                let psi = -f / p;
                *uh = Complex64::new(0.0, ky) * psi;
                *vh = Complex64::new(0.0, -kx) * psi;
            });

        // Spectral vorticity gradients.
        let mut omega_x = Array2::<Complex64>::zeros(expected);
        let mut omega_y = Array2::<Complex64>::zeros(expected);
        Zip::from(&mut omega_x)
            .and(&mut omega_y)
            .and(f_hat)
            .and(&ops.kx)
            .and(&ops.ky)
            .for_each(|wx, wy, &f, &kx, &ky| {
                *wx = Complex64::new(0.0, kx) * f;
                *wy = Complex64::new(0.0, ky) * f;
            });

        self.fft.inverse(&mut u_hat);
        self.fft.inverse(&mut v_hat);
        self.fft.inverse(&mut omega_x);
        self.fft.inverse(&mut omega_y);

        let u = u_hat.mapv(|c| c.re);
        let v = v_hat.mapv(|c| c.re);
        ensure_finite(&u, &v)?;

        // Convective term in physical space; the pointwise product
        // creates content beyond the resolved band, removed below.
        let mut conv_hat = Array2::<Complex64>::zeros(expected);
        Zip::from(&mut conv_hat)
            .and(&u)
            .and(&v)
            .and(&omega_x)
            .and(&omega_y)
            .for_each(|c, &u, &v, &wx, &wy| {
                *c = Complex64::new(u * wx.re + v * wy.re, 0.0);
            });
        self.fft.forward(&mut conv_hat);

        let re = ops.re;
        let mut rhs_hat = conv_hat;
        Zip::from(&mut rhs_hat)
            .and(f_hat)
            .and(&ops.laplacian)
            .and(&ops.dealias)
            .for_each(|r, &f, &lap, &keep| {
                let conv = if keep { *r } else { Complex64::default() };
                *r = lap * f / re - conv;
            });

        Ok(Rhs { rhs_hat, u, v })
    }
}
