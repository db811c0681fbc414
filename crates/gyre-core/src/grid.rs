//! Spectral grid: resolution heuristic, wavenumber axes, and the
//! pointwise operators of the vorticity–streamfunction formulation.
//!
//! All arrays are shaped `(nx, ny)` with index `[i, j]` addressing
//! x-mode `i` and y-mode `j`, and are computed once at construction;
//! nothing here is mutated afterwards.

use ndarray::{Array2, Zip};
use num_complex::Complex64;

use gyre_compute::SpectralOperators;

use crate::solver::SolverError;
use crate::types::SolverParams;

pub struct SpectralGrid {
    /// Number of x modes (always even).
    pub nx: usize,
    /// Number of y modes (always even).
    pub ny: usize,
    /// Physical mesh spacing in x, `Lx/(nx−1)`.
    pub dx: f64,
    /// Physical mesh spacing in y, `Ly/(ny−1)`.
    pub dy: f64,
    /// Minimum physical mesh spacing.
    pub dl: f64,
    /// Diffusive step-size bound, `CFL·dl²·Re`.
    pub dtv: f64,
    /// x-wavenumbers scaled by `2π/Lx`, DFT wrap order.
    pub kx: Array2<f64>,
    /// y-wavenumbers scaled by `2π/Ly`, DFT wrap order.
    pub ky: Array2<f64>,
    /// `−(kx² + ky²)`.
    pub laplacian: Array2<f64>,
    /// Laplacian with the zero mode pinned to `1`, so the spectral
    /// Poisson solve is a plain pointwise division. The mean of the
    /// streamfunction is undefined on a periodic box and fixed at zero
    /// by convention.
    pub poisson: Array2<f64>,
    /// 2/3-rule low-pass mask, `true` where a mode is kept.
    pub dealias: Array2<bool>,
}

impl SpectralGrid {
    /// Derive the grid from validated parameters. Deterministic; the
    /// only output besides the returned value is one log line.
    pub fn new(params: &SolverParams) -> Result<Self, SolverError> {
        params.validate()?;

        let nx = mode_count(params.lx, params.re);
        let ny = mode_count(params.ly, params.re);
        if nx < 2 || ny < 2 {
            return Err(SolverError::InvalidParameter(format!(
                "domain under-resolved: {nx}x{ny} modes derived from \
                 Lx={}, Ly={}, Re={}",
                params.lx, params.ly, params.re
            )));
        }

        let dx = params.lx / (nx - 1) as f64;
        let dy = params.ly / (ny - 1) as f64;
        let dl = dx.min(dy);
        let dtv = params.cfl * dl * dl * params.re;

        let kx_axis = wavenumbers(nx, params.lx);
        let ky_axis = wavenumbers(ny, params.ly);

        let kx = Array2::from_shape_fn((nx, ny), |(i, _)| kx_axis[i]);
        let ky = Array2::from_shape_fn((nx, ny), |(_, j)| ky_axis[j]);
        let laplacian = Array2::from_shape_fn((nx, ny), |(i, j)| {
            -(kx_axis[i] * kx_axis[i] + ky_axis[j] * ky_axis[j])
        });
        let mut poisson = laplacian.clone();
        poisson[[0, 0]] = 1.0;

        let tau = std::f64::consts::TAU;
        let (cut_x, cut_y) = (nx as f64 / 3.0, ny as f64 / 3.0);
        let dealias = Array2::from_shape_fn((nx, ny), |(i, j)| {
            (kx_axis[i] * params.lx / tau).abs() < cut_x
                && (ky_axis[j] * params.ly / tau).abs() < cut_y
        });

        log::info!("spectral grid resolved: nx={nx} ny={ny} dl={dl:.6e} dtv={dtv:.6e}");

        Ok(Self {
            nx,
            ny,
            dx,
            dy,
            dl,
            dtv,
            kx,
            ky,
            laplacian,
            poisson,
            dealias,
        })
    }

    /// Bundle the pointwise operators for constructing an RHS evaluator.
    pub fn operators(&self, re: f64) -> SpectralOperators {
        SpectralOperators {
            re,
            kx: self.kx.clone(),
            ky: self.ky.clone(),
            laplacian: self.laplacian.clone(),
            poisson: self.poisson.clone(),
            dealias: self.dealias.clone(),
        }
    }

    /// Zero every mode outside the resolved two-thirds band.
    pub fn apply_dealias(&self, field: &mut Array2<Complex64>) {
        Zip::from(field).and(&self.dealias).for_each(|f, &keep| {
            if !keep {
                *f = Complex64::default();
            }
        });
    }
}

/// Mode count from the Kolmogorov-scale estimate for 2D turbulence
/// (`η ≈ c/√Re`): `n = 2·round(0.64·L·√Re/2)`, forced even by the
/// doubling.
fn mode_count(l: f64, re: f64) -> usize {
    (2.0 * (0.64 * l * re.sqrt() / 2.0).round()) as usize
}

/// DFT-ordered wavenumbers scaled by `2π/L`: the zero mode first, then
/// ascending positive frequencies, then negative frequencies starting
/// from the most negative.
fn wavenumbers(n: usize, l: f64) -> Vec<f64> {
    let scale = std::f64::consts::TAU / l;
    (0..n)
        .map(|i| {
            let k = if i <= (n - 1) / 2 {
                i as f64
            } else {
                i as f64 - n as f64
            };
            k * scale
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid(lx: f64, ly: f64, re: f64, cfl: f64) -> SpectralGrid {
        SpectralGrid::new(&SolverParams { lx, ly, re, cfl }).unwrap()
    }

    #[test]
    fn mode_counts_are_even_and_match_heuristic() {
        let g = grid(2.0, 2.0, 10_000.0, 0.2);
        assert_eq!((g.nx, g.ny), (128, 128));
        let g = grid(4.0, 2.0, 10_000.0, 0.2);
        assert_eq!((g.nx, g.ny), (256, 128));
        assert_eq!(g.nx % 2, 0);
        assert_eq!(g.ny % 2, 0);
        assert!(g.dl > 0.0);
        assert_abs_diff_eq!(g.dl, 2.0 / 127.0, epsilon = 1e-12);
    }

    #[test]
    fn diffusive_bound_follows_definition() {
        let g = grid(2.0, 2.0, 10_000.0, 0.2);
        assert_abs_diff_eq!(g.dtv, 0.2 * g.dl * g.dl * 10_000.0, epsilon = 1e-12);
    }

    #[test]
    fn wavenumber_axis_wraps_like_dft_frequencies() {
        let k = wavenumbers(4, std::f64::consts::TAU);
        assert_eq!(k, vec![0.0, 1.0, -2.0, -1.0]);
        let k = wavenumbers(5, std::f64::consts::TAU);
        assert_eq!(k, vec![0.0, 1.0, 2.0, -2.0, -1.0]);
    }

    #[test]
    fn poisson_equals_laplacian_except_zero_mode() {
        let g = grid(2.0, 2.0, 2_000.0, 0.2);
        assert_eq!(g.poisson[[0, 0]], 1.0);
        assert_eq!(g.laplacian[[0, 0]], 0.0);
        for ((i, j), &p) in g.poisson.indexed_iter() {
            if (i, j) != (0, 0) {
                assert_eq!(p, g.laplacian[[i, j]]);
                assert!(p < 0.0);
            }
        }
    }

    #[test]
    fn dealias_mask_cuts_top_third_and_wraps_symmetrically() {
        let g = grid(2.0, 2.0, 2_000.0, 0.2);
        assert!(g.dealias[[0, 0]]);
        // The most negative mode (index n/2) is always excluded.
        assert!(!g.dealias[[g.nx / 2, 0]]);
        assert!(!g.dealias[[0, g.ny / 2]]);
        for ((i, j), &kept) in g.dealias.indexed_iter() {
            let mirror = g.dealias[[(g.nx - i) % g.nx, (g.ny - j) % g.ny]];
            assert_eq!(kept, mirror, "mask asymmetric at ({i}, {j})");
        }
    }

    #[test]
    fn under_resolved_domain_is_rejected() {
        let result = SpectralGrid::new(&SolverParams {
            lx: 0.01,
            ly: 0.01,
            re: 1.0,
            cfl: 0.2,
        });
        assert!(matches!(result, Err(SolverError::InvalidParameter(_))));
    }

    #[test]
    fn invalid_params_are_rejected_before_derivation() {
        let result = SpectralGrid::new(&SolverParams {
            lx: -2.0,
            ly: 2.0,
            re: 10_000.0,
            cfl: 0.2,
        });
        assert!(matches!(result, Err(SolverError::InvalidParameter(_))));
    }

    #[test]
    fn apply_dealias_zeroes_masked_modes_only() {
        let g = grid(2.0, 2.0, 2_000.0, 0.2);
        let mut field = Array2::from_elem((g.nx, g.ny), Complex64::new(1.0, -1.0));
        g.apply_dealias(&mut field);
        for (f, &keep) in field.iter().zip(g.dealias.iter()) {
            if keep {
                assert_eq!(*f, Complex64::new(1.0, -1.0));
            } else {
                assert_eq!(*f, Complex64::default());
            }
        }
    }
}
