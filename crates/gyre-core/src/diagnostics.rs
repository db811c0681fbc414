//! Scalar diagnostics derived from physical-space fields.
//!
//! Used by the regression tests and the CLI time series; the solver
//! itself never depends on them.

use ndarray::ArrayView2;

/// Total kinetic energy `½ ∬ (u² + v²) dx dy` on the uniform mesh.
pub fn kinetic_energy(u: ArrayView2<f64>, v: ArrayView2<f64>, dx: f64, dy: f64) -> f64 {
    let sum: f64 = u
        .iter()
        .zip(v.iter())
        .map(|(&u, &v)| u * u + v * v)
        .sum();
    0.5 * sum * dx * dy
}

/// Total enstrophy `½ ∬ ω² dx dy`.
pub fn enstrophy(omega: ArrayView2<f64>, dx: f64, dy: f64) -> f64 {
    0.5 * omega.iter().map(|&w| w * w).sum::<f64>() * dx * dy
}

/// Largest pointwise flow speed.
pub fn max_speed(u: ArrayView2<f64>, v: ArrayView2<f64>) -> f64 {
    u.iter()
        .zip(v.iter())
        .fold(0.0f64, |m, (&u, &v)| m.max((u * u + v * v).sqrt()))
}

/// Largest vorticity magnitude.
pub fn max_vorticity(omega: ArrayView2<f64>) -> f64 {
    omega.iter().fold(0.0f64, |m, &w| m.max(w.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    #[test]
    fn kinetic_energy_of_uniform_flow() {
        let u = Array2::from_elem((8, 8), 2.0);
        let v = Array2::from_elem((8, 8), 1.0);
        // ½ · 64 · (4 + 1) · dx · dy
        let e = kinetic_energy(u.view(), v.view(), 0.5, 0.25);
        assert_abs_diff_eq!(e, 0.5 * 64.0 * 5.0 * 0.5 * 0.25, epsilon = 1e-12);
    }

    #[test]
    fn enstrophy_of_zero_field_is_zero() {
        let omega = Array2::<f64>::zeros((8, 8));
        assert_eq!(enstrophy(omega.view(), 0.1, 0.1), 0.0);
    }

    #[test]
    fn extrema_reductions() {
        let mut omega = Array2::<f64>::zeros((4, 4));
        omega[[2, 3]] = -7.5;
        omega[[1, 1]] = 3.0;
        assert_eq!(max_vorticity(omega.view()), 7.5);
    }
}
