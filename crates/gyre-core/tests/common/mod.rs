//! Shared field constructors for the integration tests.
#![allow(dead_code)]

use ndarray::Array2;

/// `n` mesh points spanning `[-l/2, l/2]`, matching the solver mesh.
pub fn axis(n: usize, l: f64) -> Vec<f64> {
    (0..n)
        .map(|i| -l / 2.0 + l * i as f64 / (n - 1) as f64)
        .collect()
}

/// Single Gaussian vortex at the box centre.
pub fn gaussian_vortex(
    nx: usize,
    ny: usize,
    lx: f64,
    ly: f64,
    amplitude: f64,
    radius: f64,
) -> Array2<f64> {
    let xs = axis(nx, lx);
    let ys = axis(ny, ly);
    Array2::from_shape_fn((nx, ny), |(i, j)| {
        amplitude * (-(xs[i] * xs[i] + ys[j] * ys[j]) / (radius * radius)).exp()
    })
}

/// Two antisymmetric shear layers with a sinusoidal perturbation, the
/// classic Kelvin–Helmholtz configuration (a planar infinite jet).
pub fn shear_layers(
    nx: usize,
    ny: usize,
    lx: f64,
    ly: f64,
    perturbation: f64,
    sharpness: f64,
) -> Array2<f64> {
    let xs = axis(nx, lx);
    let ys = axis(ny, ly);
    Array2::from_shape_fn((nx, ny), |(i, j)| {
        let envelope = 1.0 + perturbation * (std::f64::consts::PI * xs[i]).cos();
        let upper = (-sharpness * (ys[j] + ly / 4.0).powi(2)).exp();
        let lower = (-sharpness * (ys[j] - ly / 4.0).powi(2)).exp();
        envelope * (upper - lower)
    })
}

pub fn assert_all_finite(field: &Array2<f64>, context: &str) {
    assert!(
        field.iter().all(|x| x.is_finite()),
        "non-finite value in {context}"
    );
}
