//! Initial vorticity distributions.
//!
//! Fields are sampled on the collocation mesh `linspace(-L/2, L/2, n)`
//! along each axis, shaped `(nx, ny)` with x varying along axis 0.

use ndarray::Array2;

use crate::config::InitialConfig;

/// Build the initial vorticity field described by the job configuration.
pub fn build(cfg: &InitialConfig, nx: usize, ny: usize, lx: f64, ly: f64) -> Array2<f64> {
    match *cfg {
        InitialConfig::GaussianVortex { amplitude, radius } => {
            gaussian_vortex(nx, ny, lx, ly, amplitude, radius)
        }
        InitialConfig::VortexSoup {
            amplitude,
            sharpness,
        } => vortex_soup(nx, ny, lx, ly, amplitude, sharpness),
        InitialConfig::ShearLayers {
            perturbation,
            sharpness,
        } => shear_layers(nx, ny, lx, ly, perturbation, sharpness),
    }
}

fn axis(n: usize, l: f64) -> Vec<f64> {
    (0..n)
        .map(|i| -l / 2.0 + l * i as f64 / (n - 1) as f64)
        .collect()
}

/// A single Gaussian monopole at the domain centre.
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
        let r2 = xs[i] * xs[i] + ys[j] * ys[j];
        amplitude * (-r2 / (radius * radius)).exp()
    })
}

/// An alternating-sign checkerboard of Gaussian vortices, two per unit
/// length along each axis. The signs cancel pairwise so the field
/// carries no net circulation.
pub fn vortex_soup(
    nx: usize,
    ny: usize,
    lx: f64,
    ly: f64,
    amplitude: f64,
    sharpness: f64,
) -> Array2<f64> {
    let nvx = ((2.0 * lx).round() as usize).max(1);
    let nvy = ((2.0 * ly).round() as usize).max(1);
    let cx: Vec<f64> = (0..nvx)
        .map(|p| lx / 2.0 - (p as f64 + 0.5) * lx / nvx as f64)
        .collect();
    let cy: Vec<f64> = (0..nvy)
        .map(|q| ly / 2.0 - (q as f64 + 0.5) * ly / nvy as f64)
        .collect();

    let xs = axis(nx, lx);
    let ys = axis(ny, ly);
    Array2::from_shape_fn((nx, ny), |(i, j)| {
        let mut w = 0.0;
        for (p, &x0) in cx.iter().enumerate() {
            for (q, &y0) in cy.iter().enumerate() {
                let sign = if (p + q) % 2 == 0 { 1.0 } else { -1.0 };
                let dx = xs[i] - x0;
                let dy = ys[j] - y0;
                w += sign * amplitude * (-sharpness * (dx * dx + dy * dy)).exp();
            }
        }
        w
    })
}

/// Two opposite-signed shear layers at y = -Ly/4 and y = +Ly/4, with a
/// sinusoidal perturbation along x to trigger the Kelvin-Helmholtz
/// roll-up.
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
        let lower = (-sharpness * (ys[j] + ly / 4.0).powi(2)).exp();
        let upper = (-sharpness * (ys[j] - ly / 4.0).powi(2)).exp();
        envelope * (lower - upper)
    })
}
