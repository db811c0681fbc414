//! Two-dimensional complex FFT plumbing on top of `rustfft`.

use std::sync::Arc;

use ndarray::{Array2, Axis};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// Cached forward/inverse transform plans for a fixed `(nx, ny)` grid.
///
/// Transforms are complex-to-complex and operate in place. The forward
/// transform is unnormalised and the inverse carries the full
/// `1/(nx·ny)` factor, so a forward/inverse pair is the identity. This
/// matches the convention the spectral operators are written against.
pub struct Fft2d {
    nx: usize,
    ny: usize,
    forward_x: Arc<dyn Fft<f64>>,
    forward_y: Arc<dyn Fft<f64>>,
    inverse_x: Arc<dyn Fft<f64>>,
    inverse_y: Arc<dyn Fft<f64>>,
}

impl Fft2d {
    pub fn new(nx: usize, ny: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            nx,
            ny,
            forward_x: planner.plan_fft_forward(nx),
            forward_y: planner.plan_fft_forward(ny),
            inverse_x: planner.plan_fft_inverse(nx),
            inverse_y: planner.plan_fft_inverse(ny),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// In-place forward transform (unnormalised).
    pub fn forward(&self, field: &mut Array2<Complex64>) {
        transform_axis(field, Axis(0), &self.forward_x);
        transform_axis(field, Axis(1), &self.forward_y);
    }

    /// In-place inverse transform, normalised by `1/(nx·ny)`.
    pub fn inverse(&self, field: &mut Array2<Complex64>) {
        transform_axis(field, Axis(0), &self.inverse_x);
        transform_axis(field, Axis(1), &self.inverse_y);
        let norm = 1.0 / (self.nx * self.ny) as f64;
        field.mapv_inplace(|c| c * norm);
    }
}

/// Run a 1D plan over every lane of `field` pointing along `axis`.
///
/// Lanes are gathered into a contiguous buffer so the same code path
/// handles the contiguous rows and the strided columns alike.
fn transform_axis(field: &mut Array2<Complex64>, axis: Axis, plan: &Arc<dyn Fft<f64>>) {
    let mut lane_buf = vec![Complex64::default(); plan.len()];
    let mut scratch = vec![Complex64::default(); plan.get_inplace_scratch_len()];
    for mut lane in field.lanes_mut(axis) {
        for (b, v) in lane_buf.iter_mut().zip(lane.iter()) {
            *b = *v;
        }
        plan.process_with_scratch(&mut lane_buf, &mut scratch);
        for (v, b) in lane.iter_mut().zip(lane_buf.iter()) {
            *v = *b;
        }
    }
}
