//! Core parameter types shared across the gyre framework.

use serde::{Deserialize, Serialize};

use crate::solver::SolverError;

/// Physical and numerical parameters of a simulation run.
///
/// Fixed at construction, immutable afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverParams {
    /// Box length in the x direction.
    pub lx: f64,
    /// Box length in the y direction.
    pub ly: f64,
    /// Reynolds number based on the box scale.
    pub re: f64,
    /// Courant number bounding the adaptive time step. Typically < 1.
    pub cfl: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            lx: 2.0,
            ly: 2.0,
            re: 10_000.0,
            cfl: 0.2,
        }
    }
}

impl SolverParams {
    /// Create a validated parameter set.
    pub fn new(lx: f64, ly: f64, re: f64, cfl: f64) -> Result<Self, SolverError> {
        let params = Self { lx, ly, re, cfl };
        params.validate()?;
        Ok(params)
    }

    /// Every parameter must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), SolverError> {
        for (name, value) in [
            ("Lx", self.lx),
            ("Ly", self.ly),
            ("Re", self.re),
            ("CFL", self.cfl),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SolverError::InvalidParameter(format!(
                    "{name} must be finite and strictly positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        assert!(SolverParams::default().validate().is_ok());
    }

    #[test]
    fn non_positive_params_are_rejected() {
        for bad in [
            SolverParams { lx: 0.0, ..Default::default() },
            SolverParams { ly: -1.0, ..Default::default() },
            SolverParams { re: 0.0, ..Default::default() },
            SolverParams { cfl: -0.2, ..Default::default() },
            SolverParams { re: f64::NAN, ..Default::default() },
            SolverParams { lx: f64::INFINITY, ..Default::default() },
        ] {
            assert!(matches!(
                bad.validate(),
                Err(SolverError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn new_rejects_bad_arguments() {
        assert!(SolverParams::new(2.0, 2.0, 10_000.0, 0.2).is_ok());
        assert!(SolverParams::new(2.0, 2.0, -10.0, 0.2).is_err());
    }
}
