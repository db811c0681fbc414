//! Simulation runner: ties together configuration, seeding, and the
//! time-marching loop.

use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array2;

use gyre_core::{diagnostics, Backend, Solver, SolverParams};

use crate::config::JobConfig;
use crate::initial;

/// One row of the diagnostic time series.
pub struct DiagnosticSample {
    pub step: usize,
    pub t: f64,
    pub dt: f64,
    pub energy: f64,
    pub enstrophy: f64,
    pub max_vorticity: f64,
}

/// Results from a simulation run.
pub struct SimulationOutput {
    pub timeseries: Vec<DiagnosticSample>,
    pub final_vorticity: Array2<f64>,
    pub final_time: f64,
}

/// Run a full simulation from a parsed job configuration.
pub fn run_simulation(job: &JobConfig, out_dir: &Path) -> Result<SimulationOutput> {
    let backend = parse_backend(&job.simulation.backend)?;
    let params = SolverParams::new(job.domain.lx, job.domain.ly, job.domain.re, job.domain.cfl)?;
    let mut solver = Solver::new(params, backend)?;

    let (nx, ny) = solver.grid_size();
    println!(
        "  Grid: {}x{} (Re={}, CFL={}), backend: {}",
        nx,
        ny,
        job.domain.re,
        job.domain.cfl,
        solver.backend_label()
    );

    let omega0 = initial::build(&job.initial, nx, ny, job.domain.lx, job.domain.ly);
    solver.set_initial(omega0.view())?;

    let log_every = job.simulation.log_every.max(1);
    let mut timeseries = Vec::with_capacity(job.simulation.steps / log_every + 2);
    timeseries.push(sample(&solver, 0));

    for step in 1..=job.simulation.steps {
        solver
            .step()
            .with_context(|| format!("step {step} of {}", job.simulation.steps))?;

        if step % log_every == 0 || step == job.simulation.steps {
            let row = sample(&solver, step);
            log::info!(
                "step {}/{}: t={:.4} dt={:.3e} E={:.4e} Z={:.4e}",
                step,
                job.simulation.steps,
                row.t,
                row.dt,
                row.energy,
                row.enstrophy
            );
            timeseries.push(row);
        }

        if job.output.snapshot_every > 0 && step % job.output.snapshot_every == 0 {
            let path = out_dir.join(format!("vorticity_{step:06}.csv"));
            write_field_csv(&solver.vorticity(), &path, job, solver.time())?;
        }
    }

    Ok(SimulationOutput {
        timeseries,
        final_vorticity: solver.vorticity(),
        final_time: solver.time(),
    })
}

fn sample(solver: &Solver, step: usize) -> DiagnosticSample {
    let (dx, dy) = solver.mesh_spacing();
    let (u, v) = solver.velocities();
    let omega = solver.vorticity();
    DiagnosticSample {
        step,
        t: solver.time(),
        dt: solver.dt(),
        energy: diagnostics::kinetic_energy(u.view(), v.view(), dx, dy),
        enstrophy: diagnostics::enstrophy(omega.view(), dx, dy),
        max_vorticity: diagnostics::max_vorticity(omega.view()),
    }
}

fn parse_backend(name: &str) -> Result<Backend> {
    match name {
        "serial" => Ok(Backend::Serial),
        "parallel" => Ok(Backend::Parallel),
        other => anyhow::bail!(
            "Unknown backend '{}'. Valid backends: serial, parallel",
            other
        ),
    }
}

/// Write the diagnostic time series to a CSV file with a metadata header.
pub fn write_timeseries_csv(
    timeseries: &[DiagnosticSample],
    path: &Path,
    job: &JobConfig,
) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;

    writeln!(file, "# gyre — Diagnostic Time Series")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        file,
        "# domain: Lx={} Ly={} Re={} CFL={}",
        job.domain.lx, job.domain.ly, job.domain.re, job.domain.cfl
    )?;
    writeln!(file, "# backend: {}", job.simulation.backend)?;
    writeln!(file, "#")?;
    writeln!(file, "step,t,dt,energy,enstrophy,max_vorticity")?;

    for row in timeseries {
        writeln!(
            file,
            "{},{:.6e},{:.6e},{:.6e},{:.6e},{:.6e}",
            row.step, row.t, row.dt, row.energy, row.enstrophy, row.max_vorticity
        )?;
    }

    println!("Time series written to: {}", path.display());
    Ok(())
}

/// Write a vorticity field to a CSV file as `x,y,omega` rows.
pub fn write_field_csv(
    omega: &Array2<f64>,
    path: &Path,
    job: &JobConfig,
    t: f64,
) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let (nx, ny) = omega.dim();
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "# gyre — Vorticity Field")?;
    writeln!(file, "# Grid: {}x{}", nx, ny)?;
    writeln!(file, "# t: {:.6e}", t)?;
    writeln!(file, "#")?;
    writeln!(file, "x,y,omega")?;

    for i in 0..nx {
        let x = -job.domain.lx / 2.0 + job.domain.lx * i as f64 / (nx - 1) as f64;
        for j in 0..ny {
            let y = -job.domain.ly / 2.0 + job.domain.ly * j as f64 / (ny - 1) as f64;
            writeln!(file, "{:.6},{:.6},{:.6e}", x, y, omega[[i, j]])?;
        }
    }

    println!("Vorticity field written to: {}", path.display());
    Ok(())
}
