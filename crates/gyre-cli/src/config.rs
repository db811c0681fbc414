//! TOML configuration deserialisation for simulation jobs.

use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub domain: DomainConfig,
    pub simulation: SimulationConfig,
    pub initial: InitialConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Physical domain and flow parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct DomainConfig {
    /// Periodic extent in x.
    pub lx: f64,
    /// Periodic extent in y.
    pub ly: f64,
    /// Reynolds number.
    pub re: f64,
    #[serde(default = "default_cfl")]
    pub cfl: f64,
}

/// Time-marching parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    /// Number of adaptive steps to take.
    pub steps: usize,
    /// Compute backend: "serial" or "parallel". Default: "serial".
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Progress log interval in steps.
    #[serde(default = "default_log_every")]
    pub log_every: usize,
}

fn default_cfl() -> f64 {
    0.2
}
fn default_backend() -> String {
    "serial".into()
}
fn default_log_every() -> usize {
    100
}

/// Initial vorticity distribution.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialConfig {
    /// A single Gaussian monopole at the domain centre.
    GaussianVortex {
        #[serde(default = "default_amplitude")]
        amplitude: f64,
        #[serde(default = "default_radius")]
        radius: f64,
    },
    /// An alternating-sign lattice of Gaussian vortices.
    VortexSoup {
        #[serde(default = "default_soup_amplitude")]
        amplitude: f64,
        #[serde(default = "default_soup_sharpness")]
        sharpness: f64,
    },
    /// Two opposite-signed shear layers with a sinusoidal perturbation.
    ShearLayers {
        #[serde(default = "default_perturbation")]
        perturbation: f64,
        #[serde(default = "default_layer_sharpness")]
        sharpness: f64,
    },
}

fn default_amplitude() -> f64 {
    1.0
}
fn default_radius() -> f64 {
    0.3
}
fn default_soup_amplitude() -> f64 {
    2.0
}
fn default_soup_sharpness() -> f64 {
    30.0
}
fn default_perturbation() -> f64 {
    0.1
}
fn default_layer_sharpness() -> f64 {
    300.0
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the diagnostic time series as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_timeseries: bool,
    /// Whether to save the final vorticity field as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_final_field: bool,
    /// Save an intermediate vorticity snapshot every N steps (default: off).
    #[serde(default)]
    pub snapshot_every: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_timeseries: true,
            save_final_field: true,
            snapshot_every: 0,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: JobConfig = toml::from_str(&content)?;
    Ok(config)
}
