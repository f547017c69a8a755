//! Configuration types for loading simulation scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`EngineConfig`]     – which integrator drives the run
//! - [`ParametersConfig`] – step sizes, tolerances and physical constants
//! - [`SystemConfig`]     – how the initial system is built
//! - [`ScenarioConfig`]   – top-level wrapper loaded from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   integrator: "yoshida"     # "adaptive", "yoshida" or "rk4"
//!   estimator: "step_doubling" # adaptive only: or "rkf45"
//!
//! parameters:
//!   t_end: 50000.0            # total simulation time
//!   h0: 0.05                  # initial (adaptive) or fixed step size
//!   rtol: 1.0e-8              # relative error tolerance
//!   atol: 1.0e-10             # absolute floor of the error scale
//!   max_retries: 64           # rejected attempts before giving up
//!   escape_radius: 1000.0     # yoshida only
//!   eps2: 1.0e-30             # softening
//!   G: 39.47841760435743      # gravitational constant (4 pi^2)
//!
//! system:
//!   kind: planetary
//!   star_mass: 1.5
//!   masses: [0.0054, 0.0074, 0.0071]
//!   semi_major_axes: [71.6, 41.4, 16.3]
//!   seed: 123
//! ```
//!
//! `system.kind` may also be `kepler` (`star_mass`, `planet_mass`, `a`, `e`)
//! or `bodies` (an explicit list of `{m, x: [x, y], v: [u, v]}`).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::SimResult;
use crate::simulation::forces::{GRAV_ASTRO, SMALL};
use crate::simulation::initial::DEFAULT_SEED;
use crate::simulation::params::{DEFAULT_ESCAPE_RADIUS, DEFAULT_MAX_RETRIES};

/// Which integrator drives the run
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorConfig {
    #[serde(rename = "adaptive")] // error-controlled RK, adaptive step
    Adaptive,

    #[serde(rename = "yoshida")] // 4th order symplectic, fixed step, escape detection
    Yoshida,

    #[serde(rename = "rk4")] // classical RK4 at a fixed step, not symplectic
    Rk4,
}

/// Error estimator used by the adaptive integrator
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EstimatorConfig {
    #[default]
    #[serde(rename = "step_doubling")]
    StepDoubling,

    #[serde(rename = "rkf45")]
    Rkf45,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
}

/// Numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub t_end: f64, // time end
    pub h0: f64,    // initial or fixed step size
    #[serde(default = "default_rtol")]
    pub rtol: f64, // relative error tolerance
    #[serde(default = "default_atol")]
    pub atol: f64, // absolute floor of the error scale
    #[serde(default)]
    pub safety: Option<f64>, // controller safety factor
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_escape_radius")]
    pub escape_radius: f64,
    #[serde(default = "default_eps2")]
    pub eps2: f64, // softening
    #[serde(rename = "G", default = "default_g")]
    pub g: f64, // gravitational constant
}

fn default_rtol() -> f64 {
    1.0e-8
}

fn default_atol() -> f64 {
    1.0e-10
}

fn default_max_retries() -> usize {
    DEFAULT_MAX_RETRIES
}

fn default_escape_radius() -> f64 {
    DEFAULT_ESCAPE_RADIUS
}

fn default_eps2() -> f64 {
    SMALL
}

fn default_g() -> f64 {
    GRAV_ASTRO
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

/// One body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub m: f64,      // mass
    pub x: Vec<f64>, // position [x, y]
    #[serde(default)]
    pub v: Vec<f64>, // velocity [u, v]; at rest when omitted
}

/// How the initial system is built
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SystemConfig {
    /// Star plus planets on circular orbits with seeded phases
    Planetary {
        star_mass: f64,
        masses: Vec<f64>,
        semi_major_axes: Vec<f64>,
        #[serde(default = "default_seed")]
        seed: u64,
    },
    /// Star plus one planet started at perihelion
    Kepler {
        star_mass: f64,
        #[serde(default)]
        planet_mass: f64,
        a: f64,
        e: f64,
    },
    /// Explicit body list
    Bodies { bodies: Vec<BodyConfig> },
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub system: SystemConfig,
}

impl ScenarioConfig {
    pub fn from_path(path: impl AsRef<Path>) -> SimResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_yaml_str(s: &str) -> SimResult<Self> {
        Ok(serde_yaml::from_str(s)?)
    }
}
