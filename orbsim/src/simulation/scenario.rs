//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle:
//! - engine selection and its parameters (`Engine`)
//! - the initial system at t = 0 (`System`)
//! - the active force set (`AccelSet`)
//! - the star mass, when the system has a designated star

use log::info;

use crate::configuration::config::{
    BodyConfig, EstimatorConfig, IntegratorConfig, ScenarioConfig, SystemConfig,
};
use crate::error::{SimError, SimResult};
use crate::simulation::adaptive::ErrorEstimator;
use crate::simulation::engine::{Engine, RunOutcome};
use crate::simulation::forces::AccelSet;
use crate::simulation::initial::{kepler_orbit, PlanetarySystem};
use crate::simulation::params::{AdaptiveParams, SymplecticParams};
use crate::simulation::states::{Body, NVec2, System};

pub struct Scenario {
    pub engine: Engine,
    pub system: System,
    pub forces: AccelSet,
    pub g: f64,
    /// Mass of body 0 for planetary and Kepler systems
    pub star_mass: Option<f64>,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> SimResult<Self> {
        let p = cfg.parameters;

        let (system, star_mass) = match cfg.system {
            SystemConfig::Planetary {
                star_mass,
                masses,
                semi_major_axes,
                seed,
            } => {
                let planetary =
                    PlanetarySystem::new(star_mass, &masses, &semi_major_axes, seed, p.g)?;
                (planetary.system, Some(star_mass))
            }
            SystemConfig::Kepler {
                star_mass,
                planet_mass,
                a,
                e,
            } => (kepler_orbit(star_mass, planet_mass, a, e, p.g)?, Some(star_mass)),
            SystemConfig::Bodies { bodies } => {
                if bodies.is_empty() {
                    return Err(SimError::config("system needs at least one body"));
                }
                let bodies = bodies
                    .iter()
                    .enumerate()
                    .map(|(n, bc)| body_from_config(n, bc))
                    .collect::<SimResult<Vec<_>>>()?;
                (System::new(bodies), None)
            }
        };

        let engine = match cfg.engine.integrator {
            IntegratorConfig::Adaptive => {
                let mut params = AdaptiveParams::new(p.h0, p.rtol, p.t_end)
                    .with_absolute_floor(p.atol)
                    .with_max_retries(p.max_retries);
                if let Some(s) = p.safety {
                    params = params.with_safety(s);
                }
                params.validate()?;
                let estimator = match cfg.engine.estimator {
                    EstimatorConfig::StepDoubling => ErrorEstimator::StepDoubling,
                    EstimatorConfig::Rkf45 => ErrorEstimator::EmbeddedRkf45,
                };
                Engine::Adaptive { params, estimator }
            }
            IntegratorConfig::Yoshida => {
                let params =
                    SymplecticParams::new(p.h0, p.t_end).with_escape_radius(p.escape_radius);
                params.validate()?;
                Engine::Yoshida { params }
            }
            IntegratorConfig::Rk4 => Engine::FixedRk4 {
                step: p.h0,
                max_time: p.t_end,
            },
        };

        let forces = AccelSet::gravity(p.g, p.eps2);

        info!("scenario built: {} bodies, G = {}", system.len(), p.g);

        Ok(Self {
            engine,
            system,
            forces,
            g: p.g,
            star_mass,
        })
    }

    /// Run the configured integrator from the initial system
    pub fn run(&self) -> SimResult<RunOutcome> {
        self.engine.run(self.system.clone(), &self.forces)
    }
}

fn body_from_config(n: usize, bc: &BodyConfig) -> SimResult<Body> {
    if !(bc.m.is_finite() && bc.m >= 0.0) {
        return Err(SimError::config(format!(
            "body {n}: mass must be finite and non-negative, got {}",
            bc.m
        )));
    }
    let x = vec2(&bc.x).ok_or_else(|| {
        SimError::config(format!("body {n}: position needs 2 components, got {}", bc.x.len()))
    })?;
    let v = if bc.v.is_empty() {
        NVec2::zeros()
    } else {
        vec2(&bc.v).ok_or_else(|| {
            SimError::config(format!("body {n}: velocity needs 2 components, got {}", bc.v.len()))
        })?
    };
    Ok(Body::new(bc.m, x, v))
}

fn vec2(c: &[f64]) -> Option<NVec2> {
    match c {
        [x, y] => Some(NVec2::new(*x, *y)),
        _ => None,
    }
}
