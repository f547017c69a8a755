pub mod error;
pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use error::{SimError, SimResult};

pub use simulation::states::{Body, System, NVec2};
pub use simulation::forces::{Acceleration, AccelSet, NewtonianGravity, GRAV_ASTRO, SMALL};
pub use simulation::integrator::{rk4_step, rkf45_step, yoshida_step, integrate_fixed_rk4, YoshidaCoefficients};
pub use simulation::adaptive::{AdaptiveIntegrator, AdaptiveRun, ErrorEstimator, StepController, Stats};
pub use simulation::symplectic::{SymplecticIntegrator, SymplecticRun, Escape};
pub use simulation::params::{AdaptiveParams, SymplecticParams};
pub use simulation::trajectory::Trajectory;
pub use simulation::initial::{PlanetarySystem, kepler_orbit, at_rest};
pub use simulation::engine::{Engine, RunOutcome};
pub use simulation::scenario::Scenario;

pub use configuration::config::{IntegratorConfig, EstimatorConfig, EngineConfig, ParametersConfig, BodyConfig, SystemConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_rhs, bench_integrators};
