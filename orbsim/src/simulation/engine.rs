//! High-level runtime engine settings
//!
//! Selects which integrator drives a run (adaptive, Yoshida or fixed RK4)
//! and dispatches a `System` to it. Exactly one integrator is used per run.

use crate::error::SimResult;

use super::adaptive::{AdaptiveIntegrator, AdaptiveRun, ErrorEstimator};
use super::forces::AccelSet;
use super::integrator::integrate_fixed_rk4;
use super::params::{AdaptiveParams, SymplecticParams};
use super::states::System;
use super::symplectic::{SymplecticIntegrator, SymplecticRun};
use super::trajectory::Trajectory;

#[derive(Debug, Clone)]
pub enum Engine {
    /// Error-controlled RK (step doubling or RKF45)
    Adaptive {
        params: AdaptiveParams,
        estimator: ErrorEstimator,
    },
    /// Fixed-step Yoshida with escape detection
    Yoshida { params: SymplecticParams },
    /// Plain RK4 at a fixed step
    FixedRk4 { step: f64, max_time: f64 },
}

/// Outcome of one engine run
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Adaptive(AdaptiveRun),
    Yoshida(SymplecticRun),
    FixedRk4(Trajectory),
}

impl RunOutcome {
    pub fn trajectory(&self) -> &Trajectory {
        match self {
            RunOutcome::Adaptive(run) => &run.trajectory,
            RunOutcome::Yoshida(run) => &run.trajectory,
            RunOutcome::FixedRk4(traj) => traj,
        }
    }
}

impl Engine {
    pub fn run(&self, initial: System, forces: &AccelSet) -> SimResult<RunOutcome> {
        match self {
            Engine::Adaptive { params, estimator } => {
                let integrator = AdaptiveIntegrator::new(forces, params.clone(), *estimator)?;
                integrator.integrate(initial).map(RunOutcome::Adaptive)
            }
            Engine::Yoshida { params } => {
                let integrator = SymplecticIntegrator::new(forces, params.clone())?;
                Ok(RunOutcome::Yoshida(integrator.integrate(initial)))
            }
            Engine::FixedRk4 { step, max_time } => {
                crate::error::require_positive("step", *step)?;
                crate::error::require_positive("max_time", *max_time)?;
                Ok(RunOutcome::FixedRk4(integrate_fixed_rk4(
                    initial, forces, *step, *max_time,
                )))
            }
        }
    }
}
