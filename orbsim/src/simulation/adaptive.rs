//! Adaptive step-size controller
//!
//! Advances a `System` from `t = 0` to `max_time`, choosing each step so a
//! per-step error estimate stays under the relative tolerance. Two estimates
//! of the same endpoint are formed, either by step doubling with RK4 (one
//! step of `dt` against two of `dt/2`) or by the embedded Fehlberg 4(5)
//! pair. The finer estimate is kept when the step is accepted.
//!
//! Error scale (floored policy):
//!
//! err = max_k |fine_k - coarse_k| / (rtol * |coarse_k| + absolute_floor)
//!
//! taken over `x, y, u, v` of every body. A step is accepted when
//! `err <= 1`. The next trial step is
//! `dt * clamp(safety * err^(-p), min_factor, max_factor)`.
//!
//! Rejected attempts are bounded by `max_retries`; exceeding it aborts the
//! run with [`SimError::StepSizeUnderflow`] instead of looping forever.

use log::{debug, info, warn};

use crate::error::{SimError, SimResult};

use super::forces::AccelSet;
use super::integrator::{rk4_step, rkf45_step, RKF45_STAGES};
use super::params::AdaptiveParams;
use super::states::System;
use super::trajectory::Trajectory;

/// How the two endpoint estimates are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorEstimator {
    /// One RK4 step of `dt` against two RK4 steps of `dt/2`
    #[default]
    StepDoubling,
    /// Fehlberg 4(5) embedded pair from one 6-stage evaluation
    EmbeddedRkf45,
}

impl ErrorEstimator {
    /// Controller exponent `p` in `err^(-p)`
    pub fn exponent(self) -> f64 {
        match self {
            ErrorEstimator::StepDoubling => 0.2,
            ErrorEstimator::EmbeddedRkf45 => 0.25,
        }
    }

    pub fn default_safety(self) -> f64 {
        match self {
            ErrorEstimator::StepDoubling => 0.9,
            ErrorEstimator::EmbeddedRkf45 => 0.84,
        }
    }

    /// Right-hand-side evaluations spent on one attempt
    pub fn rhs_evals(self) -> u64 {
        match self {
            ErrorEstimator::StepDoubling => 12,
            ErrorEstimator::EmbeddedRkf45 => RKF45_STAGES as u64,
        }
    }

    /// Returns `(coarse, fine)` estimates of the state after `dt`
    pub fn estimate(self, sys: &System, forces: &AccelSet, dt: f64) -> (System, System) {
        match self {
            ErrorEstimator::StepDoubling => {
                let coarse = rk4_step(sys, forces, dt);
                let half = rk4_step(sys, forces, 0.5 * dt);
                let fine = rk4_step(&half, forces, 0.5 * dt);
                (coarse, fine)
            }
            ErrorEstimator::EmbeddedRkf45 => rkf45_step(sys, forces, dt),
        }
    }
}

/// Step-size controller
///
/// h_new = h * clamp(safety * error^(-exponent), min_factor, max_factor)
#[derive(Debug, Clone)]
pub struct StepController {
    pub safety: f64,
    pub min_factor: f64,
    pub max_factor: f64,
    exponent: f64,
}

impl StepController {
    pub fn new(estimator: ErrorEstimator, params: &AdaptiveParams) -> Self {
        Self {
            safety: params.safety.unwrap_or_else(|| estimator.default_safety()),
            min_factor: params.min_factor,
            max_factor: params.max_factor,
            exponent: estimator.exponent(),
        }
    }

    /// Ratio of the next step to the current one
    pub fn compute_factor(&self, error: f64) -> f64 {
        if error == 0.0 {
            return self.max_factor;
        }
        if !error.is_finite() {
            return self.min_factor;
        }
        let factor = self.safety * error.powf(-self.exponent);
        factor.clamp(self.min_factor, self.max_factor)
    }
}

/// Normalised error between two estimates (floored scale policy)
///
/// A non-finite component in either estimate gives an infinite error, so the
/// step is rejected and retried at `min_factor`.
pub fn relative_error(coarse: &System, fine: &System, rtol: f64, floor: f64) -> f64 {
    coarse
        .iter()
        .zip(fine.iter())
        .flat_map(|(c, f)| c.components().into_iter().zip(f.components()))
        .map(|(c, f)| component_error(c, f, rtol, floor))
        .fold(0.0, f64::max)
}

fn component_error(c: f64, f: f64, rtol: f64, floor: f64) -> f64 {
    let diff = (f - c).abs();
    if diff == 0.0 {
        return 0.0;
    }
    let r = diff / (rtol * c.abs() + floor);
    if r.is_nan() {
        f64::INFINITY
    } else {
        r
    }
}

/// Counters for one adaptive run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub accepted: u64,  // accepted steps
    pub rejected: u64,  // retried attempts
    pub rhs_evals: u64, // force evaluations
}

/// Result of a completed adaptive run
#[derive(Debug, Clone)]
pub struct AdaptiveRun {
    pub trajectory: Trajectory,
    pub stats: Stats,
    /// Size of each accepted step, aligned with `trajectory[1..]`
    pub step_sizes: Vec<f64>,
    /// Normalised error of each accepted step (always `<= 1`)
    pub step_errors: Vec<f64>,
}

/// Error-controlled integrator built on the fixed-step primitives
pub struct AdaptiveIntegrator<'a> {
    forces: &'a AccelSet,
    params: AdaptiveParams,
    estimator: ErrorEstimator,
    controller: StepController,
}

impl<'a> AdaptiveIntegrator<'a> {
    pub fn new(
        forces: &'a AccelSet,
        params: AdaptiveParams,
        estimator: ErrorEstimator,
    ) -> SimResult<Self> {
        params.validate()?;
        let controller = StepController::new(estimator, &params);
        Ok(Self {
            forces,
            params,
            estimator,
            controller,
        })
    }

    pub fn params(&self) -> &AdaptiveParams {
        &self.params
    }

    pub fn estimator(&self) -> ErrorEstimator {
        self.estimator
    }

    /// Try one step of `dt`; returns the fine estimate and its error
    pub fn attempt(&self, sys: &System, dt: f64) -> (System, f64) {
        let (coarse, fine) = self.estimator.estimate(sys, self.forces, dt);
        let err = relative_error(
            &coarse,
            &fine,
            self.params.relative_tolerance,
            self.params.absolute_floor,
        );
        (fine, err)
    }

    /// Integrate `initial` from `t = 0` to `max_time`
    pub fn integrate(&self, initial: System) -> SimResult<AdaptiveRun> {
        let tmax = self.params.max_time;
        info!(
            "adaptive run ({:?}): {} bodies, dt0 = {}, rtol = {:e}, tmax = {}",
            self.estimator,
            initial.len(),
            self.params.initial_step,
            self.params.relative_tolerance,
            tmax
        );

        let mut trajectory = Trajectory::new(initial);
        let mut stats = Stats::default();
        let mut step_sizes = Vec::new();
        let mut step_errors = Vec::new();

        let mut t = 0.0;
        let mut dt_next = self.params.initial_step;

        while t < tmax {
            let mut rejections = 0usize;
            let mut last_err = f64::NAN;

            // retry until accepted or the retry budget is spent
            let (dt, accepted, err) = loop {
                let remaining = tmax - t;
                let dt = dt_next.min(remaining);

                if t + dt <= t {
                    warn!("step size {dt:e} no longer advances t = {t}");
                    return Err(SimError::StepSizeUnderflow {
                        t,
                        dt,
                        error: last_err,
                        attempts: rejections,
                    });
                }

                let (fine, err) = self.attempt(trajectory.back(), dt);
                stats.rhs_evals += self.estimator.rhs_evals();
                last_err = err;
                dt_next = dt * self.controller.compute_factor(err);

                if err <= 1.0 {
                    break (dt, fine, err);
                }

                rejections += 1;
                stats.rejected += 1;
                debug!("t = {t}: rejected dt = {dt:e} (err = {err:e}), retry with {dt_next:e}");

                if rejections > self.params.max_retries {
                    warn!("giving up at t = {t} after {rejections} rejected attempts");
                    return Err(SimError::StepSizeUnderflow {
                        t,
                        dt,
                        error: err,
                        attempts: rejections,
                    });
                }
            };

            // a step clamped to the remaining interval lands exactly on tmax
            t = if dt >= tmax - t { tmax } else { t + dt };

            if !accepted.is_finite() {
                return Err(SimError::NonFiniteState { t });
            }

            trajectory.push(t, accepted);
            stats.accepted += 1;
            step_sizes.push(dt);
            step_errors.push(err);
        }

        info!(
            "adaptive run finished at t = {}: {} accepted, {} rejected, {} rhs evaluations",
            t, stats.accepted, stats.rejected, stats.rhs_evals
        );

        Ok(AdaptiveRun {
            trajectory,
            stats,
            step_sizes,
            step_errors,
        })
    }
}
