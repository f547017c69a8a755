//! Fixed-step Yoshida integration with escape detection
//!
//! Used for long planetary runs where bounded energy error matters more
//! than per-step accuracy. After each step every non-star body is checked
//! against the escape radius (measured from body 0); the first escape ends
//! the run early and is reported alongside the trajectory.

use log::{info, warn};

use crate::error::SimResult;

use super::forces::AccelSet;
use super::integrator::{yoshida_step, YoshidaCoefficients};
use super::params::SymplecticParams;
use super::states::System;
use super::trajectory::Trajectory;

/// A body that crossed the escape radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Escape {
    pub body: usize,   // index into the system
    pub time: f64,     // time of the step that detected it
    pub distance: f64, // distance from body 0 at that time
}

#[derive(Debug, Clone)]
pub struct SymplecticRun {
    pub trajectory: Trajectory,
    pub steps: u64,
    /// `Some` when the run ended early because a body escaped
    pub escape: Option<Escape>,
}

impl SymplecticRun {
    pub fn escaped(&self) -> bool {
        self.escape.is_some()
    }
}

/// First non-star body farther than `radius` from body 0, if any
pub fn detect_escape(sys: &System, radius: f64) -> Option<(usize, f64)> {
    let star = sys.bodies.first()?;
    sys.bodies
        .iter()
        .enumerate()
        .skip(1)
        .map(|(n, b)| (n, (b.x - star.x).norm()))
        .find(|&(_, r)| r > radius)
}

pub struct SymplecticIntegrator<'a> {
    forces: &'a AccelSet,
    params: SymplecticParams,
    coeffs: YoshidaCoefficients,
}

impl<'a> SymplecticIntegrator<'a> {
    pub fn new(forces: &'a AccelSet, params: SymplecticParams) -> SimResult<Self> {
        params.validate()?;
        Ok(Self {
            forces,
            params,
            coeffs: YoshidaCoefficients::new(),
        })
    }

    pub fn params(&self) -> &SymplecticParams {
        &self.params
    }

    pub fn coefficients(&self) -> &YoshidaCoefficients {
        &self.coeffs
    }

    /// Integrate `initial` from `t = 0` to `max_time`, or until an escape
    pub fn integrate(&self, initial: System) -> SymplecticRun {
        let tmax = self.params.max_time;
        let dt = self.params.step;
        info!(
            "yoshida run: {} bodies, dt = {dt}, tmax = {tmax}, escape radius = {}",
            initial.len(),
            self.params.escape_radius
        );

        let mut trajectory = Trajectory::new(initial);
        let mut t = 0.0;
        let mut steps = 0u64;
        let mut escape = None;

        while t < tmax {
            // only the final step is shortened
            let remaining = tmax - t;
            let (h, t_next) = if dt >= remaining {
                (remaining, tmax)
            } else {
                (dt, t + dt)
            };

            let next = yoshida_step(trajectory.back(), self.forces, &self.coeffs, h);
            let escaped = detect_escape(&next, self.params.escape_radius);

            trajectory.push(t_next, next);
            t = t_next;
            steps += 1;

            if let Some((body, distance)) = escaped {
                warn!("body {body} escaped at t = {t} (r = {distance:.3})");
                escape = Some(Escape {
                    body,
                    time: t,
                    distance,
                });
                break;
            }
        }

        info!("yoshida run finished at t = {t} after {steps} steps");

        SymplecticRun {
            trajectory,
            steps,
            escape,
        }
    }
}
