//! Fixed-step time integrators for the N-body system
//!
//! Single-step primitives shared by the drivers:
//! - classical RK4 (inner primitive of the step-doubling controller),
//! - the Fehlberg 4(5) embedded pair (alternate adaptive estimator),
//! - the 4th order Yoshida drift-kick composition (symplectic path)
//!
//! Every step takes the old `System` by reference and returns a new one.
//! `integrate_fixed_rk4` drives plain RK4 at a constant step as the
//! non-symplectic baseline.

use log::info;

use super::forces::AccelSet;
use super::states::{NVec2, System};
use super::trajectory::Trajectory;

/// Advance `sys` by `dt` with classical 4th-order Runge–Kutta
pub fn rk4_step(sys: &System, forces: &AccelSet, dt: f64) -> System {
    let half_dt = 0.5 * dt;

    let k1 = forces.rhs(sys);
    let k2 = forces.rhs(&sys.add_scaled(&k1, half_dt));
    let k3 = forces.rhs(&sys.add_scaled(&k2, half_dt));
    let k4 = forces.rhs(&sys.add_scaled(&k3, dt));

    // k1 + 2 k2 + 2 k3 + k4
    let sum = k1.add(&k2.scale(2.0)).add(&k3.scale(2.0)).add(&k4);
    sys.add_scaled(&sum, dt / 6.0)
}

/// Number of right-hand-side evaluations in one RKF45 step
pub const RKF45_STAGES: usize = 6;

/// One Runge–Kutta–Fehlberg 4(5) step
///
/// Returns `(y4, y5)`: the 4th and 5th order solutions built from the same
/// six stage evaluations
pub fn rkf45_step(sys: &System, forces: &AccelSet, dt: f64) -> (System, System) {
    let k1 = forces.rhs(sys);

    let y = sys.add_scaled(&k1, dt * 0.25);
    let k2 = forces.rhs(&y);

    let y = sys
        .add_scaled(&k1, dt * 3.0 / 32.0)
        .add_scaled(&k2, dt * 9.0 / 32.0);
    let k3 = forces.rhs(&y);

    let y = sys
        .add_scaled(&k1, dt * 1932.0 / 2197.0)
        .add_scaled(&k2, -dt * 7200.0 / 2197.0)
        .add_scaled(&k3, dt * 7296.0 / 2197.0);
    let k4 = forces.rhs(&y);

    let y = sys
        .add_scaled(&k1, dt * 439.0 / 216.0)
        .add_scaled(&k2, -dt * 8.0)
        .add_scaled(&k3, dt * 3680.0 / 513.0)
        .add_scaled(&k4, -dt * 845.0 / 4104.0);
    let k5 = forces.rhs(&y);

    let y = sys
        .add_scaled(&k1, -dt * 8.0 / 27.0)
        .add_scaled(&k2, dt * 2.0)
        .add_scaled(&k3, -dt * 3544.0 / 2565.0)
        .add_scaled(&k4, dt * 1859.0 / 4104.0)
        .add_scaled(&k5, -dt * 11.0 / 40.0);
    let k6 = forces.rhs(&y);

    let y4 = sys
        .add_scaled(&k1, dt * 25.0 / 216.0)
        .add_scaled(&k3, dt * 1408.0 / 2565.0)
        .add_scaled(&k4, dt * 2197.0 / 4104.0)
        .add_scaled(&k5, -dt * 0.2);

    let y5 = sys
        .add_scaled(&k1, dt * 16.0 / 135.0)
        .add_scaled(&k3, dt * 6656.0 / 12825.0)
        .add_scaled(&k4, dt * 28561.0 / 56430.0)
        .add_scaled(&k5, -dt * 9.0 / 50.0)
        .add_scaled(&k6, dt * 2.0 / 55.0);

    (y4, y5)
}

/// Drift (`c`) and kick (`d`) weights of the 4th order Yoshida composition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoshidaCoefficients {
    pub c: [f64; 4],
    pub d: [f64; 3],
}

impl Default for YoshidaCoefficients {
    fn default() -> Self {
        Self::new()
    }
}

impl YoshidaCoefficients {
    pub fn new() -> Self {
        let cbrt2 = 2.0_f64.cbrt();
        let w0 = -cbrt2 / (2.0 - cbrt2);
        let w1 = 1.0 / (2.0 - cbrt2);

        let c0 = 0.5 * w1;
        let c1 = 0.5 * (w0 + w1);

        Self {
            c: [c0, c1, c1, c0],
            d: [w1, w0, w1],
        }
    }
}

/// Advance `sys` by `dt` with the Yoshida drift-kick-drift composition
///
/// One initial drift by `c[0] dt`, then three stages of
/// kick `v += d[i] dt a(x)` followed by drift `x += c[i+1] dt v`
pub fn yoshida_step(
    sys: &System,
    forces: &AccelSet,
    coeffs: &YoshidaCoefficients,
    dt: f64,
) -> System {
    // the copy is the working state; `sys` stays untouched
    let mut next = sys.clone();

    for b in next.bodies.iter_mut() {
        b.x += coeffs.c[0] * dt * b.v;
    }

    let mut accels = vec![NVec2::zeros(); next.len()];
    for i in 0..3 {
        forces.accumulate_accels(&next, &mut accels);

        for (b, a) in next.bodies.iter_mut().zip(accels.iter()) {
            b.v += coeffs.d[i] * dt * *a;
            b.x += coeffs.c[i + 1] * dt * b.v;
        }
    }

    next
}

/// Integrate with plain RK4 at a fixed step until `tmax`
///
/// Only the final step is shortened so the run lands on `tmax`
pub fn integrate_fixed_rk4(
    initial: System,
    forces: &AccelSet,
    dt: f64,
    tmax: f64,
) -> Trajectory {
    info!("fixed RK4 run: {} bodies, dt = {dt}, tmax = {tmax}", initial.len());

    let mut traj = Trajectory::new(initial);
    let mut t = 0.0;

    while t < tmax && dt > 0.0 {
        let remaining = tmax - t;
        let (h, t_next) = if dt >= remaining {
            (remaining, tmax)
        } else {
            (dt, t + dt)
        };

        let next = rk4_step(traj.back(), forces, h);
        traj.push(t_next, next);
        t = t_next;
    }

    traj
}
