//! Read-only diagnostics on a single snapshot
//!
//! Energy is reported without softening; only the force evaluation is
//! softened. Hill separation treats body 0 as the star.

use super::states::{NVec2, System};
use super::trajectory::Trajectory;

pub fn kinetic_energy(sys: &System) -> f64 {
    sys.iter().map(|b| 0.5 * b.m * b.v.norm_squared()).sum()
}

/// Unsoftened pairwise potential `sum_{i<j} -g m_i m_j / r_ij`
pub fn potential_energy(sys: &System, g: f64) -> f64 {
    let bodies = &sys.bodies;
    let mut pe = 0.0;
    for i in 0..bodies.len() {
        for j in 0..i {
            let r = (bodies[i].x - bodies[j].x).norm();
            pe -= g * bodies[i].m * bodies[j].m / r;
        }
    }
    pe
}

/// Total mechanical energy
pub fn energy(sys: &System, g: f64) -> f64 {
    kinetic_energy(sys) + potential_energy(sys, g)
}

/// `|E - E0| / |E0|`
pub fn relative_energy_error(sys: &System, g: f64, e0: f64) -> f64 {
    ((energy(sys, g) - e0) / e0).abs()
}

/// Mass-weighted mean position
pub fn center_of_mass(sys: &System) -> NVec2 {
    let m_tot = sys.total_mass();
    let weighted = sys.iter().fold(NVec2::zeros(), |acc, b| acc + b.m * b.x);
    weighted / m_tot
}

pub fn total_momentum(sys: &System) -> NVec2 {
    sys.iter().fold(NVec2::zeros(), |acc, b| acc + b.m * b.v)
}

/// z-component of the total angular momentum about the origin
pub fn angular_momentum(sys: &System) -> f64 {
    sys.iter()
        .map(|b| b.m * (b.x.x * b.v.y - b.x.y * b.v.x))
        .sum()
}

/// Minimum mutual-Hill-radius separation over all pairs of non-star bodies
///
/// For planets p1, p2 at distances a1, a2 from body 0,
/// `r_hill = (a1 + a2)/2 * cbrt((m1 + m2) / (3 M))` and the separation is
/// `|a2 - a1| / r_hill`. Returns `None` with fewer than two planets.
pub fn hill_separation(sys: &System, star_mass: f64) -> Option<f64> {
    let (star, planets) = sys.bodies.split_first()?;
    if planets.len() < 2 {
        return None;
    }

    let radii: Vec<f64> = planets.iter().map(|p| (p.x - star.x).norm()).collect();

    let mut h_sep = f64::INFINITY;
    for p1 in 0..planets.len() {
        for p2 in 0..p1 {
            let (a1, a2) = (radii[p1], radii[p2]);
            let r_hill = 0.5 * (a1 + a2)
                * ((planets[p1].m + planets[p2].m) / (3.0 * star_mass)).cbrt();
            h_sep = h_sep.min((a2 - a1).abs() / r_hill);
        }
    }
    Some(h_sep)
}

/// Keplerian period `sqrt(a^3 / M)` in years for AU and solar masses
pub fn orbital_period(a: f64, star_mass: f64) -> f64 {
    (a.powi(3) / star_mass).sqrt()
}

/// Star (body 0) x-velocity through time, the line-of-sight radial velocity
pub fn star_radial_velocity(traj: &Trajectory) -> Vec<(f64, f64)> {
    traj.iter()
        .filter_map(|(t, sys)| sys.bodies.first().map(|star| (t, star.v.x)))
        .collect()
}

/// Energy of every snapshot in a trajectory
pub fn energy_series(traj: &Trajectory, g: f64) -> Vec<f64> {
    traj.systems().iter().map(|s| energy(s, g)).collect()
}
