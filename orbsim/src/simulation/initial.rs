//! Initial conditions
//!
//! - planetary systems: a star at index 0 plus planets on circular orbits
//!   with seeded random phases, then the star is shifted so the center of
//!   mass sits at rest at the origin
//! - a single Keplerian orbit started at perihelion
//! - explicit body lists (e.g. three stars starting at rest)

use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use crate::error::{require_positive, SimError, SimResult};

use super::states::{Body, NVec2, System};

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 123;

/// A star with planets, plus the values it was built from
#[derive(Debug, Clone)]
pub struct PlanetarySystem {
    pub system: System,
    pub star_mass: f64,
    /// Initial semi-major axes, star first (0.0)
    pub a_initial: Vec<f64>,
    pub seed: u64,
}

impl PlanetarySystem {
    /// Build a star of mass `star_mass` with planets of `masses` at
    /// `semi_major_axes` on circular orbits with random phases
    pub fn new(
        star_mass: f64,
        masses: &[f64],
        semi_major_axes: &[f64],
        seed: u64,
        g: f64,
    ) -> SimResult<Self> {
        if masses.len() != semi_major_axes.len() {
            return Err(SimError::MismatchedPlanets {
                masses: masses.len(),
                axes: semi_major_axes.len(),
            });
        }
        if !(star_mass.is_finite() && star_mass > 0.0) {
            return Err(SimError::NonPositiveStarMass(star_mass));
        }
        for (index, &value) in semi_major_axes.iter().enumerate() {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::NonPositiveSemiMajorAxis { index, value });
            }
        }
        require_positive("G", g)?;

        let mut rng = ChaChaRng::seed_from_u64(seed);

        let mut bodies = Vec::with_capacity(masses.len() + 1);
        bodies.push(Body::new(star_mass, NVec2::zeros(), NVec2::zeros()));

        for (&m, &a) in masses.iter().zip(semi_major_axes) {
            let phi = rng.gen::<f64>() * std::f64::consts::TAU;
            let v_circ = (g * star_mass / a).sqrt();
            let (sin, cos) = phi.sin_cos();
            bodies.push(Body::from_components(
                m,
                a * cos,
                a * sin,
                -v_circ * sin,
                v_circ * cos,
            ));
        }

        let mut system = System::new(bodies);
        center_on_star(&mut system);

        let a_initial = std::iter::once(0.0)
            .chain(semi_major_axes.iter().copied())
            .collect();

        Ok(Self {
            system,
            star_mass,
            a_initial,
            seed,
        })
    }

    pub fn n_planets(&self) -> usize {
        self.system.len() - 1
    }
}

/// Shift body 0 so total mass-weighted position and momentum vanish
///
/// Only body 0 is moved; applied once at construction
pub fn center_on_star(sys: &mut System) {
    let Some(m0) = sys.bodies.first().map(|b| b.m) else {
        return;
    };

    let (mx, mv) = sys
        .iter()
        .fold((NVec2::zeros(), NVec2::zeros()), |(mx, mv), b| {
            (mx + b.m * b.x, mv + b.m * b.v)
        });

    let star = &mut sys.bodies[0];
    star.x -= mx / m0;
    star.v -= mv / m0;
}

/// A star and one planet at perihelion `(0, a(1 - e))` moving along +x
///
/// The star is recentred so the pair's momentum is zero
pub fn kepler_orbit(star_mass: f64, planet_mass: f64, a: f64, e: f64, g: f64) -> SimResult<System> {
    if !(star_mass.is_finite() && star_mass > 0.0) {
        return Err(SimError::NonPositiveStarMass(star_mass));
    }
    if !(a.is_finite() && a > 0.0) {
        return Err(SimError::NonPositiveSemiMajorAxis { index: 0, value: a });
    }
    if !(0.0..1.0).contains(&e) {
        return Err(SimError::InvalidEccentricity(e));
    }
    require_positive("G", g)?;

    let y = a * (1.0 - e);
    let u = ((g * star_mass / a) * (1.0 + e) / (1.0 - e)).sqrt();

    let mut system = System::new(vec![
        Body::new(star_mass, NVec2::zeros(), NVec2::zeros()),
        Body::from_components(planet_mass, 0.0, y, u, 0.0),
    ]);
    center_on_star(&mut system);
    Ok(system)
}

/// Bodies at the given positions, all at rest
pub fn at_rest(masses: &[f64], positions: &[NVec2]) -> SimResult<System> {
    if masses.len() != positions.len() {
        return Err(SimError::config(format!(
            "{} masses but {} positions",
            masses.len(),
            positions.len()
        )));
    }
    Ok(masses
        .iter()
        .zip(positions)
        .map(|(&m, &x)| Body::new(m, x, NVec2::zeros()))
        .collect())
}
