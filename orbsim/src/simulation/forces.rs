//! Force / acceleration contributors for the n-body engine
//!
//! Defines the [`Acceleration`] trait, the [`AccelSet`] that sums terms,
//! softened direct-sum [`NewtonianGravity`], and the right-hand side
//! `rhs(system)` consumed by every integrator

use crate::simulation::states::{Body, NVec2, System};

/// Gravitational constant in AU, year, solar-mass units: 4 pi^2
pub const GRAV_ASTRO: f64 = 4.0 * std::f64::consts::PI * std::f64::consts::PI;

/// Default softening added to the squared separation
pub const SMALL: f64 = 1.0e-30;

/// Collection of acceleration terms
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per body
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Acceleration set holding only softened Newtonian gravity
    pub fn gravity(g: f64, eps2: f64) -> Self {
        Self::new().with(NewtonianGravity { g, eps2 })
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Compute total accelerations for all bodies in `sys`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(&self, sys: &System, out: &mut [NVec2]) {
        for a in out.iter_mut() {
            *a = NVec2::zeros();
        }
        for term in &self.terms {
            term.acceleration(sys, out);
        }
    }

    /// Accelerations as a freshly allocated vector
    pub fn accels(&self, sys: &System) -> Vec<NVec2> {
        let mut out = vec![NVec2::zeros(); sys.len()];
        self.accumulate_accels(sys, &mut out);
        out
    }

    /// Time derivative of `sys`: each body's position slot holds its
    /// velocity, its velocity slot holds its acceleration
    pub fn rhs(&self, sys: &System) -> System {
        let accels = self.accels(sys);
        sys.iter()
            .zip(accels)
            .map(|(b, a)| Body::new(b.m, b.v, a))
            .collect()
    }
}

/// Trait for acceleration sources operating on [`System`]
/// Implementations add their contribution into `out[i]` for each body
pub trait Acceleration {
    fn acceleration(&self, sys: &System, out: &mut [NVec2]);
}

/// Newtonian gravity with softening
/// `eps2` is added to the squared separation before the square root so
/// coincident bodies give a finite (zero) force instead of a NaN
#[derive(Debug, Clone, Copy)]
pub struct NewtonianGravity {
    pub g: f64,    // gravitational constant
    pub eps2: f64, // softening
}

impl NewtonianGravity {
    pub fn astronomical() -> Self {
        Self {
            g: GRAV_ASTRO,
            eps2: SMALL,
        }
    }
}

impl Acceleration for NewtonianGravity {
    fn acceleration(&self, sys: &System, out: &mut [NVec2]) {
        let n = sys.len();

        // Each unordered pair once; the reaction is applied to j directly
        for i in 0..n {
            let bi = &sys.bodies[i];
            for j in (i + 1)..n {
                let bj = &sys.bodies[j];

                // displacement from i to j: i is pulled along +r, j along -r
                let r = bj.x - bi.x;
                let d2 = r.dot(&r) + self.eps2;

                let inv_r = d2.sqrt().recip();
                let coef = self.g * inv_r * inv_r * inv_r;

                out[i] += coef * bj.m * r;
                out[j] -= coef * bi.m * r;
            }
        }
    }
}
