//! Core state types for the N-body engine.
//!
//! A `Body` is a point mass with a 2D position `x = (x, y)` and velocity
//! `v = (u, v)`. A `System` is the ordered list of bodies at one instant;
//! index order is body identity (index 0 is the star for planetary systems).
//!
//! Systems form a vector space over `{x, v}` so integrators can be written
//! as `state + h * derivative`. Mass rides along unchanged. All operations
//! return new values; a stored snapshot is never modified in place.

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub m: f64,   // mass
    pub x: NVec2, // position
    pub v: NVec2, // velocity
}

impl Body {
    pub fn new(m: f64, x: NVec2, v: NVec2) -> Self {
        Self { m, x, v }
    }

    /// Convenience constructor from the scalar components `(x, y, u, v)`
    pub fn from_components(m: f64, x: f64, y: f64, u: f64, v: f64) -> Self {
        Self {
            m,
            x: NVec2::new(x, y),
            v: NVec2::new(u, v),
        }
    }

    /// State components in `(x, y, u, v)` order
    pub fn components(&self) -> [f64; 4] {
        [self.x.x, self.x.y, self.v.x, self.v.y]
    }

    pub fn is_finite(&self) -> bool {
        self.components().iter().all(|c| c.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct System {
    pub bodies: Vec<Body>,
}

impl System {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Body> {
        self.bodies.iter()
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.m).sum()
    }

    /// Component-wise `self + other`; masses are taken from `self`
    ///
    /// Both systems must hold the same number of bodies. Extra bodies in the
    /// longer one are dropped.
    pub fn add(&self, other: &System) -> System {
        self.zip_with(other, |a, b| (a.x + b.x, a.v + b.v))
    }

    /// Component-wise `self - other`; masses are taken from `self`
    ///
    /// Same body-count precondition as [`System::add`].
    pub fn sub(&self, other: &System) -> System {
        self.zip_with(other, |a, b| (a.x - b.x, a.v - b.v))
    }

    /// `c * self` on positions and velocities
    pub fn scale(&self, c: f64) -> System {
        let bodies = self
            .bodies
            .iter()
            .map(|b| Body::new(b.m, c * b.x, c * b.v))
            .collect();
        System { bodies }
    }

    /// Fused `self + h * deriv`, the update every integrator stage uses
    ///
    /// `deriv` must hold as many bodies as `self`; see [`System::add`].
    pub fn add_scaled(&self, deriv: &System, h: f64) -> System {
        self.zip_with(deriv, |a, d| (a.x + h * d.x, a.v + h * d.v))
    }

    /// Largest absolute component over all bodies
    pub fn max_abs_component(&self) -> f64 {
        self.bodies
            .iter()
            .flat_map(|b| b.components())
            .fold(0.0, |acc, c| acc.max(c.abs()))
    }

    pub fn is_finite(&self) -> bool {
        self.bodies.iter().all(Body::is_finite)
    }

    fn zip_with<F>(&self, other: &System, f: F) -> System
    where
        F: Fn(&Body, &Body) -> (NVec2, NVec2),
    {
        debug_assert_eq!(self.len(), other.len(), "systems differ in body count");
        let bodies = self
            .bodies
            .iter()
            .zip(other.bodies.iter())
            .map(|(a, b)| {
                let (x, v) = f(a, b);
                Body::new(a.m, x, v)
            })
            .collect();
        System { bodies }
    }
}

impl FromIterator<Body> for System {
    fn from_iter<I: IntoIterator<Item = Body>>(iter: I) -> Self {
        System {
            bodies: iter.into_iter().collect(),
        }
    }
}
