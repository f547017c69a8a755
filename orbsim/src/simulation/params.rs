//! Numerical parameters for the integrators
//!
//! `AdaptiveParams` configures the error-controlled RK controller:
//! - initial step, end time and tolerances (`rtol`, absolute floor),
//! - controller safety factor and per-step growth/shrink clamp,
//! - retry bound before the run aborts with a step-size underflow
//!
//! `SymplecticParams` configures the fixed-step Yoshida run and its escape radius

use crate::error::{require_positive, SimError, SimResult};

/// Default cap on rejected attempts for a single step
pub const DEFAULT_MAX_RETRIES: usize = 64;

/// Default escape radius in length units (AU for planetary systems)
pub const DEFAULT_ESCAPE_RADIUS: f64 = 10_000.0;

#[derive(Debug, Clone)]
pub struct AdaptiveParams {
    pub initial_step: f64,       // first trial step
    pub relative_tolerance: f64, // target per-step relative error
    pub absolute_floor: f64,     // added to the error scale near zero-crossings
    pub max_time: f64,           // end time
    pub safety: Option<f64>,     // controller safety; estimator default when None
    pub min_factor: f64,         // smallest allowed dt_new / dt
    pub max_factor: f64,         // largest allowed dt_new / dt
    pub max_retries: usize,      // rejected attempts allowed per step
}

impl AdaptiveParams {
    pub fn new(initial_step: f64, relative_tolerance: f64, max_time: f64) -> Self {
        Self {
            initial_step,
            relative_tolerance,
            absolute_floor: 1.0e-10,
            max_time,
            safety: None,
            min_factor: 0.25,
            max_factor: 4.0,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_absolute_floor(mut self, floor: f64) -> Self {
        self.absolute_floor = floor;
        self
    }

    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_safety(mut self, safety: f64) -> Self {
        self.safety = Some(safety);
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        require_positive("initial_step", self.initial_step)?;
        require_positive("relative_tolerance", self.relative_tolerance)?;
        require_positive("max_time", self.max_time)?;
        require_positive("min_factor", self.min_factor)?;
        require_positive("max_factor", self.max_factor)?;
        if self.min_factor > self.max_factor {
            return Err(SimError::InvalidParameter {
                name: "max_factor",
                value: self.max_factor,
            });
        }
        if let Some(s) = self.safety {
            require_positive("safety", s)?;
        }
        // zero floor is allowed, negative is not
        if !(self.absolute_floor.is_finite() && self.absolute_floor >= 0.0) {
            return Err(SimError::InvalidParameter {
                name: "absolute_floor",
                value: self.absolute_floor,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SymplecticParams {
    pub step: f64,          // fixed step size
    pub max_time: f64,      // end time
    pub escape_radius: f64, // distance from body 0 that ends the run
}

impl SymplecticParams {
    pub fn new(step: f64, max_time: f64) -> Self {
        Self {
            step,
            max_time,
            escape_radius: DEFAULT_ESCAPE_RADIUS,
        }
    }

    pub fn with_escape_radius(mut self, radius: f64) -> Self {
        self.escape_radius = radius;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        require_positive("step", self.step)?;
        require_positive("max_time", self.max_time)?;
        require_positive("escape_radius", self.escape_radius)?;
        Ok(())
    }
}
