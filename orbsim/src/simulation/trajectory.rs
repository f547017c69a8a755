//! Append-only history of `(time, System)` snapshots
//!
//! The first entry is always the initial condition at `t = 0`; later entries
//! are appended by the owning integrator, one per accepted step, with
//! strictly increasing times.

use crate::simulation::states::System;

#[derive(Debug, Clone)]
pub struct Trajectory {
    times: Vec<f64>,
    systems: Vec<System>,
}

impl Trajectory {
    /// Start a trajectory with `initial` at `t = 0`
    pub fn new(initial: System) -> Self {
        Self {
            times: vec![0.0],
            systems: vec![initial],
        }
    }

    /// Append an accepted step
    pub(crate) fn push(&mut self, t: f64, system: System) {
        debug_assert!(
            t > self.back_time(),
            "trajectory times must increase: {t} <= {}",
            self.back_time()
        );
        self.times.push(t);
        self.systems.push(system);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Never true in practice: the initial snapshot is always present
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn get(&self, n: usize) -> Option<(f64, &System)> {
        Some((*self.times.get(n)?, self.systems.get(n)?))
    }

    pub fn time(&self, n: usize) -> Option<f64> {
        self.times.get(n).copied()
    }

    pub fn system(&self, n: usize) -> Option<&System> {
        self.systems.get(n)
    }

    /// Latest snapshot
    pub fn back(&self) -> &System {
        // non-empty by construction
        &self.systems[self.systems.len() - 1]
    }

    pub fn back_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    pub fn final_time(&self) -> f64 {
        self.back_time()
    }

    pub fn initial(&self) -> &System {
        &self.systems[0]
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn systems(&self) -> &[System] {
        &self.systems
    }

    /// Iterate over `(time, system)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (f64, &System)> + '_ {
        self.times.iter().copied().zip(self.systems.iter())
    }
}
