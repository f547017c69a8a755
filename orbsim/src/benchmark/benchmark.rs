use std::time::Instant;

use crate::simulation::forces::{AccelSet, GRAV_ASTRO, SMALL};
use crate::simulation::initial::PlanetarySystem;
use crate::simulation::integrator::{rk4_step, rkf45_step, yoshida_step, YoshidaCoefficients};
use crate::simulation::states::{Body, NVec2, System};

/// Helper to build a manual System of size `n`
fn make_system(n: usize) -> System {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            // deterministic positions, no rand needed
            let x = NVec2::new((i_f * 0.37).sin() * 5.0, (i_f * 0.13).cos() * 5.0);
            Body::new(1.0, x, NVec2::zeros())
        })
        .collect()
}

/// Time the direct-sum right-hand side for a range of n
pub fn bench_rhs() {
    let forces = AccelSet::gravity(1.0, SMALL);

    for n in [10, 50, 100, 200, 400, 800] {
        let sys = make_system(n);
        let reps = (200_000 / (n * n)).max(1);

        // Warm up
        let _ = forces.rhs(&sys);

        let t0 = Instant::now();
        for _ in 0..reps {
            let _ = forces.rhs(&sys);
        }
        let per_eval = t0.elapsed().as_secs_f64() / reps as f64;

        println!("N = {n:5}, rhs = {per_eval:10.3e} s");
    }
}

/// Time one step of each integrator on the reference four-body planetary system
pub fn bench_integrators() {
    let planets = match PlanetarySystem::new(
        1.5,
        &[0.0054, 0.0074, 0.0071],
        &[71.6, 41.4, 16.3],
        123,
        GRAV_ASTRO,
    ) {
        Ok(p) => p,
        Err(e) => {
            println!("benchmark setup failed: {e}");
            return;
        }
    };
    let forces = AccelSet::gravity(GRAV_ASTRO, SMALL);
    let coeffs = YoshidaCoefficients::new();
    let dt = 0.05;
    let steps = 20_000;

    let mut sys = planets.system.clone();
    let t0 = Instant::now();
    for _ in 0..steps {
        sys = rk4_step(&sys, &forces, dt);
    }
    let rk4 = t0.elapsed().as_secs_f64() / steps as f64;

    let mut sys = planets.system.clone();
    let t1 = Instant::now();
    for _ in 0..steps {
        sys = rkf45_step(&sys, &forces, dt).1;
    }
    let rkf45 = t1.elapsed().as_secs_f64() / steps as f64;

    let mut sys = planets.system.clone();
    let t2 = Instant::now();
    for _ in 0..steps {
        sys = yoshida_step(&sys, &forces, &coeffs, dt);
    }
    let yoshida = t2.elapsed().as_secs_f64() / steps as f64;

    println!("rk4 step = {rk4:10.3e} s, rkf45 step = {rkf45:10.3e} s, yoshida step = {yoshida:10.3e} s");
}
