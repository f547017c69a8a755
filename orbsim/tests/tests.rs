use approx::{assert_abs_diff_eq, assert_relative_eq};
use proptest::prelude::*;

use orbsim::simulation::diagnostics::{
    angular_momentum, center_of_mass, energy, energy_series, hill_separation, orbital_period,
    relative_energy_error, star_radial_velocity, total_momentum,
};
use orbsim::simulation::symplectic::detect_escape;
use orbsim::{
    at_rest, integrate_fixed_rk4, kepler_orbit, rk4_step, yoshida_step, AccelSet,
    AdaptiveIntegrator, AdaptiveParams, Body, ErrorEstimator, NVec2, PlanetarySystem, SimError,
    SymplecticIntegrator, SymplecticParams, System, Trajectory, YoshidaCoefficients, GRAV_ASTRO,
    SMALL,
};

/// Build a simple 2-body System separated along the x-axis, at rest
pub fn two_body_system(dist: f64, m1: f64, m2: f64) -> System {
    System::new(vec![
        Body::from_components(m1, -dist / 2.0, 0.0, 0.0, 0.0),
        Body::from_components(m2, dist / 2.0, 0.0, 0.0, 0.0),
    ])
}

/// The reference four-body planetary system
pub fn reference_planets() -> PlanetarySystem {
    PlanetarySystem::new(
        1.5,
        &[0.0054, 0.0074, 0.0071],
        &[71.6, 41.4, 16.3],
        123,
        GRAV_ASTRO,
    )
    .expect("valid planetary system")
}

pub fn astro_gravity() -> AccelSet {
    AccelSet::gravity(GRAV_ASTRO, SMALL)
}

/// Planet position relative to the star
fn relative_position(sys: &System) -> NVec2 {
    sys.bodies[1].x - sys.bodies[0].x
}

// ==================================================================================
// State algebra tests
// ==================================================================================

#[test]
fn algebra_carries_mass_through() {
    let a = System::new(vec![Body::from_components(2.0, 1.0, 2.0, 3.0, 4.0)]);
    let b = System::new(vec![Body::from_components(7.0, 0.5, 0.5, 0.5, 0.5)]);

    let sum = a.add(&b);
    assert_eq!(sum.bodies[0].m, 2.0);
    assert_eq!(sum.bodies[0].components(), [1.5, 2.5, 3.5, 4.5]);

    let diff = a.sub(&b);
    assert_eq!(diff.bodies[0].components(), [0.5, 1.5, 2.5, 3.5]);

    let scaled = a.scale(-2.0);
    assert_eq!(scaled.bodies[0].m, 2.0);
    assert_eq!(scaled.bodies[0].components(), [-2.0, -4.0, -6.0, -8.0]);
}

#[test]
fn add_scaled_matches_add_of_scale() {
    let a = reference_planets().system;
    let d = astro_gravity().rhs(&a);

    let fused = a.add_scaled(&d, 0.3);
    let composed = a.add(&d.scale(0.3));

    for (f, c) in fused.iter().zip(composed.iter()) {
        for (x, y) in f.components().iter().zip(c.components()) {
            assert_relative_eq!(*x, y, max_relative = 1e-14);
        }
    }
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let sys = two_body_system(1.0, 2.0, 3.0);
    let forces = AccelSet::gravity(0.1, 0.0);

    let acc = forces.accels(&sys);
    let net = acc[0] * sys.bodies[0].m + acc[1] * sys.bodies[1].m;

    assert!(net.norm() < 1e-12, "Net momentum not zero: {:?}", net);
}

#[test]
fn gravity_points_toward_other_body() {
    let sys = two_body_system(2.0, 1.0, 1.0);
    let acc = AccelSet::gravity(1.0, SMALL).accels(&sys);

    let dx = sys.bodies[1].x - sys.bodies[0].x;
    assert!(acc[0].dot(&dx) > 0.0, "Acceleration is not toward second body");
    assert!(acc[1].dot(&dx) < 0.0);
}

#[test]
fn gravity_inverse_square_law() {
    let forces = AccelSet::gravity(1.0, SMALL);
    let acc_r = forces.accels(&two_body_system(1.0, 1.0, 1.0));
    let acc_2r = forces.accels(&two_body_system(2.0, 1.0, 1.0));

    let ratio = acc_r[0].norm() / acc_2r[0].norm();
    assert_relative_eq!(ratio, 4.0, max_relative = 1e-12);
}

#[test]
fn gravity_magnitude_matches_newton() {
    // G m / r^2 with G = 1, m = 3, r = 2
    let acc = AccelSet::gravity(1.0, SMALL).accels(&two_body_system(2.0, 1.0, 3.0));
    assert_relative_eq!(acc[0].x, 0.75, max_relative = 1e-12);
    assert_relative_eq!(acc[1].x, -0.25, max_relative = 1e-12);
}

#[test]
fn gravity_softening_keeps_coincident_bodies_finite() {
    let sys = two_body_system(0.0, 1.0, 1.0);
    let acc = AccelSet::gravity(1.0, SMALL).accels(&sys);
    assert!(acc.iter().all(|a| a.x.is_finite() && a.y.is_finite()));

    let near = two_body_system(1e-9, 1.0, 1.0);
    let acc = AccelSet::gravity(1.0, 0.1).accels(&near);
    assert!(acc[0].norm() < 1e9, "Softening failed; acceleration too large");
}

#[test]
fn rhs_puts_velocity_in_position_slot() {
    let sys = reference_planets().system;
    let forces = astro_gravity();
    let deriv = forces.rhs(&sys);
    let accels = forces.accels(&sys);

    for ((b, d), a) in sys.iter().zip(deriv.iter()).zip(accels.iter()) {
        assert_eq!(d.m, b.m);
        assert_eq!(d.x, b.v);
        assert_eq!(d.v, *a);
    }
}

fn arbitrary_system() -> impl Strategy<Value = System> {
    prop::collection::vec((0.1f64..10.0, -10.0f64..10.0, -10.0f64..10.0), 2..8).prop_map(|v| {
        v.into_iter()
            .map(|(m, x, y)| Body::from_components(m, x, y, 0.0, 0.0))
            .collect()
    })
}

proptest! {
    #[test]
    fn net_force_vanishes(sys in arbitrary_system()) {
        let acc = AccelSet::gravity(GRAV_ASTRO, SMALL).accels(&sys);

        let mut net = NVec2::zeros();
        let mut scale = 0.0;
        for (b, a) in sys.iter().zip(acc.iter()) {
            net += b.m * a;
            scale += b.m * a.norm();
        }
        prop_assert!(net.norm() <= 1e-10 * scale + 1e-12, "net = {:?}, scale = {}", net, scale);
    }
}

// ==================================================================================
// Fixed-step RK4 tests
// ==================================================================================

#[test]
fn rk4_zero_step_is_identity() {
    let sys = reference_planets().system;
    let next = rk4_step(&sys, &astro_gravity(), 0.0);
    assert_eq!(next, sys);
}

#[test]
fn rk4_circular_orbit_returns_after_one_period() {
    // massless planet: the star stays fixed and the period is exactly 1
    let sys = kepler_orbit(1.0, 0.0, 1.0, 0.0, GRAV_ASTRO).unwrap();
    let traj = integrate_fixed_rk4(sys, &astro_gravity(), 1.0 / 200.0, 1.0);

    assert_eq!(traj.final_time(), 1.0);
    let start = relative_position(traj.initial());
    let end = relative_position(traj.back());
    assert!((end - start).norm() < 1e-5, "drifted by {}", (end - start).norm());
}

// ==================================================================================
// Yoshida tests
// ==================================================================================

#[test]
fn yoshida_coefficients_are_consistent() {
    let c = YoshidaCoefficients::new();
    assert_relative_eq!(c.c.iter().sum::<f64>(), 1.0, max_relative = 1e-14);
    assert_relative_eq!(c.d.iter().sum::<f64>(), 1.0, max_relative = 1e-14);
    assert_eq!(c.c[0], c.c[3]);
    assert_eq!(c.c[1], c.c[2]);
    assert_eq!(c.d[0], c.d[2]);
    assert!(c.d[1] < 0.0);
}

#[test]
fn yoshida_step_leaves_input_untouched() {
    let sys = reference_planets().system;
    let before = sys.clone();
    let next = yoshida_step(&sys, &astro_gravity(), &YoshidaCoefficients::new(), 0.05);
    assert_eq!(sys, before);
    assert_ne!(next, sys);
}

#[test]
fn yoshida_energy_stays_bounded() {
    let sys = reference_planets().system;
    let forces = astro_gravity();
    let params = SymplecticParams::new(0.05, 200.0);
    let run = SymplecticIntegrator::new(&forces, params).unwrap().integrate(sys);

    assert!(!run.escaped());
    assert_eq!(run.trajectory.final_time(), 200.0);

    let e0 = energy(run.trajectory.initial(), GRAV_ASTRO);
    let errors: Vec<f64> = energy_series(&run.trajectory, GRAV_ASTRO)
        .iter()
        .map(|e| ((e - e0) / e0).abs())
        .collect();

    let half = errors.len() / 2;
    let first = errors[..half].iter().cloned().fold(0.0, f64::max);
    let second = errors[half..].iter().cloned().fold(0.0, f64::max);

    assert!(first < 1e-6 && second < 1e-6, "energy error {first:e} / {second:e}");
    // oscillation, not secular drift
    assert!(second < 10.0 * first + 1e-12);
}

fn max_energy_drift(traj: &Trajectory) -> f64 {
    let e0 = energy(traj.initial(), GRAV_ASTRO);
    energy_series(traj, GRAV_ASTRO)
        .iter()
        .map(|e| ((e - e0) / e0).abs())
        .fold(0.0, f64::max)
}

#[test]
fn rk4_drifts_more_than_yoshida() {
    let sys = reference_planets().system;
    let forces = astro_gravity();
    let (dt, tmax) = (0.5, 5000.0);

    let rk4 = integrate_fixed_rk4(sys.clone(), &forces, dt, tmax);
    let yoshida = SymplecticIntegrator::new(&forces, SymplecticParams::new(dt, tmax))
        .unwrap()
        .integrate(sys);

    assert!(!yoshida.escaped());
    assert_eq!(rk4.final_time(), tmax);
    assert_eq!(yoshida.trajectory.final_time(), tmax);

    let rk4_drift = max_energy_drift(&rk4);
    let yoshida_drift = max_energy_drift(&yoshida.trajectory);
    assert!(
        rk4_drift > yoshida_drift,
        "rk4 {rk4_drift:e} vs yoshida {yoshida_drift:e}"
    );
}

#[test]
fn yoshida_conserves_momentum_and_angular_momentum() {
    let sys = reference_planets().system;
    let l0 = angular_momentum(&sys);
    let forces = astro_gravity();
    let run = SymplecticIntegrator::new(&forces, SymplecticParams::new(0.05, 50.0))
        .unwrap()
        .integrate(sys);

    let last = run.trajectory.back();
    assert!(total_momentum(last).norm() < 1e-12);
    assert_relative_eq!(angular_momentum(last), l0, max_relative = 1e-10);
}

#[test]
fn escape_ends_run_early() {
    let star = Body::from_components(1.0, 0.0, 0.0, 0.0, 0.0);
    let planet = Body::from_components(1e-6, 1.0, 0.0, 100.0, 0.0);
    let sys = System::new(vec![star, planet]);

    let forces = astro_gravity();
    let params = SymplecticParams::new(0.01, 10.0).with_escape_radius(10.0);
    let run = SymplecticIntegrator::new(&forces, params).unwrap().integrate(sys);

    let esc = run.escape.expect("planet should escape");
    assert_eq!(esc.body, 1);
    assert!(esc.distance > 10.0);
    assert!(run.steps <= 12, "took {} steps", run.steps);
    assert!(run.trajectory.final_time() < 10.0);
    assert_eq!(run.trajectory.final_time(), esc.time);
    assert_eq!(run.trajectory.len() as u64, run.steps + 1);
}

#[test]
fn escape_is_measured_from_the_star() {
    let sys = System::new(vec![
        Body::from_components(1.0, 50.0, 0.0, 0.0, 0.0),
        Body::from_components(1e-3, 55.0, 0.0, 0.0, 0.0),
    ]);
    assert_eq!(detect_escape(&sys, 10.0), None);
    assert_eq!(detect_escape(&sys, 4.0).map(|(n, _)| n), Some(1));
}

// ==================================================================================
// Adaptive tests
// ==================================================================================

fn kepler_round_trip(estimator: ErrorEstimator, rtol: f64) {
    let (m_star, m_planet, a) = (1.0, 1e-9, 1.0);
    let sys = kepler_orbit(m_star, m_planet, a, 0.5, GRAV_ASTRO).unwrap();
    let period = orbital_period(a, m_star + m_planet);

    let forces = astro_gravity();
    let params = AdaptiveParams::new(0.01, rtol, period);
    let run = AdaptiveIntegrator::new(&forces, params, estimator)
        .unwrap()
        .integrate(sys)
        .unwrap();

    let traj = &run.trajectory;
    assert_eq!(traj.final_time(), period);
    assert_eq!(traj.len() as u64, run.stats.accepted + 1);
    assert_eq!(run.step_errors.len(), traj.len() - 1);
    assert!(run.step_errors.iter().all(|&e| e <= 1.0));
    assert!(traj.times().windows(2).all(|w| w[1] > w[0]));

    let start = relative_position(traj.initial());
    let end = relative_position(traj.back());
    assert!((end - start).norm() < 1e-4, "missed by {}", (end - start).norm());

    let e0 = energy(traj.initial(), GRAV_ASTRO);
    assert!(relative_energy_error(traj.back(), GRAV_ASTRO, e0) < 1e-5);
}

#[test]
fn kepler_round_trip_step_doubling() {
    kepler_round_trip(ErrorEstimator::StepDoubling, 1e-8);
}

#[test]
fn kepler_round_trip_rkf45() {
    kepler_round_trip(ErrorEstimator::EmbeddedRkf45, 1e-8);
}

#[test]
fn adaptive_steps_shrink_near_perihelion() {
    let sys = kepler_orbit(1.0, 1e-6, 1.0, 0.9, GRAV_ASTRO).unwrap();
    let forces = astro_gravity();
    let run = AdaptiveIntegrator::new(
        &forces,
        AdaptiveParams::new(0.01, 1e-8, 1.0),
        ErrorEstimator::StepDoubling,
    )
    .unwrap()
    .integrate(sys)
    .unwrap();

    // the orbit starts at perihelion and reaches aphelion at t = 0.5
    let smallest = run.step_sizes.iter().cloned().fold(f64::INFINITY, f64::min);
    let largest = run.step_sizes.iter().cloned().fold(0.0, f64::max);
    assert!(largest > 10.0 * smallest);
}

#[test]
fn three_body_center_of_mass_stays_put() {
    let sys = at_rest(
        &[150.0, 200.0, 250.0],
        &[NVec2::new(3.0, 1.0), NVec2::new(-1.0, -2.0), NVec2::new(-1.0, 1.0)],
    )
    .unwrap();
    let com0 = center_of_mass(&sys);
    let e0 = energy(&sys, 1.0);

    let forces = AccelSet::gravity(1.0, SMALL);
    let run = AdaptiveIntegrator::new(
        &forces,
        AdaptiveParams::new(0.05, 1e-8, 0.1),
        ErrorEstimator::StepDoubling,
    )
    .unwrap()
    .integrate(sys)
    .unwrap();

    let last = run.trajectory.back();
    let com = center_of_mass(last);
    assert_abs_diff_eq!(com.x, com0.x, epsilon = 1e-8);
    assert_abs_diff_eq!(com.y, com0.y, epsilon = 1e-8);
    assert!(relative_energy_error(last, 1.0, e0) < 1e-6);
}

#[test]
fn exhausted_retries_report_underflow() {
    let sys = kepler_orbit(1.0, 1e-6, 1.0, 0.5, GRAV_ASTRO).unwrap();
    let forces = astro_gravity();
    let params = AdaptiveParams::new(0.5, 1e-10, 1.0).with_max_retries(0);
    let result = AdaptiveIntegrator::new(&forces, params, ErrorEstimator::StepDoubling)
        .unwrap()
        .integrate(sys);

    match result {
        Err(SimError::StepSizeUnderflow { t, dt, error, attempts }) => {
            assert_eq!(t, 0.0);
            assert_eq!(dt, 0.5);
            assert!(error > 1.0);
            assert_eq!(attempts, 1);
        }
        other => panic!("expected underflow, got {other:?}"),
    }
}

#[test]
fn invalid_adaptive_parameters_are_rejected() {
    let forces = astro_gravity();
    let params = AdaptiveParams::new(-0.1, 1e-8, 1.0);
    assert!(matches!(
        AdaptiveIntegrator::new(&forces, params, ErrorEstimator::StepDoubling),
        Err(SimError::InvalidParameter { name: "initial_step", .. })
    ));
}

#[test]
fn inverted_factor_clamp_is_rejected() {
    let forces = astro_gravity();
    let mut params = AdaptiveParams::new(0.1, 1e-8, 1.0);
    params.min_factor = 5.0;
    params.max_factor = 2.0;

    assert!(matches!(
        params.validate(),
        Err(SimError::InvalidParameter { name: "max_factor", value }) if value == 2.0
    ));
    assert!(AdaptiveIntegrator::new(&forces, params, ErrorEstimator::EmbeddedRkf45).is_err());
}

// ==================================================================================
// Planetary construction and diagnostics tests
// ==================================================================================

#[test]
fn planetary_system_is_centred() {
    let planets = reference_planets();
    let sys = &planets.system;

    assert_eq!(sys.len(), 4);
    assert_eq!(planets.n_planets(), 3);
    assert_eq!(planets.a_initial, vec![0.0, 71.6, 41.4, 16.3]);

    let com = center_of_mass(sys);
    assert_abs_diff_eq!(com.x, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(com.y, 0.0, epsilon = 1e-12);
    assert!(total_momentum(sys).norm() < 1e-12);

    // planets keep their circular radius about the origin
    for (body, a) in sys.bodies[1..].iter().zip([71.6, 41.4, 16.3]) {
        assert_relative_eq!(body.x.norm(), a, max_relative = 1e-12);
    }
}

#[test]
fn planetary_hill_separation_is_finite() {
    let planets = reference_planets();
    let h = hill_separation(&planets.system, planets.star_mass).unwrap();
    assert!(h.is_finite() && h > 0.0);
}

#[test]
fn hill_separation_needs_two_planets() {
    let one = PlanetarySystem::new(1.0, &[1e-3], &[1.0], 1, GRAV_ASTRO).unwrap();
    assert_eq!(hill_separation(&one.system, 1.0), None);
}

#[test]
fn hill_separation_matches_hand_value() {
    let sys = System::new(vec![
        Body::from_components(1.0, 0.0, 0.0, 0.0, 0.0),
        Body::from_components(1.5e-3, 1.0, 0.0, 0.0, 0.0),
        Body::from_components(1.5e-3, 0.0, 2.0, 0.0, 0.0),
    ]);
    // r_hill = 1.5 * cbrt(3e-3 / 3) = 0.15
    let h = hill_separation(&sys, 1.0).unwrap();
    assert_relative_eq!(h, 1.0 / 0.15, max_relative = 1e-12);
}

#[test]
fn same_seed_same_system() {
    let a = reference_planets();
    let b = reference_planets();
    assert_eq!(a.system, b.system);

    let c = PlanetarySystem::new(1.5, &[0.0054, 0.0074, 0.0071], &[71.6, 41.4, 16.3], 7, GRAV_ASTRO)
        .unwrap();
    assert_ne!(a.system, c.system);
}

#[test]
fn construction_errors() {
    assert!(matches!(
        PlanetarySystem::new(1.0, &[1e-3, 1e-3], &[1.0], 1, GRAV_ASTRO),
        Err(SimError::MismatchedPlanets { masses: 2, axes: 1 })
    ));
    assert!(matches!(
        PlanetarySystem::new(0.0, &[1e-3], &[1.0], 1, GRAV_ASTRO),
        Err(SimError::NonPositiveStarMass(_))
    ));
    assert!(matches!(
        PlanetarySystem::new(1.0, &[1e-3, 1e-3], &[1.0, -2.0], 1, GRAV_ASTRO),
        Err(SimError::NonPositiveSemiMajorAxis { index: 1, .. })
    ));
    assert!(matches!(
        kepler_orbit(1.0, 0.0, 1.0, 1.0, GRAV_ASTRO),
        Err(SimError::InvalidEccentricity(_))
    ));
}

#[test]
fn energy_of_two_bodies_at_rest() {
    let sys = two_body_system(2.0, 1.0, 1.0);
    assert_relative_eq!(energy(&sys, 1.0), -0.5, max_relative = 1e-15);
}

#[test]
fn reference_scenario_short_run() {
    let planets = reference_planets();
    let forces = astro_gravity();
    let params = SymplecticParams::new(0.05, 100.0).with_escape_radius(1000.0);
    let run = SymplecticIntegrator::new(&forces, params)
        .unwrap()
        .integrate(planets.system);

    let t_end = run.trajectory.final_time();
    assert!(t_end <= 100.0);
    assert!(run.escaped() || t_end == 100.0);

    let rv = star_radial_velocity(&run.trajectory);
    assert_eq!(rv.len(), run.trajectory.len());
    assert_eq!(rv[0].0, 0.0);
}

#[test]
#[ignore = "one million Yoshida steps"]
fn reference_scenario_full_run() {
    let planets = reference_planets();
    let forces = astro_gravity();
    let params = SymplecticParams::new(0.05, 50_000.0).with_escape_radius(1000.0);
    let run = SymplecticIntegrator::new(&forces, params)
        .unwrap()
        .integrate(planets.system);

    let t_end = run.trajectory.final_time();
    assert!(t_end <= 50_000.0);
    if !run.escaped() {
        assert_eq!(t_end, 50_000.0);
    }
}
