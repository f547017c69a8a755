use orbsim::simulation::diagnostics::{
    center_of_mass, energy, energy_series, hill_separation, relative_energy_error,
};
use orbsim::{bench_integrators, bench_rhs};
use orbsim::{RunOutcome, Scenario, ScenarioConfig, Trajectory};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(about = "Gravitational N-body integration")]
struct Args {
    /// Scenario YAML; bare names are looked up under `scenarios/`
    #[arg(short, default_value = "planetary_stability.yaml")]
    file_name: String,

    /// Write the trajectory as whitespace-separated columns
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run timing loops instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let direct = PathBuf::from(file_name);
    let config_path = if direct.exists() {
        direct
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    ScenarioConfig::from_path(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))
}

/// time, then `m x y u v` per body, then total energy
fn write_trajectory(path: &Path, traj: &Trajectory, g: f64) -> Result<()> {
    let mut of = BufWriter::new(File::create(path)?);

    for (t, sys) in traj.iter() {
        write!(of, "{t:14.6e}")?;
        for b in sys.iter() {
            write!(
                of,
                "{:14.6e}{:14.6e}{:14.6e}{:14.6e}{:14.6e}",
                b.m, b.x.x, b.x.y, b.v.x, b.v.y
            )?;
        }
        writeln!(of, "{:18.10e}", energy(sys, g))?;
    }

    of.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_rhs();
        bench_integrators();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg)?;

    if let Some(m_star) = scenario.star_mass {
        if let Some(h) = hill_separation(&scenario.system, m_star) {
            info!("initial hill separation = {h:.4}");
        }
    }

    let outcome = scenario.run()?;
    let traj = outcome.trajectory();

    match &outcome {
        RunOutcome::Adaptive(run) => info!(
            "{} accepted steps, {} rejected, {} rhs evaluations",
            run.stats.accepted, run.stats.rejected, run.stats.rhs_evals
        ),
        RunOutcome::Yoshida(run) => {
            if let Some(esc) = run.escape {
                info!("body {} escaped at t = {:.4}", esc.body, esc.time);
            }
        }
        RunOutcome::FixedRk4(_) => {}
    }

    let e0 = energy(traj.initial(), scenario.g);
    let com = center_of_mass(traj.back());
    let max_drift = energy_series(traj, scenario.g)
        .iter()
        .map(|e| ((e - e0) / e0).abs())
        .fold(0.0, f64::max);
    info!(
        "number of points = {}, final t = {}, relative energy error = {:.3e}, com = ({:.3e}, {:.3e})",
        traj.len(),
        traj.final_time(),
        relative_energy_error(traj.back(), scenario.g, e0),
        com.x,
        com.y
    );
    info!("max relative energy drift = {max_drift:.3e}");

    if let Some(path) = args.output {
        write_trajectory(&path, traj, scenario.g)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("trajectory written to {}", path.display());
    }

    Ok(())
}
