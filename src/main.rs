use rbsim::{ScenarioConfig, Scenario};
use rbsim::{bench_aggregate, bench_step};

use clap::Parser;
use anyhow::{Context, Result};
use log::info;

use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "two_cubes.yaml")]
    file_name: String,

    /// Run the timing benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let scenario_cfg = ScenarioConfig::from_path(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_aggregate();
        bench_step();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build(scenario_cfg)?;

    let steps = scenario.run()?;
    scenario.refresh_mass_properties()?;
    info!("finished {} steps, t = {:.6}, kinetic energy = {:.6e}", steps, scenario.system.t, scenario.kinetic_energy());

    for b in &scenario.bodies {
        println!(
            "body {}: cm = [{:.6}, {:.6}, {:.6}], v = [{:.6}, {:.6}, {:.6}], w = [{:.6}, {:.6}, {:.6}]",
            b.id,
            b.cm.x, b.cm.y, b.cm.z,
            b.vc.x, b.vc.y, b.vc.z,
            b.omega.x, b.omega.y, b.omega.z,
        );
    }

    scenario.check_finite()?;
    Ok(())
}
