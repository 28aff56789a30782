// lidar_sim/src/main.rs

use bevy::prelude::AppExit;
use clap::Parser;

use lidar_sim::build_app;
use lidar_sim::cli::Cli;
use lidar_sim::simulation::config::{load_catalog, load_scenario, resolve_all, ResolvedScenario};

fn main() -> AppExit {
    let cli = Cli::parse();

    let scenario = match load_scenario(&cli.scenario) {
        Ok(scenario) => scenario,
        Err(e) => panic!(
            "Failed to load or parse scenario file at {}: {}",
            cli.scenario.display(),
            e
        ),
    };

    if cli.print_config {
        return print_config(&cli, &scenario);
    }

    build_app(cli, scenario).run()
}

/// Resolves every sensor against the catalog and prints the result as TOML.
fn print_config(cli: &Cli, scenario: &lidar_sim::simulation::config::ScenarioConfig) -> AppExit {
    let catalog = load_catalog(&cli.catalog);
    let (sensors, errors) = resolve_all(scenario, &catalog);
    for error in &errors {
        eprintln!("error: {error}");
    }

    let resolved = ResolvedScenario {
        simulation: &scenario.simulation,
        world: &scenario.world,
        sensors: &sensors,
    };
    match toml::to_string_pretty(&resolved) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("error: cannot render resolved scenario: {e}");
            return AppExit::error();
        }
    }

    if errors.is_empty() {
        AppExit::Success
    } else {
        AppExit::error()
    }
}
