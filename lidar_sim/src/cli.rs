// lidar_sim/src/cli.rs

use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

/// A rotating multi-beam LiDAR simulator.
///
/// Spawns the sensors and static scene described by a scenario file and streams
/// their scans through the fixed simulation tick.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/spinning_lidar.toml")]
    pub scenario: PathBuf,

    /// Root of the preset catalog referenced by `from = "..."` keys.
    #[arg(long, default_value = "assets/catalog")]
    pub catalog: PathBuf,

    /// Run the simulation in headless mode (without a graphical window).
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// The tracing filter handed to bevy's `LogPlugin`.
    #[arg(
        long,
        default_value = "info,wgpu_core=error,wgpu_hal=error,lidar_sim=debug,lidar_core=debug"
    )]
    pub log_filter: String,

    /// Print the fully resolved scenario as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub print_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_bundled_assets() {
        let cli = Cli::parse_from(["lidar_sim"]);
        assert_eq!(cli.scenario, PathBuf::from("assets/scenarios/spinning_lidar.toml"));
        assert_eq!(cli.catalog, PathBuf::from("assets/catalog"));
        assert!(!cli.headless);
        assert!(!cli.print_config);
    }

    #[test]
    fn flags_are_parsed() {
        let cli = Cli::parse_from([
            "lidar_sim",
            "--scenario",
            "x.toml",
            "--headless",
            "--log-filter",
            "warn",
            "--print-config",
        ]);
        assert_eq!(cli.scenario, PathBuf::from("x.toml"));
        assert!(cli.headless);
        assert_eq!(cli.log_filter, "warn");
        assert!(cli.print_config);
    }
}
