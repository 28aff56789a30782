// lidar_sim/src/lib.rs

use avian3d::prelude::PhysicsPlugins;
use bevy::{
    log::{Level, LogPlugin},
    prelude::*,
    state::app::StatesPlugin,
};

use crate::cli::Cli;
use crate::simulation::config::{ConfigPlugin, ScenarioConfig};
use crate::simulation::core::app_state::AppState;
use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::consumers::scan_stats::ScanStatsPlugin;
use crate::simulation::plugins::debugging::DebuggingPlugin;
use crate::simulation::plugins::sensors::rotating_lidar::RotatingLidarPlugin;
use crate::simulation::plugins::world::spawner::WorldSpawnerPlugin;

// This prelude is for convenience for other files WITHIN the lidar_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;

/// The main plugin that brings together all the simulation parts.
///
/// Expects `Cli` and `ScenarioConfig` resources to be inserted beforehand.
pub struct LidarSimulationPlugin;

impl Plugin for LidarSimulationPlugin {
    fn build(&self, app: &mut App) {
        let headless = app
            .world()
            .get_resource::<Cli>()
            .is_some_and(|cli| cli.headless);

        app.add_plugins((
            // Catalog loading and sensor resolution.
            ConfigPlugin,
            // Fixed tick, schedule sets, pause and exit handling.
            SimulationSetupPlugin,
            // Ground plane, obstacles, lighting and camera.
            WorldSpawnerPlugin,
            RotatingLidarPlugin,
            ScanStatsPlugin,
        ));

        if !headless {
            app.add_plugins(DebuggingPlugin);
        }
    }
}

/// Assembles the full application for `cli` and an already parsed `scenario`.
pub fn build_app(cli: Cli, scenario: ScenarioConfig) -> App {
    let mut app = App::new();

    let log_plugin = LogPlugin {
        level: Level::INFO,
        filter: cli.log_filter.clone(),
        ..default()
    };

    if cli.headless {
        app.add_plugins((
            MinimalPlugins,
            log_plugin,
            TransformPlugin,
            StatesPlugin,
            AssetPlugin::default(),
            bevy::scene::ScenePlugin,
        ))
        // avian's collider backend expects mesh storage even when nothing renders.
        .init_asset::<Mesh>();
    } else {
        app.add_plugins(DefaultPlugins.set(log_plugin));
    }

    app.add_plugins(PhysicsPlugins::default())
        .insert_resource(scenario)
        .insert_resource(cli);

    app.init_state::<AppState>();
    app.add_plugins(LidarSimulationPlugin);
    app
}
