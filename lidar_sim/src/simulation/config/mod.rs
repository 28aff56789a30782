// lidar_sim/src/simulation/config/mod.rs

//! Loading the scenario file, the preset catalog, and resolving every sensor's
//! final settings before the scene is built.

mod catalog;
mod resolver;

pub mod structs;

use std::path::Path;

use bevy::prelude::*;
use figment::{
    providers::{Format, Toml},
    Figment,
};

use crate::cli::Cli;
use crate::prelude::AppState;
pub use catalog::{catalog_key, load_catalog, PresetCatalog};
pub use resolver::{resolve_sensor, ResolveError};
pub use structs::{ResolvedScenario, ResolvedSensor, ScenarioConfig};

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PresetCatalog>()
            .init_resource::<ResolvedSensors>()
            .add_systems(
                OnEnter(AppState::Loading),
                (
                    load_catalog_system,
                    resolve_sensors_system,
                    transition_to_scene_building,
                )
                    .chain(),
            );
    }
}

/// Sensors that resolved cleanly, in scenario order.
#[derive(Resource, Default, Debug)]
pub struct ResolvedSensors(pub Vec<ResolvedSensor>);

/// Reads a scenario file. Unlike catalog presets, a missing scenario is an error.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, figment::Error> {
    if !path.is_file() {
        return Err(figment::Error::from(format!(
            "scenario file {} does not exist",
            path.display()
        )));
    }
    Figment::new().merge(Toml::file(path)).extract()
}

/// Resolves every sensor, splitting the good ones from the failures.
pub fn resolve_all(
    scenario: &ScenarioConfig,
    catalog: &PresetCatalog,
) -> (Vec<ResolvedSensor>, Vec<ResolveError>) {
    let mut resolved = Vec::with_capacity(scenario.sensors.len());
    let mut errors = Vec::new();
    for sensor in &scenario.sensors {
        match resolve_sensor(sensor, catalog) {
            Ok(r) => resolved.push(r),
            Err(e) => errors.push(e),
        }
    }
    (resolved, errors)
}

fn load_catalog_system(mut catalog: ResMut<PresetCatalog>, cli: Res<Cli>) {
    *catalog = load_catalog(&cli.catalog);
}

fn resolve_sensors_system(
    scenario: Res<ScenarioConfig>,
    catalog: Res<PresetCatalog>,
    mut resolved_sensors: ResMut<ResolvedSensors>,
) {
    let (resolved, errors) = resolve_all(&scenario, &catalog);
    for error in errors {
        error!("{}. Skipping sensor.", error);
    }
    for sensor in &resolved {
        info!(
            "Resolved sensor '{}': {} lasers at {:.2} Hz, {:.3} deg/step",
            sensor.name,
            sensor.settings.number_of_lasers,
            sensor.settings.rotation_speed_hz,
            sensor.settings.rotation_angle_per_step
        );
    }
    resolved_sensors.0 = resolved;
}

fn transition_to_scene_building(mut next_state: ResMut<NextState<AppState>>) {
    info!("Configuration resolved. Transitioning to SceneBuilding state.");
    next_state.set(AppState::SceneBuilding);
}
