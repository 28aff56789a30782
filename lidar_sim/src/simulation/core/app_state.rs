// lidar_sim/src/simulation/core/app_state.rs

use bevy::{ecs::schedule::SystemSet, prelude::States};

/// Defines the major phases of the application's lifecycle.
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    /// The initial state. The preset catalog is read and every sensor is resolved.
    #[default]
    Loading,

    /// Configuration is final. The static scene and the sensors are spawned.
    SceneBuilding,

    /// The fixed tick drives every sensor.
    Running,

    /// Every sensor is paused. The fixed tick keeps running but produces nothing.
    Paused,
}

/// System sets to control the order of execution during the SceneBuilding state.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneBuildSet {
    /// Pass 1: Static colliders, lighting and the camera.
    World,

    /// Pass 2: One entity per resolved sensor.
    Sensors,

    /// Pass 3: Hand over to the runtime loop.
    Finalize,
}

// =========================================================================
// == Main Simulation Sets ==
// =========================================================================

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Systems that simulate the LiDARs and publish their scans.
    Sensors,
    /// Systems that consume published scans.
    Consumers,
}
