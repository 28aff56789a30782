// lidar_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the lidar_core prelude so the pure types (`RotatingLidar`,
// `LidarSettings`, `ScanBatch`, ...) are available everywhere.
pub use lidar_core::prelude::*;

// Re-export common simulation-specific types for easy access in other plugins.
pub use crate::simulation::config::structs::*;
pub use crate::simulation::core::app_state::{AppState, SceneBuildSet, SimulationSet};
pub use crate::simulation::core::events::{ApplyLidarSettings, ScanEvent, SetLidarPaused};
pub use crate::simulation::plugins::sensors::rotating_lidar::RotatingLidarSensor;
