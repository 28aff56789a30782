// lidar_sim/src/simulation/plugins/debugging/components.rs

use bevy::prelude::Component;

/// Marks a LiDAR whose laser lines should be drawn.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ShowDebugGizmos;
