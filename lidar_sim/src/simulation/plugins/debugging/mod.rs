// lidar_sim/src/simulation/plugins/debugging/mod.rs

use bevy::prelude::*;

// --- Sub-modules for organization ---
mod components;
mod systems;

// Re-export the public component for use in other plugins (like sensor spawners).
pub use components::ShowDebugGizmos;

use crate::prelude::AppState;

/// Laser line visualization. Only added in windowed mode.
pub struct DebuggingPlugin;

impl Plugin for DebuggingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (systems::toggle_lidar_visuals, systems::draw_lidar_rays)
                .run_if(in_state(AppState::Running).or(in_state(AppState::Paused))),
        );
    }
}
