// lidar_sim/src/simulation/plugins/debugging/systems.rs

use super::components::ShowDebugGizmos;
use crate::prelude::*;
use crate::simulation::core::transforms::{
    bevy_global_transform_to_enu_iso, enu_point_to_bevy_point,
};
use crate::simulation::plugins::sensors::rotating_lidar::RotatingLidarSensor;

// =========================================================================
// == Toggle Systems (Hotkeys) ==
// =========================================================================

/// Toggles `ShowDebugGizmos` on all LiDAR sensors with the F3 key.
pub fn toggle_lidar_visuals(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    query: Query<(Entity, Has<ShowDebugGizmos>), With<RotatingLidarSensor>>,
) {
    if !keyboard.just_pressed(KeyCode::F3) {
        return;
    }

    // Any visible sensor means "turn everything off".
    let are_any_on = query.iter().any(|(_, shown)| shown);
    for (entity, shown) in &query {
        match (are_any_on, shown) {
            (true, true) => {
                commands.entity(entity).remove::<ShowDebugGizmos>();
            }
            (false, false) => {
                commands.entity(entity).insert(ShowDebugGizmos);
            }
            _ => {}
        }
    }
    info!(
        "[Debug] Toggled LiDAR ray visuals {}",
        if are_any_on { "OFF" } else { "ON" }
    );
}

// =========================================================================
// == Drawing Systems ==
// =========================================================================

/// Draws every laser of a marked sensor at the sensor's current rotation.
pub fn draw_lidar_rays(
    mut gizmos: Gizmos,
    sensor_query: Query<(&RotatingLidarSensor, &GlobalTransform), With<ShowDebugGizmos>>,
) {
    for (sensor, transform) in &sensor_query {
        let frame = sensor
            .model
            .current_frame(&bevy_global_transform_to_enu_iso(transform));

        let half = sensor.model.settings().lasers_per_half();
        for laser in sensor.model.lasers() {
            let ray = laser.ray(&frame);
            // Lower half orange, upper half cyan.
            let color = if laser.id() < half {
                Color::srgba(1.0, 0.5, 0.0, 0.3)
            } else {
                Color::srgba(0.0, 0.8, 1.0, 0.3)
            };
            gizmos.line(
                enu_point_to_bevy_point(&ray.origin),
                enu_point_to_bevy_point(&ray.point_at(laser.max_range())),
                color,
            );
        }
    }
}
