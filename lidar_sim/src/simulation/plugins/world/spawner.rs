// lidar_sim/src/simulation/plugins/world/spawner.rs

//! Builds the static scene the LiDARs look at: a ground plane and box obstacles.

use avian3d::prelude::*;
use nalgebra::Vector3;

use crate::cli::Cli;
use crate::prelude::*;
use crate::simulation::core::transforms::enu_vector_to_bevy_vector;

/// Marks every static entity created from `[world]`.
#[derive(Component, Debug)]
pub struct WorldGeometry;

pub struct WorldSpawnerPlugin;

impl Plugin for WorldSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (
                spawn_world_geometry.in_set(SceneBuildSet::World),
                spawn_lighting_and_camera
                    .in_set(SceneBuildSet::World)
                    .run_if(|cli: Res<Cli>| !cli.headless),
            ),
        );
    }
}

/// A box in bevy coordinates. ENU half extents map to bevy full side lengths.
fn bevy_box(center_enu: &Vector3<f64>, half_extents_enu: &Vector3<f64>) -> (Transform, Vec3) {
    let size = enu_vector_to_bevy_vector(&(half_extents_enu * 2.0)).abs();
    (
        Transform::from_translation(enu_vector_to_bevy_vector(center_enu)),
        size,
    )
}

fn spawn_world_geometry(
    mut commands: Commands,
    scenario: Res<ScenarioConfig>,
    // Only present when rendering.
    mut meshes: Option<ResMut<Assets<Mesh>>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let world = &scenario.world;
    let mut boxes: Vec<(String, Transform, Vec3, Color)> = Vec::new();

    if let Some(ground) = &world.ground_plane {
        // A thin slab whose top face sits at `height`.
        let thickness = 0.1;
        let center = Vector3::new(0.0, 0.0, ground.height - thickness / 2.0);
        let half = Vector3::new(ground.half_extent, ground.half_extent, thickness / 2.0);
        let (transform, size) = bevy_box(&center, &half);
        boxes.push(("ground".to_string(), transform, size, Color::srgb(0.3, 0.35, 0.3)));
    }

    for obstacle in &world.obstacles {
        let (transform, size) = bevy_box(&obstacle.center, &obstacle.half_extents);
        boxes.push((obstacle.name.clone(), transform, size, Color::srgb(0.7, 0.6, 0.5)));
    }

    for (name, transform, size, color) in boxes {
        debug!("[SCENE] Spawning static box '{}' of size {:?}", name, size);
        let mut entity = commands.spawn((
            Name::new(name),
            WorldGeometry,
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            transform,
        ));

        if let (Some(meshes), Some(materials)) = (meshes.as_deref_mut(), materials.as_deref_mut())
        {
            entity.insert((
                Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: color,
                    ..default()
                })),
            ));
        }
    }

    info!(
        "[SCENE] Spawned {} obstacle(s){}.",
        world.obstacles.len(),
        if world.ground_plane.is_some() { " and a ground plane" } else { "" }
    );
}

fn spawn_lighting_and_camera(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 15_000.0,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-15.0, 12.0, 15.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn enu_box_becomes_bevy_box() {
        let (transform, size) = bevy_box(&Vector3::new(4.0, 1.0, 0.5), &Vector3::new(0.5, 1.0, 2.0));
        assert_abs_diff_eq!(transform.translation.x, 4.0);
        assert_abs_diff_eq!(transform.translation.y, 0.5);
        assert_abs_diff_eq!(transform.translation.z, -1.0);
        // North extent lands on bevy Z, up on bevy Y, both positive.
        assert_abs_diff_eq!(size.x, 1.0);
        assert_abs_diff_eq!(size.y, 4.0);
        assert_abs_diff_eq!(size.z, 2.0);
    }
}
