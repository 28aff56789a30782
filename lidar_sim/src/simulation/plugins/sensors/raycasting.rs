// lidar_sim/src/simulation/plugins/sensors/raycasting.rs

//! Bridges the core `Raycaster` seam onto avian3d's spatial query pipeline.

use avian3d::prelude::{SpatialQuery, SpatialQueryFilter};
use bevy::prelude::*;
use lidar_core::models::perception::{RaycastHit, Raycaster};
use nalgebra::{Point3, Unit, Vector3};

use crate::simulation::core::transforms::{
    bevy_point_to_enu_point, enu_point_to_bevy_point, enu_vector_to_bevy_vector,
};

/// Casts ENU rays against every collider in the physics world.
pub struct SpatialQueryRaycaster<'a, 'w, 's> {
    spatial_query: &'a SpatialQuery<'w, 's>,
    filter: SpatialQueryFilter,
}

impl<'a, 'w, 's> SpatialQueryRaycaster<'a, 'w, 's> {
    /// A raycaster that never reports hits on `sensor` itself.
    pub fn excluding(spatial_query: &'a SpatialQuery<'w, 's>, sensor: Entity) -> Self {
        Self {
            spatial_query,
            filter: SpatialQueryFilter::from_excluded_entities([sensor]),
        }
    }
}

impl Raycaster for SpatialQueryRaycaster<'_, '_, '_> {
    fn raycast(
        &self,
        origin: &Point3<f64>,
        direction: &Unit<Vector3<f64>>,
        max_distance: f64,
    ) -> Option<RaycastHit> {
        let bevy_origin = enu_point_to_bevy_point(origin);
        let bevy_direction = Dir3::new(enu_vector_to_bevy_vector(direction)).ok()?;

        // Solid so a sensor mounted inside a collider still reports it at distance 0.
        let hit = self.spatial_query.cast_ray(
            bevy_origin,
            bevy_direction,
            max_distance as f32,
            true,
            &self.filter,
        )?;

        let bevy_point = bevy_origin + bevy_direction * hit.distance;
        Some(RaycastHit {
            distance: hit.distance as f64,
            point: bevy_point_to_enu_point(&bevy_point),
        })
    }
}
