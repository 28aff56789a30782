// lidar_sim/src/simulation/core/transforms.rs

//! Conversions between the ENU frame the sensors compute in (+Z up) and
//! bevy's render frame (+Y up, -Z forward).
//!
//! ENU east maps to bevy +X, north to bevy -Z and up to bevy +Y.

use bevy::prelude::{GlobalTransform, Quat as BevyQuat, Transform as BevyTransform, Vec3 as BevyVec3};
use nalgebra::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};
use std::f64::consts::FRAC_PI_2;

/// Rotation taking ENU basis vectors to their bevy expression (-90 deg about X).
fn enu_frame_to_bevy_frame() -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2)
}

pub fn enu_vector_to_bevy_vector(enu: &Vector3<f64>) -> BevyVec3 {
    BevyVec3::new(enu.x as f32, enu.z as f32, -enu.y as f32)
}

pub fn bevy_vector_to_enu_vector(bevy: &BevyVec3) -> Vector3<f64> {
    Vector3::new(bevy.x as f64, -bevy.z as f64, bevy.y as f64)
}

pub fn enu_point_to_bevy_point(enu: &Point3<f64>) -> BevyVec3 {
    enu_vector_to_bevy_vector(&enu.coords)
}

pub fn bevy_point_to_enu_point(bevy: &BevyVec3) -> Point3<f64> {
    Point3::from(bevy_vector_to_enu_vector(bevy))
}

/// Re-expresses an orientation given in ENU in the bevy frame.
pub fn enu_quat_to_bevy_quat(enu: &UnitQuaternion<f64>) -> BevyQuat {
    let frame = enu_frame_to_bevy_frame();
    let q = frame * enu * frame.inverse();
    BevyQuat::from_xyzw(
        q.coords.x as f32,
        q.coords.y as f32,
        q.coords.z as f32,
        q.coords.w as f32,
    )
}

pub fn bevy_quat_to_enu_quat(bevy: &BevyQuat) -> UnitQuaternion<f64> {
    let q = UnitQuaternion::from_quaternion(Quaternion::new(
        bevy.w as f64,
        bevy.x as f64,
        bevy.y as f64,
        bevy.z as f64,
    ));
    let frame = enu_frame_to_bevy_frame();
    frame.inverse() * q * frame
}

pub fn enu_iso_to_bevy_transform(enu: &Isometry3<f64>) -> BevyTransform {
    BevyTransform {
        translation: enu_vector_to_bevy_vector(&enu.translation.vector),
        rotation: enu_quat_to_bevy_quat(&enu.rotation),
        scale: BevyVec3::ONE,
    }
}

pub fn bevy_transform_to_enu_iso(transform: &BevyTransform) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::from(bevy_vector_to_enu_vector(&transform.translation)),
        bevy_quat_to_enu_quat(&transform.rotation),
    )
}

/// World pose of an entity, in ENU.
pub fn bevy_global_transform_to_enu_iso(transform: &GlobalTransform) -> Isometry3<f64> {
    bevy_transform_to_enu_iso(&transform.compute_transform())
}
