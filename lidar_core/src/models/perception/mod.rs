// lidar_core/src/models/perception/mod.rs

pub mod laser;
pub mod laser_array;

use nalgebra::{Point3, Unit, Vector3};

/// Represents a single ray to be cast by the simulation engine.
/// All vectors are in WORLD coordinates (ENU, +Z up).
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRay {
    /// The identifier of the laser this ray belongs to.
    pub id: u32,
    pub origin: Point3<f64>,
    pub direction: Unit<Vector3<f64>>,
}

impl SensorRay {
    /// The point `distance` meters along the ray.
    pub fn point_at(&self, distance: f64) -> Point3<f64> {
        self.origin + self.direction.into_inner() * distance
    }
}

/// What the intersection service reports for a ray that hit something.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Distance along the ray to the hit.
    pub distance: f64,
    /// The world-space hit point.
    pub point: Point3<f64>,
}

/// Represents the result of a single laser shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The ID of the laser that produced this result.
    pub laser_id: u32,
    /// The measured distance to the hit object. `0.0` means nothing was detected.
    pub distance: f64,
    /// The world-space hit point, present only for detections.
    pub point: Option<Point3<f64>>,
}

impl RayHit {
    pub fn miss(laser_id: u32) -> Self {
        Self {
            laser_id,
            distance: 0.0,
            point: None,
        }
    }

    /// A zero distance is a non-detection, never a zero-range detection.
    pub fn is_detection(&self) -> bool {
        self.distance != 0.0 && self.point.is_some()
    }
}

/// The contract for the scene intersection service that lasers are fired into.
///
/// Implementations are expected to be synchronous and free of side effects that
/// the scanning core can observe. The Bevy host implements this on top of the
/// physics engine's spatial queries; tests use small analytic scenes.
pub trait Raycaster {
    /// Casts a ray and returns the closest hit within `max_distance`, if any.
    fn raycast(
        &self,
        origin: &Point3<f64>,
        direction: &Unit<Vector3<f64>>,
        max_distance: f64,
    ) -> Option<RaycastHit>;
}

impl<T: Raycaster + ?Sized> Raycaster for &T {
    fn raycast(
        &self,
        origin: &Point3<f64>,
        direction: &Unit<Vector3<f64>>,
        max_distance: f64,
    ) -> Option<RaycastHit> {
        (**self).raycast(origin, direction, max_distance)
    }
}

// =========================================================================
// == Analytic Scenes (tests) ==
// =========================================================================

#[cfg(test)]
pub(crate) mod test_scenes {
    use super::*;

    /// Nothing to hit.
    pub struct EmptyScene;

    impl Raycaster for EmptyScene {
        fn raycast(&self, _: &Point3<f64>, _: &Unit<Vector3<f64>>, _: f64) -> Option<RaycastHit> {
            None
        }
    }

    /// Every ray hits at the same distance.
    pub struct ConstantScene(pub f64);

    impl Raycaster for ConstantScene {
        fn raycast(
            &self,
            origin: &Point3<f64>,
            direction: &Unit<Vector3<f64>>,
            max_distance: f64,
        ) -> Option<RaycastHit> {
            (self.0 <= max_distance).then(|| RaycastHit {
                distance: self.0,
                point: origin + direction.into_inner() * self.0,
            })
        }
    }

    /// An infinite horizontal floor at `z = height`.
    pub struct FloorScene {
        pub height: f64,
    }

    impl Raycaster for FloorScene {
        fn raycast(
            &self,
            origin: &Point3<f64>,
            direction: &Unit<Vector3<f64>>,
            max_distance: f64,
        ) -> Option<RaycastHit> {
            if direction.z.abs() < 1e-12 {
                return None;
            }
            let distance = (self.height - origin.z) / direction.z;
            (distance > 0.0 && distance <= max_distance).then(|| RaycastHit {
                distance,
                point: origin + direction.into_inner() * distance,
            })
        }
    }
}
