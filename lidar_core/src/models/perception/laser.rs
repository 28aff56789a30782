// lidar_core/src/models/perception/laser.rs

use nalgebra::{Isometry3, Point3, Unit, Vector3};

use super::{RayHit, Raycaster, SensorRay};
use crate::types::VisualHandle;

/// One beam of a multi-beam LiDAR.
///
/// A laser never changes after construction. Reconfiguring the sensor throws the
/// whole set away and builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Laser {
    id: u32,
    /// Degrees above (positive) or below (negative) the sensor plane.
    vertical_angle: f64,
    max_range: f64,
    /// Origin displacement in meters along the frame's local down axis.
    vertical_offset: f64,
    visual: Option<VisualHandle>,
}

impl Laser {
    pub fn new(id: u32, vertical_angle: f64, max_range: f64, vertical_offset: f64) -> Self {
        Self {
            id,
            vertical_angle,
            max_range,
            vertical_offset,
            visual: None,
        }
    }

    /// Attaches the renderer's handle for this laser's line.
    pub fn with_visual(mut self, visual: VisualHandle) -> Self {
        self.visual = Some(visual);
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn vertical_angle(&self) -> f64 {
        self.vertical_angle
    }

    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    pub fn vertical_offset(&self) -> f64 {
        self.vertical_offset
    }

    pub fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }

    /// Beam direction in the sensor's own frame (+X forward, +Z up).
    pub fn local_direction(&self) -> Unit<Vector3<f64>> {
        let (sin, cos) = self.vertical_angle.to_radians().sin_cos();
        Unit::new_normalize(Vector3::new(cos, 0.0, sin))
    }

    /// The world-space ray this laser would fire from `frame`.
    pub fn ray(&self, frame: &Isometry3<f64>) -> SensorRay {
        let down = frame.rotation * -Vector3::z();
        let origin = Point3::from(frame.translation.vector) + down * self.vertical_offset;
        SensorRay {
            id: self.id,
            origin,
            direction: frame.rotation * self.local_direction(),
        }
    }

    /// Fires the laser from `frame` into the scene.
    ///
    /// Anything the intersection service reports that is not a strictly positive,
    /// finite distance within range comes back as a miss with `distance == 0`.
    pub fn shoot_ray(&self, frame: &Isometry3<f64>, raycaster: &dyn Raycaster) -> RayHit {
        let ray = self.ray(frame);
        match raycaster.raycast(&ray.origin, &ray.direction, self.max_range) {
            Some(hit)
                if hit.distance.is_finite()
                    && hit.distance > 0.0
                    && hit.distance <= self.max_range =>
            {
                RayHit {
                    laser_id: self.id,
                    distance: hit.distance,
                    point: Some(hit.point),
                }
            }
            _ => RayHit::miss(self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::perception::test_scenes::{ConstantScene, EmptyScene, FloorScene};
    use crate::models::perception::RaycastHit;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    struct ZeroDistanceScene;

    impl Raycaster for ZeroDistanceScene {
        fn raycast(
            &self,
            origin: &Point3<f64>,
            _: &Unit<Vector3<f64>>,
            _: f64,
        ) -> Option<RaycastHit> {
            Some(RaycastHit {
                distance: 0.0,
                point: *origin,
            })
        }
    }

    #[test]
    fn ray_is_pitched_by_vertical_angle() {
        let laser = Laser::new(0, 30.0, 10.0, 0.0);
        let ray = laser.ray(&Isometry3::identity());
        assert_abs_diff_eq!(ray.direction.x, 30f64.to_radians().cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(ray.direction.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ray.direction.z, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn origin_is_displaced_along_local_down_axis() {
        let laser = Laser::new(0, 0.0, 10.0, 0.25);
        let frame = Isometry3::from_parts(
            Translation3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 1.0),
        );
        let ray = laser.ray(&frame);
        assert_abs_diff_eq!(ray.origin, Point3::new(1.0, 2.0, 2.75), epsilon = 1e-12);

        let upward = Laser::new(0, 0.0, 10.0, -0.25).ray(&frame);
        assert_abs_diff_eq!(upward.origin, Point3::new(1.0, 2.0, 3.25), epsilon = 1e-12);
    }

    #[test]
    fn ray_follows_frame_yaw() {
        let laser = Laser::new(0, 0.0, 10.0, 0.0);
        let frame = Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 90f64.to_radians()),
        );
        let ray = laser.ray(&frame);
        assert_abs_diff_eq!(ray.direction.into_inner(), Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn downward_laser_hits_floor() {
        let laser = Laser::new(7, -45.0, 10.0, 0.0);
        let frame = Isometry3::translation(0.0, 0.0, 1.0);
        let hit = laser.shoot_ray(&frame, &FloorScene { height: 0.0 });

        assert!(hit.is_detection());
        assert_eq!(hit.laser_id, 7);
        assert_abs_diff_eq!(hit.distance, 2f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(hit.point.unwrap(), Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn misses_report_zero_distance() {
        let laser = Laser::new(3, 10.0, 10.0, 0.0);
        let frame = Isometry3::identity();

        assert_eq!(laser.shoot_ray(&frame, &EmptyScene), RayHit::miss(3));
        // Upward beam never reaches a floor below the sensor.
        assert_eq!(
            laser.shoot_ray(&frame, &FloorScene { height: -1.0 }),
            RayHit::miss(3)
        );
    }

    #[test]
    fn zero_distance_from_service_is_not_a_detection() {
        let laser = Laser::new(0, 0.0, 10.0, 0.0);
        let hit = laser.shoot_ray(&Isometry3::identity(), &ZeroDistanceScene);
        assert!(!hit.is_detection());
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn out_of_range_hits_are_dropped() {
        let laser = Laser::new(0, 0.0, 5.0, 0.0);
        assert!(!laser
            .shoot_ray(&Isometry3::identity(), &ConstantScene(6.0))
            .is_detection());
        assert!(laser
            .shoot_ray(&Isometry3::identity(), &ConstantScene(5.0))
            .is_detection());
    }
}
