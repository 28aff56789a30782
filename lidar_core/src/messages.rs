// lidar_core/src/messages.rs

use nalgebra::{Point3, Vector3};
use serde::Serialize;

// =========================================================================
// == Perception-Specific Data Structures ==
// =========================================================================

/// A single detected point, expressed in the sensor's spherical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SphericalCoordinate {
    /// Distance from the laser origin to the hit, in meters. Always > 0.
    pub radius: f64,
    /// Vertical angle in degrees, copied from the firing laser.
    pub inclination: f64,
    /// Horizontal rotation of the sensor at the instant of the shot, in `[0, 360)` degrees.
    pub azimuth: f64,
    /// The hit position in world coordinates, for consumers that skip the spherical form.
    pub world_point: Point3<f64>,
    /// Identifier of the laser that produced this point.
    pub laser_id: u32,
}

impl SphericalCoordinate {
    /// Converts the spherical form back into a cartesian offset from the laser origin,
    /// expressed in the (unrotated) mount frame: +X forward, +Z up.
    pub fn local_position(&self) -> Vector3<f64> {
        let (sin_incl, cos_incl) = self.inclination.to_radians().sin_cos();
        let (sin_az, cos_az) = self.azimuth.to_radians().sin_cos();
        Vector3::new(
            self.radius * cos_incl * cos_az,
            self.radius * cos_incl * sin_az,
            self.radius * sin_incl,
        )
    }
}

/// Everything one scheduler tick produced.
///
/// Built fresh for every tick and handed out by value once all subscribers
/// have seen it; the sensor keeps no history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanBatch {
    /// Simulation time at which the most recent full lap completed.
    pub lap_timestamp: f64,
    /// Rotation steps folded into this batch.
    pub steps: u32,
    pub points: Vec<SphericalCoordinate>,
}

impl ScanBatch {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn point(radius: f64, inclination: f64, azimuth: f64) -> SphericalCoordinate {
        SphericalCoordinate {
            radius,
            inclination,
            azimuth,
            world_point: Point3::origin(),
            laser_id: 0,
        }
    }

    #[test]
    fn local_position_straight_ahead() {
        let p = point(4.0, 0.0, 0.0).local_position();
        assert_abs_diff_eq!(p, Vector3::new(4.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn local_position_quarter_turn_and_pitched_up() {
        let p = point(2.0, 30.0, 90.0).local_position();
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 2.0 * 30f64.to_radians().cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(p.z, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.norm(), 2.0, epsilon = 1e-12);
    }
}
