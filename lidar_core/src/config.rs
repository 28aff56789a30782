// lidar_core/src/config.rs

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Finest rotation accepted: one thousandth of a degree per step.
pub const MAX_STEPS_PER_LAP: f64 = 360_000.0;

// =========================================================================
// == Sensor Settings ==
// =========================================================================

/// The full parameter set of a rotating multi-beam LiDAR.
///
/// Angles are in degrees, distances in meters. `offset` is the raw user value;
/// the laser array builder converts it before use, the stored value is never
/// modified so applying the same settings twice yields the same lasers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LidarSettings {
    /// Total beam count, split evenly between the lower and upper half.
    pub number_of_lasers: u32,
    /// Full rotations per simulated second.
    pub rotation_speed_hz: f64,
    /// Degrees advanced per rotation step. Negative values rotate in reverse.
    pub rotation_angle_per_step: f64,
    /// Maximum range applied to every laser.
    pub ray_distance: f64,
    pub upper_fov: f64,
    pub lower_fov: f64,
    /// Vertical origin displacement between the two halves, before unit conversion.
    pub offset: f64,
    /// Shifts the centre of the upper half away from the horizontal plane.
    pub upper_normal: f64,
    /// Shifts the centre of the lower half away from the horizontal plane.
    pub lower_normal: f64,
}

impl Default for LidarSettings {
    fn default() -> Self {
        Self {
            number_of_lasers: 2,
            rotation_speed_hz: 1.0,
            rotation_angle_per_step: 45.0,
            ray_distance: 100.0,
            upper_fov: 20.0,
            lower_fov: 20.0,
            offset: 0.001,
            upper_normal: 30.0,
            lower_normal: 30.0,
        }
    }
}

impl LidarSettings {
    /// Lasers emitted per FOV half.
    pub fn lasers_per_half(&self) -> u32 {
        self.number_of_lasers / 2
    }

    /// Checks every parameter before it is allowed anywhere near the laser array.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("rotation_speed_hz", self.rotation_speed_hz),
            ("rotation_angle_per_step", self.rotation_angle_per_step),
            ("ray_distance", self.ray_distance),
            ("upper_fov", self.upper_fov),
            ("lower_fov", self.lower_fov),
            ("offset", self.offset),
            ("upper_normal", self.upper_normal),
            ("lower_normal", self.lower_normal),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFiniteParameter(name));
        }

        if self.number_of_lasers < 2 {
            return Err(ConfigError::TooFewLasers(self.number_of_lasers));
        }
        if self.number_of_lasers % 2 != 0 {
            return Err(ConfigError::OddLaserCount(self.number_of_lasers));
        }
        if self.ray_distance <= 0.0 {
            return Err(ConfigError::NonPositiveRayDistance(self.ray_distance));
        }
        if self.rotation_speed_hz == 0.0 {
            return Err(ConfigError::ZeroRotationSpeed);
        }
        if self.rotation_angle_per_step == 0.0 {
            return Err(ConfigError::ZeroRotationStep);
        }
        if 360.0 / self.rotation_angle_per_step.abs() > MAX_STEPS_PER_LAP {
            return Err(ConfigError::RotationStepTooSmall(self.rotation_angle_per_step));
        }
        Ok(())
    }
}

// =========================================================================
// == Scheduler Settings ==
// =========================================================================

/// Host-specific knobs of the rotation scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// The host can afford `(1 / dt) / tick_budget_divisor` rotation steps per tick.
    pub tick_budget_divisor: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_budget_divisor: 5.0,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tick_budget_divisor.is_finite() || self.tick_budget_divisor <= 0.0 {
            return Err(ConfigError::InvalidTickBudget(self.tick_budget_divisor));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(LidarSettings::default().validate(), Ok(()));
        assert_eq!(SchedulerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_odd_and_tiny_laser_counts() {
        let mut settings = LidarSettings {
            number_of_lasers: 5,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(ConfigError::OddLaserCount(5)));

        settings.number_of_lasers = 0;
        assert_eq!(settings.validate(), Err(ConfigError::TooFewLasers(0)));

        settings.number_of_lasers = 1;
        assert_eq!(settings.validate(), Err(ConfigError::TooFewLasers(1)));
    }

    #[test]
    fn rejects_degenerate_motion_and_range() {
        let base = LidarSettings::default();

        let settings = LidarSettings {
            ray_distance: 0.0,
            ..base
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigError::NonPositiveRayDistance(0.0))
        );

        let settings = LidarSettings {
            rotation_speed_hz: 0.0,
            ..base
        };
        assert_eq!(settings.validate(), Err(ConfigError::ZeroRotationSpeed));

        let settings = LidarSettings {
            rotation_angle_per_step: 0.0,
            ..base
        };
        assert_eq!(settings.validate(), Err(ConfigError::ZeroRotationStep));
    }

    #[test]
    fn rejects_vanishing_rotation_step() {
        let settings = LidarSettings {
            rotation_angle_per_step: -1e-9,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigError::RotationStepTooSmall(-1e-9))
        );

        let finest = LidarSettings {
            rotation_angle_per_step: 0.001,
            ..Default::default()
        };
        assert_eq!(finest.validate(), Ok(()));
    }

    #[test]
    fn rejects_non_finite_values() {
        let settings = LidarSettings {
            upper_fov: f64::NAN,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigError::NonFiniteParameter("upper_fov"))
        );
    }

    #[test]
    fn negative_step_is_reverse_rotation_not_an_error() {
        let settings = LidarSettings {
            rotation_angle_per_step: -10.0,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_tick_budget() {
        let config = SchedulerConfig {
            tick_budget_divisor: 0.0,
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTickBudget(0.0)));
    }
}
