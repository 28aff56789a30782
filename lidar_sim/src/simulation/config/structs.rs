// lidar_sim/src/simulation/config/structs.rs

//! Plain data mirrors of the scenario TOML. All coordinates are ENU (+Z up).

use bevy::prelude::Resource;
use figment::value::Dict;
use lidar_core::config::{LidarSettings, SchedulerConfig};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::simulation::utils::serde_helpers::{quat_from_euler_deg, vec3_from_array};

// =========================================================================
// == Top Level ==
// =========================================================================

/// The parsed scenario file, before any catalog presets are applied.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    /// Rate of the fixed simulation tick.
    pub tick_rate_hz: f64,
    /// Exit once this much simulated time has passed. Runs forever when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    pub tick_budget_divisor: f64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            tick_rate_hz: 50.0,
            duration_seconds: None,
            tick_budget_divisor: SchedulerConfig::default().tick_budget_divisor,
        }
    }
}

impl SimulationSection {
    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_budget_divisor: self.tick_budget_divisor,
        }
    }
}

// =========================================================================
// == World ==
// =========================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_plane: Option<GroundPlaneConfig>,
    pub obstacles: Vec<ObstacleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroundPlaneConfig {
    /// Height of the top surface.
    #[serde(default)]
    pub height: f64,
    /// Half the side length of the square plane.
    #[serde(default = "default_ground_half_extent")]
    pub half_extent: f64,
}

fn default_ground_half_extent() -> f64 {
    100.0
}

/// A static, axis-aligned box.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObstacleConfig {
    pub name: String,
    #[serde(with = "vec3_from_array")]
    pub center: Vector3<f64>,
    #[serde(with = "vec3_from_array")]
    pub half_extents: Vector3<f64>,
}

// =========================================================================
// == Sensors ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pose {
    #[serde(with = "vec3_from_array")]
    pub translation: Vector3<f64>,
    /// Roll, pitch, yaw in degrees.
    #[serde(with = "quat_from_euler_deg", default = "identity_rotation")]
    pub rotation: UnitQuaternion<f64>,
}

fn identity_rotation() -> UnitQuaternion<f64> {
    UnitQuaternion::identity()
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

impl Pose {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }
}

/// One `[[sensors]]` entry as written in the scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorConfig {
    pub name: String,
    /// Catalog preset to start from, e.g. `"lidars.puck16"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default)]
    pub start_paused: bool,
    #[serde(default)]
    pub debug_visuals: bool,
    #[serde(default)]
    pub pose: Pose,
    /// Partial `LidarSettings` applied on top of the preset.
    #[serde(default)]
    pub settings: Dict,
}

/// A sensor after its preset and overrides have been folded into concrete settings.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSensor {
    pub name: String,
    pub start_paused: bool,
    pub debug_visuals: bool,
    pub pose: Pose,
    pub settings: LidarSettings,
}

/// What `--print-config` writes out.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedScenario<'a> {
    pub simulation: &'a SimulationSection,
    pub world: &'a WorldConfig,
    pub sensors: &'a [ResolvedSensor],
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use figment::{
        providers::{Format, Toml},
        Figment,
    };

    fn parse(toml: &str) -> ScenarioConfig {
        Figment::new().merge(Toml::string(toml)).extract().unwrap()
    }

    #[test]
    fn empty_scenario_uses_defaults() {
        let scenario = parse("");
        assert_eq!(scenario.simulation.tick_rate_hz, 50.0);
        assert_eq!(scenario.simulation.tick_budget_divisor, 5.0);
        assert!(scenario.simulation.duration_seconds.is_none());
        assert!(scenario.world.obstacles.is_empty());
        assert!(scenario.sensors.is_empty());
    }

    #[test]
    fn parses_world_and_sensors() {
        let scenario = parse(
            r#"
            [simulation]
            tick_rate_hz = 100.0
            duration_seconds = 3.5

            [world.ground_plane]
            height = -0.5

            [[world.obstacles]]
            name = "crate"
            center = [4.0, 0.0, 0.5]
            half_extents = [0.5, 0.5, 0.5]

            [[sensors]]
            name = "roof"
            from = "lidars.puck16"
            debug_visuals = true
            pose = { translation = [0.0, 0.0, 1.8], rotation = [0.0, 0.0, 90.0] }
            settings = { rotation_speed_hz = 5.0 }
            "#,
        );

        assert_eq!(scenario.simulation.duration_seconds, Some(3.5));
        let ground = scenario.world.ground_plane.as_ref().unwrap();
        assert_eq!(ground.height, -0.5);
        assert_eq!(ground.half_extent, 100.0);
        assert_eq!(scenario.world.obstacles[0].center, Vector3::new(4.0, 0.0, 0.5));

        let sensor = &scenario.sensors[0];
        assert_eq!(sensor.from.as_deref(), Some("lidars.puck16"));
        assert!(sensor.debug_visuals);
        assert!(!sensor.start_paused);
        assert_abs_diff_eq!(sensor.pose.translation.z, 1.8);
        assert_abs_diff_eq!(
            sensor.pose.rotation.euler_angles().2,
            90f64.to_radians(),
            epsilon = 1e-12
        );
        assert!(sensor.settings.contains_key("rotation_speed_hz"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<ScenarioConfig, _> = Figment::new()
            .merge(Toml::string("[simulation]\ntick_rate = 10.0"))
            .extract();
        assert!(result.is_err());
    }

    #[test]
    fn pose_rotation_defaults_to_identity() {
        let scenario = parse(
            r#"
            [[sensors]]
            name = "a"
            pose = { translation = [1.0, 2.0, 3.0] }
            "#,
        );
        let iso = scenario.sensors[0].pose.to_isometry();
        assert_eq!(iso.rotation, UnitQuaternion::identity());
        assert_eq!(iso.translation.vector, Vector3::new(1.0, 2.0, 3.0));
    }
}
