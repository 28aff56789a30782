// lidar_sim/src/simulation/config/resolver.rs

use figment::{providers::Serialized, Figment};
use lidar_core::{config::LidarSettings, error::ConfigError};
use thiserror::Error;

use super::catalog::PresetCatalog;
use super::structs::{ResolvedSensor, SensorConfig};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("sensor '{sensor}' references unknown preset '{preset}'")]
    UnknownPreset { sensor: String, preset: String },
    #[error("sensor '{sensor}' has malformed settings: {source}")]
    Malformed {
        sensor: String,
        #[source]
        source: Box<figment::Error>,
    },
    #[error("sensor '{sensor}' has invalid settings: {source}")]
    Invalid {
        sensor: String,
        #[source]
        source: ConfigError,
    },
}

/// Folds `LidarSettings::default()`, the referenced preset and the inline
/// overrides (in that order, later layers win) into concrete settings.
pub fn resolve_sensor(
    sensor: &SensorConfig,
    catalog: &PresetCatalog,
) -> Result<ResolvedSensor, ResolveError> {
    let mut figment = Figment::from(Serialized::defaults(LidarSettings::default()));

    if let Some(preset_key) = &sensor.from {
        let preset = catalog
            .get(preset_key)
            .ok_or_else(|| ResolveError::UnknownPreset {
                sensor: sensor.name.clone(),
                preset: preset_key.clone(),
            })?;
        figment = figment.merge(Serialized::defaults(preset));
    }

    let settings: LidarSettings = figment
        .merge(Serialized::defaults(&sensor.settings))
        .extract()
        .map_err(|e| ResolveError::Malformed {
            sensor: sensor.name.clone(),
            source: Box::new(e),
        })?;

    settings.validate().map_err(|source| ResolveError::Invalid {
        sensor: sensor.name.clone(),
        source,
    })?;

    Ok(ResolvedSensor {
        name: sensor.name.clone(),
        start_paused: sensor.start_paused,
        debug_visuals: sensor.debug_visuals,
        pose: sensor.pose.clone(),
        settings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::structs::ScenarioConfig;
    use figment::{
        providers::{Format, Toml},
        value::Value,
    };

    fn catalog_with(key: &str, toml: &str) -> PresetCatalog {
        let value: Value = Figment::new().merge(Toml::string(toml)).extract().unwrap();
        let mut catalog = PresetCatalog::default();
        catalog.0.insert(key.to_string(), value);
        catalog
    }

    fn sensors(toml: &str) -> Vec<SensorConfig> {
        let scenario: ScenarioConfig = Figment::new().merge(Toml::string(toml)).extract().unwrap();
        scenario.sensors
    }

    #[test]
    fn bare_sensor_gets_default_settings() {
        let sensor = &sensors("[[sensors]]\nname = \"plain\"")[0];
        let resolved = resolve_sensor(sensor, &PresetCatalog::default()).unwrap();
        assert_eq!(resolved.settings, LidarSettings::default());
    }

    #[test]
    fn overrides_win_over_preset_and_preset_over_defaults() {
        let catalog = catalog_with(
            "lidars.puck16",
            "number_of_lasers = 16\nrotation_speed_hz = 10.0\nrotation_angle_per_step = 0.2",
        );
        let sensor = &sensors(
            r#"
            [[sensors]]
            name = "roof"
            from = "lidars.puck16"
            settings = { rotation_speed_hz = 5.0 }
            "#,
        )[0];

        let resolved = resolve_sensor(sensor, &catalog).unwrap();
        assert_eq!(resolved.settings.number_of_lasers, 16);
        assert_eq!(resolved.settings.rotation_speed_hz, 5.0);
        assert_eq!(resolved.settings.rotation_angle_per_step, 0.2);
        assert_eq!(resolved.settings.ray_distance, LidarSettings::default().ray_distance);
    }

    #[test]
    fn unknown_preset_is_reported() {
        let sensor = &sensors("[[sensors]]\nname = \"a\"\nfrom = \"lidars.nope\"")[0];
        let err = resolve_sensor(sensor, &PresetCatalog::default()).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownPreset { ref preset, .. } if preset == "lidars.nope"));
    }

    #[test]
    fn misspelled_setting_is_malformed() {
        let sensor = &sensors("[[sensors]]\nname = \"a\"\nsettings = { lasers = 4 }")[0];
        let err = resolve_sensor(sensor, &PresetCatalog::default()).unwrap_err();
        assert!(matches!(err, ResolveError::Malformed { .. }));
    }

    #[test]
    fn odd_laser_count_fails_validation() {
        let sensor = &sensors("[[sensors]]\nname = \"a\"\nsettings = { number_of_lasers = 5 }")[0];
        let err = resolve_sensor(sensor, &PresetCatalog::default()).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Invalid {
                source: ConfigError::OddLaserCount(5),
                ..
            }
        ));
    }
}
