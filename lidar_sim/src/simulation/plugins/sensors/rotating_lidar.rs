// lidar_sim/src/simulation/plugins/sensors/rotating_lidar.rs

use avian3d::prelude::SpatialQuery;

use crate::prelude::*;
use crate::simulation::config::ResolvedSensors;
use crate::simulation::core::events::{ApplyLidarSettings, ScanEvent};
use crate::simulation::core::transforms::{
    bevy_global_transform_to_enu_iso, enu_iso_to_bevy_transform,
};
use crate::simulation::plugins::debugging::ShowDebugGizmos;

use super::raycasting::SpatialQueryRaycaster;

// =========================================================================
// == Components & Plugin ==
// =========================================================================

/// A spinning multi-beam LiDAR. Wraps the pure `RotatingLidar` model.
#[derive(Component)]
pub struct RotatingLidarSensor {
    pub model: RotatingLidar,
    /// Keeps the log subscriber attached for as long as the entity lives.
    _log_subscription: Subscription,
}

impl RotatingLidarSensor {
    pub fn new(name: &str, model: RotatingLidar) -> Self {
        let log_subscription = model.subscribe(LogScanSubscriber {
            sensor_name: name.to_string(),
        });
        Self {
            model,
            _log_subscription: log_subscription,
        }
    }
}

/// Logs every published batch through the core subscription API.
pub struct LogScanSubscriber {
    sensor_name: String,
}

impl ScanSubscriber for LogScanSubscriber {
    fn on_scan(
        &mut self,
        lap_timestamp: f64,
        points: &[SphericalCoordinate],
    ) -> Result<(), SubscriberError> {
        debug!(
            "[{}] {} point(s), last lap at {:.3}s",
            self.sensor_name,
            points.len(),
            lap_timestamp
        );
        Ok(())
    }
}

pub struct RotatingLidarPlugin;

impl Plugin for RotatingLidarPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_rotating_lidars.in_set(SceneBuildSet::Sensors),
        )
        .add_systems(
            Update,
            queue_lidar_settings
                .run_if(in_state(AppState::Running).or(in_state(AppState::Paused))),
        )
        .add_systems(OnEnter(AppState::Paused), pause_all_lidars)
        .add_systems(OnExit(AppState::Paused), resume_all_lidars)
        .add_systems(
            FixedUpdate,
            rotating_lidar_system
                .in_set(SimulationSet::Sensors)
                .run_if(in_state(AppState::Running).or(in_state(AppState::Paused))),
        );
    }
}

// =========================================================================
// == Spawning System ==
// =========================================================================

fn spawn_rotating_lidars(
    mut commands: Commands,
    resolved: Res<ResolvedSensors>,
    scenario: Res<ScenarioConfig>,
) {
    let scheduler = scenario.simulation.scheduler();

    for sensor in &resolved.0 {
        let mut model = match RotatingLidar::new(sensor.settings, scheduler) {
            Ok(model) => model,
            Err(e) => {
                error!("Cannot create LiDAR '{}': {}. Skipping.", sensor.name, e);
                continue;
            }
        };
        model.set_paused(sensor.start_paused);

        info!(
            "  -> Spawning LiDAR '{}' with {} lasers at {:.1} Hz{}",
            sensor.name,
            model.lasers().len(),
            sensor.settings.rotation_speed_hz,
            if sensor.start_paused { " (paused)" } else { "" }
        );

        let mut entity_commands = commands.spawn((
            Name::new(sensor.name.clone()),
            RotatingLidarSensor::new(&sensor.name, model),
            enu_iso_to_bevy_transform(&sensor.pose.to_isometry()),
        ));
        if sensor.debug_visuals {
            entity_commands.insert(ShowDebugGizmos);
        }
    }
}

// =========================================================================
// == Runtime Systems ==
// =========================================================================

/// Hands settings requests to their sensors. They take effect on the next tick.
fn queue_lidar_settings(
    mut requests: EventReader<ApplyLidarSettings>,
    mut sensor_query: Query<(&Name, &mut RotatingLidarSensor)>,
) {
    for request in requests.read() {
        match sensor_query.get_mut(request.sensor) {
            Ok((name, mut sensor)) => {
                info!("Queued new settings for LiDAR '{}'.", name);
                sensor.model.queue_settings(request.settings);
            }
            Err(_) => warn!(
                "Settings request for {:?} ignored: not a LiDAR.",
                request.sensor
            ),
        }
    }
}

fn pause_all_lidars(mut sensor_query: Query<&mut RotatingLidarSensor>) {
    for mut sensor in &mut sensor_query {
        sensor.model.set_paused(true);
    }
    info!("All LiDARs paused.");
}

fn resume_all_lidars(mut sensor_query: Query<&mut RotatingLidarSensor>) {
    for mut sensor in &mut sensor_query {
        sensor.model.set_paused(false);
    }
    info!("All LiDARs resumed.");
}

/// Runs every fixed tick: rotates, fires and publishes for each sensor.
fn rotating_lidar_system(
    mut scan_writer: EventWriter<ScanEvent>,
    time: Res<Time>,
    spatial_query: SpatialQuery,
    mut sensor_query: Query<(Entity, &Name, &mut RotatingLidarSensor, &GlobalTransform)>,
) {
    let now = time.elapsed_secs_f64();
    let dt = time.delta_secs_f64();

    for (entity, name, mut sensor, transform) in &mut sensor_query {
        let raycaster = SpatialQueryRaycaster::excluding(&spatial_query, entity);
        let mount_pose = bevy_global_transform_to_enu_iso(transform);

        match sensor.model.tick(now, dt, &mount_pose, &raycaster) {
            Ok(TickOutcome::Published(batch)) => {
                scan_writer.write(ScanEvent {
                    sensor: FrameHandle::from_entity(entity),
                    batch,
                });
            }
            Ok(TickOutcome::Paused | TickOutcome::Waiting) => {}
            Err(e) => error!("LiDAR '{}' tick failed: {}", name, e),
        }
    }
}
