// lidar_sim/examples/headless_reconfigure.rs

//! Runs a single LiDAR headless in a hand-built scenario and reconfigures it
//! mid-run through an `ApplyLidarSettings` event.
//!
//! To run this example:
//! `cargo run -p lidar_sim --example headless_reconfigure`

use std::path::PathBuf;

use lidar_sim::build_app;
use lidar_sim::cli::Cli;
use lidar_sim::prelude::*;
use nalgebra::Vector3;

fn main() -> AppExit {
    let cli = Cli {
        scenario: PathBuf::from("<in-memory>"),
        catalog: PathBuf::from("assets/catalog"),
        headless: true,
        log_filter: "info,lidar_sim=info,lidar_core=warn".to_string(),
        print_config: false,
    };

    let scenario = ScenarioConfig {
        simulation: SimulationSection {
            tick_rate_hz: 50.0,
            duration_seconds: Some(4.0),
            ..default()
        },
        world: WorldConfig {
            ground_plane: Some(GroundPlaneConfig {
                height: 0.0,
                half_extent: 50.0,
            }),
            obstacles: vec![ObstacleConfig {
                name: "wall".to_string(),
                center: Vector3::new(6.0, 0.0, 1.0),
                half_extents: Vector3::new(0.2, 5.0, 1.0),
            }],
        },
        sensors: vec![SensorConfig {
            name: "demo".to_string(),
            from: None,
            start_paused: false,
            debug_visuals: false,
            pose: Pose {
                translation: Vector3::new(0.0, 0.0, 1.0),
                ..default()
            },
            settings: Default::default(),
        }],
    };

    let mut app = build_app(cli, scenario);
    app.add_systems(
        Update,
        (densify_after_two_seconds, print_scans).run_if(in_state(AppState::Running)),
    );
    app.run()
}

/// Switches the sensor to 16 lasers once, two seconds in.
fn densify_after_two_seconds(
    time: Res<Time>,
    mut done: Local<bool>,
    sensors: Query<Entity, With<RotatingLidarSensor>>,
    mut writer: EventWriter<ApplyLidarSettings>,
) {
    if *done || time.elapsed_secs() < 2.0 {
        return;
    }
    for sensor in &sensors {
        writer.write(ApplyLidarSettings {
            sensor,
            settings: LidarSettings {
                number_of_lasers: 16,
                rotation_angle_per_step: 5.0,
                ..default()
            },
        });
    }
    *done = true;
}

fn print_scans(mut scans: EventReader<ScanEvent>) {
    for scan in scans.read() {
        println!(
            "{:?}: {} points over {} step(s), lap at {:.2}s",
            scan.sensor,
            scan.batch.len(),
            scan.batch.steps,
            scan.batch.lap_timestamp
        );
    }
}
