// lidar_sim/src/simulation/plugins/consumers/scan_stats.rs

//! A downstream consumer of `ScanEvent`s that reports per-lap throughput.

use std::collections::HashMap;

use crate::prelude::*;
use crate::simulation::core::events::ScanEvent;

/// Running totals for one sensor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorStats {
    pub batches: u64,
    pub total_points: u64,
    pub laps: u64,
    points_this_lap: u64,
    last_lap_timestamp: Option<f64>,
}

/// Emitted when a batch reports a new lap timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapSummary {
    pub lap_timestamp: f64,
    pub lap_duration: f64,
    pub points: u64,
    pub points_per_second: f64,
}

impl SensorStats {
    /// Accounts for `batch`. Returns a summary when it closes a lap.
    pub fn record(&mut self, batch: &ScanBatch) -> Option<LapSummary> {
        self.batches += 1;
        self.total_points += batch.len() as u64;
        self.points_this_lap += batch.len() as u64;

        let previous = self.last_lap_timestamp.replace(batch.lap_timestamp);
        let previous = previous?;
        if batch.lap_timestamp == previous {
            return None;
        }

        self.laps += 1;
        let lap_duration = batch.lap_timestamp - previous;
        let points = std::mem::take(&mut self.points_this_lap);
        Some(LapSummary {
            lap_timestamp: batch.lap_timestamp,
            lap_duration,
            points,
            points_per_second: if lap_duration > 0.0 {
                points as f64 / lap_duration
            } else {
                0.0
            },
        })
    }
}

#[derive(Resource, Debug, Default)]
pub struct ScanStats(pub HashMap<FrameHandle, SensorStats>);

pub struct ScanStatsPlugin;

impl Plugin for ScanStatsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScanStats>().add_systems(
            FixedUpdate,
            scan_stats_system.in_set(SimulationSet::Consumers),
        );
    }
}

fn scan_stats_system(
    mut scans: EventReader<ScanEvent>,
    mut stats: ResMut<ScanStats>,
    names: Query<&Name>,
) {
    for event in scans.read() {
        let sensor_stats = stats.0.entry(event.sensor).or_default();
        let Some(summary) = sensor_stats.record(&event.batch) else {
            continue;
        };
        let laps = sensor_stats.laps;
        let name = names
            .get(event.sensor.to_entity())
            .map(|n| n.as_str().to_string())
            .unwrap_or_else(|_| format!("{:?}", event.sensor));
        info!(
            "[{}] lap {} closed at {:.2}s: {} points in {:.2}s ({:.0} pts/s)",
            name,
            laps,
            summary.lap_timestamp,
            summary.points,
            summary.lap_duration,
            summary.points_per_second
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use lidar_core::messages::SphericalCoordinate;
    use nalgebra::Point3;

    fn batch(lap_timestamp: f64, points: usize) -> ScanBatch {
        let point = SphericalCoordinate {
            radius: 1.0,
            inclination: 0.0,
            azimuth: 0.0,
            world_point: Point3::origin(),
            laser_id: 0,
        };
        ScanBatch {
            lap_timestamp,
            steps: 1,
            points: vec![point; points],
        }
    }

    #[test]
    fn first_batch_only_sets_the_baseline() {
        let mut stats = SensorStats::default();
        assert_eq!(stats.record(&batch(0.0, 3)), None);
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.laps, 0);
    }

    #[test]
    fn lap_change_reports_throughput() {
        let mut stats = SensorStats::default();
        stats.record(&batch(0.0, 10));
        stats.record(&batch(0.0, 10));
        let summary = stats.record(&batch(0.5, 5)).unwrap();

        assert_eq!(summary.points, 25);
        assert_abs_diff_eq!(summary.lap_duration, 0.5);
        assert_abs_diff_eq!(summary.points_per_second, 50.0);
        assert_eq!(stats.laps, 1);
        assert_eq!(stats.total_points, 25);

        // Counting restarts for the next lap.
        let next = stats.record(&batch(1.0, 4)).unwrap();
        assert_eq!(next.points, 4);
        assert_eq!(stats.laps, 2);
    }
}
