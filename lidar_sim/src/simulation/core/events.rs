// lidar_sim/src/simulation/core/events.rs

use bevy::prelude::{Entity, Event};
use lidar_core::{config::LidarSettings, messages::ScanBatch, types::FrameHandle};

/// One batch of points published by a sensor during a fixed tick.
#[derive(Event, Debug, Clone)]
pub struct ScanEvent {
    pub sensor: FrameHandle,
    pub batch: ScanBatch,
}

/// Reconfigures a sensor. Takes effect at the start of that sensor's next tick.
#[derive(Event, Debug, Clone, Copy)]
pub struct ApplyLidarSettings {
    pub sensor: Entity,
    pub settings: LidarSettings,
}

/// Pauses (`true`) or resumes (`false`) every sensor.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetLidarPaused(pub bool);
