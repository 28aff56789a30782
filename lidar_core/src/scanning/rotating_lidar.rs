// lidar_core/src/scanning/rotating_lidar.rs

use nalgebra::{Isometry3, UnitQuaternion, Vector3};

use super::emitter::{ScanEmitter, ScanSubscriber, Subscription};
use super::timing::{HorizontalAngle, RotationTiming};
use crate::config::{LidarSettings, SchedulerConfig};
use crate::error::{ConfigError, ScanError};
use crate::messages::ScanBatch;
use crate::models::perception::laser::Laser;
use crate::models::perception::laser_array::build_laser_array;
use crate::models::perception::Raycaster;

/// What a single call to [`RotatingLidar::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The sensor is paused; nothing was fired or published.
    Paused,
    /// Not enough simulated time has passed since the last executed tick.
    Waiting,
    /// Rotation steps were executed and this batch was handed to every subscriber.
    Published(ScanBatch),
}

#[derive(Debug, Clone, Copy)]
struct CachedTiming {
    dt: f64,
    timing: RotationTiming,
}

/// A rotating multi-beam LiDAR driven by a fixed simulation tick.
///
/// The host calls [`tick`](Self::tick) once per fixed step. Each executed tick
/// rotates the sensor `precalculate_iterations` times, fires every laser after each
/// rotation and publishes the collected points together with the time of the
/// last completed lap.
#[derive(Debug)]
pub struct RotatingLidar {
    settings: LidarSettings,
    scheduler: SchedulerConfig,
    lasers: Vec<Laser>,
    pending_settings: Option<LidarSettings>,
    timing: Option<CachedTiming>,
    horizontal_angle: HorizontalAngle,
    last_update: f64,
    lap_timestamp: f64,
    paused: bool,
    emitter: ScanEmitter,
}

impl RotatingLidar {
    pub fn new(settings: LidarSettings, scheduler: SchedulerConfig) -> Result<Self, ConfigError> {
        scheduler.validate()?;
        let lasers = build_laser_array(&settings)?;
        Ok(Self {
            settings,
            scheduler,
            lasers,
            pending_settings: None,
            timing: None,
            horizontal_angle: HorizontalAngle::default(),
            last_update: 0.0,
            lap_timestamp: 0.0,
            paused: false,
            emitter: ScanEmitter::new(),
        })
    }

    // --- Accessors ---

    pub fn settings(&self) -> &LidarSettings {
        &self.settings
    }

    pub fn scheduler(&self) -> &SchedulerConfig {
        &self.scheduler
    }

    pub fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    /// Current rotation in `[0, 360)` degrees.
    pub fn horizontal_angle(&self) -> f64 {
        self.horizontal_angle.degrees()
    }

    /// Simulation time of the most recently completed lap.
    pub fn lap_timestamp(&self) -> f64 {
        self.lap_timestamp
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn has_pending_settings(&self) -> bool {
        self.pending_settings.is_some()
    }

    // --- Control ---

    /// Takes effect at the next tick boundary.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            log::debug!("Lidar {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Validates `settings` and rebuilds the laser set from scratch.
    ///
    /// On error nothing changes. The pause flag and current rotation are kept.
    pub fn apply_settings(&mut self, settings: LidarSettings) -> Result<(), ConfigError> {
        let lasers = build_laser_array(&settings)?;
        self.settings = settings;
        self.lasers = lasers;
        self.timing = None;
        Ok(())
    }

    /// Stores `settings` to be applied at the start of the next tick, so a tick
    /// never sees two different laser sets.
    pub fn queue_settings(&mut self, settings: LidarSettings) {
        self.pending_settings = Some(settings);
    }

    pub fn set_scheduler(&mut self, scheduler: SchedulerConfig) -> Result<(), ConfigError> {
        scheduler.validate()?;
        self.scheduler = scheduler;
        self.timing = None;
        Ok(())
    }

    pub fn subscribe(&self, subscriber: impl ScanSubscriber + 'static) -> Subscription {
        self.emitter.subscribe(subscriber)
    }

    // --- Scanning ---

    /// Timing for a host tick of `dt` seconds. Recomputed only when `dt`, the
    /// settings or the scheduler change. Fails when `dt` is too long to fold the
    /// required steps into one tick.
    pub fn timing(&mut self, dt: f64) -> Result<RotationTiming, ConfigError> {
        match self.timing {
            Some(cached) if cached.dt == dt => Ok(cached.timing),
            previous => {
                let timing = RotationTiming::compute(&self.settings, &self.scheduler, dt)?;
                let changed = previous
                    .map_or(true, |p| p.timing.precalculate_iterations != timing.precalculate_iterations);
                if changed && timing.precalculate_iterations > 1 {
                    log::debug!(
                        "{:.1} steps per lap exceed the {:.1} affordable per tick; folding {} steps into each tick",
                        timing.steps_per_lap,
                        timing.max_steps_per_tick,
                        timing.precalculate_iterations
                    );
                }
                self.timing = Some(CachedTiming { dt, timing });
                Ok(timing)
            }
        }
    }

    /// The sensor frame at the current rotation: `mount_pose` yawed about its +Z axis.
    pub fn current_frame(&self, mount_pose: &Isometry3<f64>) -> Isometry3<f64> {
        let yaw = UnitQuaternion::from_axis_angle(
            &Vector3::z_axis(),
            self.horizontal_angle.degrees().to_radians(),
        );
        mount_pose * yaw
    }

    /// Runs one fixed simulation tick.
    ///
    /// `now` is the host's fixed-step clock and `dt` its fixed step, both in seconds.
    /// `mount_pose` is where the sensor is mounted in the world, before rotation.
    pub fn tick(
        &mut self,
        now: f64,
        dt: f64,
        mount_pose: &Isometry3<f64>,
        raycaster: &dyn Raycaster,
    ) -> Result<TickOutcome, ScanError> {
        if let Some(settings) = self.pending_settings.take() {
            if let Err(e) = self.apply_settings(settings) {
                log::warn!("Rejected queued lidar settings, keeping previous ones: {e}");
                return Err(e.into());
            }
            log::debug!("Applied queued lidar settings ({} lasers)", self.lasers.len());
        }

        if self.paused {
            return Ok(TickOutcome::Paused);
        }

        if !dt.is_finite() || dt <= 0.0 {
            return Err(ScanError::InvalidTimestep(dt));
        }

        let timing = self.timing(dt)?;
        if !timing.is_due(now, self.last_update) {
            return Ok(TickOutcome::Waiting);
        }
        self.last_update = now;

        let step = self.settings.rotation_angle_per_step;
        let mut pending = self.emitter.begin_tick();
        for _ in 0..timing.precalculate_iterations {
            if self.horizontal_angle.advance(step) {
                self.lap_timestamp = now;
            }

            let frame = self.current_frame(mount_pose);
            let angle = self.horizontal_angle.degrees();
            for laser in &self.lasers {
                let hit = laser.shoot_ray(&frame, raycaster);
                pending.on_laser_hit(laser, &hit, angle);
            }
        }

        let batch = pending.finish(self.lap_timestamp, timing.precalculate_iterations);
        log::trace!(
            "Lidar tick at {now:.4}s: {} steps, {} points, angle {:.2}",
            batch.steps,
            batch.len(),
            self.horizontal_angle.degrees()
        );
        self.emitter.publish(&batch)?;
        Ok(TickOutcome::Published(batch))
    }
}
