// lidar_core/src/scanning/timing.rs

use crate::config::{LidarSettings, SchedulerConfig, MAX_STEPS_PER_LAP};
use crate::error::ConfigError;

/// Degrees in one lap.
pub const LAP_DEGREES: f64 = 360.0;
const LAP_STEPS: u32 = 360;
/// Upper bound on rotation steps folded into one executed tick. A multiple of a lap.
pub const MAX_PRECALCULATE_ITERATIONS: u32 = MAX_STEPS_PER_LAP as u32;

// =========================================================================
// == Fixed-Step Timing ==
// =========================================================================

/// How a sensor's rotation maps onto the host's fixed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationTiming {
    /// Rotation steps needed for one full lap.
    pub steps_per_lap: f64,
    /// Rotation steps the host can afford per tick.
    pub max_steps_per_tick: f64,
    /// Rotation steps folded into one executed tick.
    pub precalculate_iterations: u32,
    /// Simulated time that has to pass between two executed ticks.
    pub step_interval: f64,
}

impl RotationTiming {
    /// `dt` is the fixed tick duration in seconds and must be positive.
    ///
    /// Fails when a tick of `dt` would have to fold more than
    /// [`MAX_PRECALCULATE_ITERATIONS`] steps.
    pub fn compute(
        settings: &LidarSettings,
        scheduler: &SchedulerConfig,
        dt: f64,
    ) -> Result<Self, ConfigError> {
        let steps_per_lap = LAP_DEGREES / settings.rotation_angle_per_step.abs();
        let max_steps_per_tick = 1.0 / dt / scheduler.tick_budget_divisor;
        let precalculate_iterations = precalculate_iterations(steps_per_lap, max_steps_per_tick)?;
        // Rotation direction comes from the step sign, the rate only sets the pace.
        let step_interval = (1.0 / steps_per_lap / settings.rotation_speed_hz.abs())
            * precalculate_iterations as f64;

        Ok(Self {
            steps_per_lap,
            max_steps_per_tick,
            precalculate_iterations,
            step_interval,
        })
    }

    /// Whether an executed tick at `now` is due, given the last executed one.
    pub fn is_due(&self, now: f64, last_update: f64) -> bool {
        now - last_update > self.step_interval
    }
}

/// Number of rotation steps to execute per tick.
///
/// One step per tick while the host keeps up. Otherwise enough steps to hold the
/// requested rate on average, grown until the count divides a lap so lap boundaries
/// always fall on a step. Past one lap per tick no divisor exists, so the count is
/// rounded up to whole laps instead. Counts above [`MAX_PRECALCULATE_ITERATIONS`]
/// are rejected.
pub fn precalculate_iterations(
    steps_per_lap: f64,
    max_steps_per_tick: f64,
) -> Result<u32, ConfigError> {
    if steps_per_lap <= max_steps_per_tick {
        return Ok(1);
    }

    let ratio = (steps_per_lap / max_steps_per_tick).ceil();
    // Checked in f64 so the integer cast below can never saturate.
    if ratio.is_nan() || ratio > MAX_PRECALCULATE_ITERATIONS as f64 {
        return Err(ConfigError::TooManyStepsPerTick {
            steps: ratio,
            limit: MAX_PRECALCULATE_ITERATIONS,
        });
    }

    let mut iterations = ratio as u32;
    if iterations > LAP_STEPS {
        // Bounded by MAX_PRECALCULATE_ITERATIONS, itself a whole number of laps.
        return Ok(iterations.div_ceil(LAP_STEPS) * LAP_STEPS);
    }
    // Each pass strictly grows the count and never jumps past 360.
    while LAP_STEPS % iterations != 0 {
        iterations += LAP_STEPS % iterations;
    }
    Ok(iterations)
}

// =========================================================================
// == Horizontal Angle Bookkeeping ==
// =========================================================================

/// The sensor's accumulated rotation, kept in `[0, 360)` degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HorizontalAngle(f64);

impl HorizontalAngle {
    pub fn degrees(&self) -> f64 {
        self.0
    }

    /// Rotates by `step` degrees. Returns `true` when a lap boundary was crossed,
    /// in either direction.
    pub fn advance(&mut self, step: f64) -> bool {
        let raw = self.0 + step;
        let mut wrapped = raw.rem_euclid(LAP_DEGREES);
        // rem_euclid can round a tiny negative up to exactly 360.
        if wrapped >= LAP_DEGREES {
            wrapped = 0.0;
        }
        self.0 = wrapped;
        !(0.0..LAP_DEGREES).contains(&raw)
    }
}
