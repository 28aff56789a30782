// lidar_core/src/scanning/mod.rs

//! The rotating scan loop: fixed-step timing, the sensor aggregate that drives
//! it, and the emitter that publishes the resulting batches.

pub mod emitter;
pub mod rotating_lidar;
pub mod timing;

pub use emitter::{PendingBatch, ScanEmitter, ScanSubscriber, Subscription};
pub use rotating_lidar::{RotatingLidar, TickOutcome};
pub use timing::{
    precalculate_iterations, HorizontalAngle, RotationTiming, LAP_DEGREES, MAX_PRECALCULATE_ITERATIONS,
};
