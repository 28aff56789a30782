// lidar_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::models::perception::Raycaster;
pub use crate::scanning::ScanSubscriber;
pub use crate::types::{FrameHandle, VisualHandle};

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::{LidarSettings, SchedulerConfig};
pub use crate::error::{ConfigError, ScanError, SubscriberError};
pub use crate::messages::{ScanBatch, SphericalCoordinate};
pub use crate::models::perception::{laser::Laser, RayHit, RaycastHit, SensorRay};

// --- Scanning ---
pub use crate::models::perception::laser_array::build_laser_array;
pub use crate::scanning::{RotatingLidar, RotationTiming, Subscription, TickOutcome};
