// lidar_core/src/error.rs

use thiserror::Error;

/// Invalid sensor or scheduler parameters. Raised when settings are applied,
/// before any laser is rebuilt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("number of lasers must be even so it can be split between both FOV halves, got {0}")]
    OddLaserCount(u32),

    #[error("at least 2 lasers are required, got {0}")]
    TooFewLasers(u32),

    #[error("ray distance must be positive, got {0}")]
    NonPositiveRayDistance(f64),

    #[error("rotation speed must be non-zero")]
    ZeroRotationSpeed,

    #[error("rotation angle per step must be non-zero")]
    ZeroRotationStep,

    #[error("rotation angle per step must be at least 0.001 deg in magnitude, got {0}")]
    RotationStepTooSmall(f64),

    #[error("{steps} rotation steps per tick exceed the limit of {limit}")]
    TooManyStepsPerTick { steps: f64, limit: u32 },

    #[error("parameter `{0}` must be a finite number")]
    NonFiniteParameter(&'static str),

    #[error("tick budget divisor must be positive and finite, got {0}")]
    InvalidTickBudget(f64),
}

/// An error reported by a scan subscriber while it consumed a batch.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct SubscriberError(#[from] Box<dyn std::error::Error + Send + Sync>);

impl SubscriberError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }
}

/// Everything that can go wrong during a scheduler tick.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid lidar configuration: {0}")]
    Config(#[from] ConfigError),

    /// Publication stopped at the subscriber with this registration index.
    #[error("scan subscriber #{subscriber} failed")]
    Subscriber {
        subscriber: usize,
        #[source]
        source: SubscriberError,
    },

    #[error("tick duration must be positive and finite, got {0}")]
    InvalidTimestep(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn subscriber_failure_keeps_its_source() {
        let err = ScanError::Subscriber {
            subscriber: 2,
            source: SubscriberError::msg("disk full"),
        };
        assert_eq!(err.to_string(), "scan subscriber #2 failed");
        assert_eq!(err.source().unwrap().to_string(), "disk full");
    }

    #[test]
    fn config_error_converts_into_scan_error() {
        let err: ScanError = ConfigError::OddLaserCount(3).into();
        assert!(matches!(err, ScanError::Config(ConfigError::OddLaserCount(3))));
    }
}
