// lidar_core/src/scanning/emitter.rs

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::error::{ScanError, SubscriberError};
use crate::messages::{ScanBatch, SphericalCoordinate};
use crate::models::perception::{laser::Laser, RayHit};

// =========================================================================
// == Subscribers ==
// =========================================================================

/// A consumer of published scan batches.
///
/// Subscribers run synchronously inside the tick that produced the batch and must
/// not subscribe or unsubscribe from within `on_scan`.
pub trait ScanSubscriber: Send {
    fn on_scan(
        &mut self,
        lap_timestamp: f64,
        points: &[SphericalCoordinate],
    ) -> Result<(), SubscriberError>;
}

impl<F> ScanSubscriber for F
where
    F: FnMut(f64, &[SphericalCoordinate]) -> Result<(), SubscriberError> + Send,
{
    fn on_scan(
        &mut self,
        lap_timestamp: f64,
        points: &[SphericalCoordinate],
    ) -> Result<(), SubscriberError> {
        self(lap_timestamp, points)
    }
}

#[derive(Default)]
struct Registry {
    next_key: u64,
    entries: Vec<(u64, Box<dyn ScanSubscriber>)>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // A panicking subscriber must not take every later publication down with it.
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keeps a subscriber registered for as long as it is alive.
#[must_use = "dropping a Subscription unregisters the subscriber immediately"]
pub struct Subscription {
    key: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Leaves the subscriber registered for the emitter's whole lifetime.
    pub fn detach(mut self) {
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).entries.retain(|(key, _)| *key != self.key);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("key", &self.key).finish()
    }
}

// =========================================================================
// == Emitter ==
// =========================================================================

/// Turns laser hits into scan points and fans finished batches out to subscribers.
#[derive(Default)]
pub struct ScanEmitter {
    registry: Arc<Mutex<Registry>>,
}

impl ScanEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: impl ScanSubscriber + 'static) -> Subscription {
        let mut registry = lock(&self.registry);
        let key = registry.next_key;
        registry.next_key += 1;
        registry.entries.push((key, Box::new(subscriber)));
        Subscription {
            key,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).entries.len()
    }

    /// Starts an empty batch owned by the calling tick.
    pub fn begin_tick(&self) -> PendingBatch {
        PendingBatch::default()
    }

    /// Hands `batch` to every subscriber in registration order. The first failure
    /// stops publication and is returned.
    pub fn publish(&self, batch: &ScanBatch) -> Result<(), ScanError> {
        let mut registry = lock(&self.registry);
        for (index, (_, subscriber)) in registry.entries.iter_mut().enumerate() {
            subscriber
                .on_scan(batch.lap_timestamp, &batch.points)
                .map_err(|source| ScanError::Subscriber {
                    subscriber: index,
                    source,
                })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ScanEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanEmitter")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Points collected during a single tick.
#[derive(Debug, Default)]
pub struct PendingBatch {
    points: Vec<SphericalCoordinate>,
}

impl PendingBatch {
    /// Records a shot. Misses (`distance == 0`) are dropped.
    pub fn on_laser_hit(&mut self, laser: &Laser, hit: &RayHit, horizontal_angle: f64) {
        if hit.distance == 0.0 {
            return;
        }
        let Some(world_point) = hit.point else {
            return;
        };
        self.points.push(SphericalCoordinate {
            radius: hit.distance,
            inclination: laser.vertical_angle(),
            azimuth: horizontal_angle,
            world_point,
            laser_id: laser.id(),
        });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn finish(self, lap_timestamp: f64, steps: u32) -> ScanBatch {
        ScanBatch {
            lap_timestamp,
            steps,
            points: self.points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(name: &'static str, log: &Log) -> impl ScanSubscriber + 'static {
        let log = Arc::clone(log);
        move |lap: f64, points: &[SphericalCoordinate]| -> Result<(), SubscriberError> {
            log.lock()
                .unwrap()
                .push(format!("{name}:{lap}:{}", points.len()));
            Ok(())
        }
    }

    fn hit(laser_id: u32, distance: f64) -> RayHit {
        RayHit {
            laser_id,
            distance,
            point: Some(Point3::new(distance, 0.0, 0.0)),
        }
    }

    #[test]
    fn zero_distance_is_discarded() {
        let laser = Laser::new(0, 5.0, 10.0, 0.0);
        let mut pending = PendingBatch::default();
        pending.on_laser_hit(&laser, &RayHit::miss(0), 90.0);
        pending.on_laser_hit(&laser, &hit(0, 0.0), 90.0);
        assert!(pending.is_empty());
    }

    #[test]
    fn hits_carry_laser_identity_and_angles() {
        let laser = Laser::new(4, -12.5, 10.0, 0.0);
        let mut pending = PendingBatch::default();
        pending.on_laser_hit(&laser, &hit(4, 3.0), 135.0);

        let batch = pending.finish(2.0, 1);
        assert_eq!(batch.len(), 1);
        let p = batch.points[0];
        assert_eq!(p.laser_id, 4);
        assert_eq!(p.inclination, -12.5);
        assert_eq!(p.azimuth, 135.0);
        assert_eq!(p.radius, 3.0);
        assert_eq!(p.world_point, Point3::new(3.0, 0.0, 0.0));
        assert_eq!(batch.lap_timestamp, 2.0);
        assert_eq!(batch.steps, 1);
    }

    #[test]
    fn publishes_in_registration_order() {
        let emitter = ScanEmitter::new();
        let log = Log::default();
        let _a = emitter.subscribe(recorder("a", &log));
        let _b = emitter.subscribe(recorder("b", &log));

        emitter.publish(&ScanBatch::default()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a:0:0", "b:0:0"]);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let emitter = ScanEmitter::new();
        let log = Log::default();
        let a = emitter.subscribe(recorder("a", &log));
        let _b = emitter.subscribe(recorder("b", &log));
        drop(a);

        assert_eq!(emitter.subscriber_count(), 1);
        emitter.publish(&ScanBatch::default()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["b:0:0"]);
    }

    #[test]
    fn detached_subscription_stays_registered() {
        let emitter = ScanEmitter::new();
        let log = Log::default();
        emitter.subscribe(recorder("a", &log)).detach();

        emitter.publish(&ScanBatch::default()).unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn failing_subscriber_halts_publication() {
        let emitter = ScanEmitter::new();
        let log = Log::default();
        let _a = emitter.subscribe(recorder("a", &log));
        let _failing = emitter.subscribe(
            |_: f64, _: &[SphericalCoordinate]| -> Result<(), SubscriberError> {
                Err(SubscriberError::msg("consumer went away"))
            },
        );
        let _c = emitter.subscribe(recorder("c", &log));

        let err = emitter.publish(&ScanBatch::default()).unwrap_err();
        assert!(matches!(err, ScanError::Subscriber { subscriber: 1, .. }));
        assert_eq!(*log.lock().unwrap(), vec!["a:0:0"]);
    }

    #[test]
    fn subscription_outliving_emitter_is_harmless() {
        let emitter = ScanEmitter::new();
        let subscription = emitter
            .subscribe(|_: f64, _: &[SphericalCoordinate]| -> Result<(), SubscriberError> { Ok(()) });
        drop(emitter);
        drop(subscription);
    }
}
