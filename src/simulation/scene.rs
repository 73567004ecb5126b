//! Fixed-step host for one water field and the bodies dropped into it.

use rand::Rng;

use crate::config::{GRAVITY, MAX_BODIES, TICK_RATE};
use crate::simulation::{
    BodySpawner, FallingBody, ImpactConfig, ImpactDetector, SplashEvent, WaveField,
};

/// A body paired with the detector watching it
#[derive(Clone, Copy, Debug)]
pub struct TrackedBody {
    pub body: FallingBody,
    pub detector: ImpactDetector,
}

pub struct WaterScene {
    field: WaveField,
    bodies: Vec<TrackedBody>,
    spawner: BodySpawner,
    impact: ImpactConfig,
    dt: f32,
    gravity: f32,
    tick_count: u64,
    splash_count: u64,
}

impl WaterScene {
    pub fn new(field: WaveField, impact: ImpactConfig) -> Self {
        Self {
            field,
            bodies: Vec::with_capacity(MAX_BODIES),
            spawner: BodySpawner::default(),
            impact,
            dt: 1.0 / TICK_RATE,
            gravity: GRAVITY,
            tick_count: 0,
            splash_count: 0,
        }
    }

    pub fn new_default() -> Self {
        Self::new(WaveField::new_default(), ImpactConfig::default())
    }

    /// Start tracking a body. Returns false when the scene is full.
    pub fn drop_body(&mut self, body: FallingBody) -> bool {
        if self.bodies.len() >= MAX_BODIES {
            return false;
        }
        log::debug!(
            "Dropping body at ({:.2}, {:.2})",
            body.position.x,
            body.position.y
        );
        self.bodies.push(TrackedBody {
            body,
            detector: ImpactDetector::new(self.impact),
        });
        true
    }

    /// Drop a body at a random spot over the water
    pub fn spawn_random(&mut self, rng: &mut impl Rng) -> bool {
        let body = self.spawner.spawn(&self.field, rng);
        self.drop_body(body)
    }

    /// Advance bodies, detection and the field by one tick.
    ///
    /// Detection runs before the field steps, so splashes found this tick
    /// are integrated this tick.
    pub fn tick(&mut self) -> Vec<SplashEvent> {
        let mut events = Vec::new();

        for tracked in &mut self.bodies {
            tracked.body.integrate(self.dt, self.gravity);
            if let Some(event) = tracked.detector.update(&tracked.body, &mut self.field) {
                events.push(event);
            }
        }

        self.field.step();

        if !self.field.is_finite() {
            log::warn!(
                "Water surface went non-finite at tick {}, resetting to rest",
                self.tick_count
            );
            self.field.reset();
        }

        let floor = self.field.origin().y - self.field.floor_depth();
        let before = self.bodies.len();
        self.bodies.retain(|tracked| tracked.body.position.y >= floor);
        if self.bodies.len() < before {
            log::debug!("Removed {} bodies below the floor", before - self.bodies.len());
        }

        self.tick_count += 1;
        self.splash_count += events.len() as u64;
        events
    }

    /// Clear bodies and put the water back at rest
    pub fn reset(&mut self) {
        self.bodies.clear();
        self.field.reset();
        self.tick_count = 0;
        self.splash_count = 0;
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }

    pub fn bodies(&self) -> &[TrackedBody] {
        &self.bodies
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn splash_count(&self) -> u64 {
        self.splash_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Point2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_drop_splashes_once_then_sinks_out() {
        let mut scene = WaterScene::new_default();
        assert!(scene.drop_body(FallingBody::new(Point2::new(5.0, 6.0))));

        let mut events = Vec::new();
        for _ in 0..600 {
            events.extend(scene.tick());
            if scene.bodies().is_empty() {
                break;
            }
        }

        assert_eq!(events.len(), 1);
        assert_eq!(scene.splash_count(), 1);
        let event = events[0];
        assert!(event.impact_speed > crate::config::FORCE_RAMP_START);
        assert!(event.force > 0.5 && event.force <= 0.8 + 1e-6);
        assert!(scene.bodies().is_empty());
    }

    #[test]
    fn test_splash_moves_water_on_same_tick() {
        let mut scene = WaterScene::new_default();
        scene.drop_body(FallingBody::with_velocity(Point2::new(5.0, 0.45), 0.0, -9.0));

        let events = scene.tick();
        assert_eq!(events.len(), 1);
        let column = events[0].column;
        assert!(scene.field().displacements()[column] > 0.0);
    }

    #[test]
    fn test_gentle_drop_makes_no_splash() {
        let mut scene = WaterScene::new_default();
        scene.drop_body(FallingBody::with_velocity(Point2::new(5.0, 0.45), 0.0, -0.5));

        for _ in 0..5 {
            assert!(scene.tick().is_empty());
        }
        assert!(scene.field().velocities().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_capacity_and_reset() {
        let mut scene = WaterScene::new_default();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..MAX_BODIES {
            assert!(scene.spawn_random(&mut rng));
        }
        assert!(!scene.spawn_random(&mut rng));

        for _ in 0..10 {
            scene.tick();
        }
        scene.reset();
        assert!(scene.bodies().is_empty());
        assert_eq!(scene.tick_count(), 0);
        assert!(scene.field().displacements().iter().all(|&d| d == 0.0));
    }
}
