use rand::Rng;

use crate::config::{MAX_DROP_HEIGHT, MIN_DROP_HEIGHT};
use crate::simulation::{Point2, WaveField};

/// A body falling under gravity. It does not float; water only watches it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallingBody {
    pub position: Point2,
    /// Horizontal velocity in units per second
    pub vx: f32,
    /// Vertical velocity in units per second, negative is down
    pub vy: f32,
}

impl FallingBody {
    /// Body at rest at `position`
    pub fn new(position: Point2) -> Self {
        Self {
            position,
            vx: 0.0,
            vy: 0.0,
        }
    }

    #[allow(dead_code)]
    pub fn with_velocity(position: Point2, vx: f32, vy: f32) -> Self {
        Self { position, vx, vy }
    }

    /// Semi-implicit Euler: velocity first, then position
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        self.vy -= gravity * dt;
        self.position.x += self.vx * dt;
        self.position.y += self.vy * dt;
    }
}

/// Random drop placement above a field
#[derive(Clone, Copy, Debug)]
pub struct BodySpawner {
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for BodySpawner {
    fn default() -> Self {
        Self {
            min_height: MIN_DROP_HEIGHT,
            max_height: MAX_DROP_HEIGHT,
        }
    }
}

impl BodySpawner {
    /// A body at rest somewhere over the field, `min_height..=max_height` above the rest level
    pub fn spawn(&self, field: &WaveField, rng: &mut impl Rng) -> FallingBody {
        let origin = field.origin();
        let x = origin.x + rng.gen_range(0.0..=field.width());
        let height = rng.gen_range(self.min_height..=self.max_height);
        FallingBody::new(Point2::new(x, origin.y + height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::WaveFieldConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_integrate_gravity() {
        let mut body = FallingBody::with_velocity(Point2::new(1.0, 10.0), 2.0, 0.0);
        body.integrate(0.5, 10.0);

        assert_eq!(body.vy, -5.0);
        assert_eq!(body.position, Point2::new(2.0, 7.5));
    }

    #[test]
    fn test_spawn_over_field() {
        let field = WaveField::new(WaveFieldConfig {
            origin: Point2::new(-3.0, 2.0),
            ..WaveFieldConfig::default()
        });
        let spawner = BodySpawner::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let body = spawner.spawn(&field, &mut rng);
            assert!(body.position.x >= -3.0 && body.position.x <= -3.0 + field.width());
            assert!(body.position.y >= 2.0 + MIN_DROP_HEIGHT);
            assert!(body.position.y <= 2.0 + MAX_DROP_HEIGHT);
            assert_eq!(body.vy, 0.0);
        }
    }
}
