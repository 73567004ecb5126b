//! Splash detection for a single falling body.
//!
//! A short probe is cast down from the body every tick. The coarse probe
//! only knows the water volume at rest, so on the tick it first touches,
//! the hit is checked against the actual surface height before anything is
//! injected.

use crate::config::{
    FORCE_RAMP_END, FORCE_RAMP_START, MAX_SPLASH_FORCE, MIN_IMPACT_VELOCITY, PROBE_LENGTH,
};
use crate::simulation::{FallingBody, Point2, WaveField};

/// Maps impact speed to injected force: zero below `ramp_start`,
/// `max_force` at or above `ramp_end`, linear in between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpactForceCurve {
    pub ramp_start: f32,
    pub ramp_end: f32,
    pub max_force: f32,
}

impl ImpactForceCurve {
    pub fn evaluate(&self, speed: f32) -> f32 {
        let span = self.ramp_end - self.ramp_start;
        let t = if span > 0.0 {
            ((speed - self.ramp_start) / span).clamp(0.0, 1.0)
        } else if speed >= self.ramp_end {
            1.0
        } else {
            0.0
        };
        lerp(0.0, self.max_force, t)
    }
}

impl Default for ImpactForceCurve {
    fn default() -> Self {
        Self {
            ramp_start: FORCE_RAMP_START,
            ramp_end: FORCE_RAMP_END,
            max_force: MAX_SPLASH_FORCE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpactConfig {
    /// Length of the downward probe
    pub probe_length: f32,
    /// Downward speed a body has to exceed to splash
    pub min_impact_velocity: f32,
    pub force_curve: ImpactForceCurve,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            probe_length: PROBE_LENGTH,
            min_impact_velocity: MIN_IMPACT_VELOCITY,
            force_curve: ImpactForceCurve::default(),
        }
    }
}

/// A disturbance injected by a detector
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplashEvent {
    pub column: usize,
    /// Surface point at the impact column, before the injection
    pub position: Point2,
    pub impact_speed: f32,
    pub force: f32,
}

/// Tracks whether one body was in the water last tick
#[derive(Clone, Copy, Debug)]
pub struct ImpactDetector {
    config: ImpactConfig,
    was_submerged: bool,
}

impl ImpactDetector {
    pub fn new(config: ImpactConfig) -> Self {
        Self {
            config,
            was_submerged: false,
        }
    }

    #[allow(dead_code)]
    pub fn was_submerged(&self) -> bool {
        self.was_submerged
    }

    /// Run one tick of detection for `body` against `field`.
    ///
    /// Returns the splash injected this tick, if any. At most one splash
    /// happens per entry into the water.
    pub fn update(&mut self, body: &FallingBody, field: &mut WaveField) -> Option<SplashEvent> {
        let Some(hit) = field.probe(body.position, self.config.probe_length) else {
            self.was_submerged = false;
            return None;
        };

        if self.was_submerged {
            return None;
        }

        let surface = field.closest_surface_point(hit);
        if hit.y > surface.y {
            // Touched the rest volume but the surface dipped below it here.
            // Left unlatched so the next tick tries again.
            log::trace!(
                "Probe hit at y = {:.3} is above surface y = {:.3}, no contact",
                hit.y,
                surface.y
            );
            return None;
        }

        self.was_submerged = true;

        if body.vy >= -self.config.min_impact_velocity {
            return None;
        }

        let impact_speed = (-body.vy).max(0.0);
        let force = self.config.force_curve.evaluate(impact_speed);
        let column = field.splash(hit.x, force);

        Some(SplashEvent {
            column,
            position: surface,
            impact_speed,
            force,
        })
    }
}

impl Default for ImpactDetector {
    fn default() -> Self {
        Self::new(ImpactConfig::default())
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
