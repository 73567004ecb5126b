//! One-dimensional dynamic water surface.
//!
//! Each column is a damped spring around the rest level. After the springs
//! are integrated, velocity is pushed between neighbors over several
//! relaxation passes so a local disturbance spreads out as a wave.

use crate::config::{
    DAMPING, FLOOR_DEPTH, PROPAGATION_PASSES, RESOLUTION, SPREAD, SPRING_CONSTANT,
    STABILITY_LIMIT, SURFACE_WIDTH,
};
use crate::simulation::surface_mesh::SurfaceMesh;
use crate::simulation::Point2;

/// Spring and propagation coefficients. All values are per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveParams {
    pub spring_constant: f32,
    pub damping: f32,
    pub spread: f32,
    pub passes: usize,
}

impl WaveParams {
    /// Whether explicit integration with these coefficients stays bounded.
    ///
    /// The stiffest lateral mode sees an effective spring of
    /// `spring_constant + 4 * spread * passes`, which has to stay under
    /// [`STABILITY_LIMIT`] for a unit step. Damping at or above 1 flips the
    /// sign of velocity every tick.
    pub fn is_within_stable_range(&self) -> bool {
        let stiffest = self.spring_constant + 4.0 * self.spread * self.passes as f32;
        self.spring_constant > 0.0
            && self.damping > 0.0
            && self.damping < 1.0
            && self.spread > 0.0
            && stiffest < STABILITY_LIMIT
    }
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            spring_constant: SPRING_CONSTANT,
            damping: DAMPING,
            spread: SPREAD,
            passes: PROPAGATION_PASSES,
        }
    }
}

/// Construction parameters for a [`WaveField`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveFieldConfig {
    /// Number of columns (at least 2)
    pub resolution: usize,
    /// Horizontal extent covered by the columns
    pub width: f32,
    /// World position of column 0 at rest
    pub origin: Point2,
    /// Distance from the rest level down to the floor
    pub floor_depth: f32,
    pub params: WaveParams,
}

impl Default for WaveFieldConfig {
    fn default() -> Self {
        Self {
            resolution: RESOLUTION,
            width: SURFACE_WIDTH,
            origin: Point2::default(),
            floor_depth: FLOOR_DEPTH,
            params: WaveParams::default(),
        }
    }
}

/// Height field sampled at evenly spaced columns.
///
/// State arrays all have `resolution` entries for the lifetime of the field
/// and are only mutated through [`step`](Self::step),
/// [`splash`](Self::splash) and [`reset`](Self::reset).
pub struct WaveField {
    config: WaveFieldConfig,
    displacement: Vec<f32>,
    velocity: Vec<f32>,
    acceleration: Vec<f32>,
    // Scratch for the relaxation passes, kept to avoid per-tick allocation
    left_deltas: Vec<f32>,
    right_deltas: Vec<f32>,
    mesh: SurfaceMesh,
}

impl WaveField {
    /// Create a field at rest
    pub fn new(config: WaveFieldConfig) -> Self {
        assert!(config.resolution >= 2, "A wave field needs at least 2 columns");
        assert!(
            config.width.is_finite() && config.width > 0.0,
            "Wave field width must be positive, got {}",
            config.width
        );

        if !config.params.is_within_stable_range() {
            log::warn!(
                "Wave parameters {:?} are outside the stable range, the surface may blow up",
                config.params
            );
        }

        let n = config.resolution;
        let displacement = vec![0.0; n];
        let mut mesh = SurfaceMesh::new(n);
        mesh.rebuild(&config, &displacement);

        Self {
            config,
            displacement,
            velocity: vec![0.0; n],
            acceleration: vec![0.0; n],
            left_deltas: vec![0.0; n],
            right_deltas: vec![0.0; n],
            mesh,
        }
    }

    /// Create a field with the canonical parameters
    pub fn new_default() -> Self {
        Self::new(WaveFieldConfig::default())
    }

    /// Advance the simulation by one tick.
    ///
    /// Order: spring accelerations for every column, then velocity and
    /// displacement integration, then the lateral relaxation passes, then
    /// the derived mesh. Velocity is integrated before displacement, so a
    /// velocity injected before this call already moves its column.
    pub fn step(&mut self) {
        let WaveParams {
            spring_constant,
            damping,
            spread,
            passes,
        } = self.config.params;

        for ((a, &d), &v) in self
            .acceleration
            .iter_mut()
            .zip(&self.displacement)
            .zip(&self.velocity)
        {
            *a = -spring_constant * d - v * damping;
        }

        for ((d, v), &a) in self
            .displacement
            .iter_mut()
            .zip(self.velocity.iter_mut())
            .zip(&self.acceleration)
        {
            *v += a;
            *d += *v;
        }

        let n = self.config.resolution;
        for _ in 0..passes {
            // Deltas come from the displacement at the start of the pass
            for i in 0..n {
                if i > 0 {
                    self.left_deltas[i] = spread * (self.displacement[i] - self.displacement[i - 1]);
                }
                if i + 1 < n {
                    self.right_deltas[i] = spread * (self.displacement[i] - self.displacement[i + 1]);
                }
            }

            for i in 0..n {
                if i > 0 {
                    self.velocity[i - 1] += self.left_deltas[i];
                }
                if i + 1 < n {
                    self.velocity[i + 1] += self.right_deltas[i];
                }
            }
        }

        self.mesh.rebuild(&self.config, &self.displacement);
    }

    /// Column nearest to a world x, clamped to the field.
    ///
    /// Halfway cases round to the even column. NaN maps to column 0.
    pub fn column_index(&self, world_x: f32) -> usize {
        let last = self.config.resolution - 1;
        let local_x = world_x - self.config.origin.x;
        let scaled = ((local_x / self.config.width) * last as f32).round_ties_even();
        scaled.clamp(0.0, last as f32) as usize
    }

    /// World x of a column
    pub fn column_x(&self, index: usize) -> f32 {
        self.config.origin.x + station_x(index, self.config.resolution, self.config.width)
    }

    /// Surface point of the column nearest to `world`, in world space.
    ///
    /// Only `world.x` matters; out-of-range positions resolve to the edge
    /// columns.
    pub fn closest_surface_point(&self, world: Point2) -> Point2 {
        let index = self.column_index(world.x);
        Point2::new(
            self.column_x(index),
            self.config.origin.y + self.displacement[index],
        )
    }

    /// World y of the surface at the column nearest to `world_x`
    #[allow(dead_code)]
    pub fn height_at(&self, world_x: f32) -> f32 {
        self.closest_surface_point(Point2::new(world_x, self.config.origin.y)).y
    }

    /// Set the velocity of the column nearest to `world_x`.
    ///
    /// Overwrites rather than adds. The disturbance spreads on the next
    /// [`step`](Self::step). Returns the column that was hit.
    pub fn splash(&mut self, world_x: f32, force: f32) -> usize {
        let index = self.column_index(world_x);
        self.velocity[index] = force;
        log::debug!(
            "Splash at index {} with force {:.3} at x = {:.3}",
            index,
            force,
            world_x
        );
        index
    }

    /// Downward probe against the water volume at rest.
    ///
    /// The collider is the rectangle between the rest level and the floor
    /// across the field width. Returns where a segment of `length` cast
    /// straight down from `from` first touches it. A probe starting inside
    /// the collider hits at its own start.
    pub fn probe(&self, from: Point2, length: f32) -> Option<Point2> {
        let left = self.config.origin.x;
        let right = left + self.config.width;
        let top = self.config.origin.y;
        let bottom = top - self.config.floor_depth;

        if from.x < left || from.x > right {
            return None;
        }
        if from.y < bottom || from.y - length > top {
            return None;
        }

        Some(Point2::new(from.x, from.y.min(top)))
    }

    /// Put every column back at rest
    pub fn reset(&mut self) {
        self.displacement.fill(0.0);
        self.velocity.fill(0.0);
        self.acceleration.fill(0.0);
        self.mesh.rebuild(&self.config, &self.displacement);
    }

    /// False once any state value has gone NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.displacement
            .iter()
            .chain(&self.velocity)
            .chain(&self.acceleration)
            .all(|value| value.is_finite())
    }

    pub fn resolution(&self) -> usize {
        self.config.resolution
    }

    pub fn width(&self) -> f32 {
        self.config.width
    }

    pub fn origin(&self) -> Point2 {
        self.config.origin
    }

    pub fn floor_depth(&self) -> f32 {
        self.config.floor_depth
    }

    #[allow(dead_code)]
    pub fn params(&self) -> &WaveParams {
        &self.config.params
    }

    pub fn displacements(&self) -> &[f32] {
        &self.displacement
    }

    #[allow(dead_code)]
    pub fn velocities(&self) -> &[f32] {
        &self.velocity
    }

    #[allow(dead_code)]
    pub fn accelerations(&self) -> &[f32] {
        &self.acceleration
    }

    /// Geometry derived from the last step
    pub fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }

    /// Polyline through the column tops, in world space
    pub fn surface_points(&self) -> &[Point2] {
        self.mesh.points()
    }
}

/// Local x of column `index`
pub(crate) fn station_x(index: usize, resolution: usize, width: f32) -> f32 {
    index as f32 * (width / (resolution - 1) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn scenario_field() -> WaveField {
        WaveField::new(WaveFieldConfig {
            resolution: 5,
            width: 4.0,
            ..WaveFieldConfig::default()
        })
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_state_arrays_sized_to_resolution() {
        let field = WaveField::new_default();
        assert_eq!(field.displacements().len(), RESOLUTION);
        assert_eq!(field.velocities().len(), RESOLUTION);
        assert_eq!(field.accelerations().len(), RESOLUTION);
        assert!(field.displacements().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_rest_stays_at_rest() {
        let mut field = WaveField::new_default();
        for _ in 0..500 {
            field.step();
        }
        assert!(field.displacements().iter().all(|&d| d == 0.0));
        assert!(field.velocities().iter().all(|&v| v == 0.0));
        assert!(field.accelerations().iter().all(|&a| a == 0.0));
    }

    #[test]
    fn test_single_step_after_splash() {
        let mut field = scenario_field();
        let index = field.splash(2.0, 1.0);
        assert_eq!(index, 2);

        field.step();

        // Damping takes 4% before the velocity moves the column
        assert_close(field.accelerations()[2], -0.04);
        assert_close(field.displacements()[2], 0.96);
        assert_close(field.displacements()[1], 0.0);
        assert_close(field.displacements()[3], 0.0);

        // 8 passes, each pulling 0.05 * 0.96 from both sides
        assert_close(field.velocities()[1], 0.384);
        assert_close(field.velocities()[3], 0.384);
        assert_close(field.velocities()[2], 0.96 - 8.0 * 2.0 * 0.048);
    }

    #[test]
    fn test_propagation_bounded_per_tick() {
        let mut field = scenario_field();
        field.splash(2.0, 1.0);
        field.step();

        let v = field.velocities();
        assert!(v[1] != 0.0 && v[3] != 0.0);
        assert_eq!(v[1], v[3]);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[4], 0.0);
    }

    #[test]
    fn test_disturbance_decays() {
        let mut field = WaveField::new_default();
        let center = field.column_x(RESOLUTION / 2);
        field.splash(center, 0.8);

        let mut peak = 0.0f32;
        for _ in 0..3000 {
            field.step();
            peak = field
                .displacements()
                .iter()
                .fold(peak, |acc, d| acc.max(d.abs()));
        }

        assert!(peak > 0.0);
        assert!(peak < 10.0, "surface grew to {}", peak);
        let remaining = field
            .displacements()
            .iter()
            .fold(0.0f32, |acc, d| acc.max(d.abs()));
        assert!(remaining < 1e-3, "surface still at {}", remaining);
        assert!(field.is_finite());
    }

    #[test]
    fn test_edge_columns_only_push_inward() {
        let mut field = scenario_field();
        field.splash(0.0, 1.0);
        field.step();

        let v = field.velocities();
        assert!(v[1] > 0.0);
        assert_eq!(v[2], 0.0);
        assert_eq!(v[4], 0.0);
    }

    #[test]
    fn test_column_index_clamps() {
        let field = scenario_field();
        assert_eq!(field.column_index(-1000.0), 0);
        assert_eq!(field.column_index(1000.0), 4);
        assert_eq!(field.column_index(f32::NAN), 0);
        assert_eq!(field.column_index(1.4), 1);
        assert_eq!(field.column_index(1.6), 2);
    }

    #[test]
    fn test_splash_out_of_range_hits_edges() {
        let mut field = scenario_field();
        assert_eq!(field.splash(-50.0, 0.3), 0);
        assert_eq!(field.splash(50.0, 0.4), 4);
        assert_eq!(field.velocities()[0], 0.3);
        assert_eq!(field.velocities()[4], 0.4);
    }

    #[test]
    fn test_splash_overwrites_velocity() {
        let mut field = scenario_field();
        field.splash(2.0, 1.0);
        field.splash(2.0, 0.25);
        assert_eq!(field.velocities()[2], 0.25);
    }

    #[test]
    fn test_query_at_rest_returns_station() {
        let field = WaveField::new(WaveFieldConfig {
            resolution: 5,
            width: 4.0,
            origin: Point2::new(10.0, -2.0),
            ..WaveFieldConfig::default()
        });

        assert_eq!(
            field.closest_surface_point(Point2::new(12.9, 7.0)),
            Point2::new(13.0, -2.0)
        );
        assert_eq!(
            field.closest_surface_point(Point2::new(-100.0, 0.0)),
            Point2::new(10.0, -2.0)
        );
        assert_eq!(field.height_at(100.0), -2.0);
    }

    #[test]
    fn test_query_follows_displacement() {
        let mut field = scenario_field();
        field.splash(2.0, 1.0);
        field.step();
        assert_close(field.height_at(2.1), field.displacements()[2]);
    }

    #[test]
    fn test_probe_hits_rest_level() {
        let field = scenario_field();

        assert_eq!(
            field.probe(Point2::new(1.0, 0.3), 0.5),
            Some(Point2::new(1.0, 0.0))
        );
        // Too short to reach
        assert_eq!(field.probe(Point2::new(1.0, 0.6), 0.5), None);
        // Outside horizontally
        assert_eq!(field.probe(Point2::new(4.5, 0.3), 0.5), None);
        // Starting inside the water
        assert_eq!(
            field.probe(Point2::new(1.0, -1.0), 0.5),
            Some(Point2::new(1.0, -1.0))
        );
        // Below the floor
        assert_eq!(field.probe(Point2::new(1.0, -6.0), 0.5), None);
    }

    #[test]
    fn test_reset_and_finite_guard() {
        let mut field = WaveField::new(WaveFieldConfig {
            resolution: 5,
            width: 4.0,
            params: WaveParams {
                spring_constant: 3.0,
                damping: 0.0,
                spread: 0.5,
                passes: 8,
            },
            ..WaveFieldConfig::default()
        });
        assert!(!field.params().is_within_stable_range());

        field.splash(2.0, 1.0);
        for _ in 0..2000 {
            field.step();
        }
        assert!(!field.is_finite());

        field.reset();
        assert!(field.is_finite());
        assert!(field.displacements().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_default_params_are_stable() {
        assert!(WaveParams::default().is_within_stable_range());
    }

    #[test]
    #[should_panic]
    fn test_single_column_rejected() {
        WaveField::new(WaveFieldConfig {
            resolution: 1,
            ..WaveFieldConfig::default()
        });
    }
}
