/// Number of sample columns across the water surface
pub const RESOLUTION: usize = 64;

/// Physical width covered by the columns (world units)
pub const SURFACE_WIDTH: f32 = 10.0;

/// Depth of the flat floor below the rest level, used by the derived mesh and the probe collider
pub const FLOOR_DEPTH: f32 = 5.0;

// ============================================
// Spring / Propagation Parameters
// ============================================

/// Restoring force per unit displacement
pub const SPRING_CONSTANT: f32 = 0.02;

/// Velocity damping per tick
pub const DAMPING: f32 = 0.04;

/// Fraction of a neighbor height difference pushed into velocity per relaxation pass
pub const SPREAD: f32 = 0.05;

/// Relaxation passes per tick
pub const PROPAGATION_PASSES: usize = 8;

/// Explicit Euler with unit step stays bounded while the stiffest mode
/// (spring + 4 * spread * passes) is below this.
pub const STABILITY_LIMIT: f32 = 4.0;

// ============================================
// Tick Rate
// ============================================

/// Simulation ticks per second. `WaveField::step` assumes a unit step per tick.
pub const TICK_RATE: f32 = 60.0;

/// Upper bound on catch-up ticks per rendered frame
pub const MAX_TICKS_PER_FRAME: u32 = 5;

// ============================================
// Impact Detection
// ============================================

/// Length of the downward probe cast from each body
pub const PROBE_LENGTH: f32 = 0.5;

/// Bodies falling slower than this enter the water without a splash
pub const MIN_IMPACT_VELOCITY: f32 = 1.5;

/// Impact speed at which the injected force starts ramping up
pub const FORCE_RAMP_START: f32 = 5.0;

/// Impact speed at which the injected force reaches its ceiling
pub const FORCE_RAMP_END: f32 = 10.0;

/// Largest force an impact can inject
pub const MAX_SPLASH_FORCE: f32 = 0.8;

// ============================================
// Bodies
// ============================================

/// Downward acceleration applied to falling bodies (units per second squared)
pub const GRAVITY: f32 = 9.81;

/// Drop heights above the rest level for spawned bodies
pub const MIN_DROP_HEIGHT: f32 = 1.0;
pub const MAX_DROP_HEIGHT: f32 = 6.0;

/// Half extent of the square drawn for each body
pub const BODY_HALF_SIZE: f32 = 0.12;

/// Bodies alive at once; also sizes the GPU vertex buffer
pub const MAX_BODIES: usize = 64;

// ============================================
// View
// ============================================

/// World units of margin around the water in the window
pub const VIEW_MARGIN: f32 = 0.5;

/// World units visible above the rest level
pub const VIEW_HEADROOM: f32 = 7.0;

pub const WATER_COLOR: [f32; 4] = [0.2, 0.5, 1.0, 0.5];
pub const BODY_COLOR: [f32; 4] = [0.95, 0.8, 0.3, 1.0];

/// Half thickness of the highlighted band along the surface polyline
pub const CREST_THICKNESS: f32 = 0.03;
pub const CREST_COLOR: [f32; 4] = [0.75, 0.9, 1.0, 0.9];
