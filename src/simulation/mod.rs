mod body;
mod impact;
mod scene;
mod surface_mesh;
mod wave_field;

pub use body::{BodySpawner, FallingBody};
pub use impact::{ImpactConfig, ImpactDetector, ImpactForceCurve, SplashEvent};
pub use scene::{TrackedBody, WaterScene};
pub use surface_mesh::SurfaceMesh;
pub use wave_field::{WaveField, WaveFieldConfig, WaveParams};

/// A point in world space (x right, y up)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
