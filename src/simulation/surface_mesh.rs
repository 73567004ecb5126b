use crate::simulation::wave_field::{station_x, WaveFieldConfig};
use crate::simulation::Point2;

/// Renderable view of the surface, rebuilt from the displacements every step.
///
/// Layout:
/// - points: one per column at the surface, left to right
/// - vertices: `resolution` surface vertices followed by `resolution`
///   floor vertices at the fixed depth
/// - indices: two triangles per column gap, `(tl, bl, tr)` and `(tr, bl, br)`
#[derive(Clone, Debug)]
pub struct SurfaceMesh {
    points: Vec<Point2>,
    vertices: Vec<Point2>,
    indices: Vec<u32>,
}

impl SurfaceMesh {
    /// Allocate a mesh for `resolution` columns. Indices never change after this.
    pub fn new(resolution: usize) -> Self {
        Self {
            points: vec![Point2::default(); resolution],
            vertices: vec![Point2::default(); resolution * 2],
            indices: strip_indices(resolution),
        }
    }

    /// Recompute point and vertex positions from the displacement array
    pub fn rebuild(&mut self, config: &WaveFieldConfig, displacement: &[f32]) {
        debug_assert_eq!(displacement.len(), self.points.len());

        let resolution = self.points.len();
        let origin = config.origin;
        let floor_y = origin.y - config.floor_depth;

        for (i, &d) in displacement.iter().enumerate() {
            let x = origin.x + station_x(i, resolution, config.width);
            let top = Point2::new(x, origin.y + d);
            self.points[i] = top;
            self.vertices[i] = top;
            self.vertices[i + resolution] = Point2::new(x, floor_y);
        }
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

fn strip_indices(resolution: usize) -> Vec<u32> {
    let n = resolution as u32;
    let mut indices = Vec::with_capacity((resolution - 1) * 6);

    for i in 0..n - 1 {
        let top_left = i;
        let top_right = i + 1;
        let bottom_left = i + n;
        let bottom_right = i + 1 + n;

        indices.extend_from_slice(&[top_left, bottom_left, top_right]);
        indices.extend_from_slice(&[top_right, bottom_left, bottom_right]);
    }

    indices
}
