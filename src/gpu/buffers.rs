use wgpu::{Buffer, BufferUsages, Device, Queue};

use crate::config::{
    BODY_COLOR, BODY_HALF_SIZE, CREST_COLOR, CREST_THICKNESS, MAX_BODIES, VIEW_HEADROOM,
    VIEW_MARGIN, WATER_COLOR,
};
use crate::simulation::{Point2, TrackedBody, WaveField};

/// Colored 2D vertex (24 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    fn new(point: Point2, color: [f32; 4]) -> Self {
        Self {
            position: [point.x, point.y],
            color,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// World-to-clip transform passed to the shader (16 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewParams {
    pub scale: [f32; 2],
    pub offset: [f32; 2],
}

impl ViewParams {
    /// Fit the field plus headroom into a surface of the given pixel size,
    /// keeping world units square.
    pub fn fit(field: &WaveField, surface_width: u32, surface_height: u32) -> Self {
        let origin = field.origin();
        let mut left = origin.x - VIEW_MARGIN;
        let mut right = origin.x + field.width() + VIEW_MARGIN;
        let mut bottom = origin.y - field.floor_depth() - VIEW_MARGIN;
        let mut top = origin.y + VIEW_HEADROOM;

        let aspect = surface_width.max(1) as f32 / surface_height.max(1) as f32;
        let world_width = right - left;
        let world_height = top - bottom;

        if world_width / world_height < aspect {
            let pad = (world_height * aspect - world_width) / 2.0;
            left -= pad;
            right += pad;
        } else {
            let pad = (world_width / aspect - world_height) / 2.0;
            bottom -= pad;
            top += pad;
        }

        let scale = [2.0 / (right - left), 2.0 / (top - bottom)];
        Self {
            scale,
            offset: [-1.0 - left * scale[0], -1.0 - bottom * scale[1]],
        }
    }

    #[cfg(test)]
    fn apply(&self, point: Point2) -> [f32; 2] {
        [
            point.x * self.scale[0] + self.offset[0],
            point.y * self.scale[1] + self.offset[1],
        ]
    }
}

/// Vertex, index and view buffers for one frame of the scene.
///
/// Sized once for the field resolution and [`MAX_BODIES`]; geometry is
/// rewritten every frame.
pub struct SceneBuffers {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub view_buffer: Buffer,
    index_count: u32,
}

impl SceneBuffers {
    pub fn new(device: &Device, resolution: usize) -> Self {
        let (vertex_capacity, index_capacity) = capacity(resolution);

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene-vertex-buffer"),
            size: (vertex_capacity * std::mem::size_of::<Vertex>()) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene-index-buffer"),
            size: (index_capacity * std::mem::size_of::<u32>()) as u64,
            usage: BufferUsages::INDEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let view_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("view-params-buffer"),
            size: std::mem::size_of::<ViewParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            vertex_buffer,
            index_buffer,
            view_buffer,
            index_count: 0,
        }
    }

    /// Upload this frame's water and body geometry
    pub fn update_geometry(&mut self, queue: &Queue, field: &WaveField, bodies: &[TrackedBody]) {
        let (vertices, indices) = build_geometry(field, bodies);
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&indices));
        self.index_count = indices.len() as u32;
    }

    pub fn update_view(&self, queue: &Queue, params: ViewParams) {
        queue.write_buffer(&self.view_buffer, 0, bytemuck::bytes_of(&params));
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// (vertices, indices) needed for a field of `resolution` columns at full body capacity
fn capacity(resolution: usize) -> (usize, usize) {
    let vertices = resolution * 2 + resolution * 2 + MAX_BODIES * 4;
    let indices = (resolution - 1) * 6 * 2 + MAX_BODIES * 6;
    (vertices, indices)
}

/// Water body, crest band along the surface polyline, then one quad per body
fn build_geometry(field: &WaveField, bodies: &[TrackedBody]) -> (Vec<Vertex>, Vec<u32>) {
    let (vertex_capacity, index_capacity) = capacity(field.resolution());
    let mut vertices = Vec::with_capacity(vertex_capacity);
    let mut indices = Vec::with_capacity(index_capacity);

    let mesh = field.mesh();
    vertices.extend(mesh.vertices().iter().map(|&p| Vertex::new(p, WATER_COLOR)));
    indices.extend_from_slice(mesh.indices());

    let points = field.surface_points();
    let n = points.len() as u32;
    let base = vertices.len() as u32;
    vertices.extend(
        points
            .iter()
            .map(|p| Vertex::new(Point2::new(p.x, p.y + CREST_THICKNESS), CREST_COLOR)),
    );
    vertices.extend(
        points
            .iter()
            .map(|p| Vertex::new(Point2::new(p.x, p.y - CREST_THICKNESS), CREST_COLOR)),
    );
    for i in 0..n - 1 {
        let (tl, tr) = (base + i, base + i + 1);
        let (bl, br) = (tl + n, tr + n);
        indices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
    }

    for tracked in bodies.iter().take(MAX_BODIES) {
        let Point2 { x, y } = tracked.body.position;
        let h = BODY_HALF_SIZE;
        let base = vertices.len() as u32;
        vertices.extend_from_slice(&[
            Vertex::new(Point2::new(x - h, y - h), BODY_COLOR),
            Vertex::new(Point2::new(x + h, y - h), BODY_COLOR),
            Vertex::new(Point2::new(x + h, y + h), BODY_COLOR),
            Vertex::new(Point2::new(x - h, y + h), BODY_COLOR),
        ]);
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}
