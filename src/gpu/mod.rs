mod buffers;
mod context;
mod render;

pub use buffers::{SceneBuffers, ViewParams};
pub use context::GpuContext;
pub use render::RenderPipeline;
