use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::{MAX_TICKS_PER_FRAME, RESOLUTION, SURFACE_WIDTH, TICK_RATE};
use crate::gpu::{GpuContext, RenderPipeline, SceneBuffers, ViewParams};
use crate::simulation::WaterScene;

/// Application state
pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    scene_buffers: Option<SceneBuffers>,
    render_pipeline: Option<RenderPipeline>,
    scene: WaterScene,
    clock: FixedStep,
    paused: bool,
    fps_counter: FpsCounter,
}

impl App {
    pub fn new() -> Self {
        Self {
            window: None,
            gpu: None,
            scene_buffers: None,
            render_pipeline: None,
            scene: WaterScene::new_default(),
            clock: FixedStep::new(1.0 / TICK_RATE),
            paused: false,
            fps_counter: FpsCounter::new(),
        }
    }

    /// Run however many fixed ticks the elapsed wall time calls for
    fn advance(&mut self) {
        let ticks = self.clock.ticks_due(Instant::now());
        if self.paused {
            return;
        }
        for _ in 0..ticks {
            self.tick();
        }
    }

    fn tick(&mut self) {
        for event in self.scene.tick() {
            log::info!(
                "Splash at column {} ({:.2}, {:.2}), impact speed {:.2}, force {:.3}",
                event.column,
                event.position.x,
                event.position.y,
                event.impact_speed,
                event.force
            );
        }
    }

    fn render(&mut self) {
        let (Some(gpu), Some(buffers), Some(render)) = (
            self.gpu.as_ref(),
            self.scene_buffers.as_mut(),
            self.render_pipeline.as_ref(),
        ) else {
            return;
        };

        let field = self.scene.field();
        let (width, height) = gpu.size();
        buffers.update_view(&gpu.queue, ViewParams::fit(field, width, height));
        buffers.update_geometry(&gpu.queue, field, self.scene.bodies());

        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        let bind_group = render.create_bind_group(&gpu.device, &buffers.view_buffer);
        render.draw(&mut encoder, &view, &bind_group, buffers);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = self.fps_counter.tick() {
            if let Some(window) = &self.window {
                let paused = if self.paused { " [Paused]" } else { "" };
                let peak = self
                    .scene
                    .field()
                    .displacements()
                    .iter()
                    .fold(0.0f32, |acc, d| acc.max(d.abs()));
                window.set_title(&format!(
                    "Splash Surface - {:.0} FPS - {} bodies - {} splashes - peak {:.2}{}",
                    fps,
                    self.scene.bodies().len(),
                    self.scene.splash_count(),
                    peak,
                    paused
                ));
            }
        }
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        match key_code {
            // Drop a body somewhere over the water
            KeyCode::Space => {
                if !self.scene.spawn_random(&mut rand::thread_rng()) {
                    log::info!("Scene is full, wait for bodies to sink");
                }
            }

            KeyCode::KeyP => {
                self.paused = !self.paused;
                log::info!("Simulation {}", if self.paused { "paused" } else { "resumed" });
            }

            // Single tick while paused
            KeyCode::KeyN => {
                if self.paused {
                    self.tick();
                }
            }

            KeyCode::KeyR => {
                log::info!("Scene reset after {} ticks", self.scene.tick_count());
                self.scene.reset();
            }

            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        log::info!("Initializing Splash Surface...");
        log::info!("Columns: {}, width: {}", RESOLUTION, SURFACE_WIDTH);

        let window_attrs = Window::default_attributes()
            .with_title("Splash Surface - Initializing...")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        log::info!("Creating GPU context...");
        let gpu = pollster::block_on(GpuContext::new(window.clone()));

        let scene_buffers = SceneBuffers::new(&gpu.device, self.scene.field().resolution());
        let render_pipeline = RenderPipeline::new(&gpu.device, gpu.format());

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Space: Drop a body");
        log::info!("  P: Pause/resume");
        log::info!("  N: Single tick while paused");
        log::info!("  R: Reset scene");
        log::info!("  Escape: Quit");

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.scene_buffers = Some(scene_buffers);
        self.render_pipeline = Some(render_pipeline);
        self.clock.restart(Instant::now());
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                    gpu.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.advance();
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Turns wall-clock time into a whole number of fixed ticks.
///
/// Leftover time carries into the next frame. A frame that falls more than
/// [`MAX_TICKS_PER_FRAME`] behind drops the backlog instead of spiralling.
struct FixedStep {
    tick_length: f32,
    accumulator: f32,
    last: Option<Instant>,
}

impl FixedStep {
    fn new(tick_length: f32) -> Self {
        Self {
            tick_length,
            accumulator: 0.0,
            last: None,
        }
    }

    fn restart(&mut self, now: Instant) {
        self.accumulator = 0.0;
        self.last = Some(now);
    }

    fn ticks_due(&mut self, now: Instant) -> u32 {
        let Some(last) = self.last.replace(now) else {
            return 0;
        };
        self.accumulator += now.duration_since(last).as_secs_f32();

        let mut ticks = 0;
        while self.accumulator >= self.tick_length {
            if ticks == MAX_TICKS_PER_FRAME {
                self.accumulator = 0.0;
                break;
            }
            self.accumulator -= self.tick_length;
            ticks += 1;
        }
        ticks
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fixed_step_carries_remainder() {
        let start = Instant::now();
        let mut clock = FixedStep::new(0.1);
        clock.restart(start);

        assert_eq!(clock.ticks_due(start + Duration::from_millis(250)), 2);
        assert_eq!(clock.ticks_due(start + Duration::from_millis(310)), 1);
    }

    #[test]
    fn test_fixed_step_drops_backlog() {
        let start = Instant::now();
        let mut clock = FixedStep::new(0.1);
        clock.restart(start);

        assert_eq!(clock.ticks_due(start + Duration::from_secs(10)), MAX_TICKS_PER_FRAME);
        assert_eq!(clock.ticks_due(start + Duration::from_millis(10_050)), 0);
    }

    #[test]
    fn test_fixed_step_needs_start() {
        let mut clock = FixedStep::new(0.1);
        assert_eq!(clock.ticks_due(Instant::now()), 0);
    }
}
