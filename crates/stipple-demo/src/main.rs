use anyhow::{Context, Result};
use winit::dpi::LogicalSize;

use stipple_engine::coords::Rect;
use stipple_engine::core::{App, AppControl, FrameCtx, StartCtx};
use stipple_engine::device::GpuInit;
use stipple_engine::logging::{init_logging, LoggingConfig};
use stipple_engine::paint::{Color, Rgba8};
use stipple_engine::window::{Runtime, RuntimeConfig};
use stipple_particles::{ParticleConfig, ParticleRenderer, ShaderSource, WgpuRaw};

const TITLE: &str = "stipple - point particles";

/// Directory to load the particle shaders from instead of the embedded copies.
const SHADER_DIR_ENV: &str = "STIPPLE_SHADER_DIR";

/// Label panel behind the title area.
const PANEL: Rect = Rect::new(10.0, 10.0, 210.0, 30.0);

struct ParticleDemo {
    config: ParticleConfig,
    particles: Option<ParticleRenderer<WgpuRaw>>,
    shown_fps: Option<u32>,
}

impl ParticleDemo {
    fn new(config: ParticleConfig) -> Self {
        Self {
            config,
            particles: None,
            shown_fps: None,
        }
    }
}

impl App for ParticleDemo {
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> Result<()> {
        let viewport = ctx.window.viewport();
        let raw = WgpuRaw::from_gpu(ctx.gpu);

        let particles = ParticleRenderer::new(
            raw,
            &self.config,
            viewport.width as u32,
            viewport.height as u32,
            &mut rand::thread_rng(),
        )
        .context("particle setup failed")?;

        ctx.window
            .set_title(&format!("{TITLE} - {} particles in one vertex buffer", particles.count()));
        self.particles = Some(particles);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let fps = ctx.fps.map(|fps| fps.round() as u32);
        if fps != self.shown_fps {
            if let (Some(fps), Some(particles)) = (fps, self.particles.as_ref()) {
                ctx.window.set_title(&format!(
                    "{TITLE} - {} particles in one vertex buffer - {fps} FPS",
                    particles.count()
                ));
            }
            self.shown_fps = fps;
        }

        let time = ctx.time.elapsed as f32;
        let particles = &mut self.particles;

        ctx.render(Color::from(Rgba8::WHITE), |canvas| {
            canvas.draw_rect(PANEL, Rgba8::MAROON);
            if let Some(particles) = particles.as_mut() {
                particles.draw(canvas, time);
            }
        })
    }

    fn on_exit(&mut self) {
        // GPU objects go before the device and window.
        self.particles = None;
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: TITLE.to_string(),
        initial_size: LogicalSize::new(800.0, 450.0),
        target_fps: Some(60),
        exit_on_escape: true,
    };

    let mut particles = ParticleConfig::default();
    if let Some(dir) = std::env::var_os(SHADER_DIR_ENV) {
        log::info!("loading shaders from {}", dir.to_string_lossy());
        particles.shaders = ShaderSource::from_dir(dir);
    }

    let app = ParticleDemo::new(particles);
    if let Err(e) = Runtime::run(config, GpuInit::default(), app) {
        log::error!("{e:#}");
        return Err(e);
    }
    Ok(())
}
