use glam::Vec4;
use rand::Rng;
use stipple_engine::paint::Rgba8;

use crate::error::SetupError;
use crate::host::{HostRenderer, RawSection};
use crate::layout::{POSITION_ATTRIBUTE, VertexBinding};
use crate::raw::{
    AttributeLocation, BufferId, ProgramId, RawGpu, ShaderSource, UniformLocation, UniformValue,
    VertexArrayId,
};
use crate::store::{self, DEFAULT_PARTICLE_COUNT};

pub const TIME_UNIFORM: &str = "currentTime";
pub const COLOR_UNIFORM: &str = "color";
pub const MVP_UNIFORM: &str = "mvp";

/// Particle renderer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleConfig {
    /// Fixed population size.
    pub count: u32,
    /// Straight-alpha particle color.
    pub color: Rgba8,
    pub shaders: ShaderSource,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_PARTICLE_COUNT as u32,
            color: Rgba8::new(255, 0, 0, 128),
            shaders: default_shaders(),
        }
    }
}

/// The bundled point particle shaders, embedded in the binary.
pub fn default_shaders() -> ShaderSource {
    ShaderSource::Inline {
        vertex: include_str!("../resources/shaders/point_particle.vert.wgsl").to_string(),
        fragment: include_str!("../resources/shaders/point_particle.frag.wgsl").to_string(),
    }
}

#[derive(Debug, Copy, Clone)]
struct Locations {
    time: UniformLocation,
    color: UniformLocation,
    mvp: UniformLocation,
    position: AttributeLocation,
}

/// Owns the particle program, buffer and vertex array.
///
/// Construction uploads the particles once. Every `draw` runs a raw section:
/// flush the host batch, push uniforms, draw all points, restore the host.
/// Dropping releases the buffer, the vertex array, then the program.
pub struct ParticleRenderer<G: RawGpu> {
    gpu: G,
    program: ProgramId,
    locations: Locations,
    buffer: BufferId,
    array: VertexArrayId,
    count: u32,
    color: Vec4,
}

impl<G: RawGpu> ParticleRenderer<G> {
    /// Generates the particles for a `width` x `height` display and uploads
    /// them.
    ///
    /// Particles are generated before any GPU call, so an invalid population
    /// leaves `gpu` untouched.
    pub fn new<R: Rng>(
        mut gpu: G,
        config: &ParticleConfig,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Result<Self, SetupError> {
        let particles = store::generate(width, height, config.count as usize, rng)?;

        let program = gpu.load_program(&config.shaders)?;
        let locations = match resolve_locations(&gpu, program) {
            Ok(locations) => locations,
            Err(e) => {
                gpu.unload_program(program);
                return Err(e);
            }
        };

        let binding = VertexBinding::particle_position(locations.position);
        let buffer = gpu.create_static_buffer(bytemuck::cast_slice(&particles));
        let array = gpu.create_vertex_array(buffer, &binding);

        log::info!(
            "particle renderer ready: {} particles, {} bytes",
            particles.len(),
            binding.buffer_size(particles.len())
        );

        Ok(Self {
            gpu,
            program,
            locations,
            buffer,
            array,
            count: config.count,
            color: config.color.normalized(),
        })
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Draws every particle at `time` seconds.
    pub fn draw<H: HostRenderer<G>>(&mut self, host: &mut H, time: f32) {
        let mut raw = RawSection::begin(host, &mut self.gpu);
        let mvp = raw.model_view_projection();

        let gpu = raw.gpu();
        gpu.use_program(Some(self.program));
        gpu.set_uniform(self.locations.time, UniformValue::F32(time));
        gpu.set_uniform(self.locations.color, UniformValue::Vec4(self.color.to_array()));
        gpu.set_uniform(self.locations.mvp, UniformValue::Mat4(mvp.to_cols_array()));
        gpu.draw_points(self.array, 0..self.count);
        gpu.use_program(None);
    }
}

impl<G: RawGpu> Drop for ParticleRenderer<G> {
    fn drop(&mut self) {
        self.gpu.delete_buffer(self.buffer);
        self.gpu.delete_vertex_array(self.array);
        self.gpu.unload_program(self.program);
        log::debug!("particle renderer released");
    }
}

fn resolve_locations<G: RawGpu>(gpu: &G, program: ProgramId) -> Result<Locations, SetupError> {
    let uniform = |name: &'static str| {
        gpu.uniform_location(program, name)
            .ok_or(SetupError::MissingUniform(name))
    };

    Ok(Locations {
        time: uniform(TIME_UNIFORM)?,
        color: uniform(COLOR_UNIFORM)?,
        mvp: uniform(MVP_UNIFORM)?,
        position: gpu
            .attribute_location(program, POSITION_ATTRIBUTE)
            .ok_or(SetupError::MissingAttribute(POSITION_ATTRIBUTE))?,
    })
}
