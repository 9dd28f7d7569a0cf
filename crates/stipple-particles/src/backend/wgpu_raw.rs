use std::collections::HashMap;
use std::num::NonZeroU64;
use std::ops::Range;

use glam::Mat4;
use naga::valid::Capabilities;
use stipple_engine::device::Gpu;
use stipple_engine::render::{Canvas, RenderTarget};
use wgpu::util::DeviceExt;

use crate::error::ShaderError;
use crate::host::HostRenderer;
use crate::layout::{AttributeFormat, POSITION_ATTRIBUTE, VertexBinding};
use crate::raw::{
    AttributeLocation, BufferId, ProgramId, RawGpu, ShaderSource, UniformLocation, UniformValue,
    VertexArrayId,
};
use crate::shader::{self, ProgramInfo};

/// Vertices per point sprite (two triangles).
const SPRITE_VERTICES: u32 = 6;

/// [`RawGpu`] over wgpu.
///
/// wgpu has no immediate mode, so raw calls are recorded: `set_uniform`
/// writes into the active program's uniform block and `draw_points` queues a
/// draw with a snapshot of it. [`WgpuRaw::encode`] turns queued draws into a
/// render pass on the frame when the raw section ends.
///
/// Points are drawn as instanced quads: the particle buffer steps per
/// instance and the vertex shader expands each one into a sprite.
///
/// Programs are checked against the device when loaded. The pipeline for the
/// particle binding is built right away, so a program wgpu would reject
/// fails in `load_program` rather than mid-frame.
pub struct WgpuRaw {
    device: wgpu::Device,
    format: wgpu::TextureFormat,
    capabilities: Capabilities,

    next_id: u32,
    programs: HashMap<ProgramId, Program>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    arrays: HashMap<VertexArrayId, VertexArray>,

    active: Option<ProgramId>,
    pending: Vec<PendingDraw>,
    warned_inactive: bool,
}

struct Program {
    info: ProgramInfo,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    /// One pipeline per vertex binding drawn with this program.
    pipelines: Vec<(VertexBinding, wgpu::RenderPipeline)>,
    /// CPU copy of the uniform block.
    uniforms: Vec<u8>,
}

struct VertexArray {
    buffer: BufferId,
    binding: VertexBinding,
}

struct PendingDraw {
    program: ProgramId,
    array: VertexArrayId,
    vertices: Range<u32>,
    uniforms: Vec<u8>,
}

impl WgpuRaw {
    /// `capabilities` bounds which shader features `load_program` accepts.
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            device: device.clone(),
            format,
            capabilities,
            next_id: 1,
            programs: HashMap::new(),
            buffers: HashMap::new(),
            arrays: HashMap::new(),
            active: None,
            pending: Vec::new(),
            warned_inactive: false,
        }
    }

    /// Raw GPU access on the window's device and surface format.
    pub fn from_gpu(gpu: &Gpu<'_>) -> Self {
        let capabilities = shader_capabilities(gpu.device().features(), gpu.downlevel_flags());
        Self::new(gpu.device(), gpu.surface_format(), capabilities)
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Encodes every queued draw into `target`, in call order, on top of what
    /// the frame already holds. Returns the number of draws encoded.
    pub fn encode(&mut self, target: &mut RenderTarget<'_>) -> usize {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return 0;
        }

        let mut prepared = Vec::with_capacity(pending.len());
        for draw in pending {
            let Some(array) = self.arrays.get(&draw.array) else {
                continue;
            };
            let (buffer_id, binding) = (array.buffer, array.binding);

            let pipeline = match self.pipeline_for(draw.program, &binding) {
                Ok(Some(pipeline)) => pipeline,
                Ok(None) => continue,
                Err(e) => {
                    log::error!("draw skipped: {e}");
                    continue;
                }
            };
            let Some(program) = self.programs.get(&draw.program) else {
                continue;
            };
            let Some(buffer) = self.buffers.get(&buffer_id) else {
                log::warn!("vertex array {:?} outlived its buffer; draw skipped", draw.array);
                continue;
            };

            // Fresh per draw: queued writes would all land before the pass runs.
            let bind_group = (!draw.uniforms.is_empty()).then(|| {
                let ubo = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("stipple raw uniforms"),
                    contents: &draw.uniforms,
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("stipple raw bind group"),
                    layout: &program.bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ubo.as_entire_binding(),
                    }],
                })
            });

            prepared.push((pipeline, bind_group, buffer.clone(), draw.vertices));
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("stipple raw pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for (pipeline, bind_group, buffer, vertices) in &prepared {
            rpass.set_pipeline(pipeline);
            if let Some(bind_group) = bind_group {
                rpass.set_bind_group(0, bind_group, &[]);
            }
            rpass.set_vertex_buffer(0, buffer.slice(..));
            rpass.draw(0..SPRITE_VERTICES, vertices.clone());
        }

        prepared.len()
    }

    /// Returns the pipeline for drawing `binding` with `program`. Bindings
    /// other than the one prepared at load are built on first use.
    fn pipeline_for(
        &mut self,
        program_id: ProgramId,
        binding: &VertexBinding,
    ) -> Result<Option<wgpu::RenderPipeline>, ShaderError> {
        let Some(program) = self.programs.get_mut(&program_id) else {
            return Ok(None);
        };
        if let Some((_, pipeline)) = program.pipelines.iter().find(|(b, _)| b == binding) {
            return Ok(Some(pipeline.clone()));
        }

        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = point_pipeline(&self.device, self.format, program, binding);
        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(ShaderError::Link(err.to_string()));
        }

        log::debug!("raw pipeline built for {program_id:?} / {binding:?}");
        program.pipelines.push((*binding, pipeline.clone()));
        Ok(Some(pipeline))
    }
}

fn point_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    program: &Program,
    binding: &VertexBinding,
) -> wgpu::RenderPipeline {
    let attributes = [wgpu::VertexAttribute {
        format: vertex_format(binding.format),
        offset: binding.offset as u64,
        shader_location: binding.location.0,
    }];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("stipple raw point pipeline"),
        layout: Some(&program.pipeline_layout),
        vertex: wgpu::VertexState {
            module: &program.vertex,
            entry_point: Some(program.info.vertex_entry.as_str()),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: binding.stride as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &attributes,
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: &program.fragment,
            entry_point: Some(program.info.fragment_entry.as_str()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                // Straight alpha, as pushed by the app.
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Shader capabilities of a device, matching what wgpu validates against.
fn shader_capabilities(
    features: wgpu::Features,
    downlevel: wgpu::DownlevelFlags,
) -> Capabilities {
    let mut caps = Capabilities::empty();
    caps.set(Capabilities::FLOAT64, features.contains(wgpu::Features::SHADER_F64));
    caps.set(Capabilities::SHADER_FLOAT16, features.contains(wgpu::Features::SHADER_F16));
    caps.set(Capabilities::SHADER_INT64, features.contains(wgpu::Features::SHADER_INT64));
    caps.set(
        Capabilities::PRIMITIVE_INDEX,
        features.contains(wgpu::Features::SHADER_PRIMITIVE_INDEX),
    );
    caps.set(Capabilities::CLIP_DISTANCE, features.contains(wgpu::Features::CLIP_DISTANCES));
    caps.set(
        Capabilities::EARLY_DEPTH_TEST,
        features.contains(wgpu::Features::SHADER_EARLY_DEPTH_TEST),
    );
    caps.set(
        Capabilities::DUAL_SOURCE_BLENDING,
        features.contains(wgpu::Features::DUAL_SOURCE_BLENDING),
    );
    caps.set(Capabilities::MULTIVIEW, features.contains(wgpu::Features::MULTIVIEW));
    caps.set(
        Capabilities::MULTISAMPLED_SHADING,
        downlevel.contains(wgpu::DownlevelFlags::MULTISAMPLED_SHADING),
    );
    caps.set(
        Capabilities::CUBE_ARRAY_TEXTURES,
        downlevel.contains(wgpu::DownlevelFlags::CUBE_ARRAY_TEXTURES),
    );
    caps
}

fn vertex_format(format: AttributeFormat) -> wgpu::VertexFormat {
    match format {
        AttributeFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
    }
}

impl RawGpu for WgpuRaw {
    fn load_program(&mut self, source: &ShaderSource) -> Result<ProgramId, ShaderError> {
        let (vertex_src, fragment_src) = source.read()?;
        let info = shader::compile(&vertex_src, &fragment_src, self.capabilities)?;

        // wgpu reports creation errors through the device; catch them here.
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stipple raw vertex shader"),
            source: wgpu::ShaderSource::Wgsl(info.vertex_source.as_str().into()),
        });
        let fragment = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stipple raw fragment shader"),
            source: wgpu::ShaderSource::Wgsl(info.fragment_source.as_str().into()),
        });

        let entries: Vec<wgpu::BindGroupLayoutEntry> =
            NonZeroU64::new(info.uniform_block_size as u64)
                .map(|size| wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(size),
                    },
                    count: None,
                })
                .into_iter()
                .collect();

        let bind_group_layout =
            self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("stipple raw bgl"),
                entries: &entries,
            });
        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("stipple raw pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let uniforms = vec![0; info.uniform_block_size as usize];
        let mut program = Program {
            info,
            vertex,
            fragment,
            bind_group_layout,
            pipeline_layout,
            pipelines: Vec::new(),
            uniforms,
        };

        // Programs without the position input are rejected by the caller.
        if let Some(&location) = program.info.attributes.get(POSITION_ATTRIBUTE) {
            let binding = VertexBinding::particle_position(AttributeLocation(location));
            let pipeline = point_pipeline(&self.device, self.format, &program, &binding);
            program.pipelines.push((binding, pipeline));
        }

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(ShaderError::Link(err.to_string()));
        }

        let id = ProgramId(self.next_id());
        log::info!(
            "loaded shader program {id:?} ({} uniforms, {} byte block)",
            program.info.uniforms.len(),
            program.info.uniform_block_size
        );
        self.programs.insert(id, program);
        Ok(id)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let program = self.programs.get(&program)?;
        program.info.uniforms.get(name).copied().map(UniformLocation)
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation> {
        let program = self.programs.get(&program)?;
        program.info.attributes.get(name).copied().map(AttributeLocation)
    }

    fn create_static_buffer(&mut self, data: &[u8]) -> BufferId {
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("stipple particle vbo"),
            contents: data,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let id = BufferId(self.next_id());
        log::debug!("created static buffer {id:?} ({} bytes)", data.len());
        self.buffers.insert(id, buffer);
        id
    }

    fn create_vertex_array(&mut self, buffer: BufferId, binding: &VertexBinding) -> VertexArrayId {
        let id = VertexArrayId(self.next_id());
        self.arrays.insert(
            id,
            VertexArray {
                buffer,
                binding: *binding,
            },
        );
        id
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        if let Some(id) = program {
            if !self.programs.contains_key(&id) {
                log::warn!("use_program: unknown program {id:?}");
                self.active = None;
                return;
            }
        }
        self.active = program;
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(program) = self.active.and_then(|id| self.programs.get_mut(&id)) else {
            if !self.warned_inactive {
                self.warned_inactive = true;
                log::warn!("set_uniform with no active program; ignored");
            }
            return;
        };

        let bytes = value.as_bytes();
        let start = location.0 as usize;
        let block_len = program.uniforms.len();
        let Some(slot) = program.uniforms.get_mut(start..start + bytes.len()) else {
            log::warn!("uniform at offset {start} does not fit the {block_len} byte block");
            return;
        };
        slot.copy_from_slice(bytes);
    }

    fn draw_points(&mut self, array: VertexArrayId, vertices: Range<u32>) {
        let Some(program) = self.active else {
            log::warn!("draw_points with no active program; skipped");
            return;
        };
        if vertices.is_empty() {
            return;
        }
        let Some(uniforms) = self.programs.get(&program).map(|p| p.uniforms.clone()) else {
            return;
        };

        self.pending.push(PendingDraw {
            program,
            array,
            vertices,
            uniforms,
        });
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if let Some(buffer) = self.buffers.remove(&buffer) {
            buffer.destroy();
        }
    }

    fn delete_vertex_array(&mut self, array: VertexArrayId) {
        self.arrays.remove(&array);
    }

    fn unload_program(&mut self, program: ProgramId) {
        if self.active == Some(program) {
            self.active = None;
        }
        self.programs.remove(&program);
    }
}

impl Drop for WgpuRaw {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            log::warn!("{} raw draws dropped without being encoded", self.pending.len());
        }
    }
}

/// The engine canvas as host: its batch is flushed before raw calls and the
/// recorded raw draws are encoded into its frame afterwards.
impl HostRenderer<WgpuRaw> for Canvas<'_> {
    fn flush_batch(&mut self) {
        Canvas::flush_batch(self);
    }

    fn end_raw(&mut self, gpu: &mut WgpuRaw) {
        let mut target = self.raw_target();
        gpu.encode(&mut target);
    }

    fn model_view(&self) -> Mat4 {
        self.transform().model_view
    }

    fn projection(&self) -> Mat4 {
        self.transform().projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERT: &str = include_str!("../../resources/shaders/point_particle.vert.wgsl");
    const FRAG: &str = include_str!("../../resources/shaders/point_particle.frag.wgsl");

    /// Headless device, or `None` on machines without an adapter.
    fn device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .ok()?;
        pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())).ok()
    }

    fn inline(vertex: &str, fragment: &str) -> ShaderSource {
        ShaderSource::Inline {
            vertex: vertex.to_string(),
            fragment: fragment.to_string(),
        }
    }

    #[test]
    fn capabilities_follow_device_features() {
        let base = shader_capabilities(wgpu::Features::empty(), wgpu::DownlevelFlags::empty());
        assert!(!base.contains(Capabilities::PRIMITIVE_INDEX));
        assert!(!base.contains(Capabilities::FLOAT64));
        assert!(!base.contains(Capabilities::MULTISAMPLED_SHADING));

        let caps = shader_capabilities(
            wgpu::Features::SHADER_PRIMITIVE_INDEX,
            wgpu::DownlevelFlags::MULTISAMPLED_SHADING,
        );
        assert!(caps.contains(Capabilities::PRIMITIVE_INDEX));
        assert!(caps.contains(Capabilities::MULTISAMPLED_SHADING));
        assert!(!caps.contains(Capabilities::FLOAT64));
    }

    #[test]
    fn particle_program_needs_no_optional_features() {
        let caps = shader_capabilities(wgpu::Features::empty(), wgpu::DownlevelFlags::empty());
        assert!(shader::compile(VERT, FRAG, caps).is_ok());
    }

    #[test]
    fn particle_program_loads_with_its_pipeline() {
        let Some((device, _queue)) = device() else { return };
        let mut raw = WgpuRaw::new(
            &device,
            wgpu::TextureFormat::Rgba8Unorm,
            shader_capabilities(device.features(), wgpu::DownlevelFlags::empty()),
        );

        let id = raw.load_program(&inline(VERT, FRAG)).unwrap();
        let program = &raw.programs[&id];
        assert_eq!(program.pipelines.len(), 1);
        assert_eq!(
            program.pipelines[0].0,
            VertexBinding::particle_position(AttributeLocation(0))
        );
    }

    #[test]
    fn pipeline_rejection_is_a_load_error() {
        let Some((device, _queue)) = device() else { return };
        let mut raw = WgpuRaw::new(
            &device,
            wgpu::TextureFormat::Rgba8Unorm,
            shader_capabilities(device.features(), wgpu::DownlevelFlags::empty()),
        );

        // Links fine, but the buffer feeds floats into an integer input.
        let vert = r#"
            struct Uniforms {
                mvp: mat4x4<f32>,
                color: vec4<f32>,
                currentTime: f32,
            }
            @group(0) @binding(0) var<uniform> u: Uniforms;

            struct VertexOut {
                @builtin(position) clip: vec4<f32>,
                @location(0) sprite: vec2<f32>,
            }

            @vertex
            fn vs_main(@location(0) vertexPosition: vec3<i32>) -> VertexOut {
                var vout: VertexOut;
                vout.clip = u.mvp * vec4<f32>(vec3<f32>(vertexPosition), 1.0);
                vout.sprite = vec2<f32>(0.0, 0.0);
                return vout;
            }
        "#;
        assert!(shader::compile(vert, FRAG, raw.capabilities).is_ok());

        let err = raw.load_program(&inline(vert, FRAG)).unwrap_err();
        assert!(matches!(err, ShaderError::Link(_)), "{err}");
        assert!(raw.programs.is_empty());
    }
}
