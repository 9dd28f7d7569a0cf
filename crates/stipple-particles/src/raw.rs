//! Low-level GPU interface used inside raw sections.
//!
//! Handles are plain ids owned by whoever created them. The interface is
//! stateless apart from the active program: buffers and vertex arrays are
//! named explicitly in every call, so nothing stays bound between calls.

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::ShaderError;
use crate::layout::VertexBinding;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub u32);

/// Uniform slot within a program's uniform block, as a byte offset.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Vertex shader input slot (`@location(n)`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AttributeLocation(pub u32);

/// Value pushed to a uniform slot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    F32(f32),
    Vec4([f32; 4]),
    /// Column-major.
    Mat4([f32; 16]),
}

impl UniformValue {
    /// Bytes as laid out in a uniform block.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            UniformValue::F32(v) => bytemuck::bytes_of(v),
            UniformValue::Vec4(v) => bytemuck::cast_slice(v),
            UniformValue::Mat4(v) => bytemuck::cast_slice(v),
        }
    }
}

pub const VERTEX_FILE: &str = "point_particle.vert.wgsl";
pub const FRAGMENT_FILE: &str = "point_particle.frag.wgsl";

/// Vertex/fragment shader pair, either on disk or inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSource {
    Files { vertex: PathBuf, fragment: PathBuf },
    Inline { vertex: String, fragment: String },
}

impl ShaderSource {
    /// The particle shader pair as named files under `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        ShaderSource::Files {
            vertex: dir.join(VERTEX_FILE),
            fragment: dir.join(FRAGMENT_FILE),
        }
    }

    /// Returns the `(vertex, fragment)` source text.
    pub fn read(&self) -> Result<(String, String), ShaderError> {
        match self {
            ShaderSource::Files { vertex, fragment } => {
                Ok((read_file(vertex)?, read_file(fragment)?))
            }
            ShaderSource::Inline { vertex, fragment } => Ok((vertex.clone(), fragment.clone())),
        }
    }
}

fn read_file(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Hand-issued GPU calls.
///
/// Creation calls are infallible; only program loading reports errors.
pub trait RawGpu {
    /// Compiles and links a program.
    fn load_program(&mut self, source: &ShaderSource) -> Result<ProgramId, ShaderError>;

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation>;

    /// Creates a vertex buffer holding `data`. The contents never change.
    fn create_static_buffer(&mut self, data: &[u8]) -> BufferId;

    /// Exposes `buffer` to the shader input described by `binding`.
    fn create_vertex_array(&mut self, buffer: BufferId, binding: &VertexBinding) -> VertexArrayId;

    /// Activates `program`, or deactivates with `None`.
    fn use_program(&mut self, program: Option<ProgramId>);

    /// Sets a uniform of the active program.
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Draws `vertices` of `array` as points with the active program.
    fn draw_points(&mut self, array: VertexArrayId, vertices: Range<u32>);

    fn delete_buffer(&mut self, buffer: BufferId);

    fn delete_vertex_array(&mut self, array: VertexArrayId);

    fn unload_program(&mut self, program: ProgramId);
}
