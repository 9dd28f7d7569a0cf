//! Recording doubles for the raw GPU and host renderer.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use glam::Mat4;

use crate::error::ShaderError;
use crate::host::HostRenderer;
use crate::layout::{POSITION_ATTRIBUTE, VertexBinding};
use crate::raw::{
    AttributeLocation, BufferId, ProgramId, RawGpu, ShaderSource, UniformLocation, UniformValue,
    VertexArrayId,
};
use crate::renderer::{COLOR_UNIFORM, MVP_UNIFORM, TIME_UNIFORM};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    FlushBatch,
    EndRaw,
    LoadProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    SetUniform(UniformLocation, UniformValue),
    CreateBuffer { id: BufferId, data: Vec<u8> },
    CreateVertexArray { id: VertexArrayId, buffer: BufferId, binding: VertexBinding },
    DrawPoints { array: VertexArrayId, vertices: Range<u32> },
    DeleteBuffer(BufferId),
    DeleteVertexArray(VertexArrayId),
    UnloadProgram(ProgramId),
}

/// Event log shared by a gpu/host pair.
#[derive(Debug, Clone, Default)]
pub struct Log(Rc<RefCell<Vec<Event>>>);

impl Log {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

pub struct RecordingGpu {
    log: Log,
    next_id: u32,
    /// Uniform or attribute name that fails to resolve.
    pub missing: Option<&'static str>,
    pub fail_load: bool,
}

impl RecordingGpu {
    pub const MVP: UniformLocation = UniformLocation(0);
    pub const COLOR: UniformLocation = UniformLocation(64);
    pub const TIME: UniformLocation = UniformLocation(80);
    pub const POSITION: AttributeLocation = AttributeLocation(0);

    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            next_id: 1,
            missing: None,
            fail_load: false,
        }
    }

    fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl RawGpu for RecordingGpu {
    fn load_program(&mut self, _source: &ShaderSource) -> Result<ProgramId, ShaderError> {
        if self.fail_load {
            return Err(ShaderError::Link("forced failure".into()));
        }
        let id = ProgramId(self.id());
        self.log.push(Event::LoadProgram(id));
        Ok(id)
    }

    fn uniform_location(&self, _program: ProgramId, name: &str) -> Option<UniformLocation> {
        if self.missing == Some(name) {
            return None;
        }
        match name {
            MVP_UNIFORM => Some(Self::MVP),
            COLOR_UNIFORM => Some(Self::COLOR),
            TIME_UNIFORM => Some(Self::TIME),
            _ => None,
        }
    }

    fn attribute_location(&self, _program: ProgramId, name: &str) -> Option<AttributeLocation> {
        (self.missing != Some(name) && name == POSITION_ATTRIBUTE).then_some(Self::POSITION)
    }

    fn create_static_buffer(&mut self, data: &[u8]) -> BufferId {
        let id = BufferId(self.id());
        self.log.push(Event::CreateBuffer { id, data: data.to_vec() });
        id
    }

    fn create_vertex_array(&mut self, buffer: BufferId, binding: &VertexBinding) -> VertexArrayId {
        let id = VertexArrayId(self.id());
        self.log.push(Event::CreateVertexArray {
            id,
            buffer,
            binding: *binding,
        });
        id
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.log.push(Event::UseProgram(program));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.log.push(Event::SetUniform(location, value));
    }

    fn draw_points(&mut self, array: VertexArrayId, vertices: Range<u32>) {
        self.log.push(Event::DrawPoints { array, vertices });
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.log.push(Event::DeleteBuffer(buffer));
    }

    fn delete_vertex_array(&mut self, array: VertexArrayId) {
        self.log.push(Event::DeleteVertexArray(array));
    }

    fn unload_program(&mut self, program: ProgramId) {
        self.log.push(Event::UnloadProgram(program));
    }
}

pub struct RecordingHost {
    log: Log,
    pub model_view: Mat4,
    pub projection: Mat4,
}

impl RecordingHost {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            model_view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

impl HostRenderer<RecordingGpu> for RecordingHost {
    fn flush_batch(&mut self) {
        self.log.push(Event::FlushBatch);
    }

    fn end_raw(&mut self, _gpu: &mut RecordingGpu) {
        self.log.push(Event::EndRaw);
    }

    fn model_view(&self) -> Mat4 {
        self.model_view
    }

    fn projection(&self) -> Mat4 {
        self.projection
    }
}
