//! GPU types and helpers shared by the batch shape renderers.

use bytemuck::{Pod, Zeroable};

use crate::render::TransformState;

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING
}

// ── transform uniform ─────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct TransformUniform {
    pub mvp: [f32; 16], // column-major
}

impl From<&TransformState> for TransformUniform {
    fn from(t: &TransformState) -> Self {
        Self { mvp: t.mvp().to_cols_array() }
    }
}

pub(super) const TRANSFORM_UBO_SIZE: std::num::NonZeroU64 =
    match std::num::NonZeroU64::new(std::mem::size_of::<TransformUniform>() as u64) {
        Some(size) => size,
        None => panic!("TransformUniform is zero-sized"),
    };

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub(super) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

pub(super) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];
