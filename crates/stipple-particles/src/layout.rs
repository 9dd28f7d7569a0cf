use std::mem::{offset_of, size_of};

use crate::raw::AttributeLocation;
use crate::store::Particle;

/// Name of the vertex shader input fed from the particle buffer.
pub const POSITION_ATTRIBUTE: &str = "vertexPosition";

/// Component format of a vertex attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttributeFormat {
    Float32x3,
}

impl AttributeFormat {
    pub const fn size(self) -> u32 {
        match self {
            AttributeFormat::Float32x3 => 12,
        }
    }
}

/// How buffer bytes map onto one shader input slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexBinding {
    pub location: AttributeLocation,
    pub format: AttributeFormat,
    /// Bytes between consecutive vertices.
    pub stride: u32,
    /// Byte offset of the attribute within a vertex.
    pub offset: u32,
}

// The particle buffer is read as tightly packed `Float32x3` starting at `x`.
// Breaking any of these would shift every vertex after the first.
const _: () = assert!(size_of::<Particle>() == AttributeFormat::Float32x3.size() as usize);
const _: () = assert!(offset_of!(Particle, x) == 0);
const _: () = assert!(offset_of!(Particle, y) == size_of::<f32>());
const _: () = assert!(offset_of!(Particle, period) == 2 * size_of::<f32>());

impl VertexBinding {
    /// Binding that exposes `x, y, period` as one three-float attribute.
    pub const fn particle_position(location: AttributeLocation) -> Self {
        Self {
            location,
            format: AttributeFormat::Float32x3,
            stride: size_of::<Particle>() as u32,
            offset: offset_of!(Particle, x) as u32,
        }
    }

    /// Byte size of a buffer holding `count` vertices.
    pub const fn buffer_size(&self, count: usize) -> u64 {
        self.stride as u64 * count as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_binding_matches_struct() {
        let binding = VertexBinding::particle_position(AttributeLocation(0));
        assert_eq!(binding.stride, 12);
        assert_eq!(binding.offset, 0);
        assert_eq!(binding.format.size(), binding.stride);
    }

    #[test]
    fn buffer_size_scales_with_count() {
        let binding = VertexBinding::particle_position(AttributeLocation(0));
        assert_eq!(binding.buffer_size(1000), 12_000);
        assert_eq!(binding.buffer_size(0), 0);
    }

    #[test]
    fn uploaded_bytes_follow_binding() {
        let particles = [
            Particle { x: 1.0, y: 2.0, period: 3.0 },
            Particle { x: 4.0, y: 5.0, period: 6.0 },
        ];
        let bytes: &[u8] = bytemuck::cast_slice(&particles);
        let binding = VertexBinding::particle_position(AttributeLocation(0));

        let second = binding.stride as usize + binding.offset as usize;
        let floats: &[f32] = bytemuck::cast_slice(&bytes[second..second + 12]);
        assert_eq!(floats, &[4.0, 5.0, 6.0]);
    }
}
