use super::Mat4;

/// Viewport size in logical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Orthographic projection mapping logical pixels (top-left origin, +Y
    /// down) to clip space. Depth range is wgpu's `[0, 1]`; `z = 0` lands
    /// inside it.
    pub fn pixel_projection(self) -> Mat4 {
        Mat4::orthographic_rh(0.0, self.width.max(1.0), self.height.max(1.0), 0.0, -1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn pixel_projection_maps_corners_to_ndc() {
        let p = Viewport::new(800.0, 450.0).pixel_projection();

        let top_left = p * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let bottom_right = p * Vec4::new(800.0, 450.0, 0.0, 1.0);

        assert!((top_left.x + 1.0).abs() < 1e-6 && (top_left.y - 1.0).abs() < 1e-6);
        assert!((bottom_right.x - 1.0).abs() < 1e-6 && (bottom_right.y + 1.0).abs() < 1e-6);
        assert!((0.0..=1.0).contains(&top_left.z));
    }

    #[test]
    fn degenerate_viewport_still_projects() {
        let p = Viewport::new(0.0, 0.0).pixel_projection();
        assert!(p.is_finite());
    }
}
