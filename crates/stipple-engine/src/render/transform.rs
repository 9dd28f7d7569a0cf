use crate::coords::{Mat4, Viewport};

/// Per-frame transform state.
///
/// `model_view` maps object space to view space; `projection` maps view space
/// to clip space. Both are column-major (`glam`), so the combined transform
/// applies model-view first: `projection * model_view`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformState {
    pub model_view: Mat4,
    pub projection: Mat4,
}

impl TransformState {
    /// Identity model-view with a pixel-space orthographic projection.
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            model_view: Mat4::IDENTITY,
            projection: viewport.pixel_projection(),
        }
    }

    /// Combined model-view-projection matrix.
    #[inline]
    pub fn mvp(&self) -> Mat4 {
        self.projection * self.model_view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn mvp_applies_model_view_first() {
        let state = TransformState {
            model_view: Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)),
            projection: Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)),
        };
        let p = state.mvp() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        // translate then scale: (1 + 10) * 2
        assert_eq!(p.x, 22.0);
    }

    #[test]
    fn viewport_state_has_identity_model_view() {
        let state = TransformState::for_viewport(Viewport::new(800.0, 450.0));
        assert_eq!(state.model_view, Mat4::IDENTITY);
        assert_eq!(state.mvp(), state.projection);
    }
}
