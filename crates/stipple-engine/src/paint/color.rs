use glam::Vec4;

/// 8-bit straight-alpha RGBA color.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const MAROON: Self = Self::new(190, 33, 55, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Maps every channel to `[0, 1]` by dividing by 255. Alpha stays straight.
    #[inline]
    pub fn normalized(self) -> Vec4 {
        Vec4::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        )
    }
}

/// Linear premultiplied RGBA color.
///
/// Invariant: `rgb` components are already multiplied by `a`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Rgba8> for Color {
    #[inline]
    fn from(c: Rgba8) -> Self {
        let n = c.normalized();
        Self::from_straight(n.x, n.y, n.z, n.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_translucent_red() {
        let n = Rgba8::new(255, 0, 0, 128).normalized();
        assert_eq!(n, Vec4::new(1.0, 0.0, 0.0, 128.0 / 255.0));
        assert!((n.w - 0.502).abs() < 1e-3);
    }

    #[test]
    fn normalizes_boundaries_exactly() {
        assert_eq!(Rgba8::new(0, 0, 0, 0).normalized(), Vec4::ZERO);
        assert_eq!(Rgba8::new(255, 255, 255, 255).normalized(), Vec4::ONE);
    }

    #[test]
    fn normalization_is_stable_across_calls() {
        let c = Rgba8::new(255, 0, 0, 128);
        assert_eq!(c.normalized(), c.normalized());
    }

    #[test]
    fn premultiplies_from_bytes() {
        let c = Color::from(Rgba8::new(255, 0, 0, 128));
        let a = 128.0 / 255.0;
        assert_eq!(c.to_array(), [a, 0.0, 0.0, a]);
    }
}
