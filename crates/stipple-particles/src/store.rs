use bytemuck::{Pod, Zeroable};
use rand::Rng;

use crate::error::ConfigError;

/// Population used when no count is configured.
pub const DEFAULT_PARTICLE_COUNT: usize = 1000;

/// Horizontal inset from both display edges.
const INSET_X: u32 = 20;
/// Inset from the top edge; leaves room for the label panel.
const INSET_TOP: u32 = 50;
const INSET_BOTTOM: u32 = 20;

/// Static per-particle vertex data.
///
/// Uploaded once and read by the vertex shader as `vertexPosition`
/// (`x`, `y`, `period`). The layout is checked against the vertex binding
/// in `layout`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Oscillation period divisor, in `[1.0, 3.0]`.
    pub period: f32,
}

/// Generates `count` particles inside the inset rectangle of a
/// `width` x `height` display.
///
/// Positions are whole pixels drawn uniformly from `[20, width - 20]` and
/// `[50, height - 20]`. Periods are drawn from `{1.0, 1.1, ..., 3.0}`, close
/// enough that the particles line up every so often.
pub fn generate<R: Rng>(
    width: u32,
    height: u32,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Particle>, ConfigError> {
    if width <= 2 * INSET_X || height <= INSET_TOP + INSET_BOTTOM {
        return Err(ConfigError::DisplayTooSmall { width, height });
    }
    if count == 0 {
        return Err(ConfigError::EmptyPopulation);
    }

    let particles = (0..count)
        .map(|_| Particle {
            x: rng.gen_range(INSET_X..=width - INSET_X) as f32,
            y: rng.gen_range(INSET_TOP..=height - INSET_BOTTOM) as f32,
            period: rng.gen_range(10..=30) as f32 / 10.0,
        })
        .collect();

    Ok(particles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_in_bounds(particles: &[Particle], width: f32, height: f32) {
        for p in particles {
            assert!((20.0..=width - 20.0).contains(&p.x), "x = {}", p.x);
            assert!((50.0..=height - 20.0).contains(&p.y), "y = {}", p.y);
            assert!((1.0..=3.0).contains(&p.period), "period = {}", p.period);
        }
    }

    #[test]
    fn generates_requested_count_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let particles = generate(800, 450, 1000, &mut rng).unwrap();

        assert_eq!(particles.len(), 1000);
        assert_in_bounds(&particles, 800.0, 450.0);
    }

    #[test]
    fn bounds_hold_across_seeds_and_sizes() {
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            for (w, h) in [(41, 71), (100, 100), (1920, 1080)] {
                let particles = generate(w, h, 200, &mut rng).unwrap();
                assert_eq!(particles.len(), 200);
                assert_in_bounds(&particles, w as f32, h as f32);
            }
        }
    }

    #[test]
    fn smallest_display_pins_every_coordinate() {
        let mut rng = StdRng::seed_from_u64(3);
        let particles = generate(41, 71, 50, &mut rng).unwrap();
        // Ranges collapse to [20, 21] and [50, 51].
        assert!(particles.iter().all(|p| p.x == 20.0 || p.x == 21.0));
        assert!(particles.iter().all(|p| p.y == 50.0 || p.y == 51.0));
    }

    #[test]
    fn periods_are_tenths() {
        let mut rng = StdRng::seed_from_u64(11);
        for p in generate(800, 450, 500, &mut rng).unwrap() {
            let tenths = p.period * 10.0;
            assert!((tenths - tenths.round()).abs() < 1e-4, "period = {}", p.period);
        }
    }

    #[test]
    fn rejects_narrow_display() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            generate(30, 450, 10, &mut rng),
            Err(ConfigError::DisplayTooSmall { width: 30, height: 450 })
        );
        assert!(generate(40, 450, 10, &mut rng).is_err());
    }

    #[test]
    fn rejects_short_display() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            generate(800, 70, 10, &mut rng),
            Err(ConfigError::DisplayTooSmall { .. })
        ));
    }

    #[test]
    fn rejects_empty_population() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(generate(800, 450, 0, &mut rng), Err(ConfigError::EmptyPopulation));
    }

    #[test]
    fn same_seed_same_particles() {
        let a = generate(800, 450, 64, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate(800, 450, 64, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }
}
