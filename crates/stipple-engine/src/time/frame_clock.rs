use std::time::Instant;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the clock was created. Monotonic and unclamped; this is
    /// the value shaders animate against.
    pub elapsed: f64,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,
}

/// Frame clock producing `FrameTime` snapshots.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    /// Creates a clock whose baseline is `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self { start }
    }

    /// Samples the clock now.
    pub fn tick(&self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Samples the clock at `now`.
    pub fn tick_at(&self, now: Instant) -> FrameTime {
        FrameTime {
            elapsed: now.saturating_duration_since(self.start).as_secs_f64(),
            now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn elapsed_is_relative_to_start() {
        let t0 = Instant::now();
        let clock = FrameClock::starting_at(t0);

        let a = clock.tick_at(t0);
        let b = clock.tick_at(t0 + Duration::from_millis(500));

        assert_eq!(a.elapsed, 0.0);
        assert!((b.elapsed - 0.5).abs() < 1e-9);
        assert_eq!(b.now, t0 + Duration::from_millis(500));
    }

    #[test]
    fn long_stalls_are_not_clamped() {
        let t0 = Instant::now();
        let clock = FrameClock::starting_at(t0);

        let ft = clock.tick_at(t0 + Duration::from_secs(3));
        assert!((ft.elapsed - 3.0).abs() < 1e-9);
    }

    #[test]
    fn ticks_before_start_read_zero() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let clock = FrameClock::starting_at(t0);
        assert_eq!(clock.tick_at(t0 - Duration::from_millis(10)).elapsed, 0.0);
    }
}
