use std::time::{Duration, Instant};

/// Averaged frames-per-second readout.
///
/// Counts frames over a sampling window and publishes the average when the
/// window closes, so the displayed value does not flicker every frame.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: Duration,
    window_start: Instant,
    frames: u32,
    current: Option<f32>,
}

impl FpsCounter {
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            window_start: now,
            frames: 0,
            current: None,
        }
    }

    /// Records one presented frame. Returns the new average when a sampling
    /// window just closed.
    pub fn record(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;

        let span = now.saturating_duration_since(self.window_start);
        if span < self.window {
            return None;
        }

        let fps = self.frames as f32 / span.as_secs_f32();
        self.current = Some(fps);
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }

    /// Last published average, if a window has completed.
    pub fn fps(&self) -> Option<f32> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_average_when_window_closes() {
        let t0 = Instant::now();
        let mut fps = FpsCounter::new(Duration::from_millis(500), t0);

        for i in 1..30 {
            assert_eq!(fps.record(t0 + Duration::from_micros(i * 16_667)), None);
        }
        let avg = fps.record(t0 + Duration::from_millis(500)).unwrap();
        assert!((avg - 60.0).abs() < 0.5, "avg = {avg}");
        assert_eq!(fps.fps(), Some(avg));
    }

    #[test]
    fn no_reading_before_first_window() {
        let t0 = Instant::now();
        let mut fps = FpsCounter::new(Duration::from_secs(1), t0);
        fps.record(t0);
        assert_eq!(fps.fps(), None);
    }
}
