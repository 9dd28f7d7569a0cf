use std::time::{Duration, Instant};

/// Caps how often the runtime requests a redraw.
///
/// The pacer keeps a deadline for the next frame. Deadlines advance by a fixed
/// interval so the average rate converges on the target; after a stall longer
/// than one interval the schedule restarts from `now` instead of bursting to
/// catch up.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Option<Duration>,
    next: Instant,
}

impl FramePacer {
    /// Creates a pacer targeting `fps` frames per second. `None` or `Some(0)`
    /// disables pacing.
    pub fn new(fps: Option<u32>, now: Instant) -> Self {
        let interval = fps
            .filter(|&f| f > 0)
            .map(|f| Duration::from_secs_f64(1.0 / f as f64));
        Self { interval, next: now }
    }

    /// Returns the frame interval, if pacing is enabled.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Deadline of the next frame.
    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    /// Returns `true` and schedules the following frame if a frame is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(interval) = self.interval else {
            return true;
        };

        if now < self.next {
            return false;
        }

        self.next += interval;
        if self.next <= now {
            self.next = now + interval;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_due_immediately() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(Some(60), t0);
        assert!(pacer.poll(t0));
    }

    #[test]
    fn waits_one_interval_between_frames() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(Some(50), t0);
        assert!(pacer.poll(t0));
        assert!(!pacer.poll(t0 + Duration::from_millis(10)));
        assert!(pacer.poll(t0 + Duration::from_millis(20)));
        assert_eq!(pacer.next_deadline(), t0 + Duration::from_millis(40));
    }

    #[test]
    fn stall_resets_schedule_instead_of_bursting() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(Some(50), t0);
        assert!(pacer.poll(t0));

        let late = t0 + Duration::from_millis(500);
        assert!(pacer.poll(late));
        assert_eq!(pacer.next_deadline(), late + Duration::from_millis(20));
        assert!(!pacer.poll(late + Duration::from_millis(1)));
    }

    #[test]
    fn unpaced_is_always_due() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(None, t0);
        assert!(pacer.interval().is_none());
        assert!(pacer.poll(t0));
        assert!(pacer.poll(t0));

        let zero = FramePacer::new(Some(0), t0);
        assert!(zero.interval().is_none());
    }
}
