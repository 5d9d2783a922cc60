/// Timing information handed to every per-frame callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Seconds since the clock started.
    pub elapsed: f64,
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Number of frames produced so far, starting at 1.
    pub index: u64,
}

/// The single global clock of the render loop.
///
/// The clock is driven explicitly: the loop measures wall time and feeds the
/// delta in, tests feed fixed steps. Until `start` is called the clock is
/// suspended and produces no frames.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    elapsed: Option<f64>,
    frames: u64,
}

impl FrameClock {
    /// A suspended clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that is already running at t = 0.
    pub fn started() -> Self {
        let mut clock = Self::new();
        clock.start();
        clock
    }

    /// Start the clock. Has no effect if it is already running.
    pub fn start(&mut self) {
        if self.elapsed.is_none() {
            tracing::debug!("frame clock started");
            self.elapsed = Some(0.0);
        }
    }

    pub fn is_running(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Seconds since start, or `None` while suspended.
    pub fn elapsed(&self) -> Option<f64> {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance by `dt` seconds and produce the next frame.
    ///
    /// Negative deltas are treated as zero so elapsed time never goes back.
    pub fn advance(&mut self, dt: f32) -> Option<Frame> {
        let elapsed = self.elapsed.as_mut()?;
        let delta = dt.max(0.0);
        *elapsed += f64::from(delta);
        self.frames += 1;
        Some(Frame {
            elapsed: *elapsed,
            delta,
            index: self.frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspended_clock_produces_no_frames() {
        let mut clock = FrameClock::new();
        assert!(!clock.is_running());
        assert!(clock.advance(0.016).is_none());
        assert_eq!(clock.frames(), 0);
        assert_eq!(clock.elapsed(), None);
    }

    #[test]
    fn elapsed_accumulates() {
        let mut clock = FrameClock::started();
        clock.advance(0.5);
        let frame = clock.advance(0.25).unwrap();
        assert_eq!(frame.index, 2);
        assert!((frame.elapsed - 0.75).abs() < 1e-9);
        assert_eq!(frame.delta, 0.25);
    }

    #[test]
    fn negative_delta_does_not_rewind() {
        let mut clock = FrameClock::started();
        clock.advance(1.0);
        let frame = clock.advance(-0.5).unwrap();
        assert!((frame.elapsed - 1.0).abs() < 1e-9);
        assert_eq!(frame.delta, 0.0);
    }

    #[test]
    fn start_is_idempotent() {
        let mut clock = FrameClock::started();
        clock.advance(2.0);
        clock.start();
        assert_eq!(clock.elapsed(), Some(2.0));
    }
}
