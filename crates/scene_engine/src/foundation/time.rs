//! Frame timing utilities

/// Smallest step ever handed to update behaviours (caps the simulation at 200 FPS)
pub const MIN_DELTA_TIME: f32 = 0.005;

/// Frame clock measuring the wall-clock duration of each frame step
///
/// The delta time reported for a frame is the elapsed time of the *previous*
/// full frame step, clamped to a floor. There is deliberately no ceiling: a
/// stalled frame produces a correspondingly large step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    min_delta_time: f32,
    delta_time: f32,
    frame_started_at: Option<f64>,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MIN_DELTA_TIME)
    }
}

impl FrameClock {
    /// Create a clock with the given delta-time floor in seconds
    pub fn new(min_delta_time: f32) -> Self {
        Self {
            min_delta_time,
            delta_time: min_delta_time,
            frame_started_at: None,
            frame_count: 0,
        }
    }

    /// Mark the start of a frame step at `now` (seconds)
    pub fn begin_frame(&mut self, now: f64) {
        self.frame_started_at = Some(now);
    }

    /// Mark the end of a frame step at `now` and return the clamped delta
    ///
    /// Calling this without a matching [`begin_frame`](Self::begin_frame)
    /// leaves the previous delta untouched.
    pub fn end_frame(&mut self, now: f64) -> f32 {
        if let Some(started) = self.frame_started_at.take() {
            #[allow(clippy::cast_possible_truncation)]
            let elapsed = (now - started) as f32;
            self.delta_time = elapsed.max(self.min_delta_time);
            self.frame_count += 1;
        }
        self.delta_time
    }

    /// Delta time to hand to the next round of update behaviours
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Configured delta-time floor
    pub fn min_delta_time(&self) -> f32 {
        self.min_delta_time
    }

    /// Number of completed frames
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second derived from the current delta time
    pub fn fps(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let fps = (1.0 / self.delta_time) as u32;
        fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_frame_uses_floor() {
        let clock = FrameClock::default();
        assert_relative_eq!(clock.delta_time(), MIN_DELTA_TIME);
        assert_eq!(clock.frame_count(), 0);
    }

    #[test]
    fn test_short_frame_is_clamped_to_floor() {
        let mut clock = FrameClock::default();
        clock.begin_frame(10.0);
        let delta = clock.end_frame(10.002);
        assert_relative_eq!(delta, 0.005);
        assert_eq!(clock.fps(), 200);
    }

    #[test]
    fn test_long_frame_is_not_capped() {
        let mut clock = FrameClock::default();
        clock.begin_frame(1.0);
        let delta = clock.end_frame(3.5);
        assert_relative_eq!(delta, 2.5);
        assert_eq!(clock.fps(), 0);
    }

    #[test]
    fn test_end_without_begin_keeps_previous_delta() {
        let mut clock = FrameClock::new(0.01);
        clock.begin_frame(0.0);
        clock.end_frame(0.05);
        assert_relative_eq!(clock.end_frame(9.0), 0.05, epsilon = 1e-6);
        assert_eq!(clock.frame_count(), 1);
    }
}
