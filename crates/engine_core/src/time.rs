//! Simulation clock for the externally driven tick loop.

/// Tracks elapsed simulation time and splits host frames into fixed steps.
///
/// The host calls [`SimClock::advance`] once per frame with its frame delta,
/// then drains [`SimClock::should_fixed_update`] to run zero or more fixed ticks.
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Total simulated time in seconds.
    elapsed: f64,
    /// Fixed ticks run since start.
    tick_count: u64,
    /// Fixed timestep in seconds (default 60 Hz).
    fixed_timestep: f32,
    /// Host time not yet consumed by fixed ticks.
    accumulator: f32,
    /// Upper bound on a single host frame, to avoid a spiral of death after a stall.
    max_frame_delta: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    /// Create a clock stepping at 60 Hz.
    pub fn new() -> Self {
        Self::with_rate(60.0)
    }

    /// Create a clock stepping at `hz` fixed ticks per second.
    pub fn with_rate(hz: f32) -> Self {
        Self {
            elapsed: 0.0,
            tick_count: 0,
            fixed_timestep: 1.0 / hz.max(1.0),
            accumulator: 0.0,
            max_frame_delta: 0.25,
        }
    }

    /// Feed one host frame's worth of time.
    pub fn advance(&mut self, frame_delta: f32) {
        self.accumulator += frame_delta.clamp(0.0, self.max_frame_delta);
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            self.elapsed += f64::from(self.fixed_timestep);
            self.tick_count += 1;
            true
        } else {
            false
        }
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }

    /// Get total simulated time in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    /// Get the number of fixed ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_whole_steps_only() {
        let mut clock = SimClock::with_rate(10.0);
        clock.advance(0.25);
        let mut ticks = 0;
        while clock.should_fixed_update() {
            ticks += 1;
        }
        assert_eq!(ticks, 2);
        assert_eq!(clock.tick_count(), 2);
        assert!((clock.elapsed_seconds() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut clock = SimClock::with_rate(8.0);
        clock.advance(10.0);
        let mut ticks = 0;
        while clock.should_fixed_update() {
            ticks += 1;
        }
        assert_eq!(ticks, 2);
    }
}
