//! Fixed-timestep simulation clock.
//!
//! Wall-clock frame time is fed into an accumulator and consumed in steps of
//! [`FIXED_DT`], so orbit and spin angles advance identically regardless of
//! the render rate. Each step adds `FIXED_DT * time_scale` seconds of
//! simulation time.

use std::time::Instant;

use tracing::warn;

/// Fixed simulation step: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Longest frame time fed into the accumulator. Longer stalls slow the
/// simulation down instead of running a burst of catch-up steps.
pub const MAX_FRAME_TIME: f64 = 0.25;

pub struct SimulationClock {
    previous_time: Instant,
    accumulator: f64,
    sim_time: f64,
    time_scale: f64,
}

impl SimulationClock {
    pub fn new(time_scale: f64) -> Self {
        let mut clock = Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            sim_time: 0.0,
            time_scale: 1.0,
        };
        clock.set_time_scale(time_scale);
        clock
    }

    /// Measure the wall-clock time since the last call and advance by it.
    /// Returns the simulation time to render.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;

        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
        }
        self.advance(frame_time);
        self.sim_time
    }

    /// Advance by an explicit frame time in seconds. Returns the number of
    /// fixed steps taken.
    pub fn advance(&mut self, frame_time: f64) -> u32 {
        self.accumulator += frame_time.clamp(0.0, MAX_FRAME_TIME);

        let mut steps = 0;
        while self.accumulator >= FIXED_DT {
            self.sim_time += FIXED_DT * self.time_scale;
            self.accumulator -= FIXED_DT;
            steps += 1;
        }
        steps
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Non-finite or negative scales are ignored.
    pub fn set_time_scale(&mut self, time_scale: f64) {
        if time_scale.is_finite() && time_scale >= 0.0 {
            self.time_scale = time_scale;
        } else {
            warn!("Ignoring invalid time scale {time_scale}");
        }
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}
