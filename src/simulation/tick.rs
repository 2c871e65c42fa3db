//! Fixed-timestep driver
//!
//! Frames arrive with variable delta time; simulations want a constant one.
//! The accumulator turns frame time into a whole number of fixed steps and
//! carries the remainder into the next frame.

use tracing::warn;

use crate::core::config::SimulationConfig;

#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    max_steps_per_frame: u32,
    accumulator: f32,
    total_steps: u64,
}

impl FixedTimestep {
    pub fn new(step: f32, max_steps_per_frame: u32) -> Self {
        debug_assert!(step > 0.0 && max_steps_per_frame > 0);
        Self {
            step,
            max_steps_per_frame,
            accumulator: 0.0,
            total_steps: 0,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.fixed_timestep, config.max_steps_per_frame)
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Accumulate frame time and return how many fixed steps to run
    ///
    /// Backlog beyond `max_steps_per_frame` is dropped.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }

        self.accumulator += frame_dt;
        let due = (self.accumulator / self.step).floor() as u32;
        let steps = due.min(self.max_steps_per_frame);

        if due > self.max_steps_per_frame {
            warn!(
                due,
                max = self.max_steps_per_frame,
                "Simulation falling behind, dropping {} steps",
                due - self.max_steps_per_frame
            );
            self.accumulator %= self.step;
        } else {
            self.accumulator -= steps as f32 * self.step;
        }

        self.total_steps += steps as u64;
        steps
    }

    /// Fraction of a step left in the accumulator, for interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    /// Advance and call `f` once per fixed step with the step length
    pub fn run<F: FnMut(f32)>(&mut self, frame_dt: f32, mut f: F) -> u32 {
        let steps = self.advance(frame_dt);
        for _ in 0..steps {
            f(self.step);
        }
        steps
    }
}
