//! Fixed timestep scheduler
//!
//! Decouples simulation from the display rate: variable frame times are
//! accumulated and consumed in fixed steps, and the leftover fraction of a
//! step becomes the blend factor for drawing bodies between their two latest
//! simulated poses.

use serde::{Deserialize, Serialize};

use super::body::RigidBody;
use crate::consts::MAX_FRAME_TIME;

/// Per-scenario stepping logic.
///
/// Called once per fixed step, before the scheduler advances the bodies.
pub trait StepPolicy {
    /// Apply forces, collisions, spawning, and anything else one step needs
    fn compute_step(&mut self, dt: f32, bodies: &mut Vec<RigidBody>);

    /// Stop stepping after the current step (e.g. the game is over)
    fn wants_halt(&self) -> bool {
        false
    }
}

/// Simulation time bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationClock {
    /// Frame time not yet consumed by fixed steps
    pub accumulated_time: f32,
    pub fixed_step: f32,
    /// Total simulated time (goes backwards under a negative time scale)
    pub simulated_time_total: f32,
    pub step_count: u64,
    /// Multiplier on incoming frame times
    pub time_scale: f32,
}

impl SimulationClock {
    pub fn new(fixed_step: f32) -> Self {
        Self {
            accumulated_time: 0.0,
            fixed_step,
            simulated_time_total: 0.0,
            step_count: 0,
            time_scale: 1.0,
        }
    }

    /// Fraction of a pending step (unclamped)
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.accumulated_time / self.fixed_step
    }
}

/// Whether the scheduler is stepping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunMode {
    #[default]
    Idle,
    Running,
}

/// Accumulator-driven stepping of a policy and its bodies
#[derive(Debug)]
pub struct FixedTimestepScheduler<P: StepPolicy> {
    clock: SimulationClock,
    mode: RunMode,
    bodies: Vec<RigidBody>,
    policy: P,
}

impl<P: StepPolicy> FixedTimestepScheduler<P> {
    /// Create an idle scheduler.
    ///
    /// # Panics
    /// If `fixed_step` is not a positive finite number.
    pub fn new(policy: P, fixed_step: f32) -> Self {
        assert!(
            fixed_step.is_finite() && fixed_step > 0.0,
            "fixed step must be positive and finite, got {fixed_step}"
        );
        Self {
            clock: SimulationClock::new(fixed_step),
            mode: RunMode::Idle,
            bodies: Vec::new(),
            policy,
        }
    }

    /// Consume one frame's elapsed time; returns the number of fixed steps run.
    ///
    /// While idle nothing is stepped or re-blended.
    pub fn tick(&mut self, frame_time: f32) -> u32 {
        if self.mode == RunMode::Idle {
            return 0;
        }
        if !frame_time.is_finite() {
            log::warn!("Ignoring non-finite frame time {}", frame_time);
            return 0;
        }

        let frame_time = frame_time * self.clock.time_scale;
        let direction = if frame_time > 0.0 {
            1.0
        } else if frame_time < 0.0 {
            -1.0
        } else {
            0.0
        };
        self.clock.accumulated_time += frame_time.clamp(-MAX_FRAME_TIME, MAX_FRAME_TIME);

        let dt = self.clock.fixed_step;
        let max_steps = self.max_steps_per_tick();
        let mut steps = 0;
        let mut alpha = None;
        while direction != 0.0 && self.clock.accumulated_time.abs() >= dt && steps < max_steps {
            self.policy.compute_step(dt, &mut self.bodies);
            for body in &mut self.bodies {
                body.advance(dt);
            }
            self.clock.simulated_time_total += direction * dt;
            self.clock.accumulated_time -= direction * dt;
            self.clock.step_count += 1;
            steps += 1;

            if self.policy.wants_halt() {
                log::info!("Simulation halted after {} steps", self.clock.step_count);
                self.clock.accumulated_time = 0.0;
                self.mode = RunMode::Idle;
                alpha = Some(1.0);
                break;
            }
        }

        if self.clock.accumulated_time.abs() >= dt {
            // Rounding left a whole step over after the cap; drop it
            self.clock.accumulated_time %= dt;
        }

        let alpha = alpha.unwrap_or_else(|| self.clock.alpha());
        for body in &mut self.bodies {
            body.blend_state(alpha);
        }
        steps
    }

    /// Most fixed steps one `tick` may run: a capped frame's worth
    pub fn max_steps_per_tick(&self) -> u32 {
        (MAX_FRAME_TIME / self.clock.fixed_step).ceil() as u32
    }

    pub fn start(&mut self) {
        self.mode = RunMode::Running;
    }

    pub fn pause(&mut self) {
        self.mode = RunMode::Idle;
    }

    /// Flip between idle and running
    pub fn toggle_running(&mut self) {
        self.mode = match self.mode {
            RunMode::Idle => RunMode::Running,
            RunMode::Running => RunMode::Idle,
        };
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.mode == RunMode::Running
    }

    /// Make simulated time run five times faster
    pub fn speed_up(&mut self) {
        self.clock.time_scale *= 5.0;
    }

    /// Make simulated time run five times slower
    pub fn slow_down(&mut self) {
        self.clock.time_scale /= 5.0;
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.clock.time_scale = time_scale;
    }

    pub fn steps_taken(&self) -> u64 {
        self.clock.step_count
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut Vec<RigidBody> {
        &mut self.bodies
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }
}
