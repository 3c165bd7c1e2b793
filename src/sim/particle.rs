//! Force-driven point masses and the player avatar

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A point mass integrated with symplectic Euler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub mass: f32,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Net force for the next integration step
    pub applied_force: Vec3,
    /// Respawn snapshot
    pub original_position: Vec3,
    pub original_velocity: Vec3,
    /// Respawn when the particle drops below this height
    pub floor_y: f32,
}

impl Particle {
    pub fn new(mass: f32, position: Vec3, velocity: Vec3) -> Self {
        Self {
            mass,
            position,
            velocity,
            applied_force: Vec3::ZERO,
            original_position: position,
            original_velocity: velocity,
            floor_y: PLAYER_FLOOR_Y,
        }
    }

    /// Acceleration from the applied force (zero for massless particles)
    #[inline]
    pub fn acceleration(&self) -> Vec3 {
        if self.mass > EPSILON {
            self.applied_force / self.mass
        } else {
            Vec3::ZERO
        }
    }

    /// Semi-implicit Euler: velocity first, then position with the new velocity.
    ///
    /// Returns true if the particle fell through the floor and was respawned.
    pub fn integrate(&mut self, dt: f32) -> bool {
        self.velocity += self.acceleration() * dt;
        self.position += self.velocity * dt;

        if self.position.y < self.floor_y {
            self.respawn();
            return true;
        }
        false
    }

    /// Restore the original snapshot
    pub fn respawn(&mut self) {
        self.position = self.original_position;
        self.velocity = self.original_velocity;
    }
}

/// Sideways movement request for the next fixed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveIntent {
    #[default]
    None,
    Left,
    Right,
}

impl MoveIntent {
    /// Horizontal direction (-1, 0, 1)
    pub fn direction(&self) -> f32 {
        match self {
            MoveIntent::None => 0.0,
            MoveIntent::Left => -1.0,
            MoveIntent::Right => 1.0,
        }
    }
}

/// The player avatar (Bernard)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Particle,
    pub lives: u8,
    /// Seconds survived
    pub score: f32,
}

impl Player {
    pub fn new(mass: f32, position: Vec3, velocity: Vec3) -> Self {
        Self {
            body: Particle::new(mass, position, velocity),
            lives: START_LIVES,
            score: 0.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    #[inline]
    pub fn lives_remaining(&self) -> u8 {
        self.lives
    }

    #[inline]
    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    /// Shift sideways by one movement step
    pub fn nudge(&mut self, intent: MoveIntent) {
        self.body.position.x += intent.direction() * NUDGE_STEP;
    }

    /// Lose a life; returns the lives left
    pub fn lose_life(&mut self) -> u8 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_updates_before_position() {
        let mut p = Particle::new(2.0, Vec3::ZERO, Vec3::ZERO);
        p.applied_force = Vec3::new(4.0, 0.0, 0.0);
        p.integrate(0.5);
        // a = 2, v = 1, x uses the new velocity
        assert!((p.velocity.x - 1.0).abs() < 1e-6);
        assert!((p.position.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_free_fall_closed_form() {
        let mut p = Particle::new(1.0, Vec3::new(0.0, 100.0, 0.0), Vec3::ZERO);
        let dt = 1.0 / 60.0;
        p.applied_force = GRAVITY;
        for _ in 0..30 {
            p.integrate(dt);
        }
        // v_n = n g dt, x_n = x0 + g dt^2 n(n+1)/2
        let n = 30.0;
        assert!((p.velocity.y - n * GRAVITY.y * dt).abs() < 1e-4);
        let expected_y = 100.0 + GRAVITY.y * dt * dt * n * (n + 1.0) / 2.0;
        assert!((p.position.y - expected_y).abs() < 1e-3);
    }

    #[test]
    fn test_respawn_below_floor() {
        let start = Vec3::new(-3.0, 4.0, 2.0);
        let mut p = Particle::new(1.0, start, Vec3::X);
        p.position.y = -9.9;
        p.velocity = Vec3::new(0.0, -10.0, 0.0);
        assert!(p.integrate(0.1));
        assert_eq!(p.position, start);
        assert_eq!(p.velocity, Vec3::X);
    }

    #[test]
    fn test_massless_particle_ignores_force() {
        let mut p = Particle::new(0.0, Vec3::ZERO, Vec3::Y);
        p.applied_force = Vec3::new(100.0, 0.0, 0.0);
        p.integrate(1.0);
        assert!(p.velocity.is_finite());
        assert_eq!(p.velocity, Vec3::Y);
    }

    #[test]
    fn test_player_lives_saturate() {
        let mut player = Player::new(1.0, Vec3::ZERO, Vec3::ZERO);
        assert_eq!(player.lose_life(), 2);
        assert_eq!(player.lose_life(), 1);
        assert_eq!(player.lose_life(), 0);
        assert_eq!(player.lose_life(), 0);
        assert!(!player.is_alive());
    }

    #[test]
    fn test_nudge() {
        let mut player = Player::new(1.0, Vec3::ZERO, Vec3::ZERO);
        player.nudge(MoveIntent::Left);
        assert_eq!(player.position().x, -NUDGE_STEP);
        player.nudge(MoveIntent::None);
        assert_eq!(player.position().x, -NUDGE_STEP);
    }
}
