//! Asteroid spawning
//!
//! Keeps the live body population at a target count. All randomness comes
//! from the generator passed in, so a seeded source reproduces a run.

use glam::{Mat4, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{MaterialHandle, RigidBody, ShapeHandle};
use crate::{random_unit_vector, randomized};

/// Ranges new bodies are drawn from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnRanges {
    /// Spawn point relative to the anchor
    pub origin: Vec3,
    /// Width of the uniform jitter window around the spawn point, per axis
    pub position_jitter: Vec3,
    pub velocity_base: Vec3,
    /// Width of the uniform jitter window around the base velocity, per axis
    pub velocity_jitter: Vec3,
    /// If set, the jittered velocity is rescaled to this speed
    pub speed: Option<f32>,
    pub size: Vec3,
    /// Uniform [0, j) growth added to the size per axis
    pub size_jitter: Vec3,
    /// Spin rate is drawn from [0, max)
    pub max_angular_velocity: f32,
}

impl SpawnRanges {
    /// Asteroids raining onto the shower platform
    pub fn shower() -> Self {
        Self {
            origin: Vec3::new(0.0, 30.0, 0.0),
            position_jitter: Vec3::splat(10.0),
            velocity_base: Vec3::NEG_Y,
            velocity_jitter: Vec3::splat(2.0),
            speed: Some(3.0),
            size: Vec3::splat(2.0),
            size_jitter: Vec3::new(0.0, 1.0, 0.0),
            max_angular_velocity: 1.0,
        }
    }

    /// Asteroids dropped above the player, in the play plane (z = 2)
    pub fn run() -> Self {
        Self {
            origin: Vec3::new(0.0, 15.0, 2.0),
            position_jitter: Vec3::new(30.0, 0.0, 0.0),
            velocity_base: Vec3::NEG_Y,
            velocity_jitter: Vec3::new(10.0, 2.0, 0.0),
            speed: None,
            size: Vec3::ONE,
            size_jitter: Vec3::ZERO,
            max_angular_velocity: 1.0,
        }
    }
}

/// Refills the body population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub target_population: usize,
    pub ranges: SpawnRanges,
    /// Shapes to pick from (uniformly)
    pub shapes: Vec<ShapeHandle>,
    pub material: MaterialHandle,
}

impl Spawner {
    pub fn new(target_population: usize, ranges: SpawnRanges) -> Self {
        Self {
            target_population,
            ranges,
            shapes: vec![ShapeHandle::default()],
            material: MaterialHandle::default(),
        }
    }

    /// Build one body around `anchor`
    pub fn spawn_one<R: Rng + ?Sized>(&self, anchor: Vec3, rng: &mut R) -> RigidBody {
        let r = &self.ranges;

        let shape = match self.shapes.len() {
            0 => ShapeHandle::default(),
            n => self.shapes[rng.random_range(0..n)],
        };
        let size = r.size
            + r.size_jitter
                * Vec3::new(rng.random::<f32>(), rng.random::<f32>(), rng.random::<f32>());
        let position = randomized(anchor + r.origin, r.position_jitter, rng);

        let mut velocity = randomized(r.velocity_base, r.velocity_jitter, rng);
        if let Some(speed) = r.speed {
            velocity = velocity.normalize_or_zero() * speed;
        }
        let angular_velocity = rng.random::<f32>() * r.max_angular_velocity;
        let spin_axis = random_unit_vector(rng);

        let mut body = RigidBody::new(shape, self.material, size).emplaced(
            Mat4::from_translation(position),
            velocity,
            angular_velocity,
            spin_axis,
        );
        body.tint = [
            0.4 + 0.4 * rng.random::<f32>(),
            0.4 + 0.4 * rng.random::<f32>(),
            0.4 + 0.4 * rng.random::<f32>(),
            1.0,
        ];
        body
    }

    /// Spawn until the population reaches the target; returns how many were added
    pub fn replenish<R: Rng + ?Sized>(&self, bodies: &mut Vec<RigidBody>, anchor: Vec3, rng: &mut R) -> usize {
        let mut spawned = 0;
        while bodies.len() < self.target_population {
            bodies.push(self.spawn_one(anchor, rng));
            spawned += 1;
        }
        if spawned > 0 {
            log::debug!("Spawned {} bodies (population {})", spawned, bodies.len());
        }
        spawned
    }
}
