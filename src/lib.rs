//! Bernard - a platformer where you dodge falling asteroids
//!
//! Core modules:
//! - `sim`: Deterministic fixed-timestep simulation (bodies, player, contacts, collisions)
//! - `render`: Render extraction (GPU instance records, asset registry)
//! - `settings`: Runtime settings loaded from JSON
//! - `highscores`: Best survival times

pub mod highscores;
pub mod render;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{ScenarioKind, Settings};

use glam::{Mat4, Vec3, Vec4};
use rand::Rng;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep for the asteroid shower (20 Hz)
    pub const SHOWER_DT: f32 = 1.0 / 20.0;
    /// Fixed simulation timestep for the player game (60 Hz)
    pub const RUN_DT: f32 = 1.0 / 60.0;
    /// Largest frame time fed into the accumulator to prevent spiral of death
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// World gravity (y-down)
    pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.8, 0.0);

    /// Below this height the player respawns at its starting snapshot
    pub const PLAYER_FLOOR_Y: f32 = -10.0;
    /// Lives at the start of a run
    pub const START_LIVES: u8 = 3;
    /// Sideways distance covered by one movement input
    pub const NUDGE_STEP: f32 = 0.25;

    /// Offset from the player's center to its feet for platform contact
    pub const PROBE_OFFSET_Y: f32 = -1.25;
    /// How far below a platform's surface the feet still count as touching it
    pub const PLATFORM_SLAB_DEPTH: f32 = 0.5;
    /// Half height of a platform slab for body overlap tests
    pub const PLATFORM_HALF_THICKNESS: f32 = 0.5;

    /// Retained fraction of vertical speed after an asteroid bounce
    pub const BOUNCE_FACTOR: f32 = 0.6;
    /// Asteroids below this height bounce back up (shower floor)
    pub const SHOWER_FLOOR_Y: f32 = -8.0;
    /// Asteroids farther than this from the origin are despawned (shower)
    pub const SHOWER_DESPAWN_RADIUS: f32 = 50.0;
    /// Asteroids farther than this from the player are despawned (run)
    pub const RUN_DESPAWN_RADIUS: f32 = 40.0;

    /// Hit box half-size around the player on x and y
    pub const HIT_LEEWAY: f32 = 2.0;
    /// Velocity retained by an asteroid when it bounces off the player
    pub const HIT_REFLECT_FACTOR: f32 = 0.1;
    /// Scale of the reflected velocity used to shove the player
    pub const HIT_PUSH_SCALE: f32 = 0.05;
    /// Sideways kick added to an asteroid's velocity when it strikes
    pub const HIT_NUDGE_X: f32 = 0.5;
    /// Lower bound for the player's height after a hit
    pub const HIT_CLAMP_FLOOR: f32 = -8.0;
    /// Second lower bound for the player's height after a hit
    pub const HIT_CLAMP_CEILING: f32 = 5.0;

    /// Lengths below this are treated as zero
    pub const EPSILON: f32 = 1e-6;
}

/// Translation part of an affine transform (the image of the origin)
#[inline]
pub fn translation_of(m: &Mat4) -> Vec3 {
    m.w_axis.truncate()
}

/// Rotation matrix about an arbitrary (not necessarily unit) axis.
///
/// A degenerate axis yields the identity.
#[inline]
pub fn rotation_about(angle: f32, axis: Vec3) -> Mat4 {
    match axis.try_normalize() {
        Some(axis) => Mat4::from_axis_angle(axis, angle),
        None => Mat4::IDENTITY,
    }
}

/// Column-wise linear blend of two matrices.
///
/// The result is not re-orthonormalized.
pub fn mix_mat4(a: &Mat4, b: &Mat4, alpha: f32) -> Mat4 {
    Mat4::from_cols(
        mix_vec4(a.x_axis, b.x_axis, alpha),
        mix_vec4(a.y_axis, b.y_axis, alpha),
        mix_vec4(a.z_axis, b.z_axis, alpha),
        mix_vec4(a.w_axis, b.w_axis, alpha),
    )
}

#[inline]
fn mix_vec4(a: Vec4, b: Vec4, alpha: f32) -> Vec4 {
    a + (b - a) * alpha
}

/// Jitter each component of `v` uniformly over a window `spread` wide
/// (so within `±spread / 2`)
pub fn randomized<R: Rng + ?Sized>(v: Vec3, spread: Vec3, rng: &mut R) -> Vec3 {
    let jitter = Vec3::new(
        rng.random::<f32>() - 0.5,
        rng.random::<f32>() - 0.5,
        rng.random::<f32>() - 0.5,
    );
    v + jitter * spread
}

/// Random direction (cube-sampled, then normalized)
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    randomized(Vec3::ZERO, Vec3::ONE, rng)
        .try_normalize()
        .unwrap_or(Vec3::Y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_translation_of() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)) * Mat4::from_rotation_y(0.7);
        assert!(translation_of(&m).abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn test_rotation_about_degenerate_axis() {
        assert_eq!(rotation_about(1.0, Vec3::ZERO), Mat4::IDENTITY);
        // Non-unit axes are normalized first
        let a = rotation_about(0.5, Vec3::new(0.0, 3.0, 0.0));
        assert!(a.abs_diff_eq(Mat4::from_rotation_y(0.5), 1e-6));
    }

    #[test]
    fn test_mix_mat4_endpoints() {
        let a = Mat4::from_rotation_x(0.3);
        let b = Mat4::from_rotation_z(1.1);
        assert_eq!(mix_mat4(&a, &b, 0.0), a);
        assert!(mix_mat4(&a, &b, 1.0).abs_diff_eq(b, 1e-6));
    }

    #[test]
    fn test_random_unit_vector_is_unit() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_randomized_stays_in_spread() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let v = randomized(Vec3::new(0.0, 30.0, 0.0), Vec3::splat(10.0), &mut rng);
            assert!(v.x.abs() <= 5.0 && (v.y - 30.0).abs() <= 5.0 && v.z.abs() <= 5.0);
        }
    }
}
