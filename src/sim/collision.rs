//! Collision detection and response
//!
//! Everything here is axis-aligned: body rotation is ignored. Bodies bounce
//! off platforms and a floor, strike the player, and the player is stopped by
//! platform side faces.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::body::RigidBody;
use super::contact::Platform;
use super::particle::{MoveIntent, Player};
use crate::consts::*;

/// How a body responds when it lands on a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BouncePolicy {
    /// Snap onto the top face and reflect vertical speed (scaled)
    SnapAndBounce,
    /// Reflect vertical speed (scaled) without moving the body
    InvertOnly,
}

/// Body-vs-platform response parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformBounce {
    pub policy: BouncePolicy,
    /// Fraction of vertical speed kept after the bounce
    pub restitution: f32,
    /// Extra half-extent added to the platform footprint per axis
    pub margin: Vec3,
}

impl Default for PlatformBounce {
    fn default() -> Self {
        Self {
            policy: BouncePolicy::SnapAndBounce,
            restitution: BOUNCE_FACTOR,
            margin: Vec3::ZERO,
        }
    }
}

/// Strict box overlap between a body (half extents `size / 2`) and a platform slab
pub fn body_overlaps_platform(body: &RigidBody, platform: &Platform, margin: Vec3) -> bool {
    let body_half = body.size * 0.5;
    let platform_half = platform.half_extents() + margin;
    let gap = (body.center - platform.position).abs();
    gap.cmplt(body_half + platform_half).all()
}

/// Bounce a downward-moving body off a platform it overlaps.
///
/// Returns true if the body bounced.
pub fn resolve_body_platform(body: &mut RigidBody, platform: &Platform, bounce: &PlatformBounce) -> bool {
    if body.linear_velocity.y >= 0.0 || !body_overlaps_platform(body, platform, bounce.margin) {
        return false;
    }

    if bounce.policy == BouncePolicy::SnapAndBounce {
        body.center.y = platform.top() + body.size.y * 0.5;
    }
    body.linear_velocity.y *= -bounce.restitution;
    true
}

/// Bounce a body that sinks below `floor_y` while still falling
pub fn floor_bounce(body: &mut RigidBody, floor_y: f32, restitution: f32) -> bool {
    if body.center.y < floor_y && body.linear_velocity.y < 0.0 {
        body.linear_velocity.y *= -restitution;
        return true;
    }
    false
}

/// Body-vs-player response parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitResponse {
    /// Half size of the hit box on x and y
    pub leeway: Vec2,
    /// Added to the body's x velocity before reflecting
    pub nudge_x: f32,
    /// Velocity retained by the body in the reflection
    pub reflect_factor: f32,
    /// Scale of the reflected velocity used to shove the player
    pub push_scale: f32,
    pub clamp_floor: f32,
    pub clamp_ceiling: f32,
}

impl Default for HitResponse {
    fn default() -> Self {
        Self {
            leeway: Vec2::splat(HIT_LEEWAY),
            nudge_x: HIT_NUDGE_X,
            reflect_factor: HIT_REFLECT_FACTOR,
            push_scale: HIT_PUSH_SCALE,
            clamp_floor: HIT_CLAMP_FLOOR,
            clamp_ceiling: HIT_CLAMP_CEILING,
        }
    }
}

/// Is the body center inside the player's hit box (x and y only)?
pub fn body_hits_player(center: Vec3, player_pos: Vec3, leeway: Vec2) -> bool {
    center.x >= player_pos.x - leeway.x
        && center.x <= player_pos.x + leeway.x
        && center.y >= player_pos.y - leeway.y
        && center.y <= player_pos.y + leeway.y
}

/// `factor * v - 2 (v . n) n`
#[inline]
pub fn damped_reflection(velocity: Vec3, normal: Vec3, factor: f32) -> Vec3 {
    factor * velocity - 2.0 * velocity.dot(normal) * normal
}

/// Outcome of a body striking the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Player survived; body and player were pushed apart
    Struck { lives_remaining: u8 },
    /// Last life lost; nothing else was changed
    Fatal,
}

/// Apply a hit: the player loses a life, the body is reflected off the player
/// and the player is shoved along the reflection.
pub fn resolve_player_hit(body: &mut RigidBody, player: &mut Player, response: &HitResponse) -> HitOutcome {
    let lives_remaining = player.lose_life();
    if lives_remaining == 0 {
        return HitOutcome::Fatal;
    }

    body.linear_velocity.x += response.nudge_x;

    let offset = body.center - player.position();
    let distance = offset.length();
    if distance > EPSILON {
        let normal = offset / distance;
        let reflection = damped_reflection(body.linear_velocity, normal, response.reflect_factor);
        body.linear_velocity = reflection;

        let pos = &mut player.body.position;
        pos.x -= reflection.x * response.push_scale;
        pos.y -= reflection.y * response.push_scale;
    }

    // Two successive lower bounds; the second one dominates.
    let pos = &mut player.body.position;
    if pos.y < response.clamp_floor {
        pos.y = response.clamp_floor;
    }
    if pos.y < response.clamp_ceiling {
        pos.y = response.clamp_ceiling;
    }

    HitOutcome::Struck { lives_remaining }
}

/// Which platform face the player is pressed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LateralContact {
    /// Against the platform's left face (platform is to the player's right)
    Left,
    /// Against the platform's right face (platform is to the player's left)
    Right,
}

impl LateralContact {
    /// Does this contact forbid moving in the given direction?
    pub fn blocks(&self, intent: MoveIntent) -> bool {
        matches!(
            (self, intent),
            (LateralContact::Left, MoveIntent::Right) | (LateralContact::Right, MoveIntent::Left)
        )
    }
}

/// Side probe geometry for lateral platform contact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LateralProbe {
    /// Offset from the player to the right-hand body probe (mirrored for left)
    pub body_offset: Vec3,
    /// How far outside a face the player may stand and still touch it
    pub horizontal_tolerance: f32,
    /// Required height alignment between the probe and the platform
    pub vertical_tolerance: f32,
}

impl Default for LateralProbe {
    fn default() -> Self {
        Self {
            body_offset: Vec3::new(0.75, PROBE_OFFSET_Y, 0.0),
            horizontal_tolerance: 1.0,
            vertical_tolerance: 0.1,
        }
    }
}

/// Find the first platform whose side face the player is touching.
///
/// Platforms the player is below are skipped.
pub fn lateral_platform_contact(
    player_pos: Vec3,
    platforms: &[Platform],
    probe: &LateralProbe,
) -> Option<LateralContact> {
    let right_probe = player_pos + probe.body_offset;
    let left_probe = player_pos + probe.body_offset * Vec3::new(-1.0, 1.0, 1.0);

    for platform in platforms {
        if player_pos.y < platform.position.y {
            continue;
        }
        let p = platform.position;
        let within_depth = |z: f32| z > p.z - platform.half_depth && z < p.z + platform.half_depth;
        let aligned = |y: f32| (y - p.y).abs() <= probe.vertical_tolerance;

        let right_face = p.x + platform.half_width + probe.horizontal_tolerance;
        if within_depth(left_probe.z)
            && aligned(left_probe.y)
            && left_probe.x <= right_face
            && player_pos.x > right_face
        {
            return Some(LateralContact::Right);
        }

        let left_face = p.x - platform.half_width - probe.horizontal_tolerance;
        if within_depth(right_probe.z)
            && aligned(right_probe.y)
            && right_probe.x >= left_face
            && player_pos.x < left_face
        {
            return Some(LateralContact::Left);
        }
    }
    None
}

/// Has a body strayed more than `radius` from `anchor`?
#[inline]
pub fn should_despawn(center: Vec3, anchor: Vec3, radius: f32) -> bool {
    center.distance(anchor) > radius
}
