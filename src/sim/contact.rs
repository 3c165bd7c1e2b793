//! Spring-damper contact between the player and static platforms

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Platform surface normal (platforms are horizontal)
pub const PLATFORM_NORMAL: Vec3 = Vec3::Y;

/// A static, horizontal platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Center of the top surface
    pub position: Vec3,
    /// Spring stiffness
    pub ks: f32,
    /// Damping
    pub kd: f32,
    pub half_width: f32,
    pub half_depth: f32,
}

impl Platform {
    pub const fn new(position: Vec3, ks: f32, kd: f32, half_width: f32, half_depth: f32) -> Self {
        Self {
            position,
            ks,
            kd,
            half_width,
            half_depth,
        }
    }

    /// Signed height of `p` above the platform plane
    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        (p - self.position).dot(PLATFORM_NORMAL)
    }

    /// Is `p` over the platform footprint (x inclusive, z exclusive)?
    #[inline]
    pub fn covers(&self, p: Vec3) -> bool {
        p.x >= self.position.x - self.half_width
            && p.x <= self.position.x + self.half_width
            && p.z > self.position.z - self.half_depth
            && p.z < self.position.z + self.half_depth
    }

    /// Half extents of the slab used for body overlap tests
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.half_width, PLATFORM_HALF_THICKNESS, self.half_depth)
    }

    /// Height of the slab's top face
    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y + PLATFORM_HALF_THICKNESS
    }

    /// Transform for drawing the platform as a scaled unit cube
    pub fn drawn_transform(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_scale(self.half_extents())
    }
}

/// Where on the player contact is sampled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactProbe {
    /// Offset from the particle position to the contact point (the feet)
    pub offset: Vec3,
    /// Contact only counts within this depth below the surface, if set
    pub slab_depth: Option<f32>,
}

impl Default for ContactProbe {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, PROBE_OFFSET_Y, 0.0),
            slab_depth: Some(PLATFORM_SLAB_DEPTH),
        }
    }
}

impl ContactProbe {
    /// Probe at the particle itself with unbounded depth
    pub const fn point() -> Self {
        Self {
            offset: Vec3::ZERO,
            slab_depth: None,
        }
    }
}

/// Reaction force from the first platform the probe penetrates.
///
/// Platforms are tried in list order and only the first hit contributes. The
/// spring pushes along the platform normal by `-signed_distance * ks`; the
/// damper opposes the velocity. A zero velocity gives no damping.
pub fn compute_platform_force(
    platforms: &[Platform],
    probe: &ContactProbe,
    position: Vec3,
    velocity: Vec3,
) -> Vec3 {
    let pos = position + probe.offset;

    for platform in platforms {
        let signed_dist = platform.signed_distance(pos);
        if signed_dist >= 0.0 || !platform.covers(pos) {
            continue;
        }
        if let Some(depth) = probe.slab_depth {
            if pos.y <= platform.position.y - depth {
                continue;
            }
        }

        let friction_dir = (-velocity).normalize_or_zero();
        let spring = PLATFORM_NORMAL * (-signed_dist * platform.ks);
        let damper = friction_dir * velocity.dot(friction_dir) * platform.kd;
        return spring - damper;
    }

    Vec3::ZERO
}

/// Gravity plus the platform reaction
#[inline]
pub fn compute_net_force(gravity: Vec3, mass: f32, platform_force: Vec3) -> Vec3 {
    gravity * mass + platform_force
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(y: f32, ks: f32, kd: f32) -> Platform {
        Platform::new(Vec3::new(0.0, y, 0.0), ks, kd, 2.0, 2.0)
    }

    #[test]
    fn test_spring_force_matches_penetration() {
        let platforms = [pad(1.0, 15000.0, 0.0)];
        let force = compute_platform_force(
            &platforms,
            &ContactProbe::point(),
            Vec3::new(0.5, 0.9, 0.0),
            Vec3::ZERO,
        );
        assert!((force.y - 15000.0 * 0.1).abs() < 0.05);
        assert_eq!(force.x, 0.0);
        assert_eq!(force.z, 0.0);
    }

    #[test]
    fn test_no_force_above_surface_or_outside_footprint() {
        let platforms = [pad(1.0, 100.0, 1.0)];
        let probe = ContactProbe::point();
        assert_eq!(compute_platform_force(&platforms, &probe, Vec3::new(0.0, 1.5, 0.0), Vec3::ZERO), Vec3::ZERO);
        assert_eq!(compute_platform_force(&platforms, &probe, Vec3::new(3.0, 0.5, 0.0), Vec3::ZERO), Vec3::ZERO);
        assert_eq!(compute_platform_force(&platforms, &probe, Vec3::new(0.0, 0.5, 2.0), Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_damping_opposes_velocity() {
        let platforms = [pad(0.0, 0.0, 10.0)];
        let v = Vec3::new(3.0, -4.0, 0.0);
        let force = compute_platform_force(&platforms, &ContactProbe::point(), Vec3::new(0.0, -0.1, 0.0), v);
        assert!(force.abs_diff_eq(-v * 10.0, 1e-4));
    }

    #[test]
    fn test_first_platform_wins() {
        let platforms = [pad(1.0, 100.0, 0.0), pad(2.0, 1000.0, 0.0)];
        let force = compute_platform_force(&platforms, &ContactProbe::point(), Vec3::new(0.0, 0.5, 0.0), Vec3::ZERO);
        // Only the first platform's spring (0.5 * 100), no summation
        assert!((force.y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_probe_offset_and_slab_depth() {
        let platforms = [pad(1.0, 100.0, 0.0)];
        let probe = ContactProbe::default();
        // Feet at 0.75: 0.25 below the surface, inside the slab
        let force = compute_platform_force(&platforms, &probe, Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO);
        assert!((force.y - 25.0).abs() < 1e-3);
        // Feet at 0.25: deeper than the slab, no contact
        let force = compute_platform_force(&platforms, &probe, Vec3::new(0.0, 1.5, 0.0), Vec3::ZERO);
        assert_eq!(force, Vec3::ZERO);
    }

    #[test]
    fn test_net_force() {
        let f = compute_net_force(GRAVITY, 2.0, Vec3::new(0.0, 5.0, 0.0));
        assert!(f.abs_diff_eq(Vec3::new(0.0, -19.6 + 5.0, 0.0), 1e-5));
    }
}
