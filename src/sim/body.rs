//! Rigid bodies that move under their own velocities
//!
//! Each body keeps the pose from the previous fixed step so the renderer can
//! blend between the two latest simulated states.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::EPSILON;
use crate::{mix_mat4, rotation_about, translation_of};

/// Opaque handle to a shape owned by the render side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ShapeHandle(pub u32);

/// Opaque handle to a material owned by the render side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MaterialHandle(pub u32);

/// Pose captured at the end of a fixed step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub center: Vec3,
    /// Orientation with the translation removed
    pub rotation: Mat4,
}

/// A moving body (asteroid or platform)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    pub shape: ShapeHandle,
    pub material: MaterialHandle,
    /// Per-body color multiplier applied on top of the material
    pub tint: [f32; 4],
    /// Scale along each local axis
    pub size: Vec3,
    pub center: Vec3,
    pub rotation: Mat4,
    pub previous: Pose,
    pub linear_velocity: Vec3,
    /// Spin rate in radians per second
    pub angular_velocity: f32,
    pub spin_axis: Vec3,
    /// Blended transform for drawing (translate * rotate * scale)
    drawn_transform: Mat4,
}

impl RigidBody {
    /// Create a body at rest at the origin; call `emplace` to place it
    pub fn new(shape: ShapeHandle, material: MaterialHandle, size: Vec3) -> Self {
        Self {
            shape,
            material,
            tint: [1.0; 4],
            size,
            center: Vec3::ZERO,
            rotation: Mat4::IDENTITY,
            previous: Pose {
                center: Vec3::ZERO,
                rotation: Mat4::IDENTITY,
            },
            linear_velocity: Vec3::ZERO,
            angular_velocity: 0.0,
            spin_axis: Vec3::Y,
            drawn_transform: Mat4::from_scale(size),
        }
    }

    /// Assign (or overwrite) the body's pose and velocities.
    ///
    /// `location` is split into a center (its translation) and a rotation
    /// (the same transform with the translation removed). The previous pose is
    /// set to the new pose so the first blend does not smear.
    pub fn emplace(
        &mut self,
        location: Mat4,
        linear_velocity: Vec3,
        angular_velocity: f32,
        spin_axis: Vec3,
    ) -> &mut Self {
        self.center = translation_of(&location);
        self.rotation = Mat4::from_translation(-self.center) * location;
        self.previous = Pose {
            center: self.center,
            rotation: self.rotation,
        };
        self.drawn_transform = location;
        self.linear_velocity = linear_velocity;
        self.angular_velocity = angular_velocity;
        self.spin_axis = spin_axis;
        self
    }

    /// Builder form of `emplace`
    pub fn emplaced(
        mut self,
        location: Mat4,
        linear_velocity: Vec3,
        angular_velocity: f32,
        spin_axis: Vec3,
    ) -> Self {
        self.emplace(location, linear_velocity, angular_velocity, spin_axis);
        self
    }

    /// Forward Euler step of both velocities.
    ///
    /// The incremental rotation is pre-multiplied and never re-orthonormalized,
    /// so drift accumulates over long runs.
    pub fn advance(&mut self, dt: f32) {
        self.previous = Pose {
            center: self.center,
            rotation: self.rotation,
        };
        self.center += self.linear_velocity * dt;
        self.rotation = rotation_about(dt * self.angular_velocity, self.spin_axis) * self.rotation;
    }

    /// Naive per-basis-vector blend between the previous and current rotation.
    ///
    /// Shears at high angular velocity; kept as is.
    pub fn blend_rotation(&self, alpha: f32) -> Mat4 {
        mix_mat4(&self.previous.rotation, &self.rotation, alpha)
    }

    /// Recompute the drawn transform for blend factor `alpha`.
    ///
    /// `alpha` is not clamped: values past 1 extrapolate.
    pub fn blend_state(&mut self, alpha: f32) {
        let center = self.previous.center.lerp(self.center, alpha);
        self.drawn_transform = Mat4::from_translation(center)
            * self.blend_rotation(alpha)
            * Mat4::from_scale(self.size);
    }

    /// Transform to draw this body with, as of the last `blend_state`
    #[inline]
    pub fn drawn_transform(&self) -> Mat4 {
        self.drawn_transform
    }

    /// Is `p` inside the cube [-1, 1]^3 grown by `margin`?
    pub fn intersects_unit_cube(p: Vec3, margin: f32) -> bool {
        p.to_array()
            .iter()
            .all(|&v| v >= -1.0 - margin && v <= 1.0 + margin)
    }

    /// Is `p` inside the unit sphere grown by `margin`?
    pub fn intersects_unit_sphere(p: Vec3, margin: f32) -> bool {
        p.dot(p) < 1.0 + margin
    }

    /// Approximate overlap test between two drawn bodies.
    ///
    /// `other`'s sample points are carried into the frame where `self` is the
    /// canonical unit volume and tested one by one. A body never collides
    /// with itself.
    pub fn check_if_colliding(&self, other: &RigidBody, collider: &Collider) -> bool {
        if std::ptr::eq(self, other) {
            return false;
        }
        if self.drawn_transform.determinant().abs() < EPSILON {
            return false;
        }
        let to_local = self.drawn_transform.inverse() * other.drawn_transform;
        collider
            .points
            .iter()
            .any(|&p| collider.volume.contains(to_local.transform_point3(p), collider.leeway))
    }
}

/// Canonical volume a collider tests against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Volume {
    UnitSphere,
    UnitCube,
}

impl Volume {
    #[inline]
    pub fn contains(&self, p: Vec3, margin: f32) -> bool {
        match self {
            Volume::UnitSphere => RigidBody::intersects_unit_sphere(p, margin),
            Volume::UnitCube => RigidBody::intersects_unit_cube(p, margin),
        }
    }
}

/// Discretized collider: sample points in a body's local frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collider {
    pub volume: Volume,
    pub points: Vec<Vec3>,
    pub leeway: f32,
}

impl Collider {
    /// Points on the unit sphere on a latitude/longitude grid (poles included)
    pub fn sphere(rings: u32, segments: u32, leeway: f32) -> Self {
        let rings = rings.max(1);
        let segments = segments.max(3);
        let mut points = vec![Vec3::Y, Vec3::NEG_Y];
        for r in 1..rings {
            let phi = std::f32::consts::PI * r as f32 / rings as f32;
            for s in 0..segments {
                let theta = std::f32::consts::TAU * s as f32 / segments as f32;
                points.push(Vec3::new(
                    phi.sin() * theta.cos(),
                    phi.cos(),
                    phi.sin() * theta.sin(),
                ));
            }
        }
        Self {
            volume: Volume::UnitSphere,
            points,
            leeway,
        }
    }

    /// The eight corners of the unit cube
    pub fn cube(leeway: f32) -> Self {
        let mut points = Vec::with_capacity(8);
        for &x in &[-1.0, 1.0] {
            for &y in &[-1.0, 1.0] {
                for &z in &[-1.0, 1.0] {
                    points.push(Vec3::new(x, y, z));
                }
            }
        }
        Self {
            volume: Volume::UnitCube,
            points,
            leeway,
        }
    }
}
