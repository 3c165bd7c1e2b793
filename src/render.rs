//! Render extraction
//!
//! The simulation knows nothing about GPUs. Each frame the host reads the
//! blended transforms out of the simulation and packs them into instance
//! records it can upload as-is.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::sim::{MaterialHandle, Platform, RigidBody, ShapeHandle};

/// Scale the player's unit mesh is drawn at
pub const PLAYER_DRAW_SCALE: f32 = 0.5;

/// Per-instance data for one drawn object
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    /// Column-major model matrix
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

impl InstanceRaw {
    pub fn new(model: Mat4, tint: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            tint,
        }
    }

    /// Instance for a body at its current blended pose
    pub fn from_body(body: &RigidBody) -> Self {
        Self::new(body.drawn_transform(), body.tint)
    }
}

/// Transform the player is drawn with
pub fn player_transform(position: Vec3) -> Mat4 {
    Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(PLAYER_DRAW_SCALE))
}

/// Transform a platform is drawn with (unit cube scaled to the slab)
pub fn platform_transform(platform: &Platform) -> Mat4 {
    platform.drawn_transform()
}

/// Named shapes and materials the host has loaded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetRegistry {
    shapes: Vec<String>,
    materials: Vec<String>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default asteroid meshes and rock material
    pub fn asteroids() -> Self {
        let mut registry = Self::new();
        for name in ["sphere", "cube", "icosahedron"] {
            registry.add_shape(name);
        }
        registry.add_material("rock");
        registry
    }

    pub fn add_shape(&mut self, name: impl Into<String>) -> ShapeHandle {
        self.shapes.push(name.into());
        ShapeHandle(self.shapes.len() as u32 - 1)
    }

    pub fn add_material(&mut self, name: impl Into<String>) -> MaterialHandle {
        self.materials.push(name.into());
        MaterialHandle(self.materials.len() as u32 - 1)
    }

    pub fn shape_name(&self, handle: ShapeHandle) -> Option<&str> {
        self.shapes.get(handle.0 as usize).map(String::as_str)
    }

    pub fn material_name(&self, handle: MaterialHandle) -> Option<&str> {
        self.materials.get(handle.0 as usize).map(String::as_str)
    }

    /// Every registered shape handle, in registration order
    pub fn shape_handles(&self) -> Vec<ShapeHandle> {
        (0..self.shapes.len() as u32).map(ShapeHandle).collect()
    }
}

/// Instance records grouped by shape, one batch per draw call
#[derive(Debug, Clone, Default)]
pub struct InstanceBatch {
    pub shape: ShapeHandle,
    pub material: MaterialHandle,
    pub instances: Vec<InstanceRaw>,
}

/// Group the bodies' instance records by (shape, material).
///
/// Batches come out in first-seen order so the output is stable frame to frame.
pub fn extract_instances(bodies: &[RigidBody]) -> Vec<InstanceBatch> {
    let mut batches: Vec<InstanceBatch> = Vec::new();
    for body in bodies {
        let instance = InstanceRaw::from_body(body);
        match batches
            .iter_mut()
            .find(|b| b.shape == body.shape && b.material == body.material)
        {
            Some(batch) => batch.instances.push(instance),
            None => batches.push(InstanceBatch {
                shape: body.shape,
                material: body.material,
                instances: vec![instance],
            }),
        }
    }
    batches
}
