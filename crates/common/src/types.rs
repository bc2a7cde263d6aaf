use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Lateral coordinate of a position (the corridor axis).
#[inline]
pub fn lateral(position: Vec3) -> f32 {
    position.x
}

/// Longitudinal coordinate of a position (the travel axis segments advance along).
#[inline]
pub fn longitudinal(position: Vec3) -> f32 {
    position.z
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity rotation and unit scale at `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Rotated about the up axis by `yaw` radians with a uniform `scale`.
    pub fn from_yaw_scale(position: Vec3, yaw: f32, scale: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(yaw),
            scale: Vec3::splat(scale),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Indexed triangle mesh in the owning object's local space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
    pub uvs: Vec<Vec2>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
