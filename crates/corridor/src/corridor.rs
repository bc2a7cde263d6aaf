use glam::Vec3;
use roadstream_common::lateral;
use serde::{Deserialize, Serialize};

/// Narrowest allowed half-width (a one unit wide road).
pub const MIN_HALF_WIDTH: f32 = 0.5;

/// Corridor settings as loaded from config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorConfig {
    /// Full road width.
    pub road_width: f32,
}

impl Default for CorridorConfig {
    fn default() -> Self {
        Self { road_width: 5.0 }
    }
}

/// Symmetric lateral band around x = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corridor {
    half_width: f32,
}

impl Corridor {
    pub fn new(half_width: f32) -> Self {
        Self {
            half_width: clamp_half_width(half_width),
        }
    }

    /// Corridor for a road of the given full width.
    pub fn from_width(width: f32) -> Self {
        Self::new(width / 2.0)
    }

    pub fn from_config(config: &CorridorConfig) -> Self {
        Self::from_width(config.road_width)
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn width(&self) -> f32 {
        self.half_width * 2.0
    }

    pub fn set_half_width(&mut self, half_width: f32) {
        self.half_width = clamp_half_width(half_width);
        tracing::debug!(half_width = self.half_width, "corridor resized");
    }

    pub fn set_width(&mut self, width: f32) {
        self.set_half_width(width / 2.0);
    }

    pub fn is_inside(&self, position: Vec3) -> bool {
        lateral(position).abs() <= self.half_width
    }

    /// Lateral component clamped into the band.
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        Vec3::new(
            lateral(position).clamp(-self.half_width, self.half_width),
            position.y,
            position.z,
        )
    }

    /// Distance to the closer edge; negative once outside.
    pub fn distance_to_nearest_boundary(&self, position: Vec3) -> f32 {
        let x = lateral(position);
        (self.half_width - x).min(x + self.half_width)
    }

    /// The position itself when inside, otherwise its projection onto the
    /// edge it crossed.
    pub fn nearest_boundary_point(&self, position: Vec3) -> Vec3 {
        if self.is_inside(position) {
            return position;
        }
        let edge = if lateral(position) > self.half_width {
            self.half_width
        } else {
            -self.half_width
        };
        Vec3::new(edge, position.y, position.z)
    }

    /// Soft limiting: inside `margin` of an edge the position is pushed toward
    /// the centre by `strength * (1 + excess) * dt`, where `excess` is how far
    /// past the soft edge it sits, then hard clamped. The push never carries
    /// the position past the centre line.
    pub fn push_back(&self, position: Vec3, strength: f32, margin: f32, dt: f32) -> Vec3 {
        let soft_edge = self.half_width - margin.clamp(0.0, self.half_width);
        let x = lateral(position);
        if x.abs() <= soft_edge {
            return position;
        }
        let excess = x.abs() - soft_edge;
        let push = (strength.max(0.0) * (1.0 + excess) * dt.max(0.0)).min(x.abs());
        let pushed = Vec3::new(x - push * x.signum(), position.y, position.z);
        self.clamp(pushed)
    }
}

impl Default for Corridor {
    fn default() -> Self {
        Self::from_config(&CorridorConfig::default())
    }
}

fn clamp_half_width(half_width: f32) -> f32 {
    if half_width.is_nan() {
        return MIN_HALF_WIDTH;
    }
    half_width.max(MIN_HALF_WIDTH)
}
