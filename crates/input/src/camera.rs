use glam::Vec3;

use crate::action::MoveInput;

/// Inputs whose normalized magnitude is at or below this are ignored.
pub const INPUT_DEADZONE: f32 = 0.1;

/// Camera orientation flattened onto the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    forward: Vec3,
    right: Vec3,
}

impl CameraBasis {
    /// Project the camera's forward and right vectors onto the ground plane.
    /// Degenerate vectors (looking straight down) fall back to world axes.
    pub fn new(forward: Vec3, right: Vec3) -> Self {
        let flat = |v: Vec3, fallback: Vec3| {
            Vec3::new(v.x, 0.0, v.z).try_normalize().unwrap_or(fallback)
        };
        Self {
            forward: flat(forward, Vec3::Z),
            right: flat(right, Vec3::X),
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Direction for `input` relative to this camera, `None` inside the deadzone.
    pub fn direction(&self, input: MoveInput) -> Option<Vec3> {
        axis_direction(input)?;
        Some(self.forward * input.vertical + self.right * input.horizontal)
    }
}

impl Default for CameraBasis {
    fn default() -> Self {
        Self {
            forward: Vec3::Z,
            right: Vec3::X,
        }
    }
}

/// World-axis direction for `input` without a camera: the normalized axes,
/// `None` inside the deadzone.
pub fn axis_direction(input: MoveInput) -> Option<Vec3> {
    let dir = Vec3::new(input.horizontal, 0.0, input.vertical).normalize_or_zero();
    (dir.length() > INPUT_DEADZONE).then_some(dir)
}

/// Direction for `input`, camera-relative when a camera is present.
pub fn move_direction(input: MoveInput, camera: Option<&CameraBasis>) -> Option<Vec3> {
    match camera {
        Some(camera) => camera.direction(input),
        None => axis_direction(input),
    }
}
