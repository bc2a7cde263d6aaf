use serde::{Deserialize, Serialize};

/// Raw stick/key axes, each nominally in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveInput {
    /// Strafe axis, positive to the right.
    pub horizontal: f32,
    /// Forward axis, positive ahead.
    pub vertical: f32,
}

impl MoveInput {
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// A high-level action consumed by the subject mover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Move by the given axes this step.
    Move(MoveInput),
    /// Pull the subject back inside the road if it is outside.
    SnapToRoad,
    /// Put the subject on the road's centre line.
    SnapToCenter,
    /// Turn boundary limiting on or off.
    SetBoundaryEnabled(bool),
    /// Change the full road width.
    SetRoadWidth(f32),
    /// No-op (used for input mapping that hasn't been bound yet).
    Noop,
}
