//! Movement input mapped to shared actions.
//!
//! # Invariants
//! - Raw axes never reach the movement code; it consumes [`Action`]s and
//!   camera-relative directions only.

pub mod action;
pub mod camera;

pub use action::{Action, MoveInput};
pub use camera::{CameraBasis, INPUT_DEADZONE, axis_direction, move_direction};
