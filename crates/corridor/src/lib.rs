//! Road corridor: the lateral band `[-half_width, half_width]` a subject is kept inside.
//!
//! # Invariants
//! - Corridor queries are pure functions of the position and the current half-width.
//! - Only the lateral (x) component is ever changed by limiting.
//! - Half-width never drops below [`MIN_HALF_WIDTH`].

mod corridor;
mod limiter;
mod mover;

pub use corridor::{Corridor, CorridorConfig, MIN_HALF_WIDTH};
pub use limiter::{BoundaryLimiter, LimiterConfig, LimiterMode};
pub use mover::{MoverConfig, SubjectMover};
