use glam::{Quat, Vec3};
use roadstream_input::{Action, CameraBasis, MoveInput, move_direction};
use serde::{Deserialize, Serialize};

use crate::corridor::Corridor;
use crate::limiter::BoundaryLimiter;

pub const MIN_MOVE_SPEED: f32 = 1.0;
const MIN_SMOOTH_FACTOR: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoverConfig {
    /// Units per second at full input.
    pub move_speed: f32,
    /// How quickly the subject turns to face its movement.
    pub rotation_speed: f32,
    /// Fraction of the gap to the target closed each step, in `(0, 1]`.
    pub smooth_factor: f32,
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            rotation_speed: 10.0,
            smooth_factor: 0.3,
        }
    }
}

impl MoverConfig {
    pub fn sanitized(self) -> Self {
        Self {
            move_speed: self.move_speed.max(MIN_MOVE_SPEED),
            rotation_speed: self.rotation_speed.max(0.0),
            smooth_factor: self.smooth_factor.clamp(MIN_SMOOTH_FACTOR, 1.0),
        }
    }
}

/// Moves a tracked subject from input and keeps it on the road.
///
/// Input moves a target point; the limiter constrains the target; the
/// visible position then eases toward the target.
#[derive(Debug, Clone)]
pub struct SubjectMover {
    config: MoverConfig,
    limiter: BoundaryLimiter,
    camera: Option<CameraBasis>,
    position: Vec3,
    target: Vec3,
    rotation: Quat,
}

impl SubjectMover {
    pub fn new(config: MoverConfig, limiter: BoundaryLimiter, start: Vec3) -> Self {
        Self {
            config: config.sanitized(),
            limiter,
            camera: None,
            position: start,
            target: start,
            rotation: Quat::IDENTITY,
        }
    }

    /// Without a camera, input axes map straight onto world x and z.
    pub fn set_camera(&mut self, camera: Option<CameraBasis>) {
        self.camera = camera;
    }

    pub fn set_move_speed(&mut self, speed: f32) {
        self.config.move_speed = speed.max(MIN_MOVE_SPEED);
    }

    pub fn config(&self) -> &MoverConfig {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn limiter(&self) -> &BoundaryLimiter {
        &self.limiter
    }

    /// One movement step of `dt` seconds. Returns the new position.
    pub fn step(&mut self, corridor: &Corridor, input: MoveInput, dt: f32) -> Vec3 {
        if let Some(dir) = move_direction(input, self.camera.as_ref()) {
            self.target += dir * self.config.move_speed * dt;
            let facing = Quat::from_rotation_y(dir.x.atan2(dir.z));
            let t = (self.config.rotation_speed * dt).clamp(0.0, 1.0);
            self.rotation = self.rotation.slerp(facing, t);
        }
        self.target = self.limiter.apply(corridor, self.target, dt);
        self.position = self.position.lerp(self.target, self.config.smooth_factor);
        self.position
    }

    /// Apply one action. Road width changes go straight to the shared corridor.
    pub fn apply(&mut self, action: Action, corridor: &mut Corridor, dt: f32) {
        match action {
            Action::Move(input) => {
                self.step(corridor, input, dt);
            }
            Action::SnapToRoad => {
                self.target = self.limiter.snap_to_road(corridor, self.target);
                self.position = self.target;
            }
            Action::SnapToCenter => {
                self.target = self.limiter.snap_to_center(self.target);
                self.position = self.target;
            }
            Action::SetBoundaryEnabled(enabled) => self.limiter.set_enabled(enabled),
            Action::SetRoadWidth(width) => corridor.set_width(width),
            Action::Noop => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mover() -> SubjectMover {
        SubjectMover::new(
            MoverConfig {
                smooth_factor: 1.0,
                ..MoverConfig::default()
            },
            BoundaryLimiter::hard(),
            Vec3::ZERO,
        )
    }

    #[test]
    fn config_floors() {
        let c = MoverConfig {
            move_speed: 0.0,
            rotation_speed: -1.0,
            smooth_factor: 5.0,
        }
        .sanitized();
        assert_eq!(c.move_speed, MIN_MOVE_SPEED);
        assert_eq!(c.rotation_speed, 0.0);
        assert_eq!(c.smooth_factor, 1.0);
    }

    #[test]
    fn forward_input_advances_along_travel_axis() {
        let corridor = Corridor::new(2.5);
        let mut m = mover();
        let p = m.step(&corridor, MoveInput::new(0.0, 1.0), 0.5);
        assert!((p - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn strafing_is_held_inside_the_road() {
        let corridor = Corridor::new(2.5);
        let mut m = mover();
        for _ in 0..20 {
            m.step(&corridor, MoveInput::new(1.0, 0.0), 0.1);
        }
        assert_eq!(m.position().x, 2.5);
        assert!(corridor.is_inside(m.position()));
    }

    #[test]
    fn smoothing_eases_toward_target() {
        let corridor = Corridor::new(2.5);
        let mut m = SubjectMover::new(MoverConfig::default(), BoundaryLimiter::hard(), Vec3::ZERO);
        let p = m.step(&corridor, MoveInput::new(0.0, 1.0), 1.0);
        assert!((m.target().z - 8.0).abs() < 1e-5);
        assert!((p.z - 2.4).abs() < 1e-5);
    }

    #[test]
    fn facing_turns_toward_movement() {
        let corridor = Corridor::new(2.5);
        let mut m = SubjectMover::new(
            MoverConfig {
                rotation_speed: 100.0,
                ..MoverConfig::default()
            },
            BoundaryLimiter::hard(),
            Vec3::ZERO,
        );
        m.step(&corridor, MoveInput::new(1.0, 0.0), 0.1);
        let forward = m.rotation() * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn idle_input_only_limits() {
        let corridor = Corridor::new(2.5);
        let mut m = SubjectMover::new(
            MoverConfig {
                smooth_factor: 1.0,
                ..MoverConfig::default()
            },
            BoundaryLimiter::hard(),
            Vec3::new(6.0, 0.0, 3.0),
        );
        let p = m.step(&corridor, MoveInput::default(), 0.1);
        assert_eq!(p, Vec3::new(2.5, 0.0, 3.0));
        assert_eq!(m.rotation(), Quat::IDENTITY);
    }

    #[test]
    fn actions_drive_mover_and_corridor() {
        let mut corridor = Corridor::new(2.5);
        let mut m = mover();

        m.apply(Action::SetBoundaryEnabled(false), &mut corridor, 0.1);
        for _ in 0..10 {
            m.apply(Action::Move(MoveInput::new(-1.0, 0.0)), &mut corridor, 0.1);
        }
        assert!(m.position().x < -2.5);

        m.apply(Action::SnapToRoad, &mut corridor, 0.1);
        assert_eq!(m.position().x, -2.5);

        m.apply(Action::SetRoadWidth(20.0), &mut corridor, 0.1);
        assert_eq!(corridor.half_width(), 10.0);

        m.apply(Action::SnapToCenter, &mut corridor, 0.1);
        assert_eq!(m.position().x, 0.0);

        let before = m.position();
        m.apply(Action::Noop, &mut corridor, 0.1);
        assert_eq!(m.position(), before);
    }

    #[test]
    fn camera_changes_what_forward_means() {
        let corridor = Corridor::new(100.0);
        let mut m = mover();
        m.set_camera(Some(CameraBasis::new(Vec3::X, Vec3::NEG_Z)));
        let p = m.step(&corridor, MoveInput::new(0.0, 1.0), 0.5);
        assert!((p - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);
    }
}
